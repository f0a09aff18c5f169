//! Shared wiring for CLI commands.

use std::error::Error;

use focusquest_core::{
    ClientConfig, CompletionResponse, FocusSession, FocusSettings, HttpSessionStore, Notifier,
    SessionBinding, SessionManager,
};

/// Build the lifecycle manager from the client configuration, restoring the
/// parked binding.
pub fn manager(
    config: &ClientConfig,
    binding: SessionBinding,
) -> Result<SessionManager<HttpSessionStore>, Box<dyn Error>> {
    let store = HttpSessionStore::new(&config.api.base_url, config.api.token.clone())?;
    let mut manager = SessionManager::new(store).with_binding(binding);
    manager.add_notifier(Box::new(ConsoleNotifier));
    Ok(manager)
}

/// Server settings, falling back to the configured offline defaults when the
/// store is unreachable.
pub fn effective_settings(
    config: &ClientConfig,
    manager: &SessionManager<HttpSessionStore>,
) -> FocusSettings {
    match manager.fetch_settings() {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("warning: using offline settings ({e})");
            config.settings.clone()
        }
    }
}

/// Stderr notifier standing in for the app's toast layer.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn session_started(&self, session: &FocusSession) -> Result<(), Box<dyn Error>> {
        eprintln!(
            "Focus session started ({} min, id {})",
            session.planned_duration, session.id
        );
        Ok(())
    }

    fn session_completed(&self, completion: &CompletionResponse) -> Result<(), Box<dyn Error>> {
        eprintln!("Focus session complete: +{} XP", completion.xp_earned);
        for achievement in &completion.new_achievements {
            eprintln!("Achievement unlocked: {achievement}");
        }
        Ok(())
    }
}

pub fn format_mmss(secs: u32) -> String {
    format!("{:02}:{:02}", secs / 60, secs % 60)
}
