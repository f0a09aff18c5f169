use std::error::Error;

use clap::Subcommand;

use focusquest_core::{ClientConfig, FocusSettings, SessionBinding};

use super::common;

#[derive(Subcommand)]
pub enum SettingsAction {
    /// Print the user's focus settings as JSON
    Show,
    /// Update one settings field, e.g. `focusMinutes 50`
    Set { key: String, value: String },
}

pub fn run(action: SettingsAction) -> Result<(), Box<dyn Error>> {
    let config = ClientConfig::load()?;
    let manager = common::manager(&config, SessionBinding::Unbound)?;

    match action {
        SettingsAction::Show => {
            let settings = common::effective_settings(&config, &manager);
            println!("{}", serde_json::to_string_pretty(&settings)?);
        }
        SettingsAction::Set { key, value } => {
            let settings = common::effective_settings(&config, &manager);
            let updated = set_field(&settings, &key, &value)?;
            let saved = manager.update_settings(&updated)?;
            println!("{}", serde_json::to_string_pretty(&saved)?);
        }
    }
    Ok(())
}

/// Patch a single camelCase field, parsing the value against the field's
/// existing JSON type.
fn set_field(
    settings: &FocusSettings,
    key: &str,
    value: &str,
) -> Result<FocusSettings, Box<dyn Error>> {
    let mut root = serde_json::to_value(settings)?;
    let obj = root.as_object_mut().expect("settings serialize to an object");
    let existing = obj
        .get(key)
        .ok_or_else(|| format!("unknown settings key: {key}"))?;

    let new_value = match existing {
        serde_json::Value::Bool(_) => serde_json::Value::Bool(value.parse::<bool>()?),
        serde_json::Value::Number(_) => {
            if let Ok(n) = value.parse::<u64>() {
                serde_json::Value::Number(n.into())
            } else if let Ok(n) = value.parse::<f64>() {
                serde_json::Number::from_f64(n)
                    .map(serde_json::Value::Number)
                    .ok_or_else(|| format!("cannot parse '{value}' as number"))?
            } else {
                return Err(format!("cannot parse '{value}' as number").into());
            }
        }
        _ => serde_json::Value::String(value.to_string()),
    };
    obj.insert(key.to_string(), new_value);
    Ok(serde_json::from_value(root)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_field_parses_against_existing_type() {
        let settings = FocusSettings::default();
        let updated = set_field(&settings, "focusMinutes", "50").unwrap();
        assert_eq!(updated.focus_minutes, 50);

        let updated = set_field(&settings, "autoStartBreaks", "true").unwrap();
        assert!(updated.auto_start_breaks);

        assert!(set_field(&settings, "focusMinutes", "soon").is_err());
        assert!(set_field(&settings, "noSuchKey", "1").is_err());
    }
}
