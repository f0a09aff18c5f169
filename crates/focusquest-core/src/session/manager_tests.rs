//! Tests for the session lifecycle manager against the in-memory store.

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    use super::super::manager::{BeginOutcome, CompleteOutcome, SessionManager};
    use super::super::types::{CreateSessionRequest, PhaseReport, SessionBinding, SessionType};
    use crate::notify::Notifier;
    use crate::session::test_support::MemoryStore;
    use crate::session::{CompletionResponse, FocusSession};
    use crate::settings::FocusSettings;

    fn request() -> CreateSessionRequest {
        CreateSessionRequest::pomodoro(&FocusSettings::default())
    }

    fn full_report() -> PhaseReport {
        PhaseReport {
            total_secs: 25 * 60,
            paused_secs: 0,
            interruptions: 0,
        }
    }

    #[test]
    fn begin_binds_a_fresh_session() {
        let store = MemoryStore::new();
        let mut manager = SessionManager::new(store.clone());

        match manager.begin_focus_session(request()).unwrap() {
            BeginOutcome::Started(session) => {
                assert_eq!(manager.bound_session_id(), Some(session.id.as_str()));
                assert!(store.active().is_some());
            }
            other => panic!("expected Started, got {other:?}"),
        }
    }

    #[test]
    fn begin_rejects_zero_duration_before_any_state_change() {
        let store = MemoryStore::new();
        let mut manager = SessionManager::new(store.clone());
        let bad = CreateSessionRequest {
            session_type: SessionType::Custom,
            duration: 0,
            break_duration: None,
            task_id: None,
        };
        assert!(manager.begin_focus_session(bad).is_err());
        assert!(store.active().is_none());
        assert_eq!(manager.binding(), &SessionBinding::Unbound);
    }

    #[test]
    fn second_tab_resyncs_to_first_tabs_session() {
        let store = MemoryStore::new();
        let mut tab_one = SessionManager::new(store.clone());
        let mut tab_two = SessionManager::new(store.clone());

        let first = match tab_one.begin_focus_session(request()).unwrap() {
            BeginOutcome::Started(s) => s,
            other => panic!("expected Started, got {other:?}"),
        };

        // The second tab must see the first tab's session, not null, and
        // must not open a conflicting one.
        let seen = tab_two.query_active_session().unwrap().unwrap();
        assert_eq!(seen.id, first.id);

        match tab_two.begin_focus_session(request()).unwrap() {
            BeginOutcome::AlreadyActive(existing) => {
                assert_eq!(existing.id, first.id);
                assert_eq!(tab_two.bound_session_id(), Some(first.id.as_str()));
            }
            other => panic!("expected AlreadyActive, got {other:?}"),
        }
    }

    #[test]
    fn offline_begin_degrades_instead_of_failing() {
        let store = MemoryStore::new();
        store.set_offline(true);
        let mut manager = SessionManager::new(store.clone());

        match manager.begin_focus_session(request()).unwrap() {
            BeginOutcome::Degraded(e) => assert!(e.is_transient()),
            other => panic!("expected Degraded, got {other:?}"),
        }
        assert!(manager.binding().is_degraded());
    }

    #[test]
    fn complete_records_once_and_caches_the_attribution() {
        let store = MemoryStore::new();
        let mut manager = SessionManager::new(store.clone());
        let session = match manager.begin_focus_session(request()).unwrap() {
            BeginOutcome::Started(s) => s,
            other => panic!("expected Started, got {other:?}"),
        };

        let first = manager
            .complete_focus_session(&session.id, &full_report())
            .unwrap();
        let xp = match first {
            CompleteOutcome::Recorded(ref completion) => {
                assert!(completion.xp_earned > 0);
                completion.xp_earned
            }
            other => panic!("expected Recorded, got {other:?}"),
        };

        // Duplicate call after e.g. a reconnect: same attribution, not two.
        match manager
            .complete_focus_session(&session.id, &full_report())
            .unwrap()
        {
            CompleteOutcome::AlreadyRecorded(Some(cached)) => {
                assert_eq!(cached.xp_earned, xp);
            }
            other => panic!("expected AlreadyRecorded, got {other:?}"),
        }
        assert_eq!(store.completed_count(), 1);
    }

    #[test]
    fn server_side_already_completed_is_success() {
        let store = MemoryStore::new();
        let mut tab_one = SessionManager::new(store.clone());
        let mut tab_two = SessionManager::new(store.clone());

        let session = match tab_one.begin_focus_session(request()).unwrap() {
            BeginOutcome::Started(s) => s,
            other => panic!("expected Started, got {other:?}"),
        };
        tab_two.reattach(&session);
        tab_one
            .complete_focus_session(&session.id, &full_report())
            .unwrap();

        // Tab two retries completion; the interim update bounces off the
        // closed session and the completion call reports AlreadyCompleted,
        // which is success -- one attribution, no double-toast.
        match tab_two
            .complete_focus_session(&session.id, &full_report())
            .unwrap()
        {
            CompleteOutcome::AlreadyRecorded(None) => {}
            other => panic!("expected AlreadyRecorded, got {other:?}"),
        }
        assert_eq!(store.completed_count(), 1);
    }

    #[test]
    fn completion_update_carries_the_phase_accounting() {
        let store = MemoryStore::new();
        let mut manager = SessionManager::new(store.clone());
        let session = match manager.begin_focus_session(request()).unwrap() {
            BeginOutcome::Started(s) => s,
            other => panic!("expected Started, got {other:?}"),
        };

        let report = PhaseReport {
            total_secs: 25 * 60,
            paused_secs: 180,
            interruptions: 2,
        };
        let outcome = manager.complete_focus_session(&session.id, &report).unwrap();
        match outcome {
            CompleteOutcome::Recorded(completion) => {
                assert_eq!(completion.session.actual_duration, Some(22));
                assert_eq!(completion.session.paused_time, 3);
                assert_eq!(completion.session.interruptions, 2);
                assert!(completion.session.completed);
            }
            other => panic!("expected Recorded, got {other:?}"),
        }
    }

    #[test]
    fn abandon_clears_binding_and_server_record() {
        let store = MemoryStore::new();
        let mut manager = SessionManager::new(store.clone());
        let session = match manager.begin_focus_session(request()).unwrap() {
            BeginOutcome::Started(s) => s,
            other => panic!("expected Started, got {other:?}"),
        };

        manager.abandon_session(&session.id).unwrap();
        assert_eq!(manager.binding(), &SessionBinding::Unbound);
        assert!(store.active().is_none());
        assert_eq!(store.completed_count(), 0);
    }

    #[test]
    fn reattach_after_reload_resumes_tracking() {
        let store = MemoryStore::new();
        let mut before_reload = SessionManager::new(store.clone());
        let session = match before_reload.begin_focus_session(request()).unwrap() {
            BeginOutcome::Started(s) => s,
            other => panic!("expected Started, got {other:?}"),
        };

        // A reload drops the local countdown but the server session remains
        // discoverable.
        let mut after_reload = SessionManager::new(store.clone());
        let found = after_reload.query_active_session().unwrap().unwrap();
        assert_eq!(found.id, session.id);
        after_reload.reattach(&found);
        assert_eq!(after_reload.bound_session_id(), Some(session.id.as_str()));
    }

    #[test]
    fn degraded_phase_completes_unrecorded_and_releases_the_binding() {
        let store = MemoryStore::new();
        store.set_offline(true);
        let mut manager = SessionManager::new(store.clone());
        match manager.begin_focus_session(request()).unwrap() {
            BeginOutcome::Degraded(_) => {}
            other => panic!("expected Degraded, got {other:?}"),
        }

        // The server comes back mid-phase. The degraded phase itself stays
        // unattributed, but the binding must not outlive it.
        store.set_offline(false);
        match manager.complete_bound_phase(&full_report()).unwrap() {
            CompleteOutcome::Unrecorded => {}
            other => panic!("expected Unrecorded, got {other:?}"),
        }
        assert_eq!(manager.binding(), &SessionBinding::Unbound);
        assert_eq!(store.completed_count(), 0);

        // The next focus phase opens a fresh session instead of staying stuck.
        match manager.begin_focus_session(request()).unwrap() {
            BeginOutcome::Started(_) => {}
            other => panic!("expected Started, got {other:?}"),
        }
    }

    #[test]
    fn bound_phase_completion_goes_through_the_binding() {
        let store = MemoryStore::new();
        let mut manager = SessionManager::new(store.clone());
        match manager.begin_focus_session(request()).unwrap() {
            BeginOutcome::Started(_) => {}
            other => panic!("expected Started, got {other:?}"),
        }

        match manager.complete_bound_phase(&full_report()).unwrap() {
            CompleteOutcome::Recorded(completion) => assert!(completion.xp_earned > 0),
            other => panic!("expected Recorded, got {other:?}"),
        }
        assert_eq!(manager.binding(), &SessionBinding::Unbound);
        assert_eq!(store.completed_count(), 1);
    }

    struct CountingNotifier {
        started: Arc<AtomicU32>,
        completed: Arc<AtomicU32>,
    }

    impl Notifier for CountingNotifier {
        fn session_started(
            &self,
            _session: &FocusSession,
        ) -> Result<(), Box<dyn std::error::Error>> {
            self.started.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }

        fn session_completed(
            &self,
            _completion: &CompletionResponse,
        ) -> Result<(), Box<dyn std::error::Error>> {
            self.completed.fetch_add(1, Ordering::SeqCst);
            Err("toast failed".into()) // failures must not block the lifecycle
        }
    }

    #[test]
    fn notifiers_fire_once_per_lifecycle_event() {
        let started = Arc::new(AtomicU32::new(0));
        let completed = Arc::new(AtomicU32::new(0));
        let store = MemoryStore::new();
        let mut manager = SessionManager::new(store);
        manager.add_notifier(Box::new(CountingNotifier {
            started: started.clone(),
            completed: completed.clone(),
        }));

        let session = match manager.begin_focus_session(request()).unwrap() {
            BeginOutcome::Started(s) => s,
            other => panic!("expected Started, got {other:?}"),
        };
        manager
            .complete_focus_session(&session.id, &full_report())
            .unwrap();
        // Duplicate completion: cached, no second toast.
        manager
            .complete_focus_session(&session.id, &full_report())
            .unwrap();

        assert_eq!(started.load(Ordering::SeqCst), 1);
        assert_eq!(completed.load(Ordering::SeqCst), 1);
    }
}
