//! REST implementation of the session store.
//!
//! Thin wrapper over the app server's focus-session endpoints. All requests
//! carry a client-generated `X-Request-Id` so duplicate network effects can
//! be correlated server-side; bearer auth is optional for local dev servers.

use reqwest::{Method, RequestBuilder, Response, StatusCode};
use url::Url;
use uuid::Uuid;

use crate::session::store::{SessionStore, StoreError};
use crate::session::types::{
    CompletionResponse, CreateSessionRequest, FocusSession, SessionUpdate,
};
use crate::settings::FocusSettings;

/// Envelope used by the create endpoint.
#[derive(serde::Deserialize)]
struct CreatedEnvelope {
    session: FocusSession,
    #[serde(default)]
    #[allow(dead_code)]
    message: String,
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    #[serde(default)]
    message: String,
}

/// HTTP client for the focus-session REST contract.
pub struct HttpSessionStore {
    base_url: Url,
    token: Option<String>,
    client: reqwest::Client,
    runtime: tokio::runtime::Runtime,
}

impl HttpSessionStore {
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self, StoreError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| StoreError::Validation(format!("invalid base URL '{base_url}': {e}")))?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| StoreError::Network(e.to_string()))?;
        Ok(Self {
            base_url,
            token,
            client: reqwest::Client::new(),
            runtime,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, StoreError> {
        self.base_url
            .join(path)
            .map_err(|e| StoreError::Validation(format!("invalid endpoint '{path}': {e}")))
    }

    fn request(&self, method: Method, path: &str) -> Result<RequestBuilder, StoreError> {
        let url = self.endpoint(path)?;
        let mut builder = self
            .client
            .request(method, url)
            .header("X-Request-Id", Uuid::new_v4().to_string());
        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }
        Ok(builder)
    }

    fn send(&self, builder: RequestBuilder) -> Result<Response, StoreError> {
        self.runtime
            .block_on(builder.send())
            .map_err(|e| StoreError::Network(e.to_string()))
    }

    fn read_json<T: serde::de::DeserializeOwned>(&self, response: Response) -> Result<T, StoreError> {
        self.runtime
            .block_on(response.json())
            .map_err(|e| StoreError::Network(e.to_string()))
    }

    /// Map a non-success response onto the store taxonomy. `completing`
    /// flips the 409/410 interpretation: on the complete endpoint a
    /// conflict means the session is already closed, not that a second
    /// session exists.
    fn error_from(&self, response: Response, completing: bool) -> StoreError {
        let status = response.status();
        let message = self
            .runtime
            .block_on(response.text())
            .ok()
            .map(|body| {
                serde_json::from_str::<ErrorBody>(&body)
                    .map(|e| e.message)
                    .unwrap_or(body)
            })
            .unwrap_or_default();

        match status {
            StatusCode::CONFLICT | StatusCode::GONE if completing => StoreError::AlreadyCompleted,
            StatusCode::CONFLICT => StoreError::Conflict,
            StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => {
                StoreError::Validation(message)
            }
            _ => StoreError::Api {
                status: status.as_u16(),
                message,
            },
        }
    }
}

impl SessionStore for HttpSessionStore {
    fn create_session(&self, request: &CreateSessionRequest) -> Result<FocusSession, StoreError> {
        let builder = self
            .request(Method::POST, "api/focus-sessions")?
            .json(request);
        let response = self.send(builder)?;
        if !response.status().is_success() {
            return Err(self.error_from(response, false));
        }
        let envelope: CreatedEnvelope = self.read_json(response)?;
        Ok(envelope.session)
    }

    fn active_session(&self) -> Result<Option<FocusSession>, StoreError> {
        let builder = self.request(Method::GET, "api/focus-sessions/active")?;
        let response = self.send(builder)?;
        match response.status() {
            StatusCode::NOT_FOUND | StatusCode::NO_CONTENT => Ok(None),
            status if status.is_success() => self.read_json(response),
            _ => Err(self.error_from(response, false)),
        }
    }

    fn update_session(&self, id: &str, update: &SessionUpdate) -> Result<FocusSession, StoreError> {
        let builder = self
            .request(Method::PATCH, &format!("api/focus-sessions/{id}"))?
            .json(update);
        let response = self.send(builder)?;
        if !response.status().is_success() {
            return Err(self.error_from(response, false));
        }
        self.read_json(response)
    }

    fn complete_session(&self, id: &str) -> Result<CompletionResponse, StoreError> {
        let builder = self.request(Method::POST, &format!("api/focus-sessions/{id}/complete"))?;
        let response = self.send(builder)?;
        if !response.status().is_success() {
            return Err(self.error_from(response, true));
        }
        self.read_json(response)
    }

    fn delete_session(&self, id: &str) -> Result<(), StoreError> {
        let builder = self.request(Method::DELETE, &format!("api/focus-sessions/{id}"))?;
        let response = self.send(builder)?;
        if !response.status().is_success() {
            return Err(self.error_from(response, false));
        }
        Ok(())
    }

    fn fetch_settings(&self) -> Result<FocusSettings, StoreError> {
        let builder = self.request(Method::GET, "api/focus-settings")?;
        let response = self.send(builder)?;
        if !response.status().is_success() {
            return Err(self.error_from(response, false));
        }
        self.read_json(response)
    }

    fn update_settings(&self, settings: &FocusSettings) -> Result<FocusSettings, StoreError> {
        let builder = self
            .request(Method::PUT, "api/focus-settings")?
            .json(settings);
        let response = self.send(builder)?;
        if !response.status().is_success() {
            return Err(self.error_from(response, false));
        }
        self.read_json(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_body(id: &str, completed: bool) -> String {
        serde_json::json!({
            "id": id,
            "userId": "u-1",
            "type": "pomodoro",
            "plannedDuration": 25,
            "breakDuration": 5,
            "startTime": "2026-08-29T09:00:00Z",
            "interruptions": 0,
            "pausedTime": 0,
            "completed": completed
        })
        .to_string()
    }

    #[test]
    fn create_parses_session_envelope() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/api/focus-sessions")
            .match_header("x-request-id", mockito::Matcher::Any)
            .with_status(201)
            .with_body(format!(
                "{{\"session\":{},\"message\":\"Focus session started\"}}",
                session_body("s-1", false)
            ))
            .create();

        let store = HttpSessionStore::new(&server.url(), None).unwrap();
        let request = CreateSessionRequest::pomodoro(&FocusSettings::default());
        let session = store.create_session(&request).unwrap();
        assert_eq!(session.id, "s-1");
        assert!(session.is_active());
        mock.assert();
    }

    #[test]
    fn create_conflict_maps_to_conflict() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/api/focus-sessions")
            .with_status(409)
            .with_body("{\"message\":\"You already have an active focus session\"}")
            .create();

        let store = HttpSessionStore::new(&server.url(), None).unwrap();
        let request = CreateSessionRequest::pomodoro(&FocusSettings::default());
        assert!(matches!(
            store.create_session(&request),
            Err(StoreError::Conflict)
        ));
    }

    #[test]
    fn active_session_null_body_is_none() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/api/focus-sessions/active")
            .with_status(200)
            .with_body("null")
            .create();

        let store = HttpSessionStore::new(&server.url(), None).unwrap();
        assert!(store.active_session().unwrap().is_none());
    }

    #[test]
    fn active_session_returns_the_record() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/api/focus-sessions/active")
            .with_status(200)
            .with_body(session_body("s-9", false))
            .create();

        let store = HttpSessionStore::new(&server.url(), None).unwrap();
        let session = store.active_session().unwrap().unwrap();
        assert_eq!(session.id, "s-9");
    }

    #[test]
    fn complete_conflict_maps_to_already_completed() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/api/focus-sessions/s-1/complete")
            .with_status(409)
            .with_body("{\"message\":\"Session already completed\"}")
            .create();

        let store = HttpSessionStore::new(&server.url(), None).unwrap();
        assert!(matches!(
            store.complete_session("s-1"),
            Err(StoreError::AlreadyCompleted)
        ));
    }

    #[test]
    fn complete_parses_reward_payload() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/api/focus-sessions/s-1/complete")
            .with_status(200)
            .with_body(format!(
                "{{\"session\":{},\"xpEarned\":50,\"newAchievements\":[\"deep-diver\"]}}",
                session_body("s-1", true)
            ))
            .create();

        let store = HttpSessionStore::new(&server.url(), None).unwrap();
        let completion = store.complete_session("s-1").unwrap();
        assert_eq!(completion.xp_earned, 50);
        assert_eq!(completion.new_achievements, vec!["deep-diver".to_string()]);
        assert!(completion.session.completed);
    }

    #[test]
    fn validation_rejection_carries_server_message() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/api/focus-sessions")
            .with_status(400)
            .with_body("{\"message\":\"duration must be positive\"}")
            .create();

        let store = HttpSessionStore::new(&server.url(), None).unwrap();
        let request = CreateSessionRequest::pomodoro(&FocusSettings::default());
        match store.create_session(&request) {
            Err(StoreError::Validation(message)) => {
                assert_eq!(message, "duration must be positive");
            }
            other => panic!("expected Validation, got {other:?}"),
        }
    }

    #[test]
    fn unreachable_server_is_a_network_error() {
        // Port 9 (discard) is about as unreachable as it gets locally.
        let store = HttpSessionStore::new("http://127.0.0.1:9", None).unwrap();
        match store.active_session() {
            Err(e) => assert!(e.is_transient()),
            Ok(_) => panic!("expected a network error"),
        }
    }

    #[test]
    fn settings_round_trip() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/api/focus-settings")
            .with_status(200)
            .with_body("{\"focusMinutes\":50,\"cadence\":3}")
            .create();

        let store = HttpSessionStore::new(&server.url(), None).unwrap();
        let settings = store.fetch_settings().unwrap();
        assert_eq!(settings.focus_minutes, 50);
        assert_eq!(settings.cadence, 3);
        // Omitted fields fall back to defaults.
        assert_eq!(settings.short_break_minutes, 5);
    }
}
