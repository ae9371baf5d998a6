use std::sync::Arc;

use serde_json::{json, Value};
use tracing::{error, info};

use super::transport::{ApiRequest, Transport};
use super::ApiError;
use crate::auth::{Role, SessionStore};
use crate::navigation::{Navigator, HOME_ROUTE};

/// Backend login endpoint
pub const LOGIN_PATH: &str = "/api/login/";

/// Login and logout flows on top of the session store
pub struct AuthApi {
    session: Arc<SessionStore>,
    transport: Arc<dyn Transport>,
    navigator: Arc<dyn Navigator>,
    base_url: String,
}

impl AuthApi {
    pub fn new(
        session: Arc<SessionStore>,
        transport: Arc<dyn Transport>,
        navigator: Arc<dyn Navigator>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            session,
            transport,
            navigator,
            base_url: base_url.into(),
        }
    }

    /// Authenticate with email or phone and password, store the session and
    /// send the user to their dashboard. Returns the role logged in as.
    pub async fn login_with_password(&self, email_or_phone: &str, password: &str) -> Result<Role, ApiError> {
        let request = ApiRequest::post(
            LOGIN_PATH,
            json!({ "email_or_phone": email_or_phone, "password": password }),
        )
        .prepare(&self.base_url, None)?;

        let response = self.transport.send(request).await?;
        if !response.is_success() {
            let body = response.text();
            let err = match ApiError::from_status(response.status, &body) {
                ApiError::SessionExpired => {
                    let described = ApiError::describe_body(&body);
                    if described.trim().is_empty() {
                        ApiError::InvalidCredentials("invalid email/phone or password".to_string())
                    } else {
                        ApiError::InvalidCredentials(described)
                    }
                }
                ApiError::Rejected(msg) => ApiError::InvalidCredentials(msg),
                other => other,
            };
            error!(status = %response.status, error = %err, "Login failed");
            return Err(err);
        }

        let payload: Value = response.json()?;
        if payload.get("success").and_then(Value::as_bool) == Some(false) {
            let msg = payload
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("login was not successful")
                .to_string();
            return Err(ApiError::InvalidCredentials(msg));
        }

        self.session.login(&payload);
        if self.session.access_token().is_none() {
            self.session.logout();
            return Err(ApiError::InvalidResponse(
                "login response carried no access token".to_string(),
            ));
        }

        let role = self.session.role().unwrap_or(Role::Participant);
        info!(%role, "Login successful");
        self.navigator.navigate(role.home_route());
        Ok(role)
    }

    /// End the session and return to the public home page
    pub fn logout(&self) {
        self.session.logout();
        self.navigator.navigate(HOME_ROUTE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::MemoryStorage;
    use crate::testing::{RecordingNavigator, ScriptedTransport, BASE_URL};
    use crate::api::RequestBody;

    fn auth_api(transport: &ScriptedTransport, navigator: &RecordingNavigator) -> AuthApi {
        let session = Arc::new(SessionStore::new(
            Arc::new(MemoryStorage::new()),
            Arc::new(transport.clone()),
            BASE_URL,
        ));
        AuthApi::new(session, Arc::new(transport.clone()), Arc::new(navigator.clone()), BASE_URL)
    }

    #[tokio::test]
    async fn test_login_stores_session_and_routes_by_role() {
        let transport = ScriptedTransport::new();
        let navigator = RecordingNavigator::new();
        transport.push_json(200, json!({"access": "a1", "refresh": "r1", "role": "admin", "unique_id": "u1"}));
        let api = auth_api(&transport, &navigator);

        let role = api.login_with_password("host@example.com", "hunter2").await.unwrap();

        assert_eq!(role, Role::Admin);
        assert!(api.session.is_authenticated());
        assert_eq!(navigator.routes(), vec!["/admin/dashboard"]);

        let sent = &transport.requests()[0];
        assert_eq!(sent.url, "https://events.test/api/login/");
        assert_eq!(sent.bearer_token(), None);
        assert_eq!(
            sent.body,
            RequestBody::Json(json!({"email_or_phone": "host@example.com", "password": "hunter2"}))
        );
    }

    #[tokio::test]
    async fn test_login_rejected_credentials() {
        let transport = ScriptedTransport::new();
        let navigator = RecordingNavigator::new();
        transport.push_json(400, json!({"success": false, "message": "Invalid credentials"}));
        let api = auth_api(&transport, &navigator);

        match api.login_with_password("x", "y").await {
            Err(ApiError::InvalidCredentials(msg)) => assert_eq!(msg, "Invalid credentials"),
            other => panic!("unexpected: {:?}", other),
        }
        assert!(!api.session.is_authenticated());
        assert!(navigator.routes().is_empty());
    }

    #[tokio::test]
    async fn test_login_unauthorized_keeps_server_message() {
        let transport = ScriptedTransport::new();
        let navigator = RecordingNavigator::new();
        transport
            .push_json(401, json!({"detail": "Account is locked"}))
            .push_status(401);
        let api = auth_api(&transport, &navigator);

        match api.login_with_password("x", "y").await {
            Err(ApiError::InvalidCredentials(msg)) => assert_eq!(msg, "Account is locked"),
            other => panic!("unexpected: {:?}", other),
        }
        match api.login_with_password("x", "y").await {
            Err(ApiError::InvalidCredentials(msg)) => assert_eq!(msg, "invalid email/phone or password"),
            other => panic!("unexpected: {:?}", other),
        }
        assert!(navigator.routes().is_empty());
    }

    #[tokio::test]
    async fn test_login_without_token_is_invalid_response() {
        let transport = ScriptedTransport::new();
        let navigator = RecordingNavigator::new();
        transport.push_json(200, json!({"role": "participant"}));
        let api = auth_api(&transport, &navigator);

        assert!(matches!(
            api.login_with_password("x", "y").await,
            Err(ApiError::InvalidResponse(_))
        ));
        assert!(!api.session.is_authenticated());
        assert!(!api.session.has_persisted_session());
    }

    #[tokio::test]
    async fn test_logout_returns_home() {
        let transport = ScriptedTransport::new();
        let navigator = RecordingNavigator::new();
        transport.push_json(200, json!({"token": "a1", "refresh": "r1", "role": "participant", "id": 3}));
        let api = auth_api(&transport, &navigator);
        api.login_with_password("x", "y").await.unwrap();

        api.logout();

        assert!(!api.session.is_authenticated());
        assert_eq!(navigator.routes(), vec!["/dashboard", "/"]);
    }
}
