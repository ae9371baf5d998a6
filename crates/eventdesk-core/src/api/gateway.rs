//! Authenticated request gateway.
//!
//! Two 401 policies live here side by side:
//! - `authenticated_fetch` ends the session and redirects on the first 401.
//! - `upload` refreshes the access token once and resends before giving up.
//!
//! `ContentClient` sends JSON calls through the first and multipart
//! submissions through the second.

use std::sync::Arc;

use reqwest::StatusCode;
use tracing::{debug, warn};

use super::transport::{ApiRequest, ApiResponse, Transport};
use super::GatewayError;
use crate::auth::SessionStore;
use crate::navigation::{Navigator, LOGIN_ROUTE};

pub struct Gateway {
    session: Arc<SessionStore>,
    transport: Arc<dyn Transport>,
    navigator: Arc<dyn Navigator>,
    base_url: String,
}

impl Gateway {
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

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Send `request` with the persisted access token.
    ///
    /// No persisted session means no network call: the caller is redirected
    /// to login. A 401 ends the session and redirects without retrying. Any
    /// other response is returned as-is.
    pub async fn authenticated_fetch(&self, request: ApiRequest) -> Result<ApiResponse, GatewayError> {
        let token = self.persisted_access_token()?;

        let response = self.send_with(&request, &token).await?;
        if response.status == StatusCode::UNAUTHORIZED {
            warn!(path = %request.path, "Request unauthorized, ending session");
            return Err(self.expire_session());
        }
        Ok(response)
    }

    /// Send a (typically multipart) request, refreshing the access token and
    /// resending once if the first attempt is unauthorized.
    pub async fn upload(&self, request: ApiRequest) -> Result<ApiResponse, GatewayError> {
        let token = self.persisted_access_token()?;

        let response = self.send_with(&request, &token).await?;
        if response.status != StatusCode::UNAUTHORIZED {
            return Ok(response);
        }

        debug!(path = %request.path, "Upload unauthorized, refreshing token");
        let Some(fresh) = self.session.refresh_access_token().await else {
            warn!(path = %request.path, "Token refresh failed, ending session");
            return Err(self.expire_session());
        };

        let retried = self.send_with(&request, &fresh).await?;
        if retried.status == StatusCode::UNAUTHORIZED {
            warn!(path = %request.path, "Upload still unauthorized after refresh, ending session");
            return Err(self.expire_session());
        }
        Ok(retried)
    }

    fn persisted_access_token(&self) -> Result<String, GatewayError> {
        match self
            .session
            .persisted_bundle()
            .and_then(|bundle| bundle.access_token)
        {
            Some(token) => Ok(token),
            None => {
                debug!("No persisted session, redirecting to login");
                self.navigator.navigate(LOGIN_ROUTE);
                Err(GatewayError::Unauthenticated)
            }
        }
    }

    async fn send_with(&self, request: &ApiRequest, token: &str) -> Result<ApiResponse, GatewayError> {
        let prepared = request.prepare(&self.base_url, Some(token))?;
        debug!(method = %prepared.method, url = %prepared.url, "Sending authenticated request");
        Ok(self.transport.send(prepared).await?)
    }

    fn expire_session(&self) -> GatewayError {
        self.session.logout();
        self.navigator.navigate(LOGIN_ROUTE);
        GatewayError::SessionExpired
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::{FormPart, RequestBody};
    use crate::auth::{CredentialStorage, MemoryStorage, SESSION_KEY};
    use crate::testing::{RecordingNavigator, ScriptedTransport, BASE_URL};
    use reqwest::Method;
    use serde_json::json;

    struct Harness {
        storage: MemoryStorage,
        transport: ScriptedTransport,
        navigator: RecordingNavigator,
        gateway: Gateway,
    }

    fn harness() -> Harness {
        let storage = MemoryStorage::new();
        let transport = ScriptedTransport::new();
        let navigator = RecordingNavigator::new();
        let session = Arc::new(SessionStore::new(
            Arc::new(storage.clone()),
            Arc::new(transport.clone()),
            BASE_URL,
        ));
        let gateway = Gateway::new(
            session,
            Arc::new(transport.clone()),
            Arc::new(navigator.clone()),
            BASE_URL,
        );
        Harness {
            storage,
            transport,
            navigator,
            gateway,
        }
    }

    fn logged_in() -> Harness {
        let h = harness();
        h.gateway
            .session()
            .login(&json!({"access": "a1", "refresh": "r1", "role": "admin", "unique_id": "u1"}));
        h
    }

    fn upload_request() -> ApiRequest {
        ApiRequest::multipart(
            Method::POST,
            "/api/gallery/",
            vec![
                FormPart::text("caption", "Opening night"),
                FormPart::file("image", "stage.jpg", Some("image/jpeg".into()), vec![0xff, 0xd8]),
            ],
        )
    }

    #[tokio::test]
    async fn test_no_session_redirects_without_network() {
        let h = harness();

        let result = h.gateway.authenticated_fetch(ApiRequest::get("/api/events/")).await;

        assert!(matches!(result, Err(GatewayError::Unauthenticated)));
        assert_eq!(h.transport.request_count(), 0);
        assert_eq!(h.navigator.routes(), vec!["/login"]);
    }

    #[tokio::test]
    async fn test_corrupt_persisted_session_counts_as_none() {
        let h = harness();
        h.storage.write(SESSION_KEY, "{not json").unwrap();

        let result = h.gateway.authenticated_fetch(ApiRequest::get("/api/events/")).await;

        assert!(matches!(result, Err(GatewayError::Unauthenticated)));
        assert_eq!(h.transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_attaches_bearer_and_json_content_type() {
        let h = logged_in();
        h.transport.push_json(200, json!({"success": true, "data": []}));

        let response = h
            .gateway
            .authenticated_fetch(ApiRequest::get("/api/events/").with_query("page", "2"))
            .await
            .unwrap();

        assert_eq!(response.status, StatusCode::OK);
        let sent = &h.transport.requests()[0];
        assert_eq!(sent.url, "https://events.test/api/events/");
        assert_eq!(sent.query, vec![("page".to_string(), "2".to_string())]);
        assert_eq!(sent.bearer_token(), Some("a1"));
        assert_eq!(sent.content_type(), Some("application/json"));
        assert!(h.navigator.routes().is_empty());
    }

    #[tokio::test]
    async fn test_multipart_leaves_content_type_to_transport() {
        let h = logged_in();
        h.transport.push_json(201, json!({"success": true, "data": {"id": 1}}));

        let multipart = upload_request();
        h.gateway.authenticated_fetch(multipart.clone()).await.unwrap();

        let sent = &h.transport.requests()[0];
        assert_eq!(sent.content_type(), None);
        assert_eq!(sent.body, multipart.body);
    }

    #[tokio::test]
    async fn test_uses_persisted_token_not_memory() {
        let h = logged_in();
        h.storage
            .write(SESSION_KEY, r#"{"accessToken":"from-disk","refreshToken":"r1"}"#)
            .unwrap();
        h.transport.push_status(204);

        h.gateway.authenticated_fetch(ApiRequest::delete("/api/events/3/")).await.unwrap();

        assert_eq!(h.transport.requests()[0].bearer_token(), Some("from-disk"));
    }

    #[tokio::test]
    async fn test_non_auth_errors_are_returned_raw() {
        let h = logged_in();
        h.transport.push_json(500, json!({"success": false, "message": "boom"}));

        let response = h.gateway.authenticated_fetch(ApiRequest::get("/api/events/")).await.unwrap();

        assert_eq!(response.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(h.gateway.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_unauthorized_ends_session_without_retry() {
        let h = logged_in();
        h.transport.push_status(401);

        let result = h.gateway.authenticated_fetch(ApiRequest::get("/api/events/")).await;

        assert!(matches!(result, Err(GatewayError::SessionExpired)));
        assert_eq!(h.transport.request_count(), 1);
        assert_eq!(h.storage.read(SESSION_KEY).unwrap(), None);
        assert!(!h.gateway.session().is_authenticated());
        assert_eq!(h.navigator.routes(), vec!["/login"]);
    }

    #[tokio::test]
    async fn test_transport_error_propagates_and_keeps_session() {
        let h = logged_in();
        h.transport.push_network_error();

        let result = h.gateway.authenticated_fetch(ApiRequest::get("/api/events/")).await;

        assert!(matches!(result, Err(GatewayError::Transport(_))));
        assert!(h.gateway.session().is_authenticated());
        assert!(h.navigator.routes().is_empty());
    }

    #[tokio::test]
    async fn test_upload_retries_once_with_refreshed_token() {
        let h = logged_in();
        h.transport
            .push_status(401)
            .push_json(200, json!({"access": "a2"}))
            .push_json(201, json!({"success": true, "data": {"id": 9}}));

        let response = h.gateway.upload(upload_request()).await.unwrap();

        assert_eq!(response.status, StatusCode::CREATED);
        let requests = h.transport.requests();
        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].bearer_token(), Some("a1"));
        assert_eq!(requests[1].url, "https://events.test/api/refresh-token/");
        assert_eq!(requests[2].bearer_token(), Some("a2"));
        assert_eq!(requests[2].body, requests[0].body);
        assert!(matches!(requests[2].body, RequestBody::Multipart(_)));
        assert_eq!(h.gateway.session().access_token().as_deref(), Some("a2"));
        assert!(h.navigator.routes().is_empty());
    }

    #[tokio::test]
    async fn test_upload_refresh_failure_redirects() {
        let h = logged_in();
        h.transport.push_status(401).push_status(400);

        let result = h.gateway.upload(upload_request()).await;

        assert!(matches!(result, Err(GatewayError::SessionExpired)));
        assert_eq!(h.transport.request_count(), 2);
        assert_eq!(h.storage.read(SESSION_KEY).unwrap(), None);
        assert_eq!(h.navigator.routes(), vec!["/login"]);
    }

    #[tokio::test]
    async fn test_upload_gives_up_after_second_unauthorized() {
        let h = logged_in();
        h.transport
            .push_status(401)
            .push_json(200, json!({"access": "a2"}))
            .push_status(401);

        let result = h.gateway.upload(upload_request()).await;

        assert!(matches!(result, Err(GatewayError::SessionExpired)));
        assert_eq!(h.transport.request_count(), 3);
        assert!(!h.gateway.session().is_authenticated());
    }

    #[tokio::test]
    async fn test_upload_without_session_redirects() {
        let h = harness();

        let result = h.gateway.upload(upload_request()).await;

        assert!(matches!(result, Err(GatewayError::Unauthenticated)));
        assert_eq!(h.transport.request_count(), 0);
        assert_eq!(h.navigator.routes(), vec!["/login"]);
    }

    #[tokio::test]
    async fn test_login_then_expiry_scenario() {
        let h = logged_in();
        assert!(h.gateway.session().is_authenticated());
        assert_eq!(h.gateway.session().bundle().subject_id.as_deref(), Some("u1"));

        h.transport.push_status(401);
        let _ = h.gateway.authenticated_fetch(ApiRequest::get("/api/participants/u1/events/")).await;

        assert!(!h.gateway.session().has_persisted_session());
        assert!(!h.gateway.session().is_authenticated());
        assert_eq!(h.navigator.routes(), vec!["/login"]);
    }
}
