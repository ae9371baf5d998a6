use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde_json::{json, Value};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::bundle::{CredentialBundle, Role};
use super::storage::CredentialStorage;
use crate::api::{ApiRequest, Transport};
use crate::navigation::LOGIN_ROUTE;

/// Storage key holding the JSON-serialized credential bundle.
/// Its presence is the only "has a session" signal route guards use.
pub const SESSION_KEY: &str = "eventdesk.session";

/// Backend endpoint exchanging a refresh token for a new access token
pub const REFRESH_TOKEN_PATH: &str = "/api/refresh-token/";

#[derive(Debug, Default)]
struct SessionState {
    bundle: CredentialBundle,
    authenticated: bool,
}

/// Single source of truth for the credential bundle.
///
/// Share one instance behind an `Arc` between the gateway and the screens
/// that need to read the session. Every operation swallows its failures:
/// a broken refresh or a corrupt stored value ends up as "logged out",
/// never as an error in the caller.
pub struct SessionStore {
    storage: Arc<dyn CredentialStorage>,
    transport: Arc<dyn Transport>,
    base_url: String,
    state: RwLock<SessionState>,
    // Serializes refresh exchanges so concurrent 401s cost one network call
    refresh_lock: Mutex<()>,
}

impl SessionStore {
    pub fn new(
        storage: Arc<dyn CredentialStorage>,
        transport: Arc<dyn Transport>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            storage,
            transport,
            base_url: base_url.into(),
            state: RwLock::new(SessionState::default()),
            refresh_lock: Mutex::new(()),
        }
    }

    fn state(&self) -> RwLockReadGuard<'_, SessionState> {
        self.state.read().unwrap_or_else(|e| e.into_inner())
    }

    fn state_mut(&self) -> RwLockWriteGuard<'_, SessionState> {
        self.state.write().unwrap_or_else(|e| e.into_inner())
    }

    // ===== Lifecycle =====

    /// Adopt a backend login payload as the current session and persist it
    pub fn login(&self, payload: &Value) {
        let bundle = CredentialBundle::from_login_payload(payload);
        if !bundle.is_complete() {
            warn!(
                has_access = bundle.access_token.is_some(),
                has_refresh = bundle.refresh_token.is_some(),
                has_role = bundle.role.is_some(),
                has_subject = bundle.subject_id.is_some(),
                "Login payload is missing credential fields"
            );
        }

        self.persist(&bundle);
        info!(role = bundle.role.as_deref().unwrap_or("unknown"), "Logged in");

        let mut state = self.state_mut();
        state.bundle = bundle;
        state.authenticated = true;
    }

    /// Drop the session from memory and storage. Safe to call repeatedly.
    pub fn logout(&self) {
        {
            let mut state = self.state_mut();
            if state.authenticated {
                info!("Logged out");
            }
            *state = SessionState::default();
        }
        if let Err(e) = self.storage.remove(SESSION_KEY) {
            warn!(error = %e, "Failed to remove persisted session");
        }
    }

    /// Load the persisted session, if any. Returns whether a session was
    /// adopted. A corrupt entry is discarded and treated as no session.
    pub fn restore_on_startup(&self) -> bool {
        let raw = match self.storage.read(SESSION_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                debug!("No persisted session");
                return false;
            }
            Err(e) => {
                warn!(error = %e, "Failed to read persisted session");
                return false;
            }
        };

        match serde_json::from_str::<CredentialBundle>(&raw) {
            Ok(bundle) => {
                debug!(complete = bundle.is_complete(), "Restored persisted session");
                let mut state = self.state_mut();
                state.bundle = bundle;
                state.authenticated = true;
                true
            }
            Err(e) => {
                warn!(error = %e, "Discarding corrupt persisted session");
                if let Err(e) = self.storage.remove(SESSION_KEY) {
                    warn!(error = %e, "Failed to remove corrupt persisted session");
                }
                *self.state_mut() = SessionState::default();
                false
            }
        }
    }

    /// Exchange the refresh token for a new access token.
    ///
    /// On success only the access token changes and the new one is returned.
    /// Every failure logs the session out and returns `None`.
    pub async fn refresh_access_token(&self) -> Option<String> {
        let observed = self.access_token();
        let _guard = self.refresh_lock.lock().await;

        // Another caller refreshed while we waited for the lock
        if let Some(current) = self.access_token() {
            if observed.as_deref() != Some(current.as_str()) && self.is_authenticated() {
                debug!("Access token already refreshed by a concurrent caller");
                return Some(current);
            }
        }

        let held = self.state().bundle.refresh_token.clone();
        let refresh_token = match held {
            Some(token) => token,
            None => {
                debug!("No refresh token held, ending session");
                self.logout();
                return None;
            }
        };

        match self.exchange_refresh_token(&refresh_token).await {
            Some(access) => {
                let bundle = {
                    let mut state = self.state_mut();
                    state.bundle.access_token = Some(access.clone());
                    state.bundle.clone()
                };
                self.persist(&bundle);
                debug!("Access token refreshed");
                Some(access)
            }
            None => {
                self.logout();
                None
            }
        }
    }

    async fn exchange_refresh_token(&self, refresh_token: &str) -> Option<String> {
        let request = match ApiRequest::post(REFRESH_TOKEN_PATH, json!({ "refresh": refresh_token }))
            .prepare(&self.base_url, None)
        {
            Ok(request) => request,
            Err(e) => {
                warn!(error = %e, "Failed to build refresh request");
                return None;
            }
        };

        let response = match self.transport.send(request).await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Token refresh request failed");
                return None;
            }
        };

        if !response.is_success() {
            warn!(status = %response.status, "Token refresh rejected");
            return None;
        }

        let payload: Value = match response.json() {
            Ok(payload) => payload,
            Err(e) => {
                warn!(error = %e, "Token refresh returned an unreadable body");
                return None;
            }
        };

        let access = CredentialBundle::access_token_from(&payload);
        if access.is_none() {
            warn!("Token refresh response carried no access token");
        }
        access
    }

    fn persist(&self, bundle: &CredentialBundle) {
        let result = serde_json::to_string(bundle)
            .map_err(anyhow::Error::from)
            .and_then(|contents| self.storage.write(SESSION_KEY, &contents));
        if let Err(e) = result {
            warn!(error = %e, "Failed to persist session");
        }
    }

    // ===== Accessors =====

    /// Snapshot of the current bundle
    pub fn bundle(&self) -> CredentialBundle {
        self.state().bundle.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state().authenticated
    }

    pub fn access_token(&self) -> Option<String> {
        self.state().bundle.access_token.clone()
    }

    pub fn subject_id(&self) -> Option<String> {
        self.state().bundle.subject_id.clone()
    }

    pub fn role(&self) -> Option<Role> {
        self.state().bundle.role_kind()
    }

    /// Whether a persisted session entry exists, parseable or not
    pub fn has_persisted_session(&self) -> bool {
        matches!(self.storage.read(SESSION_KEY), Ok(Some(_)))
    }

    /// The bundle as currently persisted. Corrupt or unreadable entries
    /// count as no session.
    pub fn persisted_bundle(&self) -> Option<CredentialBundle> {
        let raw = match self.storage.read(SESSION_KEY) {
            Ok(raw) => raw?,
            Err(e) => {
                warn!(error = %e, "Failed to read persisted session");
                return None;
            }
        };
        match serde_json::from_str(&raw) {
            Ok(bundle) => Some(bundle),
            Err(e) => {
                warn!(error = %e, "Persisted session is corrupt");
                None
            }
        }
    }

    /// Landing route for the current session
    pub fn home_route(&self) -> &'static str {
        if !self.is_authenticated() {
            return LOGIN_ROUTE;
        }
        self.role().unwrap_or(Role::Participant).home_route()
    }
}
