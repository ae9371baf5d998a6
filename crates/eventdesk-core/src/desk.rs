use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use crate::api::{AuthApi, ContentClient, Gateway, ReqwestTransport, Transport};
use crate::auth::{CredentialStorage, SessionStore};
use crate::config::Config;
use crate::navigation::Navigator;

/// The wired-up client: one session store shared by the gateway, the
/// account flows and the content client.
pub struct EventDesk {
    pub session: Arc<SessionStore>,
    pub gateway: Arc<Gateway>,
    pub auth: AuthApi,
    pub content: ContentClient,
}

impl EventDesk {
    /// Build from configuration with the real HTTP transport, restoring any
    /// persisted session.
    pub fn connect(config: &Config, base_url: String, navigator: Arc<dyn Navigator>) -> Result<Self> {
        let transport = ReqwestTransport::new().context("Failed to build HTTP client")?;
        let storage = config.open_storage()?;
        Ok(Self::assemble(storage, Arc::new(transport), navigator, base_url))
    }

    pub fn assemble(
        storage: Arc<dyn CredentialStorage>,
        transport: Arc<dyn Transport>,
        navigator: Arc<dyn Navigator>,
        base_url: String,
    ) -> Self {
        let session = Arc::new(SessionStore::new(storage, transport.clone(), base_url.clone()));
        let restored = session.restore_on_startup();
        debug!(restored, base_url = %base_url, "Session store ready");

        let gateway = Arc::new(Gateway::new(
            session.clone(),
            transport.clone(),
            navigator.clone(),
            base_url.clone(),
        ));
        let auth = AuthApi::new(session.clone(), transport, navigator, base_url);
        let content = ContentClient::new(gateway.clone());

        Self {
            session,
            gateway,
            auth,
            content,
        }
    }
}
