//! Client-side navigation targets and the redirect seam.

use tracing::info;

/// Where the user is sent when no valid session can be established
pub const LOGIN_ROUTE: &str = "/login";

/// Public landing page
pub const HOME_ROUTE: &str = "/";

pub const ADMIN_DASHBOARD_ROUTE: &str = "/admin/dashboard";

pub const PARTICIPANT_DASHBOARD_ROUTE: &str = "/dashboard";

/// Receives redirects issued by the session layer.
///
/// Navigation is client-side; implementors switch screens without reloading.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: &str);
}

/// Records the redirect in the log. Used by headless front ends that check
/// `SessionStore::is_authenticated` after each call instead of switching
/// screens.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingNavigator;

impl Navigator for TracingNavigator {
    fn navigate(&self, route: &str) {
        info!(route, "Navigating");
    }
}
