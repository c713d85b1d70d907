use std::sync::Arc;

use tracing::{info, warn};

use crate::routing::Navigator;

use super::session::SessionStore;

/// Ends the session and returns to the login surface.
#[derive(Clone)]
pub struct LogoutAction {
    store: Arc<dyn SessionStore>,
    login_path: String,
}

impl LogoutAction {
    pub fn new(store: Arc<dyn SessionStore>, login_path: impl Into<String>) -> Self {
        Self {
            store,
            login_path: login_path.into(),
        }
    }

    /// Clear the session, then navigate to login. Navigation happens even if
    /// there was no session or clearing failed.
    pub fn logout<N: Navigator + ?Sized>(&self, navigator: &mut N) {
        match self.store.clear() {
            Ok(()) => info!("Logged out"),
            Err(e) => warn!(error = %e, "Failed to clear session during logout"),
        }
        navigator.redirect(&self.login_path);
    }
}
