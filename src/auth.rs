//! Auth Service
//!
//! Login, current-user lookup and logout on top of an [`AuthApi`] and the
//! shared [`SessionStore`]. Logout is purely client-side.

use crate::error::AuthError;
use crate::models::{Credentials, Identity};
use crate::services::AuthApi;
use crate::session::SessionStore;
use std::sync::Arc;
use tracing::{info, warn};

#[derive(Clone)]
pub struct AuthService {
    api: Arc<dyn AuthApi>,
    session: SessionStore,
}

impl AuthService {
    pub fn new(api: Arc<dyn AuthApi>, session: SessionStore) -> Self {
        Self { api, session }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Exchange credentials for a bearer token
    ///
    /// The token is returned, not stored; persisting it is the login view's job.
    pub async fn login(&self, credentials: &Credentials) -> Result<String, AuthError> {
        self.api.login(credentials).await.map_err(|e| {
            warn!("Login failed for {}: {}", credentials.login, e);
            e
        })
    }

    /// Identity behind the current session
    pub async fn current_user(&self) -> Result<Identity, AuthError> {
        if !self.session.is_present() {
            return Err(AuthError::NoSession);
        }
        self.api.current_user().await
    }

    /// Forget the session. No server call is made.
    pub fn logout(&self) {
        if let Err(e) = self.session.clear() {
            warn!("Logout could not clear persisted token: {}", e);
        }
        info!("Logged out");
    }
}
