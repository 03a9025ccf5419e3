//! Login View

use crate::auth::AuthService;
use crate::error::{DecanatError, ValidationError};
use crate::models::Credentials;
use crate::navigation::{Navigator, Route};
use tracing::{info, warn};

const INVALID_CREDENTIALS: &str = "Invalid email or password";
const SESSION_NOT_SAVED: &str = "Could not save the session";

/// Login form state
pub struct LoginView {
    auth: AuthService,
    navigator: Navigator,
    pub login: String,
    pub password: String,
    error: Option<String>,
    submitting: bool,
}

impl LoginView {
    pub fn new(auth: AuthService, navigator: Navigator) -> Self {
        Self {
            auth,
            navigator,
            login: String::new(),
            password: String::new(),
            error: None,
            submitting: false,
        }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Fill both fields
    pub fn fill(&mut self, login: &str, password: &str) {
        self.login = login.to_string();
        self.password = password.to_string();
    }

    /// Submit the form: authenticate, persist the token, go to the dashboard
    pub async fn submit(&mut self) -> Result<(), DecanatError> {
        if self.login.trim().is_empty() {
            self.error = Some("Email is required".to_string());
            return Err(ValidationError::MissingField("login").into());
        }
        if self.password.is_empty() {
            self.error = Some("Password is required".to_string());
            return Err(ValidationError::MissingField("password").into());
        }

        let credentials = Credentials::new(self.login.trim(), self.password.clone());
        self.submitting = true;
        let result = self.auth.login(&credentials).await;
        self.submitting = false;

        let token = match result {
            Ok(token) => token,
            Err(e) => {
                self.error = Some(INVALID_CREDENTIALS.to_string());
                return Err(e.into());
            }
        };

        if let Err(e) = self.auth.session().set(&token) {
            warn!("Failed to persist session token: {}", e);
            self.error = Some(SESSION_NOT_SAVED.to_string());
            return Err(e.into());
        }

        info!("Login succeeded for {}", credentials.login);
        self.error = None;
        self.password.clear();
        self.navigator.navigate(Route::Dashboard);
        Ok(())
    }
}
