//! Stub Server Authentication
//!
//! Argon2id password hashes and HS256 JWT access tokens. Clients send the
//! token back verbatim in the `Authorization` header, without a scheme.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Identity, Role};

/// Server errors
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Token expired")]
    TokenExpired,

    #[error("Invalid token")]
    InvalidToken,

    #[error("Administrator role required")]
    Forbidden,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Upload exceeds the {0} byte limit")]
    PayloadTooLarge(usize),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ServerError::InvalidCredentials => (StatusCode::UNAUTHORIZED, "Invalid credentials".to_string()),
            ServerError::TokenExpired => (StatusCode::UNAUTHORIZED, "Token expired".to_string()),
            ServerError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token".to_string()),
            ServerError::Forbidden => (StatusCode::FORBIDDEN, "Administrator role required".to_string()),
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ServerError::PayloadTooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, self.to_string()),
            ServerError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "Internal error".to_string()),
        };

        if let ServerError::Internal(detail) = &self {
            tracing::error!("Internal server error: {}", detail);
        }

        let body = Json(ErrorResponse {
            error: status.canonical_reason().unwrap_or("Error").to_string(),
            message,
            details: None,
        });

        (status, body).into_response()
    }
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

/// Account record
#[derive(Debug, Clone)]
pub struct Account {
    pub username: String,
    password_hash: String,
    pub role: Role,
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (username)
    pub sub: String,
    pub role: Role,
    /// Issued at
    pub iat: i64,
    /// Expiration
    pub exp: i64,
    /// JWT ID
    pub jti: String,
}

impl Claims {
    pub fn require_admin(&self) -> Result<(), ServerError> {
        if self.role.is_admin() {
            Ok(())
        } else {
            Err(ServerError::Forbidden)
        }
    }
}

/// Authentication state
pub struct AuthState {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    accounts: RwLock<HashMap<String, Account>>,
    token_ttl: Duration,
}

impl AuthState {
    pub fn new(jwt_secret: &str, token_ttl_minutes: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(jwt_secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
            accounts: RwLock::new(HashMap::new()),
            token_ttl: Duration::minutes(token_ttl_minutes),
        }
    }

    /// State with the demo accounts `admin`/`admin` and `student`/`student`
    pub fn seeded(jwt_secret: &str, token_ttl_minutes: i64) -> Result<Self, ServerError> {
        let state = Self::new(jwt_secret, token_ttl_minutes);
        state.create_account("admin", "admin", Role::Admin)?;
        state.create_account("student", "student", Role::Student)?;
        Ok(state)
    }

    /// Hash a password using Argon2id
    pub fn hash_password(password: &str) -> Result<String, ServerError> {
        let salt = SaltString::generate(&mut OsRng);

        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| ServerError::Internal(format!("Password hashing failed: {}", e)))
    }

    /// Verify a password against a hash
    pub fn verify_password(password: &str, hash: &str) -> Result<bool, ServerError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| ServerError::Internal(format!("Invalid password hash: {}", e)))?;

        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }

    pub fn create_account(&self, username: &str, password: &str, role: Role) -> Result<Account, ServerError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(ServerError::BadRequest("Username and password are required".into()));
        }

        let account = Account {
            username: username.to_string(),
            password_hash: Self::hash_password(password)?,
            role,
        };

        let mut accounts = self.accounts.write();
        if accounts.contains_key(username) {
            return Err(ServerError::BadRequest("Username already exists".into()));
        }
        accounts.insert(account.username.clone(), account.clone());
        Ok(account)
    }

    /// Check credentials and issue an access token
    pub fn authenticate(&self, username: &str, password: &str) -> Result<String, ServerError> {
        let account = self
            .accounts
            .read()
            .get(username)
            .cloned()
            .ok_or(ServerError::InvalidCredentials)?;

        if !Self::verify_password(password, &account.password_hash)? {
            return Err(ServerError::InvalidCredentials);
        }

        self.issue_token(&account)
    }

    fn issue_token(&self, account: &Account) -> Result<String, ServerError> {
        let now = Utc::now();
        let claims = Claims {
            sub: account.username.clone(),
            role: account.role,
            iat: now.timestamp(),
            exp: (now + self.token_ttl).timestamp(),
            jti: Uuid::new_v4().to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key)
            .map_err(|e| ServerError::Internal(format!("Failed to encode access token: {}", e)))
    }

    /// Validate an access token
    pub fn validate_token(&self, token: &str) -> Result<Claims, ServerError> {
        let token_data = decode::<Claims>(token, &self.decoding_key, &Validation::default())
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => ServerError::TokenExpired,
                _ => ServerError::InvalidToken,
            })?;

        // The account must still exist
        if !self.accounts.read().contains_key(&token_data.claims.sub) {
            return Err(ServerError::InvalidToken);
        }

        Ok(token_data.claims)
    }

    /// Claims of the token in the `Authorization` header
    pub fn authorize(&self, headers: &HeaderMap) -> Result<Claims, ServerError> {
        let token = headers
            .get(AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or(ServerError::InvalidToken)?;

        self.validate_token(token)
    }

    pub fn identity(&self, claims: &Claims) -> Identity {
        Identity {
            username: claims.sub.clone(),
            role: claims.role,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    const SECRET: &str = "test-secret-at-least-32-characters-long";

    fn state() -> AuthState {
        let state = AuthState::new(SECRET, 60);
        state.create_account("admin", "admin-password", Role::Admin).unwrap();
        state
    }

    #[test]
    fn test_password_hashing() {
        let hash = AuthState::hash_password("secure-password-123").unwrap();

        assert!(AuthState::verify_password("secure-password-123", &hash).unwrap());
        assert!(!AuthState::verify_password("wrong-password", &hash).unwrap());
    }

    #[test]
    fn test_authenticate_and_validate() {
        let state = state();
        let token = state.authenticate("admin", "admin-password").unwrap();

        let claims = state.validate_token(&token).unwrap();
        assert_eq!(claims.sub, "admin");
        assert_eq!(claims.role, Role::Admin);
        assert!(claims.require_admin().is_ok());
    }

    #[test]
    fn test_authenticate_wrong_password() {
        let state = state();
        let result = state.authenticate("admin", "nope");
        assert!(matches!(result, Err(ServerError::InvalidCredentials)));

        let result = state.authenticate("ghost", "admin-password");
        assert!(matches!(result, Err(ServerError::InvalidCredentials)));
    }

    #[test]
    fn test_duplicate_account_rejected() {
        let state = state();
        let result = state.create_account("admin", "other", Role::Student);
        assert!(matches!(result, Err(ServerError::BadRequest(_))));
    }

    #[test]
    fn test_expired_token() {
        let state = AuthState::new(SECRET, -5);
        state.create_account("admin", "admin-password", Role::Admin).unwrap();
        let token = state.authenticate("admin", "admin-password").unwrap();

        assert!(matches!(state.validate_token(&token), Err(ServerError::TokenExpired)));
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let other = AuthState::new("another-secret-at-least-32-characters", 60);
        other.create_account("admin", "admin-password", Role::Admin).unwrap();
        let token = other.authenticate("admin", "admin-password").unwrap();

        assert!(matches!(state().validate_token(&token), Err(ServerError::InvalidToken)));
    }

    #[test]
    fn test_authorize_reads_raw_header() {
        let state = state();
        let token = state.authenticate("admin", "admin-password").unwrap();

        let mut headers = HeaderMap::new();
        assert!(matches!(state.authorize(&headers), Err(ServerError::InvalidToken)));

        headers.insert(AUTHORIZATION, HeaderValue::from_str(&token).unwrap());
        let claims = state.authorize(&headers).unwrap();
        assert_eq!(state.identity(&claims).username, "admin");
    }

    #[test]
    fn test_student_is_not_admin() {
        let claims = Claims {
            sub: "student".to_string(),
            role: Role::Student,
            iat: 0,
            exp: 0,
            jti: String::new(),
        };
        assert!(matches!(claims.require_admin(), Err(ServerError::Forbidden)));
    }
}
