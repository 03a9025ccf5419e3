//! Stub Server Configuration

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

/// Stub server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: 127.0.0.1)
    pub bind_addr: IpAddr,
    /// Port number (default: 8080)
    pub port: u16,
    /// Enable CORS for the listed origins
    pub cors_enabled: bool,
    /// Allowed CORS origins
    pub cors_origins: Vec<String>,
    /// Enable request logging
    pub log_requests: bool,
    /// HS256 signing secret
    pub jwt_secret: String,
    /// Access token lifetime
    pub token_ttl_minutes: i64,
    /// Largest accepted upload request body, in bytes
    pub max_upload_bytes: usize,
}

/// Default upload body limit (25 MiB)
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: 8080,
            cors_enabled: true,
            cors_origins: vec![
                "http://localhost:3000".to_string(),
                "http://127.0.0.1:3000".to_string(),
            ],
            log_requests: true,
            jwt_secret: random_secret(),
            token_ttl_minutes: 720,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl ServerConfig {
    /// Create config from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("DECANAT_SERVER_BIND_ADDR") {
            if let Ok(parsed) = addr.parse() {
                config.bind_addr = parsed;
            }
        }

        if let Ok(port) = std::env::var("DECANAT_SERVER_PORT") {
            if let Ok(parsed) = port.parse() {
                config.port = parsed;
            }
        }

        if let Ok(val) = std::env::var("DECANAT_SERVER_LOG_REQUESTS") {
            config.log_requests = val == "true" || val == "1";
        }

        match std::env::var("DECANAT_JWT_SECRET") {
            Ok(secret) if !secret.is_empty() => config.jwt_secret = secret,
            _ => tracing::warn!("No JWT secret configured - using random secret (development only)"),
        }

        if let Ok(ttl) = std::env::var("DECANAT_TOKEN_TTL_MINUTES") {
            if let Ok(parsed) = ttl.parse() {
                config.token_ttl_minutes = parsed;
            }
        }

        if let Ok(limit) = std::env::var("DECANAT_SERVER_MAX_UPLOAD_BYTES") {
            if let Ok(parsed) = limit.parse() {
                config.max_upload_bytes = parsed;
            }
        }

        if !config.is_localhost() {
            tracing::warn!(
                "Stub server binding to {} - it serves demo accounts only",
                config.bind_addr
            );
        }

        config
    }

    /// Fixed secret and ephemeral port, for tests
    pub fn for_tests() -> Self {
        Self {
            port: 0,
            log_requests: false,
            jwt_secret: "test-secret-at-least-32-characters-long".to_string(),
            ..Default::default()
        }
    }

    /// Check if bound to localhost only
    pub fn is_localhost(&self) -> bool {
        match self.bind_addr {
            IpAddr::V4(addr) => addr.is_loopback(),
            IpAddr::V6(addr) => addr.is_loopback(),
        }
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind_addr, self.port)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}:{}", self.bind_addr, self.port)
    }
}

fn random_secret() -> String {
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";
    (0..64)
        .map(|_| CHARSET[rand::random::<usize>() % CHARSET.len()] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_localhost() {
        let config = ServerConfig::default();
        assert!(config.is_localhost());
        assert_eq!(config.port, 8080);
        assert_eq!(config.token_ttl_minutes, 720);
        assert_eq!(config.jwt_secret.len(), 64);
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    fn test_socket_addr_and_base_url() {
        let config = ServerConfig::default();
        assert!(config.socket_addr().ip().is_loopback());
        assert_eq!(config.base_url(), "http://127.0.0.1:8080");
    }

    #[test]
    fn test_random_secrets_differ() {
        assert_ne!(random_secret(), random_secret());
    }
}
