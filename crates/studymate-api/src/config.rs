//! Server configuration from the environment.

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::http::HeaderValue;

use studymate_core::defaults::{
    CORS_ALLOWED_ORIGINS, MAX_UPLOAD_BYTES, SERVER_HOST, SERVER_PORT, UPLOAD_DIR,
};
use studymate_core::{Error, Result};

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Root of the local blob store.
    pub upload_dir: PathBuf,
    pub max_upload_bytes: usize,
    pub cors_origins: Vec<HeaderValue>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: SERVER_HOST.to_string(),
            port: SERVER_PORT,
            upload_dir: PathBuf::from(UPLOAD_DIR),
            max_upload_bytes: MAX_UPLOAD_BYTES,
            cors_origins: parse_origins(CORS_ALLOWED_ORIGINS),
        }
    }
}

impl ServerConfig {
    /// Read `STUDYMATE_HOST`, `STUDYMATE_PORT`, `STUDYMATE_UPLOAD_DIR`,
    /// `STUDYMATE_MAX_UPLOAD_BYTES` and `CORS_ALLOWED_ORIGINS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            host: std::env::var("STUDYMATE_HOST").unwrap_or(defaults.host),
            port: std::env::var("STUDYMATE_PORT")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.port),
            upload_dir: std::env::var("STUDYMATE_UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            max_upload_bytes: std::env::var("STUDYMATE_MAX_UPLOAD_BYTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_upload_bytes),
            cors_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                .ok()
                .filter(|s| !s.trim().is_empty())
                .map(|s| parse_origins(&s))
                .unwrap_or(defaults.cors_origins),
        }
    }

    pub fn addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|e| Error::Config(format!("Invalid bind address: {}", e)))
    }
}

/// Parse a comma-separated origin list, skipping invalid entries.
fn parse_origins(origins: &str) -> Vec<HeaderValue> {
    origins
        .split(',')
        .filter_map(|s| {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                return None;
            }
            match trimmed.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(e) => {
                    tracing::warn!("Invalid CORS origin '{}': {}", trimmed, e);
                    None
                }
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 3000);
        assert_eq!(config.addr().unwrap().to_string(), "127.0.0.1:3000");
        assert_eq!(config.cors_origins.len(), 2);
    }

    #[test]
    fn test_parse_origins_skips_blanks_and_invalid() {
        let origins = parse_origins(" https://a.example , ,bad\norigin,http://b.example");
        assert_eq!(
            origins,
            vec![
                HeaderValue::from_static("https://a.example"),
                HeaderValue::from_static("http://b.example"),
            ]
        );
    }

    #[test]
    fn test_invalid_host() {
        let config = ServerConfig {
            host: "not a host".to_string(),
            ..Default::default()
        };
        assert!(matches!(config.addr(), Err(Error::Config(_))));
    }
}
