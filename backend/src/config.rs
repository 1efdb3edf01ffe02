use crate::error::ConfigError;
use common::model::batch::DEFAULT_CHUNK;
use std::str::FromStr;

/// Server configuration loaded from environment variables.
///
/// All fields have defaults suitable for running locally.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `127.0.0.1`).
    pub host: String,
    /// Bind port (default: `8080`).
    pub port: u16,
    /// Largest accepted upload body, in bytes (default: 10 MiB).
    pub max_upload_bytes: usize,
    /// Progress chunk used when a request carries no render options (default: `250`).
    pub default_chunk: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8080,
            max_upload_bytes: 10 * 1024 * 1024,
            default_chunk: DEFAULT_CHUNK,
        }
    }
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var            | Default     |
    /// |--------------------|-------------|
    /// | `HOST`             | `127.0.0.1` |
    /// | `PORT`             | `8080`      |
    /// | `MAX_UPLOAD_BYTES` | `10485760`  |
    /// | `DEFAULT_CHUNK`    | `250`       |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = ServerConfig::default();
        Ok(ServerConfig {
            host: lookup("HOST").unwrap_or(defaults.host),
            port: parse_var(&lookup, "PORT", "u16", defaults.port)?,
            max_upload_bytes: parse_var(
                &lookup,
                "MAX_UPLOAD_BYTES",
                "byte count",
                defaults.max_upload_bytes,
            )?,
            default_chunk: parse_var(&lookup, "DEFAULT_CHUNK", "u32", defaults.default_chunk)?,
        })
    }
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    expected: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            name,
            expected,
            value,
        }),
    }
}
