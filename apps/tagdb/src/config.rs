//! # Configuration
//!
//! Process configuration, resolved in this order (later wins):
//!
//! 1. Compiled-in defaults
//! 2. TOML file (`--config <path>` or `TAGDB_CONFIG`)
//! 3. Environment variables (`TAGDB_*`)
//! 4. CLI flags (applied by the command that uses them)
//!
//! Unknown keys in the file are rejected. The HTTP API key is read from
//! `TAGDB_API_KEY` only and is never written back out.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tagdb_core::TagDbError;
use tagdb_core::primitives::{DEFAULT_OWNER, MAX_QUERY_LENGTH};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "TAGDB_CONFIG";

/// Environment variable holding the HTTP API key.
pub const API_KEY_ENV: &str = "TAGDB_API_KEY";

/// Default TCP line server port.
pub const DEFAULT_PORT: u16 = 8081;

/// Default HTTP API port.
pub const DEFAULT_HTTP_PORT: u16 = 8080;

/// Default bind address for both transports.
pub const DEFAULT_HOST: &str = "127.0.0.1";

// =============================================================================
// SECTIONS
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    pub owner: String,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            owner: DEFAULT_OWNER.to_string(),
        }
    }
}

/// TCP line transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Send a greeting when a client connects.
    pub welcome: bool,
    /// Honour `termServer();` from clients.
    pub allow_remote_shutdown: bool,
    /// Longest accepted query line, in bytes.
    pub max_query_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            welcome: false,
            allow_remote_shutdown: false,
            max_query_bytes: MAX_QUERY_LENGTH,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    pub host: String,
    pub port: u16,
    /// Requests per second; 0 disables rate limiting.
    pub rate_limit: u32,
    /// Comma-separated allowed origins, `*` for any, empty for localhost only.
    pub cors_origins: String,
    #[serde(skip)]
    pub api_key: Option<String>,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_HTTP_PORT,
            rate_limit: 100,
            cors_origins: String::new(),
            api_key: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LogConfig {
    /// `text` or `json`.
    pub format: String,
    /// `EnvFilter` directives, overridden by `RUST_LOG`.
    pub filter: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: "text".to_string(),
            filter: "tagdb=info,tower_http=debug".to_string(),
        }
    }
}

// =============================================================================
// CONFIG
// =============================================================================

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub store: StoreConfig,
    pub server: ServerConfig,
    pub http: HttpConfig,
    pub log: LogConfig,
}

impl Config {
    /// Parse a TOML document. Missing keys take their defaults.
    pub fn from_toml_str(text: &str) -> Result<Self, TagDbError> {
        toml::from_str(text).map_err(|e| TagDbError::ConfigError(e.to_string()))
    }

    /// Read and parse a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, TagDbError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            TagDbError::ConfigError(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        Self::from_toml_str(&text)
    }

    /// Resolve the full configuration from the process environment.
    pub fn load(path: Option<&Path>) -> Result<Self, TagDbError> {
        Self::load_with(path, |name| std::env::var(name).ok())
    }

    /// Resolve the configuration using `lookup` in place of the environment.
    pub fn load_with<F>(path: Option<&Path>, lookup: F) -> Result<Self, TagDbError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let file = path
            .map(Path::to_path_buf)
            .or_else(|| lookup(CONFIG_ENV).map(PathBuf::from));

        let mut config = match file {
            Some(file) => Self::from_file(&file)?,
            None => Self::default(),
        };
        config.apply_env(lookup)?;
        Ok(config)
    }

    /// Overlay `TAGDB_*` variables. Empty values are ignored.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), TagDbError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        if let Some(owner) = get("TAGDB_OWNER") {
            self.store.owner = owner;
        }
        if let Some(host) = get("TAGDB_HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("TAGDB_PORT") {
            self.server.port = parse_env("TAGDB_PORT", &port)?;
        }
        if let Some(host) = get("TAGDB_HTTP_HOST") {
            self.http.host = host;
        }
        if let Some(port) = get("TAGDB_HTTP_PORT") {
            self.http.port = parse_env("TAGDB_HTTP_PORT", &port)?;
        }
        if let Some(limit) = get("TAGDB_RATE_LIMIT") {
            self.http.rate_limit = parse_env("TAGDB_RATE_LIMIT", &limit)?;
        }
        if let Some(origins) = get("TAGDB_CORS_ORIGINS") {
            self.http.cors_origins = origins;
        }
        if let Some(format) = get("TAGDB_LOG_FORMAT") {
            self.log.format = format;
        }
        self.http.api_key = get(API_KEY_ENV);
        Ok(())
    }

    /// Address of the TCP line server.
    #[must_use]
    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Address of the HTTP API.
    #[must_use]
    pub fn http_addr(&self) -> String {
        format!("{}:{}", self.http.host, self.http.port)
    }
}

fn parse_env<T>(name: &str, value: &str) -> Result<T, TagDbError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| TagDbError::ConfigError(format!("{}='{}': {}", name, value, e)))
}
