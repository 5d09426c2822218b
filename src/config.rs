//! Server configuration: a TOML file plus environment overrides.
//!
//! Every section is optional; a missing file means all defaults. Environment
//! variables (`HOST`, `PORT`, `DB_PATH`, `JWT_SECRET`, `LOG_FORMAT`) win over
//! the file.

use crate::auth::AuthConfig;
use crate::logging::LogFormat;
use anyhow::{anyhow, Context};
use serde::Deserialize;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Origins the salon front-end is served from.
pub const DEFAULT_ALLOWED_ORIGINS: [&str; 3] = [
    "https://luxe-beauty-salon.vercel.app",
    "http://localhost:3000",
    "http://localhost:3001",
];

/// Top-level configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    /// Listener settings.
    #[serde(default)]
    pub server: ServerConfig,
    /// Backing file settings.
    #[serde(default)]
    pub store: StoreConfig,
    /// Password and token settings.
    #[serde(default)]
    pub auth: AuthSection,
    /// Cross-origin settings.
    #[serde(default)]
    pub cors: CorsConfig,
    /// Log output settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// `[server]`
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bind host.
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port.
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// `[store]`
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Path of the JSON document.
    #[serde(default = "default_store_path")]
    pub path: PathBuf,
    /// Indent the file (2 spaces).
    #[serde(default = "default_true")]
    pub pretty: bool,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: default_store_path(),
            pretty: true,
        }
    }
}

/// `[auth]`
#[derive(Debug, Clone, Deserialize)]
pub struct AuthSection {
    /// Hash passwords on registration.
    #[serde(default = "default_true")]
    pub hash_passwords: bool,
    /// HS256 secret; placeholder tokens when unset.
    #[serde(default)]
    pub jwt_secret: Option<String>,
    /// JWT lifetime.
    #[serde(default = "default_ttl")]
    pub token_ttl_hours: i64,
}

impl Default for AuthSection {
    fn default() -> Self {
        Self {
            hash_passwords: true,
            jwt_secret: None,
            token_ttl_hours: default_ttl(),
        }
    }
}

impl From<&AuthSection> for AuthConfig {
    fn from(s: &AuthSection) -> Self {
        AuthConfig {
            hash_passwords: s.hash_passwords,
            jwt_secret: s.jwt_secret.clone(),
            token_ttl_hours: s.token_ttl_hours,
        }
    }
}

/// `[cors]`
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    /// Allowed origins. Empty or containing `"*"` means any origin.
    #[serde(default = "default_origins")]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: default_origins(),
        }
    }
}

/// `[logging]`
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LoggingConfig {
    /// `compact` or `json`.
    #[serde(default)]
    pub format: LogFormat,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    5000
}
fn default_store_path() -> PathBuf {
    PathBuf::from("db.json")
}
fn default_true() -> bool {
    true
}
fn default_ttl() -> i64 {
    12
}
fn default_origins() -> Vec<String> {
    DEFAULT_ALLOWED_ORIGINS.iter().map(|s| s.to_string()).collect()
}

/// Load `.env`, then `CONFIG_PATH` (or `config.toml`), then env overrides,
/// then validate.
pub fn load_default() -> anyhow::Result<AppConfig> {
    dotenvy::dotenv().ok();
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    let mut cfg = match std::fs::read_to_string(&path) {
        Ok(content) => parse(&content).with_context(|| format!("invalid config file {path}"))?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => AppConfig::default(),
        Err(e) => return Err(e).with_context(|| format!("cannot read config file {path}")),
    };
    cfg.apply_env(|key| std::env::var(key).ok())?;
    cfg.normalize_and_validate()?;
    Ok(cfg)
}

/// Parse a TOML config document.
pub fn parse(content: &str) -> anyhow::Result<AppConfig> {
    Ok(toml::from_str(content)?)
}

impl AppConfig {
    /// Apply overrides from an environment lookup.
    pub fn apply_env<F>(&mut self, var: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = var("HOST") {
            self.server.host = host;
        }
        if let Some(port) = var("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .map_err(|_| anyhow!("PORT must be a number in 1..=65535, got {port:?}"))?;
        }
        if let Some(path) = var("DB_PATH") {
            self.store.path = PathBuf::from(path);
        }
        if let Some(secret) = var("JWT_SECRET") {
            self.auth.jwt_secret = Some(secret);
        }
        if let Some(format) = var("LOG_FORMAT") {
            self.logging.format = format.parse()?;
        }
        Ok(())
    }

    /// Fill blanks with defaults and reject unusable values.
    pub fn normalize_and_validate(&mut self) -> anyhow::Result<()> {
        if self.server.host.trim().is_empty() {
            self.server.host = default_host();
        }
        if self.server.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if self.store.path.as_os_str().is_empty() {
            return Err(anyhow!("store.path must not be empty"));
        }
        if self.auth.jwt_secret.as_deref().is_some_and(|s| s.trim().is_empty()) {
            self.auth.jwt_secret = None;
        }
        if self.auth.token_ttl_hours <= 0 {
            return Err(anyhow!("auth.token_ttl_hours must be positive"));
        }
        Ok(())
    }

    /// Socket address to listen on.
    pub fn bind_addr(&self) -> anyhow::Result<SocketAddr> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse()
            .with_context(|| format!("invalid bind address {addr}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_file_gives_defaults() {
        let mut cfg = parse("").unwrap();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.server.port, 5000);
        assert_eq!(cfg.store.path, PathBuf::from("db.json"));
        assert!(cfg.store.pretty);
        assert!(cfg.auth.hash_passwords);
        assert_eq!(cfg.cors.allowed_origins.len(), 3);
        assert_eq!(cfg.logging.format, LogFormat::Compact);
    }

    #[test]
    fn file_sections_are_read() {
        let cfg = parse(
            r#"
            [server]
            host = "127.0.0.1"
            port = 8080

            [store]
            path = "data/salon.json"
            pretty = false

            [auth]
            jwt_secret = "s"
            token_ttl_hours = 2

            [cors]
            allowed_origins = ["*"]

            [logging]
            format = "json"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.bind_addr().unwrap().to_string(), "127.0.0.1:8080");
        assert_eq!(cfg.store.path, PathBuf::from("data/salon.json"));
        assert!(!cfg.store.pretty);
        assert_eq!(cfg.auth.jwt_secret.as_deref(), Some("s"));
        assert_eq!(cfg.auth.token_ttl_hours, 2);
        assert_eq!(cfg.cors.allowed_origins, vec!["*".to_string()]);
        assert_eq!(cfg.logging.format, LogFormat::Json);
    }

    #[test]
    fn env_overrides_file() {
        let env: HashMap<&str, &str> = [
            ("PORT", "7000"),
            ("DB_PATH", "/tmp/x.json"),
            ("JWT_SECRET", "k"),
            ("LOG_FORMAT", "json"),
        ]
        .into_iter()
        .collect();
        let mut cfg = AppConfig::default();
        cfg.apply_env(|k| env.get(k).map(|v| v.to_string())).unwrap();
        assert_eq!(cfg.server.port, 7000);
        assert_eq!(cfg.store.path, PathBuf::from("/tmp/x.json"));
        assert_eq!(cfg.auth.jwt_secret.as_deref(), Some("k"));
        assert_eq!(cfg.logging.format, LogFormat::Json);
    }

    #[test]
    fn bad_port_is_rejected() {
        let mut cfg = AppConfig::default();
        assert!(cfg.apply_env(|k| (k == "PORT").then(|| "http".to_string())).is_err());
        cfg.server.port = 0;
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn blank_secret_means_placeholder_tokens() {
        let mut cfg = AppConfig::default();
        cfg.auth.jwt_secret = Some("  ".into());
        cfg.normalize_and_validate().unwrap();
        assert!(cfg.auth.jwt_secret.is_none());
    }
}
