use std::io::ErrorKind;

use anyhow::anyhow;
use anyhow::Context;
use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: default_host(), port: default_port(), worker_threads: Some(4) }
    }
}

/// Where the two collections and the static page live.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_data_dir")]
    pub data_dir: String,
    #[serde(default = "default_users_file")]
    pub users_file: String,
    #[serde(default = "default_comments_file")]
    pub comments_file: String,
    #[serde(default = "default_public_dir")]
    pub public_dir: String,
    /// Hold a per-collection lock across load/mutate/save.
    #[serde(default)]
    pub serialize_writes: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            users_file: default_users_file(),
            comments_file: default_comments_file(),
            public_dir: default_public_dir(),
            serialize_writes: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// `compact` or `json`
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self { Self { format: default_log_format() } }
}

fn default_host() -> String { "0.0.0.0".into() }
fn default_port() -> u16 { 3000 }
fn default_data_dir() -> String { ".".into() }
fn default_users_file() -> String { "users.json".into() }
fn default_comments_file() -> String { "comments.json".into() }
fn default_public_dir() -> String { "public".into() }
fn default_log_format() -> String { "compact".into() }

fn config_path() -> String {
    std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string())
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    parse(&content)
}

pub fn parse(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Config file when present, otherwise defaults overridden by env vars.
    pub fn load_and_validate() -> Result<Self> {
        Self::load_and_validate_from(&config_path())
    }

    /// Only a missing file falls back to the environment; an unreadable or
    /// malformed file is an error.
    pub fn load_and_validate_from(path: &str) -> Result<Self> {
        let mut cfg = match std::fs::read_to_string(path) {
            Ok(content) => parse(&content).with_context(|| format!("invalid config file {path}"))?,
            Err(e) if e.kind() == ErrorKind::NotFound => Self::from_env(),
            Err(e) => return Err(anyhow!(e).context(format!("cannot read config file {path}"))),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    /// Defaults overridden by `SERVER_HOST`, `SERVER_PORT`, `DATA_DIR`,
    /// `PUBLIC_DIR` and `LOG_FORMAT`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();
        if let Some(host) = lookup("SERVER_HOST") { cfg.server.host = host; }
        if let Some(port) = lookup("SERVER_PORT").and_then(|p| p.parse::<u16>().ok()) {
            cfg.server.port = port;
        }
        if let Some(threads) = lookup("TOKIO_WORKER_THREADS").and_then(|v| v.parse::<usize>().ok()) {
            cfg.server.worker_threads = Some(threads);
        }
        if let Some(dir) = lookup("DATA_DIR") { cfg.storage.data_dir = dir; }
        if let Some(dir) = lookup("PUBLIC_DIR") { cfg.storage.public_dir = dir; }
        if let Some(format) = lookup("LOG_FORMAT") { cfg.logging.format = format; }
        cfg
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        self.storage.normalize_and_validate()?;
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        match self.worker_threads {
            Some(0) | None => self.worker_threads = Some(4),
            Some(_) => {}
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl StorageConfig {
    fn normalize_and_validate(&mut self) -> Result<()> {
        if self.data_dir.trim().is_empty() {
            self.data_dir = default_data_dir();
        }
        if self.public_dir.trim().is_empty() {
            self.public_dir = default_public_dir();
        }
        if self.users_file.trim().is_empty() || self.comments_file.trim().is_empty() {
            return Err(anyhow!("storage.users_file and storage.comments_file must not be empty"));
        }
        if self.users_file == self.comments_file {
            return Err(anyhow!("users and comments cannot share one file: {}", self.users_file));
        }
        Ok(())
    }

    pub fn users_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.data_dir).join(&self.users_file)
    }

    pub fn comments_path(&self) -> std::path::PathBuf {
        std::path::Path::new(&self.data_dir).join(&self.comments_file)
    }
}
