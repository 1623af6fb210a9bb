use std::path::PathBuf;

use anyhow::{anyhow, Result};
use serde::Deserialize;

pub const DEFAULT_SNAPSHOT_FILE: &str = "queue_state.json";

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub queue_storage: QueueStorageConfig,
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

fn default_host() -> String { "127.0.0.1".into() }
fn default_port() -> u16 { 8080 }

#[derive(Debug, Clone, Deserialize, Default)]
pub struct QueueStorageConfig {
    /// Snapshot location; relative paths resolve against the working directory.
    #[serde(default)]
    pub file_path: Option<PathBuf>,
}

impl QueueStorageConfig {
    pub fn resolved_path(&self) -> PathBuf {
        self.file_path.clone().unwrap_or_else(|| PathBuf::from(DEFAULT_SNAPSHOT_FILE))
    }
}

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    load_from_str(&content)
}

pub fn load_from_str(content: &str) -> Result<AppConfig> {
    let cfg: AppConfig = toml::from_str(content)?;
    Ok(cfg)
}

impl AppConfig {
    /// Read `config.toml` (or `CONFIG_PATH`) if present, apply environment
    /// overrides and validate. A missing file means defaults.
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = match load_default() {
            Ok(cfg) => cfg,
            Err(e) if is_not_found(&e) => AppConfig::default(),
            Err(e) => return Err(e),
        };
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.apply_env(|key| std::env::var(key).ok());
        self.server.normalize()?;
        self.queue_storage.normalize();
        Ok(())
    }

    /// Environment values win over file values.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("SERVER_HOST") {
            self.server.host = host;
        }
        if let Some(port) = lookup("SERVER_PORT").and_then(|p| p.parse::<u16>().ok()) {
            self.server.port = port;
        }
        if let Some(w) = lookup("TOKIO_WORKER_THREADS").and_then(|v| v.parse::<usize>().ok()) {
            self.server.worker_threads = Some(w);
        }
        if let Some(path) = lookup("QUEUE_STORAGE_FILE_PATH") {
            self.queue_storage.file_path = Some(PathBuf::from(path));
        }
    }
}

fn is_not_found(e: &anyhow::Error) -> bool {
    e.downcast_ref::<std::io::Error>()
        .map(|io| io.kind() == std::io::ErrorKind::NotFound)
        .unwrap_or(false)
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = default_host();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if let Some(w) = self.worker_threads {
            if w == 0 { self.worker_threads = Some(4); }
        } else {
            self.worker_threads = Some(4);
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl QueueStorageConfig {
    fn normalize(&mut self) {
        if self.file_path.as_ref().is_some_and(|p| p.as_os_str().is_empty()) {
            self.file_path = None;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_document_uses_defaults() -> Result<()> {
        let cfg = load_from_str("")?;
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.queue_storage.resolved_path(), PathBuf::from("queue_state.json"));
        Ok(())
    }

    #[test]
    fn file_values_are_read() -> Result<()> {
        let cfg = load_from_str(
            r#"
            [server]
            host = "0.0.0.0"
            port = 3001

            [queue_storage]
            file_path = "data/queue.json"
            "#,
        )?;
        assert_eq!(cfg.server.bind_addr(), "0.0.0.0:3001");
        assert_eq!(cfg.queue_storage.resolved_path(), PathBuf::from("data/queue.json"));
        Ok(())
    }

    #[test]
    fn env_overrides_file() -> Result<()> {
        let mut cfg = load_from_str("[queue_storage]\nfile_path = \"from-file.json\"\n")?;
        let env: HashMap<&str, &str> = HashMap::from([
            ("QUEUE_STORAGE_FILE_PATH", "/var/lib/queue/state.json"),
            ("SERVER_PORT", "9090"),
            ("TOKIO_WORKER_THREADS", "not-a-number"),
        ]);
        cfg.apply_env(|k| env.get(k).map(|v| v.to_string()));
        cfg.server.normalize()?;
        cfg.queue_storage.normalize();

        assert_eq!(cfg.queue_storage.resolved_path(), PathBuf::from("/var/lib/queue/state.json"));
        assert_eq!(cfg.server.port, 9090);
        assert_eq!(cfg.server.worker_threads, Some(4));
        Ok(())
    }

    #[test]
    fn blank_values_fall_back() -> Result<()> {
        let mut cfg = load_from_str("[server]\nhost = \"  \"\nworker_threads = 0\n[queue_storage]\nfile_path = \"\"\n")?;
        cfg.server.normalize()?;
        cfg.queue_storage.normalize();
        assert_eq!(cfg.server.host, "127.0.0.1");
        assert_eq!(cfg.server.worker_threads, Some(4));
        assert_eq!(cfg.queue_storage.resolved_path(), PathBuf::from(DEFAULT_SNAPSHOT_FILE));

        let mut zero = load_from_str("[server]\nport = 0\n")?;
        assert!(zero.server.normalize().is_err());
        Ok(())
    }

    #[test]
    fn missing_file_is_recognised() {
        let err = load_from_file("/nonexistent/queue-config.toml").unwrap_err();
        assert!(is_not_found(&err));
    }
}
