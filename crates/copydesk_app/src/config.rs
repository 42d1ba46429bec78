use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use copydesk_engine::{ClientProfile, GeneratorSettings, QueueSettings};
use copydesk_logging::{desk_info, desk_warn};
use serde::{Deserialize, Serialize};

pub const API_KEY_VAR: &str = "ANTHROPIC_API_KEY";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config {path:?}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub store_dir: PathBuf,
    pub model: String,
    pub max_tokens: u32,
    pub temperature: f32,
    pub request_timeout_secs: u64,
    /// `None` disables the per-task timeout.
    pub task_timeout_secs: Option<u64>,
    pub clients: Vec<ClientProfile>,
}

impl Default for AppConfig {
    fn default() -> Self {
        let generator = GeneratorSettings::default();
        Self {
            store_dir: PathBuf::from("./articles"),
            model: generator.model,
            max_tokens: generator.max_tokens,
            temperature: generator.temperature,
            request_timeout_secs: generator.request_timeout.as_secs(),
            task_timeout_secs: QueueSettings::default()
                .task_timeout
                .map(|limit| limit.as_secs()),
            clients: Vec::new(),
        }
    }
}

impl AppConfig {
    /// Reads a RON config file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                desk_warn!("Config file {:?} not found; using defaults", path);
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        let config: Self = ron::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        desk_info!(
            "Loaded config from {:?} ({} client(s))",
            path,
            config.clients.len()
        );
        Ok(config)
    }

    pub fn generator_settings(&self, api_key: Option<String>) -> GeneratorSettings {
        GeneratorSettings {
            api_key,
            model: self.model.clone(),
            max_tokens: self.max_tokens,
            temperature: self.temperature,
            request_timeout: self.request_timeout(),
            ..GeneratorSettings::default()
        }
    }

    pub fn queue_settings(&self) -> QueueSettings {
        QueueSettings {
            task_timeout: self.task_timeout_secs.map(Duration::from_secs),
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Finds a client by id, or by name ignoring case.
    pub fn find_client(&self, key: &str) -> Option<&ClientProfile> {
        self.clients
            .iter()
            .find(|client| client.id == key)
            .or_else(|| {
                self.clients
                    .iter()
                    .find(|client| client.name.eq_ignore_ascii_case(key))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, ConfigError};
    use std::fs;
    use std::time::Duration;
    use tempfile::TempDir;

    #[test]
    fn missing_file_uses_defaults() {
        let dir = TempDir::new().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.ron")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.max_tokens, 8192);
        assert_eq!(config.queue_settings().task_timeout, Some(Duration::from_secs(300)));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("copydesk.ron");
        fs::write(
            &path,
            r#"(
                store_dir: "out",
                task_timeout_secs: None,
                clients: [
                    (id: "c1", name: "Acme", wp_url: Some("https://acme.test")),
                ],
            )"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.store_dir.to_str(), Some("out"));
        assert_eq!(config.temperature, 0.5);
        assert_eq!(config.queue_settings().task_timeout, None);
        assert_eq!(config.find_client("acme").map(|c| c.id.as_str()), Some("c1"));
        assert_eq!(config.find_client("c1").map(|c| c.name.as_str()), Some("Acme"));
        assert!(config.find_client("other").is_none());
    }

    #[test]
    fn malformed_file_is_an_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.ron");
        fs::write(&path, "(store_dir: ").unwrap();
        assert!(matches!(
            AppConfig::load(&path),
            Err(ConfigError::Parse { .. })
        ));
    }
}
