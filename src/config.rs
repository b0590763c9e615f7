use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct AxonConfig {
    pub logging: LoggingConfig,
    pub storage: StorageConfig,
    pub retrieval: RetrievalConfig,
    pub persona: PersonaConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LoggingConfig {
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct StorageConfig {
    pub db_path: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct RetrievalConfig {
    /// Result cap for unscoped knowledge queries.
    pub max_results: usize,
    /// Result cap for kind-scoped knowledge queries.
    pub scoped_max_results: usize,
    /// Bound on the request-path knowledge query; on expiry the engine
    /// degrades to an empty result set.
    pub query_timeout_ms: u64,
    /// Bound on the fire-and-forget conversation audit write.
    pub audit_timeout_ms: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PersonaConfig {
    pub assistant_name: String,
    pub brand: String,
}

impl Default for AxonConfig {
    fn default() -> Self {
        Self {
            logging: LoggingConfig::default(),
            storage: StorageConfig::default(),
            retrieval: RetrievalConfig::default(),
            persona: PersonaConfig::default(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            log_level: "info".into(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        let db_path = default_axon_dir()
            .join("axon.db")
            .to_string_lossy()
            .into_owned();
        Self { db_path }
    }
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_results: 10,
            scoped_max_results: 5,
            query_timeout_ms: 2000,
            audit_timeout_ms: 2000,
        }
    }
}

impl Default for PersonaConfig {
    fn default() -> Self {
        Self {
            assistant_name: "Axon".into(),
            brand: "Lumina".into(),
        }
    }
}

/// Returns `~/.axon/`
pub fn default_axon_dir() -> PathBuf {
    dirs::home_dir()
        .expect("home directory must exist")
        .join(".axon")
}

/// Returns the default config file path: `~/.axon/config.toml`
pub fn default_config_path() -> PathBuf {
    default_axon_dir().join("config.toml")
}

impl AxonConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path())
    }

    /// Load from a specific path, then apply env var overrides.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            AxonConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides (AXON_DB, AXON_LOG_LEVEL).
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("AXON_DB") {
            self.storage.db_path = val;
        }
        if let Ok(val) = std::env::var("AXON_LOG_LEVEL") {
            self.logging.log_level = val;
        }
    }

    /// Resolve the database path, expanding `~` if needed.
    pub fn resolved_db_path(&self) -> PathBuf {
        expand_tilde(&self.storage.db_path)
    }
}

pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        dirs::home_dir()
            .expect("home directory must exist")
            .join(rest)
    } else {
        PathBuf::from(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = AxonConfig::default();
        assert_eq!(config.logging.log_level, "info");
        assert_eq!(config.retrieval.max_results, 10);
        assert_eq!(config.retrieval.scoped_max_results, 5);
        assert_eq!(config.persona.brand, "Lumina");
        assert!(config.storage.db_path.ends_with("axon.db"));
    }

    #[test]
    fn parse_toml_config() {
        let toml_str = r#"
[logging]
log_level = "debug"

[storage]
db_path = "/tmp/test.db"

[retrieval]
max_results = 20

[persona]
assistant_name = "Iris"
"#;
        let config: AxonConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.logging.log_level, "debug");
        assert_eq!(config.storage.db_path, "/tmp/test.db");
        assert_eq!(config.retrieval.max_results, 20);
        assert_eq!(config.persona.assistant_name, "Iris");
        // defaults still apply for unset fields
        assert_eq!(config.retrieval.query_timeout_ms, 2000);
        assert_eq!(config.persona.brand, "Lumina");
    }

    #[test]
    fn env_overrides_apply() {
        let mut config = AxonConfig::default();
        std::env::set_var("AXON_DB", "/tmp/override.db");
        std::env::set_var("AXON_LOG_LEVEL", "trace");

        config.apply_env_overrides();

        assert_eq!(config.storage.db_path, "/tmp/override.db");
        assert_eq!(config.logging.log_level, "trace");

        // Clean up
        std::env::remove_var("AXON_DB");
        std::env::remove_var("AXON_LOG_LEVEL");
    }
}
