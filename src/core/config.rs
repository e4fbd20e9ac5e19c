//! Layered configuration
//!
//! Settings are merged in order of increasing precedence:
//! 1. Built-in defaults
//! 2. User config (`<config dir>/shopfloor/config.yaml`)
//! 3. Workshop config (`.shopfloor/config.yaml`)
//! 4. Environment (`SHOPFLOOR_DB`)

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::core::workshop::Workshop;

/// Record store settings
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Database file, relative to the workshop root (default: .shopfloor/shop.db)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,

    /// How long a connection waits for the write lock before reporting busy
    pub busy_timeout_ms: u64,

    /// Extra attempts for a transaction that hit a lock conflict
    pub max_retries: u32,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: None,
            busy_timeout_ms: 5_000,
            max_retries: 3,
        }
    }
}

/// Purchasing defaults
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PurchasingConfig {
    /// Lead time used when an order names no known supplier
    pub default_eta_days: u32,
}

/// Logging settings
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Emit log lines as JSON
    pub json: bool,

    /// Default filter directive (e.g. "info", "shopfloor=debug")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
}

/// Effective configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub store: StoreConfig,

    pub purchasing: PurchasingConfig,

    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration for the current directory's workshop (if any)
    pub fn load() -> Self {
        match Workshop::discover() {
            Ok(workshop) => Self::load_for(&workshop),
            Err(_) => Self::from_layers(&[user_config_path()]),
        }
    }

    /// Load configuration for a specific workshop
    pub fn load_for(workshop: &Workshop) -> Self {
        Self::from_layers(&[user_config_path(), Some(workshop.config_path())])
    }

    fn from_layers(paths: &[Option<PathBuf>]) -> Self {
        let mut merged = serde_yml::Value::Mapping(serde_yml::Mapping::new());
        for path in paths.iter().flatten() {
            if let Some(layer) = read_layer(path) {
                merge_values(&mut merged, layer);
            }
        }

        let mut config: Config = serde_yml::from_value(merged).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Ignoring invalid configuration, using defaults");
            Config::default()
        });
        config.apply_env();
        config
    }

    fn apply_env(&mut self) {
        if let Ok(db) = std::env::var("SHOPFLOOR_DB") {
            if !db.trim().is_empty() {
                self.store.path = Some(PathBuf::from(db));
            }
        }
    }

    /// Resolve the database path for a workshop
    pub fn db_path(&self, workshop: &Workshop) -> PathBuf {
        match &self.store.path {
            Some(path) if path.is_absolute() => path.clone(),
            Some(path) => workshop.root().join(path),
            None => workshop.default_db_path(),
        }
    }
}

fn user_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "shopfloor").map(|dirs| dirs.config_dir().join("config.yaml"))
}

fn read_layer(path: &Path) -> Option<serde_yml::Value> {
    let contents = std::fs::read_to_string(path).ok()?;
    match serde_yml::from_str::<serde_yml::Value>(&contents) {
        Ok(serde_yml::Value::Null) => None,
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable config file");
            None
        }
    }
}

/// Deep-merge `overlay` into `base`; mappings merge key by key, everything else replaces
fn merge_values(base: &mut serde_yml::Value, overlay: serde_yml::Value) {
    match (base, overlay) {
        (serde_yml::Value::Mapping(base_map), serde_yml::Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.store.busy_timeout_ms, 5_000);
        assert_eq!(config.store.max_retries, 3);
        assert_eq!(config.purchasing.default_eta_days, 0);
        assert!(!config.logging.json);
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
store:
  max_retries: 7
purchasing:
  default_eta_days: 3
"#;
        let config: Config = serde_yml::from_str(yaml).unwrap();
        assert_eq!(config.store.max_retries, 7);
        assert_eq!(config.store.busy_timeout_ms, 5_000);
        assert_eq!(config.purchasing.default_eta_days, 3);
    }

    #[test]
    fn test_later_layers_override_earlier() {
        let tmp = tempdir().unwrap();
        let user = tmp.path().join("user.yaml");
        let local = tmp.path().join("local.yaml");
        std::fs::write(&user, "store:\n  max_retries: 5\n").unwrap();
        std::fs::write(&local, "store:\n  busy_timeout_ms: 100\n").unwrap();

        let config = Config::from_layers(&[Some(user), Some(local)]);
        assert_eq!(config.store.max_retries, 5);
        assert_eq!(config.store.busy_timeout_ms, 100);
    }

    #[test]
    fn test_missing_layers_are_skipped() {
        let tmp = tempdir().unwrap();
        let config = Config::from_layers(&[None, Some(tmp.path().join("absent.yaml"))]);
        assert_eq!(config.store, StoreConfig::default());
    }

    #[test]
    fn test_db_path_resolution() {
        let tmp = tempdir().unwrap();
        let workshop = Workshop::init(tmp.path()).unwrap();

        let mut config = Config::default();
        assert_eq!(config.db_path(&workshop), workshop.default_db_path());

        config.store.path = Some(PathBuf::from("data/other.db"));
        assert_eq!(config.db_path(&workshop), workshop.root().join("data/other.db"));
    }
}
