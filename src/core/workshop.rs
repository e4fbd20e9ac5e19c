//! Workshop discovery and initialization
//!
//! A workshop is any directory containing a `.shopfloor/` folder, which holds
//! the record store and the workshop-level config.

use std::fs;
use std::path::{Path, PathBuf};

use miette::Diagnostic;
use thiserror::Error;

use crate::core::config::Config;
use crate::core::store::{Store, StoreError};

/// Workshop metadata directory
pub const WORKSHOP_DIR: &str = ".shopfloor";

const DEFAULT_DB_FILE: &str = "shop.db";

const DEFAULT_CONFIG: &str = r#"# Shopfloor workshop configuration

store:
  busy_timeout_ms: 5000
  max_retries: 3

purchasing:
  default_eta_days: 0
"#;

const GITIGNORE: &str = "shop.db\nshop.db-journal\nshop.db-wal\nshop.db-shm\n";

#[derive(Debug, Error, Diagnostic)]
pub enum WorkshopError {
    #[error("Not inside a shopfloor workshop (searched from {searched})")]
    #[diagnostic(
        code(shopfloor::workshop::not_found),
        help("Run 'shopfloor init' to create a workshop here")
    )]
    NotFound { searched: PathBuf },

    #[error("Workshop already initialized at {0}")]
    #[diagnostic(code(shopfloor::workshop::exists))]
    AlreadyInitialized(PathBuf),

    #[error("IO error: {0}")]
    #[diagnostic(code(shopfloor::workshop::io))]
    Io(#[from] std::io::Error),
}

/// A discovered workshop root
#[derive(Debug, Clone)]
pub struct Workshop {
    root: PathBuf,
}

impl Workshop {
    /// Find the workshop containing the current directory
    pub fn discover() -> Result<Self, WorkshopError> {
        let cwd = std::env::current_dir()?;
        Self::discover_from(&cwd)
    }

    /// Walk up from `start` looking for a `.shopfloor/` directory
    pub fn discover_from(start: &Path) -> Result<Self, WorkshopError> {
        start
            .ancestors()
            .find(|dir| dir.join(WORKSHOP_DIR).is_dir())
            .map(|dir| Self {
                root: dir.to_path_buf(),
            })
            .ok_or_else(|| WorkshopError::NotFound {
                searched: start.to_path_buf(),
            })
    }

    /// Create a new workshop at `root`
    pub fn init(root: &Path) -> Result<Self, WorkshopError> {
        let data_dir = root.join(WORKSHOP_DIR);
        if data_dir.exists() {
            return Err(WorkshopError::AlreadyInitialized(root.to_path_buf()));
        }

        fs::create_dir_all(&data_dir)?;
        fs::write(data_dir.join("config.yaml"), DEFAULT_CONFIG)?;
        fs::write(data_dir.join(".gitignore"), GITIGNORE)?;

        tracing::info!(root = %root.display(), "Workshop initialized");

        Ok(Self {
            root: root.to_path_buf(),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn data_dir(&self) -> PathBuf {
        self.root.join(WORKSHOP_DIR)
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir().join("config.yaml")
    }

    pub fn default_db_path(&self) -> PathBuf {
        self.data_dir().join(DEFAULT_DB_FILE)
    }

    /// Open the workshop's record store using `config`
    pub fn open_store(&self, config: &Config) -> Result<Store, StoreError> {
        Store::open(&config.db_path(self), config.store.clone())
    }
}
