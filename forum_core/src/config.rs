use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::fs;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

static DATA_DIR_NAME: &str = "forum_core";
static FORUM_DB_NAME: &str = "forum_db.sqlite";
static CONFIG_FILE_NAME: &str = "config.json";

// data_dir_path
// |- forum_core
//    |- forum_db.sqlite
//    |- config.json

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to find a data directory on this platform")]
    NoDataDir,
    #[error("config io error")]
    Io(#[from] std::io::Error),
    #[error("malformed config file")]
    Json(#[from] serde_json::Error),
}

fn default_log_filter() -> String {
    "forum_core=info".to_string()
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ForumConfig {
    /// SQLite connection string, e.g. `sqlite:///path/to/forum_db.sqlite?mode=rwc`.
    pub(crate) database_url: String,

    /// `tracing` filter used when `RUST_LOG` is not set.
    ///
    /// `serde(default)` keeps config.json files written before the field existed loading.
    #[serde(default = "default_log_filter")]
    pub(crate) log_filter: String,
}

impl ForumConfig {
    /// Config whose database lives in `data_dir`.
    fn new(data_dir: &Path) -> Self {
        let database_path = data_dir.join(FORUM_DB_NAME);

        ForumConfig {
            database_url: format!("sqlite://{}?mode=rwc", database_path.display()),
            log_filter: default_log_filter(),
        }
    }

    /// Ephemeral config backed by an in-memory SQLite database.
    pub fn in_memory() -> Self {
        ForumConfig {
            database_url: "sqlite::memory:".to_string(),
            log_filter: default_log_filter(),
        }
    }

    /// Replaces the `tracing` filter, e.g. `"off"` to silence logging.
    pub fn with_log_filter(mut self, filter: impl Into<String>) -> Self {
        self.log_filter = filter.into();
        self
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn log_filter(&self) -> &str {
        &self.log_filter
    }
}

/// Gets the existing config or initializes a new one in the platform data directory.
pub async fn get_or_init() -> Result<ForumConfig, ConfigError> {
    let data_dir = dirs::data_dir().ok_or(ConfigError::NoDataDir)?;
    get_or_init_in(data_dir.join(DATA_DIR_NAME)).await
}

/// Same as [`get_or_init`] but rooted at an explicit directory.
pub async fn get_or_init_in(forum_dir: PathBuf) -> Result<ForumConfig, ConfigError> {
    let config_path = forum_dir.join(CONFIG_FILE_NAME);

    fs::create_dir_all(&forum_dir).await?;

    if fs::try_exists(&config_path).await? {
        let mut file = fs::File::open(&config_path).await?;
        let mut contents = String::new();
        file.read_to_string(&mut contents).await?;

        let config: ForumConfig = serde_json::from_str(&contents)?;
        Ok(config)
    } else {
        let config = ForumConfig::new(&forum_dir);

        let json = serde_json::to_string_pretty(&config)?;
        let mut file = fs::File::create(&config_path).await?;
        file.write_all(json.as_bytes()).await?;
        file.flush().await?;

        Ok(config)
    }
}
