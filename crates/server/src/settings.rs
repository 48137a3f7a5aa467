//! Process settings read from the environment.
use std::env;
use std::path::PathBuf;

use anyhow::Result;
use game_content::{CatalogLoader, ConfigLoader, ContentFactory};
use game_core::{Catalog, GameConfig};

/// Where the server reads content from and writes logs to.
///
/// - `DUNGEON_DATA_DIR`: directory holding `config.toml` / `catalog.ron`
/// - `DUNGEON_CONFIG` / `DUNGEON_CATALOG`: explicit file paths, taking
///   precedence over the data directory
/// - `DUNGEON_LOG_DIR`: log directory, defaulting to the platform cache
#[derive(Clone, Debug)]
pub struct ServerSettings {
    pub data_dir: Option<PathBuf>,
    pub config_path: Option<PathBuf>,
    pub catalog_path: Option<PathBuf>,
    pub log_dir: PathBuf,
}

impl ServerSettings {
    pub fn from_env() -> Self {
        Self {
            data_dir: env_path("DUNGEON_DATA_DIR"),
            config_path: env_path("DUNGEON_CONFIG"),
            catalog_path: env_path("DUNGEON_CATALOG"),
            log_dir: env_path("DUNGEON_LOG_DIR").unwrap_or_else(default_log_dir),
        }
    }

    /// Game configuration and catalog, falling back to built-in content for
    /// anything not configured.
    pub fn load_content(&self) -> Result<(GameConfig, Catalog)> {
        let factory = self.data_dir.as_ref().map(ContentFactory::new);

        let config = match (&self.config_path, &factory) {
            (Some(path), _) => ConfigLoader::load(path)?,
            (None, Some(factory)) => factory.load_config()?,
            (None, None) => GameConfig::default(),
        };
        let catalog = match (&self.catalog_path, &factory) {
            (Some(path), _) => CatalogLoader::load(path)?,
            (None, Some(factory)) => factory.load_catalog()?,
            (None, None) => Catalog::builtin(),
        };

        tracing::info!(
            config = ?self.config_path,
            catalog = ?self.catalog_path,
            data_dir = ?self.data_dir,
            species = catalog.species.len(),
            "content loaded"
        );
        Ok((config, catalog))
    }
}

fn env_path(key: &str) -> Option<PathBuf> {
    env::var_os(key).filter(|value| !value.is_empty()).map(PathBuf::from)
}

/// Platform cache directory, e.g. `~/.cache/dungeon/logs` on Linux.
fn default_log_dir() -> PathBuf {
    directories::ProjectDirs::from("", "", "dungeon")
        .map(|dirs| dirs.cache_dir().to_path_buf())
        .unwrap_or_else(|| PathBuf::from("/tmp/dungeon"))
        .join("logs")
}
