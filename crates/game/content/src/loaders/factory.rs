//! Content factory for building a ruleset from data files.

use std::path::{Path, PathBuf};

use game_core::{Catalog, GameConfig, Ruleset};

use crate::loaders::{CatalogLoader, ConfigLoader, LoadResult};

/// Content factory that loads all game content from a data directory.
///
/// # Directory Structure
///
/// ```text
/// data_dir/
/// ├── config.toml
/// └── catalog.ron
/// ```
///
/// Either file may be absent, in which case the built-in value is used.
pub struct ContentFactory {
    data_dir: PathBuf,
}

impl ContentFactory {
    pub const CONFIG_FILE: &'static str = "config.toml";
    pub const CATALOG_FILE: &'static str = "catalog.ron";

    /// Creates a new content factory pointing to a data directory.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Load game configuration from `config.toml`, or the defaults.
    pub fn load_config(&self) -> LoadResult<GameConfig> {
        let path = self.data_dir.join(Self::CONFIG_FILE);
        if !path.exists() {
            return Ok(GameConfig::default());
        }
        ConfigLoader::load(&path)
    }

    /// Load the species/move catalog from `catalog.ron`, or the built-in one.
    pub fn load_catalog(&self) -> LoadResult<Catalog> {
        let path = self.data_dir.join(Self::CATALOG_FILE);
        if !path.exists() {
            return Ok(Catalog::builtin());
        }
        CatalogLoader::load(&path)
    }

    /// Config and catalog combined into the ruleset instances run on.
    pub fn load_ruleset(&self) -> LoadResult<Ruleset> {
        Ok(Ruleset::new(self.load_config()?, self.load_catalog()?))
    }

    /// Returns the data directory path.
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }
}

#[cfg(test)]
mod tests {
    use game_core::StatModel;

    use super::*;

    #[test]
    fn empty_directory_yields_builtin_content() {
        let dir = tempfile::tempdir().unwrap();
        let rules = ContentFactory::new(dir.path()).load_ruleset().unwrap();
        assert_eq!(rules.config, GameConfig::default());
        assert_eq!(rules.catalog, Catalog::builtin());
    }

    #[test]
    fn config_file_selects_stat_model() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join(ContentFactory::CONFIG_FILE),
            "stat_model = \"standard\"\n",
        )
        .unwrap();

        let factory = ContentFactory::new(dir.path());
        assert_eq!(factory.data_dir(), dir.path());
        let rules = factory.load_ruleset().unwrap();
        assert_eq!(rules.config.stat_model, StatModel::Standard);

        // zubat at level 10 under the base-stat formula: 2*40*10/100 + 10 + 10
        let stats = rules.combatant("zubat", 10).stats;
        assert_eq!(stats.hp, 28);
    }
}
