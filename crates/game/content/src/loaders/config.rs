//! Game configuration loader.

use std::path::Path;

use game_core::GameConfig;

use crate::loaders::{LoadResult, read_file};

/// Loader for game configuration from TOML files.
///
/// Every field of [`GameConfig`] is defaulted, so a file only needs the
/// values it overrides.
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load config data from a TOML file.
    pub fn load(path: &Path) -> LoadResult<GameConfig> {
        let content = read_file(path)?;
        Self::parse(&content)
    }

    /// Parse config data from TOML text.
    pub fn parse(content: &str) -> LoadResult<GameConfig> {
        let config: GameConfig = toml::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config TOML: {}", e))?;

        if config.tile_size == 0 {
            anyhow::bail!("tile_size must be positive");
        }
        if config.world_width < config.tile_size || config.world_height < config.tile_size {
            anyhow::bail!(
                "world {}x{} is smaller than one {}px tile",
                config.world_width,
                config.world_height,
                config.tile_size
            );
        }
        Ok(config)
    }
}
