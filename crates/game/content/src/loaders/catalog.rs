//! Species and move catalog loader.

use std::path::Path;

use game_core::Catalog;

use crate::loaders::{LoadResult, read_file};

/// Loader for the species/move catalog from RON files.
///
/// The file holds one [`Catalog`] value. Cross-references (encounters,
/// learnsets, the default move) are validated before the catalog is
/// returned.
pub struct CatalogLoader;

impl CatalogLoader {
    /// Load and validate a catalog from a RON file.
    pub fn load(path: &Path) -> LoadResult<Catalog> {
        let content = read_file(path)?;
        Self::parse(&content)
            .map_err(|e| anyhow::anyhow!("Invalid catalog {}: {}", path.display(), e))
    }

    /// Parse and validate a catalog from RON text.
    pub fn parse(content: &str) -> LoadResult<Catalog> {
        let catalog: Catalog = ron::from_str(content)
            .map_err(|e| anyhow::anyhow!("Failed to parse catalog RON: {}", e))?;
        catalog.validate()?;
        Ok(catalog)
    }
}
