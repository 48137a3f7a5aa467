//! Data-driven content definitions and loaders.
//!
//! This crate reads the static data a dungeon server runs on:
//! - Species, moves and the encounter table (RON)
//! - Game configuration (TOML)
//!
//! Everything loaded here is validated and then handed to `game-core` as a
//! [`Ruleset`](game_core::Ruleset); content never appears in instance state.

#[cfg(feature = "loaders")]
pub mod loaders;

#[cfg(feature = "loaders")]
pub use loaders::{CatalogLoader, ConfigLoader, ContentFactory, LoadResult};
