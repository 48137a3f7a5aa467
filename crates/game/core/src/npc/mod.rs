//! Wild creatures: entity state and room population.
mod entity;
pub mod spawner;

pub use entity::{AnimationState, MoveSet, NpcEntity, NpcView, WanderState};
pub use spawner::{NpcSpawner, level_range};
