//! Runtime orchestration for multiplayer dungeon instances.
//!
//! This crate wires the deterministic `game-core` simulation into concurrent
//! services: one worker task per dungeon instance, a registry that binds
//! players to instances, a fixed-rate ticker and a topic-based event bus.
//! Consumers embed [`Runtime`] and talk to it through [`DungeonHandle`].
//!
//! Modules are organized by responsibility:
//! - [`runtime`] hosts the orchestrator and builder
//! - [`api`] exposes the types downstream clients interact with
//! - [`events`] provides topic-based event bus for flexible event routing
//! - [`registry`] maps players to instances and owns instance lifecycle
//! - `workers` keeps background tasks internal to the crate
pub mod api;
pub mod config;
pub mod events;
pub mod registry;
pub mod runtime;

mod workers;

pub use api::{DungeonHandle, EnterDungeon, ExitDungeon, Result, RuntimeError};
pub use config::RuntimeConfig;
pub use events::{CombatEvent, DungeonEvent, Event, EventBus, SessionEvent, Topic};
pub use registry::InstanceRegistry;
pub use runtime::{Runtime, RuntimeBuilder};
