//! Deterministic dungeon logic shared by the runtime and offline tools.
//!
//! `game-core` generates floors, resolves guaranteed-walkable spawn and
//! ladder points, populates rooms with wild creatures, simulates their AI and
//! resolves attacks. Everything here is synchronous and free of I/O; the
//! `runtime` crate owns scheduling, concurrency and logging. All mutation of a
//! floor flows through [`DungeonInstance`].
pub mod behavior;
pub mod catalog;
pub mod combat;
pub mod config;
pub mod error;
pub mod geometry;
pub mod ids;
pub mod instance;
pub mod map;
pub mod npc;
pub mod rng;
pub mod rules;
pub mod spawn;

pub use behavior::{EngagementKind, NpcEngagement, Target, tick_npcs};
pub use catalog::{
    Catalog, CatalogError, Encounter, MoveCategory, MoveDefinition, RangeKind, SpeciesDefinition,
};
pub use combat::{
    AffectedNpc, AppliedEffect, AttackKind, AttackRequest, Combatant, DamageResolver, DamageRoll,
    EffectTable, EffectTrigger, ElementType, MoveEffect, ProjectileHit, ProjectileOutcome,
    ProjectileOwner, ProjectileView, StandardDamage, StatCalculator, Stats,
};
pub use config::{GameConfig, GenerationParams, NpcParams, Span, StatModel};
pub use error::{ErrorSeverity, GameError};
pub use geometry::{Aabb, TilePos, Vec2, WorldPos};
pub use ids::{InstanceId, NpcId, PlayerId, ProjectileId};
pub use instance::{
    AttackOutcome, DungeonInstance, DungeonSnapshot, DungeonUpdate, ExplorationMap,
    GenerationReport, InstanceError, MoveOutcome, PlayerProfile, PlayerVitals, SpawnCheck,
    TickReport,
};
pub use map::{GeneratedLayout, Room, Terrain, Tile, TileGrid};
pub use npc::{AnimationState, NpcEntity, NpcSpawner, NpcView};
pub use rng::GameRng;
pub use rules::Ruleset;
pub use spawn::{SpawnError, SpawnPoint, SpawnResolver, SpawnStrategy};
