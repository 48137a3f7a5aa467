//! Tunable parameters for generation, AI and combat.
//!
//! All fields carry defaults so a partial TOML file only overrides what it names.
use crate::geometry::Vec2;

/// Inclusive integer range, e.g. room count or wander duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Span {
    pub min: i32,
    pub max: i32,
}

impl Span {
    pub const fn new(min: i32, max: i32) -> Self {
        Self { min, max }
    }
}

/// Which stat formula the instance uses for NPC and player stats.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, strum::Display, strum::EnumString)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StatModel {
    /// Species HP coefficients (`hp_base + hp_per_level * level`).
    #[default]
    Simplified,
    /// Base-stat formula for every stat.
    Standard,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GenerationParams {
    pub room_count: Span,
    pub room_size: Span,
    /// Placement attempts per room slot before the slot is skipped.
    pub placement_attempts: u32,
    /// Ring bound for the spiral spawn search.
    pub spiral_rings: i32,
}

impl GenerationParams {
    pub const DEFAULT_ROOM_COUNT: Span = Span::new(8, 15);
    pub const DEFAULT_ROOM_SIZE: Span = Span::new(3, 8);
    pub const DEFAULT_PLACEMENT_ATTEMPTS: u32 = 5;
    pub const DEFAULT_SPIRAL_RINGS: i32 = 100;
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            room_count: Self::DEFAULT_ROOM_COUNT,
            room_size: Self::DEFAULT_ROOM_SIZE,
            placement_attempts: Self::DEFAULT_PLACEMENT_ATTEMPTS,
            spiral_rings: Self::DEFAULT_SPIRAL_RINGS,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct NpcParams {
    pub detection_range: f32,
    pub speed: f32,
    /// HP ratio below which an NPC flees.
    pub retreat_threshold: f32,
    /// Collider edge as a fraction of the tile size.
    pub collider_ratio: f32,
    pub ranged_attack_range: f32,
    pub wander_ticks: Span,
    pub jitter_attempts: u32,
    pub max_per_room: u32,
}

impl Default for NpcParams {
    fn default() -> Self {
        Self {
            detection_range: 300.0,
            speed: 2.0,
            retreat_threshold: 0.3,
            collider_ratio: 0.6,
            ranged_attack_range: 200.0,
            wander_ticks: Span::new(30, 90),
            jitter_attempts: 8,
            max_per_room: 2,
        }
    }
}

/// Ticks an NPC waits after using a move of each kind.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct CooldownParams {
    pub melee: u32,
    pub status: u32,
    pub ranged: u32,
}

impl Default for CooldownParams {
    fn default() -> Self {
        Self {
            melee: 30,
            status: 90,
            ranged: 180,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ProjectileParams {
    pub speed: f32,
    pub size: f32,
    /// Travel distance of NPC-fired projectiles.
    pub npc_range: f32,
}

impl Default for ProjectileParams {
    fn default() -> Self {
        Self {
            speed: 8.0,
            size: 10.0,
            npc_range: 400.0,
        }
    }
}

/// Game configuration constants and tunable parameters.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct GameConfig {
    pub world_width: u32,
    pub world_height: u32,
    pub tile_size: u32,
    /// Edge of the square player bounding box.
    pub player_size: f32,
    pub hub_spawn: Vec2,
    pub generation: GenerationParams,
    pub npc: NpcParams,
    pub cooldowns: CooldownParams,
    pub projectiles: ProjectileParams,
    /// Marks every tile explored on assignment (single-player parity).
    pub reveal_all_tiles: bool,
    pub stat_model: StatModel,
}

impl GameConfig {
    // ===== compile-time constants =====
    /// Moves an NPC may know at once.
    pub const MAX_MOVES: usize = 4;
    /// Side of the neighborhood scanned around a room center.
    pub const CENTER_NEIGHBORHOOD: i32 = 5;

    // ===== runtime-tunable defaults =====
    pub const DEFAULT_WORLD_SIZE: u32 = 2000;
    pub const DEFAULT_TILE_SIZE: u32 = 50;
    pub const DEFAULT_PLAYER_SIZE: f32 = 50.0;
    pub const DEFAULT_HUB_SPAWN: Vec2 = Vec2::new(500.0, 500.0);

    pub fn new() -> Self {
        Self {
            world_width: Self::DEFAULT_WORLD_SIZE,
            world_height: Self::DEFAULT_WORLD_SIZE,
            tile_size: Self::DEFAULT_TILE_SIZE,
            player_size: Self::DEFAULT_PLAYER_SIZE,
            hub_spawn: Self::DEFAULT_HUB_SPAWN,
            generation: GenerationParams::default(),
            npc: NpcParams::default(),
            cooldowns: CooldownParams::default(),
            projectiles: ProjectileParams::default(),
            reveal_all_tiles: false,
            stat_model: StatModel::default(),
        }
    }

    /// Side of the square NPC collider in world units.
    pub fn npc_collider_size(&self) -> f32 {
        self.tile_size as f32 * self.npc.collider_ratio
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}
