use arrayvec::ArrayVec;

use crate::combat::{Combatant, ElementType, Stats};
use crate::config::GameConfig;
use crate::geometry::{Aabb, Vec2, WorldPos};
use crate::ids::NpcId;

/// Observable movement state.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, Default, strum::Display, strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AnimationState {
    #[default]
    Idle,
    Walk,
}

/// Heading held while no player is in range.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct WanderState {
    /// Per-tick displacement, already scaled by speed.
    pub heading: Vec2,
    pub ticks_left: u32,
}

/// Known moves, at most [`GameConfig::MAX_MOVES`].
pub type MoveSet = ArrayVec<String, { GameConfig::MAX_MOVES }>;

/// A wild creature inside one instance.
#[derive(Clone, Debug, PartialEq)]
pub struct NpcEntity {
    pub id: NpcId,
    pub species: String,
    pub level: u32,
    pub hp: u32,
    pub max_hp: u32,
    /// Top-left of the collider in world coordinates.
    pub position: WorldPos,
    pub moves: MoveSet,
    /// Ticks until the NPC may engage again.
    pub cooldown: u32,
    pub animation: AnimationState,
    pub wander: WanderState,
    pub types: Vec<ElementType>,
    pub stats: Stats,
}

impl NpcEntity {
    /// Bare NPC knowing only `tackle`, with flat stats derived from `max_hp`.
    pub fn new(id: NpcId, species: &str, level: u32, max_hp: u32, position: WorldPos) -> Self {
        let mut moves = MoveSet::new();
        moves.push("tackle".to_owned());
        Self {
            id,
            species: species.to_owned(),
            level,
            hp: max_hp,
            max_hp,
            position,
            moves,
            cooldown: 0,
            animation: AnimationState::Idle,
            wander: WanderState::default(),
            types: vec![ElementType::Normal],
            stats: Stats {
                hp: max_hp,
                attack: 10,
                defense: 10,
                special_attack: 10,
                special_defense: 10,
                speed: 10,
            },
        }
    }

    pub fn is_fainted(&self) -> bool {
        self.hp == 0
    }

    pub fn hp_ratio(&self) -> f32 {
        if self.max_hp == 0 {
            return 0.0;
        }
        self.hp as f32 / self.max_hp as f32
    }

    /// Restores HP, never past `max_hp`. Returns the amount actually healed.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let before = self.hp;
        self.hp = self.hp.saturating_add(amount).min(self.max_hp);
        self.hp - before
    }

    pub fn collider(&self, size: f32) -> Aabb {
        Aabb::square(self.position, size)
    }

    pub fn combatant(&self) -> Combatant {
        Combatant {
            level: self.level,
            types: self.types.clone(),
            stats: self.stats,
        }
    }

    pub fn view(&self) -> NpcView {
        NpcView {
            id: self.id,
            species: self.species.clone(),
            level: self.level,
            current_hp: self.hp,
            max_hp: self.max_hp,
            position: self.position,
            moves: self.moves.iter().cloned().collect(),
            animation: self.animation,
        }
    }
}

/// Public NPC fields sent to clients.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NpcView {
    pub id: NpcId,
    pub species: String,
    pub level: u32,
    pub current_hp: u32,
    pub max_hp: u32,
    pub position: WorldPos,
    pub moves: Vec<String>,
    pub animation: AnimationState,
}
