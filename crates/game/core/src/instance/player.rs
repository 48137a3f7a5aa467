use crate::combat::Combatant;
use crate::geometry::{TilePos, Vec2, WorldPos};

use super::InstanceError;
use super::exploration::ExplorationMap;

/// What the session layer tells the core about a player's creature.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerProfile {
    pub name: String,
    pub species: String,
    pub level: u32,
}

impl PlayerProfile {
    pub const MAX_LEVEL: u32 = 100;

    /// Rejects levels outside `1..=MAX_LEVEL`.
    pub fn validate(&self) -> Result<(), InstanceError> {
        if (1..=Self::MAX_LEVEL).contains(&self.level) {
            Ok(())
        } else {
            Err(InstanceError::InvalidLevel {
                level: self.level,
                max: Self::MAX_LEVEL,
            })
        }
    }
}

impl Default for PlayerProfile {
    fn default() -> Self {
        Self {
            name: "player".into(),
            species: "pikachu".into(),
            level: 5,
        }
    }
}

/// HP mirror of the player's creature; authoritative copy lives outside.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlayerVitals {
    pub current_hp: u32,
    pub max_hp: u32,
}

impl PlayerVitals {
    pub fn ratio(&self) -> f32 {
        if self.max_hp == 0 {
            return 0.0;
        }
        self.current_hp as f32 / self.max_hp as f32
    }
}

/// A player bound to one instance.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerState {
    pub profile: PlayerProfile,
    pub position: WorldPos,
    /// Last non-zero movement direction.
    pub facing: Vec2,
    pub explored: ExplorationMap,
    /// Tiles revealed since the last periodic update.
    pub explored_delta: Vec<TilePos>,
    pub vitals: PlayerVitals,
    pub combatant: Combatant,
}

impl PlayerState {
    pub const DEFAULT_FACING: Vec2 = Vec2::new(0.0, 1.0);
}
