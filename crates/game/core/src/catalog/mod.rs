//! Species and move definitions.
//!
//! The catalog is static data: which creatures exist, what they can learn and
//! at which level, and which species appears at a given level. A built-in
//! catalog ships with the crate; `game-content` can load a replacement.
mod builtin;

use std::collections::BTreeMap;

use crate::combat::effect::EffectTable;
use crate::combat::types::ElementType;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BaseStats {
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub special_attack: u32,
    pub special_defense: u32,
    pub speed: u32,
}

/// Linear HP coefficients for the simplified stat model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimpleHp {
    pub base: u32,
    pub per_level: u32,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpeciesDefinition {
    pub name: String,
    pub types: Vec<ElementType>,
    pub base_stats: BaseStats,
    pub simple_hp: SimpleHp,
    /// Unlock level → moves learned at that level.
    pub learnset: BTreeMap<u32, Vec<String>>,
}

impl SpeciesDefinition {
    /// Moves unlocked at or below `level`, in unlock order.
    pub fn moves_at(&self, level: u32) -> Vec<String> {
        self.learnset
            .range(..=level)
            .flat_map(|(_, moves)| moves.iter().cloned())
            .collect()
    }
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MoveCategory {
    Physical,
    Special,
    Status,
}

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum RangeKind {
    Melee,
    Ranged,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MoveDefinition {
    pub name: String,
    pub element: ElementType,
    pub power: u32,
    /// Hit chance in percent.
    pub accuracy: u8,
    pub category: MoveCategory,
    pub range: RangeKind,
    #[cfg_attr(feature = "serde", serde(default))]
    pub effects: EffectTable,
}

impl MoveDefinition {
    pub fn is_status(&self) -> bool {
        self.category == MoveCategory::Status
    }

    pub fn is_damaging(&self) -> bool {
        !self.is_status()
    }
}

/// Species appearing from `min_level` upward, until a higher threshold.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Encounter {
    pub min_level: u32,
    pub species: String,
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum CatalogError {
    #[error("encounter table is empty")]
    NoEncounters,

    #[error("encounter references unknown species `{0}`")]
    UnknownEncounterSpecies(String),

    #[error("species `{species}` learns unknown move `{mv}`")]
    UnknownLearnsetMove { species: String, mv: String },

    #[error("default move `{0}` is not defined")]
    UnknownDefaultMove(String),
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Catalog {
    pub species: BTreeMap<String, SpeciesDefinition>,
    pub moves: BTreeMap<String, MoveDefinition>,
    pub encounters: Vec<Encounter>,
    /// Move given to a creature whose learnset yields nothing.
    pub default_move: String,
}

impl Catalog {
    /// Zubat line with its seven moves.
    pub fn builtin() -> Self {
        builtin::catalog()
    }

    pub fn species(&self, name: &str) -> Option<&SpeciesDefinition> {
        self.species.get(name)
    }

    pub fn move_def(&self, name: &str) -> Option<&MoveDefinition> {
        self.moves.get(name)
    }

    /// Species whose encounter threshold is the greatest one ≤ `level`.
    /// Levels below every threshold use the lowest entry.
    pub fn species_for_level(&self, level: u32) -> Option<&SpeciesDefinition> {
        let encounter = self
            .encounters
            .iter()
            .filter(|encounter| encounter.min_level <= level)
            .max_by_key(|encounter| encounter.min_level)
            .or_else(|| self.encounters.iter().min_by_key(|encounter| encounter.min_level))?;
        self.species(&encounter.species)
    }

    /// Checks every cross-reference.
    pub fn validate(&self) -> Result<(), CatalogError> {
        if self.encounters.is_empty() {
            return Err(CatalogError::NoEncounters);
        }
        if let Some(encounter) = self
            .encounters
            .iter()
            .find(|encounter| !self.species.contains_key(&encounter.species))
        {
            return Err(CatalogError::UnknownEncounterSpecies(
                encounter.species.clone(),
            ));
        }
        for species in self.species.values() {
            for mv in species.learnset.values().flatten() {
                if !self.moves.contains_key(mv) {
                    return Err(CatalogError::UnknownLearnsetMove {
                        species: species.name.clone(),
                        mv: mv.clone(),
                    });
                }
            }
        }
        if !self.moves.contains_key(&self.default_move) {
            return Err(CatalogError::UnknownDefaultMove(self.default_move.clone()));
        }
        Ok(())
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}
