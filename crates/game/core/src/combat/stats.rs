//! Stat calculation collaborators.
use crate::catalog::SpeciesDefinition;

/// Derived battle stats for one creature at one level.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Stats {
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub special_attack: u32,
    pub special_defense: u32,
    pub speed: u32,
}

/// `calculate_stats(species, level)`; pure over its inputs.
pub trait StatCalculator: Send + Sync {
    fn calculate_stats(&self, species: &SpeciesDefinition, level: u32) -> Stats;
}

/// Base-stat formula with zero IVs, zero EVs and a neutral nature.
///
/// ```text
/// hp    = 2 * base * level / 100 + level + 10
/// other = 2 * base * level / 100 + 5
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardStats;

impl StandardStats {
    fn scaled(base: u32, level: u32) -> u32 {
        base.saturating_mul(2).saturating_mul(level) / 100
    }

    pub(crate) fn other(base: u32, level: u32) -> u32 {
        Self::scaled(base, level).saturating_add(5)
    }

    pub(crate) fn hp(base: u32, level: u32) -> u32 {
        Self::scaled(base, level).saturating_add(level).saturating_add(10)
    }
}

impl StatCalculator for StandardStats {
    fn calculate_stats(&self, species: &SpeciesDefinition, level: u32) -> Stats {
        let base = &species.base_stats;
        Stats {
            hp: Self::hp(base.hp, level),
            attack: Self::other(base.attack, level),
            defense: Self::other(base.defense, level),
            special_attack: Self::other(base.special_attack, level),
            special_defense: Self::other(base.special_defense, level),
            speed: Self::other(base.speed, level),
        }
    }
}

/// Per-species linear HP (`hp_base + hp_per_level * level`); other stats
/// use [`StandardStats`].
#[derive(Clone, Copy, Debug, Default)]
pub struct SimplifiedStats;

impl StatCalculator for SimplifiedStats {
    fn calculate_stats(&self, species: &SpeciesDefinition, level: u32) -> Stats {
        let mut stats = StandardStats.calculate_stats(species, level);
        stats.hp = species
            .simple_hp
            .per_level
            .saturating_mul(level)
            .saturating_add(species.simple_hp.base);
        stats
    }
}
