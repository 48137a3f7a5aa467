//! Shared, read-only rules every instance consults.
use std::fmt;

use crate::catalog::Catalog;
use crate::combat::{
    Combatant, DamageResolver, SimplifiedStats, StandardDamage, StatCalculator, StandardStats,
    Stats,
};
use crate::config::{GameConfig, StatModel};

/// Configuration, content and combat collaborators bundled together.
///
/// Built once at startup and shared between instances behind an `Arc`.
pub struct Ruleset {
    pub config: GameConfig,
    pub catalog: Catalog,
    damage: Box<dyn DamageResolver>,
    stats: Box<dyn StatCalculator>,
}

impl Ruleset {
    /// Uses [`StandardDamage`] and the stat model selected by `config`.
    pub fn new(config: GameConfig, catalog: Catalog) -> Self {
        let stats: Box<dyn StatCalculator> = match config.stat_model {
            StatModel::Simplified => Box::new(SimplifiedStats),
            StatModel::Standard => Box::new(StandardStats),
        };
        Self {
            config,
            catalog,
            damage: Box::new(StandardDamage),
            stats,
        }
    }

    #[must_use]
    pub fn with_damage_resolver(mut self, damage: impl DamageResolver + 'static) -> Self {
        self.damage = Box::new(damage);
        self
    }

    #[must_use]
    pub fn with_stat_calculator(mut self, stats: impl StatCalculator + 'static) -> Self {
        self.stats = Box::new(stats);
        self
    }

    pub fn damage(&self) -> &dyn DamageResolver {
        self.damage.as_ref()
    }

    pub fn stats(&self) -> &dyn StatCalculator {
        self.stats.as_ref()
    }

    /// Stats and types of `species` at `level`, or a neutral Normal-type
    /// profile when the species is not in the catalog.
    pub fn combatant(&self, species: &str, level: u32) -> Combatant {
        match self.catalog.species(species) {
            Some(definition) => Combatant {
                level,
                types: definition.types.clone(),
                stats: self.stats.calculate_stats(definition, level),
            },
            None => {
                let stat = StandardStats::other(Self::NEUTRAL_BASE, level);
                Combatant {
                    level,
                    types: vec![crate::combat::ElementType::Normal],
                    stats: Stats {
                        hp: StandardStats::hp(Self::NEUTRAL_BASE, level),
                        attack: stat,
                        defense: stat,
                        special_attack: stat,
                        special_defense: stat,
                        speed: stat,
                    },
                }
            }
        }
    }

    const NEUTRAL_BASE: u32 = 50;
}

impl Default for Ruleset {
    fn default() -> Self {
        Self::new(GameConfig::default(), Catalog::builtin())
    }
}

impl fmt::Debug for Ruleset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Ruleset")
            .field("config", &self.config)
            .field("species", &self.catalog.species.len())
            .field("moves", &self.catalog.moves.len())
            .finish_non_exhaustive()
    }
}
