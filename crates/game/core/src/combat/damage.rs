//! Damage calculation and application.

use crate::catalog::{MoveCategory, MoveDefinition};
use crate::rng::GameRng;

use super::stats::Stats;
use super::types::{ElementType, effectiveness};

// ============================================================================
// Combatant
// ============================================================================

/// Everything the damage formula reads about one side of an exchange.
#[derive(Clone, Debug, PartialEq)]
pub struct Combatant {
    pub level: u32,
    pub types: Vec<ElementType>,
    pub stats: Stats,
}

// ============================================================================
// Damage Resolution
// ============================================================================

/// Outcome of one damage roll.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DamageRoll {
    pub damage: u32,
    pub missed: bool,
    pub critical: bool,
    pub effectiveness: f32,
}

impl DamageRoll {
    pub const fn miss() -> Self {
        Self {
            damage: 0,
            missed: true,
            critical: false,
            effectiveness: 1.0,
        }
    }
}

/// `resolve_damage(attacker, defender, move)`; pure apart from the rng.
pub trait DamageResolver: Send + Sync {
    fn resolve_damage(
        &self,
        attacker: &Combatant,
        defender: &Combatant,
        mv: &MoveDefinition,
        rng: &mut GameRng,
    ) -> DamageRoll;
}

/// Level/power/attack/defense formula with modifiers.
///
/// # Formula
///
/// ```text
/// base   = (2 * level / 5 + 2) * power * A / D / 50 + 2
/// damage = base * stab * effectiveness * critical * random
/// ```
///
/// - STAB 1.5 when the move shares a type with the attacker
/// - critical 1.5 with probability 1/16
/// - random uniform in `[0.85, 1.0)`
/// - status moves deal 0; accuracy is rolled first
/// - at least 1 damage unless the defender is immune
#[derive(Clone, Copy, Debug, Default)]
pub struct StandardDamage;

impl StandardDamage {
    pub const STAB: f32 = 1.5;
    pub const CRITICAL_MULTIPLIER: f32 = 1.5;
    pub const CRITICAL_ODDS: i32 = 16;
}

impl DamageResolver for StandardDamage {
    fn resolve_damage(
        &self,
        attacker: &Combatant,
        defender: &Combatant,
        mv: &MoveDefinition,
        rng: &mut GameRng,
    ) -> DamageRoll {
        let (attack, defense) = match mv.category {
            MoveCategory::Status => {
                return DamageRoll {
                    effectiveness: 1.0,
                    ..DamageRoll::default()
                };
            }
            MoveCategory::Physical => (attacker.stats.attack, defender.stats.defense),
            MoveCategory::Special => (attacker.stats.special_attack, defender.stats.special_defense),
        };

        if rng.range_inclusive(1, 100) > i32::from(mv.accuracy) {
            return DamageRoll::miss();
        }

        let level = attacker.level as f32;
        let base = (2.0 * level / 5.0 + 2.0) * mv.power as f32 * attack as f32
            / defense.max(1) as f32
            / 50.0
            + 2.0;

        let stab = if attacker.types.contains(&mv.element) {
            Self::STAB
        } else {
            1.0
        };
        let effectiveness = effectiveness(mv.element, &defender.types);
        let critical = rng.range_inclusive(1, Self::CRITICAL_ODDS) == 1;
        let critical_multiplier = if critical {
            Self::CRITICAL_MULTIPLIER
        } else {
            1.0
        };
        let random = rng.uniform(0.85, 1.0);

        let mut damage = base * stab * effectiveness * critical_multiplier * random;
        if effectiveness > 0.0 && damage < 1.0 {
            damage = 1.0;
        }

        DamageRoll {
            damage: damage as u32,
            missed: false,
            critical,
            effectiveness,
        }
    }
}

/// Apply damage to current HP.
///
/// # Returns
///
/// New HP value (clamped to 0)
pub fn apply_damage(current_hp: u32, damage: u32) -> u32 {
    current_hp.saturating_sub(damage)
}
