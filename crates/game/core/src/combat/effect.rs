//! Move side effects as data.
//!
//! Each move carries an [`EffectTable`] keyed by [`EffectTrigger`]. Firing a
//! trigger rolls every effect registered for it and returns what applied;
//! the caller decides how to mutate state (heal an NPC, report a status to
//! the session layer).
use std::collections::BTreeMap;

use crate::rng::GameRng;

/// Moment in a move's resolution at which effects fire.
#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EffectTrigger {
    OnActivate,
    BeforeHit,
    OnHit,
    OnWallHit,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StatusCondition {
    Burn,
    Freeze,
    Paralysis,
    Poison,
    BadPoison,
    Sleep,
    Confusion,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum StatKind {
    Attack,
    Defense,
    SpecialAttack,
    SpecialDefense,
    Speed,
    Accuracy,
    Evasion,
}

/// Who an effect lands on.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EffectTarget {
    User,
    Target,
}

/// Closed set of move side effects. Chances are percentages.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum MoveEffect {
    InflictStatus { status: StatusCondition, chance: u8 },
    /// Heals the user by `percent` of the damage dealt.
    HealPercent { percent: u8 },
    StatStage { stat: StatKind, change: i8, target: EffectTarget },
    Flinch { chance: u8 },
}

/// An effect that passed its roll.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum AppliedEffect {
    Status { status: StatusCondition },
    Heal { amount: u32 },
    StatStage { stat: StatKind, change: i8, target: EffectTarget },
    Flinch,
}

#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct EffectTable {
    entries: BTreeMap<EffectTrigger, Vec<MoveEffect>>,
}

impl EffectTable {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, trigger: EffectTrigger, effect: MoveEffect) -> Self {
        self.insert(trigger, effect);
        self
    }

    pub fn insert(&mut self, trigger: EffectTrigger, effect: MoveEffect) {
        self.entries.entry(trigger).or_default().push(effect);
    }

    pub fn effects(&self, trigger: EffectTrigger) -> &[MoveEffect] {
        self.entries.get(&trigger).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.entries.values().all(Vec::is_empty)
    }

    /// Rolls every effect registered for `trigger`.
    ///
    /// `damage` is the damage dealt by the hit that fired the trigger, used
    /// by heal effects; heals of zero are dropped.
    pub fn fire(&self, trigger: EffectTrigger, damage: u32, rng: &mut GameRng) -> Vec<AppliedEffect> {
        self.effects(trigger)
            .iter()
            .filter_map(|effect| match *effect {
                MoveEffect::InflictStatus { status, chance } => {
                    roll(rng, chance).then_some(AppliedEffect::Status { status })
                }
                MoveEffect::HealPercent { percent } => {
                    let amount = damage * u32::from(percent) / 100;
                    (amount > 0).then_some(AppliedEffect::Heal { amount })
                }
                MoveEffect::StatStage {
                    stat,
                    change,
                    target,
                } => Some(AppliedEffect::StatStage {
                    stat,
                    change,
                    target,
                }),
                MoveEffect::Flinch { chance } => roll(rng, chance).then_some(AppliedEffect::Flinch),
            })
            .collect()
    }
}

fn roll(rng: &mut GameRng, chance: u8) -> bool {
    chance >= 100 || rng.chance(f32::from(chance) / 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heal_scales_with_damage_dealt() {
        let table = EffectTable::new().with(
            EffectTrigger::OnHit,
            MoveEffect::HealPercent { percent: 50 },
        );
        let mut rng = GameRng::new(0);
        assert_eq!(
            table.fire(EffectTrigger::OnHit, 21, &mut rng),
            vec![AppliedEffect::Heal { amount: 10 }]
        );
        assert!(table.fire(EffectTrigger::OnHit, 1, &mut rng).is_empty());
        assert!(table.fire(EffectTrigger::BeforeHit, 21, &mut rng).is_empty());
    }

    #[test]
    fn certain_and_impossible_chances() {
        let table = EffectTable::new()
            .with(
                EffectTrigger::OnHit,
                MoveEffect::InflictStatus {
                    status: StatusCondition::Confusion,
                    chance: 100,
                },
            )
            .with(EffectTrigger::OnHit, MoveEffect::Flinch { chance: 0 });
        let mut rng = GameRng::new(4);
        for _ in 0..20 {
            assert_eq!(
                table.fire(EffectTrigger::OnHit, 0, &mut rng),
                vec![AppliedEffect::Status {
                    status: StatusCondition::Confusion
                }]
            );
        }
    }
}
