use std::collections::BTreeMap;

use crate::combat::effect::{EffectTable, EffectTrigger, MoveEffect, StatusCondition};
use crate::combat::types::ElementType;

use super::{
    BaseStats, Catalog, Encounter, MoveCategory, MoveDefinition, RangeKind, SimpleHp,
    SpeciesDefinition,
};

pub(super) fn catalog() -> Catalog {
    let species = [zubat(), golbat()]
        .into_iter()
        .map(|species| (species.name.clone(), species))
        .collect();
    let moves = moves()
        .into_iter()
        .map(|mv| (mv.name.clone(), mv))
        .collect();

    Catalog {
        species,
        moves,
        encounters: vec![
            Encounter {
                min_level: 1,
                species: "zubat".into(),
            },
            Encounter {
                min_level: 22,
                species: "golbat".into(),
            },
        ],
        default_move: "tackle".into(),
    }
}

fn learnset(entries: &[(u32, &str)]) -> BTreeMap<u32, Vec<String>> {
    let mut learnset: BTreeMap<u32, Vec<String>> = BTreeMap::new();
    for (level, mv) in entries {
        learnset.entry(*level).or_default().push((*mv).to_owned());
    }
    learnset
}

fn zubat() -> SpeciesDefinition {
    SpeciesDefinition {
        name: "zubat".into(),
        types: vec![ElementType::Flying, ElementType::Poison],
        base_stats: BaseStats {
            hp: 40,
            attack: 45,
            defense: 35,
            special_attack: 30,
            special_defense: 40,
            speed: 55,
        },
        simple_hp: SimpleHp {
            base: 40,
            per_level: 2,
        },
        learnset: learnset(&[
            (1, "tackle"),
            (1, "leech-life"),
            (5, "supersonic"),
            (10, "bite"),
            (15, "air-cutter"),
        ]),
    }
}

fn golbat() -> SpeciesDefinition {
    SpeciesDefinition {
        name: "golbat".into(),
        types: vec![ElementType::Flying, ElementType::Poison],
        base_stats: BaseStats {
            hp: 75,
            attack: 80,
            defense: 70,
            special_attack: 65,
            special_defense: 75,
            speed: 90,
        },
        simple_hp: SimpleHp {
            base: 75,
            per_level: 3,
        },
        learnset: learnset(&[
            (1, "leech-life"),
            (1, "supersonic"),
            (1, "bite"),
            (1, "air-cutter"),
            (1, "poison-fang"),
            (1, "air-slash"),
        ]),
    }
}

fn mv(
    name: &str,
    element: ElementType,
    power: u32,
    accuracy: u8,
    category: MoveCategory,
    range: RangeKind,
    effects: EffectTable,
) -> MoveDefinition {
    MoveDefinition {
        name: name.into(),
        element,
        power,
        accuracy,
        category,
        range,
        effects,
    }
}

fn moves() -> Vec<MoveDefinition> {
    use EffectTrigger::OnHit;
    use MoveCategory::*;
    use RangeKind::*;

    vec![
        mv("tackle", ElementType::Normal, 40, 100, Physical, Melee, EffectTable::new()),
        mv(
            "leech-life",
            ElementType::Bug,
            80,
            100,
            Physical,
            Melee,
            EffectTable::new().with(OnHit, MoveEffect::HealPercent { percent: 50 }),
        ),
        mv(
            "supersonic",
            ElementType::Normal,
            0,
            55,
            Status,
            Ranged,
            EffectTable::new().with(
                OnHit,
                MoveEffect::InflictStatus {
                    status: StatusCondition::Confusion,
                    chance: 100,
                },
            ),
        ),
        mv(
            "bite",
            ElementType::Dark,
            60,
            100,
            Physical,
            Melee,
            EffectTable::new().with(OnHit, MoveEffect::Flinch { chance: 30 }),
        ),
        mv("air-cutter", ElementType::Flying, 60, 95, Special, Ranged, EffectTable::new()),
        mv(
            "poison-fang",
            ElementType::Poison,
            50,
            100,
            Physical,
            Melee,
            EffectTable::new().with(
                OnHit,
                MoveEffect::InflictStatus {
                    status: StatusCondition::BadPoison,
                    chance: 50,
                },
            ),
        ),
        mv(
            "air-slash",
            ElementType::Flying,
            75,
            95,
            Special,
            Ranged,
            EffectTable::new().with(OnHit, MoveEffect::Flinch { chance: 30 }),
        ),
    ]
}
