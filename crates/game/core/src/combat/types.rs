//! Elemental types and the effectiveness chart.

/// Elemental type of a species or move.
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
pub enum ElementType {
    Normal,
    Fire,
    Water,
    Electric,
    Grass,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Dark,
    Steel,
}

/// Multiplier for one attacking type against one defending type.
///
/// Only the Normal, Fire, Water, Electric and Grass rows are charted;
/// every other pairing is neutral.
pub fn matchup(attack: ElementType, defend: ElementType) -> f32 {
    use ElementType::*;
    match (attack, defend) {
        (Normal, Rock | Steel) => 0.5,
        (Normal, Ghost) => 0.0,

        (Fire, Grass | Ice | Bug | Steel) => 2.0,
        (Fire, Fire | Water | Rock | Dragon) => 0.5,

        (Water, Fire | Ground | Rock) => 2.0,
        (Water, Water | Grass | Dragon) => 0.5,

        (Electric, Water | Flying) => 2.0,
        (Electric, Electric | Grass | Dragon) => 0.5,
        (Electric, Ground) => 0.0,

        (Grass, Water | Ground | Rock) => 2.0,
        (Grass, Fire | Grass | Poison | Flying | Bug | Dragon | Steel) => 0.5,

        _ => 1.0,
    }
}

/// Product of [`matchup`] over every defending type.
pub fn effectiveness(attack: ElementType, defender: &[ElementType]) -> f32 {
    defender
        .iter()
        .map(|defend| matchup(attack, *defend))
        .product()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dual_types_multiply() {
        use ElementType::*;
        assert_eq!(effectiveness(Electric, &[Water, Flying]), 4.0);
        assert_eq!(effectiveness(Grass, &[Poison, Flying]), 0.25);
        assert_eq!(effectiveness(Electric, &[Ground, Flying]), 0.0);
        assert_eq!(effectiveness(Bug, &[Poison, Flying]), 1.0);
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("Flying".parse::<ElementType>(), Ok(ElementType::Flying));
        assert_eq!(ElementType::Dark.to_string(), "dark");
    }
}
