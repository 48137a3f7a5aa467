//! Player-initiated attacks against the NPC roster.
use crate::geometry::{Vec2, WorldPos};
use crate::ids::NpcId;
use crate::npc::NpcEntity;

use super::damage::apply_damage;

#[derive(
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    Default,
    strum::Display,
    strum::EnumString,
    strum::AsRefStr,
)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum AttackKind {
    /// Hits every NPC within range of the origin at once.
    #[default]
    Direct,
    /// Launches a projectile resolved over subsequent ticks.
    Projectile,
}

/// Attack as submitted by the session layer. Origin and direction are taken
/// from the player's authoritative state, not from the request.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackRequest {
    pub move_name: String,
    pub kind: AttackKind,
    pub damage: u32,
    pub range: f32,
}

/// Fully resolved attack ready to apply.
#[derive(Clone, Debug, PartialEq)]
pub struct PlayerAttack {
    pub move_name: String,
    pub kind: AttackKind,
    pub origin: WorldPos,
    pub direction: Vec2,
    pub damage: u32,
    pub range: f32,
}

/// One NPC touched by an attack.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AffectedNpc {
    pub id: NpcId,
    /// Damage as requested, before clamping to the remaining HP.
    pub damage: u32,
    pub current_hp: u32,
    pub max_hp: u32,
}

/// Damages one NPC, clamping HP at zero.
pub fn strike(npc: &mut NpcEntity, damage: u32) -> AffectedNpc {
    npc.hp = apply_damage(npc.hp, damage);
    AffectedNpc {
        id: npc.id,
        damage,
        current_hp: npc.hp,
        max_hp: npc.max_hp,
    }
}

/// Damages every NPC within Euclidean `range` of `origin`, then drops
/// fainted ones from the roster.
pub fn resolve_direct(
    npcs: &mut Vec<NpcEntity>,
    origin: WorldPos,
    range: f32,
    damage: u32,
) -> Vec<AffectedNpc> {
    let affected = npcs
        .iter_mut()
        .filter(|npc| npc.position.distance(origin) <= range)
        .map(|npc| strike(npc, damage))
        .collect();
    remove_fainted(npcs);
    affected
}

/// Retains only living NPCs; returns the ids removed.
pub fn remove_fainted(npcs: &mut Vec<NpcEntity>) -> Vec<NpcId> {
    let fainted = npcs
        .iter()
        .filter(|npc| npc.is_fainted())
        .map(|npc| npc.id)
        .collect();
    npcs.retain(|npc| !npc.is_fainted());
    fainted
}
