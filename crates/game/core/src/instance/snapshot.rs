use crate::combat::{AffectedNpc, ProjectileHit, ProjectileView};
use crate::behavior::NpcEngagement;
use crate::geometry::{TilePos, WorldPos};
use crate::ids::{InstanceId, NpcId};
use crate::map::{Room, Tile};
use crate::npc::NpcView;

/// Everything one player may see of an instance.
///
/// Contains only the requesting player's exploration bitmap.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DungeonSnapshot {
    pub instance_id: InstanceId,
    pub floor: u32,
    pub width: u32,
    pub height: u32,
    pub tile_size: u32,
    pub tiles: Vec<Vec<Tile>>,
    pub rooms: Vec<Room>,
    pub ladder: WorldPos,
    pub explored: Vec<Vec<bool>>,
    pub npcs: Vec<NpcView>,
    pub projectiles: Vec<ProjectileView>,
}

/// What one tick changed, before per-player fan-out.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TickReport {
    pub tick: u64,
    pub engagements: Vec<NpcEngagement>,
    pub projectile_hits: Vec<ProjectileHit>,
    pub fainted: Vec<NpcId>,
}

impl TickReport {
    /// NPCs damaged by player projectiles this tick.
    pub fn npc_hits(&self) -> impl Iterator<Item = &AffectedNpc> {
        self.projectile_hits.iter().filter_map(|hit| match &hit.outcome {
            crate::combat::ProjectileOutcome::HitNpc { npc } => Some(npc),
            _ => None,
        })
    }
}

/// Periodic per-player push.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DungeonUpdate {
    pub instance_id: InstanceId,
    pub npcs: Vec<NpcView>,
    pub explored_delta: Vec<TilePos>,
    pub projectiles: Vec<ProjectileView>,
    pub engagements: Vec<NpcEngagement>,
    pub projectile_hits: Vec<ProjectileHit>,
}
