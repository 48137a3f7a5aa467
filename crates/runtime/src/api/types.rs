//! Payloads returned to the session layer.
use game_core::{DungeonSnapshot, InstanceId, SpawnStrategy, WorldPos};

/// Result of entering a floor, by `enter_dungeon`, `next_floor` or
/// `join_dungeon`.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EnterDungeon {
    pub instance_id: InstanceId,
    pub floor: u32,
    pub spawn: WorldPos,
    pub spawn_strategy: SpawnStrategy,
    pub snapshot: DungeonSnapshot,
}

/// Confirmation of leaving a dungeon for the hub.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ExitDungeon {
    pub hub_spawn: WorldPos,
}
