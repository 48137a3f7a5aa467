//! Event types for different topics.

use game_core::{
    AttackOutcome, DungeonUpdate, GenerationReport, InstanceId, NpcId, PlayerId, Vec2, WorldPos,
};
use serde::{Deserialize, Serialize};

/// Events on [`Topic::Dungeon`](super::Topic::Dungeon).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DungeonEvent {
    /// A floor was generated and its worker started.
    InstanceCreated {
        instance: InstanceId,
        floor: u32,
        report: GenerationReport,
    },

    /// The last player left and the instance was dropped.
    InstanceRemoved { instance: InstanceId },

    /// Periodic push addressed to one player.
    Update {
        player: PlayerId,
        update: DungeonUpdate,
    },
}

/// Events on [`Topic::Combat`](super::Topic::Combat).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CombatEvent {
    /// A player attack was applied.
    PlayerAttack {
        instance: InstanceId,
        player: PlayerId,
        move_name: String,
        outcome: AttackOutcome,
    },

    /// NPCs removed during a tick (projectile hits).
    NpcsFainted {
        instance: InstanceId,
        npcs: Vec<NpcId>,
    },
}

/// Events on [`Topic::Session`](super::Topic::Session).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    Connected {
        player: PlayerId,
        hub_spawn: WorldPos,
    },

    Disconnected { player: PlayerId },

    EnteredDungeon {
        player: PlayerId,
        instance: InstanceId,
        floor: u32,
    },

    LeftDungeon {
        player: PlayerId,
        instance: InstanceId,
    },

    /// Accepted move, broadcast to peers. `instance` is `None` in the hub.
    PlayerMoved {
        player: PlayerId,
        instance: Option<InstanceId>,
        position: WorldPos,
        direction: Vec2,
    },
}
