//! Cloneable façade for the session layer.
//!
//! [`DungeonHandle`] exposes the dungeon operations a real-time session layer
//! calls on behalf of connected players, and lets it stream the resulting
//! events by topic.
use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::broadcast;

use game_core::{
    AttackOutcome, AttackRequest, DungeonSnapshot, InstanceId, MoveOutcome, PlayerId,
    PlayerProfile, PlayerVitals, Vec2, WorldPos,
};

use super::errors::Result;
use super::types::{EnterDungeon, ExitDungeon};
use crate::events::{Event, EventBus, Topic};
use crate::registry::InstanceRegistry;

/// Client-facing handle to interact with the runtime
#[derive(Clone)]
pub struct DungeonHandle {
    registry: Arc<InstanceRegistry>,
    event_bus: EventBus,
}

impl DungeonHandle {
    pub(crate) fn new(registry: Arc<InstanceRegistry>, event_bus: EventBus) -> Self {
        Self {
            registry,
            event_bus,
        }
    }

    /// Register a player in the hub. Returns the hub spawn position, or a
    /// validation error when the profile level is out of range.
    pub async fn connect(&self, player: PlayerId, profile: PlayerProfile) -> Result<WorldPos> {
        self.registry.connect(player, profile).await
    }

    /// Forget a player and release the instance they were in.
    pub async fn disconnect(&self, player: &PlayerId) -> Result<()> {
        self.registry.disconnect(player).await
    }

    /// Generate a new instance for `floor` and place the player in it.
    pub async fn enter_dungeon(&self, player: &PlayerId, floor: u32) -> Result<EnterDungeon> {
        self.registry.enter_dungeon(player, floor).await
    }

    /// Generate an unclaimed instance that players can later
    /// [`join`](Self::join_dungeon).
    pub async fn create_dungeon(&self, floor: u32) -> Result<InstanceId> {
        self.registry.create_dungeon(floor).await
    }

    /// Place the player in an instance that already exists.
    pub async fn join_dungeon(&self, player: &PlayerId, instance: InstanceId) -> Result<EnterDungeon> {
        self.registry.join_dungeon(player, instance).await
    }

    /// Validate and apply a move.
    ///
    /// A rejected move is not an error: the outcome carries the
    /// authoritative position the client must revert to.
    pub async fn player_move(
        &self,
        player: &PlayerId,
        x: f32,
        y: f32,
        direction_x: f32,
        direction_y: f32,
    ) -> Result<MoveOutcome> {
        self.registry
            .player_move(player, Vec2::new(x, y), Vec2::new(direction_x, direction_y))
            .await
    }

    pub async fn exit_dungeon(&self, player: &PlayerId) -> Result<ExitDungeon> {
        self.registry.exit_dungeon(player).await
    }

    pub async fn next_floor(&self, player: &PlayerId) -> Result<EnterDungeon> {
        self.registry.next_floor(player).await
    }

    /// Resolve a player attack in `instance`.
    ///
    /// Fails with [`RuntimeError::StaleInstance`](super::RuntimeError::StaleInstance)
    /// when the player has since moved to another instance or the hub.
    pub async fn attack(
        &self,
        player: &PlayerId,
        instance: InstanceId,
        request: AttackRequest,
    ) -> Result<AttackOutcome> {
        self.registry.attack(player, instance, request).await
    }

    pub async fn dungeon_state(&self, player: &PlayerId, instance: InstanceId) -> Result<DungeonSnapshot> {
        self.registry.dungeon_state(player, instance).await
    }

    pub async fn report_vitals(&self, player: &PlayerId, current_hp: u32, max_hp: u32) -> Result<PlayerVitals> {
        self.registry.report_vitals(player, current_hp, max_hp).await
    }

    /// Advance every instance one step outside the background ticker.
    /// Returns once all resulting updates are published.
    pub async fn tick(&self) -> Result<usize> {
        self.registry.tick_all().await
    }

    pub async fn binding(&self, player: &PlayerId) -> Option<InstanceId> {
        self.registry.binding(player).await
    }

    pub async fn hub_position(&self, player: &PlayerId) -> Option<WorldPos> {
        self.registry.hub_position(player).await
    }

    pub async fn instance_count(&self) -> usize {
        self.registry.instance_count().await
    }

    pub async fn players_in(&self, instance: InstanceId) -> Option<Vec<PlayerId>> {
        self.registry.players_in(instance).await
    }

    /// Subscribe to events from a specific topic
    ///
    /// # Topics
    ///
    /// - `Topic::Dungeon` - Instance lifecycle and per-player updates
    /// - `Topic::Combat` - Attack results and fainted NPCs
    /// - `Topic::Session` - Connects, floor transitions and peer moves
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use runtime::Topic;
    ///
    /// let mut updates = handle.subscribe(Topic::Dungeon);
    /// while let Ok(event) = updates.recv().await {
    ///     // forward to the owning player's connection
    /// }
    /// ```
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    /// Subscribe to multiple topics at once
    ///
    /// Returns a map of topic to receiver for each requested topic.
    pub fn subscribe_multiple(&self, topics: &[Topic]) -> HashMap<Topic, broadcast::Receiver<Event>> {
        self.event_bus.subscribe_multiple(topics)
    }

    /// Get a reference to the event bus for advanced usage
    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }
}
