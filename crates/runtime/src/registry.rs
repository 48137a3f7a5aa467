//! Instance registry: the only state shared across dungeon instances.
//!
//! The registry maps instance ids to live instance workers and player ids to
//! their sessions. Creation, removal and player (re)binding all happen under
//! one write lock, so lookups never observe a half-applied transition. A
//! request naming an instance the player is no longer bound to is rejected
//! with [`RuntimeError::StaleInstance`] and never reaches any instance.
//!
//! Each instance tracks which players are bound to it. When the last one
//! leaves, the instance is dropped from the registry in the same critical
//! section and its worker stops once its command channel closes. Instances
//! nobody has joined are dropped after `unclaimed_instance_ttl_ticks` ticks,
//! and an instance whose worker has died is dropped on the next tick with its
//! players sent back to the hub.
//!
//! The lock is never held across a wait on an instance queue. Assignments
//! and removals are enqueued with `try_send` inside the critical section so
//! they keep binding order; everything else is sent after the lock is
//! released.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tokio::sync::{RwLock, mpsc};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use game_core::{
    AttackOutcome, AttackRequest, DungeonInstance, DungeonSnapshot, GenerationReport, InstanceId,
    MoveOutcome, PlayerId, PlayerProfile, PlayerVitals, Ruleset, SpawnCheck, SpawnStrategy, Vec2,
    WorldPos,
};

use crate::api::{EnterDungeon, ExitDungeon, Result, RuntimeError};
use crate::config::RuntimeConfig;
use crate::events::{DungeonEvent, EventBus, SessionEvent};
use crate::workers::{InstanceHandle, InstanceWorker, PendingReply};

struct InstanceEntry {
    handle: InstanceHandle,
    floor: u32,
    /// Bound players and the binding number of each.
    players: BTreeMap<PlayerId, u64>,
    /// Ticks spent with no bound player.
    unclaimed_ticks: u64,
    task: JoinHandle<()>,
}

struct Session {
    profile: PlayerProfile,
    /// `None` while the player is in the hub.
    binding: Option<InstanceId>,
    hub_position: WorldPos,
}

#[derive(Default)]
struct RegistryState {
    instances: HashMap<InstanceId, InstanceEntry>,
    sessions: HashMap<PlayerId, Session>,
}

pub struct InstanceRegistry {
    rules: Arc<Ruleset>,
    event_bus: EventBus,
    command_buffer_size: usize,
    max_generation_attempts: u32,
    seed: Option<u64>,
    unclaimed_ttl_ticks: u64,
    next_instance_id: AtomicU64,
    next_binding: AtomicU64,
    state: RwLock<RegistryState>,
}

impl InstanceRegistry {
    pub fn new(rules: Arc<Ruleset>, config: &RuntimeConfig, event_bus: EventBus) -> Self {
        Self {
            rules,
            event_bus,
            command_buffer_size: config.command_buffer_size.max(1),
            max_generation_attempts: config.max_generation_attempts.max(1),
            seed: config.seed,
            unclaimed_ttl_ticks: config.unclaimed_instance_ttl_ticks,
            next_instance_id: AtomicU64::new(1),
            next_binding: AtomicU64::new(1),
            state: RwLock::new(RegistryState::default()),
        }
    }

    pub fn rules(&self) -> &Arc<Ruleset> {
        &self.rules
    }

    // ===== sessions =====

    /// Registers a player in the hub and returns the hub spawn. Connecting
    /// again replaces the profile and leaves any dungeon the player was in.
    /// Profiles with an out-of-range level are rejected.
    pub async fn connect(&self, player: PlayerId, profile: PlayerProfile) -> Result<WorldPos> {
        if let Err(err) = profile.validate() {
            warn!(
                target: "runtime::registry",
                player = %player,
                level = profile.level,
                "rejected player profile"
            );
            return Err(err.into());
        }

        let hub_spawn = self.rules.config.hub_spawn;
        let mut state = self.state.write().await;
        let previous = state.sessions.insert(
            player.clone(),
            Session {
                profile,
                binding: None,
                hub_position: hub_spawn,
            },
        );
        if let Some(instance) = previous.and_then(|session| session.binding) {
            self.release(&mut state, &player, instance);
        }
        drop(state);

        info!(target: "runtime::registry", player = %player, "player connected");
        self.event_bus.publish(SessionEvent::Connected { player, hub_spawn });
        Ok(hub_spawn)
    }

    pub async fn disconnect(&self, player: &PlayerId) -> Result<()> {
        let mut state = self.state.write().await;
        let Some(session) = state.sessions.remove(player) else {
            return Err(unknown_player(player));
        };
        if let Some(instance) = session.binding {
            self.release(&mut state, player, instance);
        }
        drop(state);

        info!(target: "runtime::registry", player = %player, "player disconnected");
        self.event_bus.publish(SessionEvent::Disconnected {
            player: player.clone(),
        });
        Ok(())
    }

    // ===== instance lifecycle =====

    /// Generates a floor at the configured world size and registers it with
    /// no players bound.
    pub async fn create_dungeon(&self, floor: u32) -> Result<InstanceId> {
        let config = &self.rules.config;
        self.create_dungeon_with_size(config.world_width, config.world_height, config.tile_size, floor)
            .await
    }

    /// Generates a floor of the given pixel size. The instance stays
    /// registered until every player who joined it has left, or until the
    /// unclaimed TTL runs out if nobody joins.
    pub async fn create_dungeon_with_size(
        &self,
        width: u32,
        height: u32,
        tile_size: u32,
        floor: u32,
    ) -> Result<InstanceId> {
        let (instance, report) = self.generate(floor, width, height, tile_size)?;
        let id = instance.id();
        let entry = self.spawn_worker(instance, floor);
        self.state.write().await.instances.insert(id, entry);
        self.event_bus.publish(DungeonEvent::InstanceCreated {
            instance: id,
            floor,
            report,
        });
        Ok(id)
    }

    /// Generates a fresh floor, binds the player to it and places them at its
    /// spawn point. The previous binding is released in the same step.
    pub async fn enter_dungeon(&self, player: &PlayerId, floor: u32) -> Result<EnterDungeon> {
        if !self.state.read().await.sessions.contains_key(player) {
            return Err(unknown_player(player));
        }

        let config = &self.rules.config;
        let (instance, report) =
            self.generate(floor, config.world_width, config.world_height, config.tile_size)?;
        let id = instance.id();

        let pending = {
            let mut state = self.state.write().await;
            // the session may have disconnected while the floor was generated
            if !state.sessions.contains_key(player) {
                return Err(unknown_player(player));
            }
            let entry = self.spawn_worker(instance, floor);
            state.instances.insert(id, entry);
            self.bind(&mut state, player, id)
        };

        self.event_bus.publish(DungeonEvent::InstanceCreated {
            instance: id,
            floor,
            report,
        });
        self.finish_binding(player, id, floor, pending).await
    }

    /// Binds the player to an existing instance.
    pub async fn join_dungeon(&self, player: &PlayerId, instance: InstanceId) -> Result<EnterDungeon> {
        let (floor, pending) = {
            let mut state = self.state.write().await;
            let Some(entry) = state.instances.get(&instance) else {
                warn!(target: "runtime::registry", player = %player, instance = %instance, "unknown instance");
                return Err(RuntimeError::UnknownInstance(instance));
            };
            let floor = entry.floor;
            (floor, self.bind(&mut state, player, instance))
        };
        self.finish_binding(player, instance, floor, pending).await
    }

    /// Moves the player to a fresh instance one floor deeper.
    pub async fn next_floor(&self, player: &PlayerId) -> Result<EnterDungeon> {
        let floor = {
            let state = self.state.read().await;
            let session = lookup_session(&state, player)?;
            let instance = session
                .binding
                .ok_or_else(|| RuntimeError::NotInDungeon(player.clone()))?;
            state
                .instances
                .get(&instance)
                .map(|entry| entry.floor)
                .ok_or(RuntimeError::UnknownInstance(instance))?
        };
        self.enter_dungeon(player, floor.saturating_add(1)).await
    }

    /// Returns the player to the hub.
    pub async fn exit_dungeon(&self, player: &PlayerId) -> Result<ExitDungeon> {
        let hub_spawn = self.rules.config.hub_spawn;
        let mut state = self.state.write().await;
        let session = state
            .sessions
            .get_mut(player)
            .ok_or_else(|| unknown_player(player))?;
        let instance = session
            .binding
            .take()
            .ok_or_else(|| RuntimeError::NotInDungeon(player.clone()))?;
        session.hub_position = hub_spawn;
        self.release(&mut state, player, instance);
        drop(state);

        info!(target: "runtime::registry", player = %player, instance = %instance, "player left dungeon");
        self.event_bus.publish(SessionEvent::LeftDungeon {
            player: player.clone(),
            instance,
        });
        Ok(ExitDungeon { hub_spawn })
    }

    // ===== player requests =====

    /// Routes a move to the player's current instance. Hub moves are
    /// accepted as-is. Accepted moves are broadcast to peers.
    pub async fn player_move(
        &self,
        player: &PlayerId,
        position: WorldPos,
        direction: Vec2,
    ) -> Result<MoveOutcome> {
        let routed = {
            let state = self.state.read().await;
            match lookup_session(&state, player)?.binding {
                Some(instance) => {
                    let handle = lookup_instance(&state, player, instance)?.handle.clone();
                    Some((instance, handle))
                }
                None => None,
            }
        };

        let (instance, outcome) = match routed {
            Some((instance, handle)) => {
                let outcome = handle
                    .queue_move(player.clone(), position, direction)
                    .await?
                    .wait()
                    .await?;
                (Some(instance), outcome)
            }
            None => {
                let mut state = self.state.write().await;
                let session = state
                    .sessions
                    .get_mut(player)
                    .ok_or_else(|| unknown_player(player))?;
                session.hub_position = position;
                let outcome = MoveOutcome::Accepted {
                    position,
                    revealed: 0,
                };
                (None, outcome)
            }
        };

        if let MoveOutcome::Accepted { position, .. } = outcome {
            self.event_bus.publish(SessionEvent::PlayerMoved {
                player: player.clone(),
                instance,
                position,
                direction,
            });
        }
        Ok(outcome)
    }

    /// Resolves an attack inside `instance`, which must be the player's
    /// current binding.
    pub async fn attack(
        &self,
        player: &PlayerId,
        instance: InstanceId,
        request: AttackRequest,
    ) -> Result<AttackOutcome> {
        let handle = {
            let state = self.state.read().await;
            resolve_bound(&state, player, instance)?.handle.clone()
        };
        handle.queue_attack(player.clone(), request).await?.wait().await
    }

    /// Snapshot of `instance` as seen by the player bound to it.
    pub async fn dungeon_state(&self, player: &PlayerId, instance: InstanceId) -> Result<DungeonSnapshot> {
        let handle = {
            let state = self.state.read().await;
            resolve_bound(&state, player, instance)?.handle.clone()
        };
        handle.queue_snapshot(player.clone()).await?.wait().await
    }

    /// Overwrites the player's HP mirror in their current instance.
    pub async fn report_vitals(&self, player: &PlayerId, current_hp: u32, max_hp: u32) -> Result<PlayerVitals> {
        let handle = {
            let state = self.state.read().await;
            let instance = lookup_session(&state, player)?
                .binding
                .ok_or_else(|| RuntimeError::NotInDungeon(player.clone()))?;
            lookup_instance(&state, player, instance)?.handle.clone()
        };
        handle
            .queue_report_vitals(player.clone(), current_hp, max_hp)
            .await?
            .wait()
            .await
    }

    /// Advances every live instance one step and waits until each has
    /// published its updates, then drops dead and expired instances.
    /// Returns how many instances ticked.
    pub async fn tick_all(&self) -> Result<usize> {
        let handles: Vec<InstanceHandle> = {
            let state = self.state.read().await;
            state.instances.values().map(|entry| entry.handle.clone()).collect()
        };

        let mut pending = Vec::with_capacity(handles.len());
        let mut dead = Vec::new();
        for handle in &handles {
            match handle.queue_tick().await {
                Ok(reply) => pending.push((handle.id(), reply)),
                Err(_) => dead.push(handle.id()),
            }
        }

        let mut ticked = 0;
        for (instance, reply) in pending {
            match reply.await {
                Ok(_) => ticked += 1,
                Err(_) => dead.push(instance),
            }
        }

        self.sweep(&dead).await;
        Ok(ticked)
    }

    // ===== queries =====

    pub async fn binding(&self, player: &PlayerId) -> Option<InstanceId> {
        self.state
            .read()
            .await
            .sessions
            .get(player)
            .and_then(|session| session.binding)
    }

    pub async fn hub_position(&self, player: &PlayerId) -> Option<WorldPos> {
        self.state
            .read()
            .await
            .sessions
            .get(player)
            .map(|session| session.hub_position)
    }

    pub async fn instance_count(&self) -> usize {
        self.state.read().await.instances.len()
    }

    pub async fn players_in(&self, instance: InstanceId) -> Option<Vec<PlayerId>> {
        self.state
            .read()
            .await
            .instances
            .get(&instance)
            .map(|entry| entry.players.keys().cloned().collect())
    }

    /// Drops every instance and waits for their workers to stop.
    pub async fn shutdown(&self) -> Result<()> {
        let entries: Vec<InstanceEntry> = {
            let mut state = self.state.write().await;
            for session in state.sessions.values_mut() {
                session.binding = None;
            }
            state.instances.drain().map(|(_, entry)| entry).collect()
        };

        for entry in entries {
            let InstanceEntry { handle, task, .. } = entry;
            drop(handle);
            task.await.map_err(RuntimeError::WorkerJoin)?;
        }
        Ok(())
    }

    // ===== internals =====

    fn generate(
        &self,
        floor: u32,
        width: u32,
        height: u32,
        tile_size: u32,
    ) -> Result<(DungeonInstance, GenerationReport)> {
        let id = InstanceId(self.next_instance_id.fetch_add(1, Ordering::Relaxed));
        let mut attempt = 0;
        loop {
            let seed = self.seed_for(id, attempt);
            match DungeonInstance::generate(
                id,
                floor,
                width,
                height,
                tile_size,
                Arc::clone(&self.rules),
                seed,
            ) {
                Ok((instance, report)) => {
                    log_generation(id, floor, &report);
                    return Ok((instance, report));
                }
                Err(source) => {
                    attempt += 1;
                    error!(
                        target: "runtime::registry",
                        instance = %id,
                        floor,
                        seed,
                        attempt,
                        error = %source,
                        "floor generation failed"
                    );
                    if attempt >= self.max_generation_attempts {
                        return Err(RuntimeError::GenerationFailed {
                            attempts: attempt,
                            source,
                        });
                    }
                }
            }
        }
    }

    fn seed_for(&self, id: InstanceId, attempt: u32) -> u64 {
        match self.seed {
            Some(base) => base
                .wrapping_add(id.0.wrapping_mul(0x9E37_79B9_7F4A_7C15))
                .wrapping_add(u64::from(attempt) << 32),
            None => rand::random(),
        }
    }

    fn spawn_worker(&self, instance: DungeonInstance, floor: u32) -> InstanceEntry {
        let id = instance.id();
        let (command_tx, command_rx) = mpsc::channel(self.command_buffer_size);
        let worker = InstanceWorker::new(instance, command_rx, self.event_bus.clone());
        let task = tokio::spawn(worker.run());
        InstanceEntry {
            handle: InstanceHandle::new(id, command_tx),
            floor,
            players: BTreeMap::new(),
            unclaimed_ticks: 0,
            task,
        }
    }

    /// Drops instances whose worker has stopped, returning their players to
    /// the hub, and instances left unclaimed for the configured TTL.
    async fn sweep(&self, dead: &[InstanceId]) {
        let hub_spawn = self.rules.config.hub_spawn;
        let ttl = self.unclaimed_ttl_ticks;
        let mut removed = Vec::new();
        let mut evicted = Vec::new();
        {
            let mut guard = self.state.write().await;
            let state = &mut *guard;
            for &instance in dead {
                let Some(entry) = state.instances.remove(&instance) else {
                    continue;
                };
                error!(
                    target: "runtime::registry",
                    instance = %instance,
                    players = entry.players.len(),
                    "instance worker stopped; dropping instance"
                );
                for player in entry.players.into_keys() {
                    if let Some(session) = state.sessions.get_mut(&player) {
                        if session.binding == Some(instance) {
                            session.binding = None;
                            session.hub_position = hub_spawn;
                            evicted.push((player, instance));
                        }
                    }
                }
                removed.push(instance);
            }

            state.instances.retain(|&instance, entry| {
                if !entry.players.is_empty() {
                    return true;
                }
                entry.unclaimed_ticks += 1;
                if entry.unclaimed_ticks < ttl {
                    return true;
                }
                info!(
                    target: "runtime::registry",
                    instance = %instance,
                    ticks = entry.unclaimed_ticks,
                    "unclaimed instance expired"
                );
                removed.push(instance);
                false
            });
        }

        for instance in removed {
            self.event_bus.publish(DungeonEvent::InstanceRemoved { instance });
        }
        for (player, instance) in evicted {
            self.event_bus
                .publish(SessionEvent::LeftDungeon { player, instance });
        }
    }

    /// Releases the player's previous binding, binds them to `target` and
    /// queues their assignment. Must run under the write lock. If the
    /// assignment cannot be queued the player is left in the hub.
    fn bind(
        &self,
        state: &mut RegistryState,
        player: &PlayerId,
        target: InstanceId,
    ) -> Result<PendingReply<(SpawnCheck, DungeonSnapshot)>> {
        let session = lookup_session(state, player)?;
        let profile = session.profile.clone();
        let previous = session.binding;
        if let Some(previous) = previous.filter(|previous| *previous != target) {
            self.release(state, player, previous);
        }

        let binding = self.next_binding.fetch_add(1, Ordering::Relaxed);
        let queued = match state.instances.get_mut(&target) {
            Some(entry) => entry
                .handle
                .try_queue_assign(player.clone(), profile, binding)
                .map(|pending| {
                    entry.players.insert(player.clone(), binding);
                    pending
                }),
            None => Err(RuntimeError::UnknownInstance(target)),
        };
        if let Some(session) = state.sessions.get_mut(player) {
            session.binding = queued.as_ref().ok().map(|_| target);
        }
        queued
    }

    /// Waits for the queued assignment. On failure the binding is undone so
    /// the player ends up in the hub.
    async fn finish_binding(
        &self,
        player: &PlayerId,
        instance: InstanceId,
        floor: u32,
        pending: Result<PendingReply<(SpawnCheck, DungeonSnapshot)>>,
    ) -> Result<EnterDungeon> {
        let assigned = match pending {
            Ok(pending) => pending.wait().await,
            Err(err) => Err(err),
        };
        let (check, snapshot) = match assigned {
            Ok(assigned) => assigned,
            Err(err) => {
                error!(
                    target: "runtime::registry",
                    player = %player,
                    instance = %instance,
                    error = %err,
                    "failed to place player; returning them to the hub"
                );
                self.unbind(player, instance).await;
                return Err(err);
            }
        };

        info!(
            target: "runtime::registry",
            player = %player,
            instance = %instance,
            floor,
            "player entered dungeon"
        );
        self.event_bus.publish(SessionEvent::EnteredDungeon {
            player: player.clone(),
            instance,
            floor,
        });
        Ok(EnterDungeon {
            instance_id: instance,
            floor,
            spawn: check.point.position,
            spawn_strategy: check.point.strategy,
            snapshot,
        })
    }

    async fn unbind(&self, player: &PlayerId, instance: InstanceId) {
        let mut state = self.state.write().await;
        if let Some(session) = state.sessions.get_mut(player) {
            if session.binding == Some(instance) {
                session.binding = None;
            }
        }
        self.release(&mut state, player, instance);
    }

    /// Drops the player from `instance`, removing the instance when it was
    /// the last one bound. A removal that finds the instance queue full is
    /// delivered from a background task.
    fn release(&self, state: &mut RegistryState, player: &PlayerId, instance: InstanceId) {
        let Some(entry) = state.instances.get_mut(&instance) else {
            return;
        };
        let Some(binding) = entry.players.remove(player) else {
            return;
        };

        if entry.players.is_empty() {
            state.instances.remove(&instance);
            info!(target: "runtime::registry", instance = %instance, "instance released");
            self.event_bus
                .publish(DungeonEvent::InstanceRemoved { instance });
            return;
        }

        match entry.handle.try_remove(player.clone(), binding) {
            Ok(()) => {}
            Err(RuntimeError::InstanceBusy(_)) => {
                let handle = entry.handle.clone();
                let player = player.clone();
                tokio::spawn(async move {
                    if let Err(err) = handle.remove(player.clone(), binding).await {
                        warn!(
                            target: "runtime::registry",
                            instance = %handle.id(),
                            player = %player,
                            error = %err,
                            "failed to unbind player from instance"
                        );
                    }
                });
            }
            Err(err) => warn!(
                target: "runtime::registry",
                instance = %instance,
                player = %player,
                error = %err,
                "failed to unbind player from instance"
            ),
        }
    }
}

fn unknown_player(player: &PlayerId) -> RuntimeError {
    warn!(target: "runtime::registry", player = %player, "unknown player");
    RuntimeError::UnknownPlayer(player.clone())
}

fn lookup_session<'a>(state: &'a RegistryState, player: &PlayerId) -> Result<&'a Session> {
    state
        .sessions
        .get(player)
        .ok_or_else(|| unknown_player(player))
}

fn lookup_instance<'a>(
    state: &'a RegistryState,
    player: &PlayerId,
    instance: InstanceId,
) -> Result<&'a InstanceEntry> {
    state.instances.get(&instance).ok_or_else(|| {
        warn!(target: "runtime::registry", player = %player, instance = %instance, "unknown instance");
        RuntimeError::UnknownInstance(instance)
    })
}

/// Entry for `requested`, provided it is the player's current binding.
fn resolve_bound<'a>(
    state: &'a RegistryState,
    player: &PlayerId,
    requested: InstanceId,
) -> Result<&'a InstanceEntry> {
    let bound = lookup_session(state, player)?.binding;
    if bound != Some(requested) {
        warn!(
            target: "runtime::registry",
            player = %player,
            requested = %requested,
            bound = ?bound,
            "stale instance reference"
        );
        return Err(RuntimeError::StaleInstance {
            player: player.clone(),
            requested,
            bound,
        });
    }
    lookup_instance(state, player, requested)
}

fn log_generation(id: InstanceId, floor: u32, report: &GenerationReport) {
    if report.degenerate {
        warn!(
            target: "runtime::registry",
            instance = %id,
            floor,
            requested = report.requested_rooms,
            placed = report.rooms_placed,
            "degenerate generation"
        );
    }
    for (point, strategy) in [("spawn", report.spawn_strategy), ("ladder", report.ladder_strategy)] {
        if strategy.is_degraded() {
            warn!(target: "runtime::registry", instance = %id, point, strategy = %strategy, "point resolved by fallback search");
        } else if !matches!(strategy, SpawnStrategy::RoomCenter | SpawnStrategy::LadderRoom) {
            info!(target: "runtime::registry", instance = %id, point, strategy = %strategy, "point resolved outside a room center");
        }
    }
    info!(
        target: "runtime::registry",
        instance = %id,
        floor,
        seed = report.seed,
        rooms = report.rooms_placed,
        npcs = report.npc_count,
        "instance created"
    );
}
