//! Actor that owns one [`DungeonInstance`].
//!
//! Every read and write of an instance arrives as an [`InstanceCommand`] on
//! the worker's channel and is applied in arrival order. A player move is
//! therefore applied entirely before or entirely after a tick, never across
//! it. Updates are published after the mutation that produced them.
//!
//! Assignments and removals carry the registry's binding number. A removal
//! only applies to the binding it was issued for, so a late removal never
//! unbinds a player who has since been assigned again.

use std::collections::HashMap;

use tokio::sync::mpsc::error::TrySendError;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, trace, warn};

use game_core::{
    AttackOutcome, AttackRequest, DungeonInstance, DungeonSnapshot, GameError,
    InstanceError, InstanceId, MoveOutcome, PlayerId, PlayerProfile, PlayerVitals, SpawnCheck,
    TickReport, Vec2, WorldPos,
};

use crate::api::{Result, RuntimeError};
use crate::events::{CombatEvent, DungeonEvent, EventBus};

use InstanceCommand as Command;

type Reply<T> = oneshot::Sender<std::result::Result<T, InstanceError>>;

/// Commands that can be sent to an instance worker
pub enum InstanceCommand {
    /// Bind a player at the spawn point and return their first snapshot.
    Assign {
        player: PlayerId,
        profile: PlayerProfile,
        binding: u64,
        reply: Reply<(SpawnCheck, DungeonSnapshot)>,
    },
    /// Unbind a player. Ignored unless `binding` is the player's current one.
    Remove { player: PlayerId, binding: u64 },
    Move {
        player: PlayerId,
        position: WorldPos,
        direction: Vec2,
        reply: Reply<MoveOutcome>,
    },
    Attack {
        player: PlayerId,
        request: AttackRequest,
        reply: Reply<AttackOutcome>,
    },
    Snapshot {
        player: PlayerId,
        reply: Reply<DungeonSnapshot>,
    },
    ReportVitals {
        player: PlayerId,
        current_hp: u32,
        max_hp: u32,
        reply: Reply<PlayerVitals>,
    },
    /// Advance the simulation one step and publish per-player updates.
    Tick {
        reply: Option<oneshot::Sender<TickReport>>,
    },
}

/// Background task that owns one instance.
pub struct InstanceWorker {
    instance: DungeonInstance,
    command_rx: mpsc::Receiver<Command>,
    event_bus: EventBus,
    bindings: HashMap<PlayerId, u64>,
}

impl InstanceWorker {
    pub fn new(
        instance: DungeonInstance,
        command_rx: mpsc::Receiver<InstanceCommand>,
        event_bus: EventBus,
    ) -> Self {
        Self {
            instance,
            command_rx,
            event_bus,
            bindings: HashMap::new(),
        }
    }

    /// Main worker loop. Ends when every [`InstanceHandle`] is dropped.
    pub async fn run(mut self) {
        let id = self.instance.id();
        debug!(target: "runtime::instance", instance = %id, "worker started");
        loop {
            tokio::select! {
                Some(cmd) = self.command_rx.recv() => {
                    self.handle_command(cmd);
                }
                else => break,
            }
        }
        debug!(target: "runtime::instance", instance = %id, "worker stopped");
    }

    fn handle_command(&mut self, cmd: Command) {
        match cmd {
            Command::Assign {
                player,
                profile,
                binding,
                reply,
            } => {
                let result = self.assign(&player, profile);
                if result.is_ok() {
                    self.bindings.insert(player.clone(), binding);
                }
                self.log_failure(&player, &result);
                let _ = reply.send(result);
            }
            Command::Remove { player, binding } => {
                if self.bindings.get(&player) != Some(&binding) {
                    trace!(
                        target: "runtime::instance",
                        instance = %self.instance.id(),
                        player = %player,
                        binding,
                        "ignoring removal of a superseded binding"
                    );
                    return;
                }
                self.bindings.remove(&player);
                if self.instance.remove_player(&player).is_some() {
                    debug!(
                        target: "runtime::instance",
                        instance = %self.instance.id(),
                        player = %player,
                        "player removed"
                    );
                }
            }
            Command::Move {
                player,
                position,
                direction,
                reply,
            } => {
                let result = self.instance.apply_player_move(&player, position, direction);
                if let Ok(MoveOutcome::Rejected { authoritative }) = &result {
                    debug!(
                        target: "runtime::instance",
                        instance = %self.instance.id(),
                        player = %player,
                        x = position.x,
                        y = position.y,
                        revert_x = authoritative.x,
                        revert_y = authoritative.y,
                        "move rejected"
                    );
                }
                self.log_failure(&player, &result);
                let _ = reply.send(result);
            }
            Command::Attack {
                player,
                request,
                reply,
            } => {
                let result = self.attack(&player, request);
                self.log_failure(&player, &result);
                let _ = reply.send(result);
            }
            Command::Snapshot { player, reply } => {
                let result = self.instance.snapshot(&player);
                self.log_failure(&player, &result);
                let _ = reply.send(result);
            }
            Command::ReportVitals {
                player,
                current_hp,
                max_hp,
                reply,
            } => {
                let result = self.instance.report_vitals(&player, current_hp, max_hp);
                self.log_failure(&player, &result);
                let _ = reply.send(result);
            }
            Command::Tick { reply } => {
                let report = self.tick();
                if let Some(reply) = reply {
                    let _ = reply.send(report);
                }
            }
        }
    }

    fn assign(
        &mut self,
        player: &PlayerId,
        profile: PlayerProfile,
    ) -> std::result::Result<(SpawnCheck, DungeonSnapshot), InstanceError> {
        let id = self.instance.id();
        let check = self.instance.assign_player(player.clone(), profile)?;
        if check.rechecked {
            error!(
                target: "runtime::instance",
                instance = %id,
                player = %player,
                stored = ?self.instance.spawn().tile,
                resolved = ?check.point.tile,
                strategy = %check.point.strategy,
                "stored spawn point is not walkable; re-resolved"
            );
        }
        info!(
            target: "runtime::instance",
            instance = %id,
            player = %player,
            x = check.point.position.x,
            y = check.point.position.y,
            "player assigned"
        );
        let snapshot = self.instance.snapshot(player)?;
        Ok((check, snapshot))
    }

    fn attack(
        &mut self,
        player: &PlayerId,
        request: AttackRequest,
    ) -> std::result::Result<AttackOutcome, InstanceError> {
        let move_name = request.move_name.clone();
        let outcome = self.instance.handle_player_attack(player, request)?;
        let instance = self.instance.id();

        debug!(
            target: "runtime::instance",
            instance = %instance,
            player = %player,
            move_name = %move_name,
            affected = outcome.affected.len(),
            fainted = outcome.fainted.len(),
            "attack resolved"
        );
        self.event_bus.publish(CombatEvent::PlayerAttack {
            instance,
            player: player.clone(),
            move_name,
            outcome: outcome.clone(),
        });
        self.publish_updates(&TickReport::default());
        Ok(outcome)
    }

    fn tick(&mut self) -> TickReport {
        let report = self.instance.tick();
        let instance = self.instance.id();
        trace!(
            target: "runtime::instance",
            instance = %instance,
            tick = report.tick,
            engagements = report.engagements.len(),
            projectile_hits = report.projectile_hits.len(),
            "tick"
        );
        if !report.fainted.is_empty() {
            self.event_bus.publish(CombatEvent::NpcsFainted {
                instance,
                npcs: report.fainted.clone(),
            });
        }
        self.publish_updates(&report);
        report
    }

    fn publish_updates(&mut self, report: &TickReport) {
        for (player, update) in self.instance.collect_updates(report) {
            self.event_bus.publish(DungeonEvent::Update { player, update });
        }
    }

    fn log_failure<T>(&self, player: &PlayerId, result: &std::result::Result<T, InstanceError>) {
        if let Err(err) = result {
            warn!(
                target: "runtime::instance",
                instance = %self.instance.id(),
                player = %player,
                code = err.error_code(),
                error = %err,
                "request rejected"
            );
        }
    }
}

/// Cloneable address of one instance worker.
#[derive(Clone, Debug)]
pub struct InstanceHandle {
    id: InstanceId,
    command_tx: mpsc::Sender<InstanceCommand>,
}

impl InstanceHandle {
    pub fn new(id: InstanceId, command_tx: mpsc::Sender<InstanceCommand>) -> Self {
        Self { id, command_tx }
    }

    pub fn id(&self) -> InstanceId {
        self.id
    }

    async fn send(&self, command: InstanceCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .await
            .map_err(|_| RuntimeError::CommandChannelClosed)
    }

    /// Enqueues without waiting for capacity. The registry uses this while it
    /// holds its lock.
    fn try_send(&self, command: InstanceCommand) -> Result<()> {
        self.command_tx.try_send(command).map_err(|err| match err {
            TrySendError::Full(_) => RuntimeError::InstanceBusy(self.id),
            TrySendError::Closed(_) => RuntimeError::CommandChannelClosed,
        })
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(Reply<T>) -> InstanceCommand,
    ) -> Result<oneshot::Receiver<std::result::Result<T, InstanceError>>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(build(reply_tx)).await?;
        Ok(reply_rx)
    }

    async fn finish<T>(
        reply_rx: oneshot::Receiver<std::result::Result<T, InstanceError>>,
    ) -> Result<T> {
        reply_rx
            .await
            .map_err(RuntimeError::ReplyChannelClosed)?
            .map_err(RuntimeError::from)
    }

    /// Queues an assignment without waiting for queue capacity and returns
    /// the pending reply. Commands queued afterwards observe the player as
    /// bound. A full queue fails with [`RuntimeError::InstanceBusy`].
    pub fn try_queue_assign(
        &self,
        player: PlayerId,
        profile: PlayerProfile,
        binding: u64,
    ) -> Result<PendingReply<(SpawnCheck, DungeonSnapshot)>> {
        let (reply, rx) = oneshot::channel();
        let command = InstanceCommand::Assign {
            player,
            profile,
            binding,
            reply,
        };
        self.try_send(command)?;
        Ok(PendingReply(rx))
    }

    /// Queues a removal without waiting for queue capacity.
    pub fn try_remove(&self, player: PlayerId, binding: u64) -> Result<()> {
        self.try_send(InstanceCommand::Remove { player, binding })
    }

    pub async fn remove(&self, player: PlayerId, binding: u64) -> Result<()> {
        self.send(InstanceCommand::Remove { player, binding }).await
    }

    /// Queues a move; see [`try_queue_assign`](Self::try_queue_assign).
    pub async fn queue_move(
        &self,
        player: PlayerId,
        position: WorldPos,
        direction: Vec2,
    ) -> Result<PendingReply<MoveOutcome>> {
        let rx = self
            .request(|reply| InstanceCommand::Move {
                player,
                position,
                direction,
                reply,
            })
            .await?;
        Ok(PendingReply(rx))
    }

    pub async fn queue_attack(
        &self,
        player: PlayerId,
        request: AttackRequest,
    ) -> Result<PendingReply<AttackOutcome>> {
        let rx = self
            .request(|reply| InstanceCommand::Attack {
                player,
                request,
                reply,
            })
            .await?;
        Ok(PendingReply(rx))
    }

    pub async fn queue_snapshot(&self, player: PlayerId) -> Result<PendingReply<DungeonSnapshot>> {
        let rx = self
            .request(|reply| InstanceCommand::Snapshot { player, reply })
            .await?;
        Ok(PendingReply(rx))
    }

    pub async fn queue_report_vitals(
        &self,
        player: PlayerId,
        current_hp: u32,
        max_hp: u32,
    ) -> Result<PendingReply<PlayerVitals>> {
        let rx = self
            .request(|reply| InstanceCommand::ReportVitals {
                player,
                current_hp,
                max_hp,
                reply,
            })
            .await?;
        Ok(PendingReply(rx))
    }

    /// Queues a tick. The returned receiver resolves once the tick and its
    /// updates are done.
    pub async fn queue_tick(&self) -> Result<oneshot::Receiver<TickReport>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(InstanceCommand::Tick {
            reply: Some(reply_tx),
        })
        .await?;
        Ok(reply_rx)
    }
}

/// Reply to a command that has already been queued.
pub struct PendingReply<T>(oneshot::Receiver<std::result::Result<T, InstanceError>>);

impl<T> PendingReply<T> {
    pub async fn wait(self) -> Result<T> {
        InstanceHandle::finish(self.0).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use game_core::Ruleset;

    use super::*;

    fn floor() -> DungeonInstance {
        let rules = Arc::new(Ruleset::default());
        let (width, height, tile_size) = (
            rules.config.world_width,
            rules.config.world_height,
            rules.config.tile_size,
        );
        (0..32)
            .find_map(|seed| {
                DungeonInstance::generate(
                    InstanceId(1),
                    1,
                    width,
                    height,
                    tile_size,
                    Arc::clone(&rules),
                    seed,
                )
                .ok()
            })
            .map(|(instance, _)| instance)
            .unwrap()
    }

    fn spawn(instance: DungeonInstance) -> InstanceHandle {
        let (tx, rx) = mpsc::channel(8);
        let handle = InstanceHandle::new(instance.id(), tx);
        tokio::spawn(InstanceWorker::new(instance, rx, EventBus::with_capacity(16)).run());
        handle
    }

    #[tokio::test]
    async fn full_queue_reports_busy_instead_of_waiting() {
        let (tx, _rx) = mpsc::channel(1);
        let handle = InstanceHandle::new(InstanceId(3), tx);
        let alice = PlayerId::new("alice");

        let first = handle.try_queue_assign(alice.clone(), PlayerProfile::default(), 1);
        assert!(first.is_ok());

        let err = handle
            .try_queue_assign(PlayerId::new("bob"), PlayerProfile::default(), 2)
            .err()
            .unwrap();
        assert!(matches!(err, RuntimeError::InstanceBusy(InstanceId(3))));
        assert!(matches!(
            handle.try_remove(alice, 1),
            Err(RuntimeError::InstanceBusy(_))
        ));
    }

    #[tokio::test]
    async fn closed_queue_is_not_reported_as_busy() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let handle = InstanceHandle::new(InstanceId(4), tx);
        assert!(matches!(
            handle.try_remove(PlayerId::new("alice"), 1),
            Err(RuntimeError::CommandChannelClosed)
        ));
    }

    #[tokio::test]
    async fn removal_only_applies_to_its_own_binding() {
        let handle = spawn(floor());
        let alice = PlayerId::new("alice");

        handle
            .try_queue_assign(alice.clone(), PlayerProfile::default(), 1)
            .unwrap()
            .wait()
            .await
            .unwrap();
        handle
            .try_queue_assign(alice.clone(), PlayerProfile::default(), 2)
            .unwrap()
            .wait()
            .await
            .unwrap();

        handle.try_remove(alice.clone(), 1).unwrap();
        let snapshot = handle.queue_snapshot(alice.clone()).await.unwrap().wait().await;
        assert!(snapshot.is_ok());

        handle.remove(alice.clone(), 2).await.unwrap();
        let snapshot = handle.queue_snapshot(alice).await.unwrap().wait().await;
        assert!(matches!(
            snapshot,
            Err(RuntimeError::Instance(InstanceError::UnknownPlayer(_)))
        ));
    }
}
