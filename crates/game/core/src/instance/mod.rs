//! One generated dungeon floor and all of its mutable state.
//!
//! [`DungeonInstance`] owns the grid, rooms, spawn and ladder points, NPC
//! roster, in-flight projectiles and each bound player's private state. Every
//! mutation goes through `&mut self`, so whoever holds the instance
//! serializes access to it; two instances share nothing but the read-only
//! [`Ruleset`].
mod exploration;
mod player;
mod snapshot;

pub use exploration::ExplorationMap;
pub use player::{PlayerProfile, PlayerState, PlayerVitals};
pub use snapshot::{DungeonSnapshot, DungeonUpdate, TickReport};

use std::collections::BTreeMap;
use std::sync::Arc;

use crate::behavior::{self, Target};
use crate::combat::{
    AffectedNpc, AttackKind, AttackRequest, EffectTrigger, PlayerAttack, Projectile,
    ProjectileHit, ProjectileOutcome, ProjectileOwner, remove_fainted, resolve_direct, strike,
};
use crate::error::{ErrorSeverity, GameError};
use crate::geometry::{Aabb, TilePos, Vec2, WorldPos};
use crate::ids::{InstanceId, NpcId, PlayerId, ProjectileId};
use crate::map::{self, Room, Terrain, TileGrid};
use crate::npc::{NpcEntity, NpcSpawner};
use crate::rng::GameRng;
use crate::rules::Ruleset;
use crate::spawn::{SpawnError, SpawnPoint, SpawnResolver, SpawnStrategy};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum InstanceError {
    #[error("player {0} is not bound to this instance")]
    UnknownPlayer(PlayerId),

    #[error("profile level {level} is outside 1..={max}")]
    InvalidLevel { level: u32, max: u32 },

    #[error(transparent)]
    Spawn(#[from] SpawnError),
}

impl GameError for InstanceError {
    fn severity(&self) -> ErrorSeverity {
        match self {
            Self::UnknownPlayer(_) | Self::InvalidLevel { .. } => ErrorSeverity::Validation,
            Self::Spawn(err) => err.severity(),
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            Self::UnknownPlayer(_) => "INSTANCE_UNKNOWN_PLAYER",
            Self::InvalidLevel { .. } => "INSTANCE_INVALID_LEVEL",
            Self::Spawn(err) => err.error_code(),
        }
    }
}

/// Facts about a generation run for the caller to log.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GenerationReport {
    pub seed: u64,
    pub requested_rooms: u32,
    pub rooms_placed: usize,
    pub degenerate: bool,
    pub spawn_strategy: SpawnStrategy,
    pub ladder_strategy: SpawnStrategy,
    pub npc_count: usize,
}

/// Spawn point handed to a player, and whether the stored point failed its
/// walkability re-check and had to be searched for again.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SpawnCheck {
    pub point: SpawnPoint,
    pub rechecked: bool,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "status", rename_all = "snake_case"))]
pub enum MoveOutcome {
    Accepted {
        position: WorldPos,
        revealed: usize,
    },
    /// The client must snap back to `authoritative`.
    Rejected { authoritative: WorldPos },
}

/// Immediate result of a player attack.
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttackOutcome {
    pub affected: Vec<AffectedNpc>,
    pub fainted: Vec<NpcId>,
    /// Set for projectile attacks; hits arrive with later ticks.
    pub projectile: Option<ProjectileId>,
}

#[derive(Debug)]
pub struct DungeonInstance {
    id: InstanceId,
    floor: u32,
    width: u32,
    height: u32,
    tile_size: u32,
    grid: TileGrid,
    rooms: Vec<Room>,
    spawn: SpawnPoint,
    ladder: SpawnPoint,
    npcs: Vec<NpcEntity>,
    projectiles: Vec<Projectile>,
    players: BTreeMap<PlayerId, PlayerState>,
    rules: Arc<Ruleset>,
    rng: GameRng,
    next_projectile_id: u32,
    tick: u64,
}

impl DungeonInstance {
    /// Generates grid and rooms, resolves spawn and ladder, and populates
    /// the rooms. Fails only when the grid has no floor tile at all.
    pub fn generate(
        id: InstanceId,
        floor: u32,
        width: u32,
        height: u32,
        tile_size: u32,
        rules: Arc<Ruleset>,
        seed: u64,
    ) -> Result<(Self, GenerationReport), InstanceError> {
        let mut rng = GameRng::new(seed);
        let layout = map::generate(width, height, tile_size, &rules.config.generation, &mut rng);
        let degenerate = layout.is_degenerate();
        let requested_rooms = layout.requested_rooms;

        let npcs = NpcSpawner::new(&rules, tile_size).spawn_npcs(&layout.rooms, floor, 0, &mut rng);
        let instance = Self::assemble(
            id,
            floor,
            (width, height),
            tile_size,
            layout.grid,
            layout.rooms,
            npcs,
            rules,
            rng,
        )?;

        let report = GenerationReport {
            seed,
            requested_rooms,
            rooms_placed: instance.rooms.len(),
            degenerate,
            spawn_strategy: instance.spawn.strategy,
            ladder_strategy: instance.ladder.strategy,
            npc_count: instance.npcs.len(),
        };
        Ok((instance, report))
    }

    /// Builds an instance around a prepared grid. World size is derived
    /// from the grid.
    #[allow(clippy::too_many_arguments)]
    pub fn from_layout(
        id: InstanceId,
        floor: u32,
        tile_size: u32,
        grid: TileGrid,
        rooms: Vec<Room>,
        npcs: Vec<NpcEntity>,
        rules: Arc<Ruleset>,
        seed: u64,
    ) -> Result<Self, InstanceError> {
        let size = (grid.width() * tile_size, grid.height() * tile_size);
        Self::assemble(id, floor, size, tile_size, grid, rooms, npcs, rules, GameRng::new(seed))
    }

    #[allow(clippy::too_many_arguments)]
    fn assemble(
        id: InstanceId,
        floor: u32,
        (width, height): (u32, u32),
        tile_size: u32,
        grid: TileGrid,
        rooms: Vec<Room>,
        npcs: Vec<NpcEntity>,
        rules: Arc<Ruleset>,
        mut rng: GameRng,
    ) -> Result<Self, InstanceError> {
        let resolver = SpawnResolver::new(&grid, &rooms, tile_size)
            .with_spiral_rings(rules.config.generation.spiral_rings);
        let spawn = resolver.resolve_spawn()?;
        let ladder = resolver.resolve_ladder(&mut rng, Some(spawn.tile))?;

        Ok(Self {
            id,
            floor,
            width,
            height,
            tile_size,
            grid,
            rooms,
            spawn,
            ladder,
            npcs,
            projectiles: Vec::new(),
            players: BTreeMap::new(),
            rules,
            rng,
            next_projectile_id: 0,
            tick: 0,
        })
    }

    // ===== accessors =====

    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn floor(&self) -> u32 {
        self.floor
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn rooms(&self) -> &[Room] {
        &self.rooms
    }

    pub fn spawn(&self) -> SpawnPoint {
        self.spawn
    }

    pub fn ladder(&self) -> SpawnPoint {
        self.ladder
    }

    pub fn npcs(&self) -> &[NpcEntity] {
        &self.npcs
    }

    pub fn npc(&self, id: NpcId) -> Option<&NpcEntity> {
        self.npcs.iter().find(|npc| npc.id == id)
    }

    pub fn projectiles(&self) -> &[Projectile] {
        &self.projectiles
    }

    pub fn player(&self, player: &PlayerId) -> Option<&PlayerState> {
        self.players.get(player)
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn terrain(&self) -> Terrain<'_> {
        Terrain::new(&self.grid, self.tile_size)
    }

    // ===== players =====

    /// Binds a player at the spawn point with an all-unseen exploration
    /// map (or all-seen when `reveal_all_tiles` is set), then reveals the
    /// spawn surroundings. Re-assigning resets the player's state.
    pub fn assign_player(
        &mut self,
        player: PlayerId,
        profile: PlayerProfile,
    ) -> Result<SpawnCheck, InstanceError> {
        profile.validate()?;
        let check = self.player_spawn()?;
        let (columns, rows) = (self.grid.width(), self.grid.height());
        let explored = if self.rules.config.reveal_all_tiles {
            ExplorationMap::fully_revealed(columns, rows)
        } else {
            ExplorationMap::new(columns, rows)
        };
        let combatant = self.rules.combatant(&profile.species, profile.level);
        let vitals = PlayerVitals {
            current_hp: combatant.stats.hp,
            max_hp: combatant.stats.hp,
        };

        self.players.insert(
            player.clone(),
            PlayerState {
                profile,
                position: check.point.position,
                facing: PlayerState::DEFAULT_FACING,
                explored,
                explored_delta: Vec::new(),
                vitals,
                combatant,
            },
        );
        self.update_explored(&player, check.point.position)?;
        Ok(check)
    }

    pub fn remove_player(&mut self, player: &PlayerId) -> Option<PlayerState> {
        self.players.remove(player)
    }

    /// The stored spawn point, re-verified. A point that is no longer
    /// walkable is replaced by the nearest walkable tile.
    pub fn player_spawn(&self) -> Result<SpawnCheck, InstanceError> {
        if self.grid.is_floor(self.spawn.tile) {
            return Ok(SpawnCheck {
                point: self.spawn,
                rechecked: false,
            });
        }
        let point = SpawnResolver::new(&self.grid, &self.rooms, self.tile_size)
            .with_spiral_rings(self.rules.config.generation.spiral_rings)
            .nearest_walkable(self.spawn.tile)?;
        Ok(SpawnCheck {
            point,
            rechecked: true,
        })
    }

    pub fn is_walkable(&self, position: WorldPos) -> bool {
        self.terrain().is_walkable(position)
    }

    pub fn is_valid_move(&self, position: WorldPos, width: f32, height: f32) -> bool {
        self.terrain().is_valid_move(position, width, height)
    }

    /// Reveals the containing tile, and the whole room when the position is
    /// inside one. Returns how many tiles were newly revealed.
    pub fn update_explored(
        &mut self,
        player: &PlayerId,
        position: WorldPos,
    ) -> Result<usize, InstanceError> {
        let tile = TilePos::from_world(position, self.tile_size);
        let state = self
            .players
            .get_mut(player)
            .ok_or_else(|| InstanceError::UnknownPlayer(player.clone()))?;
        if !self.grid.contains(tile) {
            return Ok(0);
        }

        let before = state.explored_delta.len();
        if state.explored.reveal(tile) {
            state.explored_delta.push(tile);
        }
        if let Some(room) = self.rooms.iter().find(|room| room.contains(tile)) {
            state.explored.reveal_room(room, &mut state.explored_delta);
        }
        Ok(state.explored_delta.len() - before)
    }

    /// Validates the player's box at `position` and, when valid, applies
    /// position, facing and exploration together.
    pub fn apply_player_move(
        &mut self,
        player: &PlayerId,
        position: WorldPos,
        direction: Vec2,
    ) -> Result<MoveOutcome, InstanceError> {
        let size = self.rules.config.player_size;
        let valid = self.is_valid_move(position, size, size);
        let state = self
            .players
            .get_mut(player)
            .ok_or_else(|| InstanceError::UnknownPlayer(player.clone()))?;
        if !valid {
            return Ok(MoveOutcome::Rejected {
                authoritative: state.position,
            });
        }

        state.position = position;
        if let Some(facing) = direction.normalized() {
            state.facing = facing;
        }
        let revealed = self.update_explored(player, position)?;
        Ok(MoveOutcome::Accepted { position, revealed })
    }

    /// Overwrites the HP mirror with the session layer's values.
    pub fn report_vitals(
        &mut self,
        player: &PlayerId,
        current_hp: u32,
        max_hp: u32,
    ) -> Result<PlayerVitals, InstanceError> {
        let state = self
            .players
            .get_mut(player)
            .ok_or_else(|| InstanceError::UnknownPlayer(player.clone()))?;
        state.vitals = PlayerVitals {
            current_hp: current_hp.min(max_hp),
            max_hp,
        };
        Ok(state.vitals)
    }

    pub fn snapshot(&self, player: &PlayerId) -> Result<DungeonSnapshot, InstanceError> {
        let state = self
            .players
            .get(player)
            .ok_or_else(|| InstanceError::UnknownPlayer(player.clone()))?;
        Ok(DungeonSnapshot {
            instance_id: self.id,
            floor: self.floor,
            width: self.width,
            height: self.height,
            tile_size: self.tile_size,
            tiles: self.grid.rows().map(<[_]>::to_vec).collect(),
            rooms: self.rooms.clone(),
            ladder: self.ladder.position,
            explored: state.explored.rows(),
            npcs: self.npcs.iter().map(NpcEntity::view).collect(),
            projectiles: self.projectiles.iter().map(Projectile::view).collect(),
        })
    }

    // ===== combat =====

    /// Applies a player attack from the player's authoritative position and
    /// facing. Direct attacks resolve now; projectile attacks launch and
    /// resolve over later ticks.
    pub fn handle_player_attack(
        &mut self,
        player: &PlayerId,
        request: AttackRequest,
    ) -> Result<AttackOutcome, InstanceError> {
        let state = self
            .players
            .get(player)
            .ok_or_else(|| InstanceError::UnknownPlayer(player.clone()))?;
        let attack = PlayerAttack {
            move_name: request.move_name,
            kind: request.kind,
            origin: state.position,
            direction: state.facing,
            damage: request.damage,
            range: request.range,
        };

        match attack.kind {
            AttackKind::Direct => {
                let affected =
                    resolve_direct(&mut self.npcs, attack.origin, attack.range, attack.damage);
                let fainted = affected
                    .iter()
                    .filter(|npc| npc.current_hp == 0)
                    .map(|npc| npc.id)
                    .collect();
                Ok(AttackOutcome {
                    affected,
                    fainted,
                    projectile: None,
                })
            }
            AttackKind::Projectile => {
                let half = self.rules.config.player_size / 2.0;
                let origin = attack.origin + Vec2::new(half, half);
                let owner = ProjectileOwner::Player(player.clone());
                let id = self.launch(
                    owner,
                    attack.move_name,
                    origin,
                    attack.direction,
                    attack.damage,
                    attack.range,
                );
                Ok(AttackOutcome {
                    projectile: Some(id),
                    ..AttackOutcome::default()
                })
            }
        }
    }

    fn launch(
        &mut self,
        owner: ProjectileOwner,
        move_name: String,
        origin: WorldPos,
        direction: Vec2,
        damage: u32,
        range: f32,
    ) -> ProjectileId {
        let id = ProjectileId(self.next_projectile_id);
        self.next_projectile_id += 1;
        let params = &self.rules.config.projectiles;
        self.projectiles.push(Projectile {
            id,
            owner,
            move_name,
            position: origin,
            direction: direction.normalized().unwrap_or(PlayerState::DEFAULT_FACING),
            speed: params.speed,
            size: params.size,
            damage,
            remaining: range,
        });
        id
    }

    // ===== simulation =====

    /// One simulation step: NPC AI and engagements, then projectile travel,
    /// then removal of fainted NPCs.
    pub fn tick(&mut self) -> TickReport {
        self.tick += 1;
        let rules = Arc::clone(&self.rules);

        let mut engagements = {
            let targets: Vec<Target<'_>> = self
                .players
                .iter()
                .map(|(id, state)| Target {
                    player: id,
                    position: state.position,
                    hp_ratio: state.vitals.ratio(),
                    combatant: &state.combatant,
                })
                .collect();
            let terrain = Terrain::new(&self.grid, self.tile_size);
            behavior::tick_npcs(&mut self.npcs, &targets, terrain, &rules, &mut self.rng)
        };

        for engagement in &mut engagements {
            if engagement.damage > 0 {
                if let Some(state) = self.players.get_mut(&engagement.target) {
                    state.vitals.current_hp = state.vitals.current_hp.saturating_sub(engagement.damage);
                }
            }
            if let Some(launch) = engagement.launch.take() {
                let owner = ProjectileOwner::Npc(engagement.npc);
                let id = self.launch(
                    owner,
                    engagement.move_name.clone(),
                    launch.origin,
                    launch.direction,
                    launch.damage,
                    rules.config.projectiles.npc_range,
                );
                engagement.projectile = Some(id);
            }
        }

        let projectile_hits = self.advance_projectiles(&rules);
        let fainted = remove_fainted(&mut self.npcs);

        TickReport {
            tick: self.tick,
            engagements,
            projectile_hits,
            fainted,
        }
    }

    fn advance_projectiles(&mut self, rules: &Ruleset) -> Vec<ProjectileHit> {
        let terrain = Terrain::new(&self.grid, self.tile_size);
        let collider = rules.config.npc_collider_size();
        let player_size = rules.config.player_size;

        let mut hits = Vec::new();
        let mut in_flight = Vec::with_capacity(self.projectiles.len());
        for mut projectile in std::mem::take(&mut self.projectiles) {
            let has_range = projectile.advance();
            let table = rules
                .catalog
                .move_def(&projectile.move_name)
                .map(|mv| &mv.effects);

            let (outcome, trigger) = if !terrain.is_walkable(projectile.position) {
                (ProjectileOutcome::HitWall, EffectTrigger::OnWallHit)
            } else {
                let bounds = projectile.bounds();
                let struck = match &projectile.owner {
                    ProjectileOwner::Player(_) => self
                        .npcs
                        .iter_mut()
                        .find(|npc| !npc.is_fainted() && npc.collider(collider).intersects(&bounds))
                        .map(|npc| ProjectileOutcome::HitNpc {
                            npc: strike(npc, projectile.damage),
                        }),
                    ProjectileOwner::Npc(_) => self
                        .players
                        .iter_mut()
                        .find(|(_, state)| Aabb::square(state.position, player_size).intersects(&bounds))
                        .map(|(id, state)| {
                            state.vitals.current_hp =
                                state.vitals.current_hp.saturating_sub(projectile.damage);
                            ProjectileOutcome::HitPlayer {
                                player: id.clone(),
                                damage: projectile.damage,
                            }
                        }),
                };
                match struck {
                    Some(outcome) => (outcome, EffectTrigger::OnHit),
                    None if has_range => {
                        in_flight.push(projectile);
                        continue;
                    }
                    None => (ProjectileOutcome::Expired, EffectTrigger::OnWallHit),
                }
            };

            let effects = match (&outcome, table) {
                (ProjectileOutcome::Expired, _) | (_, None) => Vec::new(),
                (_, Some(table)) => {
                    let damage = if trigger == EffectTrigger::OnHit { projectile.damage } else { 0 };
                    table.fire(trigger, damage, &mut self.rng)
                }
            };
            if let ProjectileOwner::Npc(owner) = projectile.owner {
                for effect in &effects {
                    if let crate::combat::AppliedEffect::Heal { amount } = effect {
                        if let Some(npc) = self.npcs.iter_mut().find(|npc| npc.id == owner) {
                            npc.heal(*amount);
                        }
                    }
                }
            }

            hits.push(ProjectileHit {
                projectile: projectile.id,
                owner: projectile.owner,
                move_name: projectile.move_name,
                outcome,
                effects,
            });
        }
        self.projectiles = in_flight;
        hits
    }

    /// Per-player periodic updates for a finished tick, draining each
    /// player's exploration delta.
    pub fn collect_updates(&mut self, report: &TickReport) -> Vec<(PlayerId, DungeonUpdate)> {
        let npcs: Vec<_> = self.npcs.iter().map(NpcEntity::view).collect();
        let projectiles: Vec<_> = self.projectiles.iter().map(Projectile::view).collect();
        let instance_id = self.id;
        self.players
            .iter_mut()
            .map(|(id, state)| {
                let update = DungeonUpdate {
                    instance_id,
                    npcs: npcs.clone(),
                    explored_delta: std::mem::take(&mut state.explored_delta),
                    projectiles: projectiles.clone(),
                    engagements: report.engagements.clone(),
                    projectile_hits: report.projectile_hits.clone(),
                };
                (id.clone(), update)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::npc::AnimationState;

    fn arena() -> TileGrid {
        let mut rows = vec!["#".repeat(10)];
        rows.extend((0..8).map(|_| format!("#{}#", ".".repeat(8))));
        rows.push("#".repeat(10));
        let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
        TileGrid::from_ascii(&rows)
    }

    fn instance_with(npcs: Vec<NpcEntity>) -> DungeonInstance {
        DungeonInstance::from_layout(
            InstanceId(1),
            1,
            50,
            arena(),
            vec![Room::new(1, 1, 8, 8)],
            npcs,
            Arc::new(Ruleset::default()),
            7,
        )
        .unwrap()
    }

    fn alice() -> PlayerId {
        PlayerId::new("alice")
    }

    #[test]
    fn generated_instance_has_walkable_spawn_and_ladder() {
        let (instance, report) = DungeonInstance::generate(
            InstanceId(3),
            2,
            2000,
            2000,
            50,
            Arc::new(Ruleset::default()),
            1234,
        )
        .unwrap();
        assert!(instance.is_walkable(instance.spawn().position));
        assert!(instance.is_walkable(instance.ladder().position));
        assert_ne!(instance.spawn().tile, instance.ladder().tile);
        assert_eq!(report.npc_count, instance.npcs().len());
        assert_eq!(report.rooms_placed, instance.rooms().len());
    }

    #[test]
    fn assignment_reveals_the_spawn_room() {
        let mut instance = instance_with(Vec::new());
        let check = instance.assign_player(alice(), PlayerProfile::default()).unwrap();
        assert!(!check.rechecked);
        assert_eq!(instance.player_count(), 1);
        let state = instance.player(&alice()).unwrap();
        assert_eq!(state.position, check.point.position);
        assert_eq!(state.explored.explored_count(), 64);
    }

    #[test]
    fn out_of_range_level_is_rejected_without_touching_the_roster() {
        let mut instance = instance_with(Vec::new());
        instance.assign_player(alice(), PlayerProfile::default()).unwrap();

        let mallory = PlayerProfile {
            level: u32::MAX,
            ..PlayerProfile::default()
        };
        let err = instance
            .assign_player(PlayerId::new("mallory"), mallory)
            .unwrap_err();
        assert_eq!(
            err,
            InstanceError::InvalidLevel {
                level: u32::MAX,
                max: PlayerProfile::MAX_LEVEL
            }
        );
        assert_eq!(err.severity(), ErrorSeverity::Validation);
        assert_eq!(instance.player_count(), 1);
        assert!(instance.snapshot(&alice()).is_ok());
    }

    #[test]
    fn rejected_move_reports_authoritative_position() {
        let mut instance = instance_with(Vec::new());
        instance.assign_player(alice(), PlayerProfile::default()).unwrap();
        let start = instance.player(&alice()).unwrap().position;

        let outcome = instance
            .apply_player_move(&alice(), Vec2::new(10.0, 10.0), Vec2::new(-1.0, 0.0))
            .unwrap();
        assert_eq!(outcome, MoveOutcome::Rejected { authoritative: start });
        assert_eq!(instance.player(&alice()).unwrap().position, start);

        let outcome = instance
            .apply_player_move(&alice(), Vec2::new(100.0, 100.0), Vec2::new(-1.0, 0.0))
            .unwrap();
        assert!(matches!(outcome, MoveOutcome::Accepted { .. }));
        let state = instance.player(&alice()).unwrap();
        assert_eq!(state.position, Vec2::new(100.0, 100.0));
        assert_eq!(state.facing, Vec2::new(-1.0, 0.0));
    }

    #[test]
    fn unknown_player_is_a_validation_error() {
        let mut instance = instance_with(Vec::new());
        let err = instance.update_explored(&alice(), Vec2::ZERO).unwrap_err();
        assert_eq!(err, InstanceError::UnknownPlayer(alice()));
        assert_eq!(err.severity(), ErrorSeverity::Validation);
    }

    #[test]
    fn snapshot_only_carries_own_exploration() {
        let mut instance = instance_with(Vec::new());
        instance.assign_player(alice(), PlayerProfile::default()).unwrap();
        let snapshot = instance.snapshot(&alice()).unwrap();
        assert_eq!(snapshot.tiles.len(), 10);
        assert_eq!(snapshot.explored.len(), 10);
        assert!(instance.snapshot(&PlayerId::new("bob")).is_err());
    }

    #[test]
    fn player_projectile_hits_npc_on_a_later_tick() {
        let mut npc = NpcEntity::new(NpcId(0), "zubat", 3, 20, Vec2::new(300.0, 110.0));
        npc.cooldown = 1000;
        let mut instance = instance_with(vec![npc]);
        instance.assign_player(alice(), PlayerProfile::default()).unwrap();
        instance
            .apply_player_move(&alice(), Vec2::new(100.0, 100.0), Vec2::new(1.0, 0.0))
            .unwrap();

        let outcome = instance
            .handle_player_attack(
                &alice(),
                AttackRequest {
                    move_name: "thunder-shock".into(),
                    kind: AttackKind::Projectile,
                    damage: 25,
                    range: 400.0,
                },
            )
            .unwrap();
        assert!(outcome.affected.is_empty());
        assert!(outcome.projectile.is_some());

        let mut hit = None;
        for _ in 0..60 {
            let report = instance.tick();
            if let Some(affected) = report.npc_hits().next() {
                hit = Some((*affected, report.fainted.clone()));
                break;
            }
        }
        let (affected, fainted) = hit.expect("projectile should reach the npc");
        assert_eq!(affected.current_hp, 0);
        assert_eq!(fainted, vec![NpcId(0)]);
        assert!(instance.npcs().is_empty());
        assert!(instance.projectiles().is_empty());
    }

    #[test]
    fn projectile_stops_at_walls() {
        let mut instance = instance_with(Vec::new());
        instance.assign_player(alice(), PlayerProfile::default()).unwrap();
        instance
            .apply_player_move(&alice(), Vec2::new(60.0, 60.0), Vec2::new(-1.0, 0.0))
            .unwrap();
        instance
            .handle_player_attack(
                &alice(),
                AttackRequest {
                    move_name: "thunder-shock".into(),
                    kind: AttackKind::Projectile,
                    damage: 5,
                    range: 1000.0,
                },
            )
            .unwrap();
        let report = (0..20)
            .map(|_| instance.tick())
            .find(|report| !report.projectile_hits.is_empty())
            .unwrap();
        assert_eq!(report.projectile_hits[0].outcome, ProjectileOutcome::HitWall);
    }

    #[test]
    fn npc_melee_reduces_player_vitals() {
        let mut npc = NpcEntity::new(NpcId(0), "zubat", 20, 60, Vec2::new(120.0, 100.0));
        npc.stats.attack = 60;
        let mut instance = instance_with(vec![npc]);
        instance.assign_player(alice(), PlayerProfile::default()).unwrap();
        instance
            .apply_player_move(&alice(), Vec2::new(100.0, 100.0), Vec2::ZERO)
            .unwrap();
        let before = instance.player(&alice()).unwrap().vitals.current_hp;

        let report = instance.tick();
        assert_eq!(report.engagements.len(), 1);
        let after = instance.player(&alice()).unwrap().vitals.current_hp;
        assert_eq!(before - after, report.engagements[0].damage.min(before));
        assert_eq!(instance.npcs()[0].cooldown, 30);
        assert_eq!(instance.npcs()[0].animation, AnimationState::Walk);
    }

    #[test]
    fn updates_drain_exploration_delta() {
        let mut instance = instance_with(Vec::new());
        instance.assign_player(alice(), PlayerProfile::default()).unwrap();
        let report = instance.tick();
        let updates = instance.collect_updates(&report);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].1.explored_delta.len(), 64);
        let report = instance.tick();
        assert!(instance.collect_updates(&report)[0].1.explored_delta.is_empty());
    }
}
