//! Per-tick NPC AI.
//!
//! Each NPC, in roster order:
//!
//! 1. decrements its cooldown
//! 2. finds the nearest player; with no players at all it idles
//! 3. chases that player inside the detection range, or flees when its HP
//!    ratio is under the retreat threshold
//! 4. otherwise wanders on a held heading
//! 5. updates its animation from whether it actually moved
//! 6. engages when its cooldown is zero
//!
//! The engine never schedules itself; the owner calls [`tick_npcs`] once per
//! simulation step.
pub mod engagement;
pub mod steering;

pub use engagement::{EngagementKind, NpcEngagement, ProjectileLaunch, choose_move, engage};
pub use steering::Mover;

use crate::combat::Combatant;
use crate::geometry::{Vec2, WorldPos};
use crate::ids::PlayerId;
use crate::map::Terrain;
use crate::npc::{AnimationState, NpcEntity};
use crate::rng::GameRng;
use crate::rules::Ruleset;

/// A player as the AI sees it.
#[derive(Clone, Copy, Debug)]
pub struct Target<'a> {
    pub player: &'a PlayerId,
    pub position: WorldPos,
    pub hp_ratio: f32,
    pub combatant: &'a Combatant,
}

/// Advances every NPC by one tick and returns the engagements that happened.
pub fn tick_npcs(
    npcs: &mut [NpcEntity],
    targets: &[Target<'_>],
    terrain: Terrain<'_>,
    rules: &Ruleset,
    rng: &mut GameRng,
) -> Vec<NpcEngagement> {
    let params = &rules.config.npc;
    let mover = Mover {
        terrain,
        collider: rules.config.npc_collider_size(),
        speed: params.speed,
        jitter_attempts: params.jitter_attempts,
    };

    let mut engagements = Vec::new();
    for npc in npcs.iter_mut() {
        npc.cooldown = npc.cooldown.saturating_sub(1);

        let Some((target, distance)) = nearest(npc.position, targets) else {
            npc.animation = AnimationState::Idle;
            continue;
        };

        let moved = if distance < params.detection_range {
            pursue(npc, target.position, &mover, rules, rng)
        } else {
            wander(npc, &mover, rules, rng)
        };
        npc.animation = if moved {
            AnimationState::Walk
        } else {
            AnimationState::Idle
        };

        if npc.cooldown == 0 {
            engagements.extend(engage(npc, target, terrain, rules, rng));
        }
    }
    engagements
}

fn nearest<'t, 'a>(from: WorldPos, targets: &'t [Target<'a>]) -> Option<(&'t Target<'a>, f32)> {
    targets
        .iter()
        .map(|target| (target, from.distance(target.position)))
        .min_by(|a, b| a.1.total_cmp(&b.1))
}

fn pursue(
    npc: &mut NpcEntity,
    toward: WorldPos,
    mover: &Mover<'_>,
    rules: &Ruleset,
    rng: &mut GameRng,
) -> bool {
    let Some(direction) = (toward - npc.position).normalized() else {
        return false;
    };
    let mut step = direction * mover.speed;
    if npc.hp_ratio() < rules.config.npc.retreat_threshold {
        step = -step;
    }
    match mover.steer(npc.position, step, rng) {
        Some(next) => {
            npc.position = next;
            true
        }
        None => false,
    }
}

fn wander(npc: &mut NpcEntity, mover: &Mover<'_>, rules: &Ruleset, rng: &mut GameRng) -> bool {
    if npc.wander.ticks_left == 0 || npc.wander.heading == Vec2::ZERO {
        reroll_heading(npc, mover.speed, rules, rng);
    }
    match mover.try_step(npc.position, npc.wander.heading) {
        Some(next) => {
            npc.position = next;
            npc.wander.ticks_left -= 1;
            true
        }
        None => {
            reroll_heading(npc, mover.speed, rules, rng);
            false
        }
    }
}

fn reroll_heading(npc: &mut NpcEntity, speed: f32, rules: &Ruleset, rng: &mut GameRng) {
    let span = rules.config.npc.wander_ticks;
    npc.wander.heading = Vec2::from_angle(rng.angle(), speed);
    npc.wander.ticks_left = rng.range_inclusive(span.min, span.max).max(1) as u32;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::NpcId;
    use crate::map::TileGrid;

    fn room_grid() -> TileGrid {
        let mut rows = vec!["#".repeat(12)];
        rows.extend((0..10).map(|_| format!("#{}#", ".".repeat(10))));
        rows.push("#".repeat(12));
        let rows: Vec<&str> = rows.iter().map(String::as_str).collect();
        TileGrid::from_ascii(&rows)
    }

    #[test]
    fn no_players_means_idle_in_place() {
        let rules = Ruleset::default();
        let grid = room_grid();
        let mut npcs = vec![NpcEntity::new(NpcId(0), "zubat", 3, 40, Vec2::new(150.0, 150.0))];
        npcs[0].cooldown = 5;
        let engagements =
            tick_npcs(&mut npcs, &[], Terrain::new(&grid, 50), &rules, &mut GameRng::new(0));
        assert!(engagements.is_empty());
        assert_eq!(npcs[0].position, Vec2::new(150.0, 150.0));
        assert_eq!(npcs[0].animation, AnimationState::Idle);
        assert_eq!(npcs[0].cooldown, 4);
    }

    #[test]
    fn wounded_npc_flees() {
        let rules = Ruleset::default();
        let grid = room_grid();
        let player = PlayerId::new("p1");
        let combatant = rules.combatant("zubat", 5);
        let targets = [Target {
            player: &player,
            position: Vec2::new(300.0, 200.0),
            hp_ratio: 1.0,
            combatant: &combatant,
        }];
        let mut npcs = vec![NpcEntity::new(NpcId(0), "zubat", 3, 40, Vec2::new(200.0, 200.0))];
        npcs[0].hp = 5;
        npcs[0].cooldown = 10;
        tick_npcs(&mut npcs, &targets, Terrain::new(&grid, 50), &rules, &mut GameRng::new(0));
        assert_eq!(npcs[0].position, Vec2::new(198.0, 200.0));
        assert_eq!(npcs[0].animation, AnimationState::Walk);
    }

    #[test]
    fn distant_player_triggers_wandering() {
        let rules = Ruleset::default();
        let grid = room_grid();
        let player = PlayerId::new("p1");
        let combatant = rules.combatant("zubat", 5);
        let targets = [Target {
            player: &player,
            position: Vec2::new(5000.0, 5000.0),
            hp_ratio: 1.0,
            combatant: &combatant,
        }];
        let mut npcs = vec![NpcEntity::new(NpcId(0), "zubat", 3, 40, Vec2::new(250.0, 250.0))];
        tick_npcs(&mut npcs, &targets, Terrain::new(&grid, 50), &rules, &mut GameRng::new(8));
        let moved = npcs[0].position.distance(Vec2::new(250.0, 250.0));
        assert!((moved - 2.0).abs() < 1e-3);
        assert!(npcs[0].wander.ticks_left >= 29);
    }
}
