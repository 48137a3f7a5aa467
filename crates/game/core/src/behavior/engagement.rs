//! NPC attack decisions.
use crate::catalog::{MoveDefinition, RangeKind};
use crate::combat::{AppliedEffect, EffectTrigger};
use crate::geometry::{Aabb, Vec2, WorldPos};
use crate::ids::{NpcId, PlayerId, ProjectileId};
use crate::map::Terrain;
use crate::npc::NpcEntity;
use crate::rng::GameRng;
use crate::rules::Ruleset;

use super::Target;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum EngagementKind {
    Status,
    Melee,
    Ranged,
}

/// Projectile an NPC wants fired; the instance assigns the id.
#[derive(Clone, Debug, PartialEq)]
pub struct ProjectileLaunch {
    pub origin: WorldPos,
    pub direction: Vec2,
    pub damage: u32,
}

/// One NPC using one move on one player during a tick.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct NpcEngagement {
    pub npc: NpcId,
    pub target: PlayerId,
    pub move_name: String,
    pub kind: EngagementKind,
    /// Damage dealt immediately; ranged damage lands when the projectile hits.
    pub damage: u32,
    pub missed: bool,
    pub effects: Vec<AppliedEffect>,
    pub projectile: Option<ProjectileId>,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub launch: Option<ProjectileLaunch>,
}

/// Picks a move, biased toward status moves when the NPC is healthy or the
/// target is weak.
pub fn choose_move<'c>(
    npc: &NpcEntity,
    target_hp_ratio: f32,
    rules: &'c Ruleset,
    rng: &mut GameRng,
) -> Option<&'c MoveDefinition> {
    let known: Vec<&MoveDefinition> = npc
        .moves
        .iter()
        .filter_map(|name| rules.catalog.move_def(name))
        .collect();
    let status: Vec<&MoveDefinition> = known.iter().copied().filter(|mv| mv.is_status()).collect();
    let damaging: Vec<&MoveDefinition> =
        known.iter().copied().filter(|mv| mv.is_damaging()).collect();

    let own_ratio = npc.hp_ratio();
    let status_bias = if own_ratio > 0.7 {
        0.4
    } else if target_hp_ratio < 0.3 {
        0.3
    } else if own_ratio < 0.3 {
        0.2
    } else {
        0.0
    };

    if !status.is_empty() && rng.chance(status_bias) {
        return rng.choose(&status).copied();
    }
    if !damaging.is_empty() {
        return rng.choose(&damaging).copied();
    }
    rng.choose(&known).copied()
}

/// Attempts an engagement against `target`. Sets the NPC's cooldown and
/// applies self-heals when a move is used; returns `None` and leaves the
/// cooldown at zero otherwise.
pub fn engage(
    npc: &mut NpcEntity,
    target: &Target<'_>,
    terrain: Terrain<'_>,
    rules: &Ruleset,
    rng: &mut GameRng,
) -> Option<NpcEngagement> {
    let config = &rules.config;
    let npc_box = npc.collider(config.npc_collider_size());
    let target_box = Aabb::square(target.position, config.player_size);

    let contact = npc_box.intersects(&target_box);
    let sight = terrain.line_of_sight(npc_box.center(), target_box.center());
    let in_range = npc.position.distance(target.position) < config.npc.ranged_attack_range;
    if !(contact || (sight && in_range)) {
        return None;
    }

    let mv = choose_move(npc, target.hp_ratio, rules, rng)?;
    let kind = match (mv.is_status(), mv.range) {
        (true, _) => EngagementKind::Status,
        (false, RangeKind::Melee) => EngagementKind::Melee,
        (false, RangeKind::Ranged) => EngagementKind::Ranged,
    };
    let usable = match kind {
        EngagementKind::Status | EngagementKind::Ranged => sight,
        EngagementKind::Melee => contact,
    };
    if !usable {
        return None;
    }

    let mut effects = mv.effects.fire(EffectTrigger::OnActivate, 0, rng);
    let mut engagement = NpcEngagement {
        npc: npc.id,
        target: target.player.clone(),
        move_name: mv.name.clone(),
        kind,
        damage: 0,
        missed: false,
        effects: Vec::new(),
        projectile: None,
        launch: None,
    };

    match kind {
        EngagementKind::Status => {
            engagement.missed = rng.range_inclusive(1, 100) > i32::from(mv.accuracy);
            if !engagement.missed {
                effects.extend(mv.effects.fire(EffectTrigger::BeforeHit, 0, rng));
                effects.extend(mv.effects.fire(EffectTrigger::OnHit, 0, rng));
            }
            npc.cooldown = config.cooldowns.status;
        }
        EngagementKind::Melee => {
            let roll = rules
                .damage()
                .resolve_damage(&npc.combatant(), target.combatant, mv, rng);
            engagement.missed = roll.missed;
            engagement.damage = roll.damage;
            if !roll.missed {
                effects.extend(mv.effects.fire(EffectTrigger::BeforeHit, 0, rng));
                effects.extend(mv.effects.fire(EffectTrigger::OnHit, roll.damage, rng));
            }
            npc.cooldown = config.cooldowns.melee;
        }
        EngagementKind::Ranged => {
            let roll = rules
                .damage()
                .resolve_damage(&npc.combatant(), target.combatant, mv, rng);
            engagement.missed = roll.missed;
            if !roll.missed {
                let origin = npc_box.center();
                let direction = (target_box.center() - origin)
                    .normalized()
                    .unwrap_or(Vec2::new(1.0, 0.0));
                engagement.launch = Some(ProjectileLaunch {
                    origin,
                    direction,
                    damage: roll.damage,
                });
            }
            npc.cooldown = config.cooldowns.ranged;
        }
    }

    for effect in &effects {
        if let AppliedEffect::Heal { amount } = effect {
            npc.heal(*amount);
        }
    }
    engagement.effects = effects;
    Some(engagement)
}
