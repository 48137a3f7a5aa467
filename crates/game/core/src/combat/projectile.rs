//! Stepped projectiles.
//!
//! A projectile travels `speed` units per tick along a unit heading until it
//! touches a wall, collides with an opposing entity, or exhausts its range.
use crate::combat::effect::AppliedEffect;
use crate::geometry::{Aabb, Vec2, WorldPos};
use crate::ids::{NpcId, PlayerId, ProjectileId};

use super::attack::AffectedNpc;

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", content = "id", rename_all = "snake_case"))]
pub enum ProjectileOwner {
    Player(PlayerId),
    Npc(NpcId),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Projectile {
    pub id: ProjectileId,
    pub owner: ProjectileOwner,
    pub move_name: String,
    /// Center of the projectile.
    pub position: WorldPos,
    /// Unit heading.
    pub direction: Vec2,
    pub speed: f32,
    pub size: f32,
    /// Fixed at launch.
    pub damage: u32,
    /// Travel distance left.
    pub remaining: f32,
}

impl Projectile {
    /// Moves one step. Returns false once the range is exhausted.
    pub fn advance(&mut self) -> bool {
        self.position = self.position + self.direction * self.speed;
        self.remaining -= self.speed;
        self.remaining > 0.0
    }

    pub fn bounds(&self) -> Aabb {
        let half = self.size / 2.0;
        Aabb::square(self.position - Vec2::new(half, half), self.size)
    }

    pub fn view(&self) -> ProjectileView {
        ProjectileView {
            id: self.id,
            owner: self.owner.clone(),
            move_name: self.move_name.clone(),
            position: self.position,
            direction: self.direction,
            size: self.size,
        }
    }
}

/// Public projectile fields sent to clients.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProjectileView {
    pub id: ProjectileId,
    pub owner: ProjectileOwner,
    pub move_name: String,
    pub position: WorldPos,
    pub direction: Vec2,
    pub size: f32,
}

/// How a projectile's flight ended.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", rename_all = "snake_case"))]
pub enum ProjectileOutcome {
    HitNpc { npc: AffectedNpc },
    HitPlayer { player: PlayerId, damage: u32 },
    HitWall,
    Expired,
}

#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ProjectileHit {
    pub projectile: ProjectileId,
    pub owner: ProjectileOwner,
    pub move_name: String,
    pub outcome: ProjectileOutcome,
    pub effects: Vec<AppliedEffect>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn range_runs_out_after_enough_steps() {
        let mut projectile = Projectile {
            id: ProjectileId(0),
            owner: ProjectileOwner::Npc(NpcId(1)),
            move_name: "air-cutter".into(),
            position: Vec2::ZERO,
            direction: Vec2::new(1.0, 0.0),
            speed: 8.0,
            size: 10.0,
            damage: 12,
            remaining: 20.0,
        };
        assert!(projectile.advance());
        assert!(projectile.advance());
        assert!(!projectile.advance());
        assert_eq!(projectile.position, Vec2::new(24.0, 0.0));
        assert_eq!(projectile.bounds().center(), projectile.position);
    }
}
