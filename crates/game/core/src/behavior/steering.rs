//! Locally greedy obstacle avoidance.
//!
//! Candidates are tried in a fixed order and the first one the terrain
//! accepts wins: the full step, its horizontal part, its vertical part, the
//! two perpendicular deflections, then random jitter at the same speed.
//! Concave obstacles can still trap an NPC; there is no path search.
use crate::geometry::{Vec2, WorldPos};
use crate::map::Terrain;
use crate::rng::GameRng;

/// Movement capabilities of one NPC for one tick.
#[derive(Clone, Copy, Debug)]
pub struct Mover<'a> {
    pub terrain: Terrain<'a>,
    /// Edge of the square collider.
    pub collider: f32,
    pub speed: f32,
    pub jitter_attempts: u32,
}

impl Mover<'_> {
    fn accepts(&self, position: WorldPos) -> bool {
        self.terrain
            .is_valid_move(position, self.collider, self.collider)
    }

    /// Position after the first acceptable candidate, if any.
    pub fn steer(&self, from: WorldPos, step: Vec2, rng: &mut GameRng) -> Option<WorldPos> {
        let [left, right] = step.perpendiculars();
        let fixed = [step, Vec2::new(step.x, 0.0), Vec2::new(0.0, step.y), left, right];

        if let Some(target) = fixed
            .into_iter()
            .filter(|candidate| candidate.length() > f32::EPSILON)
            .map(|candidate| from + candidate)
            .find(|target| self.accepts(*target))
        {
            return Some(target);
        }

        (0..self.jitter_attempts)
            .map(|_| from + Vec2::from_angle(rng.angle(), self.speed))
            .find(|target| self.accepts(*target))
    }

    /// Single attempt along `step`, no fallbacks.
    pub fn try_step(&self, from: WorldPos, step: Vec2) -> Option<WorldPos> {
        let target = from + step;
        self.accepts(target).then_some(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::TileGrid;

    fn mover(grid: &TileGrid) -> Mover<'_> {
        Mover {
            terrain: Terrain::new(grid, 10),
            collider: 6.0,
            speed: 2.0,
            jitter_attempts: 0,
        }
    }

    #[test]
    fn open_floor_takes_the_direct_step() {
        let grid = TileGrid::from_ascii(&["#####", "#...#", "#...#", "#...#", "#####"]);
        let moved = mover(&grid).steer(Vec2::new(20.0, 20.0), Vec2::new(1.0, 1.0), &mut GameRng::new(0));
        assert_eq!(moved, Some(Vec2::new(21.0, 21.0)));
    }

    #[test]
    fn blocked_diagonal_slides_along_the_wall() {
        // Wall directly below; moving down-right slides horizontally.
        let grid = TileGrid::from_ascii(&["#####", "#...#", "#####"]);
        let moved = mover(&grid).steer(Vec2::new(12.0, 12.0), Vec2::new(2.0, 2.0), &mut GameRng::new(0));
        assert_eq!(moved, Some(Vec2::new(14.0, 12.0)));
    }

    #[test]
    fn fully_enclosed_npc_stays_put() {
        let grid = TileGrid::from_ascii(&["###", "#.#", "###"]);
        let mut mover = mover(&grid);
        mover.collider = 9.0;
        mover.jitter_attempts = 8;
        assert_eq!(mover.steer(Vec2::new(10.0, 10.0), Vec2::new(2.0, 0.0), &mut GameRng::new(3)), None);
    }
}
