//! Seeded random number source.
//!
//! Every dungeon instance owns one [`GameRng`]; the same seed reproduces the
//! same layout, roster and wander headings.
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

#[derive(Clone, Debug)]
pub struct GameRng {
    rng: ChaCha8Rng,
}

impl GameRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }

    /// Uniform integer in `[min, max]`. Returns `min` when the range is empty.
    pub fn range_inclusive(&mut self, min: i32, max: i32) -> i32 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..=max)
    }

    /// Uniform float in `[min, max)`.
    pub fn uniform(&mut self, min: f32, max: f32) -> f32 {
        if max <= min {
            return min;
        }
        self.rng.gen_range(min..max)
    }

    /// True with probability `p` (clamped to `[0, 1]`).
    pub fn chance(&mut self, p: f32) -> bool {
        self.rng.gen_bool(f64::from(p.clamp(0.0, 1.0)))
    }

    /// Uniform heading in `[0, 2π)`.
    pub fn angle(&mut self) -> f32 {
        self.rng.gen_range(0.0..std::f32::consts::TAU)
    }

    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        items.choose(&mut self.rng)
    }

    /// Up to `amount` distinct elements, without replacement.
    pub fn sample<T: Clone>(&mut self, items: &[T], amount: usize) -> Vec<T> {
        items
            .choose_multiple(&mut self.rng, amount)
            .cloned()
            .collect()
    }
}
