//! Seedable randomness for fire-rate waits and spawn origins.

use bevy::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

#[derive(Resource, Debug, Clone)]
pub struct GameRng(StdRng);

impl GameRng {
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }

    /// Whole seconds in `min..=max`. A reversed range is swapped rather than rejected.
    pub fn whole_secs(&mut self, min: u32, max: u32) -> f32 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        self.0.gen_range(lo..=hi) as f32
    }

    /// Whole seconds in `min..max`; an empty range yields `min`.
    pub fn whole_secs_below(&mut self, min: u32, max: u32) -> f32 {
        let (lo, hi) = if min <= max { (min, max) } else { (max, min) };
        if lo == hi {
            return lo as f32;
        }
        self.0.gen_range(lo..hi) as f32
    }

    /// Uniform in `[0, 1)`.
    pub fn unit(&mut self) -> f32 {
        self.0.r#gen::<f32>()
    }

    /// Uniform index in `0..len`; `None` for an empty range.
    pub fn index(&mut self, len: usize) -> Option<usize> {
        (len > 0).then(|| self.0.gen_range(0..len))
    }
}

impl Default for GameRng {
    fn default() -> Self {
        Self(StdRng::from_entropy())
    }
}
