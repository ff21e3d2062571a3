//! Micro-saccade shake — a small random offset added to every aim point.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use super::math::Vec3;

/// Random offset inside a ball, refreshed on its own cadence.
#[derive(Debug, Clone)]
pub struct ShakeGenerator {
    offset: Vec3,
    rng: SmallRng,
}

impl ShakeGenerator {
    pub fn new() -> Self {
        Self::from_rng(SmallRng::from_entropy())
    }

    /// Deterministic generator for replay and tests.
    pub fn with_seed(seed: u64) -> Self {
        Self::from_rng(SmallRng::seed_from_u64(seed))
    }

    fn from_rng(rng: SmallRng) -> Self {
        Self {
            offset: Vec3::ZERO,
            rng,
        }
    }

    /// Current offset.
    pub fn offset(&self) -> Vec3 {
        self.offset
    }

    /// Draw the time until the next refresh, uniform in `[min_s, max_s]`.
    pub fn next_span_s(&mut self, min_s: f32, max_s: f32) -> f64 {
        let (lo, hi) = if min_s <= max_s { (min_s, max_s) } else { (max_s, min_s) };
        if !(lo.is_finite() && hi.is_finite()) {
            return 0.0;
        }
        self.rng.gen_range(lo..=hi) as f64
    }

    /// Replace the offset with a uniform point inside a ball of `radius`.
    pub fn refresh(&mut self, radius: f32) -> Vec3 {
        self.offset = if radius > 0.0 && radius.is_finite() {
            self.unit_ball() * radius
        } else {
            Vec3::ZERO
        };
        self.offset
    }

    pub fn reset(&mut self) {
        self.offset = Vec3::ZERO;
    }

    fn unit_ball(&mut self) -> Vec3 {
        loop {
            let v = Vec3::new(
                self.rng.gen_range(-1.0..=1.0),
                self.rng.gen_range(-1.0..=1.0),
                self.rng.gen_range(-1.0..=1.0),
            );
            if v.length_squared() <= 1.0 {
                return v;
            }
        }
    }
}

impl Default for ShakeGenerator {
    fn default() -> Self {
        Self::new()
    }
}
