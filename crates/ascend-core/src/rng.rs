//! Injectable uniform randomness.
//!
//! Reducers only ever need `u ~ U[0, 1)`. Production sessions use a seeded
//! [`ChaCha8Rng`]; tests hand in a [`ScriptedSource`] to pin every draw.

use rand::{Rng, RngCore, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::collections::VecDeque;

pub trait RandomSource {
    /// Next sample in `[0, 1)`.
    fn next_unit(&mut self) -> f64;

    /// Uniform index in `0..len`. `len` must be non-zero.
    fn next_index(&mut self, len: usize) -> usize {
        debug_assert!(len > 0);
        let i = (self.next_unit() * len as f64) as usize;
        i.min(len.saturating_sub(1))
    }
}

impl<R: RngCore> RandomSource for R {
    fn next_unit(&mut self) -> f64 {
        self.gen::<f64>()
    }
}

/// Deterministic generator for a session seed.
pub fn seeded(seed: u64) -> ChaCha8Rng {
    ChaCha8Rng::seed_from_u64(seed)
}

/// Replays a fixed list of samples, then repeats `fallback`.
#[derive(Clone, Debug)]
pub struct ScriptedSource {
    values: VecDeque<f64>,
    fallback: f64,
}

impl ScriptedSource {
    pub fn new(values: impl IntoIterator<Item = f64>) -> Self {
        Self {
            values: values.into_iter().collect(),
            fallback: 0.0,
        }
    }

    pub fn with_fallback(mut self, fallback: f64) -> Self {
        self.fallback = fallback;
        self
    }

    pub fn remaining(&self) -> usize {
        self.values.len()
    }
}

impl RandomSource for ScriptedSource {
    fn next_unit(&mut self) -> f64 {
        let v = self.values.pop_front().unwrap_or(self.fallback);
        v.clamp(0.0, 1.0 - f64::EPSILON)
    }
}
