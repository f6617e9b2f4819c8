//! Injected randomness.
//!
//! Endpoint resolution, ambient kind selection and instance placement all pull
//! from a [`RandomSource`] owned by the engine, so tests can script exact
//! choices and the host can seed a reproducible run.

#[cfg(test)]
#[path = "rng_test.rs"]
mod rng_test;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Minimal random interface consumed by the engine.
pub trait RandomSource {
    /// Uniform index in `0..len`. Callers never pass `len == 0`.
    fn index(&mut self, len: usize) -> usize;

    /// Uniform float in `[0, 1)`.
    fn unit(&mut self) -> f64;

    /// Uniform float in `[lo, lo + span)`.
    fn span(&mut self, lo: f64, span: f64) -> f64 {
        lo + self.unit() * span
    }
}

/// Adapter from any [`rand::Rng`] to [`RandomSource`].
#[derive(Debug, Clone)]
pub struct RngSource<R>(pub R);

impl RngSource<StdRng> {
    /// A reproducible source seeded from `seed`.
    #[must_use]
    pub fn seeded(seed: u64) -> Self {
        Self(StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> RandomSource for RngSource<R> {
    fn index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        self.0.random_range(0..len)
    }

    fn unit(&mut self) -> f64 {
        self.0.random::<f64>()
    }
}

/// Source that replays fixed answers, cycling when exhausted.
///
/// Indices are reduced modulo `len`, so a script written for one registry size
/// stays valid for another.
#[derive(Debug, Clone, Default)]
pub struct ScriptedSource {
    indices: Vec<usize>,
    units: Vec<f64>,
    next_index: usize,
    next_unit: usize,
}

impl ScriptedSource {
    #[must_use]
    pub fn new(indices: Vec<usize>, units: Vec<f64>) -> Self {
        Self { indices, units, next_index: 0, next_unit: 0 }
    }
}

impl RandomSource for ScriptedSource {
    fn index(&mut self, len: usize) -> usize {
        if self.indices.is_empty() || len == 0 {
            return 0;
        }
        let raw = self.indices[self.next_index % self.indices.len()];
        self.next_index += 1;
        raw % len
    }

    fn unit(&mut self) -> f64 {
        if self.units.is_empty() {
            return 0.0;
        }
        let raw = self.units[self.next_unit % self.units.len()];
        self.next_unit += 1;
        raw
    }
}
