//! Sources of uniform values in `[0, 1)` used to synthesize resource state.

use rand::{Rng, SeedableRng, rngs::StdRng};

/// Capability producing a value in `[0, 1)` on every call.
///
/// Any `FnMut() -> f64 + Send` closure is a sampler, which keeps test doubles
/// short.
pub trait Sampler: Send {
    fn next_value(&mut self) -> f64;
}

impl<F> Sampler for F
where
    F: FnMut() -> f64 + Send,
{
    fn next_value(&mut self) -> f64 {
        self()
    }
}

/// Uniform random sampler backed by [`StdRng`].
#[derive(Debug, Clone)]
pub struct RandomSampler {
    rng: StdRng,
}

impl RandomSampler {
    /// Sampler seeded from the operating system.
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_os_rng(),
        }
    }

    /// Reproducible sampler, e.g. for replaying a run.
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for RandomSampler {
    fn next_value(&mut self) -> f64 {
        self.rng.random::<f64>()
    }
}

/// Replays a fixed list of values, starting over once exhausted.
///
/// An empty list yields `0.0` forever.
#[derive(Debug, Clone)]
pub struct SequenceSampler {
    values: Vec<f64>,
    position: usize,
}

impl SequenceSampler {
    pub fn new(values: impl Into<Vec<f64>>) -> Self {
        Self {
            values: values.into(),
            position: 0,
        }
    }
}

impl Sampler for SequenceSampler {
    fn next_value(&mut self) -> f64 {
        if self.values.is_empty() {
            return 0.0;
        }

        let value = self.values[self.position % self.values.len()];
        self.position = (self.position + 1) % self.values.len();
        value
    }
}
