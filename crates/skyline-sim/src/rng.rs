//! Deterministic random source for AI gating and scatter.
//!
//! All randomness in the simulation (dodge rolls, special-attack
//! gates, web anchor jitter, ragdoll scatter, boss selection) flows
//! through [`SimRng`], seeded from the configuration, so a run is
//! replayable tick for tick.

/// Simple LCG random number generator.
#[derive(Debug, Clone)]
pub struct SimRng {
    state: u64,
}

impl SimRng {
    /// Create a new RNG with seed.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    /// Get next random u64.
    pub fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);
        self.state
    }

    /// Get random f32 in [0, 1).
    pub fn next_f32(&mut self) -> f32 {
        (self.next_u64() >> 40) as f32 / (1u64 << 24) as f32
    }

    /// Get random value in range [min, max].
    pub fn range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }

    /// Roll against a probability in [0, 1].
    pub fn chance(&mut self, probability: f32) -> bool {
        self.next_f32() < probability
    }

    /// Choose random item from slice.
    pub fn choose<'a, T>(&mut self, items: &'a [T]) -> Option<&'a T> {
        if items.is_empty() {
            None
        } else {
            let idx = (self.next_u64() % items.len() as u64) as usize;
            Some(&items[idx])
        }
    }
}
