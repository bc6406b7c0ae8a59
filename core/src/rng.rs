//! Deterministic random number generation.
//!
//! RULE: Nothing in the cost pipeline may call any platform RNG.
//! All randomness flows through SampleRng instances derived
//! from the single master seed given to the engine.
//!
//! Each Monte-Carlo sample gets its own RNG stream, seeded deterministically
//! from (master_seed XOR sample_index). This means:
//!   - Samples can run in any order, or in parallel, with identical results.
//!   - Any single sample is reproducible in isolation.

use crate::types::SampleIndex;
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A deterministic RNG for a single Monte-Carlo sample.
pub struct SampleRng {
    pub sample: SampleIndex,
    inner: Pcg64Mcg,
}

impl SampleRng {
    /// Create a sample RNG from the master seed and the sample index.
    pub fn new(master_seed: u64, sample: SampleIndex) -> Self {
        let derived_seed = master_seed ^ (sample.wrapping_mul(0x9e37_79b9_7f4a_7c15));
        Self {
            sample,
            inner: Pcg64Mcg::seed_from_u64(derived_seed),
        }
    }
}

impl RngCore for SampleRng {
    fn next_u32(&mut self) -> u32 {
        self.inner.next_u32()
    }

    fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        self.inner.fill_bytes(dest)
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.inner.try_fill_bytes(dest)
    }
}

/// Hands out per-sample RNGs for one run.
#[derive(Debug, Clone, Copy)]
pub struct RngBank {
    master_seed: u64,
}

impl RngBank {
    pub fn new(master_seed: u64) -> Self {
        Self { master_seed }
    }

    pub fn master_seed(&self) -> u64 {
        self.master_seed
    }

    pub fn for_sample(&self, sample: SampleIndex) -> SampleRng {
        SampleRng::new(self.master_seed, sample)
    }
}
