//! Deterministic random number generation.
//!
//! RULE: Nothing in the generator may call any platform RNG.
//! All randomness flows through EntityRng instances derived
//! from the single master seed in GeneratorConfig.
//!
//! Every entity gets its own stream, seeded from
//! (master_seed, stage slot, entity key). This means:
//!   - Adding a new stage never changes existing stages' streams.
//!   - An entity's attributes do not depend on how many entities
//!     were generated before it, or in which order.

use crate::{hash::stable_hash_pair, types::IntRange};
use rand::{RngCore, SeedableRng};
use rand_pcg::Pcg64Mcg;

/// A named, deterministic RNG for a single generated entity.
pub struct EntityRng {
    pub name: &'static str,
    inner: Pcg64Mcg,
}

impl EntityRng {
    /// Create a stream from the master seed, a stable stage index and
    /// an entity key. The index must never change once assigned.
    pub fn new(master_seed: u64, stage_index: u64, entity_key: u64) -> Self {
        let stage_seed = master_seed ^ stage_index.wrapping_mul(0x9e37_79b9_7f4a_7c15);
        Self {
            name: "unnamed",
            inner: Pcg64Mcg::seed_from_u64(stable_hash_pair(stage_seed, entity_key)),
        }
    }

    pub fn with_name(mut self, name: &'static str) -> Self {
        self.name = name;
        self
    }

    /// Roll a float in [0.0, 1.0).
    pub fn next_f64(&mut self) -> f64 {
        let bits = self.inner.next_u64();
        (bits >> 11) as f64 * (1.0 / (1u64 << 53) as f64)
    }

    /// Draw a raw u64 (full range).
    pub fn next_u64(&mut self) -> u64 {
        self.inner.next_u64()
    }

    /// Roll a u64 in [0, n).
    pub fn next_u64_below(&mut self, n: u64) -> u64 {
        assert!(n > 0, "n must be > 0");
        self.inner.next_u64() % n
    }

    /// Roll an integer in the inclusive range. Ranges are validated
    /// up front by GeneratorConfig::validate, so an inverted range here
    /// is a programming error.
    pub fn range_inclusive(&mut self, range: IntRange) -> i64 {
        let span = range.span();
        assert!(span > 0, "inverted range {}..={}", range.min, range.max);
        range.min + self.next_u64_below(span) as i64
    }

    /// Bernoulli trial: returns true with probability p.
    pub fn chance(&mut self, p: f64) -> bool {
        self.next_f64() < p
    }

    /// Uniform pick from a non-empty slice.
    pub fn pick<'a, T>(&mut self, items: &'a [T]) -> &'a T {
        &items[self.next_u64_below(items.len() as u64) as usize]
    }
}

/// Stream factory for a single run.
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

    pub fn for_entity(&self, slot: StageSlot, entity_key: u64) -> EntityRng {
        EntityRng::new(self.master_seed, slot as u64, entity_key).with_name(slot.name())
    }
}

/// Stable stage slot assignments.
/// NEVER reorder or remove entries, only append.
/// Reordering changes every stage's seed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u64)]
pub enum StageSlot {
    RepairShop = 0,
    Policy = 1,
    Claim = 2,
    RepairOrder = 3,
}

impl StageSlot {
    pub fn name(&self) -> &'static str {
        match self {
            Self::RepairShop => "repair_shop",
            Self::Policy => "policy",
            Self::Claim => "claim",
            Self::RepairOrder => "repair_order",
        }
    }
}
