//! Shared primitive types used across the entire generator.

/// An amount of money in whole yen.
pub type Yen = i64;

/// A stable, unique numeric identifier for any generated entity.
pub type EntityId = u64;

/// The canonical run identifier.
pub type RunId = String;

/// Inclusive integer range used by every uniform draw in the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct IntRange {
    pub min: i64,
    pub max: i64,
}

impl IntRange {
    pub const fn new(min: i64, max: i64) -> Self {
        Self { min, max }
    }

    /// Number of distinct values in the range. Zero when inverted.
    pub fn span(&self) -> u64 {
        if self.max < self.min {
            0
        } else {
            (self.max - self.min) as u64 + 1
        }
    }

    pub fn contains(&self, value: i64) -> bool {
        value >= self.min && value <= self.max
    }
}
