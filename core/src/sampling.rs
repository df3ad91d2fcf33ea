//! Cumulative-threshold categorical sampling.
//!
//! A table is an ordered list of (upper_bound, category) pairs. One uniform
//! draw in [0, total) selects the first pair whose upper bound exceeds it.

use crate::error::{GenError, GenResult};

#[derive(Debug, Clone, PartialEq)]
pub struct WeightedTable<T> {
    buckets: Vec<(f64, T)>,
}

impl<T: Copy> WeightedTable<T> {
    /// Build from relative weights, accumulated in the given order.
    pub fn from_weights(weights: &[(T, f64)]) -> GenResult<Self> {
        let mut cumulative = 0.0;
        let mut buckets = Vec::with_capacity(weights.len());
        for (category, weight) in weights {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(GenError::invalid("weight", format!("{weight} is not a valid weight")));
            }
            cumulative += weight;
            buckets.push((cumulative, *category));
        }
        Self::checked(buckets)
    }

    /// Build from already-cumulative upper bounds, which must not decrease.
    pub fn from_thresholds(thresholds: &[(f64, T)]) -> GenResult<Self> {
        let mut previous = 0.0;
        for (bound, _) in thresholds {
            if !bound.is_finite() || *bound < previous {
                return Err(GenError::invalid(
                    "threshold",
                    format!("{bound} is below the previous bound {previous}"),
                ));
            }
            previous = *bound;
        }
        Self::checked(thresholds.to_vec())
    }

    fn checked(buckets: Vec<(f64, T)>) -> GenResult<Self> {
        match buckets.last() {
            Some((total, _)) if *total > 0.0 => Ok(Self { buckets }),
            _ => Err(GenError::invalid("weights", "table has no positive weight")),
        }
    }

    pub fn total(&self) -> f64 {
        self.buckets.last().map(|(t, _)| *t).unwrap_or(0.0)
    }

    /// Select with a unit draw in [0.0, 1.0), scaled to [0, total).
    pub fn pick(&self, unit_draw: f64) -> T {
        let scaled = unit_draw * self.total();
        for (upper, category) in &self.buckets {
            if scaled < *upper {
                return *category;
            }
        }
        // Floating-point edge at the very top of the range.
        self.buckets[self.buckets.len() - 1].1
    }
}
