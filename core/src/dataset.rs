//! The four finished tables of a run, plus the integrity check that
//! runs before anything is written out.

use crate::{
    claim_generator::Claim,
    error::{GenError, GenResult},
    policy_generator::Policy,
    repair_order_generator::RepairOrderLine,
    shop_generator::RepairShop,
    types::{EntityId, Yen},
};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub repair_shops:  Vec<RepairShop>,
    pub policies:      Vec<Policy>,
    pub claims:        Vec<Claim>,
    pub repair_orders: Vec<RepairOrderLine>,
}

impl Dataset {
    pub fn shop(&self, shop_id: EntityId) -> Option<&RepairShop> {
        self.repair_shops.iter().find(|s| s.shop_id == shop_id)
    }

    pub fn policy(&self, policy_id: EntityId) -> Option<&Policy> {
        self.policies.iter().find(|p| p.policy_id == policy_id)
    }

    pub fn claim(&self, claim_id: EntityId) -> Option<&Claim> {
        self.claims.iter().find(|c| c.claim_id == claim_id)
    }

    pub fn lines_for_claim(&self, claim_id: EntityId) -> Vec<&RepairOrderLine> {
        self.repair_orders
            .iter()
            .filter(|l| l.claim_id == claim_id)
            .collect()
    }

    /// Claim counts keyed by policy id (policies without claims omitted).
    pub fn claims_per_policy(&self) -> HashMap<EntityId, usize> {
        let mut counts = HashMap::new();
        for claim in &self.claims {
            *counts.entry(claim.policy_id).or_insert(0) += 1;
        }
        counts
    }

    /// Every claim must resolve to a policy and a shop; every line to a
    /// claim and a shop. A miss is an internal invariant violation.
    pub fn verify_integrity(&self) -> GenResult<()> {
        let shops: HashSet<EntityId> = self.repair_shops.iter().map(|s| s.shop_id).collect();
        let policies: HashSet<EntityId> = self.policies.iter().map(|p| p.policy_id).collect();
        let claims: HashSet<EntityId> = self.claims.iter().map(|c| c.claim_id).collect();

        for claim in &self.claims {
            if !policies.contains(&claim.policy_id) {
                return Err(gap("claim", claim.claim_id, format!("policy {}", claim.policy_id)));
            }
            if !shops.contains(&claim.shop_id) {
                return Err(gap("claim", claim.claim_id, format!("repair shop {}", claim.shop_id)));
            }
        }
        for line in &self.repair_orders {
            if !claims.contains(&line.claim_id) {
                return Err(gap("repair order line", line.line_id, format!("claim {}", line.claim_id)));
            }
            if !shops.contains(&line.shop_id) {
                return Err(gap("repair order line", line.line_id, format!("repair shop {}", line.shop_id)));
            }
        }
        Ok(())
    }

    pub fn summary(&self, run_id: &str, seed: u64) -> DatasetSummary {
        DatasetSummary {
            run_id:            run_id.to_string(),
            seed,
            repair_shops:      self.repair_shops.len(),
            policies:          self.policies.len(),
            claims:            self.claims.len(),
            repair_orders:     self.repair_orders.len(),
            total_premium:     self.policies.iter().map(|p| p.annual_premium).sum(),
            total_approved:    self.claims.iter().map(|c| c.approved_cost).sum(),
            total_paid:        self.claims.iter().map(|c| c.paid_to_date).sum(),
            total_reserve:     self.claims.iter().map(|c| c.outstanding_reserve).sum(),
            total_line_amount: self.repair_orders.iter().map(|l| l.line_total).sum(),
        }
    }
}

fn gap(entity: &'static str, id: EntityId, missing: String) -> GenError {
    GenError::ReferentialGap { entity, id, missing }
}

/// Headline figures for a finished run. Persisted as JSON next to the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatasetSummary {
    pub run_id:            String,
    pub seed:              u64,
    pub repair_shops:      usize,
    pub policies:          usize,
    pub claims:            usize,
    pub repair_orders:     usize,
    pub total_premium:     Yen,
    pub total_approved:    Yen,
    pub total_paid:        Yen,
    pub total_reserve:     Yen,
    pub total_line_amount: Yen,
}

/// Sort all candidates by `key` and keep the first `cap`.
///
/// Trimming happens on the global order, never per parent entity.
pub fn cap_and_trim<T, K, F>(mut rows: Vec<T>, cap: usize, key: F) -> Vec<T>
where
    K: Ord,
    F: Fn(&T) -> K,
{
    rows.sort_by_key(|r| key(r));
    rows.truncate(cap);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cap_and_trim_keeps_lowest_keys() {
        let rows = vec![(3, 'c'), (1, 'a'), (2, 'b'), (5, 'e'), (4, 'd')];
        let kept = cap_and_trim(rows, 3, |r| r.0);
        assert_eq!(kept, vec![(1, 'a'), (2, 'b'), (3, 'c')]);
    }

    #[test]
    fn cap_above_len_only_sorts() {
        let kept = cap_and_trim(vec![2, 1], 10, |r| *r);
        assert_eq!(kept, vec![1, 2]);
    }

    #[test]
    fn empty_dataset_is_consistent() {
        assert!(Dataset::default().verify_integrity().is_ok());
    }
}
