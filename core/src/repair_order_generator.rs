//! Repair-order line generation and claim-level reconciliation.
//!
//! Lines are sampled independently, then each claim's line totals are
//! rescaled so they add up to a status-dependent share of the claim's
//! approved cost.

use crate::{
    claim_generator::{Claim, ClaimStatus},
    config::{GeneratorConfig, RepairOrderParams},
    dataset::{cap_and_trim, Dataset},
    error::{GenError, GenResult},
    event::PipelineEvent,
    rng::{RngBank, StageSlot},
    shop_generator::RepairShop,
    stage::GeneratorStage,
    types::{EntityId, Yen},
};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairOrderLine {
    pub line_id:         EntityId,
    pub claim_id:        EntityId,
    pub shop_id:         EntityId,
    pub line_no:         u32,
    pub parts_cost:      Yen,
    pub labor_hours:     i64,
    pub labor_rate:      Yen,
    pub labor_cost:      Yen,
    pub subtotal:        Yen,
    pub tax:             Yen,
    pub line_total:      Yen,
    pub work_start_date: NaiveDate,
    pub work_end_date:   NaiveDate,
}

/// Share of the approved cost the lines must add up to.
/// None for claims that never receive lines.
pub fn target_fraction(status: ClaimStatus) -> Option<f64> {
    match status {
        ClaimStatus::Denied => None,
        ClaimStatus::Open => Some(0.90),
        ClaimStatus::Approved => Some(0.95),
        ClaimStatus::Paid => Some(1.00),
    }
}

pub fn target_sum(claim: &Claim) -> Option<f64> {
    target_fraction(claim.status).map(|f| claim.approved_cost as f64 * f)
}

/// Scale `raw` by target / sum(raw), rounding each value on its own.
///
/// No remainder pass: the output sum can miss `target` by up to half a
/// unit per value. A zero raw sum cannot be scaled and is returned as is.
pub fn rescale_to_target(raw: &[Yen], target: f64) -> Vec<Yen> {
    let raw_sum: Yen = raw.iter().sum();
    if raw_sum == 0 {
        return raw.to_vec();
    }
    let factor = target / raw_sum as f64;
    raw.iter()
        .map(|v| (*v as f64 * factor).round() as Yen)
        .collect()
}

pub struct RepairOrderGenerator {
    cap:    usize,
    params: RepairOrderParams,
}

impl RepairOrderGenerator {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            cap:    config.order_cap,
            params: config.orders.clone(),
        }
    }

    /// Generate lines for every repairable claim, then cap. Returns the
    /// kept lines and the number generated before trimming.
    pub fn generate(
        &self,
        claims: &[Claim],
        shops: &[RepairShop],
        bank: &RngBank,
    ) -> GenResult<(Vec<RepairOrderLine>, usize)> {
        let shops_by_id: HashMap<EntityId, &RepairShop> =
            shops.iter().map(|s| (s.shop_id, s)).collect();

        let mut candidates = Vec::new();
        for claim in claims {
            let Some(target) = target_sum(claim) else {
                continue;
            };
            let shop = shops_by_id.get(&claim.shop_id).ok_or_else(|| GenError::ReferentialGap {
                entity:  "claim",
                id:      claim.claim_id,
                missing: format!("repair shop {}", claim.shop_id),
            })?;
            candidates.extend(self.lines_for_claim(claim, shop, target, bank));
        }

        let generated = candidates.len();
        let kept = cap_and_trim(candidates, self.cap, |l| (l.claim_id, l.line_no));
        Ok((kept, generated))
    }

    fn lines_for_claim(
        &self,
        claim: &Claim,
        shop: &RepairShop,
        target: f64,
        bank: &RngBank,
    ) -> Vec<RepairOrderLine> {
        let mut rng = bank.for_entity(StageSlot::RepairOrder, claim.claim_id);
        let p = &self.params;
        let line_count = rng.range_inclusive(p.lines_per_claim) as u32;

        let mut lines: Vec<RepairOrderLine> = (1..=line_count)
            .map(|line_no| {
                let labor_hours = rng.range_inclusive(p.labor_hours);
                let parts_cost = rng.range_inclusive(p.parts_cost);
                let labor_cost = labor_hours * shop.hourly_labor_rate;
                let subtotal = parts_cost + labor_cost;
                let tax = (subtotal as f64 * p.tax_rate).round() as Yen;
                // Independent draws; start <= end is not enforced.
                let work_start_date =
                    claim.assessed_date + Duration::days(rng.range_inclusive(p.work_start_offset_days));
                let work_end_date =
                    claim.assessed_date + Duration::days(rng.range_inclusive(p.work_end_offset_days));

                RepairOrderLine {
                    line_id: claim.claim_id * 10 + line_no as u64,
                    claim_id: claim.claim_id,
                    shop_id: shop.shop_id,
                    line_no,
                    parts_cost,
                    labor_hours,
                    labor_rate: shop.hourly_labor_rate,
                    labor_cost,
                    subtotal,
                    tax,
                    // Raw total: subtotal plus the rounded tax. Rescaled below.
                    line_total: subtotal + tax,
                    work_start_date,
                    work_end_date,
                }
            })
            .collect();

        // Only line_total is rescaled. Parts, labor, subtotal and tax keep
        // their sampled values, so line_total != subtotal + tax after this.
        let raw: Vec<Yen> = lines.iter().map(|l| l.line_total).collect();
        if raw.iter().sum::<Yen>() == 0 {
            log::debug!("claim {}: zero raw line sum, lines left unscaled", claim.claim_id);
        }
        for (line, total) in lines.iter_mut().zip(rescale_to_target(&raw, target)) {
            line.line_total = total;
        }
        lines
    }
}

impl GeneratorStage for RepairOrderGenerator {
    fn name(&self) -> &'static str {
        "repair_order"
    }

    fn slot(&self) -> StageSlot {
        StageSlot::RepairOrder
    }

    fn run(&self, dataset: &mut Dataset, rng: &RngBank) -> GenResult<Vec<PipelineEvent>> {
        let (lines, generated) = self.generate(&dataset.claims, &dataset.repair_shops, rng)?;
        let kept = lines.len();
        dataset.repair_orders = lines;

        let mut events = vec![PipelineEvent::StageCompleted {
            stage: self.name().to_string(),
            generated,
            kept,
        }];
        if kept < generated {
            log::info!(
                "repair_order: cap {} trimmed {} of {generated} lines",
                self.cap,
                generated - kept
            );
            events.push(PipelineEvent::CapApplied {
                stage: self.name().to_string(),
                cap: self.cap,
                generated,
                dropped: generated - kept,
            });
        }
        log::info!("repair_order: kept {kept} lines");
        Ok(events)
    }
}
