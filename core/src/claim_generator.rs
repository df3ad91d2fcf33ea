//! Claim population.
//!
//! For each policy: a hash-derived claim count, chained dates, weighted
//! cause/severity/status draws, reserve accounting and a regional shop
//! assignment. The whole population is then capped in a stable order.

use crate::{
    config::{ClaimParams, GeneratorConfig},
    dataset::{cap_and_trim, Dataset},
    error::{GenError, GenResult},
    event::PipelineEvent,
    geography::PREFECTURES,
    hash::{stable_hash, stable_hash_pair},
    policy_generator::Policy,
    rng::{RngBank, StageSlot},
    sampling::WeightedTable,
    shop_generator::RepairShop,
    stage::GeneratorStage,
    types::{EntityId, IntRange, Yen},
};
use chrono::{Datelike, Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;

pub const MAX_CLAIMS_PER_POLICY: u64 = 3;

/// Incident months that use the severe-weather cause table.
pub const SEVERE_WEATHER_MONTHS: RangeInclusive<u32> = 7..=10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LossCause {
    Collision,
    Glass,
    Theft,
    Vandalism,
    Weather,
    Flood,
    Fire,
    #[serde(rename = "Animal Strike")]
    AnimalStrike,
}

impl LossCause {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Collision => "Collision",
            Self::Glass => "Glass",
            Self::Theft => "Theft",
            Self::Vandalism => "Vandalism",
            Self::Weather => "Weather",
            Self::Flood => "Flood",
            Self::Fire => "Fire",
            Self::AnimalStrike => "Animal Strike",
        }
    }

    /// Causes settled against the collision deductible.
    pub fn uses_collision_deductible(&self) -> bool {
        matches!(self, Self::Collision | Self::Vandalism)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Minor,
    Moderate,
    Severe,
    #[serde(rename = "Total Loss")]
    TotalLoss,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Minor => "Minor",
            Self::Moderate => "Moderate",
            Self::Severe => "Severe",
            Self::TotalLoss => "Total Loss",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClaimStatus {
    Denied,
    Open,
    Approved,
    Paid,
}

impl ClaimStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Denied => "Denied",
            Self::Open => "Open",
            Self::Approved => "Approved",
            Self::Paid => "Paid",
        }
    }

    /// Share of the approved cost paid out so far.
    pub fn paid_fraction(&self) -> f64 {
        match self {
            Self::Denied => 0.0,
            Self::Open => 0.40,
            Self::Approved => 0.80,
            Self::Paid => 1.00,
        }
    }

    /// Claims that receive repair-order lines.
    pub fn is_repairable(&self) -> bool {
        !matches!(self, Self::Denied)
    }
}

// ── Named sampling tables ──────────────────────────────────────────

pub const LOSS_CAUSE_REGULAR: &[(LossCause, f64)] = &[
    (LossCause::Collision, 40.0),
    (LossCause::Glass, 12.0),
    (LossCause::Theft, 6.0),
    (LossCause::Vandalism, 7.0),
    (LossCause::Weather, 8.0),
    (LossCause::Flood, 3.0),
    (LossCause::Fire, 4.0),
    (LossCause::AnimalStrike, 20.0),
];

pub const LOSS_CAUSE_SEVERE_WEATHER: &[(LossCause, f64)] = &[
    (LossCause::Collision, 30.0),
    (LossCause::Glass, 10.0),
    (LossCause::Theft, 5.0),
    (LossCause::Vandalism, 5.0),
    (LossCause::Weather, 20.0),
    (LossCause::Flood, 12.0),
    (LossCause::Fire, 3.0),
    (LossCause::AnimalStrike, 15.0),
];

pub const SEVERITY_WEIGHTS: &[(Severity, f64)] = &[
    (Severity::Minor, 50.0),
    (Severity::Moderate, 30.0),
    (Severity::Severe, 15.0),
    (Severity::TotalLoss, 5.0),
];

pub const CLAIM_STATUS_THRESHOLDS: &[(f64, ClaimStatus)] = &[
    (0.08, ClaimStatus::Denied),
    (0.30, ClaimStatus::Open),
    (0.85, ClaimStatus::Approved),
    (1.00, ClaimStatus::Paid),
];

/// Estimate range for a (cause, severity) pair. Cause rules are checked
/// before the severity fallback.
pub fn estimate_range(cause: LossCause, severity: Severity) -> IntRange {
    match (cause, severity) {
        (LossCause::Glass, _) => IntRange::new(40_000, 180_000),
        (LossCause::Theft | LossCause::Vandalism, _) => IntRange::new(150_000, 600_000),
        (LossCause::Weather | LossCause::Flood, Severity::Severe | Severity::TotalLoss) => {
            IntRange::new(600_000, 2_200_000)
        }
        (_, Severity::Minor) => IntRange::new(30_000, 150_000),
        (_, Severity::Moderate) => IntRange::new(150_000, 450_000),
        (_, Severity::Severe) => IntRange::new(450_000, 1_000_000),
        (_, Severity::TotalLoss) => IntRange::new(1_000_000, 2_500_000),
    }
}

/// Claims per policy, in 1..=3. Depends only on the policy id.
pub fn claims_for_policy(policy_id: EntityId) -> u64 {
    stable_hash(policy_id) % MAX_CLAIMS_PER_POLICY + 1
}

/// Rank shops by (regional match desc, tie-break hash asc) and take the first.
pub fn assign_shop<'a>(
    claim_id: EntityId,
    incident_pref: &str,
    shops: &'a [RepairShop],
) -> Option<&'a RepairShop> {
    shops.iter().min_by_key(|shop| {
        (
            shop.prefecture != incident_pref,
            stable_hash_pair(claim_id, shop.shop_id),
            shop.shop_id,
        )
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    pub claim_id:               EntityId,
    pub policy_id:              EntityId,
    pub incident_date:          NaiveDate,
    pub reported_date:          NaiveDate,
    pub assessed_date:          NaiveDate,
    pub target_completion_date: NaiveDate,
    pub incident_pref:          String,
    pub loss_cause:             LossCause,
    pub severity:               Severity,
    pub estimate_cost:          Yen,
    pub deductible_applied:     Yen,
    pub approved_cost:          Yen,
    pub status:                 ClaimStatus,
    pub paid_to_date:           Yen,
    pub outstanding_reserve:    Yen,
    pub fraud_score:            f64,
    pub towing_required:        bool,
    pub shop_id:                EntityId,
}

pub struct ClaimGenerator {
    cap:            usize,
    epoch:          NaiveDate,
    params:         ClaimParams,
    regular:        WeightedTable<LossCause>,
    severe_weather: WeightedTable<LossCause>,
    severity:       WeightedTable<Severity>,
    status:         WeightedTable<ClaimStatus>,
}

impl ClaimGenerator {
    pub fn new(config: &GeneratorConfig) -> GenResult<Self> {
        Ok(Self {
            cap:            config.claim_cap,
            epoch:          config.epoch,
            params:         config.claims.clone(),
            regular:        WeightedTable::from_weights(LOSS_CAUSE_REGULAR)?,
            severe_weather: WeightedTable::from_weights(LOSS_CAUSE_SEVERE_WEATHER)?,
            severity:       WeightedTable::from_weights(SEVERITY_WEIGHTS)?,
            status:         WeightedTable::from_thresholds(CLAIM_STATUS_THRESHOLDS)?,
        })
    }

    fn cause_table(&self, incident_date: NaiveDate) -> &WeightedTable<LossCause> {
        if SEVERE_WEATHER_MONTHS.contains(&incident_date.month()) {
            &self.severe_weather
        } else {
            &self.regular
        }
    }

    /// Generate every candidate claim, then cap. Returns the kept claims
    /// and the number generated before trimming.
    pub fn generate(
        &self,
        policies: &[Policy],
        shops: &[RepairShop],
        bank: &RngBank,
    ) -> GenResult<(Vec<Claim>, usize)> {
        let mut candidates = Vec::new();
        for policy in policies {
            for k in 1..=claims_for_policy(policy.policy_id) {
                let claim_id = policy.policy_id * 10 + k;
                candidates.push(self.generate_one(claim_id, policy, shops, bank)?);
            }
        }
        let generated = candidates.len();
        let kept = cap_and_trim(candidates, self.cap, |c| {
            (c.policy_id, c.incident_date, c.claim_id)
        });
        Ok((kept, generated))
    }

    fn generate_one(
        &self,
        claim_id: EntityId,
        policy: &Policy,
        shops: &[RepairShop],
        bank: &RngBank,
    ) -> GenResult<Claim> {
        let mut rng = bank.for_entity(StageSlot::Claim, claim_id);
        let p = &self.params;

        // Each date builds on the realized value of the previous one.
        let incident_date = self.epoch + Duration::days(rng.range_inclusive(p.incident_offset_days));
        let reported_date = incident_date + Duration::days(rng.range_inclusive(p.report_delay_days));
        let assessed_date = reported_date + Duration::days(rng.range_inclusive(p.assessment_delay_days));
        let target_completion_date =
            assessed_date + Duration::days(rng.range_inclusive(p.completion_delay_days));

        let incident_pref = if rng.chance(p.home_region_probability) {
            policy.registered_pref.clone()
        } else {
            rng.pick(PREFECTURES).to_string()
        };

        let loss_cause = self.cause_table(incident_date).pick(rng.next_f64());
        let severity = self.severity.pick(rng.next_f64());
        let estimate_cost = rng.range_inclusive(estimate_range(loss_cause, severity));

        let deductible_applied = if loss_cause.uses_collision_deductible() {
            policy.deductible_collision
        } else {
            policy.deductible_comprehensive
        };
        let approved_cost = estimate_cost.max(deductible_applied + p.approval_margin);

        let status = self.status.pick(rng.next_f64());
        let paid_to_date = (approved_cost as f64 * status.paid_fraction()).round() as Yen;
        let outstanding_reserve = (approved_cost - paid_to_date).max(0);

        let fraud_score = (rng.next_f64() * 1000.0).round() / 1000.0;
        let towing_required = rng.chance(p.towing_probability);

        let shop = assign_shop(claim_id, &incident_pref, shops).ok_or_else(|| {
            GenError::ReferentialGap {
                entity:  "claim",
                id:      claim_id,
                missing: "any repair shop".into(),
            }
        })?;

        log::debug!(
            "claim {claim_id}: policy={} cause={} severity={} status={} shop={}",
            policy.policy_id,
            loss_cause.as_str(),
            severity.as_str(),
            status.as_str(),
            shop.shop_id
        );

        Ok(Claim {
            claim_id,
            policy_id: policy.policy_id,
            incident_date,
            reported_date,
            assessed_date,
            target_completion_date,
            incident_pref,
            loss_cause,
            severity,
            estimate_cost,
            deductible_applied,
            approved_cost,
            status,
            paid_to_date,
            outstanding_reserve,
            fraud_score,
            towing_required,
            shop_id: shop.shop_id,
        })
    }
}

impl GeneratorStage for ClaimGenerator {
    fn name(&self) -> &'static str {
        "claim"
    }

    fn slot(&self) -> StageSlot {
        StageSlot::Claim
    }

    fn run(&self, dataset: &mut Dataset, rng: &RngBank) -> GenResult<Vec<PipelineEvent>> {
        let (claims, generated) = self.generate(&dataset.policies, &dataset.repair_shops, rng)?;
        let kept = claims.len();
        dataset.claims = claims;

        let mut events = vec![PipelineEvent::StageCompleted {
            stage: self.name().to_string(),
            generated,
            kept,
        }];
        if kept < generated {
            log::info!("claim: cap {} trimmed {} of {generated} claims", self.cap, generated - kept);
            events.push(PipelineEvent::CapApplied {
                stage: self.name().to_string(),
                cap: self.cap,
                generated,
                dropped: generated - kept,
            });
        }
        log::info!("claim: kept {kept} claims");
        Ok(events)
    }
}
