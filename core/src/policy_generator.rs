//! Policy population with the premium rating engine applied.

use crate::{
    config::{GeneratorConfig, PolicyParams},
    dataset::Dataset,
    error::GenResult,
    event::PipelineEvent,
    geography::PREFECTURES,
    rating::{RatingFactors, RatingInput, VehicleUse},
    rng::{RngBank, StageSlot},
    stage::GeneratorStage,
    types::{EntityId, IntRange, Yen},
};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Index-aligned make/model pairs. The two indices are drawn
/// independently, so cross pairings like "Toyota C-Class" happen.
pub const VEHICLE_MAKES: &[&str] = &[
    "Toyota", "Honda", "Nissan", "Mazda", "Subaru",
    "Suzuki", "Daihatsu", "Lexus", "BMW", "Mercedes-Benz",
];
pub const VEHICLE_MODELS: &[&str] = &[
    "Prius", "Fit", "Note", "CX-5", "Impreza",
    "Swift", "Tanto", "RX", "3 Series", "C-Class",
];

const MIN_LICENSE_AGE: i64 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleAgeBand {
    Newer,
    Mid,
    Older,
}

impl VehicleAgeBand {
    pub fn for_year(year: i64) -> Self {
        if year >= 2020 {
            Self::Newer
        } else if year >= 2012 {
            Self::Mid
        } else {
            Self::Older
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Newer => "Newer",
            Self::Mid => "Mid",
            Self::Older => "Older",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PolicyStatus {
    Active,
    Lapsed,
    Cancelled,
}

impl PolicyStatus {
    /// Pure function of the id, not sampled.
    pub fn for_id(policy_id: EntityId) -> Self {
        if policy_id % 11 == 0 {
            Self::Lapsed
        } else if policy_id % 17 == 0 {
            Self::Cancelled
        } else {
            Self::Active
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "Active",
            Self::Lapsed => "Lapsed",
            Self::Cancelled => "Cancelled",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    pub policy_id:                EntityId,
    pub customer_id:              EntityId,
    pub start_date:               NaiveDate,
    pub end_date:                 NaiveDate,
    pub vehicle_make:             String,
    pub vehicle_model:            String,
    pub vehicle_year:             i64,
    pub vehicle_age_band:         VehicleAgeBand,
    pub vehicle_use:              VehicleUse,
    pub driver_age:               i64,
    pub license_years:            i64,
    pub ncb_years:                i64,
    pub prior_claims_3y:          i64,
    pub registered_pref:          String,
    pub deductible_collision:     Yen,
    pub deductible_comprehensive: Yen,
    pub region_factor:            f64,
    pub age_factor:               f64,
    pub vehicle_factor:           f64,
    pub use_factor:               f64,
    pub claim_history_factor:     f64,
    pub ncb_discount:             f64,
    pub annual_premium:           Yen,
    pub status:                   PolicyStatus,
}

impl Policy {
    pub fn rating_input(&self) -> RatingInput<'_> {
        RatingInput {
            registered_pref: &self.registered_pref,
            driver_age:      self.driver_age,
            vehicle_make:    &self.vehicle_make,
            vehicle_use:     self.vehicle_use,
            prior_claims_3y: self.prior_claims_3y,
            ncb_years:       self.ncb_years,
        }
    }

    /// Factors exactly as stored on the row.
    pub fn stored_factors(&self) -> RatingFactors {
        RatingFactors {
            region:        self.region_factor,
            age:           self.age_factor,
            vehicle:       self.vehicle_factor,
            use_factor:    self.use_factor,
            claim_history: self.claim_history_factor,
            ncb_discount:  self.ncb_discount,
        }
    }
}

pub struct PolicyGenerator {
    count:         usize,
    id_base:       u64,
    customer_base: u64,
    customer_pool: u64,
    epoch:         NaiveDate,
    params:        PolicyParams,
}

impl PolicyGenerator {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            count:         config.policy_count,
            id_base:       config.ids.policy,
            customer_base: config.ids.customer,
            customer_pool: config.customer_pool as u64,
            epoch:         config.epoch,
            params:        config.policies.clone(),
        }
    }

    pub fn generate(&self, bank: &RngBank) -> Vec<Policy> {
        (0..self.count as u64)
            .map(|i| self.generate_one(i, bank))
            .collect()
    }

    fn generate_one(&self, seq: u64, bank: &RngBank) -> Policy {
        let policy_id = self.id_base + seq + 1;
        let mut rng = bank.for_entity(StageSlot::Policy, policy_id);
        let p = &self.params;

        let customer_id = self.customer_base + seq % self.customer_pool;
        let start_date = self.epoch + Duration::days(rng.range_inclusive(p.start_offset_days));
        let end_date = start_date + Duration::days(p.term_days);

        let vehicle_make = rng.pick(VEHICLE_MAKES).to_string();
        let vehicle_model = rng.pick(VEHICLE_MODELS).to_string();
        let vehicle_year = rng.range_inclusive(p.vehicle_year);
        let vehicle_use = *rng.pick(&VehicleUse::ALL);

        let driver_age = rng.range_inclusive(p.driver_age);
        let max_license = (driver_age - MIN_LICENSE_AGE).max(0);
        let license_years = rng.range_inclusive(IntRange::new(0, max_license));
        let ncb_years = rng.range_inclusive(p.ncb_years).min(license_years);
        let prior_claims_3y = rng.range_inclusive(p.prior_claims);
        let registered_pref = rng.pick(PREFECTURES).to_string();
        let deductible_collision = *rng.pick(&p.collision_deductibles);
        let deductible_comprehensive = *rng.pick(&p.comprehensive_deductibles);

        let factors = RatingFactors::for_input(&RatingInput {
            registered_pref: &registered_pref,
            driver_age,
            vehicle_make: &vehicle_make,
            vehicle_use,
            prior_claims_3y,
            ncb_years,
        });
        let annual_premium = factors.premium(p.base_rate);

        Policy {
            policy_id,
            customer_id,
            start_date,
            end_date,
            vehicle_make,
            vehicle_model,
            vehicle_year,
            vehicle_age_band: VehicleAgeBand::for_year(vehicle_year),
            vehicle_use,
            driver_age,
            license_years,
            ncb_years,
            prior_claims_3y,
            registered_pref,
            deductible_collision,
            deductible_comprehensive,
            region_factor: factors.region,
            age_factor: factors.age,
            vehicle_factor: factors.vehicle,
            use_factor: factors.use_factor,
            claim_history_factor: factors.claim_history,
            ncb_discount: factors.ncb_discount,
            annual_premium,
            status: PolicyStatus::for_id(policy_id),
        }
    }
}

impl GeneratorStage for PolicyGenerator {
    fn name(&self) -> &'static str {
        "policy"
    }

    fn slot(&self) -> StageSlot {
        StageSlot::Policy
    }

    fn run(&self, dataset: &mut Dataset, rng: &RngBank) -> GenResult<Vec<PipelineEvent>> {
        dataset.policies = self.generate(rng);
        let n = dataset.policies.len();
        let total_premium: Yen = dataset.policies.iter().map(|p| p.annual_premium).sum();
        log::info!("policy: generated {n} policies, total premium {total_premium}");
        Ok(vec![PipelineEvent::StageCompleted {
            stage:     self.name().to_string(),
            generated: n,
            kept:      n,
        }])
    }
}
