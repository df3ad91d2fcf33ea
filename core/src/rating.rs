//! Multiplicative premium rating.
//!
//! premium = round(base_rate × region × age × vehicle × use × history × (1 − ncb_discount))
//!
//! The factor tables are illustrative constants, not a filed rate plan.
//! Multiplication order is fixed so a premium recomputed from stored
//! factors is bit-identical to the one computed at generation time.

use crate::types::Yen;
use serde::{Deserialize, Serialize};

pub const NCB_STEP: f64 = 0.03;
pub const NCB_CAP: f64 = 0.30;

const PREMIUM_MAKES: &[&str] = &["Lexus", "BMW", "Mercedes-Benz"];
const MID_MAKES: &[&str] = &["Mazda", "Subaru"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VehicleUse {
    Personal,
    Commute,
    Commercial,
}

impl VehicleUse {
    pub const ALL: [Self; 3] = [Self::Personal, Self::Commute, Self::Commercial];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Personal => "Personal",
            Self::Commute => "Commute",
            Self::Commercial => "Commercial",
        }
    }
}

/// Attributes the rating engine reads.
#[derive(Debug, Clone, Copy)]
pub struct RatingInput<'a> {
    pub registered_pref: &'a str,
    pub driver_age:      i64,
    pub vehicle_make:    &'a str,
    pub vehicle_use:     VehicleUse,
    pub prior_claims_3y: i64,
    pub ncb_years:       i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RatingFactors {
    pub region:        f64,
    pub age:           f64,
    pub vehicle:       f64,
    pub use_factor:    f64,
    pub claim_history: f64,
    pub ncb_discount:  f64,
}

impl RatingFactors {
    pub fn for_input(input: &RatingInput<'_>) -> Self {
        Self {
            region:        region_factor(input.registered_pref),
            age:           age_factor(input.driver_age),
            vehicle:       vehicle_factor(input.vehicle_make),
            use_factor:    use_factor(input.vehicle_use),
            claim_history: claim_history_factor(input.prior_claims_3y),
            ncb_discount:  ncb_discount(input.ncb_years),
        }
    }

    pub fn premium(&self, base_rate: f64) -> Yen {
        let raw = base_rate
            * self.region
            * self.age
            * self.vehicle
            * self.use_factor
            * self.claim_history
            * (1.0 - self.ncb_discount);
        raw.round() as Yen
    }
}

pub fn region_factor(pref: &str) -> f64 {
    match pref {
        "Tokyo" => 1.20,
        "Kanagawa" | "Osaka" => 1.15,
        "Hokkaido" => 1.10,
        _ => 1.00,
    }
}

pub fn age_factor(driver_age: i64) -> f64 {
    match driver_age {
        a if a < 25 => 1.35,
        25..=29 => 1.20,
        30..=59 => 1.00,
        _ => 1.15,
    }
}

pub fn vehicle_factor(make: &str) -> f64 {
    if PREMIUM_MAKES.contains(&make) {
        1.20
    } else if MID_MAKES.contains(&make) {
        1.05
    } else {
        1.00
    }
}

pub fn use_factor(vehicle_use: VehicleUse) -> f64 {
    match vehicle_use {
        VehicleUse::Commercial => 1.25,
        VehicleUse::Commute => 1.10,
        VehicleUse::Personal => 1.00,
    }
}

pub fn claim_history_factor(prior_claims: i64) -> f64 {
    match prior_claims {
        c if c >= 2 => 1.30,
        1 => 1.10,
        _ => 1.00,
    }
}

pub fn ncb_discount(ncb_years: i64) -> f64 {
    (ncb_years.max(0) as f64 * NCB_STEP).min(NCB_CAP)
}
