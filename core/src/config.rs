use crate::{
    error::{GenError, GenResult},
    types::{IntRange, Yen},
};
use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Upper bound for any single day offset or delay (100 years).
pub const MAX_OFFSET_DAYS: i64 = 36_500;

// ── Identity bases ─────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IdBases {
    /// First shop id; shops are numbered sequentially from here.
    pub shop:     u64,
    /// Policy ids are `policy + 1 ..= policy + policy_count`.
    pub policy:   u64,
    pub customer: u64,
}

impl Default for IdBases {
    fn default() -> Self {
        Self {
            shop:     600_000,
            policy:   100_000,
            customer: 500_000,
        }
    }
}

// ── Stage parameters ───────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShopParams {
    pub hourly_rate:  IntRange,
    pub capacity:     IntRange,
    /// Rating in tenths of a star: 35..=50 is 3.5..=5.0.
    pub rating_tenths: IntRange,
    pub sla_days:     IntRange,
}

impl Default for ShopParams {
    fn default() -> Self {
        Self {
            hourly_rate:   IntRange::new(8_000, 14_000),
            capacity:      IntRange::new(20, 80),
            rating_tenths: IntRange::new(35, 50),
            sla_days:      IntRange::new(5, 12),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicyParams {
    pub base_rate:                 f64,
    pub start_offset_days:         IntRange,
    pub term_days:                 i64,
    pub vehicle_year:              IntRange,
    pub driver_age:                IntRange,
    pub ncb_years:                 IntRange,
    pub prior_claims:              IntRange,
    pub collision_deductibles:     Vec<Yen>,
    pub comprehensive_deductibles: Vec<Yen>,
}

impl Default for PolicyParams {
    fn default() -> Self {
        Self {
            base_rate:                 45_000.0,
            start_offset_days:         IntRange::new(0, 700),
            term_days:                 365,
            vehicle_year:              IntRange::new(2008, 2024),
            driver_age:                IntRange::new(18, 80),
            ncb_years:                 IntRange::new(0, 20),
            prior_claims:              IntRange::new(0, 3),
            collision_deductibles:     vec![0, 50_000, 100_000],
            comprehensive_deductibles: vec![0, 30_000, 50_000],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClaimParams {
    pub incident_offset_days:   IntRange,
    pub report_delay_days:      IntRange,
    pub assessment_delay_days:  IntRange,
    pub completion_delay_days:  IntRange,
    /// Approved cost never falls below deductible + this margin.
    pub approval_margin:        Yen,
    pub towing_probability:     f64,
    /// Chance the incident happens in the policy's registered prefecture.
    pub home_region_probability: f64,
}

impl Default for ClaimParams {
    fn default() -> Self {
        Self {
            incident_offset_days:    IntRange::new(0, 700),
            report_delay_days:       IntRange::new(0, 7),
            assessment_delay_days:   IntRange::new(0, 30),
            completion_delay_days:   IntRange::new(1, 90),
            approval_margin:         10_000,
            towing_probability:      0.12,
            home_region_probability: 0.80,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RepairOrderParams {
    pub lines_per_claim:        IntRange,
    pub labor_hours:            IntRange,
    pub parts_cost:             IntRange,
    pub work_start_offset_days: IntRange,
    pub work_end_offset_days:   IntRange,
    pub tax_rate:               f64,
}

impl Default for RepairOrderParams {
    fn default() -> Self {
        Self {
            lines_per_claim:        IntRange::new(1, 4),
            labor_hours:            IntRange::new(5, 20),
            parts_cost:             IntRange::new(20_000, 150_000),
            work_start_offset_days: IntRange::new(0, 3),
            work_end_offset_days:   IntRange::new(3, 20),
            tax_rate:               0.10,
        }
    }
}

// ── Top level ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    pub seed:          u64,
    /// Day zero for policy start dates and incident dates.
    pub epoch:         NaiveDate,
    pub shop_count:    usize,
    pub policy_count:  usize,
    pub claim_cap:     usize,
    pub order_cap:     usize,
    pub customer_pool: usize,
    pub ids:           IdBases,
    pub shops:         ShopParams,
    pub policies:      PolicyParams,
    pub claims:        ClaimParams,
    pub orders:        RepairOrderParams,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            seed:          42,
            epoch:         NaiveDate::from_ymd_opt(2023, 1, 1).unwrap_or_default(),
            shop_count:    60,
            policy_count:  100,
            claim_cap:     140,
            order_cap:     280,
            customer_pool: 300,
            ids:           IdBases::default(),
            shops:         ShopParams::default(),
            policies:      PolicyParams::default(),
            claims:        ClaimParams::default(),
            orders:        RepairOrderParams::default(),
        }
    }
}

impl GeneratorConfig {
    /// Load from a JSON file. Missing fields fall back to defaults.
    /// In tests, use GeneratorConfig::default_test().
    pub fn load(path: &str) -> GenResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Cannot read {path}: {e}"))?;
        let config: Self = serde_json::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Cannot parse {path}: {e}"))?;
        Ok(config)
    }

    /// Small dataset for fast tests. Caps sit well above the natural
    /// output so nothing is trimmed unless a test lowers them.
    pub fn default_test() -> Self {
        Self {
            shop_count: 12,
            policy_count: 20,
            claim_cap: 60,
            order_cap: 240,
            customer_pool: 15,
            ..Self::default()
        }
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Reject non-positive counts, inverted ranges and out-of-domain
    /// constants. Called before any generation work starts.
    pub fn validate(&self) -> GenResult<()> {
        positive("shop_count", self.shop_count)?;
        positive("policy_count", self.policy_count)?;
        positive("claim_cap", self.claim_cap)?;
        positive("order_cap", self.order_cap)?;
        positive("customer_pool", self.customer_pool)?;

        let s = &self.shops;
        range("shops.hourly_rate", s.hourly_rate, 1)?;
        range("shops.capacity", s.capacity, 1)?;
        range("shops.rating_tenths", s.rating_tenths, 0)?;
        range("shops.sla_days", s.sla_days, 0)?;

        let p = &self.policies;
        if !(p.base_rate.is_finite() && p.base_rate > 0.0) {
            return Err(GenError::invalid("policies.base_rate", "must be positive"));
        }
        if p.term_days <= 0 {
            return Err(GenError::invalid("policies.term_days", "must be positive"));
        }
        if p.term_days > MAX_OFFSET_DAYS {
            return Err(GenError::invalid(
                "policies.term_days",
                format!("at most {MAX_OFFSET_DAYS} days"),
            ));
        }
        days("policies.start_offset_days", p.start_offset_days)?;
        range("policies.vehicle_year", p.vehicle_year, 1)?;
        range("policies.driver_age", p.driver_age, 16)?;
        range("policies.ncb_years", p.ncb_years, 0)?;
        range("policies.prior_claims", p.prior_claims, 0)?;
        amounts("policies.collision_deductibles", &p.collision_deductibles)?;
        amounts("policies.comprehensive_deductibles", &p.comprehensive_deductibles)?;

        let c = &self.claims;
        days("claims.incident_offset_days", c.incident_offset_days)?;
        days("claims.report_delay_days", c.report_delay_days)?;
        days("claims.assessment_delay_days", c.assessment_delay_days)?;
        days("claims.completion_delay_days", c.completion_delay_days)?;
        if c.approval_margin < 0 {
            return Err(GenError::invalid("claims.approval_margin", "must not be negative"));
        }
        probability("claims.towing_probability", c.towing_probability)?;
        probability("claims.home_region_probability", c.home_region_probability)?;

        let o = &self.orders;
        range("orders.lines_per_claim", o.lines_per_claim, 1)?;
        if o.lines_per_claim.max > 9 {
            // line ids are claim_id * 10 + line_no
            return Err(GenError::invalid("orders.lines_per_claim", "at most 9 lines per claim"));
        }
        range("orders.labor_hours", o.labor_hours, 0)?;
        range("orders.parts_cost", o.parts_cost, 0)?;
        days("orders.work_start_offset_days", o.work_start_offset_days)?;
        days("orders.work_end_offset_days", o.work_end_offset_days)?;
        if !(o.tax_rate.is_finite() && o.tax_rate >= 0.0) {
            return Err(GenError::invalid("orders.tax_rate", "must not be negative"));
        }

        // Every date is epoch plus a chain of offsets; the latest one
        // reachable must still be a representable calendar date.
        let horizon = (p.start_offset_days.max + p.term_days)
            .max(c.incident_offset_days.max
                + c.report_delay_days.max
                + c.assessment_delay_days.max
                + c.completion_delay_days.max)
            .max(c.incident_offset_days.max
                + c.report_delay_days.max
                + c.assessment_delay_days.max
                + o.work_start_offset_days.max.max(o.work_end_offset_days.max));
        if self.epoch.checked_add_signed(Duration::days(horizon)).is_none() {
            return Err(GenError::invalid(
                "epoch",
                format!("{} plus {horizon} days is out of the calendar range", self.epoch),
            ));
        }
        Ok(())
    }
}

fn positive(name: &str, value: usize) -> GenResult<()> {
    if value == 0 {
        return Err(GenError::invalid(name, "must be positive"));
    }
    Ok(())
}

fn range(name: &str, r: IntRange, floor: i64) -> GenResult<()> {
    if r.min > r.max {
        return Err(GenError::invalid(name, format!("inverted range {}..={}", r.min, r.max)));
    }
    if r.min < floor {
        return Err(GenError::invalid(name, format!("minimum {} is below {floor}", r.min)));
    }
    Ok(())
}

/// Day offsets are bounded so date arithmetic can never overflow.
fn days(name: &str, r: IntRange) -> GenResult<()> {
    range(name, r, 0)?;
    if r.max > MAX_OFFSET_DAYS {
        return Err(GenError::invalid(
            name,
            format!("maximum {} exceeds {MAX_OFFSET_DAYS} days", r.max),
        ));
    }
    Ok(())
}

fn amounts(name: &str, values: &[Yen]) -> GenResult<()> {
    if values.is_empty() {
        return Err(GenError::invalid(name, "must list at least one amount"));
    }
    if values.iter().any(|v| *v < 0) {
        return Err(GenError::invalid(name, "amounts must not be negative"));
    }
    Ok(())
}

fn probability(name: &str, p: f64) -> GenResult<()> {
    if !(0.0..=1.0).contains(&p) {
        return Err(GenError::invalid(name, format!("{p} is outside [0, 1]")));
    }
    Ok(())
}
