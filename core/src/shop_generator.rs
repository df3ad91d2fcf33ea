//! Repair-shop population. Shops are reference data for claim
//! assignment and repair-order labor rates.

use crate::{
    config::{GeneratorConfig, ShopParams},
    dataset::Dataset,
    error::GenResult,
    event::PipelineEvent,
    geography::{CITIES, PREFECTURES},
    name_generator::NameGenerator,
    rng::{RngBank, StageSlot},
    stage::GeneratorStage,
    types::{EntityId, Yen},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Certification {
    Gold,
    Silver,
    Bronze,
}

impl Certification {
    pub const ALL: [Self; 3] = [Self::Gold, Self::Silver, Self::Bronze];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Gold => "Gold",
            Self::Silver => "Silver",
            Self::Bronze => "Bronze",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PartnerTier {
    A,
    B,
    C,
}

impl PartnerTier {
    pub const ALL: [Self; 3] = [Self::A, Self::B, Self::C];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::A => "A",
            Self::B => "B",
            Self::C => "C",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepairShop {
    pub shop_id:           EntityId,
    pub name:              String,
    pub prefecture:        String,
    pub city:              String,
    pub certification:     Certification,
    pub partner_tier:      PartnerTier,
    pub hourly_labor_rate: Yen,
    pub monthly_capacity:  i64,
    pub rating:            f64,
    pub sla_target_days:   i64,
}

pub struct RepairShopGenerator {
    count:   usize,
    id_base: u64,
    params:  ShopParams,
}

impl RepairShopGenerator {
    pub fn new(config: &GeneratorConfig) -> Self {
        Self {
            count:   config.shop_count,
            id_base: config.ids.shop,
            params:  config.shops.clone(),
        }
    }

    pub fn generate(&self, bank: &RngBank) -> Vec<RepairShop> {
        (0..self.count as u64)
            .map(|i| self.generate_one(self.id_base + i, bank))
            .collect()
    }

    fn generate_one(&self, shop_id: EntityId, bank: &RngBank) -> RepairShop {
        let mut rng = bank.for_entity(StageSlot::RepairShop, shop_id);
        let p = &self.params;

        let name = NameGenerator::generate_shop_name(&mut rng);
        // Drawn independently, not validated as a pair.
        let prefecture = rng.pick(PREFECTURES).to_string();
        let city = rng.pick(CITIES).to_string();
        let certification = *rng.pick(&Certification::ALL);
        let partner_tier = *rng.pick(&PartnerTier::ALL);
        let hourly_labor_rate = rng.range_inclusive(p.hourly_rate);
        let monthly_capacity = rng.range_inclusive(p.capacity);
        let rating = rng.range_inclusive(p.rating_tenths) as f64 / 10.0;
        let sla_target_days = rng.range_inclusive(p.sla_days);

        RepairShop {
            shop_id,
            name,
            prefecture,
            city,
            certification,
            partner_tier,
            hourly_labor_rate,
            monthly_capacity,
            rating,
            sla_target_days,
        }
    }
}

impl GeneratorStage for RepairShopGenerator {
    fn name(&self) -> &'static str {
        "repair_shop"
    }

    fn slot(&self) -> StageSlot {
        StageSlot::RepairShop
    }

    fn run(&self, dataset: &mut Dataset, rng: &RngBank) -> GenResult<Vec<PipelineEvent>> {
        dataset.repair_shops = self.generate(rng);
        let n = dataset.repair_shops.len();
        log::info!("repair_shop: generated {n} shops");
        Ok(vec![PipelineEvent::StageCompleted {
            stage:     self.name().to_string(),
            generated: n,
            kept:      n,
        }])
    }
}
