//! Deterministic repair-shop name generation using curated word lists.
//!
//! All generation is deterministic (same entity stream = same name).

use crate::rng::EntityRng;

/// Deterministic name generator using curated word lists
pub struct NameGenerator;

impl NameGenerator {
    /// Generate a shop name: "<Place> <Trade> <Suffix>" or
    /// "<Family> <Trade> <Suffix>".
    pub fn generate_shop_name(rng: &mut EntityRng) -> String {
        let trade = *rng.pick(Self::trades());
        let suffix = *rng.pick(Self::suffixes());
        let head = if rng.chance(0.5) {
            *rng.pick(Self::places())
        } else {
            *rng.pick(Self::family_names())
        };
        format!("{head} {trade} {suffix}")
    }

    /// Place-style prefixes
    fn places() -> &'static [&'static str] {
        &[
            "Sakura", "Fuji", "Midori", "Aozora", "Hikari", "Minato", "Kawa",
            "Yamato", "Asahi", "Hoshi", "Tsubasa", "Kaede", "Shiroyama",
            "Higashi", "Nishi", "Kita", "Minami", "Chuo", "Bayside", "Hilltop",
        ]
    }

    /// Family names used for owner-named shops
    fn family_names() -> &'static [&'static str] {
        &[
            "Sato", "Suzuki", "Takahashi", "Tanaka", "Watanabe", "Ito", "Yamamoto",
            "Nakamura", "Kobayashi", "Kato", "Yoshida", "Yamada", "Sasaki",
            "Yamaguchi", "Matsumoto", "Inoue", "Kimura", "Hayashi", "Shimizu",
            "Mori", "Ikeda", "Hashimoto", "Abe", "Ishikawa", "Ogawa",
        ]
    }

    fn trades() -> &'static [&'static str] {
        &[
            "Auto Body", "Motors", "Collision", "Auto Repair", "Car Care",
            "Paint & Body", "Auto Service", "Garage",
        ]
    }

    fn suffixes() -> &'static [&'static str] {
        &["Works", "Center", "Factory", "Co.", "Station", "Clinic", "Pit"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::{RngBank, StageSlot};

    #[test]
    fn name_generation_is_deterministic() {
        let bank1 = RngBank::new(12345);
        let mut rng1 = bank1.for_entity(StageSlot::RepairShop, 600_000);
        let name1 = NameGenerator::generate_shop_name(&mut rng1);

        let bank2 = RngBank::new(12345);
        let mut rng2 = bank2.for_entity(StageSlot::RepairShop, 600_000);
        let name2 = NameGenerator::generate_shop_name(&mut rng2);

        assert_eq!(name1, name2, "Same seed should produce same name");
    }

    #[test]
    fn generates_three_part_names() {
        let bank = RngBank::new(12345);
        for key in 0..50 {
            let mut rng = bank.for_entity(StageSlot::RepairShop, key);
            let name = NameGenerator::generate_shop_name(&mut rng);
            let parts: Vec<&str> = name.split_whitespace().collect();
            assert!(parts.len() >= 3, "Shop name should have at least 3 words: {name}");
        }
    }
}
