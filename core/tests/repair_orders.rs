use claimgen_core::{
    claim_generator::ClaimStatus,
    config::GeneratorConfig,
    dataset::Dataset,
    pipeline::Pipeline,
    repair_order_generator::{target_sum, RepairOrderLine},
    types::IntRange,
};
use chrono::Duration;
use std::collections::HashSet;

fn dataset(config: GeneratorConfig) -> Dataset {
    Pipeline::build_with_config("orders-test".into(), config)
        .expect("build")
        .generate()
        .expect("generate")
        .dataset
}

#[test]
fn denied_claims_get_no_lines_and_others_get_at_least_one() {
    let ds = dataset(GeneratorConfig::default_test().with_seed(21));
    for c in &ds.claims {
        let lines = ds.lines_for_claim(c.claim_id);
        if c.status == ClaimStatus::Denied {
            assert!(lines.is_empty(), "denied claim {} has lines", c.claim_id);
        } else {
            assert!(
                (1..=4).contains(&lines.len()),
                "claim {} has {} lines",
                c.claim_id,
                lines.len()
            );
        }
    }
}

#[test]
fn line_totals_reconcile_to_claim_target() {
    for seed in [22, 23, 24] {
        let ds = dataset(GeneratorConfig::default_test().with_seed(seed));
        for c in ds.claims.iter().filter(|c| c.status.is_repairable()) {
            let lines = ds.lines_for_claim(c.claim_id);
            let target = target_sum(c).expect("repairable claim has a target");
            let sum: i64 = lines.iter().map(|l| l.line_total).sum();
            assert!(
                (sum as f64 - target).abs() <= lines.len() as f64,
                "claim {}: lines sum {} vs target {}",
                c.claim_id,
                sum,
                target
            );
        }
    }
}

#[test]
fn line_arithmetic_uses_the_shop_rate() {
    let ds = dataset(GeneratorConfig::default_test().with_seed(25));
    assert!(!ds.repair_orders.is_empty());
    for l in &ds.repair_orders {
        let claim = ds.claim(l.claim_id).expect("line's claim exists");
        let shop = ds.shop(l.shop_id).expect("line's shop exists");
        assert_eq!(l.shop_id, claim.shop_id);
        assert_eq!(l.labor_rate, shop.hourly_labor_rate);
        assert_eq!(l.labor_cost, l.labor_hours * l.labor_rate);
        assert_eq!(l.subtotal, l.parts_cost + l.labor_cost);
        assert_eq!(l.tax, (l.subtotal as f64 * 0.10).round() as i64);
        assert!((5..=20).contains(&l.labor_hours));
        assert!((20_000..=150_000).contains(&l.parts_cost));
    }
}

#[test]
fn line_numbers_are_contiguous_and_ids_unique() {
    let ds = dataset(GeneratorConfig::default_test().with_seed(26));
    let ids: HashSet<u64> = ds.repair_orders.iter().map(|l| l.line_id).collect();
    assert_eq!(ids.len(), ds.repair_orders.len());

    for c in &ds.claims {
        let numbers: Vec<u32> = ds.lines_for_claim(c.claim_id).iter().map(|l| l.line_no).collect();
        let expected: Vec<u32> = (1..=numbers.len() as u32).collect();
        let mut sorted = numbers.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, expected, "claim {} line numbers", c.claim_id);
    }
    for l in &ds.repair_orders {
        assert_eq!(l.line_id, l.claim_id * 10 + l.line_no as u64);
    }
}

#[test]
fn work_dates_follow_assessment() {
    let ds = dataset(GeneratorConfig::default_test().with_seed(27));
    for l in &ds.repair_orders {
        let claim = ds.claim(l.claim_id).unwrap();
        let start = l.work_start_date - claim.assessed_date;
        let end = l.work_end_date - claim.assessed_date;
        assert!(start >= Duration::zero() && start <= Duration::days(3));
        assert!(end >= Duration::days(3) && end <= Duration::days(20));
        assert!(l.work_start_date <= l.work_end_date);
    }
}

#[test]
fn zero_cost_lines_pass_through_unscaled() {
    let mut config = GeneratorConfig::default_test().with_seed(28);
    config.orders.parts_cost = IntRange::new(0, 0);
    config.orders.labor_hours = IntRange::new(0, 0);
    let ds = dataset(config);

    assert!(!ds.repair_orders.is_empty());
    for l in &ds.repair_orders {
        assert_eq!(l.subtotal, 0);
        assert_eq!(l.tax, 0);
        assert_eq!(l.line_total, 0);
    }
}

#[test]
fn order_cap_keeps_the_lowest_claim_and_line_numbers() {
    let uncapped = dataset(GeneratorConfig::default_test().with_seed(29));
    let capped = dataset(GeneratorConfig {
        order_cap: 7,
        ..GeneratorConfig::default_test().with_seed(29)
    });

    let mut expected: Vec<RepairOrderLine> = uncapped.repair_orders.clone();
    expected.sort_by_key(|l| (l.claim_id, l.line_no));
    expected.truncate(7);
    assert_eq!(capped.repair_orders, expected);
    assert_eq!(capped.claims, uncapped.claims, "order cap must not touch claims");
}
