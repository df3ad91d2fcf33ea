use claimgen_core::{
    claim_generator::{
        assign_shop, claims_for_policy, estimate_range, Claim, ClaimGenerator, ClaimStatus,
        LossCause, SEVERE_WEATHER_MONTHS,
    },
    config::GeneratorConfig,
    dataset::Dataset,
    error::GenError,
    pipeline::Pipeline,
    policy_generator::PolicyGenerator,
    rng::RngBank,
    shop_generator::RepairShopGenerator,
};
use chrono::{Datelike, Duration};
use std::collections::HashMap;

fn dataset(config: GeneratorConfig) -> Dataset {
    Pipeline::build_with_config("claims-test".into(), config)
        .expect("build")
        .generate()
        .expect("generate")
        .dataset
}

/// Enough claims for distribution checks, with no cap trimming.
fn large_config(seed: u64) -> GeneratorConfig {
    GeneratorConfig {
        policy_count: 2_000,
        claim_cap: 10_000,
        order_cap: 50_000,
        ..GeneratorConfig::default()
    }
    .with_seed(seed)
}

#[test]
fn reserve_plus_paid_equals_approved() {
    let ds = dataset(GeneratorConfig::default_test().with_seed(1));
    for c in &ds.claims {
        assert!(c.outstanding_reserve >= 0, "claim {} has negative reserve", c.claim_id);
        assert_eq!(
            c.paid_to_date + c.outstanding_reserve,
            c.approved_cost,
            "claim {} does not reconcile",
            c.claim_id
        );
        let expected_paid = (c.approved_cost as f64 * c.status.paid_fraction()).round() as i64;
        assert_eq!(c.paid_to_date, expected_paid);
        if c.status == ClaimStatus::Denied {
            assert_eq!(c.paid_to_date, 0);
        }
        if c.status == ClaimStatus::Paid {
            assert_eq!(c.outstanding_reserve, 0);
        }
    }
}

#[test]
fn approved_cost_is_floored_at_deductible_plus_margin() {
    let ds = dataset(GeneratorConfig::default_test().with_seed(2));
    for c in &ds.claims {
        let policy = ds.policy(c.policy_id).expect("policy exists");
        let expected_deductible = if matches!(c.loss_cause, LossCause::Collision | LossCause::Vandalism) {
            policy.deductible_collision
        } else {
            policy.deductible_comprehensive
        };
        assert_eq!(c.deductible_applied, expected_deductible);
        assert_eq!(c.approved_cost, c.estimate_cost.max(c.deductible_applied + 10_000));
        assert!(estimate_range(c.loss_cause, c.severity).contains(c.estimate_cost));
    }
}

#[test]
fn dates_are_chained_in_order() {
    let config = GeneratorConfig::default_test().with_seed(3);
    let epoch = config.epoch;
    let ds = dataset(config);
    for c in &ds.claims {
        let incident_offset = c.incident_date - epoch;
        assert!(incident_offset >= Duration::zero() && incident_offset <= Duration::days(700));
        let report = c.reported_date - c.incident_date;
        let assess = c.assessed_date - c.reported_date;
        let complete = c.target_completion_date - c.assessed_date;
        assert!(report >= Duration::zero() && report <= Duration::days(7), "claim {}", c.claim_id);
        assert!(assess >= Duration::zero() && assess <= Duration::days(30), "claim {}", c.claim_id);
        assert!(complete >= Duration::days(1) && complete <= Duration::days(90), "claim {}", c.claim_id);
    }
}

#[test]
fn claims_per_policy_follow_the_hash_rule() {
    let ds = dataset(GeneratorConfig::default_test().with_seed(4));
    let counts = ds.claims_per_policy();

    assert_eq!(counts.len(), ds.policies.len(), "every policy should have claims");
    for p in &ds.policies {
        let n = counts.get(&p.policy_id).copied().unwrap_or(0) as u64;
        assert_eq!(n, claims_for_policy(p.policy_id), "policy {}", p.policy_id);
    }
    for c in &ds.claims {
        let k = c.claim_id - c.policy_id * 10;
        assert!((1..=3).contains(&k), "claim {} is not derived from policy {}", c.claim_id, c.policy_id);
    }
}

#[test]
fn shop_assignment_prefers_the_incident_region() {
    let ds = dataset(GeneratorConfig::default_test().with_seed(5));
    for c in &ds.claims {
        let shop = ds.shop(c.shop_id).expect("assigned shop exists");
        let regional_available = ds.repair_shops.iter().any(|s| s.prefecture == c.incident_pref);
        if regional_available {
            assert_eq!(
                shop.prefecture, c.incident_pref,
                "claim {} went out of region while a local shop exists",
                c.claim_id
            );
        }
        let expected = assign_shop(c.claim_id, &c.incident_pref, &ds.repair_shops).unwrap();
        assert_eq!(expected.shop_id, c.shop_id, "assignment is not reproducible");
    }
}

#[test]
fn shop_assignment_falls_back_when_no_regional_shop_exists() {
    let config = GeneratorConfig::default_test();
    let mut shops = RepairShopGenerator::new(&config).generate(&RngBank::new(6));
    for s in shops.iter_mut() {
        s.prefecture = "Okinawa".into();
    }
    let chosen = assign_shop(1_000_011, "Tokyo", &shops).expect("some shop");
    assert!(shops.iter().any(|s| s.shop_id == chosen.shop_id));
    assert_eq!(assign_shop(1_000_011, "Tokyo", &shops).unwrap().shop_id, chosen.shop_id);
}

#[test]
fn no_shops_is_a_referential_gap() {
    let config = GeneratorConfig::default_test();
    let bank = RngBank::new(7);
    let policies = PolicyGenerator::new(&config).generate(&bank);
    let result = ClaimGenerator::new(&config).unwrap().generate(&policies, &[], &bank);
    assert!(matches!(result, Err(GenError::ReferentialGap { .. })));
}

#[test]
fn cap_trims_by_policy_then_incident_date() {
    let uncapped = dataset(GeneratorConfig::default_test().with_seed(8));
    let capped = dataset(GeneratorConfig {
        claim_cap: 10,
        ..GeneratorConfig::default_test().with_seed(8)
    });

    assert_eq!(capped.claims.len(), 10);
    let mut expected: Vec<Claim> = uncapped.claims.clone();
    expected.sort_by_key(|c| (c.policy_id, c.incident_date, c.claim_id));
    expected.truncate(10);
    assert_eq!(capped.claims, expected);
}

#[test]
fn status_mix_tracks_the_thresholds() {
    let ds = dataset(large_config(9));
    let n = ds.claims.len() as f64;
    let mut by_status: HashMap<ClaimStatus, usize> = HashMap::new();
    for c in &ds.claims {
        *by_status.entry(c.status).or_insert(0) += 1;
    }
    let share = |s: ClaimStatus| by_status.get(&s).copied().unwrap_or(0) as f64 / n;

    assert!((share(ClaimStatus::Denied) - 0.08).abs() < 0.03, "denied {}", share(ClaimStatus::Denied));
    assert!((share(ClaimStatus::Open) - 0.22).abs() < 0.04, "open {}", share(ClaimStatus::Open));
    assert!((share(ClaimStatus::Approved) - 0.55).abs() < 0.05, "approved {}", share(ClaimStatus::Approved));
    assert!((share(ClaimStatus::Paid) - 0.15).abs() < 0.04, "paid {}", share(ClaimStatus::Paid));
}

#[test]
fn severe_weather_window_raises_flood_and_weather_share() {
    let ds = dataset(large_config(10));
    let (window, regular): (Vec<&Claim>, Vec<&Claim>) = ds
        .claims
        .iter()
        .partition(|c| SEVERE_WEATHER_MONTHS.contains(&c.incident_date.month()));

    let share = |claims: &[&Claim], cause: LossCause| {
        claims.iter().filter(|c| c.loss_cause == cause).count() as f64 / claims.len() as f64
    };

    assert!(share(&window, LossCause::Flood) > share(&regular, LossCause::Flood) * 2.0);
    assert!(share(&window, LossCause::Weather) > share(&regular, LossCause::Weather) * 1.5);
}

#[test]
fn fraud_score_and_region_are_well_formed() {
    let ds = dataset(GeneratorConfig::default_test().with_seed(11));
    for c in &ds.claims {
        assert!((0.0..=1.0).contains(&c.fraud_score));
        assert!(claimgen_core::geography::PREFECTURES.contains(&c.incident_pref.as_str()));
    }
}
