use chrono::NaiveDate;
use claimgen_core::{
    config::{GeneratorConfig, MAX_OFFSET_DAYS},
    error::GenError,
    pipeline::Pipeline,
    types::IntRange,
};

#[test]
fn shipped_config_matches_defaults() {
    let config = GeneratorConfig::load("../data/generator.json").expect("load shipped config");
    let default = GeneratorConfig::default();
    assert_eq!(config.seed, default.seed);
    assert_eq!(config.epoch, default.epoch);
    assert_eq!(config.shop_count, 60);
    assert_eq!(config.policy_count, 100);
    assert_eq!(config.claim_cap, 140);
    assert_eq!(config.order_cap, 280);
    assert_eq!(config.policies.collision_deductibles, vec![0, 50_000, 100_000]);
    assert!(config.validate().is_ok());
}

#[test]
fn partial_json_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("partial.json");
    std::fs::write(&path, r#"{ "seed": 7, "orders": { "tax_rate": 0.08 } }"#).unwrap();

    let config = GeneratorConfig::load(path.to_str().unwrap()).unwrap();
    assert_eq!(config.seed, 7);
    assert_eq!(config.orders.tax_rate, 0.08);
    assert_eq!(config.orders.lines_per_claim, IntRange::new(1, 4));
    assert_eq!(config.shop_count, 60);
}

#[test]
fn missing_or_malformed_file_is_an_error() {
    assert!(matches!(
        GeneratorConfig::load("does/not/exist.json"),
        Err(GenError::Other(_))
    ));

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();
    let err = GeneratorConfig::load(path.to_str().unwrap()).unwrap_err();
    assert!(err.to_string().contains("Cannot parse"), "{err}");
}

#[test]
fn validation_rejects_out_of_domain_values() {
    let cases: Vec<(&str, GeneratorConfig)> = vec![
        ("policy_count", GeneratorConfig { policy_count: 0, ..GeneratorConfig::default() }),
        ("order_cap", GeneratorConfig { order_cap: 0, ..GeneratorConfig::default() }),
        ("policies.driver_age", {
            let mut c = GeneratorConfig::default();
            c.policies.driver_age = IntRange::new(60, 30);
            c
        }),
        ("policies.collision_deductibles", {
            let mut c = GeneratorConfig::default();
            c.policies.collision_deductibles.clear();
            c
        }),
        ("claims.home_region_probability", {
            let mut c = GeneratorConfig::default();
            c.claims.home_region_probability = -0.1;
            c
        }),
        ("orders.lines_per_claim", {
            let mut c = GeneratorConfig::default();
            c.orders.lines_per_claim = IntRange::new(1, 12);
            c
        }),
        ("claims.incident_offset_days", {
            let mut c = GeneratorConfig::default();
            c.claims.incident_offset_days = IntRange::new(0, 1_000_000_000);
            c
        }),
        ("policies.start_offset_days", {
            let mut c = GeneratorConfig::default();
            c.policies.start_offset_days = IntRange::new(0, MAX_OFFSET_DAYS + 1);
            c
        }),
        ("policies.term_days", {
            let mut c = GeneratorConfig::default();
            c.policies.term_days = 1_000_000;
            c
        }),
        ("orders.work_end_offset_days", {
            let mut c = GeneratorConfig::default();
            c.orders.work_end_offset_days = IntRange::new(3, i64::MAX);
            c
        }),
        ("epoch", GeneratorConfig { epoch: NaiveDate::MAX, ..GeneratorConfig::default() }),
    ];

    for (field, config) in cases {
        match config.validate() {
            Err(GenError::InvalidParameter { name, .. }) => assert_eq!(name, field),
            other => panic!("{field}: expected InvalidParameter, got {other:?}"),
        }
    }
}

#[test]
fn huge_day_offsets_fail_at_build_instead_of_panicking() {
    let mut config = GeneratorConfig::default_test();
    config.claims.incident_offset_days = IntRange::new(0, 1_000_000_000);
    assert!(matches!(
        Pipeline::build_with_config("offsets".into(), config),
        Err(GenError::InvalidParameter { .. })
    ));

    let mut at_limit = GeneratorConfig::default_test();
    at_limit.claims.incident_offset_days = IntRange::new(0, MAX_OFFSET_DAYS);
    at_limit.orders.work_end_offset_days = IntRange::new(3, MAX_OFFSET_DAYS);
    let outcome = Pipeline::build_with_config("offsets-ok".into(), at_limit)
        .unwrap()
        .generate()
        .unwrap();
    assert!(!outcome.dataset.claims.is_empty());
}
