//! claimgen-runner: headless dataset generator.
//!
//! Usage:
//!   claimgen-runner --seed 12345 --db claims.db
//!   claimgen-runner --config data/generator.json --csv-dir out/
//!   claimgen-runner --seed 7 --run-id demo --db claims.db --csv-dir out/

use anyhow::Result;
use claimgen_core::{
    config::GeneratorConfig,
    dataset::DatasetSummary,
    pipeline::Pipeline,
    sink::CsvSink,
    store::{DatasetStore, Table},
};
use std::env;

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let config_path = flag_value(&args, "--config");
    let db = flag_value(&args, "--db").unwrap_or(":memory:");
    let csv_dir = flag_value(&args, "--csv-dir");

    let mut config = match config_path {
        Some(path) => GeneratorConfig::load(path)?,
        None => GeneratorConfig::default(),
    };
    config.seed = parse_arg(&args, "--seed", config.seed);
    let run_id = flag_value(&args, "--run-id")
        .map(str::to_string)
        .unwrap_or_else(|| format!("run-{}-{}", config.seed, unix_seconds()));

    println!("claimgen: synthetic car-insurance dataset");
    println!("  run_id:    {run_id}");
    println!("  seed:      {}", config.seed);
    println!("  config:    {}", config_path.unwrap_or("(defaults)"));
    println!("  db:        {db}");
    println!("  csv_dir:   {}", csv_dir.unwrap_or("(none)"));
    println!();

    let store = DatasetStore::open(db)?;
    store.migrate()?;

    let mut pipeline = Pipeline::build(run_id.clone(), config, store)?;
    let dataset = pipeline.run()?;

    if let Some(dir) = csv_dir {
        let sink = CsvSink::new(dir)?;
        pipeline.export(&dataset, &sink)?;
        log::info!("csv export written to {}", sink.dir().display());
    }

    let summary = dataset.summary(&run_id, pipeline.config.seed);
    print_summary(&pipeline.store, &summary)?;
    if args.iter().any(|a| a == "--json") {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    }
    Ok(())
}

fn print_summary(store: &DatasetStore, s: &DatasetSummary) -> Result<()> {
    let orphans = store.orphan_claim_count(&s.run_id)?;
    let denied_lines = store.denied_claim_line_count(&s.run_id)?;

    println!("=== RUN SUMMARY ===");
    println!("  repair shops:   {}", store.row_count(Table::RepairShop, &s.run_id)?);
    println!("  policies:       {}", store.row_count(Table::Policy, &s.run_id)?);
    println!("  claims:         {}", store.row_count(Table::Claim, &s.run_id)?);
    println!("  order lines:    {}", store.row_count(Table::RepairOrderLine, &s.run_id)?);
    println!();
    println!("=== AMOUNTS (JPY) ===");
    println!("  premium:        {}", s.total_premium);
    println!("  approved:       {}", s.total_approved);
    println!("  paid:           {}", s.total_paid);
    println!("  reserve:        {}", s.total_reserve);
    println!("  repair lines:   {}", s.total_line_amount);
    println!();
    println!("=== CHECKS ===");
    println!("  orphan claims:       {orphans}");
    println!("  lines on denied:     {denied_lines}");
    Ok(())
}

fn flag_value<'a>(args: &'a [String], flag: &str) -> Option<&'a str> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].as_str())
}

fn parse_arg<T: std::str::FromStr + Copy>(args: &[String], flag: &str, default: T) -> T {
    args.windows(2)
        .find(|w| w[0] == flag)
        .and_then(|w| w[1].parse().ok())
        .unwrap_or(default)
}

fn unix_seconds() -> u64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
