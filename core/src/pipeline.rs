//! The generation pipeline.
//!
//! EXECUTION ORDER (fixed, documented, never reordered):
//!   1. RepairShop stage
//!   2. Policy stage
//!   3. Claim stage          (reads shops + policies)
//!   4. RepairOrder stage    (reads claims + shops)
//!
//! RULES:
//!   - Stages run once each, in registration order.
//!   - A stage fully materializes its table before the next one starts.
//!   - All randomness flows through the RngBank.
//!   - Parameters are validated before any stage runs; the dataset is
//!     checked for referential integrity before anything is written.

use crate::{
    claim_generator::ClaimGenerator,
    config::GeneratorConfig,
    dataset::Dataset,
    error::{GenError, GenResult},
    event::{EventLogEntry, PipelineEvent},
    policy_generator::PolicyGenerator,
    repair_order_generator::RepairOrderGenerator,
    rng::RngBank,
    shop_generator::RepairShopGenerator,
    sink::{write_dataset, TableSink},
    stage::GeneratorStage,
    store::DatasetStore,
    types::RunId,
};

/// A generated dataset together with the events that describe it.
#[derive(Debug, Clone)]
pub struct GenerationOutcome {
    pub dataset: Dataset,
    /// (stage name, event) in emission order.
    pub events:  Vec<(String, PipelineEvent)>,
}

pub struct Pipeline {
    pub run_id: RunId,
    pub config: GeneratorConfig,
    pub store:  DatasetStore,
    rng_bank:   RngBank,
    stages:     Vec<Box<dyn GeneratorStage>>,
}

impl Pipeline {
    pub fn new(run_id: RunId, config: GeneratorConfig, store: DatasetStore) -> Self {
        Self {
            rng_bank: RngBank::new(config.seed),
            stages: Vec::new(),
            run_id,
            config,
            store,
        }
    }

    /// Build a fully wired pipeline with all stages registered.
    /// Fails fast on invalid parameters.
    pub fn build(run_id: RunId, config: GeneratorConfig, store: DatasetStore) -> GenResult<Self> {
        config.validate()?;
        let mut pipeline = Pipeline::new(run_id, config, store);

        // EXECUTION ORDER: fixed, documented, never reordered.
        let shops = RepairShopGenerator::new(&pipeline.config);
        let policies = PolicyGenerator::new(&pipeline.config);
        let claims = ClaimGenerator::new(&pipeline.config)?;
        let orders = RepairOrderGenerator::new(&pipeline.config);
        pipeline.register(Box::new(shops));
        pipeline.register(Box::new(policies));
        pipeline.register(Box::new(claims));
        pipeline.register(Box::new(orders));
        Ok(pipeline)
    }

    /// Pipeline over a migrated in-memory store with the small test config.
    pub fn build_test(run_id: RunId, seed: u64) -> GenResult<Self> {
        Self::build_with_config(run_id, GeneratorConfig::default_test().with_seed(seed))
    }

    /// Pipeline over a migrated in-memory store with the given config.
    pub fn build_with_config(run_id: RunId, config: GeneratorConfig) -> GenResult<Self> {
        let store = DatasetStore::in_memory()?;
        store.migrate()?;
        Self::build(run_id, config, store)
    }

    /// Register a stage. Call in the documented execution order.
    pub fn register(&mut self, stage: Box<dyn GeneratorStage>) {
        self.stages.push(stage);
    }

    pub fn stage_names(&self) -> Vec<&'static str> {
        self.stages.iter().map(|s| s.name()).collect()
    }

    /// Run every stage in memory. No I/O.
    pub fn generate(&self) -> GenResult<GenerationOutcome> {
        self.config.validate()?;

        let mut events = vec![(
            "pipeline".to_string(),
            PipelineEvent::RunInitialized {
                run_id: self.run_id.clone(),
                seed:   self.rng_bank.master_seed(),
            },
        )];

        let mut dataset = Dataset::default();
        for stage in &self.stages {
            log::debug!("pipeline: running stage {} (slot {:?})", stage.name(), stage.slot());
            for event in stage.run(&mut dataset, &self.rng_bank)? {
                events.push((stage.name().to_string(), event));
            }
        }

        dataset.verify_integrity()?;
        events.push((
            "pipeline".to_string(),
            PipelineEvent::IntegrityVerified {
                shops:    dataset.repair_shops.len(),
                policies: dataset.policies.len(),
                claims:   dataset.claims.len(),
                lines:    dataset.repair_orders.len(),
            },
        ));

        Ok(GenerationOutcome { dataset, events })
    }

    /// Generate, then persist the run row, event log, dataset and
    /// summary in one transaction. Nothing is written unless generation
    /// succeeded, and a failed write leaves the store untouched.
    pub fn run(&mut self) -> GenResult<Dataset> {
        if self.store.run_exists(&self.run_id)? {
            return Err(GenError::invalid(
                "run_id",
                format!("run {} already exists in the store", self.run_id),
            ));
        }
        let outcome = self.generate()?;

        let entries = outcome
            .events
            .iter()
            .enumerate()
            .map(|(seq, (stage, event))| -> GenResult<EventLogEntry> {
                Ok(EventLogEntry {
                    id:         None,
                    run_id:     self.run_id.clone(),
                    seq:        seq as u64,
                    stage:      stage.clone(),
                    event_type: event.type_name().to_string(),
                    payload:    serde_json::to_string(event)?,
                })
            })
            .collect::<GenResult<Vec<_>>>()?;

        let summary = outcome.dataset.summary(&self.run_id, self.config.seed);
        self.store.write_run(
            &self.run_id,
            self.config.seed,
            env!("CARGO_PKG_VERSION"),
            &entries,
            &outcome.dataset,
            &summary,
        )?;
        log::info!(
            "pipeline: run {} wrote {} shops, {} policies, {} claims, {} lines",
            self.run_id,
            summary.repair_shops,
            summary.policies,
            summary.claims,
            summary.repair_orders
        );
        Ok(outcome.dataset)
    }

    /// Write a finished dataset to any other sink (CSV export, etc.).
    pub fn export(&self, dataset: &Dataset, sink: &dyn TableSink) -> GenResult<()> {
        write_dataset(sink, &self.run_id, dataset)
    }

    pub fn store_events(&self) -> GenResult<Vec<EventLogEntry>> {
        self.store.events_for_run(&self.run_id)
    }
}
