//! Generator stage trait.
//!
//! RULE: Every generator implements GeneratorStage.
//! The pipeline calls run() on each registered stage exactly once,
//! in registration order. A stage reads only the tables produced by
//! earlier stages and writes only its own table.

use crate::{
    dataset::Dataset,
    error::GenResult,
    event::PipelineEvent,
    rng::{RngBank, StageSlot},
};

/// The contract every generator stage must fulfill.
pub trait GeneratorStage {
    /// Unique stable name for this stage.
    fn name(&self) -> &'static str;

    /// RNG slot this stage draws its entity streams from.
    fn slot(&self) -> StageSlot;

    /// Materialize this stage's table into `dataset`.
    ///
    /// - `dataset`: tables from earlier stages, plus this stage's slot to fill
    /// - `rng`:     stream factory for per-entity draws
    ///
    /// Returns the events describing what was generated and trimmed.
    fn run(&self, dataset: &mut Dataset, rng: &RngBank) -> GenResult<Vec<PipelineEvent>>;
}
