//! Pipeline events: the audit trail of a generation run.
//!
//! Every stage reports what it generated and what the global caps
//! trimmed. The pipeline numbers events in emission order and hands
//! them to the store's event log.

use crate::types::RunId;
use serde::{Deserialize, Serialize};

/// Variants are appended over time, never removed or reordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PipelineEvent {
    RunInitialized {
        run_id: RunId,
        seed: u64,
    },
    StageCompleted {
        stage: String,
        generated: usize,
        kept: usize,
    },
    CapApplied {
        stage: String,
        cap: usize,
        generated: usize,
        dropped: usize,
    },
    IntegrityVerified {
        shops: usize,
        policies: usize,
        claims: usize,
        lines: usize,
    },
}

impl PipelineEvent {
    /// Stable string name for the event_type column in event_log.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::RunInitialized { .. }    => "run_initialized",
            Self::StageCompleted { .. }    => "stage_completed",
            Self::CapApplied { .. }        => "cap_applied",
            Self::IntegrityVerified { .. } => "integrity_verified",
        }
    }
}

/// One row of the persisted event log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventLogEntry {
    pub id:         Option<i64>,
    pub run_id:     RunId,
    pub seq:        u64,
    pub stage:      String,
    pub event_type: String,
    pub payload:    String,
}
