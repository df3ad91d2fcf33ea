//! Output side of the pipeline: anything that can take the four
//! finished tables.
//!
//! The core never assumes a persistence technology. DatasetStore
//! (SQLite) and CsvSink (one file per table) are the two sinks shipped
//! with the crate.

use crate::{
    claim_generator::Claim,
    dataset::Dataset,
    error::GenResult,
    policy_generator::Policy,
    repair_order_generator::RepairOrderLine,
    shop_generator::RepairShop,
};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub trait TableSink {
    fn write_repair_shops(&self, run_id: &str, rows: &[RepairShop]) -> GenResult<()>;
    fn write_policies(&self, run_id: &str, rows: &[Policy]) -> GenResult<()>;
    fn write_claims(&self, run_id: &str, rows: &[Claim]) -> GenResult<()>;
    fn write_repair_orders(&self, run_id: &str, rows: &[RepairOrderLine]) -> GenResult<()>;
}

/// Write all four tables in dependency order.
pub fn write_dataset(sink: &dyn TableSink, run_id: &str, dataset: &Dataset) -> GenResult<()> {
    sink.write_repair_shops(run_id, &dataset.repair_shops)?;
    sink.write_policies(run_id, &dataset.policies)?;
    sink.write_claims(run_id, &dataset.claims)?;
    sink.write_repair_orders(run_id, &dataset.repair_orders)?;
    Ok(())
}

pub const REPAIR_SHOPS_CSV: &str = "repair_shops.csv";
pub const POLICIES_CSV: &str = "policies.csv";
pub const CLAIMS_CSV: &str = "claims.csv";
pub const REPAIR_ORDERS_CSV: &str = "repair_orders.csv";

/// Writes each table to `<dir>/<table>.csv` with a header row.
pub struct CsvSink {
    dir: PathBuf,
}

impl CsvSink {
    /// Creates `dir` if it does not exist yet.
    pub fn new(dir: impl AsRef<Path>) -> GenResult<Self> {
        std::fs::create_dir_all(dir.as_ref())?;
        Ok(Self {
            dir: dir.as_ref().to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn write_rows<T: Serialize>(&self, file_name: &str, rows: &[T]) -> GenResult<()> {
        let path = self.dir.join(file_name);
        let mut writer = csv::Writer::from_path(&path)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;
        log::debug!("csv: wrote {} rows to {}", rows.len(), path.display());
        Ok(())
    }
}

impl TableSink for CsvSink {
    fn write_repair_shops(&self, _run_id: &str, rows: &[RepairShop]) -> GenResult<()> {
        self.write_rows(REPAIR_SHOPS_CSV, rows)
    }

    fn write_policies(&self, _run_id: &str, rows: &[Policy]) -> GenResult<()> {
        self.write_rows(POLICIES_CSV, rows)
    }

    fn write_claims(&self, _run_id: &str, rows: &[Claim]) -> GenResult<()> {
        self.write_rows(CLAIMS_CSV, rows)
    }

    fn write_repair_orders(&self, _run_id: &str, rows: &[RepairOrderLine]) -> GenResult<()> {
        self.write_rows(REPAIR_ORDERS_CSV, rows)
    }
}
