//! Row writers and reconciliation queries for the generated tables.

use super::{DatasetStore, Table};
use crate::{
    claim_generator::Claim,
    error::GenResult,
    policy_generator::Policy,
    repair_order_generator::RepairOrderLine,
    shop_generator::RepairShop,
    sink::TableSink,
    types::{EntityId, Yen},
};
use rusqlite::params;

impl TableSink for DatasetStore {
    fn write_repair_shops(&self, run_id: &str, rows: &[RepairShop]) -> GenResult<()> {
        let mut stmt = self.conn.prepare(
            "INSERT INTO repair_shop (
                run_id, shop_id, name, prefecture, city, certification, partner_tier,
                hourly_labor_rate, monthly_capacity, rating, sla_target_days
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )?;
        for s in rows {
            stmt.execute(params![
                run_id,
                s.shop_id as i64,
                &s.name,
                &s.prefecture,
                &s.city,
                s.certification.as_str(),
                s.partner_tier.as_str(),
                s.hourly_labor_rate,
                s.monthly_capacity,
                s.rating,
                s.sla_target_days,
            ])?;
        }
        Ok(())
    }

    fn write_policies(&self, run_id: &str, rows: &[Policy]) -> GenResult<()> {
        let mut stmt = self.conn.prepare(
            "INSERT INTO policy (
                run_id, policy_id, customer_id, start_date, end_date, vehicle_make,
                vehicle_model, vehicle_year, vehicle_age_band, vehicle_use, driver_age,
                license_years, ncb_years, prior_claims_3y, registered_pref,
                deductible_collision, deductible_comprehensive, region_factor, age_factor,
                vehicle_factor, use_factor, claim_history_factor, ncb_discount,
                annual_premium, status
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                      ?16, ?17, ?18, ?19, ?20, ?21, ?22, ?23, ?24, ?25)",
        )?;
        for p in rows {
            stmt.execute(params![
                run_id,
                p.policy_id as i64,
                p.customer_id as i64,
                p.start_date.to_string(),
                p.end_date.to_string(),
                &p.vehicle_make,
                &p.vehicle_model,
                p.vehicle_year,
                p.vehicle_age_band.as_str(),
                p.vehicle_use.as_str(),
                p.driver_age,
                p.license_years,
                p.ncb_years,
                p.prior_claims_3y,
                &p.registered_pref,
                p.deductible_collision,
                p.deductible_comprehensive,
                p.region_factor,
                p.age_factor,
                p.vehicle_factor,
                p.use_factor,
                p.claim_history_factor,
                p.ncb_discount,
                p.annual_premium,
                p.status.as_str(),
            ])?;
        }
        Ok(())
    }

    fn write_claims(&self, run_id: &str, rows: &[Claim]) -> GenResult<()> {
        let mut stmt = self.conn.prepare(
            "INSERT INTO claim (
                run_id, claim_id, policy_id, incident_date, reported_date, assessed_date,
                target_completion_date, incident_pref, loss_cause, severity, estimate_cost,
                deductible_applied, approved_cost, status, paid_to_date, outstanding_reserve,
                fraud_score, towing_required, shop_id
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15,
                      ?16, ?17, ?18, ?19)",
        )?;
        for c in rows {
            stmt.execute(params![
                run_id,
                c.claim_id as i64,
                c.policy_id as i64,
                c.incident_date.to_string(),
                c.reported_date.to_string(),
                c.assessed_date.to_string(),
                c.target_completion_date.to_string(),
                &c.incident_pref,
                c.loss_cause.as_str(),
                c.severity.as_str(),
                c.estimate_cost,
                c.deductible_applied,
                c.approved_cost,
                c.status.as_str(),
                c.paid_to_date,
                c.outstanding_reserve,
                c.fraud_score,
                if c.towing_required { 1 } else { 0 },
                c.shop_id as i64,
            ])?;
        }
        Ok(())
    }

    fn write_repair_orders(&self, run_id: &str, rows: &[RepairOrderLine]) -> GenResult<()> {
        let mut stmt = self.conn.prepare(
            "INSERT INTO repair_order_line (
                run_id, line_id, claim_id, shop_id, line_no, parts_cost, labor_hours,
                labor_rate, labor_cost, subtotal, tax, line_total, work_start_date,
                work_end_date
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14)",
        )?;
        for l in rows {
            stmt.execute(params![
                run_id,
                l.line_id as i64,
                l.claim_id as i64,
                l.shop_id as i64,
                l.line_no,
                l.parts_cost,
                l.labor_hours,
                l.labor_rate,
                l.labor_cost,
                l.subtotal,
                l.tax,
                l.line_total,
                l.work_start_date.to_string(),
                l.work_end_date.to_string(),
            ])?;
        }
        Ok(())
    }
}

impl DatasetStore {
    pub fn row_count(&self, table: Table, run_id: &str) -> GenResult<i64> {
        let sql = format!(
            "SELECT COUNT(*) FROM {} WHERE run_id = ?1",
            table.table_name()
        );
        Ok(self.conn.query_row(&sql, params![run_id], |row| row.get(0))?)
    }

    /// (policy_id, claim count) for every policy with at least one claim.
    pub fn claims_per_policy(&self, run_id: &str) -> GenResult<Vec<(EntityId, i64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT policy_id, COUNT(*) FROM claim
             WHERE run_id = ?1 GROUP BY policy_id ORDER BY policy_id",
        )?;
        let rows = stmt.query_map(params![run_id], |row| {
            Ok((row.get::<_, i64>(0)? as EntityId, row.get(1)?))
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// (claim_id, sum of line totals, line count) per claim with lines.
    pub fn line_totals_by_claim(&self, run_id: &str) -> GenResult<Vec<(EntityId, Yen, i64)>> {
        let mut stmt = self.conn.prepare(
            "SELECT claim_id, SUM(line_total), COUNT(*) FROM repair_order_line
             WHERE run_id = ?1 GROUP BY claim_id ORDER BY claim_id",
        )?;
        let rows = stmt.query_map(params![run_id], |row| {
            Ok((row.get::<_, i64>(0)? as EntityId, row.get(1)?, row.get(2)?))
        })?;
        rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
    }

    /// Claims whose shop is not in the run's repair_shop table.
    pub fn orphan_claim_count(&self, run_id: &str) -> GenResult<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM claim c
             LEFT JOIN repair_shop s ON s.run_id = c.run_id AND s.shop_id = c.shop_id
             WHERE c.run_id = ?1 AND s.shop_id IS NULL",
            params![run_id],
            |row| row.get(0),
        )?)
    }

    /// Lines attached to Denied claims. Always zero for a generated run.
    pub fn denied_claim_line_count(&self, run_id: &str) -> GenResult<i64> {
        Ok(self.conn.query_row(
            "SELECT COUNT(*) FROM repair_order_line l
             JOIN claim c ON c.run_id = l.run_id AND c.claim_id = l.claim_id
             WHERE l.run_id = ?1 AND c.status = 'Denied'",
            params![run_id],
            |row| row.get(0),
        )?)
    }

    pub fn total_premium(&self, run_id: &str) -> GenResult<Yen> {
        Ok(self.conn.query_row(
            "SELECT COALESCE(SUM(annual_premium), 0) FROM policy WHERE run_id = ?1",
            params![run_id],
            |row| row.get(0),
        )?)
    }
}
