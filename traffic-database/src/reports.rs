/*!
Reports expressed as plain SQL over the base tables.

Reports backed by stored procedures, views or functions live in the database
and are not reproduced here.
*/

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::debug;

use crate::database::Database;
use crate::error::Result;

/// One violation with everything a reviewer needs alongside it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ViolationDetail {
    pub violation_id: i64,
    pub date_time: NaiveDateTime,
    pub violation_type: String,
    pub location: String,
    pub driver_name: String,
    pub license_no: String,
    pub license_plate: String,
    pub model: String,
    pub officer_name: String,
    pub fine_amount: Option<f64>,
    pub payment_status: Option<String>,
}

/// Revenue figures over violations that carry a penalty.
///
/// Aggregates over an empty set are `None`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RevenueStats {
    pub total_drivers: i64,
    pub total_violations: i64,
    pub total_revenue: Option<f64>,
    pub average_fine: Option<f64>,
    pub highest_fine: Option<f64>,
    pub lowest_fine: Option<f64>,
    pub revenue_collected: Option<f64>,
    pub revenue_pending: Option<f64>,
}

impl Database {
    pub fn violation_details(&self) -> Result<Vec<ViolationDetail>> {
        debug!("Running violation detail report");
        let mut stmt = self.connection().prepare(
            "SELECT v.Violation_ID, v.Date_Time, v.Type, v.Location,
                    d.Name, d.License_no, ve.License_plate, ve.Model,
                    o.Name, p.Amount, p.Status
             FROM Violation v
             JOIN Vehicle ve ON v.Vehicle_ID = ve.Vehicle_ID
             JOIN Driver d ON ve.Driver_ID = d.Driver_ID
             JOIN Officer o ON v.Officer_ID = o.Officer_ID
             LEFT JOIN Penalty p ON v.Violation_ID = p.Violation_ID
             ORDER BY v.Date_Time DESC, v.Violation_ID DESC",
        )?;
        let details = stmt
            .query_map([], |row| {
                Ok(ViolationDetail {
                    violation_id: row.get(0)?,
                    date_time: row.get(1)?,
                    violation_type: row.get(2)?,
                    location: row.get(3)?,
                    driver_name: row.get(4)?,
                    license_no: row.get(5)?,
                    license_plate: row.get(6)?,
                    model: row.get(7)?,
                    officer_name: row.get(8)?,
                    fine_amount: row.get(9)?,
                    payment_status: row.get(10)?,
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(details)
    }

    pub fn revenue_stats(&self) -> Result<RevenueStats> {
        debug!("Running revenue report");
        let stats = self.connection().query_row(
            "SELECT
                COUNT(DISTINCT d.Driver_ID),
                COUNT(v.Violation_ID),
                SUM(p.Amount),
                AVG(p.Amount),
                MAX(p.Amount),
                MIN(p.Amount),
                SUM(CASE WHEN p.Status = 'Paid' THEN p.Amount ELSE 0 END),
                SUM(CASE WHEN p.Status = 'Unpaid' THEN p.Amount ELSE 0 END)
             FROM Driver d
             JOIN Vehicle ve ON d.Driver_ID = ve.Driver_ID
             JOIN Violation v ON ve.Vehicle_ID = v.Vehicle_ID
             JOIN Penalty p ON v.Violation_ID = p.Violation_ID",
            [],
            |row| {
                Ok(RevenueStats {
                    total_drivers: row.get(0)?,
                    total_violations: row.get(1)?,
                    total_revenue: row.get(2)?,
                    average_fine: row.get(3)?,
                    highest_fine: row.get(4)?,
                    lowest_fine: row.get(5)?,
                    revenue_collected: row.get(6)?,
                    revenue_pending: row.get(7)?,
                })
            },
        )?;
        Ok(stats)
    }
}
