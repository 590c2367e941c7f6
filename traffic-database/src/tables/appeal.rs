use chrono::{Local, NaiveDate, NaiveDateTime};
use rusqlite::{OptionalExtension, Row, params};
use serde::Serialize;
use tracing::info;

use crate::database::Database;
use crate::error::{Result, ValidationError};

/// Shortest accepted appeal reason, after trimming.
pub const MIN_REASON_LEN: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Appeal {
    pub id: i64,
    pub date_filed: NaiveDate,
    pub status: String,
    pub reason: String,
    pub violation_id: i64,
    pub driver: String,
    pub violation_type: String,
    pub penalty_status: Option<String>,
}

/// A violation that has no appeal yet and whose penalty is unpaid or absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AppealCandidate {
    pub violation_id: i64,
    pub violation_type: String,
    pub date_time: NaiveDateTime,
    pub driver_id: i64,
    pub driver: String,
    pub penalty_amount: Option<f64>,
}

const SELECT_CANDIDATE: &str =
    "SELECT v.Violation_ID, v.Type, v.Date_Time, d.Driver_ID, d.Name, p.Amount
     FROM Violation v
     JOIN Vehicle ve ON v.Vehicle_ID = ve.Vehicle_ID
     JOIN Driver d ON ve.Driver_ID = d.Driver_ID
     LEFT JOIN Penalty p ON v.Violation_ID = p.Violation_ID
     WHERE v.Violation_ID NOT IN (SELECT Violation_ID FROM Appeal)
       AND (p.Status = 'Unpaid' OR p.Status IS NULL)";

fn row_to_candidate(row: &Row) -> rusqlite::Result<AppealCandidate> {
    Ok(AppealCandidate {
        violation_id: row.get(0)?,
        violation_type: row.get(1)?,
        date_time: row.get(2)?,
        driver_id: row.get(3)?,
        driver: row.get(4)?,
        penalty_amount: row.get(5)?,
    })
}

fn row_to_appeal(row: &Row) -> rusqlite::Result<Appeal> {
    Ok(Appeal {
        id: row.get(0)?,
        date_filed: row.get(1)?,
        status: row.get(2)?,
        reason: row.get(3)?,
        violation_id: row.get(4)?,
        driver: row.get(5)?,
        violation_type: row.get(6)?,
        penalty_status: row.get(7)?,
    })
}

impl Database {
    /// All appeals, most recently filed first.
    pub fn appeals(&self) -> Result<Vec<Appeal>> {
        let mut stmt = self.connection().prepare(
            "SELECT a.Appeal_ID, a.Datefiled, a.Status, a.Reason, a.Violation_ID,
                    d.Name, v.Type, p.Status
             FROM Appeal a
             JOIN Violation v ON a.Violation_ID = v.Violation_ID
             JOIN Driver d ON a.Driver_ID = d.Driver_ID
             LEFT JOIN Penalty p ON v.Violation_ID = p.Violation_ID
             ORDER BY a.Datefiled DESC, a.Appeal_ID DESC",
        )?;
        let appeals = stmt
            .query_map([], row_to_appeal)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(appeals)
    }

    pub fn appeal_candidates(&self) -> Result<Vec<AppealCandidate>> {
        let mut stmt = self
            .connection()
            .prepare(&format!("{SELECT_CANDIDATE} ORDER BY v.Violation_ID"))?;
        let candidates = stmt
            .query_map([], row_to_candidate)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(candidates)
    }

    /// File a pending appeal, dated today, on behalf of the vehicle's owner.
    ///
    /// Eligibility is read under the same write lock as the insert, so a
    /// violation cannot collect two appeals.
    pub fn file_appeal(&mut self, violation_id: i64, reason: &str) -> Result<i64> {
        let reason = reason.trim();
        if reason.chars().count() < MIN_REASON_LEN {
            return Err(ValidationError::ReasonTooShort { min: MIN_REASON_LEN }.into());
        }

        let (id, driver_id) = self.write_locked(|tx| {
            let candidate = tx
                .query_row(
                    &format!("{SELECT_CANDIDATE} AND v.Violation_ID = ?1"),
                    [violation_id],
                    row_to_candidate,
                )
                .optional()?
                .ok_or(ValidationError::NotAppealable(violation_id))?;

            tx.execute(
                "INSERT INTO Appeal (Datefiled, Status, Reason, Violation_ID, Driver_ID)
                 VALUES (?1, 'Pending', ?2, ?3, ?4)",
                params![
                    Local::now().date_naive(),
                    reason,
                    violation_id,
                    candidate.driver_id
                ],
            )?;
            Ok((tx.last_insert_rowid(), candidate.driver_id))
        })?;

        info!(
            "Filed appeal {} for violation {} by driver {}",
            id, violation_id, driver_id
        );
        Ok(id)
    }
}
