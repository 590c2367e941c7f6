use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::{Connection, OptionalExtension, Row};
use serde::Serialize;

use crate::database::Database;
use crate::error::Result;

/// Penalty states this crate reads. Transitions between them happen in the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PenaltyStatus {
    Unpaid,
    Paid,
    Appealed,
}

impl PenaltyStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            PenaltyStatus::Unpaid => "Unpaid",
            PenaltyStatus::Paid => "Paid",
            PenaltyStatus::Appealed => "Appealed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Penalty {
    pub id: i64,
    pub amount: f64,
    pub status: String,
    pub due_date: Option<NaiveDate>,
    pub violation_id: i64,
    pub violation_type: String,
    pub violation_time: NaiveDateTime,
    pub driver: String,
    pub license_plate: String,
}

impl Penalty {
    pub fn is(&self, status: PenaltyStatus) -> bool {
        self.status == status.as_str()
    }
}

const SELECT_PENALTY: &str = "SELECT p.Penalty_ID, p.Amount, p.Status, p.Duedate, p.Violation_ID,
        v.Type, v.Date_Time, d.Name, ve.License_plate
     FROM Penalty p
     JOIN Violation v ON p.Violation_ID = v.Violation_ID
     JOIN Vehicle ve ON v.Vehicle_ID = ve.Vehicle_ID
     JOIN Driver d ON ve.Driver_ID = d.Driver_ID";

fn row_to_penalty(row: &Row) -> rusqlite::Result<Penalty> {
    Ok(Penalty {
        id: row.get(0)?,
        amount: row.get(1)?,
        status: row.get(2)?,
        due_date: row.get(3)?,
        violation_id: row.get(4)?,
        violation_type: row.get(5)?,
        violation_time: row.get(6)?,
        driver: row.get(7)?,
        license_plate: row.get(8)?,
    })
}

impl Database {
    /// All penalties, newest id first.
    pub fn penalties(&self) -> Result<Vec<Penalty>> {
        let mut stmt = self
            .connection()
            .prepare(&format!("{SELECT_PENALTY} ORDER BY p.Penalty_ID DESC"))?;
        let penalties = stmt
            .query_map([], row_to_penalty)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(penalties)
    }

    pub fn penalty(&self, id: i64) -> Result<Option<Penalty>> {
        Ok(find_penalty(self.connection(), id)?)
    }
}

pub(crate) fn find_penalty(conn: &Connection, id: i64) -> rusqlite::Result<Option<Penalty>> {
    conn.query_row(
        &format!("{SELECT_PENALTY} WHERE p.Penalty_ID = ?1"),
        [id],
        row_to_penalty,
    )
    .optional()
}
