use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{Row, params};
use serde::Serialize;
use tracing::info;

use super::required;
use crate::database::Database;
use crate::error::{Result, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ViolationType {
    Speeding,
    #[serde(rename = "Signal Jump")]
    SignalJump,
    #[serde(rename = "Parking Violation")]
    ParkingViolation,
    #[serde(rename = "Drunk Driving")]
    DrunkDriving,
    #[serde(rename = "Underage Driving")]
    UnderageDriving,
    #[serde(rename = "Seatbelt Violation")]
    SeatbeltViolation,
    #[serde(rename = "Mobile Usage")]
    MobileUsage,
    #[serde(rename = "No Insurance")]
    NoInsurance,
}

impl ViolationType {
    pub const ALL: [ViolationType; 8] = [
        ViolationType::Speeding,
        ViolationType::SignalJump,
        ViolationType::ParkingViolation,
        ViolationType::DrunkDriving,
        ViolationType::UnderageDriving,
        ViolationType::SeatbeltViolation,
        ViolationType::MobileUsage,
        ViolationType::NoInsurance,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ViolationType::Speeding => "Speeding",
            ViolationType::SignalJump => "Signal Jump",
            ViolationType::ParkingViolation => "Parking Violation",
            ViolationType::DrunkDriving => "Drunk Driving",
            ViolationType::UnderageDriving => "Underage Driving",
            ViolationType::SeatbeltViolation => "Seatbelt Violation",
            ViolationType::MobileUsage => "Mobile Usage",
            ViolationType::NoInsurance => "No Insurance",
        }
    }
}

impl fmt::Display for ViolationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ViolationType {
    type Err = ValidationError;

    /// Accepts display names as well as dashed forms such as `signal-jump`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().replace(['-', '_'], " ");
        ViolationType::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(&wanted))
            .ok_or_else(|| ValidationError::UnknownValue {
                field: "violation type",
                value: s.to_string(),
            })
    }
}

/// A violation with its vehicle, driver, officer and penalty columns joined in.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Violation {
    pub id: i64,
    pub date_time: NaiveDateTime,
    pub violation_type: String,
    pub location: String,
    pub vehicle_id: i64,
    pub officer_id: i64,
    pub license_plate: String,
    pub driver: String,
    pub officer: String,
    pub penalty_amount: Option<f64>,
    pub penalty_status: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewViolation {
    pub date_time: NaiveDateTime,
    pub violation_type: ViolationType,
    pub location: String,
    pub vehicle_id: i64,
    pub officer_id: i64,
}

impl NewViolation {
    pub fn validated(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            location: required("location", &self.location)?,
            ..self.clone()
        })
    }
}

fn row_to_violation(row: &Row) -> rusqlite::Result<Violation> {
    Ok(Violation {
        id: row.get(0)?,
        date_time: row.get(1)?,
        violation_type: row.get(2)?,
        location: row.get(3)?,
        vehicle_id: row.get(4)?,
        officer_id: row.get(5)?,
        license_plate: row.get(6)?,
        driver: row.get(7)?,
        officer: row.get(8)?,
        penalty_amount: row.get(9)?,
        penalty_status: row.get(10)?,
    })
}

impl Database {
    /// All violations, newest first.
    pub fn violations(&self) -> Result<Vec<Violation>> {
        let mut stmt = self.connection().prepare(
            "SELECT v.Violation_ID, v.Date_Time, v.Type, v.Location, v.Vehicle_ID, v.Officer_ID,
                    ve.License_plate, d.Name, o.Name, p.Amount, p.Status
             FROM Violation v
             JOIN Vehicle ve ON v.Vehicle_ID = ve.Vehicle_ID
             JOIN Driver d ON ve.Driver_ID = d.Driver_ID
             JOIN Officer o ON v.Officer_ID = o.Officer_ID
             LEFT JOIN Penalty p ON v.Violation_ID = p.Violation_ID
             ORDER BY v.Date_Time DESC, v.Violation_ID DESC",
        )?;
        let violations = stmt
            .query_map([], row_to_violation)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(violations)
    }

    /// Insert a violation. The penalty is created by the database.
    pub fn record_violation(&self, violation: &NewViolation) -> Result<i64> {
        let violation = violation.validated()?;
        self.connection().execute(
            "INSERT INTO Violation (Date_Time, Type, Location, Vehicle_ID, Officer_ID)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                violation.date_time,
                violation.violation_type.as_str(),
                violation.location,
                violation.vehicle_id,
                violation.officer_id
            ],
        )?;
        let id = self.connection().last_insert_rowid();
        info!(
            "Recorded violation {} ({}) for vehicle {}",
            id, violation.violation_type, violation.vehicle_id
        );
        Ok(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn types_parse_loosely() {
        assert_eq!("signal-jump".parse::<ViolationType>(), Ok(ViolationType::SignalJump));
        assert_eq!("No Insurance".parse::<ViolationType>(), Ok(ViolationType::NoInsurance));
        assert!(matches!(
            "jaywalking".parse::<ViolationType>(),
            Err(ValidationError::UnknownValue { field: "violation type", .. })
        ));
    }

    #[test]
    fn location_is_required() {
        let violation = NewViolation {
            date_time: NaiveDateTime::default(),
            violation_type: ViolationType::Speeding,
            location: " ".into(),
            vehicle_id: 1,
            officer_id: 1,
        };
        assert_eq!(
            violation.validated(),
            Err(ValidationError::MissingField("location"))
        );
    }
}
