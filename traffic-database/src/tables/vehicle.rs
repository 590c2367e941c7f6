use chrono::{Datelike, Local};
use rusqlite::{OptionalExtension, Row, params};
use serde::Serialize;
use tracing::info;

use super::{optional, required};
use crate::database::Database;
use crate::error::{Result, ValidationError};

/// Oldest registration year accepted.
pub const MIN_REGISTRATION_YEAR: i32 = 1990;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Vehicle {
    pub id: i64,
    pub registration_year: i32,
    pub model: String,
    pub color: Option<String>,
    pub license_plate: String,
    pub driver_id: i64,
    /// Owner name, absent if the owner row is missing
    pub owner: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewVehicle {
    pub registration_year: i32,
    pub model: String,
    pub color: Option<String>,
    pub license_plate: String,
    pub driver_id: i64,
}

impl NewVehicle {
    pub fn validated(&self) -> Result<Self, ValidationError> {
        let max = Local::now().year();
        if !(MIN_REGISTRATION_YEAR..=max).contains(&self.registration_year) {
            return Err(ValidationError::YearOutOfRange {
                year: self.registration_year,
                min: MIN_REGISTRATION_YEAR,
                max,
            });
        }
        Ok(Self {
            registration_year: self.registration_year,
            model: required("model", &self.model)?,
            color: optional(self.color.as_deref()),
            license_plate: required("license plate", &self.license_plate)?,
            driver_id: self.driver_id,
        })
    }
}

const SELECT_VEHICLE: &str = "SELECT v.Vehicle_ID, v.Registration_year, v.Model, v.Color,
        v.License_plate, v.Driver_ID, d.Name
     FROM Vehicle v
     LEFT JOIN Driver d ON v.Driver_ID = d.Driver_ID";

fn row_to_vehicle(row: &Row) -> rusqlite::Result<Vehicle> {
    Ok(Vehicle {
        id: row.get(0)?,
        registration_year: row.get(1)?,
        model: row.get(2)?,
        color: row.get(3)?,
        license_plate: row.get(4)?,
        driver_id: row.get(5)?,
        owner: row.get(6)?,
    })
}

impl Database {
    pub fn vehicles(&self) -> Result<Vec<Vehicle>> {
        let mut stmt = self
            .connection()
            .prepare(&format!("{SELECT_VEHICLE} ORDER BY v.Vehicle_ID"))?;
        let vehicles = stmt
            .query_map([], row_to_vehicle)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(vehicles)
    }

    pub fn vehicle(&self, id: i64) -> Result<Option<Vehicle>> {
        let vehicle = self
            .connection()
            .query_row(
                &format!("{SELECT_VEHICLE} WHERE v.Vehicle_ID = ?1"),
                [id],
                row_to_vehicle,
            )
            .optional()?;
        Ok(vehicle)
    }

    pub fn add_vehicle(&self, vehicle: &NewVehicle) -> Result<i64> {
        let vehicle = vehicle.validated()?;
        self.connection().execute(
            "INSERT INTO Vehicle (Registration_year, Model, Color, License_plate, Driver_ID)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                vehicle.registration_year,
                vehicle.model,
                vehicle.color,
                vehicle.license_plate,
                vehicle.driver_id
            ],
        )?;
        let id = self.connection().last_insert_rowid();
        info!("Added vehicle {} ({})", id, vehicle.license_plate);
        Ok(id)
    }

    pub fn update_vehicle(&self, id: i64, vehicle: &NewVehicle) -> Result<bool> {
        let vehicle = vehicle.validated()?;
        let updated = self.connection().execute(
            "UPDATE Vehicle SET Registration_year = ?1, Model = ?2, Color = ?3,
                 License_plate = ?4, Driver_ID = ?5
             WHERE Vehicle_ID = ?6",
            params![
                vehicle.registration_year,
                vehicle.model,
                vehicle.color,
                vehicle.license_plate,
                vehicle.driver_id,
                id
            ],
        )?;
        if updated > 0 {
            info!("Updated vehicle {}", id);
        }
        Ok(updated > 0)
    }
}
