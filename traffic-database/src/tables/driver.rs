use rusqlite::{OptionalExtension, Row, params};
use serde::Serialize;
use tracing::info;

use super::{optional, required};
use crate::database::Database;
use crate::error::{Result, ValidationError};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Driver {
    pub id: i64,
    pub name: String,
    pub address: Option<String>,
    pub contact_no: String,
    pub license_no: String,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewDriver {
    pub name: String,
    pub address: Option<String>,
    pub contact_no: String,
    pub license_no: String,
}

impl NewDriver {
    /// Trimmed copy with the name, contact and license checked.
    pub fn validated(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: required("name", &self.name)?,
            address: optional(self.address.as_deref()),
            contact_no: required("contact number", &self.contact_no)?,
            license_no: required("license number", &self.license_no)?,
        })
    }
}

const SELECT_DRIVER: &str = "SELECT Driver_ID, Name, Address, Contact_no, License_no FROM Driver";

fn row_to_driver(row: &Row) -> rusqlite::Result<Driver> {
    Ok(Driver {
        id: row.get(0)?,
        name: row.get(1)?,
        address: row.get(2)?,
        contact_no: row.get(3)?,
        license_no: row.get(4)?,
    })
}

impl Database {
    pub fn drivers(&self) -> Result<Vec<Driver>> {
        let mut stmt = self
            .connection()
            .prepare(&format!("{SELECT_DRIVER} ORDER BY Driver_ID"))?;
        let drivers = stmt
            .query_map([], row_to_driver)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(drivers)
    }

    pub fn driver(&self, id: i64) -> Result<Option<Driver>> {
        let driver = self
            .connection()
            .query_row(
                &format!("{SELECT_DRIVER} WHERE Driver_ID = ?1"),
                [id],
                row_to_driver,
            )
            .optional()?;
        Ok(driver)
    }

    /// Insert a driver and return its id.
    pub fn add_driver(&self, driver: &NewDriver) -> Result<i64> {
        let driver = driver.validated()?;
        self.connection().execute(
            "INSERT INTO Driver (Name, Address, Contact_no, License_no) VALUES (?1, ?2, ?3, ?4)",
            params![driver.name, driver.address, driver.contact_no, driver.license_no],
        )?;
        let id = self.connection().last_insert_rowid();
        info!("Added driver {} ({})", id, driver.name);
        Ok(id)
    }

    /// Returns false when no driver has that id.
    pub fn update_driver(&self, id: i64, driver: &NewDriver) -> Result<bool> {
        let driver = driver.validated()?;
        let updated = self.connection().execute(
            "UPDATE Driver SET Name = ?1, Address = ?2, Contact_no = ?3, License_no = ?4
             WHERE Driver_ID = ?5",
            params![driver.name, driver.address, driver.contact_no, driver.license_no, id],
        )?;
        if updated > 0 {
            info!("Updated driver {}", id);
        }
        Ok(updated > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_required_fields_are_rejected() {
        let driver = NewDriver {
            name: "  ".into(),
            contact_no: "555".into(),
            license_no: "DL-1".into(),
            ..Default::default()
        };
        assert_eq!(
            driver.validated(),
            Err(ValidationError::MissingField("name"))
        );
    }

    #[test]
    fn blank_address_becomes_none() {
        let driver = NewDriver {
            name: " Asha ".into(),
            address: Some("   ".into()),
            contact_no: "555".into(),
            license_no: "DL-1".into(),
        };
        let driver = driver.validated().unwrap();
        assert_eq!(driver.name, "Asha");
        assert_eq!(driver.address, None);
    }
}
