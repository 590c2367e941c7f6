use std::fmt;
use std::str::FromStr;

use rusqlite::{OptionalExtension, Row, params};
use serde::Serialize;
use tracing::info;

use super::{optional, required};
use crate::database::Database;
use crate::error::{Result, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum OfficerRank {
    #[default]
    Inspector,
    #[serde(rename = "Sub-Inspector")]
    SubInspector,
    #[serde(rename = "Head Constable")]
    HeadConstable,
    Constable,
}

impl OfficerRank {
    pub const ALL: [OfficerRank; 4] = [
        OfficerRank::Inspector,
        OfficerRank::SubInspector,
        OfficerRank::HeadConstable,
        OfficerRank::Constable,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            OfficerRank::Inspector => "Inspector",
            OfficerRank::SubInspector => "Sub-Inspector",
            OfficerRank::HeadConstable => "Head Constable",
            OfficerRank::Constable => "Constable",
        }
    }
}

impl fmt::Display for OfficerRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OfficerRank {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        OfficerRank::ALL
            .into_iter()
            .find(|rank| rank.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::UnknownValue {
                field: "rank",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Officer {
    pub id: i64,
    pub name: String,
    /// Stored text; ranks outside [`OfficerRank`] are kept as-is
    pub rank: Option<String>,
    pub badge_no: String,
    pub contact_no: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewOfficer {
    pub name: String,
    pub rank: OfficerRank,
    pub badge_no: String,
    pub contact_no: Option<String>,
}

impl NewOfficer {
    pub fn validated(&self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: required("name", &self.name)?,
            rank: self.rank,
            badge_no: required("badge number", &self.badge_no)?,
            contact_no: optional(self.contact_no.as_deref()),
        })
    }
}

const SELECT_OFFICER: &str =
    "SELECT Officer_ID, Name, Officer_Rank, Badge_no, Contact_no FROM Officer";

fn row_to_officer(row: &Row) -> rusqlite::Result<Officer> {
    Ok(Officer {
        id: row.get(0)?,
        name: row.get(1)?,
        rank: row.get(2)?,
        badge_no: row.get(3)?,
        contact_no: row.get(4)?,
    })
}

impl Database {
    pub fn officers(&self) -> Result<Vec<Officer>> {
        let mut stmt = self
            .connection()
            .prepare(&format!("{SELECT_OFFICER} ORDER BY Officer_ID"))?;
        let officers = stmt
            .query_map([], row_to_officer)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(officers)
    }

    pub fn officer(&self, id: i64) -> Result<Option<Officer>> {
        let officer = self
            .connection()
            .query_row(
                &format!("{SELECT_OFFICER} WHERE Officer_ID = ?1"),
                [id],
                row_to_officer,
            )
            .optional()?;
        Ok(officer)
    }

    pub fn add_officer(&self, officer: &NewOfficer) -> Result<i64> {
        let officer = officer.validated()?;
        self.connection().execute(
            "INSERT INTO Officer (Name, Officer_Rank, Badge_no, Contact_no)
             VALUES (?1, ?2, ?3, ?4)",
            params![officer.name, officer.rank.as_str(), officer.badge_no, officer.contact_no],
        )?;
        let id = self.connection().last_insert_rowid();
        info!("Added officer {} ({})", id, officer.badge_no);
        Ok(id)
    }
}
