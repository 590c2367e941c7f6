use std::fmt;
use std::str::FromStr;

use chrono::{Local, NaiveDate};
use rusqlite::{Row, params};
use serde::Serialize;
use tracing::info;

use super::PenaltyStatus;
use super::penalty::find_penalty;
use crate::database::Database;
use crate::error::{Result, ValidationError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum PaymentMode {
    #[default]
    Cash,
    Card,
    Online,
    #[serde(rename = "UPI")]
    Upi,
}

impl PaymentMode {
    pub const ALL: [PaymentMode; 4] = [
        PaymentMode::Cash,
        PaymentMode::Card,
        PaymentMode::Online,
        PaymentMode::Upi,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            PaymentMode::Cash => "Cash",
            PaymentMode::Card => "Card",
            PaymentMode::Online => "Online",
            PaymentMode::Upi => "UPI",
        }
    }
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PaymentMode::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ValidationError::UnknownValue {
                field: "payment mode",
                value: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payment {
    pub id: i64,
    pub date: NaiveDate,
    pub amount: f64,
    pub mode: String,
    pub penalty_id: i64,
}

fn row_to_payment(row: &Row) -> rusqlite::Result<Payment> {
    Ok(Payment {
        id: row.get(0)?,
        date: row.get(1)?,
        amount: row.get(2)?,
        mode: row.get(3)?,
        penalty_id: row.get(4)?,
    })
}

impl Database {
    pub fn payments(&self) -> Result<Vec<Payment>> {
        let mut stmt = self.connection().prepare(
            "SELECT Payment_ID, Date, Amount, ModeofPayment, Penalty_ID
             FROM Payment ORDER BY Payment_ID DESC",
        )?;
        let payments = stmt
            .query_map([], row_to_payment)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(payments)
    }

    /// Pay an unpaid penalty in full, dated today. Returns the payment id.
    ///
    /// The status check and the insert hold the write lock together, so a
    /// penalty is paid at most once. Marking it paid is left to the database.
    pub fn pay_penalty(&mut self, penalty_id: i64, mode: PaymentMode) -> Result<i64> {
        let (id, amount) = self.write_locked(|tx| {
            let penalty =
                find_penalty(tx, penalty_id)?.ok_or(ValidationError::UnknownPenalty(penalty_id))?;
            if !penalty.is(PenaltyStatus::Unpaid) {
                return Err(ValidationError::PenaltyNotPayable {
                    id: penalty_id,
                    status: penalty.status,
                }
                .into());
            }

            tx.execute(
                "INSERT INTO Payment (Date, Amount, ModeofPayment, Penalty_ID)
                 VALUES (?1, ?2, ?3, ?4)",
                params![Local::now().date_naive(), penalty.amount, mode.as_str(), penalty_id],
            )?;
            Ok((tx.last_insert_rowid(), penalty.amount))
        })?;

        info!(
            "Recorded payment {} of {:.2} by {} for penalty {}",
            id, amount, mode, penalty_id
        );
        Ok(id)
    }
}
