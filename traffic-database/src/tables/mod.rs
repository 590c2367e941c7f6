/*!
Typed rows and CRUD statements for each table
*/

pub mod appeal;
pub mod driver;
pub mod officer;
pub mod payment;
pub mod penalty;
pub mod vehicle;
pub mod violation;

pub use appeal::{Appeal, AppealCandidate};
pub use driver::{Driver, NewDriver};
pub use officer::{NewOfficer, Officer, OfficerRank};
pub use payment::{Payment, PaymentMode};
pub use penalty::{Penalty, PenaltyStatus};
pub use vehicle::{NewVehicle, Vehicle};
pub use violation::{NewViolation, Violation, ViolationType};

use crate::error::ValidationError;

/// Trimmed value of a required text field.
pub(crate) fn required(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ValidationError::MissingField(field));
    }
    Ok(value.to_string())
}

/// Blank optional text is stored as NULL.
pub(crate) fn optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}
