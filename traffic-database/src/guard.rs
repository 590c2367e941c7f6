/*!
Referential dependency checks run before a driver, vehicle or officer is deleted.

Vehicles cascade with their owner at the storage layer, violations never
cascade. Deleting a row that a violation still points at would either fail
in the store or orphan the violation, so deletion is refused while any
violation chain exists.
*/

use std::fmt;

use rusqlite::Connection;
use serde::Serialize;
use tracing::debug;

use crate::entity::EntityKind;
use crate::error::DataAccessError;

/// Counts of violation rows referencing a parent entity.
pub trait DependencySource {
    /// Violations on any vehicle owned by the driver.
    fn count_violations_for_vehicle_owner(&self, driver_id: i64) -> Result<i64, DataAccessError>;

    fn count_violations_for_vehicle(&self, vehicle_id: i64) -> Result<i64, DataAccessError>;

    /// Violations recorded by the officer.
    fn count_violations_for_officer(&self, officer_id: i64) -> Result<i64, DataAccessError>;
}

impl DependencySource for Connection {
    fn count_violations_for_vehicle_owner(&self, driver_id: i64) -> Result<i64, DataAccessError> {
        let count = self.query_row(
            "SELECT COUNT(*) FROM Violation v
             JOIN Vehicle ve ON v.Vehicle_ID = ve.Vehicle_ID
             WHERE ve.Driver_ID = ?1",
            [driver_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn count_violations_for_vehicle(&self, vehicle_id: i64) -> Result<i64, DataAccessError> {
        let count = self.query_row(
            "SELECT COUNT(*) FROM Violation WHERE Vehicle_ID = ?1",
            [vehicle_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn count_violations_for_officer(&self, officer_id: i64) -> Result<i64, DataAccessError> {
        let count = self.query_row(
            "SELECT COUNT(*) FROM Violation WHERE Officer_ID = ?1",
            [officer_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

/// Reasons deleting `kind`/`id` would orphan a violation. Empty means nothing blocks it.
///
/// Kinds without a rule return an empty list. That is "nothing to check",
/// not a promise that the delete will succeed.
pub fn check<S>(source: &S, kind: EntityKind, id: i64) -> Result<Vec<String>, DataAccessError>
where
    S: DependencySource + ?Sized,
{
    let reason = match kind {
        EntityKind::Driver => {
            let count = source.count_violations_for_vehicle_owner(id)?;
            (count > 0).then(|| format!("{count} violation(s) on their vehicles"))
        }
        EntityKind::Vehicle => {
            let count = source.count_violations_for_vehicle(id)?;
            (count > 0).then(|| format!("{count} violation(s)"))
        }
        EntityKind::Officer => {
            let count = source.count_violations_for_officer(id)?;
            (count > 0).then(|| format!("{count} violation(s) recorded"))
        }
        EntityKind::Violation | EntityKind::Penalty | EntityKind::Payment | EntityKind::Appeal => {
            None
        }
    };

    debug!("Dependency check for {} {}: {:?}", kind, id, reason);
    Ok(reason.into_iter().collect())
}

/// Same as [`check`], keyed by table name. Unrecognised names have nothing to check.
pub fn check_named<S>(source: &S, kind: &str, id: i64) -> Result<Vec<String>, DataAccessError>
where
    S: DependencySource + ?Sized,
{
    match kind.parse::<EntityKind>() {
        Ok(kind) => check(source, kind, id),
        Err(_) => Ok(Vec::new()),
    }
}

/// A refused deletion and every reference that caused it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockedDeletion {
    pub kind: EntityKind,
    pub id: i64,
    pub reasons: Vec<String>,
}

impl fmt::Display for BlockedDeletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Cannot delete {} {}: {}",
            self.kind,
            self.id,
            self.reasons.join(", ")
        )
    }
}
