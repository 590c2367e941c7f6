/*!
The seven tables of the traffic violation database
*/

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Driver,
    Vehicle,
    Officer,
    Violation,
    Penalty,
    Payment,
    Appeal,
}

impl EntityKind {
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Driver,
        EntityKind::Vehicle,
        EntityKind::Officer,
        EntityKind::Violation,
        EntityKind::Penalty,
        EntityKind::Payment,
        EntityKind::Appeal,
    ];

    pub fn table(self) -> &'static str {
        match self {
            EntityKind::Driver => "Driver",
            EntityKind::Vehicle => "Vehicle",
            EntityKind::Officer => "Officer",
            EntityKind::Violation => "Violation",
            EntityKind::Penalty => "Penalty",
            EntityKind::Payment => "Payment",
            EntityKind::Appeal => "Appeal",
        }
    }

    /// Primary key column name.
    pub fn id_column(self) -> &'static str {
        match self {
            EntityKind::Driver => "Driver_ID",
            EntityKind::Vehicle => "Vehicle_ID",
            EntityKind::Officer => "Officer_ID",
            EntityKind::Violation => "Violation_ID",
            EntityKind::Penalty => "Penalty_ID",
            EntityKind::Payment => "Payment_ID",
            EntityKind::Appeal => "Appeal_ID",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.table())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownEntityKind(pub String);

impl fmt::Display for UnknownEntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown entity kind '{}'", self.0)
    }
}

impl std::error::Error for UnknownEntityKind {}

impl FromStr for EntityKind {
    type Err = UnknownEntityKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EntityKind::ALL
            .into_iter()
            .find(|kind| kind.table().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownEntityKind(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!("driver".parse::<EntityKind>(), Ok(EntityKind::Driver));
        assert_eq!(" VEHICLE ".parse::<EntityKind>(), Ok(EntityKind::Vehicle));
        assert!("Garage".parse::<EntityKind>().is_err());
    }

    #[test]
    fn id_columns_follow_table_names() {
        for kind in EntityKind::ALL {
            assert_eq!(kind.id_column(), format!("{}_ID", kind.table()));
        }
    }
}
