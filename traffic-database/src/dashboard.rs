/*!
Headline counts for the home screen
*/

use serde::Serialize;

use crate::database::Database;
use crate::error::Result;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardMetrics {
    pub drivers: i64,
    pub violations: i64,
    pub unpaid_penalties: i64,
    /// Sum of unpaid penalty amounts, zero when nothing is owed
    pub unpaid_amount: f64,
}

impl Database {
    pub fn dashboard(&self) -> Result<DashboardMetrics> {
        let metrics = self.connection().query_row(
            "SELECT
                (SELECT COUNT(*) FROM Driver),
                (SELECT COUNT(*) FROM Violation),
                (SELECT COUNT(*) FROM Penalty WHERE Status = 'Unpaid'),
                (SELECT COALESCE(SUM(Amount), 0) FROM Penalty WHERE Status = 'Unpaid')",
            [],
            |row| {
                Ok(DashboardMetrics {
                    drivers: row.get(0)?,
                    violations: row.get(1)?,
                    unpaid_penalties: row.get(2)?,
                    unpaid_amount: row.get(3)?,
                })
            },
        )?;
        Ok(metrics)
    }
}
