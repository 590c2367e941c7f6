/*!
Plain-text and JSON rendering of rows and messages
*/

use serde::Serialize;
use serde_json::json;
use traffic_database::dashboard::DashboardMetrics;
use traffic_database::reports::{RevenueStats, ViolationDetail};
use traffic_database::tables::{
    Appeal, AppealCandidate, Driver, Officer, Payment, Penalty, Vehicle, Violation,
};

use crate::core::config::{OutputConfig, OutputFormat};

/// A row type that can be laid out as a text table.
pub trait Tabular: Serialize {
    fn headers() -> &'static [&'static str];
    fn cells(&self) -> Vec<String>;
}

pub struct Renderer {
    format: OutputFormat,
    pretty: bool,
}

impl Renderer {
    pub fn new(config: &OutputConfig) -> Self {
        Self {
            format: config.format,
            pretty: config.pretty,
        }
    }

    /// Render rows. `empty` is shown in plain mode when there are none.
    pub fn table<T: Tabular>(&self, rows: &[T], empty: &str) -> Result<String, serde_json::Error> {
        match self.format {
            OutputFormat::Json => self.json(&rows),
            OutputFormat::Plain if rows.is_empty() => Ok(empty.to_string()),
            OutputFormat::Plain => {
                let cells: Vec<Vec<String>> = rows.iter().map(T::cells).collect();
                Ok(layout(T::headers(), &cells))
            }
        }
    }

    /// Render `(label, value)` pairs, or `value` itself as JSON.
    pub fn summary<T: Serialize>(
        &self,
        value: &T,
        pairs: &[(&str, String)],
    ) -> Result<String, serde_json::Error> {
        match self.format {
            OutputFormat::Json => self.json(value),
            OutputFormat::Plain => {
                let width = pairs.iter().map(|(label, _)| label.len()).max().unwrap_or(0);
                Ok(pairs
                    .iter()
                    .map(|(label, value)| format!("{label:<width$}  {value}"))
                    .collect::<Vec<_>>()
                    .join("\n"))
            }
        }
    }

    /// A status line; in JSON mode an object carrying `status`, `message` and `extra` fields.
    pub fn message(
        &self,
        status: &str,
        text: &str,
        extra: serde_json::Value,
    ) -> Result<String, serde_json::Error> {
        match self.format {
            OutputFormat::Plain => Ok(text.to_string()),
            OutputFormat::Json => {
                let mut body = json!({ "status": status, "message": text });
                if let (Some(body), serde_json::Value::Object(extra)) =
                    (body.as_object_mut(), extra)
                {
                    body.extend(extra);
                }
                self.json(&body)
            }
        }
    }

    fn json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String, serde_json::Error> {
        if self.pretty {
            serde_json::to_string_pretty(value)
        } else {
            serde_json::to_string(value)
        }
    }
}

fn layout(headers: &[&str], rows: &[Vec<String>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let rule: Vec<String> = widths.iter().map(|w| "-".repeat(*w)).collect();
    let mut out = vec![line(headers, &widths), line(&as_strs(&rule), &widths)];
    for row in rows {
        out.push(line(&as_strs(row), &widths));
    }
    out.join("\n")
}

fn as_strs(cells: &[String]) -> Vec<&str> {
    cells.iter().map(String::as_str).collect()
}

fn line(cells: &[&str], widths: &[usize]) -> String {
    cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join("  ")
        .trim_end()
        .to_string()
}

pub fn money(amount: f64) -> String {
    format!("{amount:.2}")
}

fn opt<T: ToString>(value: &Option<T>) -> String {
    value.as_ref().map(ToString::to_string).unwrap_or_default()
}

fn opt_money(value: Option<f64>) -> String {
    value.map(money).unwrap_or_default()
}

impl Tabular for Driver {
    fn headers() -> &'static [&'static str] {
        &["ID", "NAME", "ADDRESS", "CONTACT", "LICENSE"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            opt(&self.address),
            self.contact_no.clone(),
            self.license_no.clone(),
        ]
    }
}

impl Tabular for Vehicle {
    fn headers() -> &'static [&'static str] {
        &["ID", "YEAR", "MODEL", "COLOR", "PLATE", "OWNER"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.registration_year.to_string(),
            self.model.clone(),
            opt(&self.color),
            self.license_plate.clone(),
            format!("{} ({})", opt(&self.owner), self.driver_id),
        ]
    }
}

impl Tabular for Officer {
    fn headers() -> &'static [&'static str] {
        &["ID", "NAME", "RANK", "BADGE", "CONTACT"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.name.clone(),
            opt(&self.rank),
            self.badge_no.clone(),
            opt(&self.contact_no),
        ]
    }
}

impl Tabular for Violation {
    fn headers() -> &'static [&'static str] {
        &["ID", "WHEN", "TYPE", "LOCATION", "PLATE", "DRIVER", "OFFICER", "FINE", "STATUS"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.date_time.format("%Y-%m-%d %H:%M").to_string(),
            self.violation_type.clone(),
            self.location.clone(),
            self.license_plate.clone(),
            self.driver.clone(),
            self.officer.clone(),
            opt_money(self.penalty_amount),
            opt(&self.penalty_status),
        ]
    }
}

impl Tabular for Penalty {
    fn headers() -> &'static [&'static str] {
        &["ID", "AMOUNT", "STATUS", "DUE", "TYPE", "WHEN", "DRIVER", "PLATE"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            money(self.amount),
            self.status.clone(),
            opt(&self.due_date),
            self.violation_type.clone(),
            self.violation_time.format("%Y-%m-%d %H:%M").to_string(),
            self.driver.clone(),
            self.license_plate.clone(),
        ]
    }
}

impl Tabular for Payment {
    fn headers() -> &'static [&'static str] {
        &["ID", "DATE", "AMOUNT", "MODE", "PENALTY"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.date.to_string(),
            money(self.amount),
            self.mode.clone(),
            self.penalty_id.to_string(),
        ]
    }
}

impl Tabular for Appeal {
    fn headers() -> &'static [&'static str] {
        &["ID", "FILED", "STATUS", "DRIVER", "VIOLATION", "PENALTY", "REASON"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.date_filed.to_string(),
            self.status.clone(),
            self.driver.clone(),
            format!("{} ({})", self.violation_type, self.violation_id),
            opt(&self.penalty_status),
            self.reason.clone(),
        ]
    }
}

impl Tabular for AppealCandidate {
    fn headers() -> &'static [&'static str] {
        &["VIOLATION", "TYPE", "DATE", "DRIVER", "FINE"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.violation_id.to_string(),
            self.violation_type.clone(),
            self.date_time.format("%Y-%m-%d").to_string(),
            format!("{} ({})", self.driver, self.driver_id),
            opt_money(self.penalty_amount),
        ]
    }
}

impl Tabular for ViolationDetail {
    fn headers() -> &'static [&'static str] {
        &[
            "ID", "WHEN", "TYPE", "LOCATION", "DRIVER", "LICENSE", "PLATE", "MODEL", "OFFICER",
            "FINE", "STATUS",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.violation_id.to_string(),
            self.date_time.format("%Y-%m-%d %H:%M").to_string(),
            self.violation_type.clone(),
            self.location.clone(),
            self.driver_name.clone(),
            self.license_no.clone(),
            self.license_plate.clone(),
            self.model.clone(),
            self.officer_name.clone(),
            opt_money(self.fine_amount),
            opt(&self.payment_status),
        ]
    }
}

pub fn dashboard_pairs(metrics: &DashboardMetrics) -> Vec<(&'static str, String)> {
    vec![
        ("Drivers", metrics.drivers.to_string()),
        ("Violations", metrics.violations.to_string()),
        ("Unpaid", metrics.unpaid_penalties.to_string()),
        ("Amount", money(metrics.unpaid_amount)),
    ]
}

pub fn revenue_pairs(stats: &RevenueStats) -> Vec<(&'static str, String)> {
    vec![
        ("Total drivers", stats.total_drivers.to_string()),
        ("Total violations", stats.total_violations.to_string()),
        ("Total revenue", opt_money(stats.total_revenue)),
        ("Average fine", opt_money(stats.average_fine)),
        ("Highest fine", opt_money(stats.highest_fine)),
        ("Lowest fine", opt_money(stats.lowest_fine)),
        ("Revenue collected", opt_money(stats.revenue_collected)),
        ("Revenue pending", opt_money(stats.revenue_pending)),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn driver(id: i64, name: &str) -> Driver {
        Driver {
            id,
            name: name.to_string(),
            address: None,
            contact_no: "555".to_string(),
            license_no: format!("DL-{id}"),
        }
    }

    fn renderer(format: OutputFormat, pretty: bool) -> Renderer {
        Renderer::new(&OutputConfig { format, pretty })
    }

    #[test]
    fn plain_tables_align_columns() {
        let out = renderer(OutputFormat::Plain, true)
            .table(&[driver(1, "Asha"), driver(12, "Bo")], "No drivers")
            .unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "ID  NAME  ADDRESS  CONTACT  LICENSE");
        assert_eq!(lines[1], "--  ----  -------  -------  -------");
        assert_eq!(lines[2], "1   Asha           555      DL-1");
        assert_eq!(lines[3], "12  Bo             555      DL-12");
    }

    #[test]
    fn empty_tables_show_the_placeholder() {
        let rows: Vec<Driver> = Vec::new();
        let out = renderer(OutputFormat::Plain, true).table(&rows, "No drivers").unwrap();
        assert_eq!(out, "No drivers");
    }

    #[test]
    fn json_tables_serialize_rows() {
        let out = renderer(OutputFormat::Json, false)
            .table(&[driver(1, "Asha")], "No drivers")
            .unwrap();
        assert_eq!(
            out,
            r#"[{"id":1,"name":"Asha","address":null,"contact_no":"555","license_no":"DL-1"}]"#
        );
    }

    #[test]
    fn json_messages_merge_extra_fields() {
        let out = renderer(OutputFormat::Json, false)
            .message("blocked", "Cannot delete", json!({ "reasons": ["2 violation(s)"] }))
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["status"], "blocked");
        assert_eq!(value["reasons"][0], "2 violation(s)");
    }

    #[test]
    fn summaries_pad_labels() {
        let metrics = DashboardMetrics {
            drivers: 3,
            violations: 5,
            unpaid_penalties: 2,
            unpaid_amount: 2500.0,
        };
        let out = renderer(OutputFormat::Plain, true)
            .summary(&metrics, &dashboard_pairs(&metrics))
            .unwrap();
        assert_eq!(out, "Drivers     3\nViolations  5\nUnpaid      2\nAmount      2500.00");
    }
}
