/*!
Command-line surface: argument definitions, parsing into requests, and execution
*/

use std::path::PathBuf;

use chrono::{Local, NaiveDateTime};
use clap::{Arg, ArgAction, ArgMatches, Command, crate_version, value_parser};
use serde_json::json;
use tracing::{error, info, warn};
use traffic_database::tables::{
    NewDriver, NewOfficer, NewVehicle, NewViolation, OfficerRank, PaymentMode, ViolationType,
};
use traffic_database::{DataAccessError, Database, DeleteOutcome, EntityKind};

use crate::core::config::OutputFormat;
use crate::core::render::{self, Renderer};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Exit status for a blocked deletion or a dependency check that could not run.
pub const EXIT_BLOCKED: u8 = 2;

/// Optional replacements for an existing driver's fields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DriverPatch {
    pub name: Option<String>,
    pub address: Option<String>,
    pub contact_no: Option<String>,
    pub license_no: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct VehiclePatch {
    pub registration_year: Option<i32>,
    pub model: Option<String>,
    pub color: Option<String>,
    pub license_plate: Option<String>,
    pub driver_id: Option<i64>,
}

/// One user interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Dashboard,
    List(EntityKind),
    Show(EntityKind, i64),
    AddDriver(NewDriver),
    UpdateDriver(i64, DriverPatch),
    AddVehicle(NewVehicle),
    UpdateVehicle(i64, VehiclePatch),
    AddOfficer(NewOfficer),
    RecordViolation(NewViolation),
    PayPenalty { penalty_id: i64, mode: PaymentMode },
    AppealCandidates,
    FileAppeal { violation_id: i64, reason: String },
    Check(EntityKind, i64),
    Delete { kind: EntityKind, id: i64, confirmed: bool },
    ViolationReport,
    RevenueReport,
}

/// Rendered output and the status it should exit with.
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub output: String,
    pub status: u8,
}

impl Outcome {
    fn ok(output: String) -> Self {
        Self { output, status: 0 }
    }

    fn blocked(output: String) -> Self {
        Self {
            output,
            status: EXIT_BLOCKED,
        }
    }
}

fn id_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name)
        .help(help)
        .value_name("ID")
        .required(true)
        .value_parser(value_parser!(i64).range(1..))
}

fn text_arg(name: &'static str, help: &'static str) -> Arg {
    Arg::new(name).long(name).help(help).value_name("TEXT")
}

fn check_and_delete(noun: &'static str) -> [Command; 2] {
    [
        Command::new("check")
            .about(format!("Report whether a {noun} can be deleted"))
            .arg(id_arg("id", "Row to check")),
        Command::new("delete")
            .about(format!("Delete a {noun} that nothing depends on"))
            .arg(id_arg("id", "Row to delete"))
            .arg(
                Arg::new("confirm")
                    .long("confirm")
                    .help("Required to actually delete")
                    .action(ArgAction::SetTrue),
            ),
    ]
}

fn list_and_show(noun: &'static str) -> [Command; 2] {
    [
        Command::new("list").about(format!("List every {noun}")),
        Command::new("show")
            .about(format!("Show one {noun}"))
            .arg(id_arg("id", "Row to show")),
    ]
}

fn driver_fields(required: bool) -> [Arg; 4] {
    [
        text_arg("name", "Full name").required(required),
        text_arg("address", "Postal address"),
        text_arg("contact", "Contact number").required(required),
        text_arg("license", "Driving license number").required(required),
    ]
}

fn vehicle_fields(required: bool) -> [Arg; 5] {
    [
        Arg::new("year")
            .long("year")
            .help("Registration year")
            .value_name("YEAR")
            .required(required)
            .value_parser(value_parser!(i32)),
        text_arg("model", "Model name").required(required),
        text_arg("color", "Colour"),
        text_arg("plate", "License plate").required(required),
        Arg::new("owner")
            .long("owner")
            .help("Owning driver id")
            .value_name("DRIVER_ID")
            .required(required)
            .value_parser(value_parser!(i64).range(1..)),
    ]
}

fn parse_timestamp(value: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M"))
        .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S"))
}

/// The full command tree.
pub fn cli() -> Command {
    Command::new("traffic-admin")
        .version(crate_version!())
        .about("Administers the traffic violation database")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Configuration file (TOML)")
                .value_name("PATH")
                .global(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("db-path")
                .short('p')
                .long("db-path")
                .help("Path to the traffic database, overriding the config file")
                .value_name("PATH")
                .global(true)
                .value_parser(value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("format")
                .short('f')
                .long("format")
                .help("Output format: plain or json")
                .value_name("FORMAT")
                .global(true)
                .value_parser(str::parse::<OutputFormat>),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Log queries and other debug detail")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .subcommand(Command::new("dashboard").about("Headline counts"))
        .subcommand(
            Command::new("driver")
                .about("Manage drivers")
                .subcommand_required(true)
                .subcommands(list_and_show("driver"))
                .subcommand(Command::new("add").about("Add a driver").args(driver_fields(true)))
                .subcommand(
                    Command::new("update")
                        .about("Change a driver's details")
                        .arg(id_arg("id", "Driver to update"))
                        .args(driver_fields(false)),
                )
                .subcommands(check_and_delete("driver")),
        )
        .subcommand(
            Command::new("vehicle")
                .about("Manage vehicles")
                .subcommand_required(true)
                .subcommands(list_and_show("vehicle"))
                .subcommand(Command::new("add").about("Add a vehicle").args(vehicle_fields(true)))
                .subcommand(
                    Command::new("update")
                        .about("Change a vehicle's details")
                        .arg(id_arg("id", "Vehicle to update"))
                        .args(vehicle_fields(false)),
                )
                .subcommands(check_and_delete("vehicle")),
        )
        .subcommand(
            Command::new("officer")
                .about("Manage officers")
                .subcommand_required(true)
                .subcommands(list_and_show("officer"))
                .subcommand(
                    Command::new("add")
                        .about("Add an officer")
                        .arg(text_arg("name", "Full name").required(true))
                        .arg(text_arg("badge", "Badge number").required(true))
                        .arg(
                            Arg::new("rank")
                                .long("rank")
                                .help("Inspector, Sub-Inspector, Head Constable or Constable")
                                .value_name("RANK")
                                .value_parser(str::parse::<OfficerRank>),
                        )
                        .arg(text_arg("contact", "Contact number")),
                )
                .subcommands(check_and_delete("officer")),
        )
        .subcommand(
            Command::new("violation")
                .about("Record and list violations")
                .subcommand_required(true)
                .subcommand(Command::new("list").about("List violations, newest first"))
                .subcommand(
                    Command::new("record")
                        .about("Record a violation; the penalty is created by the database")
                        .arg(
                            Arg::new("vehicle")
                                .long("vehicle")
                                .help("Vehicle id")
                                .value_name("ID")
                                .required(true)
                                .value_parser(value_parser!(i64).range(1..)),
                        )
                        .arg(
                            Arg::new("officer")
                                .long("officer")
                                .help("Recording officer id")
                                .value_name("ID")
                                .required(true)
                                .value_parser(value_parser!(i64).range(1..)),
                        )
                        .arg(
                            Arg::new("type")
                                .long("type")
                                .help("Violation type, e.g. \"Signal Jump\" or signal-jump")
                                .value_name("TYPE")
                                .required(true)
                                .value_parser(str::parse::<ViolationType>),
                        )
                        .arg(text_arg("location", "Where it happened").required(true))
                        .arg(
                            Arg::new("at")
                                .long("at")
                                .help("When it happened, \"YYYY-MM-DD HH:MM\" (default: now)")
                                .value_name("TIMESTAMP")
                                .value_parser(parse_timestamp),
                        ),
                ),
        )
        .subcommand(
            Command::new("penalty")
                .about("List penalties")
                .subcommand_required(true)
                .subcommand(Command::new("list").about("List penalties, newest first")),
        )
        .subcommand(
            Command::new("payment")
                .about("Pay penalties")
                .subcommand_required(true)
                .subcommand(Command::new("list").about("List payments"))
                .subcommand(
                    Command::new("pay")
                        .about("Pay an unpaid penalty in full")
                        .arg(id_arg("penalty", "Penalty to pay"))
                        .arg(
                            Arg::new("mode")
                                .long("mode")
                                .help("Cash, Card, Online or UPI")
                                .value_name("MODE")
                                .value_parser(str::parse::<PaymentMode>),
                        ),
                ),
        )
        .subcommand(
            Command::new("appeal")
                .about("File and list appeals")
                .subcommand_required(true)
                .subcommand(Command::new("list").about("List appeals"))
                .subcommand(
                    Command::new("candidates").about("Violations that can still be appealed"),
                )
                .subcommand(
                    Command::new("file")
                        .about("File an appeal against a violation")
                        .arg(id_arg("violation", "Violation to appeal"))
                        .arg(text_arg("reason", "Why the violation is disputed").required(true)),
                ),
        )
        .subcommand(
            Command::new("report")
                .about("Reports over the whole database")
                .subcommand_required(true)
                .subcommand(
                    Command::new("violations")
                        .about("Every violation with its driver, vehicle and fine"),
                )
                .subcommand(Command::new("revenue").about("Fine and revenue totals")),
        )
}

fn text(matches: &ArgMatches, name: &str) -> Option<String> {
    matches.get_one::<String>(name).cloned()
}

fn id(matches: &ArgMatches, name: &str) -> i64 {
    matches.get_one::<i64>(name).copied().unwrap_or_default()
}

impl Request {
    /// Translate parsed arguments. Returns `None` for an unrecognised subcommand.
    pub fn from_matches(matches: &ArgMatches) -> Option<Self> {
        let (group, sub) = matches.subcommand()?;
        if group == "dashboard" {
            return Some(Request::Dashboard);
        }
        let (action, args) = sub.subcommand()?;

        let kind = match group {
            "driver" => EntityKind::Driver,
            "vehicle" => EntityKind::Vehicle,
            "officer" => EntityKind::Officer,
            "violation" => EntityKind::Violation,
            "penalty" => EntityKind::Penalty,
            "payment" => EntityKind::Payment,
            "appeal" => EntityKind::Appeal,
            "report" => {
                return match action {
                    "violations" => Some(Request::ViolationReport),
                    "revenue" => Some(Request::RevenueReport),
                    _ => None,
                };
            }
            _ => return None,
        };

        let request = match (kind, action) {
            (_, "list") => Request::List(kind),
            (_, "show") => Request::Show(kind, id(args, "id")),
            (_, "check") => Request::Check(kind, id(args, "id")),
            (_, "delete") => Request::Delete {
                kind,
                id: id(args, "id"),
                confirmed: args.get_flag("confirm"),
            },
            (EntityKind::Driver, "add") => Request::AddDriver(NewDriver {
                name: text(args, "name").unwrap_or_default(),
                address: text(args, "address"),
                contact_no: text(args, "contact").unwrap_or_default(),
                license_no: text(args, "license").unwrap_or_default(),
            }),
            (EntityKind::Driver, "update") => Request::UpdateDriver(
                id(args, "id"),
                DriverPatch {
                    name: text(args, "name"),
                    address: text(args, "address"),
                    contact_no: text(args, "contact"),
                    license_no: text(args, "license"),
                },
            ),
            (EntityKind::Vehicle, "add") => Request::AddVehicle(NewVehicle {
                registration_year: args.get_one::<i32>("year").copied().unwrap_or_default(),
                model: text(args, "model").unwrap_or_default(),
                color: text(args, "color"),
                license_plate: text(args, "plate").unwrap_or_default(),
                driver_id: id(args, "owner"),
            }),
            (EntityKind::Vehicle, "update") => Request::UpdateVehicle(
                id(args, "id"),
                VehiclePatch {
                    registration_year: args.get_one::<i32>("year").copied(),
                    model: text(args, "model"),
                    color: text(args, "color"),
                    license_plate: text(args, "plate"),
                    driver_id: args.get_one::<i64>("owner").copied(),
                },
            ),
            (EntityKind::Officer, "add") => Request::AddOfficer(NewOfficer {
                name: text(args, "name").unwrap_or_default(),
                rank: args.get_one::<OfficerRank>("rank").copied().unwrap_or_default(),
                badge_no: text(args, "badge").unwrap_or_default(),
                contact_no: text(args, "contact"),
            }),
            (EntityKind::Violation, "record") => Request::RecordViolation(NewViolation {
                date_time: args
                    .get_one::<NaiveDateTime>("at")
                    .copied()
                    .unwrap_or_else(|| Local::now().naive_local()),
                violation_type: *args.get_one::<ViolationType>("type")?,
                location: text(args, "location").unwrap_or_default(),
                vehicle_id: id(args, "vehicle"),
                officer_id: id(args, "officer"),
            }),
            (EntityKind::Payment, "pay") => Request::PayPenalty {
                penalty_id: id(args, "penalty"),
                mode: args.get_one::<PaymentMode>("mode").copied().unwrap_or_default(),
            },
            (EntityKind::Appeal, "candidates") => Request::AppealCandidates,
            (EntityKind::Appeal, "file") => Request::FileAppeal {
                violation_id: id(args, "violation"),
                reason: text(args, "reason").unwrap_or_default(),
            },
            _ => return None,
        };
        Some(request)
    }
}

fn created(renderer: &Renderer, noun: &str, id: i64) -> Result<Outcome, BoxError> {
    let text = format!("{noun} {id} added");
    Ok(Outcome::ok(renderer.message("ok", &text, json!({ "id": id }))?))
}

fn not_found(renderer: &Renderer, kind: EntityKind, id: i64) -> Result<Outcome, BoxError> {
    let text = format!("No {} with id {}", kind.table().to_lowercase(), id);
    Ok(Outcome {
        output: renderer.message("not_found", &text, json!({ "id": id }))?,
        status: 1,
    })
}

/// A faulted check blocks the deletion it guards.
fn check_failed(
    renderer: &Renderer,
    kind: EntityKind,
    id: i64,
    err: &DataAccessError,
) -> Result<Outcome, BoxError> {
    error!("Dependency check for {} {} failed: {}", kind, id, err);
    let text = format!("Could not check {kind} {id}, so it will not be deleted: {err}");
    Ok(Outcome::blocked(renderer.message("error", &text, json!({ "id": id }))?))
}

/// Run one request against the database.
pub fn execute(
    db: &mut Database,
    request: &Request,
    renderer: &Renderer,
) -> Result<Outcome, BoxError> {
    let output = match request {
        Request::Dashboard => {
            let metrics = db.dashboard()?;
            renderer.summary(&metrics, &render::dashboard_pairs(&metrics))?
        }
        Request::List(kind) => match kind {
            EntityKind::Driver => renderer.table(&db.drivers()?, "No drivers")?,
            EntityKind::Vehicle => renderer.table(&db.vehicles()?, "No vehicles")?,
            EntityKind::Officer => renderer.table(&db.officers()?, "No officers")?,
            EntityKind::Violation => renderer.table(&db.violations()?, "No violations")?,
            EntityKind::Penalty => renderer.table(&db.penalties()?, "No penalties")?,
            EntityKind::Payment => renderer.table(&db.payments()?, "No payments")?,
            EntityKind::Appeal => renderer.table(&db.appeals()?, "No appeals")?,
        },
        Request::Show(kind, id) => {
            let shown = match kind {
                EntityKind::Driver => db.driver(*id)?.map(|row| renderer.table(&[row], "")),
                EntityKind::Vehicle => db.vehicle(*id)?.map(|row| renderer.table(&[row], "")),
                EntityKind::Officer => db.officer(*id)?.map(|row| renderer.table(&[row], "")),
                EntityKind::Penalty => db.penalty(*id)?.map(|row| renderer.table(&[row], "")),
                _ => None,
            };
            match shown {
                Some(output) => output?,
                None => return not_found(renderer, *kind, *id),
            }
        }
        Request::AddDriver(driver) => return created(renderer, "Driver", db.add_driver(driver)?),
        Request::UpdateDriver(id, patch) => {
            let Some(current) = db.driver(*id)? else {
                return not_found(renderer, EntityKind::Driver, *id);
            };
            let merged = NewDriver {
                name: patch.name.clone().unwrap_or(current.name),
                address: patch.address.clone().or(current.address),
                contact_no: patch.contact_no.clone().unwrap_or(current.contact_no),
                license_no: patch.license_no.clone().unwrap_or(current.license_no),
            };
            db.update_driver(*id, &merged)?;
            renderer.message("ok", &format!("Driver {id} updated"), json!({ "id": id }))?
        }
        Request::AddVehicle(vehicle) => {
            return created(renderer, "Vehicle", db.add_vehicle(vehicle)?);
        }
        Request::UpdateVehicle(id, patch) => {
            let Some(current) = db.vehicle(*id)? else {
                return not_found(renderer, EntityKind::Vehicle, *id);
            };
            let merged = NewVehicle {
                registration_year: patch.registration_year.unwrap_or(current.registration_year),
                model: patch.model.clone().unwrap_or(current.model),
                color: patch.color.clone().or(current.color),
                license_plate: patch.license_plate.clone().unwrap_or(current.license_plate),
                driver_id: patch.driver_id.unwrap_or(current.driver_id),
            };
            db.update_vehicle(*id, &merged)?;
            renderer.message("ok", &format!("Vehicle {id} updated"), json!({ "id": id }))?
        }
        Request::AddOfficer(officer) => {
            return created(renderer, "Officer", db.add_officer(officer)?);
        }
        Request::RecordViolation(violation) => {
            let id = db.record_violation(violation)?;
            let text = format!("Violation {id} recorded; its penalty is created by the database");
            renderer.message("ok", &text, json!({ "id": id }))?
        }
        Request::PayPenalty { penalty_id, mode } => {
            let id = db.pay_penalty(*penalty_id, *mode)?;
            let text = format!("Payment {id} recorded for penalty {penalty_id}");
            renderer.message("ok", &text, json!({ "id": id, "penalty_id": penalty_id }))?
        }
        Request::AppealCandidates => {
            renderer.table(&db.appeal_candidates()?, "No violations eligible for appeal")?
        }
        Request::FileAppeal { violation_id, reason } => {
            let id = db.file_appeal(*violation_id, reason)?;
            let text = format!("Appeal {id} filed for violation {violation_id}");
            renderer.message("ok", &text, json!({ "id": id, "violation_id": violation_id }))?
        }
        Request::Check(kind, id) => return check(db, *kind, *id, renderer),
        Request::Delete {
            kind,
            id,
            confirmed,
        } => return delete(db, *kind, *id, *confirmed, renderer),
        Request::ViolationReport => renderer.table(&db.violation_details()?, "No violations")?,
        Request::RevenueReport => {
            let stats = db.revenue_stats()?;
            renderer.summary(&stats, &render::revenue_pairs(&stats))?
        }
    };
    Ok(Outcome::ok(output))
}

fn check(
    db: &Database,
    kind: EntityKind,
    id: i64,
    renderer: &Renderer,
) -> Result<Outcome, BoxError> {
    let reasons = match db.check_dependencies(kind, id) {
        Ok(reasons) => reasons,
        Err(err) => return check_failed(renderer, kind, id, &err),
    };

    if !reasons.is_empty() {
        let text = format!("Cannot delete {kind} {id}: {}", reasons.join(", "));
        let extra = json!({ "kind": kind, "id": id, "safe": false, "reasons": reasons });
        return Ok(Outcome::blocked(renderer.message("blocked", &text, extra)?));
    }

    let cascaded = match kind {
        EntityKind::Driver => match db.count_vehicles_for_driver(id) {
            Ok(count) => count,
            Err(err) => return check_failed(renderer, kind, id, &err),
        },
        _ => 0,
    };
    let mut text = format!("{kind} {id} is safe to delete");
    if cascaded > 0 {
        text.push_str(&format!("; its {cascaded} vehicle(s) will be deleted with it"));
    }
    let extra = json!({
        "kind": kind,
        "id": id,
        "safe": true,
        "reasons": [],
        "cascaded_vehicles": cascaded,
    });
    Ok(Outcome::ok(renderer.message("ok", &text, extra)?))
}

fn delete(
    db: &mut Database,
    kind: EntityKind,
    id: i64,
    confirmed: bool,
    renderer: &Renderer,
) -> Result<Outcome, BoxError> {
    if !confirmed {
        let text = format!("Refusing to delete {kind} {id} without --confirm");
        return Ok(Outcome {
            output: renderer.message("unconfirmed", &text, json!({ "id": id }))?,
            status: 1,
        });
    }

    match db.delete_guarded(kind, id) {
        Ok(DeleteOutcome::Deleted { cascaded_vehicles }) => {
            info!("Deleted {} {}", kind, id);
            let mut text = format!("{kind} {id} deleted");
            if cascaded_vehicles > 0 {
                text.push_str(&format!(" along with {cascaded_vehicles} vehicle(s)"));
            }
            let extra = json!({ "kind": kind, "id": id, "cascaded_vehicles": cascaded_vehicles });
            Ok(Outcome::ok(renderer.message("deleted", &text, extra)?))
        }
        Ok(DeleteOutcome::Blocked(blocked)) => {
            warn!("Deletion of {} {} blocked", kind, id);
            let text = blocked.to_string();
            let extra = json!({ "kind": kind, "id": id, "reasons": blocked.reasons });
            Ok(Outcome::blocked(renderer.message("blocked", &text, extra)?))
        }
        Ok(DeleteOutcome::NotFound) => not_found(renderer, kind, id),
        Err(err) => check_failed(renderer, kind, id, &err),
    }
}
