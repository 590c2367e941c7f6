mod common;

use chrono::NaiveDate;
use common::*;
use tempfile::NamedTempFile;
use traffic_database::tables::{
    NewDriver, NewOfficer, NewVehicle, NewViolation, OfficerRank, PaymentMode, PenaltyStatus,
    ViolationType,
};
use traffic_database::{Error, ValidationError};

fn sample_driver(license: &str) -> NewDriver {
    NewDriver {
        name: "Asha Menon".into(),
        address: Some("12 Lake View".into()),
        contact_no: "9876543210".into(),
        license_no: license.into(),
    }
}

fn record(
    db: &traffic_database::Database,
    vehicle_id: i64,
    officer_id: i64,
    kind: ViolationType,
) -> i64 {
    let at = NaiveDate::from_ymd_opt(2024, 6, 1)
        .unwrap()
        .and_hms_opt(9, 15, 0)
        .unwrap();
    db.record_violation(&NewViolation {
        date_time: at,
        violation_type: kind,
        location: "Ring Road".into(),
        vehicle_id,
        officer_id,
    })
    .unwrap()
}

#[test]
fn drivers_can_be_added_and_updated() {
    let db = create_test_db();
    let id = db.add_driver(&sample_driver("DL-100")).unwrap();

    let mut changed = sample_driver("DL-100");
    changed.name = "Asha M.".into();
    assert!(db.update_driver(id, &changed).unwrap());
    assert!(!db.update_driver(id + 1, &changed).unwrap());

    let drivers = db.drivers().unwrap();
    assert_eq!(drivers.len(), 1);
    assert_eq!(drivers[0].name, "Asha M.");
    assert_eq!(db.driver(id).unwrap().unwrap().address.as_deref(), Some("12 Lake View"));
}

#[test]
fn invalid_input_never_reaches_the_database() {
    let db = create_test_db();
    let mut driver = sample_driver("DL-1");
    driver.contact_no.clear();
    assert!(matches!(
        db.add_driver(&driver),
        Err(Error::Validation(ValidationError::MissingField("contact number")))
    ));
    assert_eq!(row_count(&db, "Driver"), 0);
}

#[test]
fn store_constraints_surface_as_data_access_errors() {
    let db = create_test_db();
    db.add_driver(&sample_driver("DL-1")).unwrap();
    assert!(matches!(
        db.add_driver(&sample_driver("DL-1")),
        Err(Error::DataAccess(_))
    ));
}

#[test]
fn vehicles_list_their_owner() {
    let db = create_test_db();
    let owner = db.add_driver(&sample_driver("DL-1")).unwrap();
    let id = db
        .add_vehicle(&NewVehicle {
            registration_year: 2019,
            model: "Nexon".into(),
            color: Some("Blue".into()),
            license_plate: "MH-12-AB-1234".into(),
            driver_id: owner,
        })
        .unwrap();

    let vehicle = db.vehicle(id).unwrap().unwrap();
    assert_eq!(vehicle.owner.as_deref(), Some("Asha Menon"));
    assert_eq!(vehicle.color.as_deref(), Some("Blue"));
    assert_eq!(db.vehicles().unwrap().len(), 1);
}

#[test]
fn officers_store_their_rank() {
    let db = create_test_db();
    let id = db
        .add_officer(&NewOfficer {
            name: "K. Iyer".into(),
            rank: OfficerRank::HeadConstable,
            badge_no: "HC-77".into(),
            contact_no: None,
        })
        .unwrap();
    let officer = db.officer(id).unwrap().unwrap();
    assert_eq!(officer.rank.as_deref(), Some("Head Constable"));
}

#[test]
fn recorded_violations_pick_up_their_penalty() {
    let db = create_test_db();
    insert_driver(&db, 1, "Asha Menon");
    insert_vehicle(&db, 1, 1);
    insert_officer(&db, 1, "R. Rao");

    let id = record(&db, 1, 1, ViolationType::Speeding);
    let violations = db.violations().unwrap();
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].id, id);
    assert_eq!(violations[0].violation_type, "Speeding");
    assert_eq!(violations[0].penalty_status.as_deref(), Some("Unpaid"));
    assert_eq!(violations[0].penalty_amount, Some(2000.0));

    let penalties = db.penalties().unwrap();
    assert_eq!(penalties.len(), 1);
    assert_eq!(penalties[0].due_date, NaiveDate::from_ymd_opt(2024, 7, 1));
}

#[test]
fn only_unpaid_penalties_can_be_paid() {
    let mut db = create_test_db();
    seed_scenario(&db);
    let penalty = db.penalties().unwrap()[0].clone();

    db.pay_penalty(penalty.id, PaymentMode::Upi).unwrap();
    let paid = db.penalty(penalty.id).unwrap().unwrap();
    assert!(paid.is(PenaltyStatus::Paid));
    assert!(db.penalty(9999).unwrap().is_none());
    let payments = db.payments().unwrap();
    assert_eq!(payments.len(), 1);
    assert_eq!(payments[0].amount, penalty.amount);
    assert_eq!(payments[0].mode, "UPI");

    assert!(matches!(
        db.pay_penalty(penalty.id, PaymentMode::Cash),
        Err(Error::Validation(ValidationError::PenaltyNotPayable { .. }))
    ));
    assert!(matches!(
        db.pay_penalty(9999, PaymentMode::Cash),
        Err(Error::Validation(ValidationError::UnknownPenalty(9999)))
    ));
}

#[test]
fn appeals_require_an_eligible_violation_and_a_real_reason() {
    let mut db = create_test_db();
    seed_scenario(&db);
    assert_eq!(db.appeal_candidates().unwrap().len(), 2);

    assert!(matches!(
        db.file_appeal(100, "  unfair  "),
        Err(Error::Validation(ValidationError::ReasonTooShort { min: 10 }))
    ));

    db.file_appeal(100, "Speed camera was miscalibrated").unwrap();
    let appeals = db.appeals().unwrap();
    assert_eq!(appeals.len(), 1);
    assert_eq!(appeals[0].status, "Pending");
    assert_eq!(appeals[0].driver, "Asha Menon");
    assert_eq!(appeals[0].penalty_status.as_deref(), Some("Appealed"));

    let candidates = db.appeal_candidates().unwrap();
    assert_eq!(candidates.len(), 1);
    assert_eq!(candidates[0].violation_id, 101);
    assert!(matches!(
        db.file_appeal(100, "Filing a second time anyway"),
        Err(Error::Validation(ValidationError::NotAppealable(100)))
    ));
}

#[test]
fn payment_waits_for_a_concurrent_payment_to_settle() {
    let file = NamedTempFile::new().unwrap();
    let mut db = create_file_db(&file);
    seed_scenario(&db);
    let penalty_id = db.penalties().unwrap()[0].id;

    let other = hold_write_lock(file.path());
    other
        .execute(
            "INSERT INTO Payment (Date, Amount, ModeofPayment, Penalty_ID)
             VALUES ('2024-05-03', 2000, 'Cash', ?1)",
            [penalty_id],
        )
        .unwrap();
    assert!(matches!(
        db.pay_penalty(penalty_id, PaymentMode::Card),
        Err(Error::DataAccess(_))
    ));

    other.execute_batch("COMMIT").unwrap();
    assert!(matches!(
        db.pay_penalty(penalty_id, PaymentMode::Card),
        Err(Error::Validation(ValidationError::PenaltyNotPayable { .. }))
    ));
    assert_eq!(row_count(&db, "Payment"), 1);
}

#[test]
fn appeal_waits_for_a_concurrent_appeal_to_settle() {
    let file = NamedTempFile::new().unwrap();
    let mut db = create_file_db(&file);
    seed_scenario(&db);

    let other = hold_write_lock(file.path());
    other
        .execute(
            "INSERT INTO Appeal (Datefiled, Status, Reason, Violation_ID, Driver_ID)
             VALUES ('2024-05-03', 'Pending', 'Filed at the counter', 100, 7)",
            [],
        )
        .unwrap();
    assert!(matches!(
        db.file_appeal(100, "Speed camera was miscalibrated"),
        Err(Error::DataAccess(_))
    ));

    other.execute_batch("COMMIT").unwrap();
    assert!(matches!(
        db.file_appeal(100, "Speed camera was miscalibrated"),
        Err(Error::Validation(ValidationError::NotAppealable(100)))
    ));
    assert_eq!(row_count(&db, "Appeal"), 1);
}

#[test]
fn dashboard_counts_unpaid_penalties() {
    let mut db = create_test_db();
    let empty = db.dashboard().unwrap();
    assert_eq!(empty.drivers, 0);
    assert_eq!(empty.unpaid_amount, 0.0);

    seed_scenario(&db);
    let penalty_id = db.penalties().unwrap()[0].id;
    db.pay_penalty(penalty_id, PaymentMode::Card).unwrap();

    let metrics = db.dashboard().unwrap();
    assert_eq!(metrics.drivers, 1);
    assert_eq!(metrics.violations, 2);
    assert_eq!(metrics.unpaid_penalties, 1);
    assert_eq!(metrics.unpaid_amount, 2000.0);
}

#[test]
fn reports_cover_every_violation() {
    let db = create_test_db();
    let stats = db.revenue_stats().unwrap();
    assert_eq!(stats.total_violations, 0);
    assert_eq!(stats.total_revenue, None);

    seed_scenario(&db);
    insert_vehicle(&db, 50, 7);
    record(&db, 50, 3, ViolationType::DrunkDriving);

    let details = db.violation_details().unwrap();
    assert_eq!(details.len(), 3);
    assert_eq!(details[0].violation_type, "Drunk Driving");
    assert_eq!(details[0].license_plate, "KA-50");

    let stats = db.revenue_stats().unwrap();
    assert_eq!(stats.total_drivers, 1);
    assert_eq!(stats.total_violations, 3);
    assert_eq!(stats.total_revenue, Some(14000.0));
    assert_eq!(stats.highest_fine, Some(10000.0));
    assert_eq!(stats.lowest_fine, Some(2000.0));
    assert_eq!(stats.revenue_collected, Some(0.0));
    assert_eq!(stats.revenue_pending, Some(14000.0));
}
