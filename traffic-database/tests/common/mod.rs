#![allow(dead_code)]

use std::path::Path;

use rusqlite::{Connection, Result, params};
use tempfile::NamedTempFile;
use traffic_database::{ConnectionOptions, Database};

pub const SCHEMA: &str = include_str!("../fixtures/schema.sql");

pub fn initialize_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)
}

// Helper function to create an in-memory database for testing
pub fn create_test_db() -> Database {
    let conn = Connection::open_in_memory().unwrap();
    initialize_schema(&conn).unwrap();
    Database::from_connection(conn).unwrap()
}

/// File-backed database that fails at once on a held lock instead of waiting.
pub fn create_file_db(file: &NamedTempFile) -> Database {
    {
        let conn = Connection::open(file.path()).unwrap();
        initialize_schema(&conn).unwrap();
    }
    let options = ConnectionOptions {
        path: file.path().to_path_buf(),
        read_only: false,
        busy_timeout_ms: 0,
    };
    Database::open(&options).unwrap()
}

/// A second session that holds the write lock until it commits or rolls back.
pub fn hold_write_lock(path: &Path) -> Connection {
    let conn = Connection::open(path).unwrap();
    conn.execute_batch("BEGIN IMMEDIATE").unwrap();
    conn
}

pub fn insert_driver(db: &Database, id: i64, name: &str) {
    db.connection()
        .execute(
            "INSERT INTO Driver (Driver_ID, Name, Contact_no, License_no) VALUES (?1, ?2, ?3, ?4)",
            params![id, name, format!("555-{id}"), format!("DL-{id}")],
        )
        .unwrap();
}

pub fn insert_vehicle(db: &Database, id: i64, driver_id: i64) {
    db.connection()
        .execute(
            "INSERT INTO Vehicle (Vehicle_ID, Registration_year, Model, License_plate, Driver_ID)
             VALUES (?1, 2020, 'Swift', ?2, ?3)",
            params![id, format!("KA-{id}"), driver_id],
        )
        .unwrap();
}

pub fn insert_officer(db: &Database, id: i64, name: &str) {
    db.connection()
        .execute(
            "INSERT INTO Officer (Officer_ID, Name, Officer_Rank, Badge_no)
             VALUES (?1, ?2, 'Inspector', ?3)",
            params![id, name, format!("B-{id}")],
        )
        .unwrap();
}

pub fn insert_violation(db: &Database, id: i64, vehicle_id: i64, officer_id: i64) {
    db.connection()
        .execute(
            "INSERT INTO Violation (Violation_ID, Date_Time, Type, Location, Vehicle_ID, Officer_ID)
             VALUES (?1, '2024-05-01 10:30:00', 'Speeding', 'MG Road', ?2, ?3)",
            params![id, vehicle_id, officer_id],
        )
        .unwrap();
}

pub fn delete_violation(db: &Database, id: i64) {
    db.connection()
        .execute("DELETE FROM Violation WHERE Violation_ID = ?1", [id])
        .unwrap();
}

pub fn row_count(db: &Database, table: &str) -> i64 {
    db.connection()
        .query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        .unwrap()
}

/// Driver 7 owns vehicle 42, which has violations 100 and 101 recorded by officer 3.
pub fn seed_scenario(db: &Database) {
    insert_driver(db, 7, "Asha Menon");
    insert_vehicle(db, 42, 7);
    insert_officer(db, 3, "R. Rao");
    insert_violation(db, 100, 42, 3);
    insert_violation(db, 101, 42, 3);
}
