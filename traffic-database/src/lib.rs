/*!
Typed access to the traffic violation database.

The schema, its triggers and its stored procedures belong to the database
itself; this crate only reads and writes rows, and refuses to delete a
driver, vehicle or officer that a violation still depends on.
*/

pub mod dashboard;
pub mod database;
pub mod entity;
pub mod error;
pub mod guard;
pub mod reports;
pub mod tables;

pub use database::{ConnectionOptions, Database, DeleteOutcome};
pub use entity::EntityKind;
pub use error::{DataAccessError, Error, ValidationError};
pub use guard::{BlockedDeletion, DependencySource};
