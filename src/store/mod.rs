//! Record storage — the database collaborator behind every view.
//!
//! Records live in a two-level tree: `services/{vehicleNumber}/{key}`.
//! [`RecordStore`] is the seam the rest of the crate talks to; it is built
//! once from config and passed down explicitly, so tests can swap in
//! [`MemoryStore`].
//!
//! - [`FirebaseStore`] — Firebase Realtime Database over its REST interface.
//! - [`MemoryStore`] — in-process tree, used as a test double.
//! - [`migrate_legacy`] — rewrites legacy documents in place.

pub mod firebase;
pub mod memory;
pub mod migrate;

use std::collections::BTreeMap;

use thiserror::Error;

use crate::config::DatabaseConfig;
use crate::records::{ServiceRecord, StoredRecord};

pub use firebase::FirebaseStore;
pub use memory::MemoryStore;
pub use migrate::{MigrationReport, migrate_legacy};

/// Records of one vehicle, keyed by their database key.
pub type VehicleRecords = BTreeMap<String, StoredRecord>;

/// Every stored record, keyed by vehicle number then database key.
pub type RecordTree = BTreeMap<String, VehicleRecords>;

/// Failures talking to the database.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database URL is not configured (set database.url or AUTOSERV_DATABASE_URL)")]
    NotConfigured,
    #[error("permission denied by the database")]
    PermissionDenied,
    #[error("database returned HTTP {code}: {body}")]
    Status { code: u16, body: String },
    #[error("could not reach the database: {0}")]
    Transport(String),
    #[error("malformed document at {path}: {message}")]
    Decode { path: String, message: String },
}

/// Path-addressed read/write access to service records.
pub trait RecordStore {
    /// Fetch every record of every vehicle. An empty database is an empty tree.
    fn fetch_all(&self) -> Result<RecordTree, StoreError>;

    /// Fetch the records of one vehicle. No records is an empty map.
    fn fetch_vehicle(&self, vehicle: &str) -> Result<VehicleRecords, StoreError>;

    /// Append a record under the vehicle and return its generated key.
    fn append(&self, vehicle: &str, record: &ServiceRecord) -> Result<String, StoreError>;

    /// Overwrite the record stored at `services/{vehicle}/{key}`.
    fn replace(&self, vehicle: &str, key: &str, record: &ServiceRecord) -> Result<(), StoreError>;

    /// Human-readable location, for logs and health output.
    fn describe(&self) -> String;
}

/// Build the configured store.
pub fn from_config(config: &DatabaseConfig) -> Result<FirebaseStore, StoreError> {
    FirebaseStore::from_config(config)
}
