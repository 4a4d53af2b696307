//! Backfill of legacy `serviceCharge` documents into the itemized schema.

use serde::Serialize;
use tracing::{debug, info};

use super::{RecordStore, StoreError};

/// Outcome of a migration pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct MigrationReport {
    /// Documents read.
    pub scanned: usize,
    /// Documents still in the legacy shape.
    pub legacy: usize,
    /// Documents rewritten. Zero on a dry run.
    pub migrated: usize,
    /// `vehicle/key` of every legacy document found.
    pub paths: Vec<String>,
}

/// Rewrite every legacy document in place with its canonical form.
///
/// Missing `vehicleNumber` and `id` fields are filled from the document's
/// path. With `dry_run` nothing is written. Stops at the first failed write;
/// documents already rewritten stay rewritten and a rerun skips them.
pub fn migrate_legacy(store: &dyn RecordStore, dry_run: bool) -> Result<MigrationReport, StoreError> {
    let tree = store.fetch_all()?;
    let mut report = MigrationReport::default();

    for (vehicle, entries) in tree {
        for (key, stored) in entries {
            report.scanned += 1;
            if !stored.is_legacy() {
                continue;
            }
            report.legacy += 1;
            report.paths.push(format!("{vehicle}/{key}"));

            if dry_run {
                continue;
            }

            let mut record = stored.into_canonical();
            if record.vehicle_number.is_empty() {
                record.vehicle_number = vehicle.clone();
            }
            if record.id.is_empty() {
                record.id = key.clone();
            }
            store.replace(&vehicle, &key, &record)?;
            debug!(%vehicle, %key, "legacy record rewritten");
            report.migrated += 1;
        }
    }

    info!(
        scanned = report.scanned,
        legacy = report.legacy,
        migrated = report.migrated,
        dry_run,
        "migration pass finished"
    );
    Ok(report)
}
