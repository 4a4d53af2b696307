//! Service analytics — from stored records to dashboard-ready views.
//!
//! The pipeline runs in three steps over one fetched record set:
//! - [`normalize`]: flatten `vehicle → key → record` into a single list
//! - [`engine`]: monthly revenue, part ranking, summaries, date filters
//! - [`formatter`]: display order, 12-month grids, currency text
//!
//! [`Snapshot`] bundles a fetch with those views; [`SnapshotCache`] keeps it
//! around between dashboard requests.

pub mod engine;
pub mod formatter;
pub mod normalize;
pub mod snapshot;

use std::cmp::Reverse;

use crate::records::{ServiceRecord, normalize_vehicle_number};
use crate::store::{RecordStore, StoreError};

pub use engine::{DaySummary, MonthlyBucket, PartFrequency, ServiceSummary, TOP_PARTS};
pub use formatter::{MonthRow, YearTotal, YearView};
pub use snapshot::{Snapshot, SnapshotCache};

/// Service history of one vehicle, newest visit first.
///
/// An empty list is the "no records yet" state, not an error.
pub fn vehicle_history(store: &dyn RecordStore, vehicle: &str) -> Result<Vec<ServiceRecord>, StoreError> {
    let vehicle = normalize_vehicle_number(vehicle);
    let mut records: Vec<ServiceRecord> = store
        .fetch_vehicle(&vehicle)?
        .into_values()
        .map(|stored| stored.into_canonical())
        .collect();

    records.sort_by_key(|r| (Reverse(r.service_date()), Reverse(r.id.clone())));
    Ok(records)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::NewServiceEntry;
    use crate::store::MemoryStore;

    fn add(store: &MemoryStore, vehicle: &str, date: &str, id: &str) {
        let entry = NewServiceEntry {
            date: date.to_string(),
            ..Default::default()
        };
        let record = entry.into_record(vehicle, id.to_string()).unwrap();
        store.append(&record.vehicle_number, &record).unwrap();
    }

    #[test]
    fn history_is_newest_first() {
        let store = MemoryStore::new();
        add(&store, "AP09", "2025-01-05", "1");
        add(&store, "AP09", "2025-03-01", "2");
        add(&store, "AP09", "2024-12-24", "3");
        add(&store, "KA01", "2025-06-01", "4");

        let history = vehicle_history(&store, " ap09 ").unwrap();
        let ids: Vec<&str> = history.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, vec!["2", "1", "3"]);
    }

    #[test]
    fn unknown_vehicle_has_empty_history() {
        let store = MemoryStore::new();
        assert!(vehicle_history(&store, "NOPE").unwrap().is_empty());
    }
}
