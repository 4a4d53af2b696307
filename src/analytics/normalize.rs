//! Record normalizer — flattens the per-vehicle tree into one sequence.

use tracing::{debug, info};

use crate::records::ServiceRecord;
use crate::store::RecordTree;

/// Flatten `vehicle → key → record` into a single list of canonical records.
///
/// Order is not part of the contract; callers that need chronological order
/// sort explicitly. Legacy-shaped documents are converted on the way through.
pub fn flatten(tree: RecordTree) -> Vec<ServiceRecord> {
    let mut records = Vec::with_capacity(tree.values().map(|v| v.len()).sum());
    let mut migrated = 0usize;

    for (vehicle, entries) in tree {
        for (key, stored) in entries {
            if stored.is_legacy() {
                debug!(%vehicle, %key, "converting legacy record");
                migrated += 1;
            }
            let mut record = stored.into_canonical();
            if record.vehicle_number.is_empty() {
                record.vehicle_number = vehicle.clone();
            }
            records.push(record);
        }
    }

    if migrated > 0 {
        info!(
            migrated,
            "legacy records converted in memory; run `autoserv migrate` to backfill"
        );
    }

    records
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::StoredRecord;
    use serde_json::json;

    fn stored(value: serde_json::Value) -> StoredRecord {
        StoredRecord::from_value(value).unwrap()
    }

    #[test]
    fn empty_tree_gives_empty_sequence() {
        assert!(flatten(RecordTree::new()).is_empty());
    }

    #[test]
    fn flattens_every_vehicle() {
        let mut tree = RecordTree::new();
        tree.entry("AP09".into()).or_default().insert(
            "a".into(),
            stored(json!({ "vehicleNumber": "AP09", "date": "2025-01-01", "totalCost": 10 })),
        );
        tree.entry("AP09".into()).or_default().insert(
            "b".into(),
            stored(json!({ "vehicleNumber": "AP09", "date": "2025-01-02", "totalCost": 20 })),
        );
        tree.entry("KA01".into()).or_default().insert(
            "c".into(),
            stored(json!({ "vehicleNumber": "KA01", "date": "2025-01-03", "totalCost": 30 })),
        );

        let records = flatten(tree);
        assert_eq!(records.len(), 3);
        let total: f64 = records.iter().map(|r| r.total_cost()).sum();
        assert_eq!(total, 60.0);
    }

    #[test]
    fn converts_legacy_and_fills_vehicle_from_path() {
        let mut tree = RecordTree::new();
        tree.entry("TN22".into()).or_default().insert(
            "x".into(),
            stored(json!({
                "date": "2024-12-01",
                "spareParts": [{ "name": "Chain", "cost": 600 }],
                "serviceCharge": 200,
                "totalCost": 800
            })),
        );

        let records = flatten(tree);
        assert_eq!(records[0].vehicle_number, "TN22");
        assert_eq!(records[0].service_cost(), 200.0);
        assert_eq!(records[0].spare_cost(), 600.0);
        assert_eq!(records[0].total_cost(), 800.0);
    }
}
