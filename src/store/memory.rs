//! In-process record store.
//!
//! Holds the same two-level tree the database does. Keys are generated in
//! increasing order (`m00000001`, `m00000002`, ...).

use std::cell::{Cell, RefCell};

use super::{RecordStore, RecordTree, StoreError, VehicleRecords};
use crate::records::{ServiceRecord, StoredRecord};

#[derive(Debug, Default)]
pub struct MemoryStore {
    tree: RefCell<RecordTree>,
    next_key: Cell<u64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing tree.
    pub fn with_tree(tree: RecordTree) -> Self {
        Self {
            tree: RefCell::new(tree),
            next_key: Cell::new(0),
        }
    }

    /// Insert a document as stored, bypassing validation. Useful for seeding
    /// legacy-shaped records.
    pub fn insert_raw(&self, vehicle: &str, key: &str, record: StoredRecord) {
        self.tree
            .borrow_mut()
            .entry(vehicle.to_string())
            .or_default()
            .insert(key.to_string(), record);
    }

    /// Total number of stored records.
    pub fn len(&self) -> usize {
        self.tree.borrow().values().map(|v| v.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn generate_key(&self) -> String {
        let next = self.next_key.get() + 1;
        self.next_key.set(next);
        format!("m{next:08}")
    }
}

impl RecordStore for MemoryStore {
    fn fetch_all(&self) -> Result<RecordTree, StoreError> {
        Ok(self.tree.borrow().clone())
    }

    fn fetch_vehicle(&self, vehicle: &str) -> Result<VehicleRecords, StoreError> {
        Ok(self.tree.borrow().get(vehicle).cloned().unwrap_or_default())
    }

    fn append(&self, vehicle: &str, record: &ServiceRecord) -> Result<String, StoreError> {
        let key = self.generate_key();
        self.insert_raw(vehicle, &key, StoredRecord::from(record.clone()));
        Ok(key)
    }

    fn replace(&self, vehicle: &str, key: &str, record: &ServiceRecord) -> Result<(), StoreError> {
        self.insert_raw(vehicle, key, StoredRecord::from(record.clone()));
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn record(vehicle: &str) -> ServiceRecord {
        ServiceRecord {
            id: "1".to_string(),
            vehicle_number: vehicle.to_string(),
            date: "2025-01-05".to_string(),
            kilometer_reading: None,
            spare_parts: Vec::new(),
            service_items: Vec::new(),
            total_spare_cost: Some(0.0),
            total_service_cost: Some(0.0),
            total_cost: Some(0.0),
        }
    }

    #[test]
    fn append_generates_increasing_keys() {
        let store = MemoryStore::new();
        let a = store.append("AP09", &record("AP09")).unwrap();
        let b = store.append("AP09", &record("AP09")).unwrap();
        assert!(a < b);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn unknown_vehicle_is_empty_not_an_error() {
        let store = MemoryStore::new();
        assert!(store.fetch_vehicle("NOPE").unwrap().is_empty());
        assert!(store.fetch_all().unwrap().is_empty());
    }

    #[test]
    fn replace_overwrites_in_place() {
        let store = MemoryStore::new();
        let key = store.append("AP09", &record("AP09")).unwrap();
        let mut updated = record("AP09");
        updated.total_cost = Some(99.0);
        store.replace("AP09", &key, &updated).unwrap();

        let stored = store.fetch_vehicle("AP09").unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[&key].clone().into_canonical().total_cost, Some(99.0));
    }
}
