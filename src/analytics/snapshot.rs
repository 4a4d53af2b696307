//! A fetched record set and the views derived from it.
//!
//! [`Snapshot`] is one full read of the database. Changing the selected date
//! or year re-derives views from the same snapshot; [`SnapshotCache`] decides
//! when a new read is due.

use std::collections::BTreeSet;
use std::time::{Duration, Instant};

use chrono::{DateTime, Datelike, Local, NaiveDate};
use tracing::info;

use super::engine::{
    self, DaySummary, MonthlyBucket, PartFrequency, ServiceSummary,
};
use super::formatter::{self, YearView};
use super::normalize;
use crate::records::ServiceRecord;
use crate::store::{RecordStore, StoreError};

/// All service records as of one fetch.
#[derive(Debug, Clone)]
pub struct Snapshot {
    records: Vec<ServiceRecord>,
    fetched_at: DateTime<Local>,
}

impl Snapshot {
    /// Read every record from the store.
    pub fn load(store: &dyn RecordStore) -> Result<Self, StoreError> {
        let tree = store.fetch_all()?;
        let records = normalize::flatten(tree);
        info!(records = records.len(), source = %store.describe(), "snapshot loaded");
        Ok(Self::from_records(records))
    }

    pub fn from_records(records: Vec<ServiceRecord>) -> Self {
        Self {
            records,
            fetched_at: Local::now(),
        }
    }

    pub fn records(&self) -> &[ServiceRecord] {
        &self.records
    }

    pub fn fetched_at(&self) -> DateTime<Local> {
        self.fetched_at
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn summary(&self) -> ServiceSummary {
        engine::summarize(&self.records)
    }

    pub fn top_parts(&self, limit: usize) -> Vec<PartFrequency> {
        engine::part_frequency(&self.records, limit)
    }

    /// Monthly revenue, newest month first.
    pub fn monthly_revenue(&self) -> Vec<MonthlyBucket> {
        let mut buckets = engine::monthly_revenue(&self.records);
        formatter::sort_reverse_chronological(&mut buckets);
        buckets
    }

    pub fn year_view(&self, year: i32) -> YearView {
        formatter::year_view(&engine::monthly_revenue(&self.records), year)
    }

    /// Records serviced on `day`, newest entry first.
    pub fn records_on(&self, day: NaiveDate) -> Vec<&ServiceRecord> {
        let mut hits = engine::records_on(&self.records, day);
        hits.sort_by(|a, b| b.id.cmp(&a.id));
        hits
    }

    pub fn day_summary(&self, day: NaiveDate) -> DaySummary {
        engine::summarize_day(&self.records, day)
    }

    /// Years that have at least one record, newest first.
    pub fn years(&self) -> Vec<i32> {
        let years: BTreeSet<i32> = self
            .records
            .iter()
            .filter_map(|r| r.service_date().map(|d| d.year()))
            .collect();
        years.into_iter().rev().collect()
    }
}

// ---------------------------------------------------------------------------
// Cache
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct Cached {
    snapshot: Snapshot,
    loaded_at: Instant,
}

/// Holds the last snapshot until it is older than the TTL.
#[derive(Debug)]
pub struct SnapshotCache {
    ttl: Duration,
    slot: Option<Cached>,
}

impl SnapshotCache {
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, slot: None }
    }

    /// The cached snapshot, reloading from `store` when missing or stale.
    pub fn get(&mut self, store: &dyn RecordStore) -> Result<&Snapshot, StoreError> {
        let fresh = matches!(&self.slot, Some(c) if c.loaded_at.elapsed() < self.ttl);
        if !fresh {
            self.slot = None;
        }

        let cached = match self.slot.take() {
            Some(cached) => cached,
            None => Cached {
                snapshot: Snapshot::load(store)?,
                loaded_at: Instant::now(),
            },
        };

        Ok(&self.slot.insert(cached).snapshot)
    }

    /// Drop the cached snapshot so the next read refetches.
    pub fn invalidate(&mut self) {
        self.slot = None;
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn rec(date: &str, total: f64) -> ServiceRecord {
        ServiceRecord {
            id: date.to_string(),
            vehicle_number: "AP09".to_string(),
            date: date.to_string(),
            kilometer_reading: None,
            spare_parts: Vec::new(),
            service_items: Vec::new(),
            total_spare_cost: Some(0.0),
            total_service_cost: Some(total),
            total_cost: Some(total),
        }
    }

    #[test]
    fn monthly_revenue_is_newest_first() {
        let snap = Snapshot::from_records(vec![
            rec("2024-11-10", 1.0),
            rec("2025-02-01", 1.0),
            rec("2025-01-15", 1.0),
        ]);
        let labels: Vec<String> = snap.monthly_revenue().into_iter().map(|b| b.month_year).collect();
        assert_eq!(labels, vec!["February 2025", "January 2025", "November 2024"]);
    }

    #[test]
    fn years_are_distinct_and_descending() {
        let snap = Snapshot::from_records(vec![
            rec("2023-05-01", 1.0),
            rec("2025-05-01", 1.0),
            rec("2025-06-01", 1.0),
        ]);
        assert_eq!(snap.years(), vec![2025, 2023]);
    }

    #[test]
    fn empty_snapshot_views_are_defined() {
        let snap = Snapshot::from_records(Vec::new());
        assert!(snap.is_empty());
        assert_eq!(snap.summary().average_service_cost, 0.0);
        assert_eq!(snap.year_view(2025).months.len(), 12);
        assert!(snap.top_parts(5).is_empty());
    }

    #[test]
    fn cache_reuses_snapshot_until_invalidated() {
        let store = MemoryStore::new();
        let mut cache = SnapshotCache::new(Duration::from_secs(3600));

        assert!(cache.get(&store).unwrap().is_empty());

        store.append("AP09", &rec("2025-01-01", 10.0)).unwrap();
        assert!(cache.get(&store).unwrap().is_empty(), "still the cached snapshot");

        cache.invalidate();
        assert_eq!(cache.get(&store).unwrap().records().len(), 1);
    }

    #[test]
    fn zero_ttl_always_refetches() {
        let store = MemoryStore::new();
        let mut cache = SnapshotCache::new(Duration::ZERO);

        assert!(cache.get(&store).unwrap().is_empty());
        store.append("AP09", &rec("2025-01-01", 10.0)).unwrap();
        assert_eq!(cache.get(&store).unwrap().records().len(), 1);
    }
}
