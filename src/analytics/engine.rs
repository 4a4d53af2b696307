//! Aggregation engine — grouping, ranking, summaries and date filters.
//!
//! Every function here is a pure read over a record slice: the same input
//! gives the same output and queries can run in any order.

use std::collections::HashMap;

use chrono::{Datelike, Local, NaiveDate};
use serde::Serialize;
use tracing::warn;

use crate::records::ServiceRecord;

/// Default length of the most-replaced-parts ranking.
pub const TOP_PARTS: usize = 5;

// ---------------------------------------------------------------------------
// Output types
// ---------------------------------------------------------------------------

/// Revenue for one calendar month.
///
/// `amount == service_cost + spare_cost` holds whenever every record's
/// stored total matches its components.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyBucket {
    /// Display label and grouping key, e.g. `"March 2025"`.
    pub month_year: String,
    /// Calendar month, 1–12.
    pub month: u32,
    pub year: i32,
    pub amount: f64,
    pub service_cost: f64,
    pub spare_cost: f64,
}

/// How often a spare-part name appears across all records.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartFrequency {
    pub name: String,
    pub count: usize,
}

/// Totals over a set of records.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceSummary {
    pub total_services: usize,
    pub total_revenue: f64,
    pub total_service_cost: f64,
    pub total_spare_cost: f64,
    /// Zero when there are no records.
    pub average_service_cost: f64,
}

/// Summary restricted to a single calendar day.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DaySummary {
    pub date: NaiveDate,
    #[serde(flatten)]
    pub summary: ServiceSummary,
}

// ---------------------------------------------------------------------------
// Monthly revenue
// ---------------------------------------------------------------------------

/// `"March 2025"` style label for the month containing `date`.
pub fn month_label(date: NaiveDate) -> String {
    date.format("%B %Y").to_string()
}

/// Group records into calendar-month buckets.
///
/// Day-of-month and time-of-day are discarded. Buckets come out in the order
/// their month is first seen; the formatter decides display order. Records
/// with an unparseable date are skipped.
pub fn monthly_revenue(records: &[ServiceRecord]) -> Vec<MonthlyBucket> {
    let mut buckets: Vec<MonthlyBucket> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for record in records {
        let Some(date) = record.service_date() else {
            warn!(id = %record.id, date = %record.date, "skipping record with unparseable date");
            continue;
        };

        let label = month_label(date);
        let slot = *index.entry(label).or_insert_with_key(|label| {
            buckets.push(MonthlyBucket {
                month_year: label.clone(),
                month: date.month(),
                year: date.year(),
                amount: 0.0,
                service_cost: 0.0,
                spare_cost: 0.0,
            });
            buckets.len() - 1
        });

        let bucket = &mut buckets[slot];
        bucket.amount += record.total_cost();
        bucket.service_cost += record.service_cost();
        bucket.spare_cost += record.spare_cost();
    }

    buckets
}

// ---------------------------------------------------------------------------
// Part frequency
// ---------------------------------------------------------------------------

/// Most frequently replaced parts, highest count first.
///
/// Names are compared verbatim (no trimming or case folding). Ties keep the
/// order in which the names were first encountered. At most `limit` entries.
pub fn part_frequency(records: &[ServiceRecord], limit: usize) -> Vec<PartFrequency> {
    let mut counts: Vec<PartFrequency> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for part in records.iter().flat_map(|r| &r.spare_parts) {
        match index.get(part.name.as_str()) {
            Some(&i) => counts[i].count += 1,
            None => {
                index.insert(&part.name, counts.len());
                counts.push(PartFrequency {
                    name: part.name.clone(),
                    count: 1,
                });
            }
        }
    }

    // sort_by is stable, so equal counts stay in first-seen order
    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts.truncate(limit);
    counts
}

// ---------------------------------------------------------------------------
// Summaries
// ---------------------------------------------------------------------------

/// Count and total the given records.
pub fn summarize<'a>(records: impl IntoIterator<Item = &'a ServiceRecord>) -> ServiceSummary {
    let mut summary = ServiceSummary::default();

    for record in records {
        summary.total_services += 1;
        summary.total_revenue += record.total_cost();
        summary.total_service_cost += record.service_cost();
        summary.total_spare_cost += record.spare_cost();
    }

    summary.average_service_cost = if summary.total_services == 0 {
        0.0
    } else {
        summary.total_revenue / summary.total_services as f64
    };

    summary
}

/// Summary of the records serviced on `day`.
pub fn summarize_day(records: &[ServiceRecord], day: NaiveDate) -> DaySummary {
    DaySummary {
        date: day,
        summary: summarize(records_on(records, day)),
    }
}

// ---------------------------------------------------------------------------
// Date filters
// ---------------------------------------------------------------------------

/// Records whose service date is the calendar day `day`.
///
/// Compares days only, so records stored with a time component still match.
pub fn records_on(records: &[ServiceRecord], day: NaiveDate) -> Vec<&ServiceRecord> {
    records
        .iter()
        .filter(|r| r.service_date() == Some(day))
        .collect()
}

/// Records serviced on the current local date.
pub fn records_today(records: &[ServiceRecord]) -> Vec<&ServiceRecord> {
    records_on(records, today())
}

/// Records serviced in the given calendar year.
pub fn records_in_year(records: &[ServiceRecord], year: i32) -> Vec<&ServiceRecord> {
    records
        .iter()
        .filter(|r| r.service_date().is_some_and(|d| d.year() == year))
        .collect()
}

/// The current local calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::SparePart;

    fn rec(date: &str, service: f64, spare: f64) -> ServiceRecord {
        ServiceRecord {
            id: date.to_string(),
            vehicle_number: "KA01AB1234".to_string(),
            date: date.to_string(),
            kilometer_reading: None,
            spare_parts: Vec::new(),
            service_items: Vec::new(),
            total_spare_cost: Some(spare),
            total_service_cost: Some(service),
            total_cost: Some(service + spare),
        }
    }

    fn with_parts(names: &[&str]) -> ServiceRecord {
        let mut r = rec("2025-01-01", 0.0, 0.0);
        r.spare_parts = names.iter().map(|n| SparePart::new(*n, 10.0)).collect();
        r
    }

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn january_scenario() {
        let records = vec![rec("2025-01-05", 100.0, 50.0), rec("2025-01-20", 200.0, 0.0)];
        let buckets = monthly_revenue(&records);

        assert_eq!(buckets.len(), 1);
        let jan = &buckets[0];
        assert_eq!(jan.month_year, "January 2025");
        assert_eq!((jan.month, jan.year), (1, 2025));
        assert_eq!(jan.amount, 350.0);
        assert_eq!(jan.service_cost, 300.0);
        assert_eq!(jan.spare_cost, 50.0);
    }

    #[test]
    fn buckets_split_by_month_and_year() {
        let records = vec![
            rec("2025-01-05", 10.0, 0.0),
            rec("2024-01-05T10:00:00.000Z", 20.0, 0.0),
            rec("2025-02-28T23:59:59+05:30", 30.0, 5.0),
        ];
        let buckets = monthly_revenue(&records);
        let labels: Vec<&str> = buckets.iter().map(|b| b.month_year.as_str()).collect();
        assert_eq!(labels, vec!["January 2025", "January 2024", "February 2025"]);
    }

    #[test]
    fn bucket_totals_match_record_totals() {
        let records = vec![
            rec("2025-01-05", 100.0, 50.0),
            rec("2025-03-02", 75.5, 20.25),
            rec("2024-12-31", 10.0, 0.0),
            rec("2025-03-30", 0.0, 300.0),
        ];
        let buckets = monthly_revenue(&records);

        let bucket_sum: f64 = buckets.iter().map(|b| b.amount).sum();
        let record_sum: f64 = records.iter().map(|r| r.total_cost()).sum();
        assert!((bucket_sum - record_sum).abs() < 1e-9);

        for b in &buckets {
            assert!((b.amount - (b.service_cost + b.spare_cost)).abs() < 1e-9);
        }
    }

    #[test]
    fn missing_component_totals_count_as_itemized_or_zero() {
        let mut r = rec("2025-05-05", 0.0, 0.0);
        r.total_service_cost = None;
        r.total_spare_cost = None;
        r.total_cost = None;
        let buckets = monthly_revenue(&[r]);
        assert_eq!(buckets[0].amount, 0.0);
        assert_eq!(buckets[0].service_cost, 0.0);
        assert_eq!(buckets[0].spare_cost, 0.0);
    }

    #[test]
    fn unparseable_dates_are_skipped() {
        let records = vec![rec("not a date", 10.0, 0.0), rec("2025-01-05", 5.0, 0.0)];
        let buckets = monthly_revenue(&records);
        assert_eq!(buckets.len(), 1);
        assert_eq!(buckets[0].amount, 5.0);
    }

    #[test]
    fn part_ranking_scenario() {
        let records = vec![with_parts(&["Brake Pad", "Oil Filter", "Brake Pad"])];
        assert_eq!(
            part_frequency(&records, TOP_PARTS),
            vec![
                PartFrequency { name: "Brake Pad".into(), count: 2 },
                PartFrequency { name: "Oil Filter".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn part_ranking_is_capped_and_stable_on_ties() {
        let records = vec![
            with_parts(&["A", "B", "C"]),
            with_parts(&["D", "E", "F", "G"]),
            with_parts(&["G"]),
        ];
        let ranking = part_frequency(&records, TOP_PARTS);
        let names: Vec<&str> = ranking.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["G", "A", "B", "C", "D"]);
        assert!(ranking.windows(2).all(|w| w[0].count >= w[1].count));
    }

    #[test]
    fn part_names_are_case_sensitive() {
        let records = vec![with_parts(&["Brake Pad", "brake pad", "Brake Pad "])];
        assert_eq!(part_frequency(&records, TOP_PARTS).len(), 3);
    }

    #[test]
    fn empty_summary_has_zero_average() {
        let summary = summarize(&Vec::<ServiceRecord>::new());
        assert_eq!(summary.total_services, 0);
        assert_eq!(summary.average_service_cost, 0.0);
        assert!(summary.average_service_cost.is_finite());
    }

    #[test]
    fn summary_averages_totals() {
        let records = vec![rec("2025-01-05", 100.0, 50.0), rec("2025-01-20", 200.0, 0.0)];
        let summary = summarize(&records);
        assert_eq!(summary.total_services, 2);
        assert_eq!(summary.total_revenue, 350.0);
        assert_eq!(summary.average_service_cost, 175.0);
        assert_eq!(summary.total_spare_cost, 50.0);
    }

    #[test]
    fn date_filter_matches_calendar_day() {
        let records = vec![
            rec("2025-01-05", 1.0, 0.0),
            rec("2025-01-05T17:30:00.000Z", 2.0, 0.0),
            rec("2025-01-06T00:00:00.000Z", 3.0, 0.0),
        ];
        let hits = records_on(&records, day(2025, 1, 5));
        assert_eq!(hits.len(), 2);
    }

    #[test]
    fn date_filter_is_idempotent() {
        let records = vec![
            rec("2025-01-05", 1.0, 0.0),
            rec("2025-01-06", 2.0, 0.0),
            rec("2025-01-05T08:00:00Z", 3.0, 0.0),
        ];
        let once: Vec<ServiceRecord> = records_on(&records, day(2025, 1, 5))
            .into_iter()
            .cloned()
            .collect();
        let twice: Vec<ServiceRecord> = records_on(&once, day(2025, 1, 5))
            .into_iter()
            .cloned()
            .collect();
        assert_eq!(once, twice);
    }

    #[test]
    fn day_summary_counts_only_that_day() {
        let records = vec![rec("2025-01-05", 100.0, 0.0), rec("2025-01-06", 50.0, 0.0)];
        let s = summarize_day(&records, day(2025, 1, 5));
        assert_eq!(s.summary.total_services, 1);
        assert_eq!(s.summary.total_revenue, 100.0);
    }

    #[test]
    fn today_filter_uses_local_date() {
        let today_str = today().format("%Y-%m-%d").to_string();
        let records = vec![rec(&today_str, 1.0, 0.0), rec("1999-01-01", 1.0, 0.0)];
        assert_eq!(records_today(&records).len(), 1);
    }

    #[test]
    fn year_filter() {
        let records = vec![rec("2024-12-31", 1.0, 0.0), rec("2025-01-01", 1.0, 0.0)];
        assert_eq!(records_in_year(&records, 2025).len(), 1);
        assert_eq!(records_in_year(&records, 2023).len(), 0);
    }
}
