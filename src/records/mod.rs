//! Service record data model.
//!
//! A [`ServiceRecord`] is one maintenance visit for one vehicle. Records are
//! stored under `services/{vehicleNumber}/{key}` and are only rewritten by
//! the legacy backfill. Field names serialize in camelCase to match the stored
//! documents.
//!
//! - [`legacy`] recognizes the older `serviceCharge` shape and converts it.
//! - [`entry`] validates form input and builds new records.

pub mod entry;
pub mod legacy;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

pub use entry::{
    FieldError, NewServiceEntry, generate_record_id, normalize_vehicle_number,
    validate_vehicle_number,
};
pub use legacy::{LEGACY_CHARGE_DESCRIPTION, LegacyServiceRecord, StoredRecord};

// ---------------------------------------------------------------------------
// Line items
// ---------------------------------------------------------------------------

/// A replaced spare part and what it cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SparePart {
    pub name: String,
    #[serde(default)]
    pub cost: f64,
}

impl SparePart {
    pub fn new(name: impl Into<String>, cost: f64) -> Self {
        Self {
            name: name.into(),
            cost,
        }
    }
}

/// A labour line on the service bill.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceItem {
    pub description: String,
    #[serde(default)]
    pub cost: f64,
}

impl ServiceItem {
    pub fn new(description: impl Into<String>, cost: f64) -> Self {
        Self {
            description: description.into(),
            cost,
        }
    }
}

// ---------------------------------------------------------------------------
// Service record
// ---------------------------------------------------------------------------

/// A stored service visit in the canonical (itemized) schema.
///
/// The `total*` fields are derived sums written at entry time. They are
/// optional because early documents omitted them; the accessors below fall
/// back to the itemized sums only when the stored value is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub vehicle_number: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kilometer_reading: Option<f64>,
    // The database drops empty arrays, so both lists default to empty.
    #[serde(default)]
    pub spare_parts: Vec<SparePart>,
    #[serde(default)]
    pub service_items: Vec<ServiceItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_spare_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_service_cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<f64>,
}

impl ServiceRecord {
    /// Spare-parts cost: the stored total, or the sum of the parts.
    pub fn spare_cost(&self) -> f64 {
        self.total_spare_cost
            .unwrap_or_else(|| self.spare_parts.iter().map(|p| p.cost).sum())
    }

    /// Labour cost: the stored total, or the sum of the service items.
    pub fn service_cost(&self) -> f64 {
        self.total_service_cost
            .unwrap_or_else(|| self.service_items.iter().map(|i| i.cost).sum())
    }

    /// Bill total. Recomputed only when the stored value is absent.
    pub fn total_cost(&self) -> f64 {
        self.total_cost
            .unwrap_or_else(|| self.spare_cost() + self.service_cost())
    }

    /// Copy with every `total*` field filled in, for display and export.
    pub fn with_resolved_totals(&self) -> ServiceRecord {
        ServiceRecord {
            total_spare_cost: Some(self.spare_cost()),
            total_service_cost: Some(self.service_cost()),
            total_cost: Some(self.total_cost()),
            ..self.clone()
        }
    }

    /// Calendar day of the service, ignoring any time-of-day component.
    pub fn service_date(&self) -> Option<NaiveDate> {
        parse_service_date(&self.date)
    }
}

/// Parse a stored service date into a calendar day.
///
/// Accepts `YYYY-MM-DD`, RFC 3339 date-times and offset-less
/// `YYYY-MM-DDTHH:MM:SS[.fff]`.
///
/// The day is taken in the offset the timestamp carries, not the host's
/// local zone: `2025-03-14T20:00:00.000Z` is 14 March on every machine.
/// Entry-form dates are stored as midnight UTC, so they always land on the
/// day that was typed.
pub fn parse_service_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|dt| dt.date())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str) -> ServiceRecord {
        ServiceRecord {
            id: "1".to_string(),
            vehicle_number: "KA01AB1234".to_string(),
            date: date.to_string(),
            kilometer_reading: None,
            spare_parts: vec![SparePart::new("Brake Pad", 450.0), SparePart::new("Oil Filter", 150.0)],
            service_items: vec![ServiceItem::new("General service", 800.0)],
            total_spare_cost: None,
            total_service_cost: None,
            total_cost: None,
        }
    }

    #[test]
    fn parses_plain_dates() {
        assert_eq!(
            parse_service_date("2025-01-05"),
            NaiveDate::from_ymd_opt(2025, 1, 5)
        );
    }

    #[test]
    fn parses_datetimes_to_their_calendar_day() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 14);
        assert_eq!(parse_service_date("2025-03-14T00:00:00.000Z"), day);
        assert_eq!(parse_service_date("2025-03-14T18:45:10+05:30"), day);
        assert_eq!(parse_service_date("2025-03-14T09:30:00"), day);
    }

    #[test]
    fn utc_evening_stays_on_its_utc_day() {
        let day = NaiveDate::from_ymd_opt(2025, 3, 14);
        assert_eq!(parse_service_date("2025-03-14T20:00:00.000Z"), day);
        assert_eq!(parse_service_date("2025-03-14T23:59:59.999Z"), day);
        assert_eq!(record("2025-03-14T20:00:00.000Z").service_date(), day);
    }

    #[test]
    fn resolved_totals_fill_missing_fields() {
        let resolved = record("2025-03-14").with_resolved_totals();
        assert_eq!(resolved.total_spare_cost, Some(600.0));
        assert_eq!(resolved.total_service_cost, Some(800.0));
        assert_eq!(resolved.total_cost, Some(1400.0));

        let mut stored = record("2025-03-14");
        stored.total_cost = Some(1500.0);
        assert_eq!(stored.with_resolved_totals().total_cost, Some(1500.0));
    }

    #[test]
    fn rejects_garbage_dates() {
        assert_eq!(parse_service_date(""), None);
        assert_eq!(parse_service_date("yesterday"), None);
        assert_eq!(parse_service_date("2025-13-01"), None);
    }

    #[test]
    fn totals_fall_back_to_itemized_sums() {
        let r = record("2025-01-05");
        assert_eq!(r.spare_cost(), 600.0);
        assert_eq!(r.service_cost(), 800.0);
        assert_eq!(r.total_cost(), 1400.0);
    }

    #[test]
    fn stored_totals_are_not_recomputed() {
        let mut r = record("2025-01-05");
        r.total_spare_cost = Some(50.0);
        r.total_service_cost = Some(100.0);
        r.total_cost = Some(150.0);
        assert_eq!(r.spare_cost(), 50.0);
        assert_eq!(r.service_cost(), 100.0);
        assert_eq!(r.total_cost(), 150.0);
    }

    #[test]
    fn deserializes_stored_document_without_empty_arrays() {
        let json = r#"{
            "id": "1736035200000",
            "vehicleNumber": "KA01AB1234",
            "date": "2025-01-05T00:00:00.000Z",
            "totalSpareCost": 0,
            "totalServiceCost": 300,
            "totalCost": 300
        }"#;
        let r: ServiceRecord = serde_json::from_str(json).unwrap();
        assert!(r.spare_parts.is_empty());
        assert!(r.service_items.is_empty());
        assert_eq!(r.total_cost(), 300.0);
    }

    #[test]
    fn serializes_camel_case() {
        let json = serde_json::to_string(&record("2025-01-05")).unwrap();
        assert!(json.contains("\"vehicleNumber\":\"KA01AB1234\""));
        assert!(json.contains("\"spareParts\""));
        assert!(!json.contains("totalCost"));
    }
}
