//! Service entry validation and record construction.
//!
//! Mirrors the rules the entry form enforces before a record is written:
//! vehicle numbers of 1–20 characters, non-empty part names and service
//! descriptions, non-negative costs and a real calendar date. All violations
//! are collected so the caller can show every field error at once.

use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::{ServiceItem, ServiceRecord, SparePart};

/// Maximum length of a vehicle number.
pub const MAX_VEHICLE_NUMBER_LEN: usize = 20;

/// Characters the database refuses in a path segment.
const FORBIDDEN_KEY_CHARS: &[char] = &['.', '#', '$', '[', ']', '/'];

/// A validation failure tied to one input field.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[error("{field}: {message}")]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Vehicle numbers
// ---------------------------------------------------------------------------

/// Canonical form of a vehicle number: trimmed and upper-cased.
pub fn normalize_vehicle_number(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// Validate and normalize a vehicle number.
pub fn validate_vehicle_number(raw: &str) -> Result<String, FieldError> {
    let number = normalize_vehicle_number(raw);

    if number.is_empty() {
        return Err(FieldError::new("vehicleNumber", "Vehicle number is required"));
    }
    if number.chars().count() > MAX_VEHICLE_NUMBER_LEN {
        return Err(FieldError::new("vehicleNumber", "Vehicle number too long"));
    }
    if number.contains(FORBIDDEN_KEY_CHARS) {
        return Err(FieldError::new(
            "vehicleNumber",
            "Vehicle number cannot contain . # $ [ ] /",
        ));
    }

    Ok(number)
}

// ---------------------------------------------------------------------------
// New entries
// ---------------------------------------------------------------------------

/// Form input for a new service visit.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewServiceEntry {
    /// Service day as `YYYY-MM-DD`.
    pub date: String,
    #[serde(default)]
    pub kilometer_reading: Option<f64>,
    #[serde(default)]
    pub spare_parts: Vec<SparePart>,
    #[serde(default)]
    pub service_items: Vec<ServiceItem>,
}

impl NewServiceEntry {
    /// Check every field, returning all violations.
    pub fn validate(&self) -> Result<(), Vec<FieldError>> {
        let mut errors = Vec::new();

        if self.date.trim().is_empty() {
            errors.push(FieldError::new("date", "Service date is required"));
        } else if NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d").is_err() {
            errors.push(FieldError::new("date", "Service date must be YYYY-MM-DD"));
        }

        if let Some(km) = self.kilometer_reading
            && !(km.is_finite() && km >= 0.0)
        {
            errors.push(FieldError::new(
                "kilometerReading",
                "Kilometer reading must be positive",
            ));
        }

        for (i, part) in self.spare_parts.iter().enumerate() {
            if part.name.trim().is_empty() {
                errors.push(FieldError::new(
                    format!("spareParts.{i}.name"),
                    "Part name is required",
                ));
            }
            if !is_valid_cost(part.cost) {
                errors.push(FieldError::new(
                    format!("spareParts.{i}.cost"),
                    "Cost must be positive",
                ));
            }
        }

        for (i, item) in self.service_items.iter().enumerate() {
            if item.description.trim().is_empty() {
                errors.push(FieldError::new(
                    format!("serviceItems.{i}.description"),
                    "Service description is required",
                ));
            }
            if !is_valid_cost(item.cost) {
                errors.push(FieldError::new(
                    format!("serviceItems.{i}.cost"),
                    "Cost must be positive",
                ));
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Validate and build the record to store for `vehicle`.
    ///
    /// Part names and descriptions are trimmed, totals computed, and the
    /// date stored as midnight UTC the way the entry form wrote it.
    pub fn into_record(self, vehicle: &str, id: String) -> Result<ServiceRecord, Vec<FieldError>> {
        let vehicle_result = validate_vehicle_number(vehicle);
        let entry_result = self.validate();

        let vehicle_number = match (vehicle_result, entry_result) {
            (Ok(number), Ok(())) => number,
            (vehicle_result, entry_result) => {
                let mut errors: Vec<FieldError> = vehicle_result.err().into_iter().collect();
                errors.extend(entry_result.err().unwrap_or_default());
                return Err(errors);
            }
        };

        let spare_parts: Vec<SparePart> = self
            .spare_parts
            .into_iter()
            .map(|p| SparePart::new(p.name.trim(), p.cost))
            .collect();
        let service_items: Vec<ServiceItem> = self
            .service_items
            .into_iter()
            .map(|i| ServiceItem::new(i.description.trim(), i.cost))
            .collect();

        let total_spare_cost: f64 = spare_parts.iter().map(|p| p.cost).sum();
        let total_service_cost: f64 = service_items.iter().map(|i| i.cost).sum();

        Ok(ServiceRecord {
            id,
            vehicle_number,
            date: format!("{}T00:00:00.000Z", self.date.trim()),
            kilometer_reading: self.kilometer_reading,
            spare_parts,
            service_items,
            total_spare_cost: Some(total_spare_cost),
            total_service_cost: Some(total_service_cost),
            total_cost: Some(total_spare_cost + total_service_cost),
        })
    }
}

/// A fresh record id: the current time in milliseconds.
pub fn generate_record_id() -> String {
    Utc::now().timestamp_millis().to_string()
}

fn is_valid_cost(cost: f64) -> bool {
    cost.is_finite() && cost >= 0.0
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> NewServiceEntry {
        NewServiceEntry {
            date: "2025-01-05".to_string(),
            kilometer_reading: Some(42_000.0),
            spare_parts: vec![SparePart::new("  Brake Pad ", 50.0)],
            service_items: vec![ServiceItem::new("General service", 100.0)],
        }
    }

    #[test]
    fn vehicle_number_is_normalized() {
        assert_eq!(validate_vehicle_number(" ka01ab1234 ").unwrap(), "KA01AB1234");
    }

    #[test]
    fn vehicle_number_rules() {
        assert!(validate_vehicle_number("   ").is_err());
        assert!(validate_vehicle_number(&"X".repeat(21)).is_err());
        assert!(validate_vehicle_number(&"X".repeat(20)).is_ok());
        assert!(validate_vehicle_number("KA.01").is_err());
        assert!(validate_vehicle_number("KA/01").is_err());
    }

    #[test]
    fn valid_entry_builds_record_with_totals() {
        let record = entry().into_record("ka01ab1234", "42".to_string()).unwrap();

        assert_eq!(record.id, "42");
        assert_eq!(record.vehicle_number, "KA01AB1234");
        assert_eq!(record.date, "2025-01-05T00:00:00.000Z");
        assert_eq!(record.spare_parts[0].name, "Brake Pad");
        assert_eq!(record.total_spare_cost, Some(50.0));
        assert_eq!(record.total_service_cost, Some(100.0));
        assert_eq!(record.total_cost, Some(150.0));
    }

    #[test]
    fn collects_every_field_error() {
        let bad = NewServiceEntry {
            date: "05/01/2025".to_string(),
            kilometer_reading: Some(-1.0),
            spare_parts: vec![SparePart::new("", -5.0)],
            service_items: vec![ServiceItem::new(" ", f64::NAN)],
        };
        let errors = bad.into_record("", "1".to_string()).unwrap_err();
        let fields: Vec<&str> = errors.iter().map(|e| e.field.as_str()).collect();

        assert_eq!(
            fields,
            vec![
                "vehicleNumber",
                "date",
                "kilometerReading",
                "spareParts.0.name",
                "spareParts.0.cost",
                "serviceItems.0.description",
                "serviceItems.0.cost",
            ]
        );
    }

    #[test]
    fn empty_date_is_required() {
        let mut e = entry();
        e.date = String::new();
        let errors = e.validate().unwrap_err();
        assert_eq!(errors[0].to_string(), "date: Service date is required");
    }

    #[test]
    fn entry_without_items_is_valid() {
        let e = NewServiceEntry {
            date: "2025-02-01".to_string(),
            ..Default::default()
        };
        let record = e.into_record("AP09", "1".to_string()).unwrap();
        assert_eq!(record.total_cost, Some(0.0));
    }

    #[test]
    fn record_ids_are_numeric() {
        assert!(generate_record_id().parse::<i64>().is_ok());
    }
}
