//! Legacy record shape and its conversion to the canonical schema.
//!
//! Early documents stored labour as a single `serviceCharge` number instead
//! of itemized `serviceItems`, and had no `totalSpareCost` /
//! `totalServiceCost`. Such documents are recognized explicitly and turned
//! into canonical [`ServiceRecord`]s; `autoserv migrate` writes the
//! converted form back to the database.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{ServiceItem, ServiceRecord, SparePart};

/// Description given to the single service item a legacy charge becomes.
pub const LEGACY_CHARGE_DESCRIPTION: &str = "Service charge";

/// A document in the pre-itemization schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LegacyServiceRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub vehicle_number: String,
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kilometer_reading: Option<f64>,
    #[serde(default)]
    pub spare_parts: Vec<SparePart>,
    #[serde(default)]
    pub service_charge: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_cost: Option<f64>,
}

impl LegacyServiceRecord {
    /// Convert to the canonical schema.
    ///
    /// The charge becomes one [`ServiceItem`] (omitted when zero) and the
    /// derived totals are backfilled. A stored `totalCost` is kept as is.
    pub fn into_canonical(self) -> ServiceRecord {
        let total_spare_cost: f64 = self.spare_parts.iter().map(|p| p.cost).sum();
        let total_service_cost = self.service_charge;

        let service_items = if self.service_charge > 0.0 {
            vec![ServiceItem::new(LEGACY_CHARGE_DESCRIPTION, self.service_charge)]
        } else {
            Vec::new()
        };

        ServiceRecord {
            id: self.id,
            vehicle_number: self.vehicle_number,
            date: self.date,
            kilometer_reading: self.kilometer_reading,
            spare_parts: self.spare_parts,
            service_items,
            total_spare_cost: Some(total_spare_cost),
            total_service_cost: Some(total_service_cost),
            total_cost: Some(
                self.total_cost
                    .unwrap_or(total_spare_cost + total_service_cost),
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Stored document
// ---------------------------------------------------------------------------

/// A record as read from the database, in whichever schema it was written.
#[derive(Debug, Clone, PartialEq)]
pub enum StoredRecord {
    Itemized(ServiceRecord),
    Legacy(LegacyServiceRecord),
}

impl StoredRecord {
    /// Classify and decode a raw document.
    ///
    /// A document is legacy when it carries `serviceCharge` and none of the
    /// itemized fields (`serviceItems`, `totalServiceCost`).
    pub fn from_value(value: Value) -> serde_json::Result<Self> {
        let is_legacy = value.get("serviceCharge").is_some()
            && value.get("serviceItems").is_none()
            && value.get("totalServiceCost").is_none();

        if is_legacy {
            serde_json::from_value(value).map(Self::Legacy)
        } else {
            serde_json::from_value(value).map(Self::Itemized)
        }
    }

    pub fn is_legacy(&self) -> bool {
        matches!(self, Self::Legacy(_))
    }

    /// The canonical form of this record, converting legacy documents.
    pub fn into_canonical(self) -> ServiceRecord {
        match self {
            Self::Itemized(record) => record,
            Self::Legacy(legacy) => legacy.into_canonical(),
        }
    }
}

impl From<ServiceRecord> for StoredRecord {
    fn from(record: ServiceRecord) -> Self {
        Self::Itemized(record)
    }
}

impl<'de> Deserialize<'de> for StoredRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Self::from_value(value).map_err(serde::de::Error::custom)
    }
}

impl Serialize for StoredRecord {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Itemized(record) => record.serialize(serializer),
            Self::Legacy(legacy) => legacy.serialize(serializer),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
