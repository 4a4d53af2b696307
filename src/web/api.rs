//! JSON API handlers for the web dashboard.
//!
//! Each handler corresponds to an API endpoint and returns a
//! `Response<Cursor<Vec<u8>>>` with JSON content. Read endpoints derive
//! their views from the cached snapshot; only the refresh and entry
//! endpoints go back to the database.

use std::io::Cursor;

use anyhow::{Context, Result};
use chrono::{DateTime, Datelike, Local, NaiveDate};
use serde::Serialize;
use tiny_http::{Response, StatusCode};

use crate::analytics::engine::today;
use crate::analytics::{
    self, DaySummary, MonthlyBucket, PartFrequency, ServiceSummary, YearView,
};
use crate::config::{self, DisplayConfig, WebConfig};
use crate::records::{
    FieldError, NewServiceEntry, ServiceRecord, generate_record_id, validate_vehicle_number,
};
use crate::store::migrate_legacy;

use super::{AppState, content_type_json};

// ---------------------------------------------------------------------------
// JSON response types
// ---------------------------------------------------------------------------

/// Summary API response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SummaryResponse {
    summary: ServiceSummary,
    top_parts: Vec<PartFrequency>,
    years: Vec<i32>,
    fetched_at: DateTime<Local>,
}

/// Monthly revenue list, newest first.
#[derive(Serialize)]
struct RevenueResponse {
    months: Vec<MonthlyBucket>,
}

/// Services on one day.
#[derive(Serialize)]
struct ServicesResponse {
    #[serde(flatten)]
    day: DaySummary,
    services: Vec<ServiceRecord>,
}

/// One vehicle's history.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VehicleResponse {
    vehicle_number: String,
    records: Vec<ServiceRecord>,
}

/// Result of storing a new service.
#[derive(Serialize)]
struct CreatedResponse {
    key: String,
    record: ServiceRecord,
}

/// Validation failure body.
#[derive(Serialize)]
struct ValidationResponse {
    errors: Vec<FieldError>,
}

/// Config API response. The auth token is never sent.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ConfigResponse {
    display: DisplayConfig,
    web: WebConfig,
    database_configured: bool,
    database_root: String,
}

/// Health API response.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct HealthResponse {
    store: String,
    reachable: bool,
    records: usize,
    legacy_records: usize,
    config_exists: bool,
    error: Option<String>,
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a JSON success response.
fn json_response<T: Serialize>(data: &T) -> Result<Response<Cursor<Vec<u8>>>> {
    json_response_with_status(data, 200)
}

fn json_response_with_status<T: Serialize>(
    data: &T,
    code: u16,
) -> Result<Response<Cursor<Vec<u8>>>> {
    let body = serde_json::to_string(data).context("failed to serialize JSON response")?;
    Ok(Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(code)))
}

fn bad_request(field: &str, message: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    json_response_with_status(
        &ValidationResponse {
            errors: vec![FieldError {
                field: field.to_string(),
                message: message.to_string(),
            }],
        },
        400,
    )
}

/// Extract a raw query parameter from a URL.
fn query_param<'a>(url: &'a str, key: &str) -> Option<&'a str> {
    url.split('?').nth(1)?.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        if k == key && !v.is_empty() { Some(v) } else { None }
    })
}

/// Parse `?year=YYYY`, falling back to the current year.
///
/// `Err` carries the rejected raw value.
fn parse_year_param(url: &str) -> Result<i32, String> {
    match query_param(url, "year") {
        None => Ok(today().year()),
        Some(raw) => raw.parse().map_err(|_| raw.to_string()),
    }
}

/// Parse `?date=YYYY-MM-DD`, falling back to today.
fn parse_date_param(url: &str) -> Result<NaiveDate, String> {
    match query_param(url, "date") {
        None => Ok(today()),
        Some(raw) => NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| raw.to_string()),
    }
}

/// Decode `%XX` escapes and `+` in a URL component.
///
/// Malformed escapes are kept literally.
pub(crate) fn percent_decode(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'%' if i + 2 < bytes.len() => {
                let hex = std::str::from_utf8(&bytes[i + 1..i + 3])
                    .ok()
                    .and_then(|h| u8::from_str_radix(h, 16).ok());
                match hex {
                    Some(b) => {
                        out.push(b);
                        i += 3;
                    }
                    None => {
                        out.push(b'%');
                        i += 1;
                    }
                }
            }
            b'+' => {
                out.push(b' ');
                i += 1;
            }
            b => {
                out.push(b);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

// ---------------------------------------------------------------------------
// API Handlers — analytics
// ---------------------------------------------------------------------------

/// `GET /api/summary` — overall totals, top parts and the years on record.
pub fn get_summary(state: &mut AppState) -> Result<Response<Cursor<Vec<u8>>>> {
    let top = state.config.display.top_parts;
    let snapshot = state.cache.get(state.store.as_ref())?;

    let resp = SummaryResponse {
        summary: snapshot.summary(),
        top_parts: snapshot.top_parts(top),
        years: snapshot.years(),
        fetched_at: snapshot.fetched_at(),
    };

    json_response(&resp)
}

/// `GET /api/revenue` — every month on record, newest first.
pub fn get_revenue(state: &mut AppState) -> Result<Response<Cursor<Vec<u8>>>> {
    let snapshot = state.cache.get(state.store.as_ref())?;
    json_response(&RevenueResponse {
        months: snapshot.monthly_revenue(),
    })
}

/// `GET /api/monthly?year=YYYY` — twelve-month grid for one year.
pub fn get_monthly(state: &mut AppState, url: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let year = match parse_year_param(url) {
        Ok(year) => year,
        Err(raw) => return bad_request("year", &format!("invalid year '{raw}'")),
    };
    let snapshot = state.cache.get(state.store.as_ref())?;
    let view: YearView = snapshot.year_view(year);
    json_response(&view)
}

/// `GET /api/services?date=YYYY-MM-DD` — services on one day (default today).
pub fn get_services(state: &mut AppState, url: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let day = match parse_date_param(url) {
        Ok(day) => day,
        Err(raw) => return bad_request("date", &format!("invalid date '{raw}', expected YYYY-MM-DD")),
    };
    let snapshot = state.cache.get(state.store.as_ref())?;

    json_response(&ServicesResponse {
        day: snapshot.day_summary(day),
        services: snapshot
            .records_on(day)
            .into_iter()
            .map(ServiceRecord::with_resolved_totals)
            .collect(),
    })
}

/// `POST /api/refresh` — drop the cached snapshot and refetch.
pub fn post_refresh(state: &mut AppState) -> Result<Response<Cursor<Vec<u8>>>> {
    state.cache.invalidate();
    let snapshot = state.cache.get(state.store.as_ref())?;

    let result = serde_json::json!({
        "records": snapshot.records().len(),
        "fetchedAt": snapshot.fetched_at(),
    });

    json_response(&result)
}

// ---------------------------------------------------------------------------
// API Handlers — vehicles
// ---------------------------------------------------------------------------

/// `GET /api/vehicles/{number}` — one vehicle's history, newest first.
pub fn get_vehicle(state: &mut AppState, vehicle: &str) -> Result<Response<Cursor<Vec<u8>>>> {
    let vehicle_number = match validate_vehicle_number(vehicle) {
        Ok(number) => number,
        Err(e) => return json_response_with_status(&ValidationResponse { errors: vec![e] }, 400),
    };

    let records = analytics::vehicle_history(state.store.as_ref(), &vehicle_number)
        .with_context(|| format!("failed to load history for {vehicle_number}"))?;

    json_response(&VehicleResponse {
        vehicle_number,
        records: records.iter().map(ServiceRecord::with_resolved_totals).collect(),
    })
}

/// `POST /api/vehicles/{number}/services` — validate and store a new visit.
///
/// Expects a JSON body like
/// `{ "date": "2025-03-05", "spareParts": [{"name": "Oil filter", "cost": 250}] }`.
pub fn post_service(
    state: &mut AppState,
    vehicle: &str,
    body: &str,
) -> Result<Response<Cursor<Vec<u8>>>> {
    let entry: NewServiceEntry = match serde_json::from_str(body) {
        Ok(entry) => entry,
        Err(e) => return bad_request("body", &format!("invalid JSON: {e}")),
    };

    let record = match entry.into_record(vehicle, generate_record_id()) {
        Ok(record) => record,
        Err(errors) => return json_response_with_status(&ValidationResponse { errors }, 400),
    };

    let key = state
        .store
        .append(&record.vehicle_number, &record)
        .context("failed to save service record")?;
    state.cache.invalidate();

    json_response_with_status(&CreatedResponse { key, record }, 201)
}

// ---------------------------------------------------------------------------
// API Handlers — config & health
// ---------------------------------------------------------------------------

/// `GET /api/config` — display and web settings the server runs with.
pub fn get_config(state: &mut AppState) -> Result<Response<Cursor<Vec<u8>>>> {
    let cfg = &state.config;
    json_response(&ConfigResponse {
        display: cfg.display.clone(),
        web: cfg.web.clone(),
        database_configured: !cfg.database.url.is_empty(),
        database_root: cfg.database.root.clone(),
    })
}

/// `GET /api/health` — database reachability and schema status.
pub fn get_health(state: &mut AppState) -> Result<Response<Cursor<Vec<u8>>>> {
    let config_exists = config::global_config_file()
        .map(|p| p.exists())
        .unwrap_or(false);

    let resp = match migrate_legacy(state.store.as_ref(), true) {
        Ok(report) => HealthResponse {
            store: state.store.describe(),
            reachable: true,
            records: report.scanned,
            legacy_records: report.legacy,
            config_exists,
            error: None,
        },
        Err(e) => HealthResponse {
            store: state.store.describe(),
            reachable: false,
            records: 0,
            legacy_records: 0,
            config_exists,
            error: Some(e.to_string()),
        },
    };

    json_response(&resp)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_param_extracts_value() {
        assert_eq!(query_param("/api/monthly?year=2025", "year"), Some("2025"));
        assert_eq!(
            query_param("/api/services?foo=bar&date=2025-03-05", "date"),
            Some("2025-03-05")
        );
        assert_eq!(query_param("/api/monthly", "year"), None);
        assert_eq!(query_param("/api/monthly?year=", "year"), None);
    }

    #[test]
    fn year_param_defaults_and_rejects() {
        assert_eq!(parse_year_param("/api/monthly?year=2024"), Ok(2024));
        assert_eq!(parse_year_param("/api/monthly"), Ok(today().year()));
        assert_eq!(parse_year_param("/api/monthly?year=abc"), Err("abc".to_string()));
    }

    #[test]
    fn date_param_defaults_and_rejects() {
        assert_eq!(
            parse_date_param("/api/services?date=2025-03-05"),
            Ok(NaiveDate::from_ymd_opt(2025, 3, 5).unwrap())
        );
        assert_eq!(parse_date_param("/api/services"), Ok(today()));
        assert!(parse_date_param("/api/services?date=2025-02-30").is_err());
    }

    #[test]
    fn percent_decoding() {
        assert_eq!(percent_decode("AP09%20AB%201234"), "AP09 AB 1234");
        assert_eq!(percent_decode("a+b"), "a b");
        assert_eq!(percent_decode("100%"), "100%");
        assert_eq!(percent_decode("%zz"), "%zz");
        assert_eq!(percent_decode("plain"), "plain");
    }

    #[test]
    fn validation_response_serializes() {
        let resp = ValidationResponse {
            errors: vec![FieldError {
                field: "date".to_string(),
                message: "Service date is required".to_string(),
            }],
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"field\":\"date\""));
    }

    #[test]
    fn config_response_hides_token() {
        let resp = ConfigResponse {
            display: DisplayConfig::default(),
            web: WebConfig::default(),
            database_configured: true,
            database_root: "services".to_string(),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(!json.contains("auth_token"));
        assert!(json.contains("\"databaseConfigured\":true"));
    }
}
