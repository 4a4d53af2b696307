//! Embedded web dashboard for autoserv.
//!
//! Provides a lightweight HTTP server (sync, via `tiny_http`) that serves:
//! - A single-page dashboard: summary, revenue charts, daily view, vehicle
//!   history and a service entry form
//! - JSON API endpoints backed by one cached [`Snapshot`]
//!
//! Launched via `autoserv web` (default: `http://127.0.0.1:9747`).
//!
//! [`Snapshot`]: crate::analytics::Snapshot

mod api;
mod frontend;

use std::io::Cursor;
use std::time::Duration;

use anyhow::{Context, Result};
use tiny_http::{Header, Method, Response, Server, StatusCode};
use tracing::{info, warn};

use crate::analytics::SnapshotCache;
use crate::config::AutoservConfig;
use crate::store::{RecordStore, StoreError};

// ---------------------------------------------------------------------------
// Server state
// ---------------------------------------------------------------------------

/// Everything request handlers need: the store, the cached snapshot and
/// the config the server started with.
pub struct AppState {
    store: Box<dyn RecordStore>,
    cache: SnapshotCache,
    config: AutoservConfig,
}

impl AppState {
    pub fn new(store: Box<dyn RecordStore>, config: AutoservConfig) -> Self {
        let ttl = Duration::from_secs(config.web.snapshot_ttl_secs);
        Self {
            store,
            cache: SnapshotCache::new(ttl),
            config,
        }
    }
}

// ---------------------------------------------------------------------------
// Server entry point
// ---------------------------------------------------------------------------

/// Start the web dashboard server on the given address.
///
/// Blocks the current thread. Handles requests sequentially, so the cached
/// snapshot needs no locking. Per-request errors become JSON error
/// responses without stopping the server.
pub fn serve(mut state: AppState, addr: &str) -> Result<()> {
    let server = Server::http(addr)
        .map_err(|e| anyhow::anyhow!("failed to start HTTP server on {addr}: {e}"))?;

    println!("autoserv dashboard running at http://{addr}");
    println!("Press Ctrl+C to stop.\n");
    info!(%addr, store = %state.store.describe(), "dashboard started");

    if state.config.web.open_browser {
        let url = format!("http://{addr}");
        if let Err(e) = open_browser(&url) {
            warn!(error = %e, "could not open browser");
        }
    }

    for mut request in server.incoming_requests() {
        let method = request.method().clone();
        let url = request.url().to_string();

        // Read body up-front for methods that carry one
        let body = if matches!(method, Method::Put | Method::Post | Method::Patch) {
            let mut buf = String::new();
            if let Err(e) = request.as_reader().read_to_string(&mut buf) {
                warn!(%url, error = %e, "failed to read request body");
            }
            Some(buf)
        } else {
            None
        };

        let resp = match dispatch(&mut state, &method, &url, body.as_deref()) {
            Ok(resp) => resp,
            Err(e) => error_response(&e),
        };
        let status = resp.status_code().0;
        if let Err(e) = request.respond(resp) {
            warn!(%url, error = %e, "failed to send response");
        }

        info!(%method, %url, status, "request");
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Dispatch an incoming request to the appropriate handler.
fn dispatch(
    state: &mut AppState,
    method: &Method,
    url: &str,
    body: Option<&str>,
) -> Result<Response<Cursor<Vec<u8>>>> {
    // Strip query string for path matching
    let path = url.split('?').next().unwrap_or(url);

    match (method, path) {
        // Frontend
        (&Method::Get, "/") | (&Method::Get, "/index.html") => Ok(serve_frontend()),

        // API — Analytics
        (&Method::Get, "/api/summary") => api::get_summary(state),
        (&Method::Get, "/api/revenue") => api::get_revenue(state),
        (&Method::Get, "/api/monthly") => api::get_monthly(state, url),
        (&Method::Get, "/api/services") => api::get_services(state, url),
        (&Method::Post, "/api/refresh") => api::post_refresh(state),

        // API — Configuration & health
        (&Method::Get, "/api/config") => api::get_config(state),
        (&Method::Get, "/api/health") => api::get_health(state),

        // API — Vehicles
        (&Method::Get, p) if p.starts_with("/api/vehicles/") => {
            match vehicle_route(p) {
                Some((vehicle, None)) => api::get_vehicle(state, &vehicle),
                _ => Ok(not_found()),
            }
        }
        (&Method::Post, p) if p.starts_with("/api/vehicles/") => match vehicle_route(p) {
            Some((vehicle, Some("services"))) => {
                api::post_service(state, &vehicle, body.unwrap_or("{}"))
            }
            _ => Ok(not_found()),
        },

        // 404
        _ => Ok(not_found()),
    }
}

/// Split `/api/vehicles/{number}[/{rest}]` into the decoded vehicle number
/// and the optional trailing segment.
fn vehicle_route(path: &str) -> Option<(String, Option<&str>)> {
    let rest = path.strip_prefix("/api/vehicles/")?;
    let (raw, tail) = match rest.split_once('/') {
        Some((raw, tail)) => (raw, Some(tail)),
        None => (rest, None),
    };
    if raw.is_empty() {
        return None;
    }
    Some((api::percent_decode(raw), tail))
}

// ---------------------------------------------------------------------------
// Response helpers
// ---------------------------------------------------------------------------

/// Serve the embedded single-page frontend.
fn serve_frontend() -> Response<Cursor<Vec<u8>>> {
    let html = frontend::INDEX_HTML;
    Response::from_data(html.as_bytes().to_vec())
        .with_header(content_type_html())
        .with_status_code(StatusCode(200))
}

/// 404 response.
fn not_found() -> Response<Cursor<Vec<u8>>> {
    let body = r#"{"error": "not found"}"#;
    Response::from_data(body.as_bytes().to_vec())
        .with_header(content_type_json())
        .with_status_code(StatusCode(404))
}

/// Map a handler error to a JSON error response.
///
/// Database permission failures are 403; everything else is 500.
fn error_response(err: &anyhow::Error) -> Response<Cursor<Vec<u8>>> {
    let code = match err.downcast_ref::<StoreError>() {
        Some(StoreError::PermissionDenied) => 403,
        _ => 500,
    };
    warn!(error = %format!("{err:#}"), code, "request failed");
    let body = serde_json::json!({ "error": format!("{err:#}") }).to_string();
    Response::from_data(body.into_bytes())
        .with_header(content_type_json())
        .with_status_code(StatusCode(code))
}

/// JSON content type header.
pub(crate) fn content_type_json() -> Header {
    Header::from_bytes("Content-Type", "application/json; charset=utf-8").unwrap()
}

/// HTML content type header.
fn content_type_html() -> Header {
    Header::from_bytes("Content-Type", "text/html; charset=utf-8").unwrap()
}

/// Attempt to open a URL in the system default browser.
fn open_browser(url: &str) -> Result<()> {
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", url])
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(url)
            .spawn()
            .context("failed to open browser")?;
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::NewServiceEntry;
    use crate::store::MemoryStore;

    fn state_with(records: &[(&str, &str, f64)]) -> AppState {
        let store = MemoryStore::new();
        for (i, (vehicle, date, cost)) in records.iter().enumerate() {
            let entry = NewServiceEntry {
                date: date.to_string(),
                service_items: vec![crate::records::ServiceItem::new("General service", *cost)],
                ..Default::default()
            };
            let record = entry.into_record(vehicle, format!("{}", 1000 + i)).unwrap();
            store.append(&record.vehicle_number, &record).unwrap();
        }
        AppState::new(Box::new(store), AutoservConfig::default())
    }

    fn body_json(resp: Response<Cursor<Vec<u8>>>) -> serde_json::Value {
        let mut reader = resp.into_reader();
        let mut buf = String::new();
        std::io::Read::read_to_string(&mut reader, &mut buf).unwrap();
        serde_json::from_str(&buf).unwrap()
    }

    #[test]
    fn vehicle_route_splits_segments() {
        assert_eq!(
            vehicle_route("/api/vehicles/AP09%20AB"),
            Some(("AP09 AB".to_string(), None))
        );
        assert_eq!(
            vehicle_route("/api/vehicles/AP09/services"),
            Some(("AP09".to_string(), Some("services")))
        );
        assert_eq!(vehicle_route("/api/vehicles/"), None);
        assert_eq!(vehicle_route("/api/other"), None);
    }

    #[test]
    fn unknown_paths_are_404() {
        let mut state = state_with(&[]);
        let resp = dispatch(&mut state, &Method::Get, "/nope", None).unwrap();
        assert_eq!(resp.status_code().0, 404);
        let resp = dispatch(&mut state, &Method::Get, "/api/vehicles/AP09/extra", None).unwrap();
        assert_eq!(resp.status_code().0, 404);
    }

    #[test]
    fn frontend_is_served() {
        let mut state = state_with(&[]);
        let resp = dispatch(&mut state, &Method::Get, "/", None).unwrap();
        assert_eq!(resp.status_code().0, 200);
    }

    #[test]
    fn summary_endpoint_reports_totals() {
        let mut state = state_with(&[("AP09", "2025-01-05", 300.0), ("KA01", "2025-01-20", 100.0)]);
        let resp = dispatch(&mut state, &Method::Get, "/api/summary", None).unwrap();
        assert_eq!(resp.status_code().0, 200);

        let json = body_json(resp);
        assert_eq!(json["summary"]["totalServices"], 2);
        assert_eq!(json["summary"]["totalRevenue"], 400.0);
        assert_eq!(json["summary"]["averageServiceCost"], 200.0);
    }

    #[test]
    fn posting_a_service_refreshes_views() {
        let mut state = state_with(&[("AP09", "2025-01-05", 300.0)]);
        dispatch(&mut state, &Method::Get, "/api/summary", None).unwrap();

        let body = r#"{"date":"2025-02-01","serviceItems":[{"description":"Wash","cost":50}]}"#;
        let resp = dispatch(
            &mut state,
            &Method::Post,
            "/api/vehicles/ap09/services",
            Some(body),
        )
        .unwrap();
        assert_eq!(resp.status_code().0, 201);

        let json = body_json(dispatch(&mut state, &Method::Get, "/api/summary", None).unwrap());
        assert_eq!(json["summary"]["totalServices"], 2);
    }

    #[test]
    fn rows_carry_itemized_totals_when_stored_total_is_missing() {
        let tree: crate::store::RecordTree = serde_json::from_value(serde_json::json!({
            "AP09": {
                "-Nc1": {
                    "id": "1",
                    "vehicleNumber": "AP09",
                    "date": "2025-03-01",
                    "spareParts": [{"name": "Brake Pad", "cost": 400}],
                    "serviceItems": [{"description": "Labour", "cost": 150}]
                }
            }
        }))
        .unwrap();
        let mut state = AppState::new(
            Box::new(MemoryStore::with_tree(tree)),
            AutoservConfig::default(),
        );

        let day = body_json(
            dispatch(&mut state, &Method::Get, "/api/services?date=2025-03-01", None).unwrap(),
        );
        assert_eq!(day["totalRevenue"], 550.0);
        assert_eq!(day["services"][0]["totalCost"], 550.0);
        assert_eq!(day["services"][0]["totalSpareCost"], 400.0);

        let history =
            body_json(dispatch(&mut state, &Method::Get, "/api/vehicles/AP09", None).unwrap());
        assert_eq!(history["records"][0]["totalCost"], 550.0);
    }

    #[test]
    fn store_permission_errors_map_to_403() {
        let err = anyhow::Error::new(StoreError::PermissionDenied);
        assert_eq!(error_response(&err).status_code().0, 403);

        let err = anyhow::anyhow!("boom");
        assert_eq!(error_response(&err).status_code().0, 500);
    }
}
