//! Firebase Realtime Database client over the REST interface.
//!
//! Every path maps to `{url}/{path}.json`; an auth token, when configured,
//! is sent as the `auth` query parameter. Uses the synchronous `ureq`
//! client with a per-request timeout and no retry.
//!
//! - `GET  services.json`               → whole tree (or `null`)
//! - `GET  services/{vehicle}.json`     → one vehicle (or `null`)
//! - `POST services/{vehicle}.json`     → `{"name": "<generated key>"}`
//! - `PUT  services/{vehicle}/{key}.json`

use std::time::Duration;

use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::debug;

use super::{RecordStore, RecordTree, StoreError, VehicleRecords};
use crate::config::DatabaseConfig;
use crate::records::ServiceRecord;

/// Response body of a push (`POST`).
#[derive(Debug, Deserialize)]
struct PushResponse {
    name: String,
}

/// Synchronous Firebase REST client.
#[derive(Debug, Clone)]
pub struct FirebaseStore {
    base_url: String,
    root: String,
    auth_token: Option<String>,
    timeout: Duration,
}

impl FirebaseStore {
    /// Build a client from the resolved database config.
    pub fn from_config(config: &DatabaseConfig) -> Result<Self, StoreError> {
        let base_url = config.url.trim().trim_end_matches('/').to_string();
        if base_url.is_empty() {
            return Err(StoreError::NotConfigured);
        }

        let auth_token = Some(config.auth_token.trim().to_string()).filter(|t| !t.is_empty());

        Ok(Self {
            base_url,
            root: config.root.trim_matches('/').to_string(),
            auth_token,
            timeout: Duration::from_millis(config.timeout_ms),
        })
    }

    /// Full REST URL for a path made of the given segments under the root.
    fn url(&self, segments: &[&str]) -> String {
        let mut path = self.root.clone();
        for segment in segments {
            path.push('/');
            path.push_str(&encode_segment(segment));
        }

        let mut url = format!("{}/{}.json", self.base_url, path);
        if let Some(token) = &self.auth_token {
            url.push_str("?auth=");
            url.push_str(&encode_segment(token));
        }
        url
    }

    fn get<T: DeserializeOwned + Default>(&self, segments: &[&str]) -> Result<T, StoreError> {
        let url = self.url(segments);
        debug!(path = %segments.join("/"), "GET");

        let resp = ureq::get(&url)
            .timeout(self.timeout)
            .call()
            .map_err(map_ureq_error)?;

        // A missing path comes back as JSON `null`.
        let value: Option<T> = resp.into_json().map_err(|e| StoreError::Decode {
            path: segments.join("/"),
            message: e.to_string(),
        })?;

        Ok(value.unwrap_or_default())
    }
}

impl RecordStore for FirebaseStore {
    fn fetch_all(&self) -> Result<RecordTree, StoreError> {
        self.get(&[])
    }

    fn fetch_vehicle(&self, vehicle: &str) -> Result<VehicleRecords, StoreError> {
        self.get(&[vehicle])
    }

    fn append(&self, vehicle: &str, record: &ServiceRecord) -> Result<String, StoreError> {
        let url = self.url(&[vehicle]);
        debug!(vehicle, "POST");

        let resp = ureq::post(&url)
            .timeout(self.timeout)
            .send_json(record)
            .map_err(map_ureq_error)?;

        let pushed: PushResponse = resp.into_json().map_err(|e| StoreError::Decode {
            path: vehicle.to_string(),
            message: e.to_string(),
        })?;

        Ok(pushed.name)
    }

    fn replace(&self, vehicle: &str, key: &str, record: &ServiceRecord) -> Result<(), StoreError> {
        let url = self.url(&[vehicle, key]);
        debug!(vehicle, key, "PUT");

        ureq::put(&url)
            .timeout(self.timeout)
            .send_json(record)
            .map_err(map_ureq_error)?;

        Ok(())
    }

    fn describe(&self) -> String {
        format!("{}/{}", self.base_url, self.root)
    }
}

/// Translate a `ureq` failure into the store taxonomy.
fn map_ureq_error(err: ureq::Error) -> StoreError {
    match err {
        ureq::Error::Status(401 | 403, _) => StoreError::PermissionDenied,
        ureq::Error::Status(code, resp) => StoreError::Status {
            code,
            body: resp.into_string().unwrap_or_default(),
        },
        ureq::Error::Transport(t) => StoreError::Transport(t.to_string()),
    }
}

/// Percent-encode a path segment, leaving unreserved characters as is.
fn encode_segment(segment: &str) -> String {
    let mut out = String::with_capacity(segment.len());
    for byte in segment.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'~' => out.push(byte as char),
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn config(url: &str, token: &str) -> DatabaseConfig {
        DatabaseConfig {
            url: url.to_string(),
            auth_token: token.to_string(),
            ..DatabaseConfig::default()
        }
    }

    #[test]
    fn empty_url_is_not_configured() {
        let err = FirebaseStore::from_config(&config("  ", "")).unwrap_err();
        assert!(matches!(err, StoreError::NotConfigured));
    }

    #[test]
    fn builds_rest_urls() {
        let store = FirebaseStore::from_config(&config("https://shop.firebaseio.com/", "")).unwrap();
        assert_eq!(store.url(&[]), "https://shop.firebaseio.com/services.json");
        assert_eq!(
            store.url(&["KA01AB1234"]),
            "https://shop.firebaseio.com/services/KA01AB1234.json"
        );
        assert_eq!(
            store.url(&["KA01AB1234", "-Nx1"]),
            "https://shop.firebaseio.com/services/KA01AB1234/-Nx1.json"
        );
    }

    #[test]
    fn appends_auth_token() {
        let store = FirebaseStore::from_config(&config("https://shop.firebaseio.com", "s3cr=t")).unwrap();
        assert_eq!(
            store.url(&["AP09"]),
            "https://shop.firebaseio.com/services/AP09.json?auth=s3cr%3Dt"
        );
    }

    #[test]
    fn encodes_spaces_in_vehicle_numbers() {
        assert_eq!(encode_segment("KA 01 AB"), "KA%2001%20AB");
        assert_eq!(encode_segment("abc-_~"), "abc-_~");
    }

    #[test]
    fn describe_shows_root() {
        let store = FirebaseStore::from_config(&config("https://shop.firebaseio.com", "")).unwrap();
        assert_eq!(store.describe(), "https://shop.firebaseio.com/services");
    }
}
