/// Configuration schema and defaults for autoserv.
///
/// Defines the TOML-serializable configuration structure with sections
/// `[database]`, `[display]`, `[web]` and `[logging]`.
///
/// Every field has a built-in default; users only set what they want to
/// change.
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level config
// ---------------------------------------------------------------------------

/// Top-level autoserv configuration.
///
/// Maps directly to `~/.autoserv/config.toml` and `.autoserv.toml`. Missing
/// sections and fields fall back to built-in defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoservConfig {
    pub database: DatabaseConfig,
    pub display: DisplayConfig,
    pub web: WebConfig,
    pub logging: LoggingConfig,
}

// ---------------------------------------------------------------------------
// [database]
// ---------------------------------------------------------------------------

/// Realtime database connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database base URL, e.g. `https://my-shop-default-rtdb.firebaseio.com`.
    pub url: String,
    /// Auth token passed as the `auth` query parameter. Empty for none.
    pub auth_token: String,
    /// Collection holding the per-vehicle record trees.
    pub root: String,
    /// Per-request timeout (milliseconds).
    pub timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            auth_token: String::new(),
            root: "services".to_string(),
            timeout_ms: 10_000,
        }
    }
}

// ---------------------------------------------------------------------------
// [display]
// ---------------------------------------------------------------------------

/// How reports are rendered.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Heading shown on reports and the dashboard.
    pub shop_name: String,
    /// Prefix for formatted amounts.
    pub currency_symbol: String,
    /// Length of the most-replaced-parts ranking.
    pub top_parts: usize,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            shop_name: "Subbaiah Multi Brand Auto".to_string(),
            currency_symbol: "₹".to_string(),
            top_parts: 5,
        }
    }
}

// ---------------------------------------------------------------------------
// [web]
// ---------------------------------------------------------------------------

/// Dashboard server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WebConfig {
    /// Listen address.
    pub addr: String,
    /// How long a fetched snapshot is reused before refetching (seconds).
    pub snapshot_ttl_secs: u64,
    /// Open the dashboard in the default browser on start.
    pub open_browser: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            addr: "127.0.0.1:9747".to_string(),
            snapshot_ttl_secs: 60,
            open_browser: true,
        }
    }
}

// ---------------------------------------------------------------------------
// [logging]
// ---------------------------------------------------------------------------

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset: `"error"`, `"warn"`,
    /// `"info"`, `"debug"` or any `tracing` filter directive.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Default TOML content
// ---------------------------------------------------------------------------

impl AutoservConfig {
    /// Generate the annotated default TOML config file content.
    ///
    /// Written by `autoserv config init`. Parses back into
    /// [`AutoservConfig::default()`].
    pub fn default_toml() -> String {
        r#"# autoserv Configuration
#
# Configuration hierarchy (highest precedence wins):
#   1. Environment variables (AUTOSERV_*)
#   2. Project config (.autoserv.toml in current directory)
#   3. User global config (~/.autoserv/config.toml)
#   4. Built-in defaults

[database]
url = ""              # e.g. https://my-shop-default-rtdb.firebaseio.com
auth_token = ""       # database secret or ID token; empty for public rules
root = "services"
timeout_ms = 10000

[display]
shop_name = "Subbaiah Multi Brand Auto"
currency_symbol = "₹"
top_parts = 5

[web]
addr = "127.0.0.1:9747"
snapshot_ttl_secs = 60
open_browser = true

[logging]
level = "warn"        # overridden by RUST_LOG
"#
        .to_string()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_toml_parses_back() {
        let config: AutoservConfig = toml::from_str(&AutoservConfig::default_toml()).unwrap();
        let defaults = AutoservConfig::default();
        assert_eq!(config.database.root, defaults.database.root);
        assert_eq!(config.database.timeout_ms, defaults.database.timeout_ms);
        assert_eq!(config.display.currency_symbol, defaults.display.currency_symbol);
        assert_eq!(config.display.top_parts, 5);
        assert_eq!(config.web.addr, defaults.web.addr);
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config: AutoservConfig = toml::from_str(
            r#"
[database]
url = "https://shop.firebaseio.com"
"#,
        )
        .unwrap();
        assert_eq!(config.database.url, "https://shop.firebaseio.com");
        assert_eq!(config.database.root, "services");
        assert_eq!(config.web.snapshot_ttl_secs, 60);
    }

    #[test]
    fn empty_file_is_all_defaults() {
        let config: AutoservConfig = toml::from_str("").unwrap();
        assert!(config.database.url.is_empty());
        assert!(config.web.open_browser);
    }
}
