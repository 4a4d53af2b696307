/// Configuration system for autoserv.
///
/// Provides a layered configuration hierarchy:
///
/// 1. **Built-in defaults** — hardcoded in [`schema::AutoservConfig::default()`]
/// 2. **User global config** — `~/.autoserv/config.toml`
/// 3. **Project local config** — `.autoserv.toml` in the current working directory
/// 4. **Environment variables** — `AUTOSERV_*` overrides (highest precedence)
///
/// # Usage
///
/// ```rust,ignore
/// use autoserv::config;
///
/// let cfg = config::load();
/// let store = autoserv::store::from_config(&cfg.database)?;
/// ```
pub mod schema;

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};

pub use schema::{AutoservConfig, DatabaseConfig, DisplayConfig, LoggingConfig, WebConfig};

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// A config file that was skipped while loading.
///
/// Loading runs before the log subscriber exists, so problems are handed
/// back to the caller to report once logging is up.
#[derive(Debug, Clone)]
pub struct ConfigWarning {
    pub path: PathBuf,
    pub message: String,
}

/// Load the fully resolved configuration.
///
/// Merges all layers in order: defaults → global TOML → project TOML → env
/// vars. Skipped files are not reported; see [`load_reporting`].
pub fn load() -> AutoservConfig {
    load_reporting().0
}

/// Like [`load`], also returning the files that were skipped as malformed.
pub fn load_reporting() -> (AutoservConfig, Vec<ConfigWarning>) {
    load_layers(
        [global_config_path(), project_config_path()],
        |key| std::env::var(key).ok(),
    )
}

/// Merge the given TOML files key by key over the defaults, then apply env
/// overrides.
///
/// A later file only overrides the keys it sets. A file that fails to parse,
/// or holds a value of the wrong type, is skipped as a whole.
fn load_layers(
    paths: impl IntoIterator<Item = Option<PathBuf>>,
    lookup: impl Fn(&str) -> Option<String>,
) -> (AutoservConfig, Vec<ConfigWarning>) {
    let mut warnings = Vec::new();
    let mut merged = toml::Value::Table(toml::map::Map::new());

    for path in paths.into_iter().flatten() {
        let Ok(content) = fs::read_to_string(&path) else {
            continue;
        };
        match parse_layer(&content) {
            Ok(layer) => merge_toml(&mut merged, layer),
            Err(message) => warnings.push(ConfigWarning { path, message }),
        }
    }

    let mut config: AutoservConfig = merged.try_into().unwrap_or_default();
    apply_env_overrides(&mut config, lookup);

    (config, warnings)
}

/// Parse one config file into a TOML tree, checking it against the schema.
fn parse_layer(content: &str) -> std::result::Result<toml::Value, String> {
    let layer: toml::Value = toml::from_str(content).map_err(|e| e.to_string())?;
    layer
        .clone()
        .try_into::<AutoservConfig>()
        .map_err(|e| e.to_string())?;
    Ok(layer)
}

/// Recursively merge `overlay` into `base`. Tables merge per key; any other
/// value in `overlay` replaces the one in `base`.
fn merge_toml(base: &mut toml::Value, overlay: toml::Value) {
    match (base, overlay) {
        (toml::Value::Table(base), toml::Value::Table(overlay)) => {
            for (key, value) in overlay {
                match base.get_mut(&key) {
                    Some(existing) => merge_toml(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

// ---------------------------------------------------------------------------
// File paths
// ---------------------------------------------------------------------------

/// Path to the user global config: `~/.autoserv/config.toml`.
fn global_config_path() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".autoserv").join("config.toml"))
}

/// Path to the project local config: `.autoserv.toml` in the current directory.
fn project_config_path() -> Option<PathBuf> {
    std::env::current_dir()
        .ok()
        .map(|cwd| cwd.join(".autoserv.toml"))
}

/// Return the path to the global config file for display/init purposes.
pub fn global_config_file() -> Option<PathBuf> {
    global_config_path()
}

/// Return the path to the project config file for display purposes.
pub fn project_config_file() -> Option<PathBuf> {
    project_config_path()
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides (highest precedence layer).
///
/// Supported variables:
/// - `AUTOSERV_DATABASE_URL` — database base URL
/// - `AUTOSERV_AUTH_TOKEN` — database auth token
/// - `AUTOSERV_TIMEOUT_MS` — request timeout
/// - `AUTOSERV_CURRENCY` — currency symbol
/// - `AUTOSERV_WEB_ADDR` — dashboard listen address
/// - `AUTOSERV_LOG_LEVEL` — default log filter
///
/// `lookup` is `std::env::var` in production; tests pass a map.
fn apply_env_overrides(config: &mut AutoservConfig, lookup: impl Fn(&str) -> Option<String>) {
    if let Some(val) = lookup("AUTOSERV_DATABASE_URL")
        && !val.is_empty()
    {
        config.database.url = val;
    }
    if let Some(val) = lookup("AUTOSERV_AUTH_TOKEN") {
        config.database.auth_token = val;
    }
    if let Some(val) = lookup("AUTOSERV_TIMEOUT_MS")
        && let Ok(ms) = val.parse::<u64>()
    {
        config.database.timeout_ms = ms;
    }
    if let Some(val) = lookup("AUTOSERV_CURRENCY") {
        config.display.currency_symbol = val;
    }
    if let Some(val) = lookup("AUTOSERV_WEB_ADDR")
        && !val.is_empty()
    {
        config.web.addr = val;
    }
    if let Some(val) = lookup("AUTOSERV_LOG_LEVEL")
        && !val.is_empty()
    {
        config.logging.level = val;
    }
}

/// Check if a string value represents a truthy boolean.
fn is_truthy(val: &str) -> bool {
    matches!(
        val.to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

// ---------------------------------------------------------------------------
// Config init / set / reset
// ---------------------------------------------------------------------------

/// Write the default annotated config to `~/.autoserv/config.toml`.
///
/// Returns an error if the file already exists (use `force = true` to
/// overwrite).
pub fn init_config(force: bool) -> Result<PathBuf> {
    let path = global_config_path().context("could not determine home directory")?;

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}. Use --force to overwrite.",
            path.display()
        );
    }

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create ~/.autoserv/ directory")?;
    }

    fs::write(&path, AutoservConfig::default_toml()).context("failed to write config file")?;

    Ok(path)
}

/// Set a single config key in the global config file.
///
/// Reads the current global config (or defaults), updates the dotted key
/// (e.g. `database.url`), and writes the result back.
pub fn set_config_value(key: &str, value: &str) -> Result<()> {
    let path = global_config_path().context("could not determine home directory")?;

    let content = if path.exists() {
        fs::read_to_string(&path).context("failed to read config file")?
    } else {
        toml::to_string_pretty(&AutoservConfig::default())
            .context("failed to serialize default config")?
    };

    let mut root: toml::Value =
        toml::from_str(&content).context("failed to parse config as TOML value")?;
    set_toml_value(&mut root, key, value)?;

    // Reject edits that no longer deserialize (e.g. a string in a number slot).
    let updated = toml::to_string_pretty(&root).context("failed to serialize config")?;
    toml::from_str::<AutoservConfig>(&updated)
        .with_context(|| format!("invalid value for '{key}': {value}"))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).context("failed to create config directory")?;
    }
    fs::write(&path, updated).context("failed to write config file")?;

    Ok(())
}

/// Set a value in a TOML value tree using a dotted key path.
///
/// Missing sections are created, so a sparse hand-written file can still
/// receive any documented key.
fn set_toml_value(root: &mut toml::Value, key: &str, raw_value: &str) -> Result<()> {
    let parts: Vec<&str> = key.split('.').filter(|p| !p.is_empty()).collect();
    let Some((leaf, sections)) = parts.split_last() else {
        anyhow::bail!("empty config key");
    };

    let defaults = toml::Value::try_from(AutoservConfig::default())
        .context("failed to serialize default config")?;

    let mut current = root;
    let mut template = Some(&defaults);
    for &part in sections {
        template = template.and_then(|t| t.get(part));
        if template.is_none() {
            anyhow::bail!("config key not found: section '{part}' in '{key}'");
        }
        let table = current
            .as_table_mut()
            .with_context(|| format!("expected table above '{part}' in '{key}'"))?;
        current = table
            .entry(part.to_string())
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    }

    // The default value decides how the raw string is parsed.
    let Some(existing) = template.and_then(|t| t.get(*leaf)) else {
        anyhow::bail!("config key not found: '{key}'");
    };

    let new_value = match existing {
        toml::Value::Boolean(_) => toml::Value::Boolean(is_truthy(raw_value)),
        toml::Value::Integer(_) => {
            let n: i64 = raw_value
                .parse()
                .with_context(|| format!("expected integer for '{key}', got '{raw_value}'"))?;
            toml::Value::Integer(n)
        }
        toml::Value::Float(_) => {
            let f: f64 = raw_value
                .parse()
                .with_context(|| format!("expected float for '{key}', got '{raw_value}'"))?;
            toml::Value::Float(f)
        }
        _ => toml::Value::String(raw_value.to_string()),
    };

    current
        .as_table_mut()
        .with_context(|| format!("expected table for '{key}'"))?
        .insert(leaf.to_string(), new_value);
    Ok(())
}

/// Reset the global config to defaults (overwrite the file).
pub fn reset_config() -> Result<PathBuf> {
    init_config(true)
}

/// Show the effective (fully resolved) config as TOML.
///
/// The auth token is masked.
pub fn show_effective_config() -> Result<String> {
    let mut config = load();
    if !config.database.auth_token.is_empty() {
        config.database.auth_token = "********".to_string();
    }
    toml::to_string_pretty(&config).context("failed to serialize effective config")
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
