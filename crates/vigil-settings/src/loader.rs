//! Where settings come from, lowest priority first:
//!
//! 1. compiled [`VigilSettings::default()`]
//! 2. `~/.vigil/settings.json`, merged key by key over the defaults, so a
//!    file holding only `{"diagnosis": {"backend": "local"}}` is complete
//! 3. `VIGIL_*` environment variables
//!
//! The merged result is validated once at the end. Command-line flags are
//! layered on top by the binary.

use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde_json::Value;
use tracing::debug;

use crate::errors::{Result, SettingsError};
use crate::types::{DiagnosisBackend, VigilSettings};

/// Data directory (`~/.vigil`).
pub fn vigil_home() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".to_string());
    PathBuf::from(home).join(".vigil")
}

/// Resolve the path to the settings file (`~/.vigil/settings.json`).
pub fn settings_path() -> PathBuf {
    vigil_home().join("settings.json")
}

/// Resolve the configured database path against the data directory.
pub fn resolve_db_path(settings: &VigilSettings) -> PathBuf {
    let configured = Path::new(&settings.database.path);
    if configured.is_absolute() {
        configured.to_path_buf()
    } else {
        vigil_home().join(configured)
    }
}

/// Defaults, `~/.vigil/settings.json`, then the environment.
pub fn load_settings() -> Result<VigilSettings> {
    load_settings_from_path(&settings_path())
}

/// Same as [`load_settings`] with an explicit file.
///
/// A missing file is not an error; an unreadable or malformed one is.
pub fn load_settings_from_path(path: &Path) -> Result<VigilSettings> {
    let mut settings = load_file_layer(path)?;
    apply_env_overrides(&mut settings);
    validate(&settings)?;
    Ok(settings)
}

/// Defaults merged with the settings file, without env overrides.
fn load_file_layer(path: &Path) -> Result<VigilSettings> {
    let defaults = serde_json::to_value(VigilSettings::default())?;

    let merged = if path.exists() {
        debug!(path = %path.display(), "merging settings file over defaults");
        let content = std::fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let user: Value = serde_json::from_str(&content).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        deep_merge(defaults, user)
    } else {
        debug!(path = %path.display(), "no settings file, compiled defaults apply");
        defaults
    };

    Ok(serde_json::from_value(merged)?)
}

/// Overlay `source` on `target`.
///
/// Objects merge per key, recursively. A `null` in `source` keeps the
/// target's value. Anything else in `source` (arrays included) replaces the
/// target wholesale.
pub fn deep_merge(target: Value, source: Value) -> Value {
    match (target, source) {
        (Value::Object(mut base), Value::Object(overlay)) => {
            for (key, value) in overlay.into_iter().filter(|(_, v)| !v.is_null()) {
                let merged = match base.remove(&key) {
                    Some(existing) => deep_merge(existing, value),
                    None => value,
                };
                let _ = base.insert(key, merged);
            }
            Value::Object(base)
        }
        (_, replacement) => replacement,
    }
}

/// Reject settings that cannot produce a working service.
pub fn validate(settings: &VigilSettings) -> Result<()> {
    if settings.database.path.trim().is_empty() {
        return Err(SettingsError::InvalidValue("database.path is empty".into()));
    }
    if settings.database.pool_size == 0 {
        return Err(SettingsError::InvalidValue("database.poolSize must be at least 1".into()));
    }
    if settings.diagnosis.timeout_ms == 0 {
        return Err(SettingsError::InvalidValue("diagnosis.timeoutMs must be positive".into()));
    }
    if settings.diagnosis.backend == DiagnosisBackend::Webhook {
        let url = settings.diagnosis.url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(SettingsError::InvalidValue(format!(
                "diagnosis.url must be an http(s) URL, got {url:?}"
            )));
        }
    }
    Ok(())
}

/// Overlay `VIGIL_*` variables from the process environment.
///
/// A variable that does not parse or is out of range is logged and skipped.
pub fn apply_env_overrides(settings: &mut VigilSettings) {
    apply_overrides_with(settings, &|name| std::env::var(name).ok());
}

/// [`apply_env_overrides`] against an arbitrary lookup, for tests.
pub fn apply_overrides_with(settings: &mut VigilSettings, lookup: &dyn Fn(&str) -> Option<String>) {
    let env = Env(lookup);

    if let Some(host) = env.text("VIGIL_HOST") {
        settings.server.host = host;
    }
    if let Some(port) = env.number("VIGIL_PORT", 1..=u16::MAX) {
        settings.server.port = port;
    }

    if let Some(path) = env.text("VIGIL_DB_PATH") {
        settings.database.path = path;
    }
    if let Some(size) = env.number("VIGIL_DB_POOL_SIZE", 1..=256_u32) {
        settings.database.pool_size = size;
    }

    // Deployments predating the namespaced variable still set this one.
    if let Some(url) = env.text("N8N_WEBHOOK_URL") {
        settings.diagnosis.url = url;
    }
    if let Some(url) = env.text("VIGIL_DIAGNOSIS_URL") {
        settings.diagnosis.url = url;
    }
    if let Some(backend) = env.parsed("VIGIL_DIAGNOSIS_BACKEND", parse_backend) {
        settings.diagnosis.backend = backend;
    }
    if let Some(ms) = env.number("VIGIL_DIAGNOSIS_TIMEOUT_MS", 100..=600_000_u64) {
        settings.diagnosis.timeout_ms = ms;
    }

    if let Some(level) = env.text("VIGIL_LOG_LEVEL") {
        settings.logging.level = level;
    }
    if let Some(json) = env.parsed("VIGIL_LOG_JSON", parse_flag) {
        settings.logging.json = json;
    }
}

/// `true`/`1`/`yes`/`on` or `false`/`0`/`no`/`off`, any case.
fn parse_flag(raw: &str) -> Option<bool> {
    match raw.to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// `webhook` or `local`, any case.
fn parse_backend(raw: &str) -> Option<DiagnosisBackend> {
    serde_json::from_value(Value::String(raw.to_ascii_lowercase())).ok()
}

struct Env<'a>(&'a dyn Fn(&str) -> Option<String>);

impl Env<'_> {
    fn text(&self, name: &str) -> Option<String> {
        (self.0)(name).filter(|v| !v.trim().is_empty())
    }

    fn parsed<T>(&self, name: &str, parse: impl Fn(&str) -> Option<T>) -> Option<T> {
        let raw = self.text(name)?;
        let value = parse(raw.trim());
        if value.is_none() {
            tracing::warn!(variable = name, value = %raw, "ignoring unusable environment override");
        }
        value
    }

    fn number<T>(&self, name: &str, range: RangeInclusive<T>) -> Option<T>
    where
        T: FromStr + PartialOrd,
    {
        self.parsed(name, |raw| raw.parse().ok().filter(|n| range.contains(n)))
    }
}
