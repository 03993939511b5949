//! Typed settings tree, serialized as camelCase JSON.
//!
//! All types use `#[serde(rename_all = "camelCase", default)]` so a partial
//! settings file only needs the keys it changes.

use serde::{Deserialize, Serialize};

/// Root settings type.
///
/// ```json
/// {
///   "server": { "port": 9000 },
///   "diagnosis": { "backend": "local" }
/// }
/// ```
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VigilSettings {
    /// HTTP listener.
    pub server: ServerSettings,
    /// Relational store.
    pub database: DatabaseSettings,
    /// Diagnosis service.
    pub diagnosis: DiagnosisSettings,
    /// Log output.
    pub logging: LoggingSettings,
}

/// HTTP listener settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerSettings {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Origins allowed by CORS. Empty means any origin.
    pub cors_origins: Vec<String>,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            cors_origins: Vec::new(),
        }
    }
}

/// Relational store settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DatabaseSettings {
    /// Database file path. Relative paths resolve against `~/.vigil`.
    pub path: String,
    /// Maximum pooled connections.
    pub pool_size: u32,
    /// `SQLite` busy timeout in milliseconds.
    pub busy_timeout_ms: u32,
}

impl Default for DatabaseSettings {
    fn default() -> Self {
        Self {
            path: "vigil.db".to_string(),
            pool_size: 16,
            busy_timeout_ms: 30_000,
        }
    }
}

/// Which diagnosis implementation to use.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosisBackend {
    /// POST to an external workflow webhook.
    #[default]
    Webhook,
    /// Score locally with fixed thresholds.
    Local,
}

/// Diagnosis service settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DiagnosisSettings {
    /// Implementation to use.
    pub backend: DiagnosisBackend,
    /// Webhook endpoint.
    pub url: String,
    /// Hard limit for one diagnosis call, in milliseconds.
    pub timeout_ms: u64,
    /// TCP connect limit, in milliseconds.
    pub connect_timeout_ms: u64,
}

impl Default for DiagnosisSettings {
    fn default() -> Self {
        Self {
            backend: DiagnosisBackend::Webhook,
            url: "http://localhost:5678/webhook/fatigue".to_string(),
            timeout_ms: 60_000,
            connect_timeout_ms: 5_000,
        }
    }
}

/// Log output settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LoggingSettings {
    /// Minimum level (`trace`, `debug`, `info`, `warn`, `error`).
    pub level: String,
    /// Emit JSON lines instead of human-readable output.
    pub json: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let s = VigilSettings::default();
        assert_eq!(s.server.port, 8000);
        assert_eq!(s.database.pool_size, 16);
        assert_eq!(s.diagnosis.backend, DiagnosisBackend::Webhook);
        assert_eq!(s.diagnosis.timeout_ms, 60_000);
        assert_eq!(s.logging.level, "info");
    }

    #[test]
    fn camel_case_keys() {
        let v = serde_json::to_value(VigilSettings::default()).unwrap();
        assert!(v["database"].get("poolSize").is_some());
        assert!(v["diagnosis"].get("timeoutMs").is_some());
        assert!(v["server"].get("corsOrigins").is_some());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let s: VigilSettings =
            serde_json::from_str(r#"{"diagnosis": {"backend": "local"}}"#).unwrap();
        assert_eq!(s.diagnosis.backend, DiagnosisBackend::Local);
        assert_eq!(s.diagnosis.timeout_ms, 60_000);
        assert_eq!(s.server.port, 8000);
    }
}
