//! Vigil server binary.
//!
//! Loads layered settings, applies command-line overrides, opens the
//! measurement store, wires the diagnosis backend into the lifecycle
//! controller, and serves the HTTP API until Ctrl-C.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use vigil_logging::LogFormat;
use vigil_server::{ServerConfig, VigilServer};
use vigil_settings::{DiagnosisBackend, VigilSettings};
use vigil_store::ConnectionConfig;
use vigil_tracking::{DiagnosisReconciler, LifecycleController};

/// Vigil fatigue-tracking server.
#[derive(Parser, Debug)]
#[command(name = "vigil-agent", about = "Visual fatigue tracking server")]
struct Cli {
    /// Host to bind (overrides settings).
    #[arg(long)]
    host: Option<String>,

    /// Port to bind, 0 for auto-assign (overrides settings).
    #[arg(long)]
    port: Option<u16>,

    /// Path to the `SQLite` database (overrides settings).
    #[arg(long)]
    db_path: Option<PathBuf>,

    /// Settings file to load instead of `~/.vigil/settings.json`.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Diagnosis webhook URL (implies the webhook backend).
    #[arg(long, conflicts_with = "local_diagnosis")]
    diagnosis_url: Option<String>,

    /// Score diagnoses locally instead of calling the webhook.
    #[arg(long)]
    local_diagnosis: bool,

    /// Emit JSON log lines.
    #[arg(long)]
    log_json: bool,
}

impl Cli {
    /// Fold command-line overrides into loaded settings.
    fn apply(&self, settings: &mut VigilSettings) {
        if let Some(ref host) = self.host {
            settings.server.host.clone_from(host);
        }
        if let Some(port) = self.port {
            settings.server.port = port;
        }
        if let Some(ref path) = self.db_path {
            settings.database.path = path.to_string_lossy().into_owned();
        }
        if let Some(ref url) = self.diagnosis_url {
            settings.diagnosis.backend = DiagnosisBackend::Webhook;
            settings.diagnosis.url.clone_from(url);
        }
        if self.local_diagnosis {
            settings.diagnosis.backend = DiagnosisBackend::Local;
        }
        if self.log_json {
            settings.logging.json = true;
        }
    }
}

fn load_settings(cli: &Cli) -> Result<VigilSettings> {
    let path = cli
        .settings
        .clone()
        .unwrap_or_else(vigil_settings::settings_path);
    let mut settings = vigil_settings::load_settings_from_path(&path)
        .with_context(|| format!("Failed to load settings from {}", path.display()))?;
    cli.apply(&mut settings);
    vigil_settings::validate(&settings).context("Invalid settings after command-line overrides")?;
    Ok(settings)
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let settings = load_settings(&cli)?;

    vigil_logging::init_subscriber(
        &settings.logging.level,
        LogFormat::from_json_flag(settings.logging.json),
    );

    let db_path = vigil_settings::resolve_db_path(&settings);
    ensure_parent_dir(&db_path)?;
    let pool = vigil_store::open(
        &db_path.to_string_lossy(),
        &ConnectionConfig {
            pool_size: settings.database.pool_size,
            busy_timeout_ms: settings.database.busy_timeout_ms,
            ..ConnectionConfig::default()
        },
    )
    .context("Failed to open database")?;
    tracing::info!(path = %db_path.display(), "database ready");

    let service = vigil_diagnosis::from_settings(&settings.diagnosis)
        .context("Failed to build diagnosis service")?;
    let reconciler = DiagnosisReconciler::new(pool.clone(), service)
        .with_call_timeout(Duration::from_millis(settings.diagnosis.timeout_ms));
    let controller = Arc::new(LifecycleController::with_reconciler(pool.clone(), reconciler));

    let metrics = vigil_server::metrics::install_recorder()
        .context("Failed to install metrics recorder")?;

    let server = VigilServer::new(
        ServerConfig::from(&settings.server),
        controller,
        pool,
        metrics,
    );
    let (addr, handle) = server.listen().await.context("Failed to bind server")?;
    tracing::info!(
        backend = ?settings.diagnosis.backend,
        "Vigil listening on http://{addr}"
    );

    server.shutdown().wait_for_ctrl_c().await;
    if !server.shutdown().drain(handle, None).await {
        tracing::warn!("some requests were still running at exit");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_defaults_leave_settings_untouched() {
        let cli = Cli::parse_from(["vigil-agent"]);
        let mut settings = VigilSettings::default();
        let before = debug_snapshot(&settings);
        cli.apply(&mut settings);
        assert_eq!(debug_snapshot(&settings), before);
    }

    #[test]
    fn cli_overrides_server_and_database() {
        let cli = Cli::parse_from([
            "vigil-agent",
            "--host",
            "0.0.0.0",
            "--port",
            "8080",
            "--db-path",
            "/tmp/vigil-test/vigil.db",
        ]);
        let mut settings = VigilSettings::default();
        cli.apply(&mut settings);
        assert_eq!(settings.server.host, "0.0.0.0");
        assert_eq!(settings.server.port, 8080);
        assert_eq!(settings.database.path, "/tmp/vigil-test/vigil.db");
    }

    #[test]
    fn cli_local_diagnosis_switches_backend() {
        let cli = Cli::parse_from(["vigil-agent", "--local-diagnosis"]);
        let mut settings = VigilSettings::default();
        cli.apply(&mut settings);
        assert_eq!(settings.diagnosis.backend, DiagnosisBackend::Local);
    }

    #[test]
    fn cli_diagnosis_url_selects_webhook() {
        let cli = Cli::parse_from(["vigil-agent", "--diagnosis-url", "https://flows.test/hook"]);
        let mut settings = VigilSettings::default();
        settings.diagnosis.backend = DiagnosisBackend::Local;
        cli.apply(&mut settings);
        assert_eq!(settings.diagnosis.backend, DiagnosisBackend::Webhook);
        assert_eq!(settings.diagnosis.url, "https://flows.test/hook");
    }

    #[test]
    fn cli_rejects_conflicting_backends() {
        let parsed = Cli::try_parse_from([
            "vigil-agent",
            "--local-diagnosis",
            "--diagnosis-url",
            "https://flows.test/hook",
        ]);
        assert!(parsed.is_err());
    }

    #[test]
    fn load_settings_reads_file_then_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        std::fs::write(&path, r#"{"server": {"port": 9000}, "logging": {"level": "debug"}}"#)
            .unwrap();
        let cli = Cli::parse_from([
            "vigil-agent",
            "--settings",
            path.to_str().unwrap(),
            "--host",
            "10.0.0.5",
        ]);
        let settings = load_settings(&cli).unwrap();
        assert_eq!(settings.server.port, 9000);
        assert_eq!(settings.server.host, "10.0.0.5");
        assert_eq!(settings.logging.level, "debug");
    }

    #[test]
    fn load_settings_rejects_bad_override() {
        let dir = tempfile::tempdir().unwrap();
        let cli = Cli::parse_from([
            "vigil-agent",
            "--settings",
            dir.path().join("missing.json").to_str().unwrap(),
            "--diagnosis-url",
            "ftp://nope",
        ]);
        assert!(load_settings(&cli).is_err());
    }

    #[test]
    fn ensure_parent_dir_creates_nested() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a").join("b").join("vigil.db");
        ensure_parent_dir(&path).unwrap();
        assert!(path.parent().unwrap().exists());
    }

    fn debug_snapshot(settings: &VigilSettings) -> String {
        format!("{settings:?}")
    }
}
