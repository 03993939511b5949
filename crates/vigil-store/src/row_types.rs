//! Typed rows for the three tables.
//!
//! Text columns holding enums or JSON are parsed while mapping the row, so a
//! corrupt value surfaces as a conversion error instead of leaking upward as
//! an unchecked string.

use std::str::FromStr;

use rusqlite::Row;
use rusqlite::types::Type;
use serde::Serialize;
use serde_json::Value;
use vigil_core::{
    ActivityKind, Diagnosis, FatigueMoment, FatigueState, SessionId, SessionModel, SignalSet,
    Stage,
};

/// Raw session row from the `sessions` table.
#[derive(Clone, Debug, Serialize)]
pub struct SessionRow {
    /// Session ID.
    pub id: SessionId,
    /// Owning user.
    pub user_id: i64,
    /// Lifecycle model fixed at creation.
    pub model: SessionModel,
    /// Activity being monitored, if known.
    pub activity: Option<ActivityKind>,
    /// Free-form description of the capture source.
    pub source: String,
    /// Creation timestamp (RFC 3339).
    pub started_at: String,
    /// Closure timestamp; `None` while the session is open.
    pub ended_at: Option<String>,
    /// Elapsed seconds reported at closure.
    pub total_seconds: Option<i64>,
    /// Alert count reported at closure.
    pub alert_count: Option<i64>,
    /// Subjective level of the closing measurement.
    pub final_subjective_level: Option<i64>,
    /// Fatigue classification of the closing measurement.
    pub final_fatigue: Option<bool>,
    /// Append-only log of timestamped sub-events (rest breaks).
    pub activity_log: Value,
}

impl SessionRow {
    /// Whether the session still accepts measurements.
    pub fn is_open(&self) -> bool {
        self.ended_at.is_none()
    }
}

/// Raw measurement row from the `measurements` table.
#[derive(Clone, Debug, Serialize)]
pub struct MeasurementRow {
    /// Autoincrement ID; insertion order.
    pub id: i64,
    /// Owning session.
    pub session_id: SessionId,
    /// Stage tag for staged sessions.
    pub stage: Option<Stage>,
    /// Activity being monitored.
    pub activity: Option<ActivityKind>,
    /// Signal values.
    pub signals: SignalSet,
    /// Elapsed seconds reported with the measurement.
    pub elapsed_seconds: Option<i64>,
    /// Client's fatigue classification.
    pub fatigued: bool,
    /// Textual classification derived from `fatigued`.
    pub state: FatigueState,
    /// Fatigue episodes inside the interval.
    pub fatigue_moments: Option<Vec<FatigueMoment>>,
    /// Insertion timestamp (RFC 3339).
    pub recorded_at: String,
}

/// Raw diagnosis row from the `diagnoses` table.
#[derive(Clone, Debug, Serialize)]
pub struct DiagnosisRow {
    /// Owning session.
    pub session_id: SessionId,
    /// The stored diagnosis.
    pub result: Diagnosis,
    /// First write.
    pub created_at: String,
    /// Last replacement.
    pub updated_at: String,
}

// ── Column helpers ──────────────────────────────────────────────────────────

fn conversion_error(row: &Row<'_>, col: &str, msg: String) -> rusqlite::Error {
    let idx = row.as_ref().column_index(col).unwrap_or(0);
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, msg.into())
}

/// Parse a required text column through `FromStr`.
pub(crate) fn parse_text<T>(row: &Row<'_>, col: &str) -> rusqlite::Result<T>
where
    T: FromStr<Err = String>,
{
    let raw: String = row.get(col)?;
    raw.parse().map_err(|e| conversion_error(row, col, e))
}

/// Parse a nullable text column through `FromStr`.
pub(crate) fn parse_opt_text<T>(row: &Row<'_>, col: &str) -> rusqlite::Result<Option<T>>
where
    T: FromStr<Err = String>,
{
    let raw: Option<String> = row.get(col)?;
    raw.map(|s| s.parse().map_err(|e| conversion_error(row, col, e)))
        .transpose()
}

/// Deserialize a JSON text column.
pub(crate) fn parse_json<T>(row: &Row<'_>, col: &str) -> rusqlite::Result<T>
where
    T: serde::de::DeserializeOwned,
{
    let raw: String = row.get(col)?;
    serde_json::from_str(&raw).map_err(|e| conversion_error(row, col, e.to_string()))
}

/// Deserialize a nullable JSON text column.
pub(crate) fn parse_opt_json<T>(row: &Row<'_>, col: &str) -> rusqlite::Result<Option<T>>
where
    T: serde::de::DeserializeOwned,
{
    let raw: Option<String> = row.get(col)?;
    raw.map(|s| serde_json::from_str(&s).map_err(|e| conversion_error(row, col, e.to_string())))
        .transpose()
}

/// Current time as RFC 3339 with millisecond precision.
pub(crate) fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}
