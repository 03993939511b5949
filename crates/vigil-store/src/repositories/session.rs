//! Session repository: creation, lookup, open/closed transitions.
//!
//! A session is open while `ended_at` is NULL. Closing is a guarded update
//! (`WHERE ended_at IS NULL`), so a second close is a no-op that reports
//! `false` rather than overwriting the first closure.

use rusqlite::{Connection, OptionalExtension, params};
use serde_json::Value;
use vigil_core::{ActivityKind, SessionId, SessionModel};

use crate::errors::Result;
use crate::row_types::{SessionRow, now_rfc3339, parse_opt_text, parse_text};

/// Fields fixed when a session is opened.
pub struct CreateSessionOptions<'a> {
    /// Owning user.
    pub user_id: i64,
    /// Lifecycle model.
    pub model: SessionModel,
    /// Activity being monitored.
    pub activity: Option<ActivityKind>,
    /// Free-form capture source.
    pub source: &'a str,
}

/// Totals recorded when a session closes. Manual closure leaves them unset.
#[derive(Clone, Copy, Debug, Default)]
pub struct CloseSummary {
    /// Elapsed seconds.
    pub total_seconds: Option<i64>,
    /// Alerts raised.
    pub alert_count: Option<i64>,
    /// Subjective level of the closing measurement.
    pub final_subjective_level: Option<i64>,
    /// Fatigue classification of the closing measurement.
    pub final_fatigue: Option<bool>,
}

/// Stateless; every method runs on the caller's connection or transaction.
pub struct SessionRepo;

impl SessionRepo {
    /// Create a new open session.
    pub fn create(conn: &Connection, opts: &CreateSessionOptions<'_>) -> Result<SessionRow> {
        let id = SessionId::new();
        let now = now_rfc3339();

        let _ = conn.execute(
            "INSERT INTO sessions (id, user_id, model, activity_kind, source, started_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                id.as_str(),
                opts.user_id,
                opts.model.as_str(),
                opts.activity.map(ActivityKind::as_str),
                opts.source,
                now,
            ],
        )?;

        Ok(SessionRow {
            id,
            user_id: opts.user_id,
            model: opts.model,
            activity: opts.activity,
            source: opts.source.to_string(),
            started_at: now,
            ended_at: None,
            total_seconds: None,
            alert_count: None,
            final_subjective_level: None,
            final_fatigue: None,
            activity_log: Value::Array(Vec::new()),
        })
    }

    /// Get session by ID.
    pub fn get_by_id(conn: &Connection, session_id: &str) -> Result<Option<SessionRow>> {
        let row = conn
            .query_row(
                "SELECT * FROM sessions WHERE id = ?1",
                params![session_id],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Most recently created open session of a user.
    pub fn find_open_for_user(conn: &Connection, user_id: i64) -> Result<Option<SessionRow>> {
        let row = conn
            .query_row(
                "SELECT * FROM sessions
                 WHERE user_id = ?1 AND ended_at IS NULL
                 ORDER BY started_at DESC, rowid DESC
                 LIMIT 1",
                params![user_id],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Number of open sessions a user has.
    pub fn count_open_for_user(conn: &Connection, user_id: i64) -> Result<i64> {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM sessions WHERE user_id = ?1 AND ended_at IS NULL",
            params![user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    /// Close an open session. Returns `false` if it was already closed or
    /// does not exist.
    pub fn close(conn: &Connection, session_id: &str, summary: &CloseSummary) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE sessions
             SET ended_at = ?1,
                 total_seconds = COALESCE(?2, total_seconds),
                 alert_count = COALESCE(?3, alert_count),
                 final_subjective_level = COALESCE(?4, final_subjective_level),
                 final_fatigue = COALESCE(?5, final_fatigue)
             WHERE id = ?6 AND ended_at IS NULL",
            params![
                now_rfc3339(),
                summary.total_seconds,
                summary.alert_count,
                summary.final_subjective_level,
                summary.final_fatigue,
                session_id,
            ],
        )?;
        Ok(changed > 0)
    }

    /// Append one entry to the session's activity log.
    pub fn append_activity(conn: &Connection, session_id: &str, entry: &Value) -> Result<bool> {
        let changed = conn.execute(
            "UPDATE sessions
             SET activity_log = json_insert(activity_log, '$[#]', json(?1))
             WHERE id = ?2",
            params![entry.to_string(), session_id],
        )?;
        Ok(changed > 0)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<SessionRow> {
        Ok(SessionRow {
            id: SessionId::from_string(row.get("id")?),
            user_id: row.get("user_id")?,
            model: parse_text(row, "model")?,
            activity: parse_opt_text(row, "activity_kind")?,
            source: row.get("source")?,
            started_at: row.get("started_at")?,
            ended_at: row.get("ended_at")?,
            total_seconds: row.get("total_seconds")?,
            alert_count: row.get("alert_count")?,
            final_subjective_level: row.get("final_subjective_level")?,
            final_fatigue: row.get("final_fatigue")?,
            activity_log: row.get("activity_log")?,
        })
    }
}
