//! Measurement repository: append-only fatigue snapshots.
//!
//! "Latest" means highest autoincrement id, i.e. insertion order, which is
//! stable even when two rows share a timestamp.

use rusqlite::{Connection, OptionalExtension, params};
use vigil_core::{ActivityKind, FatigueMoment, FatigueState, SessionId, SignalSet, Stage};

use crate::errors::Result;
use crate::row_types::{MeasurementRow, now_rfc3339, parse_opt_json, parse_opt_text, parse_text};

/// Fields for a new measurement.
pub struct NewMeasurement<'a> {
    /// Owning session (must exist).
    pub session_id: &'a str,
    /// Stage tag for staged sessions.
    pub stage: Option<Stage>,
    /// Activity being monitored.
    pub activity: Option<ActivityKind>,
    /// Signal values.
    pub signals: &'a SignalSet,
    /// Elapsed seconds reported with the measurement.
    pub elapsed_seconds: Option<i64>,
    /// Client's fatigue classification.
    pub fatigued: bool,
    /// Fatigue episodes inside the interval.
    pub fatigue_moments: Option<&'a [FatigueMoment]>,
}

/// Append-only access to `measurements`; no update or delete paths.
pub struct MeasurementRepo;

impl MeasurementRepo {
    /// Insert a measurement. Fails if the session does not exist.
    pub fn insert(conn: &Connection, m: &NewMeasurement<'_>) -> Result<MeasurementRow> {
        let state = FatigueState::from_flag(m.fatigued);
        let now = now_rfc3339();
        let moments_json = m.fatigue_moments.map(serde_json::to_string).transpose()?;
        let s = m.signals;

        let _ = conn.execute(
            "INSERT INTO measurements (
                session_id, stage, activity_kind,
                sebr, blink_rate_min, perclos, pct_incomplete, closure_time, yawns,
                eye_velocity, subjective_level, max_without_blink, alerts,
                elapsed_seconds, fatigued, fatigue_state, fatigue_moments, recorded_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
            params![
                m.session_id,
                m.stage.map(Stage::as_str),
                m.activity.map(ActivityKind::as_str),
                s.sebr,
                s.blink_rate_min,
                s.perclos,
                s.pct_incomplete,
                s.closure_time,
                s.yawns,
                s.eye_velocity,
                s.subjective_level,
                s.max_without_blink,
                s.alerts,
                m.elapsed_seconds,
                m.fatigued,
                state.as_str(),
                moments_json,
                now,
            ],
        )?;

        Ok(MeasurementRow {
            id: conn.last_insert_rowid(),
            session_id: SessionId::from(m.session_id),
            stage: m.stage,
            activity: m.activity,
            signals: s.clone(),
            elapsed_seconds: m.elapsed_seconds,
            fatigued: m.fatigued,
            state,
            fatigue_moments: m.fatigue_moments.map(<[FatigueMoment]>::to_vec),
            recorded_at: now,
        })
    }

    /// Most recent measurement of a session, any stage.
    pub fn latest(conn: &Connection, session_id: &str) -> Result<Option<MeasurementRow>> {
        let row = conn
            .query_row(
                "SELECT * FROM measurements WHERE session_id = ?1 ORDER BY id DESC LIMIT 1",
                params![session_id],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Most recent measurement of a session tagged with `stage`.
    pub fn latest_by_stage(
        conn: &Connection,
        session_id: &str,
        stage: Stage,
    ) -> Result<Option<MeasurementRow>> {
        let row = conn
            .query_row(
                "SELECT * FROM measurements
                 WHERE session_id = ?1 AND stage = ?2
                 ORDER BY id DESC LIMIT 1",
                params![session_id, stage.as_str()],
                Self::map_row,
            )
            .optional()?;
        Ok(row)
    }

    /// Number of measurements recorded for a session.
    pub fn count_for_session(conn: &Connection, session_id: &str) -> Result<i64> {
        let count = conn.query_row(
            "SELECT COUNT(*) FROM measurements WHERE session_id = ?1",
            params![session_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn map_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<MeasurementRow> {
        Ok(MeasurementRow {
            id: row.get("id")?,
            session_id: SessionId::from_string(row.get("session_id")?),
            stage: parse_opt_text(row, "stage")?,
            activity: parse_opt_text(row, "activity_kind")?,
            signals: SignalSet {
                sebr: row.get("sebr")?,
                blink_rate_min: row.get("blink_rate_min")?,
                perclos: row.get("perclos")?,
                pct_incomplete: row.get("pct_incomplete")?,
                closure_time: row.get("closure_time")?,
                yawns: row.get("yawns")?,
                eye_velocity: row.get("eye_velocity")?,
                subjective_level: row.get("subjective_level")?,
                max_without_blink: row.get("max_without_blink")?,
                alerts: row.get("alerts")?,
            },
            elapsed_seconds: row.get("elapsed_seconds")?,
            fatigued: row.get("fatigued")?,
            state: parse_text(row, "fatigue_state")?,
            fatigue_moments: parse_opt_json(row, "fatigue_moments")?,
            recorded_at: row.get("recorded_at")?,
        })
    }
}

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use super::*;
    use crate::errors::StoreError;
    use crate::migrations::run_migrations;
    use crate::repositories::session::{CreateSessionOptions, SessionRepo};
    use assert_matches::assert_matches;
    use serde_json::json;
    use vigil_core::SessionModel;

    fn setup() -> (Connection, String) {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("PRAGMA foreign_keys = ON;").unwrap();
        run_migrations(&conn).unwrap();
        let sess = SessionRepo::create(
            &conn,
            &CreateSessionOptions {
                user_id: 1,
                model: SessionModel::Staged,
                activity: None,
                source: "",
            },
        )
        .unwrap();
        (conn, sess.id.into_inner())
    }

    fn signals(perclos: f64) -> SignalSet {
        SignalSet {
            sebr: 10.0,
            blink_rate_min: 12.0,
            perclos,
            pct_incomplete: 5.0,
            closure_time: 0.2,
            yawns: 1,
            eye_velocity: 0.04,
            subjective_level: 5,
            max_without_blink: 6,
            alerts: 0,
        }
    }

    fn insert(conn: &Connection, session_id: &str, stage: Option<Stage>, perclos: f64) -> MeasurementRow {
        let s = signals(perclos);
        MeasurementRepo::insert(
            conn,
            &NewMeasurement {
                session_id,
                stage,
                activity: Some(ActivityKind::Video),
                signals: &s,
                elapsed_seconds: Some(120),
                fatigued: perclos > 25.0,
                fatigue_moments: None,
            },
        )
        .unwrap()
    }

    #[test]
    fn insert_and_read_back() {
        let (conn, sid) = setup();
        let moments: Vec<FatigueMoment> =
            serde_json::from_value(json!([{"timestamp": "00:01:00", "perclos": 40}])).unwrap();
        let s = signals(30.0);
        let row = MeasurementRepo::insert(
            &conn,
            &NewMeasurement {
                session_id: &sid,
                stage: Some(Stage::Initial),
                activity: Some(ActivityKind::Pdf),
                signals: &s,
                elapsed_seconds: None,
                fatigued: true,
                fatigue_moments: Some(&moments),
            },
        )
        .unwrap();
        assert_eq!(row.state, FatigueState::Fatigued);

        let found = MeasurementRepo::latest(&conn, &sid).unwrap().unwrap();
        assert_eq!(found.id, row.id);
        assert_eq!(found.stage, Some(Stage::Initial));
        assert_eq!(found.signals, s);
        assert!(found.fatigued);
        assert_eq!(found.state, FatigueState::Fatigued);
        assert_eq!(found.fatigue_moments.as_deref(), Some(moments.as_slice()));
    }

    #[test]
    fn latest_uses_insertion_order() {
        let (conn, sid) = setup();
        insert(&conn, &sid, Some(Stage::Initial), 10.0);
        let second = insert(&conn, &sid, Some(Stage::Final), 20.0);
        let found = MeasurementRepo::latest(&conn, &sid).unwrap().unwrap();
        assert_eq!(found.id, second.id);
    }

    #[test]
    fn latest_by_stage_picks_newest_of_stage() {
        let (conn, sid) = setup();
        insert(&conn, &sid, Some(Stage::Initial), 10.0);
        let retake = insert(&conn, &sid, Some(Stage::Initial), 11.0);
        insert(&conn, &sid, Some(Stage::Final), 30.0);

        let initial = MeasurementRepo::latest_by_stage(&conn, &sid, Stage::Initial)
            .unwrap()
            .unwrap();
        assert_eq!(initial.id, retake.id);
        assert_eq!(initial.signals.perclos, 11.0);
    }

    #[test]
    fn latest_by_stage_missing() {
        let (conn, sid) = setup();
        insert(&conn, &sid, Some(Stage::Initial), 10.0);
        assert!(
            MeasurementRepo::latest_by_stage(&conn, &sid, Stage::Final)
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn insert_for_unknown_session_fails() {
        let (conn, _sid) = setup();
        let s = signals(1.0);
        let err = MeasurementRepo::insert(
            &conn,
            &NewMeasurement {
                session_id: "nope",
                stage: None,
                activity: None,
                signals: &s,
                elapsed_seconds: None,
                fatigued: false,
                fatigue_moments: None,
            },
        )
        .unwrap_err();
        assert_matches!(err, StoreError::Sqlite(_));
    }

    #[test]
    fn measurements_are_immutable() {
        let (conn, sid) = setup();
        let row = insert(&conn, &sid, None, 10.0);
        let err = conn
            .execute("UPDATE measurements SET perclos = 99 WHERE id = ?1", [row.id])
            .unwrap_err();
        assert!(err.to_string().contains("immutable"));
    }

    #[test]
    fn count_for_session() {
        let (conn, sid) = setup();
        assert_eq!(MeasurementRepo::count_for_session(&conn, &sid).unwrap(), 0);
        insert(&conn, &sid, None, 10.0);
        insert(&conn, &sid, None, 12.0);
        assert_eq!(MeasurementRepo::count_for_session(&conn, &sid).unwrap(), 2);
    }
}
