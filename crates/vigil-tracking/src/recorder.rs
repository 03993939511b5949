//! Measurement Recorder.
//!
//! Inserts run on the caller's connection, inside the caller's transaction,
//! so a measurement commits or rolls back together with the session change
//! that accompanies it.

use rusqlite::Connection;
use tracing::debug;
use vigil_core::{ActivityKind, FatigueMoment, SignalSet, Stage};
use vigil_store::{MeasurementRepo, MeasurementRow, NewMeasurement};

use crate::errors::Result;

/// One measurement to record.
pub struct Recording<'a> {
    /// Owning session.
    pub session_id: &'a str,
    /// Stage tag for staged sessions.
    pub stage: Option<Stage>,
    /// Activity being monitored.
    pub activity: Option<ActivityKind>,
    /// Signal values, already validated.
    pub signals: &'a SignalSet,
    /// Elapsed seconds reported by the client.
    pub elapsed_seconds: Option<i64>,
    /// Client's fatigue classification.
    pub fatigued: bool,
    /// Fatigue episodes inside the interval.
    pub fatigue_moments: Option<&'a [FatigueMoment]>,
}

/// Appends measurements to sessions.
pub struct MeasurementRecorder;

impl MeasurementRecorder {
    /// Insert one measurement. Storage errors surface unchanged.
    pub fn record(conn: &Connection, rec: &Recording<'_>) -> Result<MeasurementRow> {
        let row = MeasurementRepo::insert(
            conn,
            &NewMeasurement {
                session_id: rec.session_id,
                stage: rec.stage,
                activity: rec.activity,
                signals: rec.signals,
                elapsed_seconds: rec.elapsed_seconds,
                fatigued: rec.fatigued,
                fatigue_moments: rec.fatigue_moments,
            },
        )?;
        debug!(
            session_id = rec.session_id,
            measurement_id = row.id,
            stage = ?row.stage,
            state = %row.state,
            "measurement recorded"
        );
        Ok(row)
    }
}
