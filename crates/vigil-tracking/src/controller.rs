//! Session Lifecycle Controller.
//!
//! Owns the transaction boundary of a fatigue report submission:
//!
//! ```text
//! validate ─▶ BEGIN IMMEDIATE ─▶ resolve/create session ─▶ record
//!          ─▶ close? ─▶ prepare diagnosis ─▶ COMMIT
//!          ─▶ (connection released) ─▶ call service ─▶ upsert diagnosis
//! ```
//!
//! The storage steps run on tokio's blocking pool.
//!
//! Everything up to the commit succeeds or fails as one unit. What happens
//! after it only decides whether the outcome carries a diagnosis.
//!
//! Two concurrent first submissions for a user with no open session can each
//! create a session. Nothing in the schema forbids it and no constraint is
//! inferred here.

use std::sync::Arc;

use metrics::counter;
use rusqlite::{Connection, TransactionBehavior};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tracing::{info, instrument, warn};
use vigil_core::{ActivityKind, Diagnosis, SessionId, SessionModel, Stage};
use vigil_diagnosis::DiagnosisService;
use vigil_store::{
    CloseSummary, ConnectionPool, CreateSessionOptions, DiagnosisRepo, MeasurementRepo,
    MeasurementRow, SessionRepo, SessionRow,
};

use crate::blocking;
use crate::errors::{Result, TrackingError};
use crate::metrics::{FATIGUE_REPORTS_TOTAL, SESSIONS_CLOSED_TOTAL};
use crate::reconciler::{DiagnosisReconciler, ReconcilePlan};
use crate::recorder::{MeasurementRecorder, Recording};
use crate::report::{FatigueReport, SubmissionOutcome};
use crate::rest::{self, REST_ACTIVITIES, RestActivity};

// ─────────────────────────────────────────────────────────────────────────────
// Inputs and outputs
// ─────────────────────────────────────────────────────────────────────────────

/// Explicit session creation.
#[derive(Clone, Debug, Deserialize)]
pub struct NewSession {
    /// Owning user.
    #[serde(alias = "usuario_id")]
    pub user_id: i64,
    /// Activity being monitored.
    #[serde(default, alias = "actividad")]
    pub activity: Option<ActivityKind>,
    /// Free-form capture source.
    #[serde(default, alias = "fuente")]
    pub source: String,
    /// Lifecycle model; continuous unless stated.
    #[serde(default = "default_model")]
    pub model: SessionModel,
}

fn default_model() -> SessionModel {
    SessionModel::Continuous
}

/// A rest break taken during a session.
#[derive(Clone, Debug, Deserialize)]
pub struct RestBreak {
    /// Catalogue id of the activity.
    #[serde(alias = "actividad_id")]
    pub activity_id: u32,
    /// Activity name; looked up in the catalogue when absent.
    #[serde(default, alias = "actividad_nombre")]
    pub activity_name: Option<String>,
    /// How long the break lasted.
    #[serde(alias = "duracion_seg")]
    pub duration_secs: u32,
}

/// Result of a manual close.
#[derive(Clone, Debug, Serialize)]
pub struct EndOutcome {
    /// Session after the call.
    pub session: SessionRow,
    /// `false` when the session was already closed.
    pub closed: bool,
}

/// A session with its latest measurement and stored diagnosis.
#[derive(Clone, Debug, Serialize)]
pub struct SessionDetails {
    /// The session row.
    pub session: SessionRow,
    /// Most recent measurement, if any.
    pub latest_measurement: Option<MeasurementRow>,
    /// Number of measurements recorded.
    pub measurement_count: i64,
    /// Stored diagnosis, if any.
    pub diagnosis: Option<Diagnosis>,
}

/// What the storage transaction of a submission produced.
struct Committed {
    session_id: SessionId,
    measurement_id: i64,
    created: bool,
    closed: bool,
    superseded: Option<SessionId>,
    plan: Option<ReconcilePlan>,
}

/// The session a report landed in.
struct Resolved {
    session: SessionRow,
    created: bool,
    /// Open session of the other model that was closed to make room.
    superseded: Option<SessionRow>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Controller
// ─────────────────────────────────────────────────────────────────────────────

/// Orchestrates sessions, measurements, and diagnoses.
///
/// Store work runs on tokio's blocking pool; only the diagnosis call runs on
/// the runtime itself.
pub struct LifecycleController {
    pool: ConnectionPool,
    reconciler: DiagnosisReconciler,
}

impl LifecycleController {
    /// Create a controller with the default diagnosis call limit.
    pub fn new(pool: ConnectionPool, service: Arc<dyn DiagnosisService>) -> Self {
        let reconciler = DiagnosisReconciler::new(pool.clone(), service);
        Self { pool, reconciler }
    }

    /// Create a controller around an existing reconciler.
    pub fn with_reconciler(pool: ConnectionPool, reconciler: DiagnosisReconciler) -> Self {
        Self { pool, reconciler }
    }

    /// The reconciler used after closures.
    pub fn reconciler(&self) -> &DiagnosisReconciler {
        &self.reconciler
    }

    /// Submit one fatigue report.
    ///
    /// Storage failures fail the submission. Diagnosis failures do not: the
    /// outcome then has no diagnosis and names the failure category.
    #[instrument(skip(self, report), fields(user_id = report.user_id, model = %report.model()))]
    pub async fn submit(&self, report: FatigueReport) -> Result<SubmissionOutcome> {
        report.validate()?;
        counter!(FATIGUE_REPORTS_TOTAL, "model" => report.model().as_str()).increment(1);

        let pool = self.pool.clone();
        let committed = blocking::run(move || record_submission(&pool, &report)).await?;

        let (diagnosis, diagnosis_error) = match committed.plan {
            None => (None, None),
            Some(plan) => match self.reconciler.complete(plan).await {
                Ok(diagnosis) => (Some(diagnosis), None),
                Err(e) => {
                    warn!(
                        session_id = %committed.session_id,
                        category = %e.category(),
                        error = %e,
                        "diagnosis unavailable, measurement kept"
                    );
                    (None, Some(e.category()))
                }
            },
        };

        let message = if committed.closed {
            "Medición registrada, sesión finalizada"
        } else {
            "Medición registrada"
        };
        Ok(SubmissionOutcome {
            message: message.to_string(),
            session_id: committed.session_id,
            measurement_id: committed.measurement_id,
            created: committed.created,
            closed: committed.closed,
            superseded_session_id: committed.superseded,
            diagnosis,
            diagnosis_error,
        })
    }

    /// Open a session explicitly.
    ///
    /// Fails with [`TrackingError::Conflict`] if the user already has one open.
    #[instrument(skip(self, request), fields(user_id = request.user_id))]
    pub async fn create_session(&self, request: &NewSession) -> Result<SessionRow> {
        if request.user_id <= 0 {
            return Err(TrackingError::Validation(format!(
                "user_id must be positive, got {}",
                request.user_id
            )));
        }
        let pool = self.pool.clone();
        let request = request.clone();
        blocking::run(move || {
            let mut conn = pool.get()?;
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            if let Some(open) = SessionRepo::find_open_for_user(&tx, request.user_id)? {
                return Err(TrackingError::Conflict {
                    open_session_id: open.id,
                });
            }
            let session = SessionRepo::create(
                &tx,
                &CreateSessionOptions {
                    user_id: request.user_id,
                    model: request.model,
                    activity: request.activity,
                    source: &request.source,
                },
            )?;
            tx.commit()?;
            info!(session_id = %session.id, model = %session.model, "session created");
            Ok(session)
        })
        .await
    }

    /// Close a session without totals. Closing a closed session is a no-op.
    #[instrument(skip(self))]
    pub async fn end_session(&self, session_id: &str) -> Result<EndOutcome> {
        let pool = self.pool.clone();
        let session_id = session_id.to_string();
        blocking::run(move || {
            let mut conn = pool.get()?;
            let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
            let existing = require_session(&tx, &session_id)?;
            let closed = SessionRepo::close(&tx, &session_id, &CloseSummary::default())?;
            let session = if closed {
                require_session(&tx, &session_id)?
            } else {
                existing
            };
            tx.commit()?;

            if closed {
                counter!(SESSIONS_CLOSED_TOTAL, "model" => session.model.as_str(), "trigger" => "manual")
                    .increment(1);
                info!(%session_id, "session ended");
            }
            Ok(EndOutcome { session, closed })
        })
        .await
    }

    /// Append a rest break to a session's activity log.
    #[instrument(skip(self, rest_break), fields(activity_id = rest_break.activity_id))]
    pub async fn record_rest_break(&self, session_id: &str, rest_break: &RestBreak) -> Result<Value> {
        if rest_break.duration_secs == 0 {
            return Err(TrackingError::Validation(
                "duration_secs must be positive".to_string(),
            ));
        }
        let name = match rest_break.activity_name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => rest::find(rest_break.activity_id)
                .map(|a| a.name.to_string())
                .ok_or_else(|| {
                    TrackingError::Validation(format!(
                        "unknown rest activity {}",
                        rest_break.activity_id
                    ))
                })?,
        };
        let entry = json!({
            "kind": "rest_break",
            "activity_id": rest_break.activity_id,
            "activity": name,
            "duration_secs": rest_break.duration_secs,
            "timestamp": chrono::Utc::now().to_rfc3339_opts(chrono::SecondsFormat::Millis, true),
        });

        let pool = self.pool.clone();
        let session_id = session_id.to_string();
        blocking::run(move || {
            let conn = pool.get()?;
            if !SessionRepo::append_activity(&conn, &session_id, &entry)? {
                return Err(TrackingError::SessionNotFound(session_id));
            }
            info!(%session_id, "rest break recorded");
            Ok(entry)
        })
        .await
    }

    /// Session row, latest measurement, and stored diagnosis.
    pub async fn session_details(&self, session_id: &str) -> Result<SessionDetails> {
        let pool = self.pool.clone();
        let session_id = session_id.to_string();
        blocking::run(move || {
            let conn = pool.get()?;
            let session = require_session(&conn, &session_id)?;
            Ok(SessionDetails {
                latest_measurement: MeasurementRepo::latest(&conn, &session_id)?,
                measurement_count: MeasurementRepo::count_for_session(&conn, &session_id)?,
                diagnosis: DiagnosisRepo::get(&conn, &session_id)?.map(|row| row.result),
                session,
            })
        })
        .await
    }

    /// Get-or-create the diagnosis of a session.
    pub async fn diagnose(&self, session_id: &str) -> Result<Diagnosis> {
        self.reconciler.reconcile(session_id).await
    }

    /// The rest activity catalogue.
    pub fn rest_activities(&self) -> &'static [RestActivity] {
        &REST_ACTIVITIES
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

/// The storage transaction of a submission. Blocking.
fn record_submission(pool: &ConnectionPool, report: &FatigueReport) -> Result<Committed> {
    let mut conn = pool.get()?;
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

    let Resolved {
        session,
        created,
        superseded,
    } = resolve_session(&tx, report)?;
    let measurement = MeasurementRecorder::record(
        &tx,
        &Recording {
            session_id: &session.id,
            stage: report.stage,
            activity: report.activity.or(session.activity),
            signals: &report.signals,
            elapsed_seconds: report.elapsed_seconds,
            fatigued: report.fatigued,
            fatigue_moments: report.fatigue_moments.as_deref(),
        },
    )?;

    let closes = match session.model {
        SessionModel::Staged => report.stage == Some(Stage::Final),
        SessionModel::Continuous => true,
    };
    let plan = if closes {
        let summary = CloseSummary {
            total_seconds: report.elapsed_seconds,
            alert_count: Some(i64::from(report.signals.alerts)),
            final_subjective_level: Some(i64::from(report.signals.subjective_level)),
            final_fatigue: Some(report.fatigued),
        };
        if !SessionRepo::close(&tx, &session.id, &summary)? {
            return Err(TrackingError::SessionClosed(session.id));
        }
        Some(DiagnosisReconciler::prepare(&tx, &session)?)
    } else {
        None
    };

    tx.commit()?;

    if let Some(old) = &superseded {
        counter!(SESSIONS_CLOSED_TOTAL, "model" => old.model.as_str(), "trigger" => "superseded")
            .increment(1);
        warn!(
            superseded_session_id = %old.id,
            superseded_model = %old.model,
            session_id = %session.id,
            "open session of the other model closed without totals"
        );
    }
    if closes {
        counter!(SESSIONS_CLOSED_TOTAL, "model" => session.model.as_str(), "trigger" => "report")
            .increment(1);
    }
    info!(
        session_id = %session.id,
        measurement_id = measurement.id,
        created,
        closed = closes,
        "fatigue report committed"
    );

    Ok(Committed {
        session_id: session.id,
        measurement_id: measurement.id,
        created,
        closed: closes,
        superseded: superseded.map(|old| old.id),
        plan,
    })
}

fn require_session(conn: &Connection, session_id: &str) -> Result<SessionRow> {
    SessionRepo::get_by_id(conn, session_id)?
        .ok_or_else(|| TrackingError::SessionNotFound(session_id.to_string()))
}

/// Find the session a report belongs to, creating one when the user has
/// none open.
///
/// Without an explicit id, an open session of the other model is left over
/// from an abandoned flow. It is closed without totals and a fresh session
/// takes the report.
fn resolve_session(conn: &Connection, report: &FatigueReport) -> Result<Resolved> {
    let model = report.model();

    if let Some(id) = &report.session_id {
        let session = require_session(conn, id)?;
        if session.user_id != report.user_id {
            return Err(TrackingError::Validation(format!(
                "session {id} does not belong to user {}",
                report.user_id
            )));
        }
        if !session.is_open() {
            return Err(TrackingError::SessionClosed(session.id));
        }
        if session.model != model {
            return Err(TrackingError::Validation(format!(
                "session {} is {}, report is {}",
                session.id, session.model, model
            )));
        }
        return Ok(Resolved {
            session,
            created: false,
            superseded: None,
        });
    }

    let superseded = match SessionRepo::find_open_for_user(conn, report.user_id)? {
        Some(open) if open.model == model => {
            return Ok(Resolved {
                session: open,
                created: false,
                superseded: None,
            });
        }
        Some(stale) => {
            if !SessionRepo::close(conn, &stale.id, &CloseSummary::default())? {
                return Err(TrackingError::SessionClosed(stale.id));
            }
            Some(stale)
        }
        None => None,
    };

    let session = SessionRepo::create(
        conn,
        &CreateSessionOptions {
            user_id: report.user_id,
            model,
            activity: report.activity,
            source: "",
        },
    )?;
    Ok(Resolved {
        session,
        created: true,
        superseded,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use vigil_core::SignalSet;
    use vigil_diagnosis::testing::ScriptedDiagnosisService;

    fn controller() -> (LifecycleController, Arc<ScriptedDiagnosisService>) {
        let pool = vigil_store::open_in_memory().unwrap();
        let service = Arc::new(ScriptedDiagnosisService::new());
        (LifecycleController::new(pool, service.clone()), service)
    }

    fn report(user_id: i64, stage: Option<Stage>) -> FatigueReport {
        FatigueReport {
            user_id,
            session_id: None,
            stage,
            activity: Some(ActivityKind::Pdf),
            signals: SignalSet {
                sebr: 10.0,
                blink_rate_min: 12.0,
                perclos: 20.0,
                pct_incomplete: 5.0,
                closure_time: 0.2,
                yawns: 0,
                eye_velocity: 0.05,
                subjective_level: 4,
                max_without_blink: 6,
                alerts: 1,
            },
            elapsed_seconds: Some(300),
            fatigued: false,
            fatigue_moments: None,
        }
    }

    fn new_session(user_id: i64, model: SessionModel) -> NewSession {
        NewSession {
            user_id,
            activity: Some(ActivityKind::Video),
            source: "webcam".into(),
            model,
        }
    }

    #[tokio::test]
    async fn invalid_report_touches_nothing() {
        let (c, _) = controller();
        let mut r = report(1, None);
        r.signals.perclos = f64::NAN;
        assert_matches!(c.submit(r).await, Err(TrackingError::Validation(_)));

        let conn = c.pool.get().unwrap();
        assert_eq!(SessionRepo::count_open_for_user(&conn, 1).unwrap(), 0);
    }

    #[tokio::test]
    async fn continuous_report_closes_and_diagnoses() {
        let (c, service) = controller();
        let outcome = c.submit(report(1, None)).await.unwrap();
        assert!(outcome.created);
        assert!(outcome.closed);
        assert!(outcome.superseded_session_id.is_none());
        assert!(outcome.diagnosis.is_some());
        assert_eq!(service.calls(), 1);

        let details = c.session_details(&outcome.session_id).await.unwrap();
        assert!(!details.session.is_open());
        assert_eq!(details.session.total_seconds, Some(300));
        assert_eq!(details.session.alert_count, Some(1));
        assert_eq!(details.session.final_fatigue, Some(false));
        assert_eq!(details.measurement_count, 1);
        assert!(details.diagnosis.is_some());
    }

    #[tokio::test]
    async fn staged_initial_keeps_session_open() {
        let (c, service) = controller();
        let outcome = c.submit(report(2, Some(Stage::Initial))).await.unwrap();
        assert!(outcome.created);
        assert!(!outcome.closed);
        assert!(outcome.diagnosis.is_none());
        assert!(outcome.diagnosis_error.is_none());
        assert_eq!(service.calls(), 0);
    }

    #[tokio::test]
    async fn staged_final_without_initial_degrades_to_not_ready() {
        let (c, service) = controller();
        let outcome = c.submit(report(2, Some(Stage::Final))).await.unwrap();
        assert!(outcome.closed);
        assert!(outcome.diagnosis.is_none());
        assert_eq!(outcome.diagnosis_error, Some(vigil_core::ErrorCategory::NotReady));
        assert_eq!(service.calls(), 0);
    }

    #[tokio::test]
    async fn explicit_closed_session_is_rejected() {
        let (c, _) = controller();
        let first = c.submit(report(3, None)).await.unwrap();
        let mut again = report(3, None);
        again.session_id = Some(first.session_id.clone());
        assert_matches!(c.submit(again).await, Err(TrackingError::SessionClosed(id)) if id == first.session_id);
    }

    #[tokio::test]
    async fn explicit_unknown_session_is_not_found() {
        let (c, _) = controller();
        let mut r = report(3, None);
        r.session_id = Some(SessionId::from("nope"));
        assert_matches!(c.submit(r).await, Err(TrackingError::SessionNotFound(_)));
    }

    #[tokio::test]
    async fn explicit_session_of_other_user_is_rejected() {
        let (c, _) = controller();
        let session = c
            .create_session(&new_session(4, SessionModel::Continuous))
            .await
            .unwrap();
        let mut r = report(5, None);
        r.session_id = Some(session.id);
        assert_matches!(c.submit(r).await, Err(TrackingError::Validation(msg)) if msg.contains("does not belong"));
    }

    #[tokio::test]
    async fn explicit_session_of_other_model_is_rejected() {
        let (c, _) = controller();
        let session = c
            .create_session(&new_session(6, SessionModel::Continuous))
            .await
            .unwrap();
        let mut r = report(6, Some(Stage::Initial));
        r.session_id = Some(session.id.clone());
        assert_matches!(
            c.submit(r).await,
            Err(TrackingError::Validation(msg)) if msg.contains("continuous")
        );
        let details = c.session_details(&session.id).await.unwrap();
        assert!(details.session.is_open());
        assert_eq!(details.measurement_count, 0);
    }

    #[tokio::test]
    async fn abandoned_staged_session_does_not_block_continuous_reports() {
        let (c, service) = controller();
        let staged = c.submit(report(6, Some(Stage::Initial))).await.unwrap();
        assert!(!staged.closed);

        let outcome = c.submit(report(6, None)).await.unwrap();
        assert!(outcome.created);
        assert!(outcome.closed);
        assert_ne!(outcome.session_id, staged.session_id);
        assert_eq!(outcome.superseded_session_id.as_ref(), Some(&staged.session_id));
        assert!(outcome.diagnosis.is_some());
        assert_eq!(service.calls(), 1);

        let old = c.session_details(&staged.session_id).await.unwrap();
        assert!(!old.session.is_open());
        assert_eq!(old.session.total_seconds, None);
        assert_eq!(old.measurement_count, 1);
        assert!(old.diagnosis.is_none());

        // A later continuous report finds nothing open and starts over.
        let next = c.submit(report(6, None)).await.unwrap();
        assert!(next.created);
        assert!(next.superseded_session_id.is_none());
    }

    #[tokio::test]
    async fn open_continuous_session_gives_way_to_staged_flow() {
        let (c, _) = controller();
        let open = c
            .create_session(&new_session(7, SessionModel::Continuous))
            .await
            .unwrap();

        let initial = c.submit(report(7, Some(Stage::Initial))).await.unwrap();
        assert!(initial.created);
        assert!(!initial.closed);
        assert_eq!(initial.superseded_session_id, Some(open.id.clone()));

        let closing = c.submit(report(7, Some(Stage::Final))).await.unwrap();
        assert!(!closing.created);
        assert_eq!(closing.session_id, initial.session_id);
        assert!(closing.closed);
        assert!(closing.superseded_session_id.is_none());

        let old = c.session_details(&open.id).await.unwrap();
        assert!(!old.session.is_open());
        assert_eq!(old.measurement_count, 0);
    }

    #[tokio::test]
    async fn create_session_conflicts_with_open_one() {
        let (c, _) = controller();
        let open = c
            .create_session(&new_session(7, SessionModel::Staged))
            .await
            .unwrap();
        assert_eq!(open.source, "webcam");
        assert_matches!(
            c.create_session(&new_session(7, SessionModel::Staged)).await,
            Err(TrackingError::Conflict { open_session_id }) if open_session_id == open.id
        );
    }

    #[tokio::test]
    async fn create_session_rejects_bad_user() {
        let (c, _) = controller();
        assert_matches!(
            c.create_session(&new_session(0, SessionModel::Staged)).await,
            Err(TrackingError::Validation(_))
        );
    }

    #[tokio::test]
    async fn end_session_twice() {
        let (c, _) = controller();
        let s = c
            .create_session(&new_session(8, SessionModel::Continuous))
            .await
            .unwrap();
        let first = c.end_session(&s.id).await.unwrap();
        assert!(first.closed);
        let ended_at = first.session.ended_at.clone();
        assert!(ended_at.is_some());

        let second = c.end_session(&s.id).await.unwrap();
        assert!(!second.closed);
        assert_eq!(second.session.ended_at, ended_at);
    }

    #[tokio::test]
    async fn end_unknown_session() {
        let (c, _) = controller();
        assert_matches!(c.end_session("nope").await, Err(TrackingError::SessionNotFound(_)));
    }

    #[tokio::test]
    async fn rest_break_uses_catalogue_name() {
        let (c, _) = controller();
        let s = c
            .create_session(&new_session(9, SessionModel::Continuous))
            .await
            .unwrap();
        let entry = c
            .record_rest_break(
                &s.id,
                &RestBreak {
                    activity_id: 3,
                    activity_name: None,
                    duration_secs: 60,
                },
            )
            .await
            .unwrap();
        assert_eq!(entry["activity"], "Descanso");

        let details = c.session_details(&s.id).await.unwrap();
        let log = details.session.activity_log.as_array().unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0]["kind"], "rest_break");
        assert_eq!(log[0]["duration_secs"], 60);
    }

    #[tokio::test]
    async fn rest_break_validation() {
        let (c, _) = controller();
        let s = c
            .create_session(&new_session(9, SessionModel::Continuous))
            .await
            .unwrap();
        let zero = RestBreak {
            activity_id: 1,
            activity_name: None,
            duration_secs: 0,
        };
        assert_matches!(
            c.record_rest_break(&s.id, &zero).await,
            Err(TrackingError::Validation(_))
        );
        let unknown = RestBreak {
            activity_id: 42,
            activity_name: None,
            duration_secs: 10,
        };
        assert_matches!(
            c.record_rest_break(&s.id, &unknown).await,
            Err(TrackingError::Validation(_))
        );
        let missing = RestBreak {
            activity_id: 1,
            activity_name: None,
            duration_secs: 10,
        };
        assert_matches!(
            c.record_rest_break("nope", &missing).await,
            Err(TrackingError::SessionNotFound(_))
        );
    }

    #[test]
    fn rest_activities_catalogue() {
        let (c, _) = controller();
        assert_eq!(c.rest_activities().len(), 3);
        assert_eq!(c.rest_activities()[0].name, "20-20-20");
    }
}
