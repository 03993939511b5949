//! Diagnosis Reconciler.
//!
//! Reconciliation is split in two so no connection is held across the
//! external call:
//!
//! 1. [`DiagnosisReconciler::prepare`] runs on the caller's connection (often
//!    inside its transaction). It returns the cached diagnosis if one exists,
//!    otherwise gathers the inputs for a call.
//! 2. [`DiagnosisReconciler::complete`] makes the call with no connection
//!    checked out, then upserts the result in a short transaction of its own.
//!
//! Connection work in [`DiagnosisReconciler::reconcile`] and the upsert run on
//! tokio's blocking pool.
//!
//! The upsert is keyed by session id, so concurrent completions for the same
//! session leave one row (last write wins).

use std::sync::Arc;
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use rusqlite::Connection;
use tracing::{debug, info, instrument, warn};
use vigil_core::{Diagnosis, SessionId, SessionModel, Stage};
use vigil_diagnosis::{DiagnosisError, DiagnosisRequest, DiagnosisService, MeasurementSnapshot};
use vigil_store::{ConnectionPool, DiagnosisRepo, MeasurementRepo, MeasurementRow, SessionRow, SessionRepo};

use crate::blocking;
use crate::errors::{Result, TrackingError};
use crate::metrics::{DIAGNOSIS_REQUESTS_TOTAL, DIAGNOSIS_REQUEST_DURATION_SECONDS};

/// Default hard limit for one diagnosis call.
pub const DEFAULT_CALL_TIMEOUT: Duration = Duration::from_secs(60);

/// What [`DiagnosisReconciler::complete`] has to do.
#[derive(Clone, Debug)]
pub enum ReconcilePlan {
    /// A diagnosis is already stored; return it as is.
    Cached(Diagnosis),
    /// Call the service with this request and store the answer.
    Call(DiagnosisRequest),
    /// Inputs are missing.
    NotReady(String),
}

/// Produces at most one stored diagnosis per session.
pub struct DiagnosisReconciler {
    pool: ConnectionPool,
    service: Arc<dyn DiagnosisService>,
    call_timeout: Duration,
}

impl DiagnosisReconciler {
    /// Create a reconciler over `pool` that calls `service`.
    pub fn new(pool: ConnectionPool, service: Arc<dyn DiagnosisService>) -> Self {
        Self {
            pool,
            service,
            call_timeout: DEFAULT_CALL_TIMEOUT,
        }
    }

    /// Override the hard limit for one service call.
    #[must_use]
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Name of the configured diagnosis backend.
    pub fn backend(&self) -> &'static str {
        self.service.name()
    }

    /// Get-or-create the diagnosis of a session.
    #[instrument(skip(self), fields(backend = self.service.name()))]
    pub async fn reconcile(&self, session_id: &str) -> Result<Diagnosis> {
        let pool = self.pool.clone();
        let session_id = session_id.to_string();
        let plan = blocking::run(move || {
            let conn = pool.get()?;
            let session = SessionRepo::get_by_id(&conn, &session_id)?
                .ok_or(TrackingError::SessionNotFound(session_id))?;
            Self::prepare(&conn, &session)
        })
        .await?;
        self.complete(plan).await
    }

    /// Check the cache and gather inputs for `session`.
    pub fn prepare(conn: &Connection, session: &SessionRow) -> Result<ReconcilePlan> {
        if let Some(stored) = DiagnosisRepo::get(conn, &session.id)? {
            debug!(session_id = %session.id, "diagnosis cache hit");
            return Ok(ReconcilePlan::Cached(stored.result));
        }

        let request = match session.model {
            SessionModel::Staged => {
                let initial = MeasurementRepo::latest_by_stage(conn, &session.id, Stage::Initial)?;
                let closing = MeasurementRepo::latest_by_stage(conn, &session.id, Stage::Final)?;
                match (initial, closing) {
                    (Some(initial), Some(closing)) => DiagnosisRequest::staged(
                        session.id.clone(),
                        session.user_id,
                        snapshot(initial),
                        snapshot(closing),
                    ),
                    (initial, _) => {
                        let missing = if initial.is_none() { "INICIAL" } else { "FINAL" };
                        return Ok(ReconcilePlan::NotReady(format!(
                            "staged session has no {missing} measurement"
                        )));
                    }
                }
            }
            SessionModel::Continuous => match MeasurementRepo::latest(conn, &session.id)? {
                Some(latest) => {
                    DiagnosisRequest::continuous(session.id.clone(), session.user_id, snapshot(latest))
                }
                None => {
                    return Ok(ReconcilePlan::NotReady(
                        "session has no measurements".to_string(),
                    ));
                }
            },
        };
        Ok(ReconcilePlan::Call(request))
    }

    /// Carry out a plan. Must be called with no connection checked out by
    /// the current task.
    pub async fn complete(&self, plan: ReconcilePlan) -> Result<Diagnosis> {
        match plan {
            ReconcilePlan::Cached(diagnosis) => Ok(diagnosis),
            ReconcilePlan::NotReady(reason) => Err(TrackingError::NotReady(reason)),
            ReconcilePlan::Call(request) => {
                let diagnosis = self.call_service(&request).await?;
                self.store(request.session_id().clone(), diagnosis).await
            }
        }
    }

    async fn call_service(&self, request: &DiagnosisRequest) -> Result<Diagnosis> {
        let backend = self.service.name();
        let start = Instant::now();
        let result = match tokio::time::timeout(self.call_timeout, self.service.diagnose(request)).await {
            Ok(result) => result,
            Err(_elapsed) => Err(DiagnosisError::Timeout {
                after_ms: u64::try_from(self.call_timeout.as_millis()).unwrap_or(u64::MAX),
            }),
        };
        histogram!(DIAGNOSIS_REQUEST_DURATION_SECONDS, "backend" => backend)
            .record(start.elapsed().as_secs_f64());

        match result {
            Ok(diagnosis) => {
                counter!(DIAGNOSIS_REQUESTS_TOTAL, "backend" => backend, "outcome" => "success")
                    .increment(1);
                info!(
                    session_id = %request.session_id(),
                    severity = %diagnosis.severity(),
                    "diagnosis received"
                );
                Ok(diagnosis)
            }
            Err(e) => {
                counter!(DIAGNOSIS_REQUESTS_TOTAL, "backend" => backend, "outcome" => e.kind())
                    .increment(1);
                warn!(
                    session_id = %request.session_id(),
                    kind = e.kind(),
                    error = %e,
                    "diagnosis call failed"
                );
                Err(e.into())
            }
        }
    }

    async fn store(&self, session_id: SessionId, diagnosis: Diagnosis) -> Result<Diagnosis> {
        let pool = self.pool.clone();
        blocking::run(move || {
            let conn = pool.get()?;
            let tx = conn.unchecked_transaction()?;
            let row = DiagnosisRepo::upsert(&tx, &session_id, &diagnosis)?;
            tx.commit()?;
            Ok(row.result)
        })
        .await
    }
}

fn snapshot(row: MeasurementRow) -> MeasurementSnapshot {
    MeasurementSnapshot {
        activity: row.activity,
        signals: row.signals,
        elapsed_seconds: row.elapsed_seconds,
        fatigued: row.fatigued,
        fatigue_moments: row.fatigue_moments,
        recorded_at: row.recorded_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use serde_json::json;
    use vigil_core::{Severity, SignalSet};
    use vigil_diagnosis::testing::ScriptedDiagnosisService;
    use vigil_store::{CreateSessionOptions, NewMeasurement};

    fn signals(perclos: f64) -> SignalSet {
        SignalSet {
            sebr: 10.0,
            blink_rate_min: 12.0,
            perclos,
            pct_incomplete: 5.0,
            closure_time: 0.2,
            yawns: 0,
            eye_velocity: 0.05,
            subjective_level: 4,
            max_without_blink: 6,
            alerts: 0,
        }
    }

    struct Fixture {
        pool: ConnectionPool,
        service: Arc<ScriptedDiagnosisService>,
        reconciler: DiagnosisReconciler,
    }

    fn fixture() -> Fixture {
        let pool = vigil_store::open_in_memory().unwrap();
        let service = Arc::new(ScriptedDiagnosisService::new());
        let reconciler = DiagnosisReconciler::new(pool.clone(), service.clone());
        Fixture {
            pool,
            service,
            reconciler,
        }
    }

    fn session(pool: &ConnectionPool, model: SessionModel) -> SessionRow {
        let conn = pool.get().unwrap();
        SessionRepo::create(
            &conn,
            &CreateSessionOptions {
                user_id: 1,
                model,
                activity: None,
                source: "",
            },
        )
        .unwrap()
    }

    fn measure(pool: &ConnectionPool, session_id: &str, stage: Option<Stage>, perclos: f64) {
        let conn = pool.get().unwrap();
        let s = signals(perclos);
        let _ = MeasurementRepo::insert(
            &conn,
            &NewMeasurement {
                session_id,
                stage,
                activity: None,
                signals: &s,
                elapsed_seconds: None,
                fatigued: false,
                fatigue_moments: None,
            },
        )
        .unwrap();
    }

    #[tokio::test]
    async fn unknown_session() {
        let f = fixture();
        assert_matches!(
            f.reconciler.reconcile("missing").await,
            Err(TrackingError::SessionNotFound(id)) if id == "missing"
        );
    }

    #[tokio::test]
    async fn continuous_without_measurements_is_not_ready() {
        let f = fixture();
        let s = session(&f.pool, SessionModel::Continuous);
        assert_matches!(f.reconciler.reconcile(&s.id).await, Err(TrackingError::NotReady(_)));
        assert_eq!(f.service.calls(), 0);
    }

    #[tokio::test]
    async fn staged_needs_both_stages() {
        let f = fixture();
        let s = session(&f.pool, SessionModel::Staged);
        measure(&f.pool, &s.id, Some(Stage::Initial), 20.0);
        let err = f.reconciler.reconcile(&s.id).await.unwrap_err();
        assert_matches!(err, TrackingError::NotReady(ref msg) if msg.contains("FINAL"));
        assert_eq!(f.service.calls(), 0);
    }

    #[tokio::test]
    async fn staged_uses_latest_of_each_stage() {
        let f = fixture();
        let s = session(&f.pool, SessionModel::Staged);
        measure(&f.pool, &s.id, Some(Stage::Initial), 15.0);
        measure(&f.pool, &s.id, Some(Stage::Initial), 20.0);
        measure(&f.pool, &s.id, Some(Stage::Final), 30.0);

        let _ = f.reconciler.reconcile(&s.id).await.unwrap();
        let req = f.service.last_request().unwrap();
        assert_matches!(
            req,
            DiagnosisRequest::Staged { ref initial, ref closing, perclos_change_pct: Some(pct), .. }
                if initial.signals.perclos == 20.0 && closing.signals.perclos == 30.0 && pct == 50.0
        );
    }

    #[tokio::test]
    async fn second_call_hits_cache() {
        let f = fixture();
        let s = session(&f.pool, SessionModel::Continuous);
        measure(&f.pool, &s.id, None, 29.0);

        let first = f.reconciler.reconcile(&s.id).await.unwrap();
        let second = f.reconciler.reconcile(&s.id).await.unwrap();
        assert_eq!(f.service.calls(), 1);
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn failure_leaves_no_diagnosis() {
        let f = fixture();
        let s = session(&f.pool, SessionModel::Continuous);
        measure(&f.pool, &s.id, None, 29.0);
        f.service.set_failing(true);

        let err = f.reconciler.reconcile(&s.id).await.unwrap_err();
        assert_matches!(err, TrackingError::DiagnosisUnavailable(DiagnosisError::Status { status: 503, .. }));
        let conn = f.pool.get().unwrap();
        assert!(DiagnosisRepo::get(&conn, &s.id).unwrap().is_none());
    }

    #[tokio::test]
    async fn slow_service_times_out() {
        let pool = vigil_store::open_in_memory().unwrap();
        let service = Arc::new(ScriptedDiagnosisService::new());
        service.set_delay(Some(Duration::from_secs(5)));
        let reconciler = DiagnosisReconciler::new(pool.clone(), service.clone())
            .with_call_timeout(Duration::from_millis(50));
        let s = session(&pool, SessionModel::Continuous);
        measure(&pool, &s.id, None, 10.0);

        let err = reconciler.reconcile(&s.id).await.unwrap_err();
        assert_matches!(err, TrackingError::DiagnosisUnavailable(DiagnosisError::Timeout { after_ms: 50 }));
    }

    #[tokio::test]
    async fn cached_diagnosis_is_returned_verbatim() {
        let f = fixture();
        let s = session(&f.pool, SessionModel::Continuous);
        measure(&f.pool, &s.id, None, 29.0);
        let raw = json!({
            "diagnostico_general": "Fatiga moderada",
            "severidad_fatiga_final": "MODERADA",
            "recomendaciones_generales": ["Descansa", "Hidrátate", "Ajusta el brillo"],
            "detalle": {"perclos": [20.0, 30.0]}
        });
        f.service
            .set_response(serde_json::from_value(raw.clone()).unwrap());

        let _ = f.reconciler.reconcile(&s.id).await.unwrap();
        let cached = f.reconciler.reconcile(&s.id).await.unwrap();
        assert_eq!(cached.severity(), Severity::Moderate);
        assert_eq!(serde_json::to_string(&cached).unwrap(), serde_json::to_string(&raw).unwrap());
    }
}
