//! # vigil-tracking
//!
//! The fatigue tracking core:
//!
//! - [`LifecycleController`]: resolves sessions, records measurements,
//!   closes sessions, and owns the transaction boundary of a submission
//! - [`MeasurementRecorder`]: inserts measurements on the caller's transaction
//! - [`DiagnosisReconciler`]: cache check, service call, idempotent upsert
//!
//! Every component receives the connection pool explicitly.

#![deny(unsafe_code)]

mod blocking;
pub mod controller;
pub mod errors;
pub mod metrics;
pub mod reconciler;
pub mod recorder;
pub mod report;
pub mod rest;

pub use controller::{EndOutcome, LifecycleController, NewSession, RestBreak, SessionDetails};
pub use errors::{Result, TrackingError};
pub use reconciler::{DiagnosisReconciler, ReconcilePlan};
pub use recorder::{MeasurementRecorder, Recording};
pub use report::{FatigueReport, SubmissionOutcome};
pub use rest::{REST_ACTIVITIES, RestActivity};
