//! # vigil-core
//!
//! Foundation types shared by every Vigil crate:
//!
//! - **Branded IDs**: `SessionId` as a newtype over a UUID v7 string
//! - **Session vocabulary**: `SessionModel`, `Stage`, `ActivityKind`, `FatigueState`
//! - **Signals**: `SignalSet` and `FatigueMoment`, with boundary validation
//! - **Diagnosis**: `Diagnosis` and `Severity`, tolerant of the workflow's field names
//! - **Errors**: `ErrorCategory`, the machine-readable failure taxonomy

#![deny(unsafe_code)]

pub mod diagnosis;
pub mod errors;
pub mod ids;
pub mod session;
pub mod signals;

pub use diagnosis::{Diagnosis, DiagnosisShapeError, Severity};
pub use errors::ErrorCategory;
pub use ids::SessionId;
pub use session::{ActivityKind, FatigueState, SessionModel, Stage};
pub use signals::{FatigueMoment, SignalError, SignalSet};
