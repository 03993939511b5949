//! Stateless repositories, one per table. Every method takes `&Connection`
//! so callers decide the transaction boundary.

pub mod diagnosis;
pub mod measurement;
pub mod session;

pub use diagnosis::DiagnosisRepo;
pub use measurement::{MeasurementRepo, NewMeasurement};
pub use session::{CloseSummary, CreateSessionOptions, SessionRepo};
