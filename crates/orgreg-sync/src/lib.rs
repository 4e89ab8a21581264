//! Synchronisation engines for the orgreg registry.
//!
//! Two batch routines feed the person store: the directory upsert (one change
//! record from the identity directory at a time) and the HR spreadsheet
//! reconciliation (a whole extract at a time). Both are generic over
//! [`orgreg_core::store::PersonStore`] and write one record per persist call.

pub mod audit;
pub mod error;
pub mod hr;
pub mod resolve;
pub mod upsert;

pub use audit::{AuditSink, TracingAudit};
pub use error::{Error, Result};
pub use hr::{ReconcileSummary, reconcile_sheet};
pub use upsert::{
  UpsertAction, UpsertReport, create_new, update_existing, upsert,
};
