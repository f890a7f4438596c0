//! pit-ledger
//!
//! Floor-reconciliation arithmetic for the pit.
//!
//! Every contribution to a table's running result for a game day comes from
//! one of three record types (close float, plaque, fill/credit). All of them
//! flow through [`Delta`], so the running result can only ever move by
//! "remove old, add new".
//!
//! Deterministic, pure logic. No IO. No wall-clock.

mod audit;
mod clock;
mod delta;
mod error;
mod float;

pub use audit::{audit, AuditReport, ResultBreakdown, ResultDrift};
pub use clock::GamingDayClock;
pub use delta::{classify_fill_credit, close_result, Delta, FillKind, Source};
pub use error::LedgerError;
pub use float::{ChipFloat, RawFloat, MAX_DENOMINATION_SCALE, MAX_MONEY};
