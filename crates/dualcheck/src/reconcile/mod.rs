//! Backup validation of derived columns.
//!
//! Every derived column is recomputed here from the raw columns and compared
//! with what the derivation engine produced. The formulas are maintained
//! separately from `derive` so that drift between the two is detectable.

mod engine;
mod flag;
mod property;
mod weather;

pub use engine::{
    agrees, flagged_rows, DerivedCheck, ReconciliationEngine, ReconciliationReport,
    ReconciliationSummary, TOLERANCE,
};
pub use flag::{FlagKind, ValidationFlag};
