//! Derivation of computed columns.

mod engine;
mod steps;

pub use engine::{DerivationEngine, DerivationReport, StepOutcome};
pub use steps::DerivationStep;
