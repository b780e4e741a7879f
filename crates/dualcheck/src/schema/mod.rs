//! Field schemas for the supported dataset kinds.

pub mod columns;
mod registry;
mod rule;
mod types;

pub use registry::{AbsentColumnPolicy, DatasetKind, Schema};
pub use rule::{Bound, Constraint, FieldRule};
pub use types::{LogicalType, Requirement, Strictness};
