//! Record validation against a field schema.

mod error;
mod report;
mod validator;

pub use error::{ErrorKind, ValidationError};
pub use report::{ValidationReport, ValidationSummary};
pub use validator::{filter_valid, RecordValidator};
