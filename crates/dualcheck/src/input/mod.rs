//! Input loading and the typed dataset model.

mod dataset;
mod discovery;
mod parser;
mod source;
mod watcher;

pub use dataset::{Dataset, Value};
pub use discovery::{latest_file, list_files};
pub use parser::{CsvLoader, LoaderConfig};
pub use source::{Loader, SourceDescriptor, SourceMetadata};
pub use watcher::DirectoryWatcher;
