// ABOUTME: Core library for esm, containing record types, input validation, and the export model.
// ABOUTME: This crate defines the shared data model used by the store backends and the CLI.

pub mod export;
pub mod record;
pub mod validate;

pub use export::{Counts, ExportBundle, ExportSummary, SummaryDocument, TimeRange};
pub use record::{
    Collection, LocationRecord, Record, RecordId, SentimentRecord, VlogRecord, format_timestamp,
    newest_first, now_micros, sort_newest_first, vlog_file_name,
};
pub use validate::{LocationInput, SentimentInput, ValidationError, VlogInput};
