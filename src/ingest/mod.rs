//! Tabular input ingestion: delimited rows in, validated [`Record`]s or skip outcomes out.

pub mod reader;
pub mod record;

pub use reader::{Delimiter, IngestOptions, IngestedBatch, RecordReader, ingest_file};
pub use record::{Record, RecordFields, RowOutcome, SkipReason};
