//! Data engineering: dataset frame, schemas, cleaning, ingestion, validation.

pub mod clean;
pub mod frame;
pub mod ingest;
pub mod schema;
pub mod validate;

pub use clean::drop_incomplete_rows;
pub use frame::DataFrame;
pub use ingest::ArchiveFetcher;
pub use schema::{ColumnRange, ColumnType, RangeSchema, SchemaStore, TypeSchema};
pub use validate::DatasetValidator;
