pub mod config;
pub mod record;
pub mod schema;
pub mod value;

pub use config::{DEFAULT_ARRAY_DELIMITER, MappingEntry, PopulationConfig, SourceDef};
pub use record::{JoinedRecord, OutputRecord, PopulationOutcome, RawRow, SkipReason, SkippedRecord};
pub use schema::{FieldSpec, FieldType, Schema};
pub use value::TypedValue;
