//! Schema-driven record assembly engine.
//!
//! Resolves a template schema into a typed field catalog, loads rows from
//! heterogeneous sources, joins them on a configured key, then maps,
//! coerces and validates field values into submission-ready records.

pub mod coerce;
pub mod generate;
pub mod join;
pub mod map;
pub mod pipeline;
pub mod preflight;
pub mod schema;
pub mod sources;
pub mod validate;

pub use coerce::coerce;
pub use generate::{TODO_SOURCE, generate_config};
pub use join::join_records;
pub use map::{RawValue, map_field};
pub use pipeline::{PopulateError, assemble_record, assemble_records, run_population};
pub use preflight::{ConfigError, preflight};
pub use schema::{KEY_MARKER, SchemaError, resolve_schema};
pub use sources::{LoadedSources, SourceError, load_sources, required_sources};
pub use validate::{DropCause, FieldOutcome, NULL_MARKER, check_field};
