pub mod error;
pub mod rows;
pub mod table;

pub use error::{FormatError, IngestError};
pub use rows::{parse_json_rows, parse_source_content, read_local_rows, table_to_rows};
pub use table::{RawTable, parse_delimited};
