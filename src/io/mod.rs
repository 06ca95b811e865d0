//! Export formats.

pub mod csv;

pub use self::csv::{EXOFOP_TARGET_URL, ExportMode, HEADER, exofop_link, to_csv, to_csv_row, write_csv};
