//! lexport - Exports
//!
//! *L'Export* (The Export) - CSV renderings of the portfolio for spreadsheets, Jira imports and Power BI

#![warn(missing_docs)]
#![warn(unused_extern_crates)]

/// Export error types.
pub mod error;
/// One-sheet project report.
pub mod flat;
/// Jira issue import file.
pub mod jira;
/// Power BI relational tables.
pub mod powerbi;

pub use error::{ExportError, Result};
pub use flat::FlatCsvExporter;
pub use jira::{JiraExportStats, JiraExporter, DEFAULT_PROJECT_KEY};
pub use powerbi::{PowerBiExporter, PowerBiTable, PowerBiTables};

use csv::Writer;

/// Whole numbers keep one decimal ("65.0"), others print in full.
pub(crate) fn format_number(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        format!("{value}")
    }
}

pub(crate) fn yes_no(value: bool) -> &'static str {
    if value {
        "Yes"
    } else {
        "No"
    }
}

/// Finish an in-memory writer and return its UTF-8 contents.
pub(crate) fn finish(writer: Writer<Vec<u8>>) -> Result<String> {
    let data = writer
        .into_inner()
        .map_err(|e| ExportError::Encoding(format!("CSV writer error: {}", e)))?;
    String::from_utf8(data).map_err(|e| ExportError::Encoding(format!("UTF-8 conversion error: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(65.0), "65.0");
        assert_eq!(format_number(0.0), "0.0");
        assert_eq!(format_number(12.5), "12.5");
    }
}
