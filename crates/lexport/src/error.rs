// Export error types

use thiserror::Error;

/// Result type for export operations
pub type Result<T> = std::result::Result<T, ExportError>;

/// Error types for exports
#[derive(Debug, Error)]
pub enum ExportError {
    /// Record could not be written
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Output file could not be written
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Writer output could not be turned into text
    #[error("Encoding error: {0}")]
    Encoding(String),
}
