use thiserror::Error;

#[derive(Error, Debug)]
pub enum PassbookError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[cfg(feature = "xlsx")]
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(#[from] calamine::Error),

    #[error("PDF error: {0}")]
    Pdf(String),

    #[error("{0} is not available for this document")]
    Unsupported(&'static str),

    #[error("Page {page} out of range (document has {count} pages)")]
    PageOutOfRange { page: usize, count: usize },

    #[error("Unknown format: {0}")]
    UnknownFormat(String),

    #[error("Settings error: {0}")]
    Settings(String),

    #[error("No rows could be extracted. The document may be scanned, empty or image-only.")]
    NoRows,

    #[error("Could not identify a date column in {rows} extracted rows. This does not look like a bank statement.")]
    NoDateColumn { rows: usize },

    #[error("No valid transactions found in {rows} extracted rows.")]
    NoTransactions { rows: usize },
}

impl PassbookError {
    /// True for the conditions that mean the input is not a recognizable statement.
    pub fn is_pipeline_failure(&self) -> bool {
        matches!(
            self,
            Self::NoRows | Self::NoDateColumn { .. } | Self::NoTransactions { .. }
        )
    }
}

pub type Result<T> = std::result::Result<T, PassbookError>;
