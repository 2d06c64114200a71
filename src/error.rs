use thiserror::Error;

/// Central error type for the Tavola application
#[derive(Error, Debug)]
pub enum ViewerError {
    // ============================================================================
    // Pipeline Errors
    // ============================================================================
    #[error("Column '{0}' not found in the data")]
    ColumnNotFound(String),

    /// Column failed timestamp validation; carries the validator's message
    #[error("{0}")]
    InvalidColumn(String),

    #[error("Invalid grouping period '{0}'. Must be 'day' or 'week'")]
    InvalidPeriod(String),

    #[error("No valid timestamps found in column '{0}'")]
    NoValidTimestamps(String),

    // ============================================================================
    // Sheet Source Errors
    // ============================================================================
    #[error("Sheet '{0}' not found in configuration")]
    SheetNotFound(String),

    #[error("Error loading sheet '{name}': {reason}")]
    FetchFailed { name: String, reason: String },

    // ============================================================================
    // Generic/System Errors
    // ============================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl ViewerError {
    /// Wrap an arbitrary fetch failure with the sheet it belongs to
    pub fn fetch_failed(name: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        ViewerError::FetchFailed {
            name: name.into(),
            reason: reason.to_string(),
        }
    }
}

// Helper type alias for Results
pub type ViewerResult<T> = Result<T, ViewerError>;
