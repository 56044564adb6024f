//! Custom error types for pubcount.
//!
//! All library functions return `Result<T, PubcountError>` instead of using `unwrap()`.

use thiserror::Error;

/// Main error type for pubcount operations.
#[derive(Debug, Error)]
pub enum PubcountError {
    /// Caller supplied a bad source, year, search term or URL
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Result page has an unexpected structure
    #[error("Parse error: {0}")]
    Parse(String),

    /// Provider rejected the query itself (e.g. arXiv's "Whoops!" page)
    #[error("Query error: {0}")]
    Query(String),

    /// Network/HTTP request error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Rate limited by the provider
    #[error("Rate limited, retry after {0}s")]
    RateLimited(u64),

    /// Provider answered with a non-success status
    #[error("API error: {code} - {message}")]
    Api {
        /// HTTP status code
        code: i32,
        /// Error message
        message: String,
    },

    /// File I/O error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// CSV writer error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Chart rendering error
    #[error("Chart error: {0}")]
    Chart(String),

    /// Configuration error
    #[error("Config error: {0}")]
    Config(String),
}

/// Result type alias using `PubcountError`
pub type Result<T> = std::result::Result<T, PubcountError>;

/// Extension trait for adding context to Option types
pub trait OptionExt<T> {
    /// Convert Option to Result with a parse error message
    fn ok_or_parse(self, msg: &str) -> Result<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_parse(self, msg: &str) -> Result<T> {
        self.ok_or_else(|| PubcountError::Parse(msg.to_string()))
    }
}
