//! FILENAME: core/pivot-grid/src/error.rs

use thiserror::Error;

#[derive(Error, Debug)]
pub enum PivotError {
    #[error("Unknown field(s): {}", fields.join(", "))]
    UnknownFields { fields: Vec<String> },

    #[error("Key segment contains the reserved delimiter: {value:?}")]
    DelimiterInValue { value: String },

    #[error("Invalid page window: start {start} is past end {end}")]
    InvalidWindow { start: usize, end: usize },

    #[error("Page size must be at least 1")]
    InvalidPageSize,

    #[error("Invalid layout configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, PivotError>;
