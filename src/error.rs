use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AirQualityError {
    #[error("Input table has no rows")]
    EmptyTable,

    #[error("Required column '{column}' not found in table")]
    Schema { column: String },

    #[error("Column '{column}' has type {dtype}, which cannot be read as a timestamp")]
    UnsupportedTimestamp { column: String, dtype: String },

    #[error("Invalid selection for '{field}': {reason}")]
    InvalidSelection { field: &'static str, reason: String },

    #[error("Failed to read CSV table '{path}'")]
    CsvRead {
        path: PathBuf,
        #[source]
        source: PolarsError,
    },

    #[error("Failed to parse analysis configuration")]
    ConfigParse(#[from] serde_json::Error),

    #[error("Failed processing DataFrame: {0}")]
    Polars(#[from] PolarsError),
}

impl AirQualityError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        AirQualityError::InvalidSelection {
            field,
            reason: reason.into(),
        }
    }
}
