use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProcessingError>;

#[derive(Error, Debug)]
pub enum ProcessingError {
    #[error("File I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Parquet write error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Settings error: {0}")]
    Settings(#[from] config::ConfigError),

    #[error("Validation error: {0}")]
    Validation(#[from] validator::ValidationErrors),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Missing column '{column}' in {file}")]
    MissingColumn { column: String, file: String },

    #[error("Invalid data format: {0}")]
    InvalidFormat(String),

    #[error("{service} request failed: {message}")]
    Service { service: String, message: String },

    #[error("Climate lookup failed at ({latitude:.3}, {longitude:.3}): {message}")]
    ClimateFetch {
        latitude: f64,
        longitude: f64,
        message: String,
    },

    #[error("Cache error at {}: {message}", path.display())]
    Cache { path: PathBuf, message: String },
}

impl ProcessingError {
    pub fn service(service: &str, message: impl Into<String>) -> Self {
        ProcessingError::Service {
            service: service.to_string(),
            message: message.into(),
        }
    }
}
