use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Input file not found: {path}")]
    InputFileNotFound { path: String },

    #[error("CSV file {path} is missing required column '{column}'")]
    MissingColumn { path: String, column: String },

    #[error("Unexpected API response during {operation}: {detail}")]
    UnexpectedResponse { operation: String, detail: String },
}

impl SyncError {
    pub fn unexpected_response(operation: impl Into<String>, detail: impl Into<String>) -> Self {
        SyncError::UnexpectedResponse {
            operation: operation.into(),
            detail: detail.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SyncError>;
