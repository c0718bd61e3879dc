use crate::models::RecordSet;
use axum::http::StatusCode;
use thiserror::Error;

/// Why an aggregation could not produce a value.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricError {
    #[error("aggregation over an empty record set")]
    EmptyInput,

    #[error("ratio with a zero denominator")]
    DivideByZero,

    #[error("total does not fit the value type")]
    Overflow,
}

/// Failures while loading a dataset file.
#[derive(Error, Debug)]
pub enum DatasetError {
    #[error("failed to read dataset file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse dataset file: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("{set} row '{label}' has invalid volume {volume}")]
    InvalidVolume {
        set: RecordSet,
        label: String,
        volume: f64,
    },

    #[error("{set} row '{label}' has success rate {rate} outside 0..=100")]
    InvalidRate {
        set: RecordSet,
        label: String,
        rate: f64,
    },

    #[error("{set} contains duplicate key '{key}'")]
    DuplicateKey { set: RecordSet, key: String },
}

#[derive(Debug)]
pub struct AppError {
    pub status: StatusCode,
    pub message: String,
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }
}

impl axum::response::IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status, self.message).into_response()
    }
}
