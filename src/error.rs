//! Error taxonomy for a sweep run.
//!
//! Configuration, date, required-field and UI-wait failures abort the run.
//! [`ScrapeError::ImageFetch`] is only ever logged by the report stage.

use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ScrapeError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Malformed date: {text:?}")]
    MalformedDate { text: String },

    #[error("Missing required field: {field}")]
    MissingRequiredField { field: &'static str },

    #[error("UI not ready: {action} (waited {waited:?})")]
    TransientUi {
        action: &'static str,
        waited: Duration,
    },

    #[error("Image fetch failed for {slot}: {reason}")]
    ImageFetch { slot: String, reason: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Work item error: {0}")]
    WorkItem(#[from] serde_yaml::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

impl ScrapeError {
    /// Failures that must abort the run rather than degrade a single record.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ScrapeError::ImageFetch { .. })
    }
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
