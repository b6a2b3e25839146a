//! Service error types

use thiserror::Error;

/// Errors that can occur talking to the generative-AI service
#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Prompt rendering error: {0}")]
    Template(#[from] handlebars::RenderError),

    #[error("Received an empty response from the AI. Please try a different query.")]
    EmptyNarrative,

    #[error("No image data found in response for '{place}'")]
    NoImage { place: String },

    #[error("API key not found. Set the {env} environment variable.")]
    MissingApiKey { env: String },
}

impl ServiceError {
    /// Check if this failure came from the service rather than local setup
    pub fn is_remote(&self) -> bool {
        match self {
            ServiceError::Api { .. } => true,
            ServiceError::Network(_) => true,
            ServiceError::EmptyNarrative => true,
            ServiceError::NoImage { .. } => true,
            ServiceError::Json(_) => false,
            ServiceError::Template(_) => false,
            ServiceError::MissingApiKey { .. } => false,
        }
    }
}
