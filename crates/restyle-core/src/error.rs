//! Error types for the upload-and-generate workflow
//!
//! Only the messages in this module's constants are ever shown to the user.
//! The `Display` output of the error enums is diagnostic and goes to the log.

use std::path::PathBuf;

/// Banner text for a rejected (non-image) candidate file
pub const INVALID_IMAGE_MESSAGE: &str = "Please upload a valid image file.";

/// Banner text when generation is triggered without a staged image
pub const NO_IMAGE_MESSAGE: &str = "Please upload an image first.";

/// Banner text when a candidate file exists but could not be read
pub const UNREADABLE_FILE_MESSAGE: &str = "Could not read the selected file.";

/// Banner text for any failed generation request
pub const GENERATION_FAILED_MESSAGE: &str = "Failed to generate image. Please try again.";

/// Input problems the user fixes locally
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    #[error("'{name}' declares media type '{media_type}', expected image/*")]
    NotAnImage { name: String, media_type: String },

    #[error("could not read '{}': {source}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("no image staged")]
    NoImageStaged,
}

impl ValidationError {
    pub fn user_message(&self) -> &'static str {
        match self {
            ValidationError::NotAnImage { .. } => INVALID_IMAGE_MESSAGE,
            ValidationError::Unreadable { .. } => UNREADABLE_FILE_MESSAGE,
            ValidationError::NoImageStaged => NO_IMAGE_MESSAGE,
        }
    }
}

/// Failures of a single generation request
#[derive(Debug, thiserror::Error)]
pub enum GenerateError {
    /// Backend answered with a non-2xx status
    #[error("generation request failed with status {status}: {body}")]
    Request { status: u16, body: String },

    /// Network failure, timeout, or unreadable response body
    #[error("generation transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The background task carrying the request died before reporting
    #[error("generation task ended unexpectedly: {0}")]
    Aborted(String),
}

impl GenerateError {
    pub fn user_message(&self) -> &'static str {
        GENERATION_FAILED_MESSAGE
    }
}

/// Reasons a workflow transition was refused
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("a generation request is already in flight")]
    InFlight,
}
