use reqwest::StatusCode;
use thiserror::Error;

/// Failures from the users REST API. Every operation is attempted exactly
/// once; retrying is the caller's decision.
#[derive(Debug, Error)]
pub enum GatewayError {
    /// The request never completed: connect failure, timeout, or an
    /// undecodable success body.
    #[error("request could not be completed: {0}")]
    Transport(#[from] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("server responded with {status}: {message}")]
    Remote { status: StatusCode, message: String },
}

#[derive(Debug, Error)]
pub enum UploadError {
    #[error("media request could not be completed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("media host rejected the request with {status}: {message}")]
    Rejected { status: StatusCode, message: String },
}

/// Local, pre-network checks. A validation failure never reaches the wire.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("'{filename}' is not an image (content type '{content_type}')")]
    NotAnImage {
        filename: String,
        content_type: String,
    },
    #[error("'{filename}' is {size} bytes, over the {limit} byte limit")]
    ImageTooLarge {
        filename: String,
        size: u64,
        limit: u64,
    },
    #[error("{field} is required")]
    MissingField { field: &'static str },
}

impl ValidationError {
    pub fn missing(field: &'static str) -> Self {
        Self::MissingField { field }
    }
}

#[derive(Debug, Error)]
pub enum FormError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error(transparent)]
    Gateway(#[from] GatewayError),
    #[error("an image upload is still in progress")]
    UploadInFlight,
    #[error("a submit is already in progress")]
    SubmitInFlight,
    #[error("the form is not open")]
    NotOpen,
}
