//! Error types for HTTP collaborators.

use tagsoup_markup::error::ServiceError;

/// Error from an HTTP request.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    /// Transport failure (DNS, connect, timeout, TLS).
    #[error("HTTP error for {url}: {message}")]
    Http { url: String, message: String },

    /// The server answered with an error status.
    #[error("HTTP {status} from {url}: {body}")]
    Status {
        url: String,
        status: u16,
        body: String,
    },

    /// The response body could not be read.
    #[error("failed to read response from {url}: {message}")]
    Body { url: String, message: String },
}

impl FetchError {
    pub(crate) fn http(url: &str, err: &ureq::Error) -> Self {
        Self::Http {
            url: url.to_owned(),
            message: err.to_string(),
        }
    }

    pub(crate) fn body(url: &str, err: &ureq::Error) -> Self {
        Self::Body {
            url: url.to_owned(),
            message: err.to_string(),
        }
    }
}

impl From<FetchError> for ServiceError {
    fn from(e: FetchError) -> Self {
        match e {
            FetchError::Http { url, message } => ServiceError::Request { url, message },
            FetchError::Status { url, status, .. } => ServiceError::Status { url, status },
            FetchError::Body { message, .. } => ServiceError::Response(message),
        }
    }
}
