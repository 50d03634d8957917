//! Error types.

/// Bracket text the parser could not accept.
///
/// Carries how many bytes of input were consumed before the failure. The
/// parser re-emits that span as literal text and resumes right after it,
/// so the offset is always at least one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("malformed markup, {consumed} bytes taken as literal text")]
pub(crate) struct SyntaxError {
    pub consumed: usize,
}

impl SyntaxError {
    pub(crate) fn at(consumed: usize) -> Self {
        Self { consumed }
    }
}

/// A tag refused to be built from its value and children.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NodeError {
    #[error("[{tag}] requires a value or content")]
    Empty { tag: &'static str },

    #[error("[{tag}] does not take a value")]
    UnexpectedValue { tag: &'static str },

    #[error("[{tag}] target is not allowed: {target}")]
    Rejected { tag: &'static str, target: String },

    #[error(transparent)]
    Video(#[from] VideoError),
}

/// A video URL no adapter accepted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VideoError {
    #[error("no video adapter matches the URL")]
    NoMatch,

    #[error("{adapter} URL not recognized: {reason}")]
    NotRecognized {
        adapter: &'static str,
        reason: String,
    },
}

impl VideoError {
    pub(crate) fn not_recognized(adapter: &'static str, reason: impl Into<String>) -> Self {
        Self::NotRecognized {
            adapter,
            reason: reason.into(),
        }
    }
}

/// Selector syntax outside the supported subset.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SelectorError {
    #[error("empty selector")]
    Empty,

    #[error("unsupported selector {selector:?}: only node names and descendant chains are supported")]
    Unsupported { selector: String },
}

/// An external collaborator failed.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error("request to {url} failed: {message}")]
    Request { url: String, message: String },

    #[error("unexpected status {status} from {url}")]
    Status { url: String, status: u16 },

    #[error("invalid response: {0}")]
    Response(String),

    #[error("service unavailable: {0}")]
    Unavailable(String),
}
