//! Error types shared by the library, viewer, and whitepaper flows.

use thiserror::Error;

/// Failure talking to the backend API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// The request never produced a response (DNS, connect, timeout).
    #[error("network error: {0}")]
    Network(String),

    /// The backend answered with a non-success status.
    #[error("backend returned HTTP {status} for {url}")]
    Status { status: u16, url: String },

    /// The requested resource does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    /// The body is JSON but not one of the shapes we understand.
    #[error("unexpected response shape: {0}")]
    UnexpectedShape(String),

    /// The body could not be decoded at all.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound(_) | ApiError::Status { status: 404, .. })
    }
}

/// Rejected chapter navigation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NavigationError {
    #[error("no chapter with id '{0}'")]
    UnknownChapter(String),

    #[error("whitepaper has no chapters")]
    Empty,
}

/// Page-level whitepaper load failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WhitepaperError {
    #[error("no chapters configured")]
    NoChapters,

    #[error("failed to load the whitepaper: all {0} chapters failed")]
    AllChaptersFailed(usize),
}

/// Malformed viewer deep link.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RouteError {
    #[error("invalid viewer link: {0}")]
    Invalid(String),

    #[error("viewer link has no document id")]
    MissingDocument,
}
