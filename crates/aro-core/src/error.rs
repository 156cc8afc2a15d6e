//! Shared error type across aro crates.

use thiserror::Error;

/// Client-facing error codes (stable API).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientCode {
    /// Malformed body, query string or config.
    BadRequest,
    /// Sort field is not one of the sortable metric fields.
    InvalidSortField,
    /// Page index or page size out of bounds.
    InvalidPageRequest,
    /// Metric candidate rejected by validation.
    InvalidMetric,
    /// Unsupported config version.
    UnsupportedVersion,
    /// Durable store unreachable (retryable).
    StoreUnavailable,
    /// Internal server error.
    Internal,
}

impl ClientCode {
    /// String representation used in JSON responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ClientCode::BadRequest => "BAD_REQUEST",
            ClientCode::InvalidSortField => "INVALID_SORT_FIELD",
            ClientCode::InvalidPageRequest => "INVALID_PAGE_REQUEST",
            ClientCode::InvalidMetric => "INVALID_METRIC",
            ClientCode::UnsupportedVersion => "UNSUPPORTED_VERSION",
            ClientCode::StoreUnavailable => "STORE_UNAVAILABLE",
            ClientCode::Internal => "INTERNAL",
        }
    }

    /// Whether a caller may retry the same request unchanged.
    pub fn is_retryable(self) -> bool {
        matches!(self, ClientCode::StoreUnavailable)
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, AroError>;

/// Unified error type used by core and server.
#[derive(Debug, Error)]
pub enum AroError {
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("invalid sort field: {0}")]
    InvalidSortField(String),
    #[error("invalid page request: {0}")]
    InvalidPageRequest(String),
    #[error("invalid metric: {0}")]
    InvalidMetric(String),
    #[error("unsupported config version")]
    UnsupportedVersion,
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl AroError {
    /// Map internal error to a stable client-facing code.
    pub fn client_code(&self) -> ClientCode {
        match self {
            AroError::BadRequest(_) => ClientCode::BadRequest,
            AroError::InvalidSortField(_) => ClientCode::InvalidSortField,
            AroError::InvalidPageRequest(_) => ClientCode::InvalidPageRequest,
            AroError::InvalidMetric(_) => ClientCode::InvalidMetric,
            AroError::UnsupportedVersion => ClientCode::UnsupportedVersion,
            AroError::StoreUnavailable(_) => ClientCode::StoreUnavailable,
            AroError::Internal(_) => ClientCode::Internal,
        }
    }
}
