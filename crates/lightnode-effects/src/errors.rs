//! Handler construction errors

use thiserror::Error;

use lightnode_core::SigningError;

/// Failures while building production handlers
#[derive(Debug, Error)]
pub enum HandlerError {
    /// The shared HTTP client could not be built
    #[error("failed to build HTTP client: {message}")]
    HttpClient {
        /// Builder failure detail
        message: String,
    },

    /// The auth token cannot be sent as a header value
    #[error("invalid auth token header: {message}")]
    InvalidHeader {
        /// Header failure detail
        message: String,
    },

    /// The wallet key is unusable
    #[error(transparent)]
    Signing(#[from] SigningError),
}
