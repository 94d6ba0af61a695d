//! Error taxonomy for the light node
//!
//! One error enum per collaborator boundary. Every per-tree error is
//! recoverable: the scheduler logs it and moves on to the next tree. Only a
//! failure to list trees at all is surfaced as a cycle-level failure.

use thiserror::Error;

/// Errors from the tree data source
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum QueryError {
    /// The data source could not be reached
    #[error("data source unreachable: {message}")]
    Transport {
        /// Underlying transport failure
        message: String,
    },

    /// The data source answered with a non-success status
    #[error("data source returned status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// The response could not be decoded
    #[error("malformed data source response: {message}")]
    Malformed {
        /// Decode failure detail
        message: String,
    },

    /// No tree exists under the requested identifier
    #[error("unknown tree: {tree_id}")]
    UnknownTree {
        /// The identifier that was requested
        tree_id: String,
    },
}

impl QueryError {
    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a malformed-response error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

/// Errors from the proof generation request
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ProveError {
    /// The prover could not be reached
    #[error("prover unreachable: {message}")]
    Transport {
        /// Underlying transport failure
        message: String,
    },

    /// The prover answered with a non-success status
    #[error("prover returned status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// The response could not be decoded or carried no proof
    #[error("malformed prove response: {message}")]
    Malformed {
        /// Decode failure detail
        message: String,
    },
}

impl ProveError {
    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a malformed-response error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

/// Errors from the proof verification request
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum VerifyError {
    /// The verifier could not be reached
    #[error("verifier unreachable: {message}")]
    Transport {
        /// Underlying transport failure
        message: String,
    },

    /// The verifier answered with a non-success status
    #[error("verifier returned status {status}: {body}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// The response could not be decoded
    #[error("malformed verify response: {message}")]
    Malformed {
        /// Decode failure detail
        message: String,
    },

    /// The verifier explicitly rejected the proof
    #[error("proof rejected by verifier")]
    Rejected,
}

impl VerifyError {
    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Create a malformed-response error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::Malformed {
            message: message.into(),
        }
    }
}

/// Errors from the downstream submission
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmitError {
    /// The submission endpoint could not be reached
    #[error("submission endpoint unreachable: {message}")]
    Transport {
        /// Underlying transport failure
        message: String,
    },

    /// The downstream ledger refused the submission
    #[error("submission rejected ({status}): {body}")]
    Rejected {
        /// HTTP status code
        status: u16,
        /// Response body, possibly empty
        body: String,
    },

    /// The endpoint acknowledged but reported the submission as not accepted
    #[error("submission not accepted: {message}")]
    NotAccepted {
        /// Detail reported by the ledger
        message: String,
    },
}

impl SubmitError {
    /// Create a transport error
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }
}

/// Errors from the wallet signer
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SigningError {
    /// The private key is missing or malformed
    #[error("invalid private key: {message}")]
    InvalidKey {
        /// Parse failure detail
        message: String,
    },

    /// The signature could not be produced or parsed
    #[error("signature failure: {message}")]
    Signature {
        /// Failure detail
        message: String,
    },
}

/// Errors while loading or validating configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("failed to read config file {path}: {source}")]
    Read {
        /// Path that was read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid TOML for this schema
    #[error("failed to parse config file {path}: {source}")]
    Parse {
        /// Path that was parsed
        path: String,
        /// Underlying parse error
        #[source]
        source: toml::de::Error,
    },

    /// The configuration could not be rendered
    #[error("failed to render config: {0}")]
    Render(#[from] toml::ser::Error),

    /// An environment override carried an unparsable value
    #[error("invalid value for {key}: {value}")]
    InvalidEnv {
        /// Environment variable name
        key: String,
        /// Offending value
        value: String,
    },

    /// A required field is missing or out of range
    #[error("invalid configuration: {0}")]
    Invalid(String),
}
