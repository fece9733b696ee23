//! Error types for the Invoke protocol and the system array
//!
//! Domain errors use thiserror; the collaborator seams (endpoints, listener
//! handlers, mediator loops) report through anyhow and are folded into these
//! enums at the boundary.

use std::io;
use thiserror::Error;

/// Top-level crate error
#[derive(Debug, Error)]
pub enum Error {
    /// Invoke construction or dispatch errors
    #[error("Invoke error: {0}")]
    Invoke(#[from] InvokeError),

    /// System array and routing errors
    #[error("System error: {0}")]
    System(#[from] SystemError),

    /// Wire codec errors
    #[error("Codec error: {0}")]
    Codec(#[from] CodecError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised while building or dispatching an invoke
#[derive(Debug, Error)]
pub enum InvokeError {
    /// A listener was found but its handler failed
    #[error("Listener '{listener}' failed: {message}")]
    HandlerFailed {
        /// Listener name that was dispatched
        listener: String,
        /// Handler failure description
        message: String,
    },

    /// The invoke already carries a parameter name reserved for bookkeeping
    #[error("Parameter '{0}' is reserved")]
    ReservedParameter(String),
}

/// Convenience result alias for invoke operations
pub type InvokeResult<T> = std::result::Result<T, InvokeError>;

/// Errors raised by the system array, systems and roles
#[derive(Debug, Error)]
pub enum SystemError {
    /// No role with the requested name in any system
    #[error("No role with name '{0}'")]
    RoleNotFound(String),

    /// The target system is closing or closed
    #[error("System '{0}' is closed")]
    SystemClosed(String),

    /// The role's owning system no longer exists
    #[error("Role '{0}' has no owning system")]
    RoleDetached(String),

    /// The endpoint reported a failure
    #[error("Transport failure on system '{system}': {message}")]
    Transport {
        /// Name of the failing system
        system: String,
        /// Failure description from the endpoint
        message: String,
    },

    /// Some systems did not accept a broadcast
    #[error("Broadcast failed on {failed} of {total} systems")]
    Broadcast {
        /// Number of systems whose send failed
        failed: usize,
        /// Number of systems the broadcast targeted
        total: usize,
    },

    /// The downstream mediator loop failed to start
    #[error("Mediator failed: {0}")]
    Mediator(String),
}

/// Convenience result alias for system operations
pub type SystemResult<T> = std::result::Result<T, SystemError>;

/// Wire codec errors
#[derive(Debug, Error)]
pub enum CodecError {
    /// Frame shorter than its length prefix claims
    #[error("Truncated frame: expected {expected} bytes, got {actual}")]
    Truncated {
        /// Bytes announced by the prefix (plus the prefix itself)
        expected: usize,
        /// Bytes actually available
        actual: usize,
    },

    /// Frame exceeds the configured limit
    #[error("Frame of {len} bytes exceeds limit of {limit}")]
    FrameTooLarge {
        /// Announced payload length
        len: usize,
        /// Configured maximum
        limit: usize,
    },

    /// Encoding error
    #[error("Invoke encoding failed: {0}")]
    Encoding(String),

    /// Decoding error
    #[error("Invoke decoding failed: {0}")]
    Decoding(String),

    /// Preserves text did not describe an invoke node tree
    #[error("Invalid invoke text: {0}")]
    Text(String),
}

/// Convenience result alias for codec operations
pub type CodecResult<T> = std::result::Result<T, CodecError>;

/// Configuration file errors
#[derive(Debug, Error)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type using the top-level [`Error`]
pub type Result<T> = std::result::Result<T, Error>;
