//! Error types for tempstat

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using tempstat's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tempstat operations
#[derive(Error, Debug)]
pub enum Error {
    /// The pipeline was given nothing to reduce
    #[error("No samples: statistics require at least one sample")]
    NoSamples,

    /// Invalid argument provided to an operation
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// The execution surface rejected a dispatch shape or buffer
    #[error("Dispatch of '{op}' rejected: {reason}")]
    Dispatch {
        /// The kernel entry point being dispatched
        op: &'static str,
        /// Why the dispatch was rejected
        reason: String,
    },

    /// Backend limitation - operation valid but exceeds backend capabilities
    #[error("{backend} limitation: {operation} - {reason}")]
    BackendLimitation {
        /// The backend that has the limitation
        backend: &'static str,
        /// The operation being attempted
        operation: &'static str,
        /// Description of the limitation
        reason: String,
    },

    /// Kernel compilation failed
    #[error("Build of '{entry_point}' failed:\n{log}")]
    Build {
        /// Entry point (or module) that failed to build
        entry_point: &'static str,
        /// Compiler diagnostics
        log: String,
    },

    /// Requested platform/device does not exist
    #[error("No device {device} on platform {platform}")]
    NoDevice {
        /// Platform index
        platform: usize,
        /// Device index within the platform
        device: usize,
    },

    /// Backend-specific error
    #[error("Backend error: {0}")]
    Backend(String),

    /// Reading the dataset failed
    #[error("I/O error on {}: {source}", path.display())]
    Io {
        /// File being read
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Create an invalid argument error
    pub fn invalid_argument(arg: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            arg,
            reason: reason.into(),
        }
    }

    /// Create a dispatch rejection error
    pub fn dispatch(op: &'static str, reason: impl Into<String>) -> Self {
        Self::Dispatch {
            op,
            reason: reason.into(),
        }
    }

    /// Create a backend limitation error
    pub fn backend_limitation(
        backend: &'static str,
        operation: &'static str,
        reason: impl Into<String>,
    ) -> Self {
        Self::BackendLimitation {
            backend,
            operation,
            reason: reason.into(),
        }
    }

    /// Create an I/O error tagged with the offending path
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
