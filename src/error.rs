//! Error types for tribatch
//!
//! The numerical kernels never fail: loss of positive-definiteness is
//! reported through the lane mask returned by checked Cholesky. Errors
//! only arise when packing flat data and in the timing harness.

use thiserror::Error;

/// Result type alias using tribatch's Error
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in tribatch operations
#[derive(Error, Debug)]
pub enum Error {
    /// Flat buffer length does not match the packed layout
    #[error("Shape mismatch: expected {expected:?}, got {got:?}")]
    ShapeMismatch {
        /// Expected shape
        expected: Vec<usize>,
        /// Actual shape
        got: Vec<usize>,
    },

    /// Invalid argument provided to an operation
    #[error("Invalid argument '{arg}': {reason}")]
    InvalidArgument {
        /// The argument name
        arg: &'static str,
        /// Reason for invalidity
        reason: String,
    },

    /// Timer started while running, or stopped while stopped
    #[error("Timer misuse: {reason}")]
    TimerState {
        /// What went wrong
        reason: &'static str,
    },

    /// A timing barrier was abandoned because another thread failed
    #[error("Timing pool aborted: another timing thread failed")]
    PoolAborted,

    /// Requested core index is not available on this machine
    #[error("Core {core} out of range (available cores: {available})")]
    CoreOutOfRange {
        /// The requested core
        core: usize,
        /// Number of hardware threads reported by the OS
        available: usize,
    },

    /// Setting thread affinity failed
    #[error("Thread affinity error: {0}")]
    Affinity(#[from] std::io::Error),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a shape mismatch error for a flat buffer
    pub fn flat_len_mismatch(expected: usize, got: usize) -> Self {
        Self::ShapeMismatch {
            expected: vec![expected],
            got: vec![got],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::flat_len_mismatch(24, 20);
        assert_eq!(err.to_string(), "Shape mismatch: expected [24], got [20]");

        let err = Error::TimerState {
            reason: "timer already running",
        };
        assert_eq!(err.to_string(), "Timer misuse: timer already running");

        let err = Error::CoreOutOfRange {
            core: 9,
            available: 8,
        };
        assert!(err.to_string().contains("Core 9"));

        assert!(Error::PoolAborted.to_string().contains("aborted"));
    }
}
