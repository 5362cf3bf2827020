//! Bridge client error types
//!
//! Every operation in this crate returns [`Result<T>`]. Validation failures
//! (role guards, batch caps, missing arguments) are raised before any network
//! round trip; transport failures from the role clients, the ABI source and the
//! exit manager pass through untouched as [`BridgeError::Network`].

use thiserror::Error;
use tracing::error;

use crate::types::{BridgeType, ChainRole};

/// Result alias used across the crate
pub type Result<T, E = BridgeError> = std::result::Result<T, E>;

/// Bridge client error type
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Operation invoked on a wrapper bound to the other chain
    #[error("{operation} is only allowed on the {required} chain")]
    RoleMismatch {
        operation: String,
        required: ChainRole,
    },

    /// Write requested without a resolvable sender
    #[error("no `from` address specified for {role} write")]
    MissingSender { role: ChainRole },

    /// Batch call exceeds the per-call id cap
    #[error("can not process more than {max} tokens in one call, got {count}")]
    BatchSizeExceeded { count: usize, max: usize },

    /// Required identifier absent
    #[error("{0} not provided")]
    MissingArgument(&'static str),

    /// Identifier present but malformed
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// No ABI registered for the logical contract
    #[error("ABI not found for {name} ({bridge_type})")]
    AbiNotFound {
        name: String,
        bridge_type: BridgeType,
    },

    /// ABI has no function with the requested name and arity
    #[error("method {method} not found in {contract} ABI")]
    MethodNotFound { contract: String, method: String },

    /// ABI encoding error
    #[error("ABI encoding error: {0}")]
    AbiEncode(String),

    /// ABI decoding error
    #[error("ABI decoding error: {0}")]
    AbiDecode(String),

    /// Transport, RPC or proof-builder error
    #[error(transparent)]
    Network(#[from] eyre::Report),
}

impl BridgeError {
    /// True for failures detected locally before any network call
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            BridgeError::RoleMismatch { .. }
                | BridgeError::MissingSender { .. }
                | BridgeError::BatchSizeExceeded { .. }
                | BridgeError::MissingArgument(_)
                | BridgeError::InvalidArgument(_)
        )
    }
}

/// Error-reporting facility shared through the side chain client.
///
/// Reported errors are logged once and can then either be thrown
/// ([`ErrorReport::throw`]) or handed back to the caller as a value.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorLogger;

impl ErrorLogger {
    /// Log an error and wrap it for throwing or returning
    pub fn error(&self, err: BridgeError) -> ErrorReport {
        error!(error = %err, "bridge client error");
        ErrorReport(err)
    }
}

/// A logged error awaiting a decision
#[derive(Debug)]
#[must_use]
pub struct ErrorReport(BridgeError);

impl ErrorReport {
    /// Fail the current operation with the reported error
    pub fn throw<T>(self) -> Result<T> {
        Err(self.0)
    }

    /// Return the reported error as a value
    pub fn into_error(self) -> BridgeError {
        self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use eyre::eyre;

    #[test]
    fn test_role_mismatch_message() {
        let err = BridgeError::RoleMismatch {
            operation: "deposit".to_string(),
            required: ChainRole::Parent,
        };
        assert_eq!(err.to_string(), "deposit is only allowed on the parent chain");
        assert!(err.is_validation());
    }

    #[test]
    fn test_network_error_is_transparent() {
        let err = BridgeError::from(eyre!("connection refused"));
        assert_eq!(err.to_string(), "connection refused");
        assert!(!err.is_validation());
    }

    #[test]
    fn test_report_throw_and_return() {
        let logger = ErrorLogger;
        let thrown: Result<u8> = logger
            .error(BridgeError::MissingArgument("txHash"))
            .throw();
        assert!(matches!(thrown, Err(BridgeError::MissingArgument("txHash"))));

        let returned = logger
            .error(BridgeError::BatchSizeExceeded { count: 21, max: 20 })
            .into_error();
        assert!(matches!(
            returned,
            BridgeError::BatchSizeExceeded { count: 21, max: 20 }
        ));
    }
}
