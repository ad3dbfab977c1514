//! Error types for the AutoSwappr SDK

use thiserror::Error;

/// Boxed transport-level cause carried by [`AutoSwapprError::Network`] and
/// [`AutoSwapprError::PoolFetchFailed`]
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that can occur while building or executing a swap
#[derive(Debug, Error)]
pub enum AutoSwapprError {
    #[error("Amount must be greater than zero")]
    ZeroAmount,

    #[error("No pool configured for pair {token_a} / {token_b}")]
    InvalidPoolConfig { token_a: String, token_b: String },

    #[error("Token not supported: {token}")]
    UnsupportedToken { token: String },

    #[error("Insufficient balance of {token}: need {required}, have {available}")]
    InsufficientBalance {
        token: String,
        required: String,
        available: String,
    },

    #[error("Insufficient allowance of {token}: need {required}, approved {approved}")]
    InsufficientAllowance {
        token: String,
        required: String,
        approved: String,
    },

    #[error("A signer is required for this operation")]
    SignerRequired,

    #[error("Pool tokens mismatch: expected ({expected0}, {expected1}), got ({found0}, {found1})")]
    TokensMismatch {
        expected0: String,
        expected1: String,
        found0: String,
        found1: String,
    },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Failed to fetch pools: {message}")]
    PoolFetchFailed {
        message: String,
        #[source]
        source: Option<BoxError>,
    },

    #[error("Swap failed: {reason}")]
    SwapFailed { reason: String },

    #[error("Network failure while {context}")]
    Network {
        context: String,
        #[source]
        source: BoxError,
    },
}

/// Fieldless discriminant of [`AutoSwapprError`], compared by equality
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    ZeroAmount,
    InvalidPoolConfig,
    UnsupportedToken,
    InsufficientBalance,
    InsufficientAllowance,
    SignerRequired,
    TokensMismatch,
    InvalidInput,
    PoolFetchFailed,
    SwapFailed,
    NetworkFailure,
}

/// Result type alias for SDK operations
pub type Result<T> = std::result::Result<T, AutoSwapprError>;

impl AutoSwapprError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ZeroAmount => ErrorKind::ZeroAmount,
            Self::InvalidPoolConfig { .. } => ErrorKind::InvalidPoolConfig,
            Self::UnsupportedToken { .. } => ErrorKind::UnsupportedToken,
            Self::InsufficientBalance { .. } => ErrorKind::InsufficientBalance,
            Self::InsufficientAllowance { .. } => ErrorKind::InsufficientAllowance,
            Self::SignerRequired => ErrorKind::SignerRequired,
            Self::TokensMismatch { .. } => ErrorKind::TokensMismatch,
            Self::InvalidInput { .. } => ErrorKind::InvalidInput,
            Self::PoolFetchFailed { .. } => ErrorKind::PoolFetchFailed,
            Self::SwapFailed { .. } => ErrorKind::SwapFailed,
            Self::Network { .. } => ErrorKind::NetworkFailure,
        }
    }

    /// Stable machine-readable code for this error
    pub fn error_code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::ZeroAmount => "ZERO_AMOUNT",
            ErrorKind::InvalidPoolConfig => "INVALID_POOL_CONFIG",
            ErrorKind::UnsupportedToken => "UNSUPPORTED_TOKEN",
            ErrorKind::InsufficientBalance => "INSUFFICIENT_BALANCE",
            ErrorKind::InsufficientAllowance => "INSUFFICIENT_ALLOWANCE",
            ErrorKind::SignerRequired => "SIGNER_REQUIRED",
            ErrorKind::TokensMismatch => "TOKENS_MISMATCH",
            ErrorKind::InvalidInput => "INVALID_INPUT",
            ErrorKind::PoolFetchFailed => "POOL_FETCH_FAILED",
            ErrorKind::SwapFailed => "SWAP_FAILED",
            ErrorKind::NetworkFailure => "NETWORK_FAILURE",
        }
    }

    pub(crate) fn invalid_input(message: impl Into<String>) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    /// Wrap a transport error, keeping it as the source
    pub(crate) fn network<E>(context: impl Into<String>) -> impl FnOnce(E) -> Self
    where
        E: Into<BoxError>,
    {
        let context = context.into();
        move |source| Self::Network {
            context,
            source: source.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_kind_and_code() {
        let err = AutoSwapprError::ZeroAmount;
        assert_eq!(err.kind(), ErrorKind::ZeroAmount);
        assert_eq!(err.error_code(), "ZERO_AMOUNT");

        let err = AutoSwapprError::invalid_input("bad");
        assert_eq!(err.kind(), ErrorKind::InvalidInput);
        assert_eq!(err.to_string(), "Invalid input: bad");
    }

    #[test]
    fn test_network_error_keeps_source() {
        let io = std::io::Error::new(std::io::ErrorKind::TimedOut, "timed out");
        let err = AutoSwapprError::network("calling balance_of")(io);

        assert_eq!(err.kind(), ErrorKind::NetworkFailure);
        assert_eq!(err.error_code(), "NETWORK_FAILURE");
        assert_eq!(err.source().map(|s| s.to_string()), Some("timed out".into()));
    }
}
