//! Error types for Yieldfarm.
//!
//! Three layers are kept apart:
//! - [`RawFailure`]: what a collaborator reported, verbatim (code + reason).
//! - [`LedgerError`]: what the ledger client observed while running a call.
//! - [`StakeError`]: the closed, user-facing taxonomy the presentation layer sees.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Machine-readable failure codes shared by collaborators and the classifier.
pub mod codes {
    /// EIP-1193 "user rejected request".
    pub const USER_REJECTED: &str = "4001";
    /// Signer-library spelling of a declined signature.
    pub const ACTION_REJECTED: &str = "ACTION_REJECTED";
    /// The call could not be estimated before submission.
    pub const UNPREDICTABLE_GAS_LIMIT: &str = "UNPREDICTABLE_GAS_LIMIT";
    /// Signer-library spelling of a reverted call.
    pub const CALL_EXCEPTION: &str = "CALL_EXCEPTION";
    /// JSON-RPC "execution reverted" error code.
    pub const EXECUTION_REVERTED: &str = "3";
    /// JSON-RPC "method not found".
    pub const METHOD_NOT_FOUND: &str = "-32601";
    /// The endpoint could not be reached at all.
    pub const UNREACHABLE: &str = "UNREACHABLE";
    /// The endpoint answered with something that could not be decoded.
    pub const DECODE: &str = "DECODE";
    /// A bounded wait elapsed.
    pub const TIMEOUT: &str = "TIMEOUT";
}

/// A failure as reported by a remote collaborator.
///
/// Both fields are optional: providers are free to report a bare code, a
/// bare message, or nothing at all.
#[derive(Error, Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawFailure {
    pub code: Option<String>,
    pub reason: Option<String>,
}

impl RawFailure {
    pub fn new(code: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            code: Some(code.into()),
            reason: Some(reason.into()),
        }
    }

    pub fn with_reason(reason: impl Into<String>) -> Self {
        Self {
            code: None,
            reason: Some(reason.into()),
        }
    }

    /// Replaces the code, keeping the reason.
    pub fn recode(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn has_code(&self, code: &str) -> bool {
        self.code.as_deref() == Some(code)
    }
}

impl std::fmt::Display for RawFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.code, &self.reason) {
            (Some(code), Some(reason)) => write!(f, "{reason} (code {code})"),
            (Some(code), None) => write!(f, "code {code}"),
            (None, Some(reason)) => write!(f, "{reason}"),
            (None, None) => write!(f, "unspecified failure"),
        }
    }
}

/// Failures observed by [`crate::ledger::RemoteLedgerClient`].
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerError {
    /// The amount did not parse as a strictly positive decimal. Nothing was submitted.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Signing or submission was rejected before the call reached the ledger.
    #[error("Submission failed: {0}")]
    SubmissionFailed(RawFailure),

    /// The call was included but the ledger's logic rejected it.
    #[error("Execution reverted: {}", .reason.as_deref().unwrap_or("no reason given"))]
    ExecutionReverted { reason: Option<String> },

    /// Submission succeeded but confirmation could not be observed.
    #[error("Confirmation not observed: {0}")]
    Unconfirmed(RawFailure),

    /// A read call failed.
    #[error("Read failed: {0}")]
    ReadFailed(RawFailure),
}

/// The closed set of user-facing errors.
///
/// Every failure that reaches the presentation layer is one of these. They
/// serialize as tagged data so a front end can render them without unwinding.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StakeError {
    /// No identity provider is available.
    #[error("No wallet provider is available")]
    NoProvider,

    /// The identity provider refused to expose an account.
    #[error("Wallet connection was denied")]
    ConnectionDenied,

    /// A command was issued before any account was connected.
    #[error("Connect a wallet first")]
    NotConnected,

    /// The entered amount is not a strictly positive decimal.
    #[error("Invalid amount: {message}")]
    InvalidAmount { message: String },

    /// Another command for this account is still awaiting confirmation.
    #[error("Another transaction is still in progress")]
    CommandInProgress,

    /// The signing step was declined.
    #[error("Transaction was rejected in the wallet")]
    UserRejected,

    /// The ledger explicitly rejected the call.
    #[error("{}", reverted_message(.reason))]
    Reverted { reason: Option<String> },

    /// The call could not even be estimated.
    #[error("Transaction could not be estimated; the lock period may still be active")]
    GasEstimationFailed,

    /// Submission succeeded but confirmation was never observed.
    #[error("Transaction was submitted but its confirmation could not be observed")]
    Unconfirmed,

    /// Reading pool or position state failed.
    #[error("Failed to read pool state: {reason}")]
    ReadFailed { reason: String },

    /// Anything the classifier could not place.
    #[error("Unexpected error: {}", .reason.as_deref().unwrap_or("unknown"))]
    Unknown { reason: Option<String> },
}

fn reverted_message(reason: &Option<String>) -> String {
    match reason {
        Some(reason) => format!("Transaction failed: {reason}"),
        None => "Transaction failed".to_string(),
    }
}

impl StakeError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    pub fn invalid_amount(message: impl Into<String>) -> Self {
        Self::InvalidAmount {
            message: message.into(),
        }
    }

    pub fn reverted(reason: Option<String>) -> Self {
        Self::Reverted { reason }
    }

    pub fn unknown(reason: impl Into<String>) -> Self {
        Self::Unknown {
            reason: Some(reason.into()),
        }
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    pub fn is_user_rejected(&self) -> bool {
        matches!(self, Self::UserRejected)
    }

    pub fn is_command_in_progress(&self) -> bool {
        matches!(self, Self::CommandInProgress)
    }

    /// Whether retrying the same action later can succeed without the user
    /// changing anything but timing.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::CommandInProgress
                | Self::UserRejected
                | Self::GasEstimationFailed
                | Self::Unconfirmed
                | Self::ReadFailed { .. }
        )
    }

    /// Short stable identifier, handy for log fields.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NoProvider => "no_provider",
            Self::ConnectionDenied => "connection_denied",
            Self::NotConnected => "not_connected",
            Self::InvalidAmount { .. } => "invalid_amount",
            Self::CommandInProgress => "command_in_progress",
            Self::UserRejected => "user_rejected",
            Self::Reverted { .. } => "reverted",
            Self::GasEstimationFailed => "gas_estimation_failed",
            Self::Unconfirmed => "unconfirmed",
            Self::ReadFailed { .. } => "read_failed",
            Self::Unknown { .. } => "unknown",
        }
    }
}

/// A type alias for `Result<T, StakeError>`.
pub type Result<T> = std::result::Result<T, StakeError>;
