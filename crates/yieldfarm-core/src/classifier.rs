//! Maps opaque remote failures onto user-facing error kinds.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, RawFailure, StakeError, codes};

/// Classification of a raw remote failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FailureKind {
    UserRejected,
    Reverted { reason: Option<String> },
    /// Weakly informative: the dominant cause here is a withdraw issued
    /// before unlock, but the ledger does not promise that.
    GasEstimationFailed,
    Unknown { reason: Option<String> },
}

impl From<FailureKind> for StakeError {
    fn from(kind: FailureKind) -> Self {
        match kind {
            FailureKind::UserRejected => StakeError::UserRejected,
            FailureKind::Reverted { reason } => StakeError::Reverted { reason },
            FailureKind::GasEstimationFailed => StakeError::GasEstimationFailed,
            FailureKind::Unknown { reason } => StakeError::Unknown { reason },
        }
    }
}

// ethers-style: `... (reason="Lock active", method=...)`
static QUOTED_REASON: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"reason="([^"]*)""#).expect("valid regex"));
// geth-style: `execution reverted: Lock active`
static EXECUTION_REVERTED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)execution reverted:\s*(.+)$").expect("valid regex"));
// hardhat-style: `reverted with reason string 'Lock active'`
static REASON_STRING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"reverted with reason string '([^']*)'").expect("valid regex"));

/// Pure, total mapping from failures to [`FailureKind`] / [`StakeError`].
pub struct ErrorClassifier;

impl ErrorClassifier {
    /// Classifies a raw failure. Never fails; anything unrecognised is `Unknown`.
    pub fn classify(raw: &RawFailure) -> FailureKind {
        let reason = raw.reason.as_deref().unwrap_or_default();
        let lowered = reason.to_lowercase();

        if raw.has_code(codes::USER_REJECTED)
            || raw.has_code(codes::ACTION_REJECTED)
            || lowered.contains("user rejected")
            || lowered.contains("user denied")
        {
            return FailureKind::UserRejected;
        }

        if raw.has_code(codes::UNPREDICTABLE_GAS_LIMIT)
            || lowered.contains("cannot estimate gas")
            || lowered.contains("gas required exceeds")
        {
            return FailureKind::GasEstimationFailed;
        }

        if raw.has_code(codes::CALL_EXCEPTION)
            || raw.has_code(codes::EXECUTION_REVERTED)
            || lowered.contains("revert")
        {
            return FailureKind::Reverted {
                reason: Self::extract_revert_reason(reason),
            };
        }

        FailureKind::Unknown {
            reason: raw.reason.clone().filter(|r| !r.trim().is_empty()),
        }
    }

    /// Maps a ledger client failure onto the user-facing taxonomy.
    pub fn classify_ledger(error: &LedgerError) -> StakeError {
        match error {
            LedgerError::InvalidAmount(message) => StakeError::invalid_amount(message.clone()),
            LedgerError::SubmissionFailed(raw) => Self::classify(raw).into(),
            LedgerError::ExecutionReverted { reason } => StakeError::Reverted {
                reason: reason.clone(),
            },
            LedgerError::Unconfirmed(_) => StakeError::Unconfirmed,
            LedgerError::ReadFailed(raw) => StakeError::ReadFailed {
                reason: raw.to_string(),
            },
        }
    }

    /// Pulls a revert reason out of the provider's message, if it carries one.
    pub fn extract_revert_reason(message: &str) -> Option<String> {
        [&*QUOTED_REASON, &*REASON_STRING, &*EXECUTION_REVERTED]
            .iter()
            .find_map(|pattern| pattern.captures(message))
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().trim().to_string())
            .filter(|reason| !reason.is_empty())
    }
}
