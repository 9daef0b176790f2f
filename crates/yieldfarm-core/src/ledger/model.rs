use serde::{Deserialize, Serialize};
use std::fmt;

use crate::amount::Amount;

/// A ledger identity (hex address). Stored lower-cased so comparisons are exact.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Account(String);

impl Account {
    pub fn new(address: impl Into<String>) -> Self {
        Self(address.into().trim().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether this looks like a `0x`-prefixed 20-byte hex address.
    pub fn is_well_formed(&self) -> bool {
        is_hex_address(&self.0)
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Checks for `0x` followed by exactly 40 hex digits.
pub(crate) fn is_hex_address(value: &str) -> bool {
    value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .is_some_and(|hex| hex.len() == 40 && hex.bytes().all(|b| b.is_ascii_hexdigit()))
}

/// Which state-changing command a call belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CommandKind {
    Deposit,
    Withdraw,
}

impl fmt::Display for CommandKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommandKind::Deposit => f.write_str("deposit"),
            CommandKind::Withdraw => f.write_str("withdraw"),
        }
    }
}

/// A write call against the pool contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum ContractCall {
    /// Funded call; `value` is attached in base units.
    Deposit { value: Amount },
    Withdraw,
}

impl ContractCall {
    pub fn kind(&self) -> CommandKind {
        match self {
            ContractCall::Deposit { .. } => CommandKind::Deposit,
            ContractCall::Withdraw => CommandKind::Withdraw,
        }
    }

    /// Value attached to the call.
    pub fn value(&self) -> Amount {
        match self {
            ContractCall::Deposit { value } => *value,
            ContractCall::Withdraw => Amount::ZERO,
        }
    }
}

/// Returned by the signer once a call has been accepted for inclusion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionHandle {
    pub tx_hash: String,
}

/// What the ledger reported once the submitted call was included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_hash: String,
    pub block_number: Option<u64>,
    pub succeeded: bool,
    pub revert_reason: Option<String>,
}

/// A write that the ledger durably applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Confirmation {
    pub tx_hash: String,
    pub block_number: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_normalizes_case() {
        let a = Account::new("0xABCDEF0123456789abcdef0123456789ABCDEF01");
        let b = Account::new(" 0xabcdef0123456789abcdef0123456789abcdef01 ");
        assert_eq!(a, b);
        assert!(a.is_well_formed());
        assert!(!Account::new("0x1234").is_well_formed());
        assert!(!Account::new("abcdef0123456789abcdef0123456789abcdef01").is_well_formed());
    }

    #[test]
    fn test_contract_call_value() {
        let deposit = ContractCall::Deposit {
            value: Amount::from_base_units(7),
        };
        assert_eq!(deposit.kind(), CommandKind::Deposit);
        assert_eq!(deposit.value().base_units(), 7);
        assert_eq!(ContractCall::Withdraw.value(), Amount::ZERO);
    }
}
