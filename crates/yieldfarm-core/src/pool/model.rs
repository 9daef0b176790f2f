use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::amount::Amount;

/// Snapshot of the pool's parameters as last read from the ledger.
///
/// Always replaced as a whole; never patched field by field.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolState {
    pub total_deposited: Amount,
    pub rate_basis_points: u64,
    pub lock_duration_seconds: u64,
}

/// The connected account's position in the pool.
///
/// A zero `deposited_amount` means "no active deposit"; the timestamp carries
/// no meaning in that case.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserPosition {
    pub deposited_amount: Amount,
    /// Seconds since the Unix epoch.
    pub deposit_timestamp: u64,
}

impl UserPosition {
    pub fn has_deposit(&self) -> bool {
        !self.deposited_amount.is_zero()
    }
}

/// Whether the user's deposit may be withdrawn. Derived, never stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "unlock_at", rename_all = "snake_case")]
pub enum UnlockStatus {
    NoDeposit,
    Unlocked,
    /// Locked until the given instant (seconds since the Unix epoch).
    LockedUntil(u64),
}

impl UnlockStatus {
    pub fn is_locked(&self) -> bool {
        matches!(self, Self::LockedUntil(_))
    }

    /// The unlock instant as a UTC datetime, if still locked.
    pub fn unlock_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::LockedUntil(instant) => {
                i64::try_from(*instant)
                    .ok()
                    .and_then(|secs| DateTime::from_timestamp(secs, 0))
            }
            _ => None,
        }
    }
}
