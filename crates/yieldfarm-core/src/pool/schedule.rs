use super::model::{PoolState, UnlockStatus, UserPosition};
use crate::amount::Amount;

/// Computes unlock status from a deposit and the pool's lock duration.
///
/// `now` is always passed in, never read from the system clock here.
pub struct LockScheduleCalculator;

impl LockScheduleCalculator {
    /// Returns `NoDeposit` for a zero deposit, `Unlocked` once
    /// `deposit_timestamp + lock_duration_seconds <= now`, and
    /// `LockedUntil(deposit_timestamp + lock_duration_seconds)` otherwise.
    pub fn compute(
        deposited_amount: Amount,
        deposit_timestamp: u64,
        lock_duration_seconds: u64,
        now: u64,
    ) -> UnlockStatus {
        if deposited_amount.is_zero() {
            return UnlockStatus::NoDeposit;
        }

        let unlock_instant = deposit_timestamp.saturating_add(lock_duration_seconds);
        if unlock_instant <= now {
            UnlockStatus::Unlocked
        } else {
            UnlockStatus::LockedUntil(unlock_instant)
        }
    }

    pub fn for_position(pool: &PoolState, position: &UserPosition, now: u64) -> UnlockStatus {
        Self::compute(
            position.deposited_amount,
            position.deposit_timestamp,
            pool.lock_duration_seconds,
            now,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DAY: u64 = 86_400;

    fn amount(units: u128) -> Amount {
        Amount::from_base_units(units)
    }

    #[test]
    fn test_zero_deposit_is_always_no_deposit() {
        for (timestamp, lock, now) in [(0, 0, 0), (1_000, DAY, 1_000), (u64::MAX, u64::MAX, 0)] {
            assert_eq!(
                LockScheduleCalculator::compute(Amount::ZERO, timestamp, lock, now),
                UnlockStatus::NoDeposit
            );
        }
    }

    #[test]
    fn test_one_day_lock_boundaries() {
        let deposit = amount(5);
        assert_eq!(
            LockScheduleCalculator::compute(deposit, 1_000, DAY, 1_000),
            UnlockStatus::LockedUntil(87_400)
        );
        assert_eq!(
            LockScheduleCalculator::compute(deposit, 1_000, DAY, 87_399),
            UnlockStatus::LockedUntil(87_400)
        );
        // Boundary is inclusive: exactly at the unlock instant counts as unlocked.
        assert_eq!(
            LockScheduleCalculator::compute(deposit, 1_000, DAY, 87_400),
            UnlockStatus::Unlocked
        );
        assert_eq!(
            LockScheduleCalculator::compute(deposit, 1_000, DAY, 87_401),
            UnlockStatus::Unlocked
        );
    }

    #[test]
    fn test_zero_lock_duration_unlocks_immediately() {
        assert_eq!(
            LockScheduleCalculator::compute(amount(1), 500, 0, 500),
            UnlockStatus::Unlocked
        );
    }

    #[test]
    fn test_unlock_instant_saturates() {
        assert_eq!(
            LockScheduleCalculator::compute(amount(1), u64::MAX - 1, DAY, 0),
            UnlockStatus::LockedUntil(u64::MAX)
        );
    }

    #[test]
    fn test_for_position_uses_pool_lock_duration() {
        let pool = PoolState {
            total_deposited: amount(100),
            rate_basis_points: 500,
            lock_duration_seconds: 60,
        };
        let position = UserPosition {
            deposited_amount: amount(10),
            deposit_timestamp: 100,
        };
        assert_eq!(
            LockScheduleCalculator::for_position(&pool, &position, 120),
            UnlockStatus::LockedUntil(160)
        );
        assert_eq!(
            LockScheduleCalculator::for_position(&pool, &position, 160),
            UnlockStatus::Unlocked
        );
    }

    #[test]
    fn test_unlock_at_renders_utc_instant() {
        let status = UnlockStatus::LockedUntil(87_400);
        assert_eq!(
            status.unlock_at().map(|dt| dt.to_rfc3339()),
            Some("1970-01-02T00:16:40+00:00".to_string())
        );
        assert_eq!(UnlockStatus::Unlocked.unlock_at(), None);
    }
}
