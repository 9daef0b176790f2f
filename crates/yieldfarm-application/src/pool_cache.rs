use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::debug;
use yieldfarm_core::error::LedgerError;
use yieldfarm_core::ledger::{Account, LedgerReader};
use yieldfarm_core::pool::{LockScheduleCalculator, PoolState, UnlockStatus, UserPosition};

use crate::clock::Clock;

/// What the cache currently shows, with unlock status evaluated at read time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolView {
    pub pool_state: PoolState,
    pub user_position: Option<UserPosition>,
    pub unlock_status: Option<UnlockStatus>,
}

/// Result of a refresh that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The new snapshot replaced the old one.
    Applied,
    /// The cache was invalidated while the reads were in flight; the reads
    /// were dropped because they may predate a confirmed command.
    Superseded,
}

#[derive(Debug, Default, Clone, Copy)]
struct CachedSnapshot {
    pool_state: PoolState,
    user_position: Option<UserPosition>,
    /// Bumped on every invalidation; a refresh only commits if it is unchanged.
    generation: u64,
}

/// Last-synchronized pool parameters and user position.
///
/// A refresh replaces both together or not at all, so readers never see a
/// mix of old and new values.
pub struct PoolStateCache {
    snapshot: RwLock<CachedSnapshot>,
    clock: Arc<dyn Clock>,
}

impl PoolStateCache {
    /// Creates an empty cache. The pool state starts zeroed and there is no position.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            snapshot: RwLock::new(CachedSnapshot::default()),
            clock,
        }
    }

    /// Re-reads pool state and, when `account` is given, the account's position.
    ///
    /// On any read failure the cached snapshot is left untouched and the
    /// failure is returned.
    pub async fn refresh(
        &self,
        reader: &dyn LedgerReader,
        account: Option<&Account>,
    ) -> Result<RefreshOutcome, LedgerError> {
        let started_at = self.snapshot.read().await.generation;

        let pool_state = reader
            .pool_state()
            .await
            .map_err(LedgerError::ReadFailed)?;
        let user_position = match account {
            Some(account) => Some(
                reader
                    .user_position(account)
                    .await
                    .map_err(LedgerError::ReadFailed)?,
            ),
            None => None,
        };

        let mut snapshot = self.snapshot.write().await;
        if snapshot.generation != started_at {
            debug!(
                started_at,
                current = snapshot.generation,
                "Discarding refresh that raced an invalidation"
            );
            return Ok(RefreshOutcome::Superseded);
        }

        snapshot.pool_state = pool_state;
        snapshot.user_position = user_position;
        debug!(
            total_deposited = %pool_state.total_deposited.base_units(),
            has_position = user_position.is_some(),
            "Pool snapshot refreshed"
        );
        Ok(RefreshOutcome::Applied)
    }

    /// Current view; unlock status is derived from the clock at call time.
    ///
    /// Async only to take the read lock; no remote call is made.
    pub async fn current(&self) -> PoolView {
        let snapshot = *self.snapshot.read().await;
        let now = self.clock.now_unix();
        PoolView {
            pool_state: snapshot.pool_state,
            user_position: snapshot.user_position,
            unlock_status: snapshot.user_position.map(|position| {
                LockScheduleCalculator::for_position(&snapshot.pool_state, &position, now)
            }),
        }
    }

    /// Marks in-flight refreshes as stale without changing what is shown.
    pub(crate) async fn invalidate(&self) {
        let mut snapshot = self.snapshot.write().await;
        snapshot.generation += 1;
    }

    /// Drops the cached position (account changed) and invalidates in-flight refreshes.
    pub(crate) async fn clear_position(&self) {
        let mut snapshot = self.snapshot.write().await;
        snapshot.user_position = None;
        snapshot.generation += 1;
    }
}
