//! Domain layer for Yieldfarm.
//!
//! Holds the staking-pool domain model, the user-facing error taxonomy and
//! the collaborator traits the application layer drives. Nothing in this
//! crate performs I/O on its own.

pub mod amount;
pub mod classifier;
pub mod config;
pub mod error;
pub mod ledger;
pub mod pool;
pub mod session;

// Re-export common types
pub use amount::Amount;
pub use classifier::{ErrorClassifier, FailureKind};
pub use error::{LedgerError, RawFailure, Result, StakeError};
pub use ledger::{Account, RemoteLedgerClient};
pub use pool::{LockScheduleCalculator, PoolState, UnlockStatus, UserPosition};
