//! Application layer for Yieldfarm.
//!
//! Coordinates the domain collaborators into the staking session: the
//! connection/command state machine and the pool-state cache it owns.

pub mod clock;
pub mod pool_cache;
pub mod session_controller;

pub use clock::{Clock, FixedClock, SystemClock};
pub use pool_cache::{PoolStateCache, PoolView, RefreshOutcome};
pub use session_controller::SessionController;
