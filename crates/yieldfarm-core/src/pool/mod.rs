//! Pool domain module.
//!
//! - `model`: pool parameters, per-user position and the derived unlock status
//! - `schedule`: pure unlock-time computation (`LockScheduleCalculator`)

mod model;
mod schedule;

pub use model::{PoolState, UnlockStatus, UserPosition};
pub use schedule::LockScheduleCalculator;
