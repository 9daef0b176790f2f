//! Session domain module.
//!
//! Types the presentation layer observes: the session snapshot, the pending
//! command marker and the discrete events emitted by the controller.

mod event;
mod snapshot;

pub use event::SessionEvent;
pub use snapshot::{PendingCommand, SessionSnapshot};
