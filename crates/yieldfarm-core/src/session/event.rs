use serde::{Deserialize, Serialize};

use crate::error::StakeError;
use crate::ledger::{Account, CommandKind};

/// Discrete notifications published by the session controller.
///
/// Classified errors travel here as data; nothing is thrown at the
/// presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionEvent {
    Connected {
        account: Account,
    },
    ConnectionFailed {
        error: StakeError,
    },
    CommandSubmitted {
        command: CommandKind,
    },
    CommandConfirmed {
        command: CommandKind,
        tx_hash: String,
    },
    CommandFailed {
        command: CommandKind,
        error: StakeError,
    },
    Refreshed,
    /// Non-fatal: the last-known-good snapshot stays visible.
    RefreshFailed {
        error: StakeError,
    },
}
