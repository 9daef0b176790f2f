use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ledger::{Account, CommandKind};
use crate::pool::{PoolState, UnlockStatus, UserPosition};

/// In-flight marker for a deposit or withdraw awaiting confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingCommand {
    pub id: Uuid,
    pub kind: CommandKind,
    pub started_at: DateTime<Utc>,
}

impl PendingCommand {
    pub fn new(kind: CommandKind) -> Self {
        Self {
            id: Uuid::new_v4(),
            kind,
            started_at: Utc::now(),
        }
    }
}

/// Everything the presentation layer renders, captured at one instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub connected_account: Option<Account>,
    pub pool_state: PoolState,
    /// Present only while an account is connected.
    pub user_position: Option<UserPosition>,
    pub unlock_status: Option<UnlockStatus>,
    pub pending_command: Option<PendingCommand>,
}

impl SessionSnapshot {
    pub fn is_command_pending(&self) -> bool {
        self.pending_command.is_some()
    }
}
