//! Collaborator traits.
//!
//! The wallet and the ledger endpoint are external; the application layer
//! only ever sees them through these traits, which makes them replaceable by
//! test doubles.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::model::{Account, ContractCall, Receipt, SubmissionHandle};
use crate::error::{RawFailure, StakeError};
use crate::pool::{PoolState, UserPosition};

/// Failures of the account-request capability.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WalletError {
    #[error("No wallet provider available: {0}")]
    NoProvider(String),

    #[error("Wallet denied the connection: {0}")]
    Denied(RawFailure),
}

impl From<WalletError> for StakeError {
    fn from(err: WalletError) -> Self {
        match err {
            WalletError::NoProvider(_) => StakeError::NoProvider,
            WalletError::Denied(_) => StakeError::ConnectionDenied,
        }
    }
}

/// Identity and signing capability.
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Asks the provider for the active account.
    async fn request_account(&self) -> Result<Account, WalletError>;

    /// Signs `call` as `from` and submits it.
    ///
    /// # Returns
    ///
    /// - `Ok(SubmissionHandle)`: the call was accepted for inclusion
    /// - `Err(RawFailure)`: estimation, signing or submission was rejected
    async fn sign_and_submit(
        &self,
        from: &Account,
        call: &ContractCall,
    ) -> Result<SubmissionHandle, RawFailure>;

    /// Suspends until the submitted call is included (successfully or not).
    ///
    /// # Returns
    ///
    /// - `Ok(Receipt)`: inclusion observed; check `Receipt::succeeded`
    /// - `Err(RawFailure)`: inclusion could not be observed
    async fn await_confirmation(&self, handle: &SubmissionHandle) -> Result<Receipt, RawFailure>;
}

/// Read access to the pool contract. No side effects.
#[async_trait]
pub trait LedgerReader: Send + Sync {
    async fn pool_state(&self) -> Result<PoolState, RawFailure>;

    /// Position of `account`; zero amount when it has no deposit.
    async fn user_position(&self, account: &Account) -> Result<UserPosition, RawFailure>;
}
