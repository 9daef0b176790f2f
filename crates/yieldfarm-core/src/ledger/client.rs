use std::sync::Arc;

use tracing::{debug, info, warn};

use super::model::{Account, Confirmation, ContractCall};
use super::provider::{LedgerReader, WalletProvider};
use crate::amount::Amount;
use crate::error::LedgerError;
use crate::pool::{PoolState, UserPosition};

/// Adapter over the pool contract, bound to one signing identity.
///
/// Writes suspend the caller until the ledger reports the call as included
/// or rejected; there is no "maybe" outcome. Reads go straight to the
/// [`LedgerReader`].
#[derive(Clone)]
pub struct RemoteLedgerClient {
    account: Account,
    decimals: u32,
    wallet: Arc<dyn WalletProvider>,
    reader: Arc<dyn LedgerReader>,
}

impl RemoteLedgerClient {
    /// Creates a client bound to `account`.
    ///
    /// # Arguments
    ///
    /// * `account` - The identity every write is signed as
    /// * `decimals` - The ledger's fixed exponent for base-unit conversion
    /// * `wallet` - Signing and confirmation capability
    /// * `reader` - Read access to the contract
    pub fn new(
        account: Account,
        decimals: u32,
        wallet: Arc<dyn WalletProvider>,
        reader: Arc<dyn LedgerReader>,
    ) -> Self {
        Self {
            account,
            decimals,
            wallet,
            reader,
        }
    }

    pub fn account(&self) -> &Account {
        &self.account
    }

    /// Deposits a human-entered decimal amount.
    ///
    /// The amount is converted to base units first; anything that is not a
    /// strictly positive decimal fails with `InvalidAmount` before the wallet
    /// is touched.
    pub async fn deposit(&self, amount: &str) -> Result<Confirmation, LedgerError> {
        let value = Amount::parse_decimal(amount, self.decimals)
            .map_err(|e| LedgerError::InvalidAmount(e.to_string()))?;
        self.execute(ContractCall::Deposit { value }).await
    }

    /// Withdraws the account's whole deposit.
    pub async fn withdraw(&self) -> Result<Confirmation, LedgerError> {
        self.execute(ContractCall::Withdraw).await
    }

    pub async fn get_pool_state(&self) -> Result<PoolState, LedgerError> {
        self.reader
            .pool_state()
            .await
            .map_err(LedgerError::ReadFailed)
    }

    pub async fn get_user_position(&self, account: &Account) -> Result<UserPosition, LedgerError> {
        self.reader
            .user_position(account)
            .await
            .map_err(LedgerError::ReadFailed)
    }

    async fn execute(&self, call: ContractCall) -> Result<Confirmation, LedgerError> {
        let command = call.kind();
        debug!(account = %self.account, %command, value = %call.value().base_units(), "Submitting call");

        let handle = self
            .wallet
            .sign_and_submit(&self.account, &call)
            .await
            .map_err(LedgerError::SubmissionFailed)?;
        info!(account = %self.account, %command, tx_hash = %handle.tx_hash, "Call submitted, awaiting confirmation");

        let receipt = self
            .wallet
            .await_confirmation(&handle)
            .await
            .map_err(LedgerError::Unconfirmed)?;

        if !receipt.succeeded {
            warn!(%command, tx_hash = %receipt.tx_hash, "Call reverted");
            return Err(LedgerError::ExecutionReverted {
                reason: receipt.revert_reason,
            });
        }

        info!(%command, tx_hash = %receipt.tx_hash, block = ?receipt.block_number, "Call confirmed");
        Ok(Confirmation {
            tx_hash: receipt.tx_hash,
            block_number: receipt.block_number,
        })
    }
}
