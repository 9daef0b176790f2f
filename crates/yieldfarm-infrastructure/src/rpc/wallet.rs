use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{debug, info, warn};
use yieldfarm_core::config::LedgerConfig;
use yieldfarm_core::error::{RawFailure, codes};
use yieldfarm_core::ledger::{
    Account, ContractCall, Receipt, SubmissionHandle, WalletError, WalletProvider,
};

use super::abi;
use super::transport::RpcTransport;

/// Wallet over an EIP-1193 style JSON-RPC endpoint.
///
/// Signing is delegated to the node (`eth_sendTransaction`), which is how a
/// browser wallet bridge or a dev node with unlocked accounts behaves.
pub struct RpcWalletProvider {
    transport: Arc<dyn RpcTransport>,
    contract: String,
    poll_interval: Duration,
    confirmation_timeout: Option<Duration>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RpcReceipt {
    transaction_hash: String,
    #[serde(default)]
    block_number: Option<String>,
    #[serde(default)]
    status: Option<String>,
}

impl RpcWalletProvider {
    pub fn new(transport: Arc<dyn RpcTransport>, config: &LedgerConfig) -> Self {
        Self {
            transport,
            contract: config.contract_address.to_lowercase(),
            poll_interval: config.poll_interval(),
            confirmation_timeout: config.confirmation_timeout(),
        }
    }

    fn transaction(&self, from: &Account, call: &ContractCall) -> Value {
        let data = match call {
            ContractCall::Deposit { .. } => abi::DEPOSIT,
            ContractCall::Withdraw => abi::WITHDRAW,
        };
        json!({
            "from": from.as_str(),
            "to": self.contract,
            "data": data,
            "value": abi::format_quantity(call.value().base_units()),
        })
    }

    async fn accounts(&self) -> Result<Vec<String>, RawFailure> {
        let value = match self.transport.request("eth_requestAccounts", json!([])).await {
            Err(failure) if failure.has_code(codes::METHOD_NOT_FOUND) => {
                debug!("eth_requestAccounts unsupported, falling back to eth_accounts");
                self.transport.request("eth_accounts", json!([])).await?
            }
            other => other?,
        };
        serde_json::from_value(value)
            .map_err(|err| RawFailure::new(codes::DECODE, format!("Malformed account list: {err}")))
    }

    async fn poll_receipt(&self, tx_hash: &str) -> Result<Receipt, RawFailure> {
        loop {
            let value = self
                .transport
                .request("eth_getTransactionReceipt", json!([tx_hash]))
                .await?;
            let receipt: Option<RpcReceipt> = serde_json::from_value(value).map_err(|err| {
                RawFailure::new(codes::DECODE, format!("Malformed receipt: {err}"))
            })?;

            match receipt {
                Some(receipt) => return to_receipt(receipt),
                None => tokio::time::sleep(self.poll_interval).await,
            }
        }
    }
}

fn to_receipt(receipt: RpcReceipt) -> Result<Receipt, RawFailure> {
    let block_number = receipt
        .block_number
        .as_deref()
        .map(abi::parse_quantity)
        .transpose()?;
    let status = receipt
        .status
        .as_deref()
        .map(abi::parse_quantity)
        .transpose()?;

    Ok(Receipt {
        tx_hash: receipt.transaction_hash,
        block_number,
        // Pre-Byzantium receipts carry no status; inclusion is all we know.
        succeeded: status != Some(0),
        revert_reason: None,
    })
}

#[async_trait]
impl WalletProvider for RpcWalletProvider {
    async fn request_account(&self) -> Result<Account, WalletError> {
        // Only an explicit refusal is a denial; a broken endpoint is no wallet at all.
        let accounts = self.accounts().await.map_err(|failure| {
            if failure.has_code(codes::USER_REJECTED) || failure.has_code(codes::ACTION_REJECTED) {
                WalletError::Denied(failure)
            } else {
                WalletError::NoProvider(failure.to_string())
            }
        })?;

        let account = accounts
            .first()
            .map(Account::new)
            .ok_or_else(|| WalletError::Denied(RawFailure::with_reason("No accounts exposed")))?;
        if !account.is_well_formed() {
            return Err(WalletError::NoProvider(format!(
                "Malformed account '{account}'"
            )));
        }

        info!(%account, "Wallet exposed account");
        Ok(account)
    }

    async fn sign_and_submit(
        &self,
        from: &Account,
        call: &ContractCall,
    ) -> Result<SubmissionHandle, RawFailure> {
        let mut tx = self.transaction(from, call);

        let gas = self
            .transport
            .request("eth_estimateGas", json!([tx.clone()]))
            .await
            .map_err(|failure| {
                if failure.has_code(codes::UNREACHABLE) {
                    failure
                } else {
                    warn!(command = %call.kind(), %failure, "Gas estimation failed");
                    failure.recode(codes::UNPREDICTABLE_GAS_LIMIT)
                }
            })?;
        tx["gas"] = gas;

        let value = self
            .transport
            .request("eth_sendTransaction", json!([tx]))
            .await?;
        let tx_hash: String = serde_json::from_value(value).map_err(|err| {
            RawFailure::new(codes::DECODE, format!("Malformed transaction hash: {err}"))
        })?;

        debug!(command = %call.kind(), %tx_hash, "Transaction sent");
        Ok(SubmissionHandle { tx_hash })
    }

    async fn await_confirmation(&self, handle: &SubmissionHandle) -> Result<Receipt, RawFailure> {
        match self.confirmation_timeout {
            Some(limit) => tokio::time::timeout(limit, self.poll_receipt(&handle.tx_hash))
                .await
                .map_err(|_| {
                    RawFailure::new(
                        codes::TIMEOUT,
                        format!(
                            "No receipt for {} after {}s",
                            handle.tx_hash,
                            limit.as_secs()
                        ),
                    )
                })?,
            None => self.poll_receipt(&handle.tx_hash).await,
        }
    }
}
