use std::sync::Arc;

use async_trait::async_trait;
use serde_json::json;
use tracing::debug;
use yieldfarm_core::Amount;
use yieldfarm_core::error::{RawFailure, codes};
use yieldfarm_core::ledger::{Account, LedgerReader};
use yieldfarm_core::pool::{PoolState, UserPosition};

use super::abi;
use super::transport::RpcTransport;

/// Reads pool parameters and positions through `eth_call`.
pub struct RpcLedgerReader {
    transport: Arc<dyn RpcTransport>,
    contract: String,
}

impl RpcLedgerReader {
    pub fn new(transport: Arc<dyn RpcTransport>, contract_address: impl Into<String>) -> Self {
        Self {
            transport,
            contract: contract_address.into().to_lowercase(),
        }
    }

    async fn call(&self, data: &str) -> Result<Vec<u8>, RawFailure> {
        let value = self
            .transport
            .request(
                "eth_call",
                json!([{ "to": self.contract, "data": data }, "latest"]),
            )
            .await?;
        let hex = value.as_str().ok_or_else(|| {
            RawFailure::new(codes::DECODE, format!("eth_call returned non-string: {value}"))
        })?;
        abi::decode_hex(hex)
    }

    async fn read_u128(&self, selector: &str) -> Result<u128, RawFailure> {
        let data = self.call(selector).await?;
        abi::word_to_u128(abi::word(&data, 0)?)
    }

    async fn read_u64(&self, selector: &str) -> Result<u64, RawFailure> {
        let data = self.call(selector).await?;
        abi::word_to_u64(abi::word(&data, 0)?)
    }
}

#[async_trait]
impl LedgerReader for RpcLedgerReader {
    async fn pool_state(&self) -> Result<PoolState, RawFailure> {
        let (total, rate, lock) = tokio::try_join!(
            self.read_u128(abi::GET_POOL_AMOUNT),
            self.read_u64(abi::GET_POOL_RATE),
            self.read_u64(abi::GET_POOL_LOCK_DURATION),
        )?;
        debug!(total = %total, rate, lock, "Read pool state");

        Ok(PoolState {
            total_deposited: Amount::from_base_units(total),
            rate_basis_points: rate,
            lock_duration_seconds: lock,
        })
    }

    async fn user_position(&self, account: &Account) -> Result<UserPosition, RawFailure> {
        let data = self
            .call(&abi::call_with_address(abi::GET_USER_DEPOSIT, account))
            .await?;
        let amount = abi::word_to_u128(abi::word(&data, 0)?)?;
        let deposit_timestamp = abi::word_to_u64(abi::word(&data, 1)?)?;
        debug!(%account, amount = %amount, deposit_timestamp, "Read user position");

        Ok(UserPosition {
            deposited_amount: Amount::from_base_units(amount),
            deposit_timestamp,
        })
    }
}
