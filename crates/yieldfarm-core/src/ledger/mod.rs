//! Ledger domain module.
//!
//! - `model`: accounts, contract calls, submission handles and receipts
//! - `provider`: collaborator traits (`WalletProvider`, `LedgerReader`)
//! - `client`: `RemoteLedgerClient`, the identity-bound adapter over both

mod client;
mod model;
mod provider;

pub use client::RemoteLedgerClient;
pub(crate) use model::is_hex_address;
pub use model::{Account, CommandKind, Confirmation, ContractCall, Receipt, SubmissionHandle};
pub use provider::{LedgerReader, WalletError, WalletProvider};
