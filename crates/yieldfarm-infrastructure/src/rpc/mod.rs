//! JSON-RPC backed wallet and ledger reader.

pub mod abi;
mod reader;
mod transport;
mod wallet;

pub use reader::RpcLedgerReader;
pub use transport::{JsonRpcTransport, RpcTransport};
pub use wallet::RpcWalletProvider;
