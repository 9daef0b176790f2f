//! Concrete collaborators for Yieldfarm.
//!
//! Talks to an Ethereum-style JSON-RPC endpoint for identity, signing and
//! reads, and loads configuration from the platform config directory.

pub mod config_service;
pub mod paths;
pub mod rpc;

pub use config_service::ConfigService;
pub use paths::YieldfarmPaths;
pub use rpc::{JsonRpcTransport, RpcLedgerReader, RpcTransport, RpcWalletProvider};
