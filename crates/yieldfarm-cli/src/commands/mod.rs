pub mod command;
pub mod config;
pub mod status;

use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use colored::Colorize;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use yieldfarm_application::SessionController;
use yieldfarm_core::config::LedgerConfig;
use yieldfarm_core::error::StakeError;
use yieldfarm_core::session::SessionEvent;
use yieldfarm_infrastructure::{ConfigService, JsonRpcTransport, RpcLedgerReader, RpcWalletProvider};

/// A controller wired to the configured endpoint, plus the task printing its events.
pub struct Session {
    pub controller: SessionController,
    pub config: LedgerConfig,
    printer: JoinHandle<()>,
}

impl Session {
    /// Drops the controller and waits for the remaining events to be printed.
    pub async fn finish(self) {
        drop(self.controller);
        let _ = self.printer.await;
    }
}

pub fn config_service(path: Option<&Path>) -> Result<ConfigService> {
    match path {
        Some(path) => Ok(ConfigService::with_path(path)),
        None => ConfigService::new().context("Failed to resolve config path"),
    }
}

pub fn open_session(config_path: Option<&Path>) -> Result<Session> {
    let service = config_service(config_path)?;
    let config = service
        .load()
        .with_context(|| format!("Failed to load config from {}", service.path().display()))?;

    let transport = Arc::new(
        JsonRpcTransport::new(config.rpc_url.clone(), config.request_timeout())
            .context("Failed to create JSON-RPC transport")?,
    );
    let wallet = Arc::new(RpcWalletProvider::new(transport.clone(), &config));
    let reader = Arc::new(RpcLedgerReader::new(
        transport,
        config.contract_address.clone(),
    ));

    let (sender, receiver) = mpsc::unbounded_channel();
    let controller =
        SessionController::new(wallet, reader, config.decimals).with_event_sink(sender);
    let printer = tokio::spawn(print_events(receiver));

    Ok(Session {
        controller,
        config,
        printer,
    })
}

async fn print_events(mut receiver: mpsc::UnboundedReceiver<SessionEvent>) {
    while let Some(event) = receiver.recv().await {
        match event {
            SessionEvent::Connected { account } => {
                eprintln!("{}", format!("Connected as {account}").dimmed());
            }
            SessionEvent::CommandSubmitted { command } => {
                eprintln!(
                    "{}",
                    format!("Submitting {command}, waiting for confirmation...").dimmed()
                );
            }
            SessionEvent::RefreshFailed { error } => {
                eprintln!("{}", format!("Could not refresh pool state: {error}").yellow());
            }
            // Outcomes are reported by the command itself.
            _ => {}
        }
    }
}

pub fn report_error(error: &StakeError) {
    eprintln!("{}", format!("Error: {error}").red());
}
