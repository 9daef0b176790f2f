use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;
use yieldfarm_core::error::StakeError;
use yieldfarm_core::ledger::Confirmation;

use super::{Session, open_session, report_error};

pub async fn deposit(config_path: Option<&Path>, amount: &str) -> Result<ExitCode> {
    let session = open_session(config_path)?;
    let outcome = match session.controller.connect().await {
        Ok(_) => session.controller.submit_deposit(amount).await,
        Err(err) => Err(err),
    };
    Ok(conclude(session, outcome).await)
}

pub async fn withdraw(config_path: Option<&Path>) -> Result<ExitCode> {
    let session = open_session(config_path)?;
    let outcome = match session.controller.connect().await {
        Ok(_) => session.controller.submit_withdraw().await,
        Err(err) => Err(err),
    };
    Ok(conclude(session, outcome).await)
}

async fn conclude(session: Session, outcome: Result<Confirmation, StakeError>) -> ExitCode {
    session.finish().await;
    match outcome {
        Ok(confirmation) => {
            let block = confirmation
                .block_number
                .map(|n| format!(" in block {n}"))
                .unwrap_or_default();
            println!(
                "{}",
                format!("Confirmed {}{block}", confirmation.tx_hash).green()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            report_error(&err);
            if let Some(hint) = failure_hint(&err) {
                eprintln!("{}", hint.dimmed());
            }
            ExitCode::FAILURE
        }
    }
}

fn failure_hint(err: &StakeError) -> Option<&'static str> {
    if err.is_user_rejected() {
        Some("Nothing was sent. Run the command again to re-open the signing prompt.")
    } else if err.is_command_in_progress() {
        Some("Wait for the pending transaction to confirm, then retry.")
    } else if err.is_recoverable() {
        Some("You can retry this command.")
    } else {
        None
    }
}
