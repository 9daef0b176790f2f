use std::path::Path;
use std::process::ExitCode;

use anyhow::Result;
use colored::Colorize;
use yieldfarm_core::pool::UnlockStatus;
use yieldfarm_core::session::SessionSnapshot;

use super::{open_session, report_error};

pub async fn run(config_path: Option<&Path>) -> Result<ExitCode> {
    let session = open_session(config_path)?;

    // A wallet that refuses still leaves the public pool numbers readable.
    let connected = match session.controller.connect().await {
        Ok(_) => true,
        Err(err) => {
            report_error(&err);
            let _ = session.controller.refresh().await;
            false
        }
    };

    let snapshot = session.controller.snapshot().await;
    let decimals = session.config.decimals;
    session.finish().await;

    print_snapshot(&snapshot, decimals);
    Ok(if connected {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

fn print_snapshot(snapshot: &SessionSnapshot, decimals: u32) {
    let account = snapshot
        .connected_account
        .as_ref()
        .map(|a| a.to_string())
        .unwrap_or_else(|| "not connected".to_string());
    println!("{:<16} {}", "Account:".bold(), account);

    let pool = &snapshot.pool_state;
    println!(
        "{:<16} {}",
        "Pool total:".bold(),
        pool.total_deposited.format_decimal(decimals)
    );
    println!("{:<16} {}", "Rate:".bold(), format_rate(pool.rate_basis_points));
    println!(
        "{:<16} {}",
        "Lock duration:".bold(),
        format_duration(pool.lock_duration_seconds)
    );

    if let Some(position) = &snapshot.user_position {
        println!(
            "{:<16} {}",
            "Your deposit:".bold(),
            position.deposited_amount.format_decimal(decimals)
        );
    }
    if let Some(status) = &snapshot.unlock_status {
        println!("{:<16} {}", "Unlock:".bold(), format_unlock(status));
    }
}

fn format_rate(basis_points: u64) -> String {
    format!("{}.{:02}%", basis_points / 100, basis_points % 100)
}

fn format_duration(seconds: u64) -> String {
    let days = seconds / 86_400;
    let hours = (seconds % 86_400) / 3_600;
    let minutes = (seconds % 3_600) / 60;
    let secs = seconds % 60;
    match (days, hours, minutes, secs) {
        (0, 0, 0, s) => format!("{s}s"),
        (0, 0, m, s) => format!("{m}m {s}s"),
        (0, h, m, _) => format!("{h}h {m}m"),
        (d, h, _, _) => format!("{d}d {h}h"),
    }
}

fn format_unlock(status: &UnlockStatus) -> String {
    if status.is_locked() {
        let when = status
            .unlock_at()
            .map(|time| time.to_rfc3339())
            .unwrap_or_else(|| "the far future".to_string());
        return format!("locked until {when}").yellow().to_string();
    }
    match status {
        UnlockStatus::NoDeposit => "no deposit".to_string(),
        _ => "unlocked".green().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_rate() {
        assert_eq!(format_rate(1_250), "12.50%");
        assert_eq!(format_rate(5), "0.05%");
    }

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(45), "45s");
        assert_eq!(format_duration(90), "1m 30s");
        assert_eq!(format_duration(7_260), "2h 1m");
        assert_eq!(format_duration(86_400), "1d 0h");
    }

    #[test]
    fn test_format_unlock_uses_rfc3339() {
        colored::control::set_override(false);
        assert_eq!(
            format_unlock(&UnlockStatus::LockedUntil(87_400)),
            "locked until 1970-01-02T00:16:40+00:00"
        );
        assert_eq!(format_unlock(&UnlockStatus::NoDeposit), "no deposit");
        assert_eq!(format_unlock(&UnlockStatus::Unlocked), "unlocked");
    }

    #[test]
    fn test_format_unlock_beyond_datetime_range() {
        colored::control::set_override(false);
        assert_eq!(
            format_unlock(&UnlockStatus::LockedUntil(u64::MAX)),
            "locked until the far future"
        );
    }
}
