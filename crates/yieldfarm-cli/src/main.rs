use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "yieldfarm")]
#[command(about = "Yieldfarm - stake into a time-locked pool", long_about = None)]
struct Cli {
    /// Config file to use instead of ~/.config/yieldfarm/config.toml
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Log debug output (overridden by RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Connect and show pool state and your position
    Status,
    /// Deposit a decimal amount (e.g. 0.5)
    Deposit {
        #[arg(allow_hyphen_values = true)]
        amount: String,
    },
    /// Withdraw your whole deposit
    Withdraw,
    /// Inspect configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Print the resolved config file path
    Path,
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "yieldfarm=debug"
    } else {
        "yieldfarm=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = cli.config.as_deref();
    match cli.command {
        Commands::Status => commands::status::run(config).await,
        Commands::Deposit { amount } => commands::command::deposit(config, &amount).await,
        Commands::Withdraw => commands::command::withdraw(config).await,
        Commands::Config { action } => match action {
            ConfigAction::Path => commands::config::path(config),
        },
    }
}
