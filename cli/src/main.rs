// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # CryptoNow CLI
//!
//! Entry point for the `cryptonow` binary. Parses CLI arguments,
//! initializes logging, opens the wallet in the data directory and runs
//! one screen:
//!
//! - `create`, `import`, `set-pin`: onboarding
//! - `dashboard`: address, balance, flags
//! - `send`, `receive`, `airdrop`: moving SOL
//! - `backup`, `history`, `scan`: phrase, past transfers, QR payloads
//! - `settings`, `reset`: device settings, wallet removal
//! - `version`: build version information

mod cli;
mod commands;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use std::io::{BufRead, Write};

use cli::{Commands, CryptoNowCli};
use commands::Session;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = CryptoNowCli::parse();
    logging::init_logging(&cli.log_level, cli.log_format);

    let mut stdout = std::io::stdout().lock();
    let out = &mut stdout;

    // Commands that never touch the wallet.
    match &cli.command {
        Commands::Version => {
            print_version(out)?;
            return Ok(());
        }
        Commands::Scan(args) => return commands::scan(args, out),
        _ => {}
    }

    let data_dir = commands::resolve_data_dir(cli.data_dir);
    let config = commands::load_config(&data_dir, cli.cluster, cli.rpc_url)?;
    tracing::info!(
        data_dir = %data_dir.display(),
        cluster = %config.cluster,
        rpc = config.rpc_endpoint(),
        "opening wallet"
    );
    let session = Session::open(&data_dir, config)?;

    if session.store().db().is_first_launch()? {
        eprintln!("Welcome to CryptoNow. Wallet data lives in {}", data_dir.display());
    }

    match cli.command {
        Commands::Create => commands::create(&session, out).await,
        Commands::Import(args) => commands::import(&session, &args, out).await,
        Commands::SetPin(args) => commands::set_pin(&session, &args, out).await,
        Commands::Dashboard => commands::dashboard(&session, out).await,
        Commands::Send(args) => commands::send(&session, &args, out, ask).await,
        Commands::Receive(args) => commands::receive(&session, &args, out).await,
        Commands::Airdrop => commands::airdrop(&session, out).await,
        Commands::Backup(args) => commands::backup(&session, &args, out).await,
        Commands::History(args) => commands::history(&session, &args, out),
        Commands::Settings(args) => commands::settings(&session, &args, out),
        Commands::Reset(args) => commands::reset(&session, &args, out, ask).await,
        Commands::Version | Commands::Scan(_) => Ok(()),
    }
}

/// Asks a yes/no question on stderr and reads the answer from stdin.
/// Anything but `y` or `yes` is a no.
fn ask(question: &str) -> Result<bool> {
    eprint!("{question} [y/N] ");
    std::io::stderr().flush()?;
    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("failed to read answer from stdin")?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "y" | "yes"))
}

/// Prints version information to stdout.
fn print_version(out: &mut impl Write) -> Result<()> {
    writeln!(out, "cryptonow {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(out, "rustc     {}", rustc_version())?;
    Ok(())
}

/// Returns the Rust compiler version used to build this binary.
fn rustc_version() -> &'static str {
    option_env!("RUSTC_VERSION").unwrap_or("unknown")
}
