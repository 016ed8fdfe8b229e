//! # CLI Interface
//!
//! Defines the command-line argument structure for `cryptonow` using
//! `clap` derive. Each subcommand stands in for one screen of the wallet.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use cryptonow_core::config::Cluster;

use crate::logging::LogFormat;

/// CryptoNow, a small self-custodial Solana wallet.
///
/// One account, native SOL only, devnet by default.
#[derive(Parser, Debug)]
#[command(
    name = "cryptonow",
    about = "CryptoNow Solana wallet",
    version,
    propagate_version = true
)]
pub struct CryptoNowCli {
    /// Directory holding the wallet database and `config.json`.
    ///
    /// Defaults to `$HOME/.cryptonow`. Created on first use.
    #[arg(long, short = 'd', env = "CRYPTONOW_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Cluster to talk to: devnet, testnet or mainnet.
    ///
    /// Overrides the value in `config.json`.
    #[arg(long, env = "CRYPTONOW_CLUSTER", global = true)]
    pub cluster: Option<Cluster>,

    /// Explicit JSON-RPC endpoint. Takes precedence over `--cluster`.
    #[arg(long, env = "CRYPTONOW_RPC_URL", global = true)]
    pub rpc_url: Option<String>,

    /// Log output format (logs go to stderr).
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    pub log_format: LogFormat,

    /// Default log filter when `RUST_LOG` is not set.
    #[arg(long, env = "CRYPTONOW_LOG", default_value = "cryptonow=warn,cryptonow_core=warn", global = true)]
    pub log_level: String,

    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level subcommands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create a new wallet and print its 24-word recovery phrase.
    Create,
    /// Restore a wallet from an existing recovery phrase.
    Import(ImportArgs),
    /// Set the 4-digit PIN that guards the recovery phrase.
    SetPin(SetPinArgs),
    /// Show the address, balance and wallet flags.
    Dashboard,
    /// Send SOL to another address.
    Send(SendArgs),
    /// Show the receive address and its payment request payload.
    Receive(ReceiveArgs),
    /// Request 1 SOL from the cluster faucet.
    Airdrop,
    /// Reveal the recovery phrase.
    Backup(BackupArgs),
    /// List locally recorded transfers and airdrops, newest first.
    History(HistoryArgs),
    /// Decode a scanned QR payload.
    Scan(ScanArgs),
    /// Show settings, optionally changing them.
    Settings(SettingsArgs),
    /// Delete the wallet from this device.
    Reset(ResetArgs),
    /// Print version information and exit.
    Version,
}

#[derive(Parser, Debug)]
pub struct ImportArgs {
    /// The recovery phrase, either quoted or as separate words.
    #[arg(required = true, num_args = 1..)]
    pub phrase: Vec<String>,
}

impl ImportArgs {
    pub fn joined(&self) -> String {
        self.phrase.join(" ")
    }
}

#[derive(Parser, Debug)]
pub struct SetPinArgs {
    pub pin: String,
    /// The same PIN again.
    pub confirm: String,
}

#[derive(Parser, Debug)]
pub struct SendArgs {
    /// Recipient address (base58).
    pub to: String,
    /// Amount in SOL, e.g. `0.25`.
    pub amount: String,
    /// Skip the confirmation prompt.
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Parser, Debug)]
pub struct ReceiveArgs {
    /// Requested amount in SOL.
    #[arg(long)]
    pub amount: Option<String>,
    /// Label shown to the payer.
    #[arg(long)]
    pub label: Option<String>,
    /// Message shown to the payer.
    #[arg(long)]
    pub message: Option<String>,
}

#[derive(Parser, Debug)]
pub struct BackupArgs {
    /// The wallet PIN.
    #[arg(long)]
    pub pin: String,
}

#[derive(Parser, Debug)]
pub struct HistoryArgs {
    /// Show at most this many entries.
    #[arg(long, short = 'n', default_value_t = 20)]
    pub limit: usize,
}

#[derive(Parser, Debug)]
pub struct ScanArgs {
    /// A bare address or a `solana:` payment URI.
    pub payload: String,
}

#[derive(Parser, Debug)]
pub struct SettingsArgs {
    /// Turn biometric unlock on or off.
    #[arg(long, value_enum)]
    pub biometric: Option<Toggle>,
}

#[derive(Parser, Debug)]
pub struct ResetArgs {
    /// Skip the confirmation prompt.
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Toggle {
    On,
    Off,
}

impl Toggle {
    pub fn enabled(self) -> bool {
        self == Toggle::On
    }
}
