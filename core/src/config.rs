//! # Wallet Configuration & Constants
//!
//! Every magic number in CryptoNow lives here. If you're hardcoding a
//! lamport count or a timeout somewhere else, move it here.
//!
//! Runtime settings (which cluster to talk to, how long to wait for a
//! confirmation) live in [`WalletConfig`], which can be loaded from a
//! JSON file in the wallet's data directory and overridden from the CLI.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Denominations
// ---------------------------------------------------------------------------

/// Lamports in one SOL. Solana's smallest unit, nine decimal places.
pub const LAMPORTS_PER_SOL: u64 = 1_000_000_000;

/// Number of fractional digits a SOL amount can carry.
pub const SOL_DECIMALS: u32 = 9;

/// How much the devnet faucet hands out per request.
pub const AIRDROP_LAMPORTS: u64 = LAMPORTS_PER_SOL;

// ---------------------------------------------------------------------------
// Key Material
// ---------------------------------------------------------------------------

/// Entropy fed into a freshly generated recovery phrase. 32 bytes gives
/// the 24-word phrase.
pub const MNEMONIC_ENTROPY_BYTES: usize = 32;

/// Ed25519 secret seed length. The first 32 bytes of the BIP-39 seed.
pub const SECRET_SEED_LENGTH: usize = 32;

/// PIN codes are exactly this many ASCII digits.
pub const PIN_LENGTH: usize = 4;

/// Random salt prepended to the PIN before hashing.
pub const PIN_SALT_LENGTH: usize = 16;

// ---------------------------------------------------------------------------
// Display
// ---------------------------------------------------------------------------

/// Characters kept on each side when an address is truncated for display.
pub const DEFAULT_ADDRESS_CHARS: usize = 4;

// ---------------------------------------------------------------------------
// Timing
// ---------------------------------------------------------------------------

/// Delay before re-reading the balance after a transfer lands.
pub const BALANCE_REFRESH_AFTER_SEND: Duration = Duration::from_millis(2_000);

/// Delay before re-reading the balance after an airdrop. The faucet is
/// slower to settle than a plain transfer.
pub const BALANCE_REFRESH_AFTER_AIRDROP: Duration = Duration::from_millis(3_000);

/// How long to wait for a signature to reach the requested commitment.
pub const CONFIRMATION_TIMEOUT_MS: u64 = 30_000;

/// Gap between two `getSignatureStatuses` polls.
pub const CONFIRMATION_POLL_INTERVAL_MS: u64 = 500;

/// Upper bound on any single HTTP round trip to the RPC node.
pub const RPC_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

// ---------------------------------------------------------------------------
// Files
// ---------------------------------------------------------------------------

/// Name of the optional JSON config file inside the data directory.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Name of the sled database directory inside the data directory.
pub const DB_DIR_NAME: &str = "db";

// ---------------------------------------------------------------------------
// Cluster
// ---------------------------------------------------------------------------

/// Public RPC endpoints, one per cluster.
pub const DEVNET_RPC_URL: &str = "https://api.devnet.solana.com";
pub const TESTNET_RPC_URL: &str = "https://api.testnet.solana.com";
pub const MAINNET_RPC_URL: &str = "https://api.mainnet-beta.solana.com";

/// Errors from parsing configuration values.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown cluster: {0} (expected devnet, testnet or mainnet)")]
    UnknownCluster(String),

    #[error("unknown commitment level: {0}")]
    UnknownCommitment(String),

    #[error("failed to read config file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// Which Solana cluster the wallet talks to.
///
/// Devnet is the default. The faucet only works there and on testnet, and
/// this wallet was never meant to hold real money.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Cluster {
    #[default]
    Devnet,
    Testnet,
    MainnetBeta,
}

impl Cluster {
    /// Public RPC URL for this cluster.
    pub fn rpc_url(self) -> &'static str {
        match self {
            Cluster::Devnet => DEVNET_RPC_URL,
            Cluster::Testnet => TESTNET_RPC_URL,
            Cluster::MainnetBeta => MAINNET_RPC_URL,
        }
    }

    /// Whether `requestAirdrop` is served on this cluster.
    pub fn has_faucet(self) -> bool {
        !matches!(self, Cluster::MainnetBeta)
    }

    pub fn name(self) -> &'static str {
        match self {
            Cluster::Devnet => "devnet",
            Cluster::Testnet => "testnet",
            Cluster::MainnetBeta => "mainnet-beta",
        }
    }
}

impl fmt::Display for Cluster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Cluster {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "devnet" => Ok(Cluster::Devnet),
            "testnet" => Ok(Cluster::Testnet),
            "mainnet" | "mainnet-beta" => Ok(Cluster::MainnetBeta),
            other => Err(ConfigError::UnknownCluster(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// Commitment
// ---------------------------------------------------------------------------

/// How settled a piece of ledger state has to be before we trust it.
///
/// Ordered: `Processed < Confirmed < Finalized`, so "has this status
/// reached the level I asked for" is a plain `>=`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum Commitment {
    Processed,
    #[default]
    Confirmed,
    Finalized,
}

impl Commitment {
    pub fn as_str(self) -> &'static str {
        match self {
            Commitment::Processed => "processed",
            Commitment::Confirmed => "confirmed",
            Commitment::Finalized => "finalized",
        }
    }
}

impl FromStr for Commitment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "processed" => Ok(Commitment::Processed),
            "confirmed" => Ok(Commitment::Confirmed),
            "finalized" => Ok(Commitment::Finalized),
            other => Err(ConfigError::UnknownCommitment(other.to_string())),
        }
    }
}

// ---------------------------------------------------------------------------
// WalletConfig
// ---------------------------------------------------------------------------

/// Runtime configuration for the wallet.
///
/// Every field has a default, so an empty `{}` config file (or no file
/// at all) gives a devnet wallet with `confirmed` commitment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WalletConfig {
    /// Target cluster.
    pub cluster: Cluster,
    /// Explicit RPC endpoint. Takes precedence over the cluster URL.
    pub rpc_url: Option<String>,
    /// Commitment used for reads and confirmations.
    pub commitment: Commitment,
    /// Give up waiting for a confirmation after this long.
    pub confirmation_timeout_ms: u64,
    /// Poll interval while waiting for a confirmation.
    pub poll_interval_ms: u64,
}

impl Default for WalletConfig {
    fn default() -> Self {
        Self {
            cluster: Cluster::default(),
            rpc_url: None,
            commitment: Commitment::default(),
            confirmation_timeout_ms: CONFIRMATION_TIMEOUT_MS,
            poll_interval_ms: CONFIRMATION_POLL_INTERVAL_MS,
        }
    }
}

impl WalletConfig {
    /// Loads a config file. A missing file yields the defaults.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let display = path.display().to_string();

        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(ConfigError::Io {
                    path: display,
                    source,
                })
            }
        };

        serde_json::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }

    /// The RPC endpoint to use: the explicit override, else the cluster URL.
    pub fn rpc_endpoint(&self) -> &str {
        self.rpc_url.as_deref().unwrap_or(self.cluster.rpc_url())
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_millis(self.confirmation_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
