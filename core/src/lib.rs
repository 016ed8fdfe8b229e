// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # CryptoNow Core Library
//!
//! A small self-custodial Solana wallet: one account, native SOL only,
//! devnet by default. It does what a phone wallet does and not much
//! more, and it tries to do that without surprises.
//!
//! ## Architecture
//!
//! - **config**: Constants, clusters, commitment levels, the config file.
//! - **crypto**: Recovery phrases, account keys, addresses, PIN hashing.
//! - **transaction**: SOL transfers on the SDK message types, amount math.
//! - **rpc**: The [`Ledger`](rpc::Ledger) seam over the SDK RPC client.
//! - **chain**: Balance, send, airdrop and confirmation polling.
//! - **storage**: sled-backed persistence for secrets, settings, history.
//! - **store**: [`WalletStore`](store::WalletStore), the state the UI renders.
//! - **qr**: Payment request payloads for the receive and scan screens.
//! - **error**: [`WalletError`](error::WalletError), the union of the above.
//!
//! ## Ground Rules
//!
//! 1. Lamports are `u64`. Floats only exist for display.
//! 2. Secrets redact themselves in `Debug` and never reach a log line.
//! 3. Every network call goes through `Ledger`, so everything above it
//!    can be tested without a network.

pub mod chain;
pub mod config;
pub mod crypto;
pub mod error;
pub mod qr;
pub mod rpc;
pub mod storage;
pub mod store;
pub mod transaction;

pub use chain::Chain;
pub use config::WalletConfig;
pub use error::{WalletError, WalletResult};
pub use store::{WalletEvent, WalletState, WalletStore};
