//! # Transaction Module
//!
//! Native SOL transfers in Solana's legacy transaction format, plus the
//! amount arithmetic around them. Message layout, signing and the wire
//! encoding come from the SDK crates (`solana-message`,
//! `solana-transaction`, `solana-system-interface`); this module only
//! decides what goes into a transfer.
//!
//! ## Architecture
//!
//! ```text
//! transfer.rs  system transfer instruction, message, signed transaction
//! amount.rs    lamports <-> SOL, parsing user-entered amounts
//! ```
//!
//! ## Lifecycle
//!
//! 1. **Build**: one `system_instruction::transfer` against a fresh blockhash.
//! 2. **Sign**: [`sign_transfer`] signs with the payer keypair.
//! 3. **Send**: the RPC client encodes it into `sendTransaction`.
//! 4. **Track**: the first signature is the ID to poll for confirmation.

pub mod amount;
pub mod transfer;

use solana_signer::SignerError;
use thiserror::Error;

pub use amount::{format_sol, lamports_to_sol, parse_sol, sol_to_lamports, AmountError};
pub use solana_hash::Hash as Blockhash;
pub use solana_transaction::Transaction;
pub use transfer::sign_transfer;

/// Errors from building or signing a transaction.
#[derive(Debug, Error)]
pub enum TransactionError {
    #[error("could not sign transaction: {0}")]
    Signing(#[from] SignerError),
}
