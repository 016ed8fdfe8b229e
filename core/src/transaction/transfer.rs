//! Single-instruction SOL transfers.
//!
//! A transfer is one system program instruction, paid for and signed by
//! the sender. The first signature is the transaction's identity on the
//! cluster.

use solana_message::Message;
use solana_system_interface::instruction as system_instruction;
use solana_transaction::Transaction;

use super::{Blockhash, TransactionError};
use crate::crypto::address::Address;
use crate::crypto::keys::WalletKeypair;

/// Builds and signs a single SOL transfer paid for by `payer`.
pub fn sign_transfer(
    payer: &WalletKeypair,
    to: &Address,
    lamports: u64,
    blockhash: Blockhash,
) -> Result<Transaction, TransactionError> {
    let from = payer.address();
    let instruction = system_instruction::transfer(&from, to, lamports);
    let message = Message::new(&[instruction], Some(&from));
    let mut tx = Transaction::new_unsigned(message);
    tx.try_sign(&[payer.keypair()], blockhash)?;
    Ok(tx)
}
