//! In-memory [`Ledger`] for unit tests.
//!
//! Verifies and applies transfers against a balance map and reports a
//! scripted confirmation progression for every signature it hands out.

use async_trait::async_trait;
use parking_lot::Mutex;
use solana_system_interface::instruction::SystemInstruction;
use solana_transaction_error::TransactionError;
use std::collections::HashMap;

use super::{Ledger, RpcError, TransactionConfirmationStatus, TransactionStatus};
use crate::crypto::address::{Address, SYSTEM_PROGRAM_ID};
use crate::crypto::keys::TxSignature;
use crate::transaction::{Blockhash, Transaction};

#[derive(Debug, Default)]
struct Inner {
    balances: HashMap<Address, u64>,
    /// Remaining `processed` polls before each signature reports `confirmed`.
    pending: HashMap<TxSignature, u32>,
    failed: HashMap<TxSignature, TransactionError>,
    submitted: Vec<Transaction>,
    next_sig: u64,
    balance_calls: usize,
    /// Polls a new signature spends at `processed`.
    confirm_after: u32,
    /// Signatures are accepted but never show up in status queries.
    never_confirm: bool,
    /// The next submitted transaction executes with this error.
    fail_next: Option<TransactionError>,
    /// `getBalance` answers with an RPC error.
    balance_error: bool,
}

#[derive(Debug, Default)]
pub struct MemoryLedger {
    inner: Mutex<Inner>,
}

/// `(from, to, lamports)` of a single system transfer.
fn decode_transfer(tx: &Transaction) -> Option<(Address, Address, u64)> {
    let keys = &tx.message.account_keys;
    let ix = tx.message.instructions.first()?;
    if *keys.get(ix.program_id_index as usize)? != SYSTEM_PROGRAM_ID {
        return None;
    }
    let SystemInstruction::Transfer { lamports } = bincode::deserialize(&ix.data).ok()? else {
        return None;
    };
    let from = *keys.get(*ix.accounts.first()? as usize)?;
    let to = *keys.get(*ix.accounts.get(1)? as usize)?;
    Some((from, to, lamports))
}

fn status(
    confirmation_status: TransactionConfirmationStatus,
    err: Option<TransactionError>,
) -> TransactionStatus {
    TransactionStatus {
        slot: 1,
        confirmations: Some(1),
        status: err.clone().map_or(Ok(()), Err),
        err,
        confirmation_status: Some(confirmation_status),
    }
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fund(&self, address: &Address, lamports: u64) {
        *self.inner.lock().balances.entry(*address).or_default() += lamports;
    }

    pub fn balance_of(&self, address: &Address) -> u64 {
        self.inner.lock().balances.get(address).copied().unwrap_or(0)
    }

    pub fn set_confirm_after(&self, polls: u32) {
        self.inner.lock().confirm_after = polls;
    }

    pub fn set_never_confirm(&self, never: bool) {
        self.inner.lock().never_confirm = never;
    }

    pub fn fail_next(&self, err: TransactionError) {
        self.inner.lock().fail_next = Some(err);
    }

    pub fn set_balance_error(&self, fail: bool) {
        self.inner.lock().balance_error = fail;
    }

    pub fn submitted(&self) -> Vec<Transaction> {
        self.inner.lock().submitted.clone()
    }

    pub fn balance_calls(&self) -> usize {
        self.inner.lock().balance_calls
    }

    fn track(inner: &mut Inner, sig: TxSignature) {
        if let Some(err) = inner.fail_next.take() {
            inner.failed.insert(sig, err);
        } else if !inner.never_confirm {
            inner.pending.insert(sig, inner.confirm_after);
        }
    }
}

#[async_trait]
impl Ledger for MemoryLedger {
    async fn get_balance(&self, address: &Address) -> Result<u64, RpcError> {
        let mut inner = self.inner.lock();
        inner.balance_calls += 1;
        if inner.balance_error {
            return Err(RpcError::Server {
                code: -32005,
                message: "Node is behind".into(),
            });
        }
        Ok(inner.balances.get(address).copied().unwrap_or(0))
    }

    async fn get_latest_blockhash(&self) -> Result<Blockhash, RpcError> {
        Ok(Blockhash::new_from_array([0x42; 32]))
    }

    async fn send_transaction(&self, tx: &Transaction) -> Result<TxSignature, RpcError> {
        if tx.verify().is_err() {
            return Err(RpcError::Server {
                code: -32003,
                message: "Transaction signature verification failure".into(),
            });
        }
        let (from, to, lamports) = decode_transfer(tx).ok_or_else(|| RpcError::Server {
            code: -32602,
            message: "invalid transaction: not a system transfer".into(),
        })?;
        let sig = tx.signatures[0];

        let mut inner = self.inner.lock();
        let available = inner.balances.get(&from).copied().unwrap_or(0);
        if available < lamports {
            return Err(RpcError::Server {
                code: -32002,
                message: "Transaction simulation failed: insufficient lamports".into(),
            });
        }
        if inner.fail_next.is_none() {
            *inner.balances.entry(from).or_default() -= lamports;
            *inner.balances.entry(to).or_default() += lamports;
        }
        inner.submitted.push(tx.clone());
        Self::track(&mut inner, sig);
        Ok(sig)
    }

    async fn request_airdrop(&self, address: &Address, lamports: u64) -> Result<TxSignature, RpcError> {
        let mut inner = self.inner.lock();
        inner.next_sig += 1;
        let mut bytes = [0xA1; 64];
        bytes[..8].copy_from_slice(&inner.next_sig.to_le_bytes());
        let sig = TxSignature::from(bytes);
        if inner.fail_next.is_none() {
            *inner.balances.entry(*address).or_default() += lamports;
        }
        Self::track(&mut inner, sig);
        Ok(sig)
    }

    async fn get_signature_status(
        &self,
        signature: &TxSignature,
    ) -> Result<Option<TransactionStatus>, RpcError> {
        let mut inner = self.inner.lock();
        if let Some(err) = inner.failed.get(signature) {
            return Ok(Some(status(TransactionConfirmationStatus::Confirmed, Some(err.clone()))));
        }
        let Some(left) = inner.pending.get_mut(signature) else {
            return Ok(None);
        };
        let level = if *left > 0 {
            *left -= 1;
            TransactionConfirmationStatus::Processed
        } else {
            TransactionConfirmationStatus::Confirmed
        };
        Ok(Some(status(level, None)))
    }
}
