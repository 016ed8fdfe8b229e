//! Types persisted by [`WalletDb`](super::WalletDb).

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::crypto::address::Address;
use crate::crypto::keys::TxSignature;
use crate::crypto::mnemonic::{RecoveryPhrase, SeedHex};

/// The three wallet secrets written together at creation or import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletData {
    pub mnemonic: RecoveryPhrase,
    pub seed: SeedHex,
    pub public_key: Address,
}

/// Where a sent transaction stands, as far as this wallet knows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferStatus {
    /// Submitted; confirmation not yet observed. A confirmation timeout
    /// leaves a transfer here, since it may still land.
    Pending,
    Confirmed,
    /// Executed by the cluster with an error.
    Failed,
}

impl fmt::Display for TransferStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => write!(f, "pending"),
            Self::Confirmed => write!(f, "confirmed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// What kind of balance change a record describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferKind {
    Send,
    Airdrop,
}

/// One entry of local transaction history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub signature: TxSignature,
    pub kind: TransferKind,
    pub from: Option<Address>,
    pub to: Address,
    pub lamports: u64,
    /// Unix milliseconds at submission.
    pub timestamp: i64,
    pub status: TransferStatus,
}

impl TransactionRecord {
    pub fn send(signature: TxSignature, from: Address, to: Address, lamports: u64) -> Self {
        Self {
            signature,
            kind: TransferKind::Send,
            from: Some(from),
            to,
            lamports,
            timestamp: chrono::Utc::now().timestamp_millis(),
            status: TransferStatus::Pending,
        }
    }

    /// Faucet credit. The faucet's address is not reported, so `from` is empty.
    pub fn airdrop(signature: TxSignature, to: Address, lamports: u64) -> Self {
        Self {
            signature,
            kind: TransferKind::Airdrop,
            from: None,
            to,
            lamports,
            timestamp: chrono::Utc::now().timestamp_millis(),
            status: TransferStatus::Pending,
        }
    }
}
