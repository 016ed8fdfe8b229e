//! Notifications broadcast by [`WalletStore`](super::WalletStore).

use serde::{Serialize, Serializer};
use std::fmt::Display;

use crate::crypto::address::Address;
use crate::crypto::keys::TxSignature;

/// Something that changed in the wallet. Subscribers that fall behind
/// lose the oldest events; the state snapshot is always authoritative.
///
/// Addresses and signatures serialize as base58 strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WalletEvent {
    WalletCreated {
        #[serde(serialize_with = "base58")]
        address: Address,
        imported: bool,
    },
    WalletLoaded {
        #[serde(serialize_with = "base58")]
        address: Address,
    },
    BalanceUpdated {
        lamports: u64,
    },
    TransactionSent {
        #[serde(serialize_with = "base58")]
        signature: TxSignature,
        #[serde(serialize_with = "base58")]
        to: Address,
        lamports: u64,
    },
    AirdropCompleted {
        #[serde(serialize_with = "base58")]
        signature: TxSignature,
        lamports: u64,
    },
    WalletCleared,
    Error {
        message: String,
    },
}

fn base58<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}
