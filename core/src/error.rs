//! Error type for wallet operations.
//!
//! Each module defines its own narrow error enum; [`WalletError`] wraps
//! them for the chain and store layers, where one operation can fail in
//! several ways. Display strings are shown to the user as-is, so none of
//! them carry key material.

use thiserror::Error;

use crate::config::{Cluster, ConfigError};
use crate::crypto::address::AddressError;
use crate::crypto::keys::KeyError;
use crate::crypto::mnemonic::MnemonicError;
use crate::crypto::pin::PinError;
use crate::rpc::RpcError;
use crate::storage::DbError;
use crate::transaction::{format_sol, AmountError, TransactionError};

#[derive(Debug, Error)]
pub enum WalletError {
    #[error("key error: {0}")]
    Key(#[from] KeyError),

    #[error(transparent)]
    Mnemonic(#[from] MnemonicError),

    #[error("invalid address: {0}")]
    Address(#[from] AddressError),

    #[error("invalid amount: {0}")]
    Amount(#[from] AmountError),

    #[error(transparent)]
    Pin(#[from] PinError),

    #[error("transaction error: {0}")]
    Transaction(#[from] TransactionError),

    #[error("storage error: {0}")]
    Storage(#[from] DbError),

    #[error(transparent)]
    Rpc(#[from] RpcError),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The cluster executed the transaction and it failed.
    #[error("transaction failed: {0}")]
    TransactionFailed(String),

    #[error("transaction {signature} not confirmed after {timeout_ms}ms")]
    ConfirmationTimeout { signature: String, timeout_ms: u64 },

    #[error("no wallet loaded")]
    NotLoaded,

    #[error("a wallet already exists; reset it first")]
    AlreadyExists,

    /// The stored seed does not derive the account it claims to own.
    #[error("seed does not control account {address}")]
    SignerMismatch { address: String },

    #[error(
        "insufficient funds: requested {} SOL, available {} SOL",
        format_sol(*requested),
        format_sol(*available)
    )]
    InsufficientFunds { requested: u64, available: u64 },

    #[error("airdrops are not available on {0}")]
    AirdropUnavailable(Cluster),

    #[error("no PIN has been set")]
    PinNotSet,

    #[error("incorrect PIN")]
    IncorrectPin,
}

pub type WalletResult<T> = Result<T, WalletError>;
