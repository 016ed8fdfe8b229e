//! # Cluster RPC
//!
//! The wallet's only window onto the chain. [`Ledger`] is the seam: the
//! real implementation is [`RpcClient`], a thin wrapper over the SDK's
//! nonblocking JSON-RPC client, and tests swap in an in-memory cluster.

pub mod client;
#[cfg(test)]
pub(crate) mod memory;

use async_trait::async_trait;

use crate::crypto::address::Address;
use crate::crypto::keys::TxSignature;
use crate::transaction::{Blockhash, Transaction};

pub use client::{create_connection, RpcClient, RpcError};
pub use solana_transaction_status_client_types::{TransactionConfirmationStatus, TransactionStatus};

/// The cluster operations the wallet depends on.
#[async_trait]
pub trait Ledger: Send + Sync {
    /// Balance in lamports.
    async fn get_balance(&self, address: &Address) -> Result<u64, RpcError>;

    async fn get_latest_blockhash(&self) -> Result<Blockhash, RpcError>;

    /// Submits a signed transaction and returns its signature.
    async fn send_transaction(&self, tx: &Transaction) -> Result<TxSignature, RpcError>;

    /// Asks the cluster faucet for `lamports`. Devnet and testnet only.
    async fn request_airdrop(&self, address: &Address, lamports: u64) -> Result<TxSignature, RpcError>;

    /// `None` if the cluster has not seen the signature (yet).
    async fn get_signature_status(
        &self,
        signature: &TxSignature,
    ) -> Result<Option<TransactionStatus>, RpcError>;
}
