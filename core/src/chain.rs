//! # Chain Operations
//!
//! The wallet-level operations that touch the cluster: balance lookup,
//! SOL transfers, faucet airdrops, and waiting for confirmations. Each
//! one is a short sequence of [`Ledger`] calls; the interesting part is
//! the confirmation loop, which polls until the transaction settles at
//! the configured commitment or the timeout runs out.

use std::sync::Arc;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::config::{WalletConfig, AIRDROP_LAMPORTS};
use crate::crypto::address::Address;
use crate::crypto::keys::{TxSignature, WalletKeypair};
use crate::crypto::mnemonic::SeedHex;
use crate::error::{WalletError, WalletResult};
use crate::rpc::client::commitment_config;
use crate::rpc::{create_connection, Ledger};
use crate::transaction::sign_transfer;

/// How a submitted transaction ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    /// Reached the configured commitment without error.
    Confirmed,
    /// Executed and failed. Carries the cluster's error message.
    Failed(String),
}

/// Result of a faucet request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AirdropOutcome {
    Confirmed(TxSignature),
    Failed { signature: TxSignature, reason: String },
}

/// Cluster access for one wallet configuration.
#[derive(Clone)]
pub struct Chain {
    ledger: Arc<dyn Ledger>,
    config: WalletConfig,
}

impl Chain {
    pub fn new(ledger: Arc<dyn Ledger>, config: WalletConfig) -> Self {
        Self { ledger, config }
    }

    /// A chain backed by an HTTP [`RpcClient`](crate::rpc::RpcClient) for `config`.
    pub fn connect(config: WalletConfig) -> Self {
        let client = create_connection(&config);
        Self::new(Arc::new(client), config)
    }

    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    pub fn ledger(&self) -> &Arc<dyn Ledger> {
        &self.ledger
    }

    /// Balance of `address` in lamports.
    pub async fn get_balance(&self, address: &Address) -> WalletResult<u64> {
        let lamports = self.ledger.get_balance(address).await?;
        debug!(%address, lamports, "balance fetched");
        Ok(lamports)
    }

    /// Signs and submits a transfer without waiting for it to land.
    ///
    /// The account is re-derived from `seed` and must be `from`.
    pub async fn submit_transfer(
        &self,
        seed: &SeedHex,
        from: &Address,
        to: &Address,
        lamports: u64,
    ) -> WalletResult<TxSignature> {
        let keypair = WalletKeypair::account_from_seed(seed.as_str())?;
        if keypair.address() != *from {
            return Err(WalletError::SignerMismatch {
                address: from.to_string(),
            });
        }

        let blockhash = self.ledger.get_latest_blockhash().await?;
        let tx = sign_transfer(&keypair, to, lamports, blockhash)?;
        let signature = self.ledger.send_transaction(&tx).await?;
        info!(%signature, %from, %to, lamports, "transfer submitted");
        Ok(signature)
    }

    /// Requests [`AIRDROP_LAMPORTS`] from the faucet and waits for it.
    ///
    /// Refused up front on clusters without a faucet, unless an explicit
    /// RPC endpoint is configured (a local test validator has one).
    pub async fn request_airdrop(&self, address: &Address) -> WalletResult<AirdropOutcome> {
        if self.config.rpc_url.is_none() && !self.config.cluster.has_faucet() {
            return Err(WalletError::AirdropUnavailable(self.config.cluster));
        }

        let signature = self.ledger.request_airdrop(address, AIRDROP_LAMPORTS).await?;
        info!(%signature, %address, lamports = AIRDROP_LAMPORTS, "airdrop requested");

        Ok(match self.confirm_transaction(&signature).await? {
            Confirmation::Confirmed => AirdropOutcome::Confirmed(signature),
            Confirmation::Failed(reason) => AirdropOutcome::Failed { signature, reason },
        })
    }

    /// Polls the signature status until it settles or the timeout runs out.
    pub async fn confirm_transaction(&self, signature: &TxSignature) -> WalletResult<Confirmation> {
        let commitment = self.config.commitment;
        let required = commitment_config(commitment);
        let deadline = Instant::now() + self.config.confirmation_timeout();

        loop {
            if let Some(status) = self.ledger.get_signature_status(signature).await? {
                if let Some(err) = status.err {
                    warn!(%signature, error = %err, "transaction failed");
                    return Ok(Confirmation::Failed(err.to_string()));
                }
                if status.satisfies_commitment(required) {
                    debug!(%signature, commitment = commitment.as_str(), "transaction confirmed");
                    return Ok(Confirmation::Confirmed);
                }
            }

            if Instant::now() >= deadline {
                warn!(%signature, timeout_ms = self.config.confirmation_timeout_ms, "confirmation timed out");
                return Err(WalletError::ConfirmationTimeout {
                    signature: signature.to_string(),
                    timeout_ms: self.config.confirmation_timeout_ms,
                });
            }
            tokio::time::sleep(self.config.poll_interval()).await;
        }
    }
}
