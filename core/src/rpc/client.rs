//! JSON-RPC client for a Solana cluster.
//!
//! Wraps the SDK's nonblocking [`RpcClient`](SolanaRpcClient) so the rest
//! of the wallet sees one commitment level, one error type and the
//! [`Ledger`] trait.

use solana_commitment_config::CommitmentConfig;
use solana_rpc_client::nonblocking::rpc_client::RpcClient as SolanaRpcClient;
use solana_rpc_client_api::client_error::{Error as ClientError, ErrorKind as ClientErrorKind};
use solana_rpc_client_api::config::RpcSendTransactionConfig;
use solana_rpc_client_api::request::RpcError as RequestError;
use solana_transaction_status_client_types::UiTransactionEncoding;
use thiserror::Error;
use tracing::{debug, warn};

use super::{Ledger, TransactionStatus};
use crate::config::{Commitment, WalletConfig, RPC_REQUEST_TIMEOUT};
use crate::crypto::address::Address;
use crate::crypto::keys::TxSignature;
use crate::transaction::{Blockhash, Transaction};

/// Errors talking to the cluster.
#[derive(Debug, Error)]
pub enum RpcError {
    /// Connection refused, DNS failure, timeout, TLS, ...
    #[error("network error: {0}")]
    Transport(String),

    /// The node answered with a JSON-RPC error object.
    #[error("RPC error {code}: {message}")]
    Server { code: i64, message: String },

    /// Anything else the client reports: bad payloads, signing, 429s.
    #[error("RPC client error: {0}")]
    Client(String),
}

impl From<ClientError> for RpcError {
    fn from(err: ClientError) -> Self {
        match err.kind() {
            ClientErrorKind::Io(_) | ClientErrorKind::Reqwest(_) => RpcError::Transport(err.to_string()),
            ClientErrorKind::RpcError(RequestError::RpcResponseError { code, message, .. }) => {
                warn!(code, %message, "rpc error");
                RpcError::Server {
                    code: *code,
                    message: message.clone(),
                }
            }
            _ => RpcError::Client(err.to_string()),
        }
    }
}

/// Maps the wallet's commitment setting onto the SDK's.
pub fn commitment_config(commitment: Commitment) -> CommitmentConfig {
    match commitment {
        Commitment::Processed => CommitmentConfig::processed(),
        Commitment::Confirmed => CommitmentConfig::confirmed(),
        Commitment::Finalized => CommitmentConfig::finalized(),
    }
}

/// JSON-RPC client bound to one endpoint and commitment level.
pub struct RpcClient {
    inner: SolanaRpcClient,
    commitment: Commitment,
}

impl RpcClient {
    pub fn new(url: impl Into<String>, commitment: Commitment) -> Self {
        let inner = SolanaRpcClient::new_with_timeout_and_commitment(
            url.into(),
            RPC_REQUEST_TIMEOUT,
            commitment_config(commitment),
        );
        Self { inner, commitment }
    }

    pub fn url(&self) -> String {
        self.inner.url()
    }

    pub fn commitment(&self) -> Commitment {
        self.commitment
    }
}

#[async_trait::async_trait]
impl Ledger for RpcClient {
    async fn get_balance(&self, address: &Address) -> Result<u64, RpcError> {
        let response = self
            .inner
            .get_balance_with_commitment(address, commitment_config(self.commitment))
            .await?;
        debug!(%address, slot = response.context.slot, "getBalance");
        Ok(response.value)
    }

    async fn get_latest_blockhash(&self) -> Result<Blockhash, RpcError> {
        Ok(self.inner.get_latest_blockhash().await?)
    }

    async fn send_transaction(&self, tx: &Transaction) -> Result<TxSignature, RpcError> {
        let config = RpcSendTransactionConfig {
            preflight_commitment: Some(commitment_config(self.commitment).commitment),
            encoding: Some(UiTransactionEncoding::Base64),
            ..RpcSendTransactionConfig::default()
        };
        Ok(self.inner.send_transaction_with_config(tx, config).await?)
    }

    async fn request_airdrop(&self, address: &Address, lamports: u64) -> Result<TxSignature, RpcError> {
        Ok(self.inner.request_airdrop(address, lamports).await?)
    }

    async fn get_signature_status(
        &self,
        signature: &TxSignature,
    ) -> Result<Option<TransactionStatus>, RpcError> {
        let response = self.inner.get_signature_statuses(&[*signature]).await?;
        Ok(response.value.into_iter().next().flatten())
    }
}

/// Opens a client for the endpoint and commitment in `config`.
pub fn create_connection(config: &WalletConfig) -> RpcClient {
    RpcClient::new(config.rpc_endpoint(), config.commitment)
}
