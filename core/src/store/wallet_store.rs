//! Wallet actions: create, import, load, send, airdrop, clear, PIN.
//!
//! Every fallible action records a user-facing message in
//! [`WalletState::error`] and emits [`WalletEvent::Error`] before handing
//! the error back, so a front-end can either match on the result or just
//! re-render from the snapshot.

use parking_lot::RwLock;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

use super::events::WalletEvent;
use super::state::WalletState;
use crate::chain::{AirdropOutcome, Chain, Confirmation};
use crate::config::{AIRDROP_LAMPORTS, BALANCE_REFRESH_AFTER_AIRDROP, BALANCE_REFRESH_AFTER_SEND};
use crate::crypto::address::{public_key_from_string, Address};
use crate::crypto::keys::{TxSignature, WalletKeypair};
use crate::crypto::mnemonic::{generate_mnemonic, mnemonic_to_seed, RecoveryPhrase, SeedHex};
use crate::crypto::pin::{validate_pin, PinError};
use crate::error::{WalletError, WalletResult};
use crate::storage::{TransactionRecord, TransferStatus, WalletData, WalletDb};
use crate::transaction::AmountError;

/// Capacity of the event channel.
const EVENT_CAPACITY: usize = 64;

struct Inner {
    db: WalletDb,
    chain: Chain,
    state: RwLock<WalletState>,
    events: broadcast::Sender<WalletEvent>,
}

/// Shared handle to the wallet. Cheap to clone; clones see the same state.
#[derive(Clone)]
pub struct WalletStore {
    inner: Arc<Inner>,
}

/// Clears `is_loading` when dropped, so every exit path resets it.
struct Loading<'a>(&'a Inner);

impl<'a> Loading<'a> {
    fn start(inner: &'a Inner) -> Self {
        inner.state.write().is_loading = true;
        Self(inner)
    }
}

impl Drop for Loading<'_> {
    fn drop(&mut self) {
        self.0.state.write().is_loading = false;
    }
}

impl WalletStore {
    pub fn new(db: WalletDb, chain: Chain) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                db,
                chain,
                state: RwLock::new(WalletState::default()),
                events,
            }),
        }
    }

    pub fn db(&self) -> &WalletDb {
        &self.inner.db
    }

    pub fn chain(&self) -> &Chain {
        &self.inner.chain
    }

    /// A copy of the current state.
    pub fn snapshot(&self) -> WalletState {
        self.inner.state.read().clone()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<WalletEvent> {
        self.inner.events.subscribe()
    }

    pub fn set_error(&self, error: Option<String>) {
        self.inner.state.write().error = error;
    }

    pub fn set_loading(&self, loading: bool) {
        self.inner.state.write().is_loading = loading;
    }

    // -- Internals ----------------------------------------------------------

    fn emit(&self, event: WalletEvent) {
        // No subscribers is fine.
        let _ = self.inner.events.send(event);
    }

    /// Records `err` as the current error and passes it through.
    fn fail(&self, err: WalletError) -> WalletError {
        let message = err.to_string();
        warn!(error = %message, "wallet operation failed");
        self.inner.state.write().error = Some(message.clone());
        self.emit(WalletEvent::Error { message });
        err
    }

    fn loaded_account(&self) -> WalletResult<(Address, SeedHex)> {
        let state = self.inner.state.read();
        match (&state.public_key, &state.seed) {
            (Some(address), Some(seed)) => Ok((*address, seed.clone())),
            _ => Err(WalletError::NotLoaded),
        }
    }

    fn schedule_refresh(&self, delay: Duration) {
        let store = self.clone();
        tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            if let Err(e) = store.refresh_balance().await {
                debug!(error = %e, "scheduled balance refresh failed");
            }
        });
    }

    /// Persists a fresh wallet from `phrase` and makes it current.
    fn install(&self, phrase: RecoveryPhrase, imported: bool) -> WalletResult<Address> {
        if self.inner.db.is_wallet_created()? {
            return Err(WalletError::AlreadyExists);
        }
        let seed = mnemonic_to_seed(&phrase);
        let address = WalletKeypair::account_from_seed(seed.as_str())?.address();

        self.inner.db.save_wallet_data(&WalletData {
            mnemonic: phrase.clone(),
            seed: seed.clone(),
            public_key: address,
        })?;

        {
            let mut state = self.inner.state.write();
            state.is_wallet_created = true;
            state.mnemonic = Some(phrase);
            state.seed = Some(seed);
            state.public_key = Some(address);
            state.balance = 0;
            state.balance_known = false;
            state.error = None;
        }
        info!(%address, imported, "wallet created");
        self.emit(WalletEvent::WalletCreated { address, imported });
        Ok(address)
    }

    // -- Wallet lifecycle ---------------------------------------------------

    /// Generates a new 24-word wallet, persists it, and returns the phrase
    /// so it can be shown for backup.
    ///
    /// The balance is fetched right away. As with [`load_wallet`](Self::load_wallet),
    /// a failed fetch is recorded in the state but does not fail the call.
    pub async fn create_wallet(&self) -> WalletResult<RecoveryPhrase> {
        let _loading = Loading::start(&self.inner);
        let phrase = generate_mnemonic();
        self.install(phrase.clone(), false)
            .map_err(|e| self.fail(e))?;
        let _ = self.refresh_balance().await;
        Ok(phrase)
    }

    /// Restores a wallet from an existing recovery phrase and fetches its
    /// balance, which for a restored account is usually not zero.
    pub async fn import_wallet(&self, phrase: &str) -> WalletResult<Address> {
        let _loading = Loading::start(&self.inner);
        let phrase = RecoveryPhrase::parse(phrase).map_err(|e| self.fail(e.into()))?;
        let address = self.install(phrase, true).map_err(|e| self.fail(e))?;
        let _ = self.refresh_balance().await;
        Ok(address)
    }

    /// Loads the persisted wallet, if any, then fetches its balance.
    ///
    /// Returns `Ok(false)` when no wallet exists. A failed balance fetch
    /// is recorded in the state but does not fail the load.
    pub async fn load_wallet(&self) -> WalletResult<bool> {
        let address = {
            let _loading = Loading::start(&self.inner);
            let data = self
                .inner
                .db
                .get_wallet_data()
                .map_err(|e| self.fail(e.into()))?;
            let is_pin_set = self.inner.db.is_pin_set().map_err(|e| self.fail(e.into()))?;

            let mut state = self.inner.state.write();
            state.is_pin_set = is_pin_set;
            let Some(data) = data else {
                state.is_wallet_created = false;
                return Ok(false);
            };
            let address = data.public_key;
            state.is_wallet_created = true;
            state.mnemonic = Some(data.mnemonic);
            state.seed = Some(data.seed);
            state.public_key = Some(address);
            state.balance_known = false;
            address
        };

        info!(%address, "wallet loaded");
        self.emit(WalletEvent::WalletLoaded { address });
        // `refresh_balance` already recorded the failure.
        let _ = self.refresh_balance().await;
        Ok(true)
    }

    /// Re-fetches the balance of the loaded wallet.
    pub async fn refresh_balance(&self) -> WalletResult<u64> {
        let (address, _) = self.loaded_account()?;
        let lamports = self
            .inner
            .chain
            .get_balance(&address)
            .await
            .map_err(|e| self.fail(e))?;
        {
            let mut state = self.inner.state.write();
            state.balance = lamports;
            state.balance_known = true;
        }
        self.emit(WalletEvent::BalanceUpdated { lamports });
        Ok(lamports)
    }

    /// Removes the wallet from storage and memory. Device settings stay.
    pub async fn clear_wallet(&self) -> WalletResult<()> {
        let _loading = Loading::start(&self.inner);
        self.inner
            .db
            .clear_wallet_data()
            .map_err(|e| self.fail(e.into()))?;
        {
            let mut state = self.inner.state.write();
            *state = WalletState {
                is_loading: true,
                ..WalletState::default()
            };
        }
        info!("wallet cleared");
        self.emit(WalletEvent::WalletCleared);
        Ok(())
    }

    // -- Transfers ----------------------------------------------------------

    /// Sends `lamports` to `to` and waits for confirmation.
    ///
    /// The amount is checked against the cached balance, fetched first if
    /// the last fetch failed. The network fee is left to the cluster to
    /// enforce.
    ///
    /// The history record is marked `Failed` only when the cluster reports
    /// an execution error. A timeout or RPC error while confirming leaves
    /// it `Pending`: the transfer may still land.
    pub async fn send_transaction(&self, to: &str, lamports: u64) -> WalletResult<TxSignature> {
        let (from, seed) = self.loaded_account()?;
        let to = public_key_from_string(to).map_err(|e| self.fail(e.into()))?;
        if lamports == 0 {
            return Err(self.fail(AmountError::NotPositive.into()));
        }
        let cached = self.inner.state.read().known_balance();
        let available = match cached {
            Some(lamports) => lamports,
            // `refresh_balance` records its own failure.
            None => self.refresh_balance().await?,
        };
        if lamports > available {
            return Err(self.fail(WalletError::InsufficientFunds {
                requested: lamports,
                available,
            }));
        }

        let _loading = Loading::start(&self.inner);
        let chain = &self.inner.chain;
        let signature = chain
            .submit_transfer(&seed, &from, &to, lamports)
            .await
            .map_err(|e| self.fail(e))?;
        self.record(&TransactionRecord::send(signature, from, to, lamports));

        let outcome = chain.confirm_transaction(&signature).await;
        match &outcome {
            Ok(Confirmation::Confirmed) => self.update_record(&signature, TransferStatus::Confirmed),
            Ok(Confirmation::Failed(_)) => self.update_record(&signature, TransferStatus::Failed),
            Err(e) => debug!(%signature, error = %e, "transfer left pending"),
        }

        match outcome {
            Ok(Confirmation::Confirmed) => {
                self.inner.state.write().error = None;
                self.emit(WalletEvent::TransactionSent {
                    signature,
                    to,
                    lamports,
                });
                self.schedule_refresh(BALANCE_REFRESH_AFTER_SEND);
                Ok(signature)
            }
            Ok(Confirmation::Failed(reason)) => Err(self.fail(WalletError::TransactionFailed(reason))),
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Requests one SOL from the faucet. `Ok(false)` if the faucet
    /// transaction failed on-chain.
    pub async fn request_airdrop(&self) -> WalletResult<bool> {
        let (address, _) = self.loaded_account()?;
        let _loading = Loading::start(&self.inner);

        let outcome = self
            .inner
            .chain
            .request_airdrop(&address)
            .await
            .map_err(|e| self.fail(e))?;

        match outcome {
            AirdropOutcome::Confirmed(signature) => {
                let mut record = TransactionRecord::airdrop(signature, address, AIRDROP_LAMPORTS);
                record.status = TransferStatus::Confirmed;
                self.record(&record);
                self.inner.state.write().error = None;
                self.emit(WalletEvent::AirdropCompleted {
                    signature,
                    lamports: AIRDROP_LAMPORTS,
                });
                self.schedule_refresh(BALANCE_REFRESH_AFTER_AIRDROP);
                Ok(true)
            }
            AirdropOutcome::Failed { signature, reason } => {
                let mut record = TransactionRecord::airdrop(signature, address, AIRDROP_LAMPORTS);
                record.status = TransferStatus::Failed;
                self.record(&record);
                let _ = self.fail(WalletError::TransactionFailed(format!("airdrop failed: {reason}")));
                Ok(false)
            }
        }
    }

    /// History is best-effort: a storage hiccup must not fail a transfer
    /// that already reached the cluster.
    fn record(&self, record: &TransactionRecord) {
        if let Err(e) = self.inner.db.put_transaction(record) {
            warn!(signature = %record.signature, error = %e, "could not record transaction");
        }
    }

    fn update_record(&self, signature: &TxSignature, status: TransferStatus) {
        if let Err(e) = self.inner.db.update_status(signature, status) {
            warn!(%signature, error = %e, "could not update transaction status");
        }
    }

    pub fn transactions(&self) -> WalletResult<Vec<TransactionRecord>> {
        Ok(self.inner.db.list_transactions()?)
    }

    // -- PIN ----------------------------------------------------------------

    /// Sets the PIN. `confirm` is the second entry and must match.
    pub fn set_pin(&self, pin: &str, confirm: &str) -> WalletResult<()> {
        validate_pin(pin).map_err(|e| self.fail(e.into()))?;
        if pin != confirm {
            return Err(self.fail(PinError::Mismatch.into()));
        }
        self.inner
            .db
            .save_pin_code(pin)
            .map_err(|e| self.fail(e.into()))?;
        self.inner.state.write().is_pin_set = true;
        info!("PIN set");
        Ok(())
    }

    /// Checks `pin` against the stored hash.
    pub fn verify_pin(&self, pin: &str) -> WalletResult<bool> {
        if !self.inner.db.is_pin_set()? {
            return Err(self.fail(WalletError::PinNotSet));
        }
        Ok(self.inner.db.verify_pin_code(pin)?)
    }

    /// The recovery phrase, released only for the correct PIN.
    pub fn reveal_mnemonic(&self, pin: &str) -> WalletResult<RecoveryPhrase> {
        let phrase = self
            .inner
            .state
            .read()
            .mnemonic
            .clone()
            .ok_or(WalletError::NotLoaded)?;
        if !self.verify_pin(pin)? {
            return Err(self.fail(WalletError::IncorrectPin));
        }
        Ok(phrase)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
