//! The wallet state snapshot.

use crate::crypto::address::Address;
use crate::crypto::mnemonic::{RecoveryPhrase, SeedHex};
use crate::transaction::lamports_to_sol;

/// Everything a screen needs to render the wallet.
///
/// `Debug` is safe to log: the phrase and seed types redact themselves.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WalletState {
    pub is_wallet_created: bool,
    pub mnemonic: Option<RecoveryPhrase>,
    pub seed: Option<SeedHex>,
    pub public_key: Option<Address>,
    /// Last fetched balance, in lamports. Zero until a fetch succeeds.
    pub balance: u64,
    /// Whether `balance` came from the cluster for the current wallet.
    pub balance_known: bool,
    pub is_loading: bool,
    /// Message from the last failed operation.
    pub error: Option<String>,
    pub is_pin_set: bool,
}

impl WalletState {
    pub fn balance_sol(&self) -> f64 {
        lamports_to_sol(self.balance)
    }

    /// The cached balance, or `None` if it was never fetched.
    pub fn known_balance(&self) -> Option<u64> {
        self.balance_known.then_some(self.balance)
    }

    /// Whether wallet material is in memory and usable for signing.
    pub fn is_loaded(&self) -> bool {
        self.public_key.is_some() && self.seed.is_some()
    }
}
