//! # Key Management
//!
//! Ed25519 keypairs for wallet accounts, and the signatures they produce.
//!
//! A wallet account is derived the simple way: BIP-39 seed, first 32
//! bytes, straight into Ed25519 as the secret seed. No BIP-44 path. That
//! keeps addresses compatible with wallets created by earlier versions of
//! the app, which stored exactly this derivation.
//!
//! ## Security considerations
//!
//! - `WalletKeypair` does not implement `Serialize`. Exporting a secret
//!   is an explicit call, never a side effect of serializing a struct.
//! - Key bytes are never logged, and `Debug` only prints the address.

use solana_keypair::{keypair_from_seed, Keypair};
use solana_signer::Signer;
use std::fmt;
use thiserror::Error;
use zeroize::Zeroize;

use super::address::Address;
use crate::config::SECRET_SEED_LENGTH;

/// A 64-byte Ed25519 signature. On Solana the first signature of a
/// transaction doubles as its ID, so this is also the "transaction hash"
/// the user sees, in base58.
pub use solana_signature::Signature as TxSignature;

/// Errors that can occur during key operations.
///
/// Deliberately vague about the bytes involved.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum KeyError {
    #[error("seed is not valid hex")]
    InvalidSeedHex,

    #[error("seed too short: need at least {SECRET_SEED_LENGTH} bytes, got {0}")]
    SeedTooShort(usize),
}

/// An account keypair.
pub struct WalletKeypair {
    keypair: Keypair,
}

impl WalletKeypair {
    /// Fresh random keypair from the OS RNG.
    pub fn generate() -> Self {
        Self {
            keypair: Keypair::new(),
        }
    }

    /// Keypair from raw secret seed bytes. Only the first 32 are used.
    pub fn from_seed(seed: &[u8]) -> Result<Self, KeyError> {
        if seed.len() < SECRET_SEED_LENGTH {
            return Err(KeyError::SeedTooShort(seed.len()));
        }
        let keypair = keypair_from_seed(seed).map_err(|_| KeyError::SeedTooShort(seed.len()))?;
        Ok(Self { keypair })
    }

    /// Derives the account keypair from a stored wallet seed.
    ///
    /// `seed_hex` is the persisted BIP-39 seed: lowercase hex, optionally
    /// `0x`-prefixed. Only its first 32 bytes are used.
    pub fn account_from_seed(seed_hex: &str) -> Result<Self, KeyError> {
        let trimmed = seed_hex.trim();
        let digits = trimmed.strip_prefix("0x").unwrap_or(trimmed);
        let mut bytes = hex::decode(digits).map_err(|_| KeyError::InvalidSeedHex)?;
        let keypair = Self::from_seed(&bytes);
        bytes.zeroize();
        keypair
    }

    /// The account address (public key).
    pub fn address(&self) -> Address {
        self.keypair.pubkey()
    }

    /// The SDK keypair, for signing transactions.
    pub fn keypair(&self) -> &Keypair {
        &self.keypair
    }

    /// Signs `message`. Deterministic for a given key and message.
    pub fn sign(&self, message: &[u8]) -> TxSignature {
        self.keypair.sign_message(message)
    }

    pub fn verify(&self, message: &[u8], signature: &TxSignature) -> bool {
        signature.verify(self.address().as_ref(), message)
    }
}

impl Clone for WalletKeypair {
    fn clone(&self) -> Self {
        Self {
            keypair: self.keypair.insecure_clone(),
        }
    }
}

impl fmt::Debug for WalletKeypair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "WalletKeypair(pub={})", self.address())
    }
}

impl PartialEq for WalletKeypair {
    /// Compares public halves only.
    fn eq(&self, other: &Self) -> bool {
        self.address() == other.address()
    }
}

impl Eq for WalletKeypair {}
