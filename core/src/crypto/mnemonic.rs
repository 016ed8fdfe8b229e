//! # Recovery Phrases
//!
//! BIP-39 mnemonic generation, validation, and seed derivation.
//!
//! The seed is rendered as `0x`-prefixed lowercase hex because that is
//! the exact text the wallet has always persisted; existing stored
//! wallets must keep deriving the same account.

use bip39::{Language, Mnemonic};
use rand::{rngs::OsRng, RngCore};
use std::fmt;
use thiserror::Error;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::config::MNEMONIC_ENTROPY_BYTES;

/// Errors from parsing a recovery phrase.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MnemonicError {
    #[error("recovery phrase must have 12, 15, 18, 21 or 24 words, got {0}")]
    InvalidWordCount(usize),

    #[error("recovery phrase is not a valid BIP-39 mnemonic: {0}")]
    Invalid(String),
}

/// A checksum-verified recovery phrase, whitespace-normalised.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct RecoveryPhrase {
    phrase: String,
}

/// A BIP-39 seed in its persisted textual form (`0x` + 128 hex digits).
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SeedHex(String);

impl RecoveryPhrase {
    /// Parses and validates a phrase typed or pasted by the user.
    pub fn parse(text: &str) -> Result<Self, MnemonicError> {
        let words: Vec<&str> = text.split_whitespace().collect();
        if !matches!(words.len(), 12 | 15 | 18 | 21 | 24) {
            return Err(MnemonicError::InvalidWordCount(words.len()));
        }
        let normalized = words.join(" ").to_lowercase();
        Mnemonic::parse_in_normalized(Language::English, &normalized)
            .map_err(|e| MnemonicError::Invalid(e.to_string()))?;
        Ok(Self { phrase: normalized })
    }

    pub fn as_str(&self) -> &str {
        &self.phrase
    }

    pub fn word_count(&self) -> usize {
        self.phrase.split_whitespace().count()
    }

    pub fn words(&self) -> Vec<&str> {
        self.phrase.split_whitespace().collect()
    }
}

impl fmt::Debug for RecoveryPhrase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecoveryPhrase")
            .field("word_count", &self.word_count())
            .field("phrase", &"[REDACTED]")
            .finish()
    }
}

impl SeedHex {
    /// Wraps a seed string loaded from storage. Not validated here;
    /// [`WalletKeypair::account_from_seed`](super::keys::WalletKeypair::account_from_seed)
    /// does that when the seed is used.
    pub fn from_stored(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SeedHex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SeedHex([REDACTED])")
    }
}

/// Generates a fresh 24-word phrase from OS randomness.
pub fn generate_mnemonic() -> RecoveryPhrase {
    let mut entropy = [0u8; MNEMONIC_ENTROPY_BYTES];
    OsRng.fill_bytes(&mut entropy);
    // 32 bytes is one of the five entropy sizes BIP-39 defines.
    let phrase = match Mnemonic::from_entropy(&entropy) {
        Ok(mnemonic) => mnemonic.to_string(),
        Err(e) => unreachable!("32-byte entropy rejected by bip39: {e}"),
    };
    entropy.zeroize();
    RecoveryPhrase { phrase }
}

/// The "mnemonic validity check" behind the import form.
pub fn is_valid_mnemonic(text: &str) -> bool {
    RecoveryPhrase::parse(text).is_ok()
}

/// BIP-39 seed (PBKDF2-HMAC-SHA512, empty passphrase) as `0x` hex.
pub fn mnemonic_to_seed(phrase: &RecoveryPhrase) -> SeedHex {
    // `phrase` only exists if it already parsed once.
    let mnemonic = match Mnemonic::parse_in_normalized(Language::English, phrase.as_str()) {
        Ok(m) => m,
        Err(e) => unreachable!("validated phrase failed to re-parse: {e}"),
    };
    let mut seed = mnemonic.to_seed_normalized("");
    let out = SeedHex(format!("0x{}", hex::encode(seed)));
    seed.zeroize();
    out
}
