//! PIN codes: format check and salted SHA-256 storage form.
//!
//! A 4-digit PIN has 10^4 possibilities, so the hash is not meant to
//! resist an attacker holding the database. It only keeps the PIN from
//! sitting next to the seed in cleartext.

use rand::{rngs::OsRng, RngCore};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::config::{PIN_LENGTH, PIN_SALT_LENGTH};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PinError {
    #[error("PIN must be exactly {PIN_LENGTH} digits")]
    InvalidFormat,

    #[error("PIN codes do not match")]
    Mismatch,

    #[error("stored PIN record is corrupt")]
    CorruptRecord,
}

/// Checks that `pin` is exactly [`PIN_LENGTH`] ASCII digits.
pub fn validate_pin(pin: &str) -> Result<(), PinError> {
    if pin.len() == PIN_LENGTH && pin.bytes().all(|b| b.is_ascii_digit()) {
        Ok(())
    } else {
        Err(PinError::InvalidFormat)
    }
}

/// Salted digest of a PIN, stored as `hex(salt):hex(sha256(salt || pin))`.
#[derive(Clone, PartialEq, Eq)]
pub struct PinHash {
    salt: [u8; PIN_SALT_LENGTH],
    digest: [u8; 32],
}

impl PinHash {
    /// Hashes a PIN under a fresh random salt. The PIN must already be
    /// valid; see [`validate_pin`].
    pub fn new(pin: &str) -> Self {
        let mut salt = [0u8; PIN_SALT_LENGTH];
        OsRng.fill_bytes(&mut salt);
        Self::with_salt(pin, salt)
    }

    fn with_salt(pin: &str, salt: [u8; PIN_SALT_LENGTH]) -> Self {
        Self {
            salt,
            digest: digest(&salt, pin),
        }
    }

    pub fn verify(&self, pin: &str) -> bool {
        digest(&self.salt, pin) == self.digest
    }
}

fn digest(salt: &[u8], pin: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(salt);
    hasher.update(pin.as_bytes());
    hasher.finalize().into()
}

impl fmt::Display for PinHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", hex::encode(self.salt), hex::encode(self.digest))
    }
}

impl fmt::Debug for PinHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PinHash(..)")
    }
}

impl FromStr for PinHash {
    type Err = PinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (salt_hex, digest_hex) = s.split_once(':').ok_or(PinError::CorruptRecord)?;
        let salt = hex::decode(salt_hex)
            .ok()
            .and_then(|b| <[u8; PIN_SALT_LENGTH]>::try_from(b.as_slice()).ok())
            .ok_or(PinError::CorruptRecord)?;
        let digest = hex::decode(digest_hex)
            .ok()
            .and_then(|b| <[u8; 32]>::try_from(b.as_slice()).ok())
            .ok_or(PinError::CorruptRecord)?;
        Ok(Self { salt, digest })
    }
}
