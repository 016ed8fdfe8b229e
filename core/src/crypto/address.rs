//! # Addresses
//!
//! A Solana address is an Ed25519 public key, shown to humans as base58.
//! Any 32 bytes form a syntactically valid address, on-curve or not
//! (program-derived addresses are deliberately off-curve), so validation
//! here is purely "does it decode to exactly 32 bytes".
//!
//! The type itself is the SDK's [`Pubkey`]; this module adds the parsing
//! errors the UI reports and display truncation.

use solana_pubkey::ParsePubkeyError;
use thiserror::Error;

use crate::config::DEFAULT_ADDRESS_CHARS;

pub use solana_pubkey::Pubkey as Address;

/// The system program owns every plain wallet account and executes
/// lamport transfers. Its address is all zeroes (`111...1` in base58).
pub const SYSTEM_PROGRAM_ID: Address = solana_system_interface::program::ID;

/// Errors from parsing an address string.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AddressError {
    #[error("address is empty")]
    Empty,

    #[error("address is not valid base58")]
    InvalidBase58,

    #[error("address does not decode to 32 bytes")]
    WrongLength,
}

impl From<ParsePubkeyError> for AddressError {
    fn from(err: ParsePubkeyError) -> Self {
        match err {
            ParsePubkeyError::WrongSize => AddressError::WrongLength,
            ParsePubkeyError::Invalid => AddressError::InvalidBase58,
        }
    }
}

/// Parses a base58 address string. Surrounding whitespace is ignored.
pub fn public_key_from_string(s: &str) -> Result<Address, AddressError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(AddressError::Empty);
    }
    Ok(s.parse::<Address>()?)
}

/// Returns `true` if `s` is a well-formed address.
pub fn is_valid_address(s: &str) -> bool {
    public_key_from_string(s).is_ok()
}

/// Shortens an address for display: `7xKX...9fQz`.
///
/// Empty input gives an empty string. Strings too short to lose anything
/// by truncation come back unchanged.
pub fn format_address(address: &str, chars: usize) -> String {
    if address.is_empty() {
        return String::new();
    }
    let count = address.chars().count();
    if count <= chars * 2 {
        return address.to_string();
    }
    let head: String = address.chars().take(chars).collect();
    let tail: String = address.chars().skip(count - chars).collect();
    format!("{head}...{tail}")
}

/// [`format_address`] with the default width.
pub fn short_address(address: &str) -> String {
    format_address(address, DEFAULT_ADDRESS_CHARS)
}
