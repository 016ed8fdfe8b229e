//! # Wallet Cryptography
//!
//! Everything the wallet needs to turn entropy into a usable account:
//!
//! - **mnemonic**: BIP-39 recovery phrases and seed derivation.
//! - **keys**: Ed25519 account keypairs and transaction signatures.
//! - **address**: base58 addresses, validation, display truncation.
//! - **pin**: PIN format rules and the salted hash we persist.
//!
//! Nothing here is home-grown cryptography. BIP-39 comes from `bip39`,
//! keys and signatures from the Solana SDK crates, hashing from `sha2`.
//! This module only wires them together and keeps secrets out of `Debug`
//! output.

pub mod address;
pub mod keys;
pub mod mnemonic;
pub mod pin;

pub use address::{format_address, is_valid_address, public_key_from_string, Address};
pub use keys::{TxSignature, WalletKeypair};
pub use mnemonic::{generate_mnemonic, is_valid_mnemonic, mnemonic_to_seed, RecoveryPhrase, SeedHex};
pub use pin::{validate_pin, PinHash};
