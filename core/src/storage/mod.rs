//! # Storage Module
//!
//! Persistence for the wallet: secrets, PIN, device settings and local
//! transaction history, all in one sled database.
//!
//! ```text
//! records.rs  WalletData, TransactionRecord, TransferStatus
//! db.rs       WalletDb over sled trees
//! ```
//!
//! Settings are stored as plain UTF-8 text so the layout stays readable
//! with any sled inspector; history records are bincode.

pub mod db;
pub mod records;

pub use db::{DbError, DbResult, WalletDb};
pub use records::{TransactionRecord, TransferKind, TransferStatus, WalletData};
