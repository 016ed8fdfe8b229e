//! # WalletDb: On-Device Storage
//!
//! Everything the wallet remembers between runs lives here, in an
//! embedded sled database under the data directory.
//!
//! ## Tree Layout
//!
//! | Tree           | Key                   | Value                        |
//! |----------------|-----------------------|------------------------------|
//! | `wallet`       | setting name (UTF-8)  | UTF-8 text                   |
//! | `transactions` | signature (64B)       | `bincode(TransactionRecord)` |
//!
//! Keys in `wallet`: `wallet_created`, `mnemonic`, `seed`, `public_key`,
//! `pin_code`, `biometric_enabled`, `first_launch`.
//!
//! ## Atomicity
//!
//! The wallet secrets are written in a single `Batch`: a crash mid-write
//! never leaves `wallet_created` set next to a missing seed. Clearing the
//! wallet removes its keys in one batch too.
//!
//! Nothing here is encrypted. The PIN is the only value stored in a
//! non-recoverable form.

use sled::{Batch, Db, Tree};
use std::path::Path;

use super::records::{TransactionRecord, TransferStatus, WalletData};
use crate::crypto::address::{public_key_from_string, Address};
use crate::crypto::keys::TxSignature;
use crate::crypto::mnemonic::{RecoveryPhrase, SeedHex};
use crate::crypto::pin::PinHash;

// ---------------------------------------------------------------------------
// Error Type
// ---------------------------------------------------------------------------

/// Errors that can occur during database operations.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    /// A stored value exists but cannot be interpreted. Never includes the value.
    #[error("corrupt value under key {key:?}")]
    Corrupt { key: &'static str },
}

pub type DbResult<T> = Result<T, DbError>;

// ---------------------------------------------------------------------------
// Keys
// ---------------------------------------------------------------------------

const KEY_WALLET_CREATED: &str = "wallet_created";
const KEY_MNEMONIC: &str = "mnemonic";
const KEY_SEED: &str = "seed";
const KEY_PUBLIC_KEY: &str = "public_key";
const KEY_PIN_CODE: &str = "pin_code";
const KEY_BIOMETRIC_ENABLED: &str = "biometric_enabled";
const KEY_FIRST_LAUNCH: &str = "first_launch";

/// Removed by [`WalletDb::clear_wallet_data`]. Device preferences
/// (biometrics, first launch) survive a wallet reset.
const WALLET_KEYS: [&str; 5] = [
    KEY_WALLET_CREATED,
    KEY_MNEMONIC,
    KEY_SEED,
    KEY_PUBLIC_KEY,
    KEY_PIN_CODE,
];

const TRUE: &[u8] = b"true";
const FALSE: &[u8] = b"false";

// ---------------------------------------------------------------------------
// WalletDb
// ---------------------------------------------------------------------------

/// Persistent store for wallet material, settings and local history.
///
/// Cheap to clone; sled handles are reference counted and safe to share
/// across threads.
#[derive(Debug, Clone)]
pub struct WalletDb {
    db: Db,
    /// Wallet secrets and settings, keyed by name.
    wallet: Tree,
    /// Sent transactions and airdrops, keyed by signature bytes.
    transactions: Tree,
}

impl WalletDb {
    /// Open or create a database at the given filesystem path.
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let db = sled::open(path)?;
        Self::from_db(db)
    }

    /// In-memory database, removed on drop. For tests.
    pub fn open_temporary() -> DbResult<Self> {
        let config = sled::Config::new().temporary(true);
        let db = config.open()?;
        Self::from_db(db)
    }

    fn from_db(db: Db) -> DbResult<Self> {
        let wallet = db.open_tree("wallet")?;
        let transactions = db.open_tree("transactions")?;
        Ok(Self {
            db,
            wallet,
            transactions,
        })
    }

    fn get_text(&self, key: &'static str) -> DbResult<Option<String>> {
        match self.wallet.get(key)? {
            Some(bytes) => String::from_utf8(bytes.to_vec())
                .map(Some)
                .map_err(|_| DbError::Corrupt { key }),
            None => Ok(None),
        }
    }

    fn get_flag(&self, key: &'static str) -> DbResult<bool> {
        Ok(self.wallet.get(key)?.is_some_and(|v| v.as_ref() == TRUE))
    }

    // -- Wallet material ----------------------------------------------------

    /// Persist the wallet secrets and mark the wallet as created, atomically.
    pub fn save_wallet_data(&self, data: &WalletData) -> DbResult<()> {
        let mut batch = Batch::default();
        batch.insert(KEY_WALLET_CREATED, TRUE);
        batch.insert(KEY_MNEMONIC, data.mnemonic.as_str());
        batch.insert(KEY_SEED, data.seed.as_str());
        batch.insert(KEY_PUBLIC_KEY, data.public_key.to_string().as_str());
        self.wallet.apply_batch(batch)?;
        self.db.flush()?;
        Ok(())
    }

    /// Load the wallet secrets. `None` unless every piece is present.
    pub fn get_wallet_data(&self) -> DbResult<Option<WalletData>> {
        let (Some(mnemonic), Some(seed), Some(public_key)) = (
            self.get_text(KEY_MNEMONIC)?,
            self.get_text(KEY_SEED)?,
            self.get_text(KEY_PUBLIC_KEY)?,
        ) else {
            return Ok(None);
        };

        let mnemonic =
            RecoveryPhrase::parse(&mnemonic).map_err(|_| DbError::Corrupt { key: KEY_MNEMONIC })?;
        let public_key = public_key_from_string(&public_key)
            .map_err(|_| DbError::Corrupt { key: KEY_PUBLIC_KEY })?;

        Ok(Some(WalletData {
            mnemonic,
            seed: SeedHex::from_stored(seed),
            public_key,
        }))
    }

    pub fn is_wallet_created(&self) -> DbResult<bool> {
        self.get_flag(KEY_WALLET_CREATED)
    }

    /// Remove the wallet, its PIN and its history. Settings are kept.
    pub fn clear_wallet_data(&self) -> DbResult<()> {
        let mut batch = Batch::default();
        for key in WALLET_KEYS {
            batch.remove(key);
        }
        self.wallet.apply_batch(batch)?;
        self.transactions.clear()?;
        self.db.flush()?;
        Ok(())
    }

    // -- PIN ----------------------------------------------------------------

    /// Store a salted hash of `pin`. Format checks are the caller's job.
    pub fn save_pin_code(&self, pin: &str) -> DbResult<()> {
        let hash = PinHash::new(pin);
        self.wallet.insert(KEY_PIN_CODE, hash.to_string().as_str())?;
        self.db.flush()?;
        Ok(())
    }

    /// `false` when no PIN is set.
    pub fn verify_pin_code(&self, pin: &str) -> DbResult<bool> {
        match self.get_text(KEY_PIN_CODE)? {
            Some(stored) => {
                let hash: PinHash = stored
                    .parse()
                    .map_err(|_| DbError::Corrupt { key: KEY_PIN_CODE })?;
                Ok(hash.verify(pin))
            }
            None => Ok(false),
        }
    }

    pub fn is_pin_set(&self) -> DbResult<bool> {
        Ok(self.wallet.contains_key(KEY_PIN_CODE)?)
    }

    // -- Settings -----------------------------------------------------------

    pub fn set_biometric_enabled(&self, enabled: bool) -> DbResult<()> {
        self.wallet
            .insert(KEY_BIOMETRIC_ENABLED, if enabled { TRUE } else { FALSE })?;
        Ok(())
    }

    pub fn is_biometric_enabled(&self) -> DbResult<bool> {
        self.get_flag(KEY_BIOMETRIC_ENABLED)
    }

    /// `true` the first time it is ever called on this database, `false`
    /// after that. Survives wallet resets.
    pub fn is_first_launch(&self) -> DbResult<bool> {
        let swapped = self
            .wallet
            .compare_and_swap(KEY_FIRST_LAUNCH, None as Option<&[u8]>, Some(FALSE))?;
        Ok(swapped.is_ok())
    }

    // -- History ------------------------------------------------------------

    pub fn put_transaction(&self, record: &TransactionRecord) -> DbResult<()> {
        let bytes =
            bincode::serialize(record).map_err(|e| DbError::Serialization(e.to_string()))?;
        self.transactions.insert(record.signature.as_ref(), bytes)?;
        Ok(())
    }

    pub fn get_transaction(&self, signature: &TxSignature) -> DbResult<Option<TransactionRecord>> {
        match self.transactions.get(signature.as_ref())? {
            Some(bytes) => {
                let record = bincode::deserialize(&bytes)
                    .map_err(|e| DbError::Serialization(e.to_string()))?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Set the status of a recorded transaction. Returns `false` if the
    /// signature is unknown.
    pub fn update_status(&self, signature: &TxSignature, status: TransferStatus) -> DbResult<bool> {
        match self.get_transaction(signature)? {
            Some(mut record) => {
                record.status = status;
                self.put_transaction(&record)?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// All recorded transactions, newest first.
    pub fn list_transactions(&self) -> DbResult<Vec<TransactionRecord>> {
        let mut records = Vec::with_capacity(self.transactions.len());
        for entry in self.transactions.iter() {
            let (_key, value) = entry?;
            let record: TransactionRecord = bincode::deserialize(&value)
                .map_err(|e| DbError::Serialization(e.to_string()))?;
            records.push(record);
        }
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(records)
    }

    /// Force a flush of all pending writes to disk.
    pub fn flush(&self) -> DbResult<()> {
        self.db.flush()?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
