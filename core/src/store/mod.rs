//! # State Store
//!
//! The single source of truth the front-end reads from. [`WalletStore`]
//! owns the in-memory [`WalletState`], sequences calls into storage and
//! the cluster, and broadcasts a [`WalletEvent`] for every change.
//!
//! ```text
//! state.rs         WalletState snapshot
//! events.rs        WalletEvent
//! wallet_store.rs  WalletStore actions
//! ```

pub mod events;
pub mod state;
pub mod wallet_store;

pub use events::WalletEvent;
pub use state::WalletState;
pub use wallet_store::WalletStore;
