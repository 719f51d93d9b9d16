//! Balance Store
//!
//! Persistence seam for wallets. The ledger engine only needs to find a
//! wallet by user id and to save it back; every backend guards saves with
//! the wallet's version so a stale write is rejected instead of applied.

mod error;
mod memory;
mod postgres;

pub use error::StoreError;
pub use memory::InMemoryWalletStore;
pub use postgres::PgWalletStore;

use async_trait::async_trait;

use crate::domain::Wallet;

/// Wallet persistence
#[async_trait]
pub trait WalletStore: Send + Sync {
    /// Backend name for logging
    fn name(&self) -> &'static str;

    /// Load the wallet for `user_id`, or `None` if it was never saved.
    async fn find(&self, user_id: &str) -> Result<Option<Wallet>, StoreError>;

    /// Save `wallet` if the stored version still equals `wallet.version()`.
    ///
    /// A wallet at version 0 is inserted. On success the wallet's version is
    /// advanced to the stored one; on `ConcurrentModification` nothing is written.
    async fn upsert(&self, wallet: &mut Wallet) -> Result<(), StoreError>;
}
