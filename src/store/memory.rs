//! In-memory wallet store, for development and tests.

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;

use crate::domain::Wallet;

use super::{StoreError, WalletStore};

#[derive(Debug, Default)]
pub struct InMemoryWalletStore {
    wallets: DashMap<String, Wallet>,
}

impl InMemoryWalletStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted wallets
    pub fn len(&self) -> usize {
        self.wallets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.wallets.is_empty()
    }
}

#[async_trait]
impl WalletStore for InMemoryWalletStore {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn find(&self, user_id: &str) -> Result<Option<Wallet>, StoreError> {
        Ok(self.wallets.get(user_id).map(|w| w.value().clone()))
    }

    async fn upsert(&self, wallet: &mut Wallet) -> Result<(), StoreError> {
        match self.wallets.entry(wallet.user_id().to_string()) {
            Entry::Occupied(mut entry) => {
                let stored = entry.get().version();
                if stored != wallet.version() {
                    return Err(StoreError::ConcurrentModification {
                        user_id: wallet.user_id().to_string(),
                        expected: wallet.version(),
                        actual: stored,
                    });
                }
                wallet.set_version(stored + 1);
                entry.insert(wallet.clone());
            }
            Entry::Vacant(entry) => {
                if wallet.version() != 0 {
                    return Err(StoreError::ConcurrentModification {
                        user_id: wallet.user_id().to_string(),
                        expected: wallet.version(),
                        actual: 0,
                    });
                }
                wallet.set_version(1);
                entry.insert(wallet.clone());
            }
        }

        Ok(())
    }
}
