//! Per-wallet mutual exclusion.
//!
//! Each user id maps to its own async mutex, held across the whole
//! load-mutate-save of a ledger operation. Entries are pruned once nobody
//! holds or waits on them.

use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};

#[derive(Debug, Default)]
pub struct WalletLocks {
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl WalletLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `user_id`'s wallet.
    pub async fn acquire(&self, user_id: &str) -> WalletGuard {
        let mutex = self
            .locks
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let guard = mutex.lock_owned().await;

        WalletGuard {
            guard: Some(guard),
            user_id: user_id.to_string(),
            locks: Arc::clone(&self.locks),
        }
    }

    /// Number of wallets currently locked or waited on
    pub fn active(&self) -> usize {
        self.locks.len()
    }
}

/// Exclusive access to one wallet, released on drop
pub struct WalletGuard {
    guard: Option<OwnedMutexGuard<()>>,
    user_id: String,
    locks: Arc<DashMap<String, Arc<Mutex<()>>>>,
}

impl Drop for WalletGuard {
    fn drop(&mut self) {
        drop(self.guard.take());
        // Only the map's own reference left: no holder, no waiter.
        self.locks
            .remove_if(&self.user_id, |_, mutex| Arc::strong_count(mutex) == 1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_same_wallet_is_exclusive() {
        let locks = WalletLocks::new();
        let _held = locks.acquire("42").await;

        let waiting = tokio::time::timeout(Duration::from_millis(50), locks.acquire("42")).await;
        assert!(waiting.is_err());
    }

    #[tokio::test]
    async fn test_different_wallets_do_not_block() {
        let locks = WalletLocks::new();
        let _a = locks.acquire("a").await;

        let b = tokio::time::timeout(Duration::from_millis(50), locks.acquire("b")).await;
        assert!(b.is_ok());
    }

    #[tokio::test]
    async fn test_entries_pruned_after_release() {
        let locks = WalletLocks::new();
        {
            let _guard = locks.acquire("42").await;
            assert_eq!(locks.active(), 1);
        }
        assert_eq!(locks.active(), 0);
    }

    #[tokio::test]
    async fn test_waiter_gets_lock_after_release() {
        let locks = Arc::new(WalletLocks::new());
        let first = locks.acquire("42").await;

        let waiter = {
            let locks = Arc::clone(&locks);
            tokio::spawn(async move {
                let _guard = locks.acquire("42").await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        drop(first);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(locks.active(), 0);
    }
}
