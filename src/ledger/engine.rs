//! Ledger Operation Engine
//!
//! Applies credits and debits to wallets. Every operation runs
//! load-mutate-save under the wallet's lock, so two requests for the same
//! user never interleave inside this process. A version conflict from the
//! store means another process saved in between; the whole operation is
//! then re-run against fresh state.

use std::sync::Arc;
use std::time::Duration;

use crate::domain::{MutationKind, NotificationEvent, Wallet};
use crate::error::{AppError, AppResult};
use crate::notify::NotificationDispatcher;
use crate::store::WalletStore;
use crate::validation::MutationRequest;

use super::WalletLocks;

/// Attempts per operation when the store reports a concurrent modification
const MAX_ATTEMPTS: u32 = 3;

pub struct LedgerEngine {
    store: Arc<dyn WalletStore>,
    locks: WalletLocks,
    notifier: NotificationDispatcher,
}

impl LedgerEngine {
    pub fn new(store: Arc<dyn WalletStore>, notifier: NotificationDispatcher) -> Self {
        Self {
            store,
            locks: WalletLocks::new(),
            notifier,
        }
    }

    /// Current wallet for `user_id`, created and saved empty on first access.
    pub async fn get_wallet(&self, user_id: &str) -> AppResult<Wallet> {
        let _guard = self.locks.acquire(user_id).await;

        let mut wallet = self.load(user_id).await?;
        if wallet.version() == 0 {
            match self.store.upsert(&mut wallet).await {
                Ok(()) => tracing::info!(user_id = %user_id, "Wallet created"),
                // Created by another process since our load
                Err(e) if e.is_concurrency_conflict() => return self.load(user_id).await,
                Err(e) => return Err(e.into()),
            }
        }

        Ok(wallet)
    }

    /// Add `req.amount` of `req.asset` to the wallet.
    pub async fn credit(&self, req: &MutationRequest) -> AppResult<Wallet> {
        self.apply(req, MutationKind::Credit).await
    }

    /// Remove `req.amount` of `req.asset` from the wallet, failing with
    /// `INSUFFICIENT_FUNDS` if the wallet does not hold that much.
    pub async fn debit(&self, req: &MutationRequest) -> AppResult<Wallet> {
        self.apply(req, MutationKind::Debit).await
    }

    async fn apply(&self, req: &MutationRequest, kind: MutationKind) -> AppResult<Wallet> {
        let _guard = self.locks.acquire(&req.user_id).await;

        let mut attempt = 0;
        loop {
            attempt += 1;
            match self.try_apply(req, kind).await {
                Ok((wallet, event)) => {
                    tracing::info!(
                        user_id = %req.user_id,
                        kind = kind.as_str(),
                        asset = %req.asset,
                        amount = %req.amount,
                        balance = %event.balance,
                        version = wallet.version(),
                        "Wallet mutation applied"
                    );
                    self.notifier.dispatch(event);
                    return Ok(wallet);
                }
                Err(AppError::Store(e)) if e.is_concurrency_conflict() && attempt < MAX_ATTEMPTS => {
                    tracing::warn!(
                        "Concurrent wallet modification, retrying (attempt {}/{}): {}",
                        attempt,
                        MAX_ATTEMPTS,
                        e
                    );
                    tokio::time::sleep(Duration::from_millis(50 * attempt as u64)).await;
                }
                Err(e) => {
                    if let AppError::Domain(ref reason) = e {
                        tracing::info!(
                            user_id = %req.user_id,
                            kind = kind.as_str(),
                            asset = %req.asset,
                            amount = %req.amount,
                            "Wallet mutation rejected: {}",
                            reason
                        );
                    }
                    return Err(e);
                }
            }
        }
    }

    /// One load-mutate-save pass.
    async fn try_apply(
        &self,
        req: &MutationRequest,
        kind: MutationKind,
    ) -> AppResult<(Wallet, NotificationEvent)> {
        let mut wallet = self.load(&req.user_id).await?;

        let outcome = match kind {
            MutationKind::Credit => Ok(wallet.credit(&req.asset, &req.amount)),
            MutationKind::Debit => wallet.debit(&req.asset, &req.amount),
        };

        let event = match outcome {
            Ok(event) => event,
            Err(rejected) => {
                // The wallet is untouched; a first access still creates it.
                if wallet.version() == 0 {
                    self.store.upsert(&mut wallet).await?;
                }
                return Err(rejected.into());
            }
        };

        self.store.upsert(&mut wallet).await?;

        Ok((wallet, event))
    }

    async fn load(&self, user_id: &str) -> AppResult<Wallet> {
        Ok(self
            .store
            .find(user_id)
            .await?
            .unwrap_or_else(|| Wallet::new(user_id)))
    }
}
