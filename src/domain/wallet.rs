//! Wallet Aggregate
//!
//! A wallet is the per-user set of asset balances. All balance changes go
//! through `credit` and `debit`, which keep the non-negativity invariant in
//! one place and describe the change as a `NotificationEvent`.

use std::collections::BTreeMap;

use chrono::Utc;

use super::{Amount, Balance, DomainError, MutationKind, NotificationEvent};

/// Wallet Aggregate
///
/// Balances are keyed by asset symbol, so a wallet can never hold two
/// entries for the same asset.
#[derive(Debug, Clone, PartialEq)]
pub struct Wallet {
    user_id: String,
    balances: BTreeMap<String, Balance>,
    /// Persisted revision, 0 until first saved. Managed by the store.
    version: i64,
}

impl Wallet {
    /// Create an empty, not yet persisted wallet
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            balances: BTreeMap::new(),
            version: 0,
        }
    }

    /// Rebuild a wallet from stored state
    pub fn from_parts(user_id: String, balances: BTreeMap<String, Balance>, version: i64) -> Self {
        Self {
            user_id,
            balances,
            version,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    /// Called by stores after a successful save
    pub fn set_version(&mut self, version: i64) {
        self.version = version;
    }

    /// Balances ordered by asset symbol
    pub fn balances(&self) -> &BTreeMap<String, Balance> {
        &self.balances
    }

    /// Balance held for `asset`, if the wallet has ever been credited with it
    pub fn balance(&self, asset: &str) -> Option<Balance> {
        self.balances.get(asset).copied()
    }

    /// Add `amount` of `asset`, inserting the entry if it does not exist yet.
    /// A credit of a validated amount always applies.
    pub fn credit(&mut self, asset: &str, amount: &Amount) -> NotificationEvent {
        let updated = self.balance(asset).unwrap_or_default().credit(amount);
        self.balances.insert(asset.to_string(), updated);

        self.event(MutationKind::Credit, asset, amount, updated)
    }

    /// Remove `amount` of `asset`.
    ///
    /// Fails without touching the wallet when the asset is missing or the
    /// held balance is smaller than `amount`. An entry debited down to zero
    /// is kept.
    pub fn debit(&mut self, asset: &str, amount: &Amount) -> Result<NotificationEvent, DomainError> {
        let current = match self.balances.get(asset) {
            Some(balance) if balance.is_sufficient_for(amount) => *balance,
            Some(balance) => {
                return Err(DomainError::insufficient_funds(asset, amount.value(), balance.value()))
            }
            None => {
                return Err(DomainError::insufficient_funds(
                    asset,
                    amount.value(),
                    Balance::zero().value(),
                ))
            }
        };

        let updated = current
            .debit(amount)
            .map_err(|_| DomainError::insufficient_funds(asset, amount.value(), current.value()))?;

        self.balances.insert(asset.to_string(), updated);

        Ok(self.event(MutationKind::Debit, asset, amount, updated))
    }

    fn event(&self, kind: MutationKind, asset: &str, amount: &Amount, balance: Balance) -> NotificationEvent {
        NotificationEvent {
            kind,
            user_id: self.user_id.clone(),
            asset: asset.to_string(),
            amount: *amount,
            balance,
            occurred_at: Utc::now(),
        }
    }
}
