//! Domain Events
//!
//! Facts about completed wallet mutations. They are never persisted; the
//! only consumer is the notification dispatcher.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{Amount, Balance};

/// Direction of a wallet mutation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MutationKind {
    Credit,
    Debit,
}

impl MutationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MutationKind::Credit => "credit",
            MutationKind::Debit => "debit",
        }
    }
}

/// A completed credit or debit, as reported to the wallet owner
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationEvent {
    #[serde(rename = "type")]
    pub kind: MutationKind,
    pub user_id: String,
    pub asset: String,
    pub amount: Amount,
    /// Balance of `asset` after the mutation
    pub balance: Balance,
    pub occurred_at: DateTime<Utc>,
}

impl NotificationEvent {
    /// Human-readable summary sent over the messaging channel
    pub fn summary(&self) -> String {
        let verb = match self.kind {
            MutationKind::Credit => "Credited",
            MutationKind::Debit => "Debited",
        };
        format!(
            "{} {} {}. New balance: {} {}",
            verb, self.amount, self.asset, self.balance, self.asset
        )
    }
}
