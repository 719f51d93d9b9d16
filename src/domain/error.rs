//! Domain Error Types
//!
//! Pure domain errors that don't depend on infrastructure.

use rust_decimal::Decimal;
use thiserror::Error;

/// Business rule violations raised by the wallet aggregate.
///
/// These are independent of the web/infrastructure layer and are always
/// the caller's fault; none of them is worth retrying.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DomainError {
    /// Debit larger than the held balance, or of an asset never credited
    #[error("Insufficient funds for {asset}: required {required}, available {available}")]
    InsufficientFunds {
        asset: String,
        required: Decimal,
        available: Decimal,
    },
}

impl DomainError {
    /// Create an insufficient funds error
    pub fn insufficient_funds(asset: impl Into<String>, required: Decimal, available: Decimal) -> Self {
        Self::InsufficientFunds {
            asset: asset.into(),
            required,
            available,
        }
    }

    /// Stable machine-readable code for API responses
    pub fn code(&self) -> &'static str {
        match self {
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
        }
    }
}
