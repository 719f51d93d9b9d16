//! Domain module
//!
//! Core wallet types and business rules.

pub mod amount;
pub mod context;
pub mod error;
pub mod events;
pub mod wallet;

pub use amount::{Amount, AmountError, Balance};
pub use context::OperationContext;
pub use error::DomainError;
pub use events::{MutationKind, NotificationEvent};
pub use wallet::Wallet;
