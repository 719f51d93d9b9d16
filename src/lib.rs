//! Marketplace Wallet Library
//!
//! Re-exports modules for the server binary and integration tests.

pub mod api;
pub mod domain;
pub mod ledger;
pub mod notify;
pub mod store;
pub mod validation;

pub mod config;
pub mod db;
mod error;

pub use config::{Config, StoreBackend};
pub use domain::{Amount, AmountError, Balance, DomainError, NotificationEvent, Wallet};
pub use error::{AppError, AppResult, ErrorResponse};
pub use ledger::LedgerEngine;
pub use validation::{validate_mutation, MutationRequest, ValidationError};
