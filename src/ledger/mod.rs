//! Ledger module
//!
//! The engine that applies wallet mutations and the per-wallet locks that
//! serialize them.

mod engine;
mod locks;

pub use engine::LedgerEngine;
pub use locks::{WalletGuard, WalletLocks};
