//! Store Errors

/// Errors that can occur in a wallet store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Optimistic concurrency conflict
    #[error("Concurrent modification of wallet {user_id}: expected version {expected}, found {actual}")]
    ConcurrentModification {
        user_id: String,
        expected: i64,
        actual: i64,
    },

    /// Database error (connection refused, pool timeout, query failure)
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored row violates a wallet invariant
    #[error("Corrupt wallet data for {user_id}: {reason}")]
    Corrupt { user_id: String, reason: String },
}

impl StoreError {
    /// Check if this error is a concurrency conflict
    pub fn is_concurrency_conflict(&self) -> bool {
        matches!(self, StoreError::ConcurrentModification { .. })
    }
}
