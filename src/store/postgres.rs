//! PostgreSQL wallet store.
//!
//! Schema (see `migrations/`):
//! - `wallets(user_id, version, created_at, updated_at)`
//! - `wallet_balances(user_id, asset, amount, updated_at)`, one row per asset

use std::collections::BTreeMap;

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, Transaction};

use crate::domain::{Balance, Wallet};

use super::{StoreError, WalletStore};

#[derive(Debug, Clone)]
pub struct PgWalletStore {
    pool: PgPool,
}

impl PgWalletStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Claim the next version for `wallet`, inserting the header row for new wallets.
    async fn bump_version(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        wallet: &Wallet,
    ) -> Result<i64, StoreError> {
        let expected = wallet.version();

        let rows_affected = if expected == 0 {
            sqlx::query(
                r#"
                INSERT INTO wallets (user_id, version)
                VALUES ($1, 1)
                ON CONFLICT (user_id) DO NOTHING
                "#,
            )
            .bind(wallet.user_id())
            .execute(&mut **tx)
            .await?
            .rows_affected()
        } else {
            sqlx::query(
                r#"
                UPDATE wallets
                SET version = version + 1, updated_at = NOW()
                WHERE user_id = $1 AND version = $2
                "#,
            )
            .bind(wallet.user_id())
            .bind(expected)
            .execute(&mut **tx)
            .await?
            .rows_affected()
        };

        if rows_affected == 0 {
            let actual: Option<i64> =
                sqlx::query_scalar("SELECT version FROM wallets WHERE user_id = $1")
                    .bind(wallet.user_id())
                    .fetch_optional(&mut **tx)
                    .await?;

            return Err(StoreError::ConcurrentModification {
                user_id: wallet.user_id().to_string(),
                expected,
                actual: actual.unwrap_or(0),
            });
        }

        Ok(expected + 1)
    }
}

#[async_trait]
impl WalletStore for PgWalletStore {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn find(&self, user_id: &str) -> Result<Option<Wallet>, StoreError> {
        let version: Option<i64> =
            sqlx::query_scalar("SELECT version FROM wallets WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        let Some(version) = version else {
            return Ok(None);
        };

        let rows: Vec<(String, Decimal)> = sqlx::query_as(
            r#"
            SELECT asset, amount
            FROM wallet_balances
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut balances = BTreeMap::new();
        for (asset, amount) in rows {
            let balance = Balance::new(amount).map_err(|e| StoreError::Corrupt {
                user_id: user_id.to_string(),
                reason: format!("{}: {}", asset, e),
            })?;
            balances.insert(asset, balance);
        }

        Ok(Some(Wallet::from_parts(user_id.to_string(), balances, version)))
    }

    async fn upsert(&self, wallet: &mut Wallet) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        let new_version = self.bump_version(&mut tx, wallet).await?;

        for (asset, balance) in wallet.balances() {
            sqlx::query(
                r#"
                INSERT INTO wallet_balances (user_id, asset, amount)
                VALUES ($1, $2, $3)
                ON CONFLICT (user_id, asset)
                DO UPDATE SET amount = EXCLUDED.amount, updated_at = NOW()
                "#,
            )
            .bind(wallet.user_id())
            .bind(asset)
            .bind(balance.value())
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        tracing::debug!(
            user_id = %wallet.user_id(),
            version = new_version,
            assets = wallet.balances().len(),
            "Wallet saved"
        );

        wallet.set_version(new_version);
        Ok(())
    }
}
