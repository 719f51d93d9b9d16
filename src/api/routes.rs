//! API Routes
//!
//! HTTP endpoint definitions.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;

use crate::domain::{Balance, Wallet};
use crate::error::{AppError, AppResult};
use crate::validation::validate_mutation;

use super::AppState;

/// Header carrying the caller's user id on reads
pub const USER_ID_HEADER: &str = "x-user-id";

// =========================================================================
// Request/Response types
// =========================================================================

#[derive(Debug, Serialize)]
pub struct BalanceEntry {
    pub asset: String,
    pub amount: Balance,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletResponse {
    pub user_id: String,
    pub balances: Vec<BalanceEntry>,
}

impl From<Wallet> for WalletResponse {
    fn from(wallet: Wallet) -> Self {
        let balances = wallet
            .balances()
            .iter()
            .map(|(asset, amount)| BalanceEntry {
                asset: asset.clone(),
                amount: *amount,
            })
            .collect();

        Self {
            user_id: wallet.user_id().to_string(),
            balances,
        }
    }
}

// =========================================================================
// API Router
// =========================================================================

/// Create the wallet router (mounted under the API base path)
pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/wallet", get(get_wallet))
        .route("/wallet/credit", post(credit))
        .route("/wallet/debit", post(debit))
}

// =========================================================================
// GET /wallet
// =========================================================================

/// Current wallet of the user named by the x-user-id header
async fn get_wallet(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> AppResult<Json<WalletResponse>> {
    let user_id = headers
        .get(USER_ID_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::MissingHeader(USER_ID_HEADER.to_string()))?;

    let wallet = state.engine.get_wallet(user_id).await?;

    Ok(Json(wallet.into()))
}

// =========================================================================
// POST /wallet/credit
// =========================================================================

async fn credit(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<WalletResponse>> {
    let Json(body) = body.map_err(|e| AppError::InvalidJson(e.body_text()))?;
    let request = validate_mutation(&body)?;

    let wallet = state.engine.credit(&request).await?;

    Ok(Json(wallet.into()))
}

// =========================================================================
// POST /wallet/debit
// =========================================================================

async fn debit(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> AppResult<Json<WalletResponse>> {
    let Json(body) = body.map_err(|e| AppError::InvalidJson(e.body_text()))?;
    let request = validate_mutation(&body)?;

    let wallet = state.engine.debit(&request).await?;

    Ok(Json(wallet.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Amount;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_empty_wallet_response() {
        let response = WalletResponse::from(Wallet::new("42"));
        assert_eq!(
            serde_json::to_value(response).unwrap(),
            json!({"userId": "42", "balances": []})
        );
    }

    #[test]
    fn test_wallet_response_shape() {
        let mut wallet = Wallet::new("42");
        wallet.credit("USDT", &Amount::new(dec!(10)).unwrap());
        wallet.credit("TON", &Amount::new(dec!(1.5)).unwrap());

        let json = serde_json::to_value(WalletResponse::from(wallet)).unwrap();
        assert_eq!(json["userId"], "42");
        assert_eq!(json["balances"][0]["asset"], "TON");
        assert_eq!(json["balances"][0]["amount"].as_f64(), Some(1.5));
        assert_eq!(json["balances"][1]["asset"], "USDT");
        assert_eq!(json["balances"][1]["amount"].as_f64(), Some(10.0));
    }
}
