//! Validation Layer
//!
//! Turns an untyped JSON body into a `MutationRequest` before anything
//! reaches the ledger. Pure and deterministic: the same input always gets
//! the same verdict.

use serde_json::Value;

use crate::domain::{Amount, AmountError};

/// A validated credit/debit instruction
#[derive(Debug, Clone, PartialEq)]
pub struct MutationRequest {
    pub user_id: String,
    pub asset: String,
    pub amount: Amount,
}

impl MutationRequest {
    pub fn new(user_id: impl Into<String>, asset: impl Into<String>, amount: Amount) -> Self {
        Self {
            user_id: user_id.into(),
            asset: asset.into(),
            amount,
        }
    }
}

/// A rejected input, naming the field at fault
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    pub field: &'static str,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            field,
            reason: reason.into(),
        }
    }
}

/// Validate a `{userId, asset, amount}` body.
///
/// `amount` may be a JSON number or a string holding a plain decimal
/// literal (`"12.5"`). Separators and exponents are only tolerated in
/// JSON numbers, where the serializer may emit `1e-7`.
pub fn validate_mutation(input: &Value) -> Result<MutationRequest, ValidationError> {
    let body = input
        .as_object()
        .ok_or_else(|| ValidationError::new("body", "must be a JSON object"))?;

    let user_id = required_string(body.get("userId"), "userId")?;
    let asset = required_string(body.get("asset"), "asset")?;
    let amount = required_amount(body.get("amount"))?;

    Ok(MutationRequest {
        user_id,
        asset,
        amount,
    })
}

fn required_string(value: Option<&Value>, field: &'static str) -> Result<String, ValidationError> {
    match value {
        None | Some(Value::Null) => Err(ValidationError::new(field, "is required")),
        Some(Value::String(s)) if s.trim().is_empty() => {
            Err(ValidationError::new(field, "must not be empty"))
        }
        Some(Value::String(s)) => Ok(s.trim().to_string()),
        Some(_) => Err(ValidationError::new(field, "must be a string")),
    }
}

fn required_amount(value: Option<&Value>) -> Result<Amount, ValidationError> {
    let parsed = match value {
        None | Some(Value::Null) => return Err(ValidationError::new("amount", "is required")),
        Some(Value::Number(n)) => Amount::from_json_number(&n.to_string()),
        Some(Value::String(s)) => s.parse::<Amount>(),
        Some(_) => return Err(ValidationError::new("amount", "must be a number")),
    };

    parsed.map_err(|e| match e {
        AmountError::ParseError(_) => ValidationError::new("amount", "must be a number"),
        AmountError::NotPositive(_) | AmountError::Negative(_) => {
            ValidationError::new("amount", "must be greater than zero")
        }
        AmountError::TooManyDecimals(_) => {
            ValidationError::new("amount", "must have at most 8 decimal places")
        }
        AmountError::Overflow => ValidationError::new("amount", "exceeds maximum allowed value"),
    })
}
