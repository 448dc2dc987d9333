use serde::Deserialize;
use serde_json::Value;

use super::{Cents, TransactionIntent, TransactionKind};

pub const DESCRIPTION_MIN_CHARS: usize = 1;
pub const DESCRIPTION_MAX_CHARS: usize = 10;

/// Raw transaction payload as submitted by a client.
///
/// Fields are kept as untyped JSON so that every shape problem surfaces as a
/// specific [`ValidationError`] instead of a generic deserialization failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionRequest {
    #[serde(rename = "valor", default)]
    pub amount: Value,
    #[serde(rename = "tipo", default)]
    pub kind: Value,
    #[serde(rename = "descricao", default)]
    pub description: Value,
}

impl TransactionRequest {
    pub fn new(amount: Cents, kind: &str, description: &str) -> Self {
        Self {
            amount: Value::from(amount),
            kind: Value::from(kind),
            description: Value::from(description),
        }
    }

    /// Parse a JSON request body.
    pub fn from_json(body: &[u8]) -> Result<Self, ValidationError> {
        serde_json::from_slice(body).map_err(|e| ValidationError::MalformedPayload(e.to_string()))
    }

    /// Check the request's shape and normalize it into an intent.
    pub fn validate(&self) -> Result<TransactionIntent, ValidationError> {
        let amount = validate_amount(&self.amount)?;
        let kind = validate_kind(&self.kind)?;
        let description = validate_description(&self.description)?;

        Ok(TransactionIntent {
            amount,
            kind,
            description,
        })
    }
}

fn validate_amount(value: &Value) -> Result<Cents, ValidationError> {
    // as_i64 is None for floats, including 1.0
    match value.as_i64() {
        Some(amount) if amount > 0 => Ok(amount),
        _ => Err(ValidationError::InvalidAmount(value.to_string())),
    }
}

fn validate_kind(value: &Value) -> Result<TransactionKind, ValidationError> {
    value
        .as_str()
        .and_then(TransactionKind::from_code)
        .ok_or_else(|| ValidationError::InvalidKind(value.to_string()))
}

fn validate_description(value: &Value) -> Result<String, ValidationError> {
    let Some(description) = value.as_str() else {
        return Err(ValidationError::InvalidDescription { chars: None });
    };

    let chars = description.chars().count();
    if !(DESCRIPTION_MIN_CHARS..=DESCRIPTION_MAX_CHARS).contains(&chars) {
        return Err(ValidationError::InvalidDescription { chars: Some(chars) });
    }

    Ok(description.to_string())
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// The body is not a JSON object of the expected shape.
    MalformedPayload(String),
    /// Amount is missing, fractional, non-numeric or not positive.
    InvalidAmount(String),
    /// Kind is anything other than "c" or "d".
    InvalidKind(String),
    /// Description is missing, not a string, or outside 1..=10 code points.
    InvalidDescription { chars: Option<usize> },
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::MalformedPayload(reason) => {
                write!(f, "malformed transaction payload: {}", reason)
            }
            ValidationError::InvalidAmount(raw) => {
                write!(f, "amount must be a positive integer, got {}", raw)
            }
            ValidationError::InvalidKind(raw) => {
                write!(f, "type must be \"c\" or \"d\", got {}", raw)
            }
            ValidationError::InvalidDescription { chars: Some(n) } => write!(
                f,
                "description must have {}-{} characters, got {}",
                DESCRIPTION_MIN_CHARS, DESCRIPTION_MAX_CHARS, n
            ),
            ValidationError::InvalidDescription { chars: None } => {
                write!(f, "description is missing or not a string")
            }
        }
    }
}

impl std::error::Error for ValidationError {}
