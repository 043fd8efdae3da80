//! Payment webhook payloads.
//!
//! `WebhookPayload` is the raw flat JSON object exactly as delivered, which is
//! what the signature covers. `PaymentWebhook` is the typed view the processor
//! works with once the signature has been checked.

use serde_json::{Map, Value};

use super::webhook_errors::WebhookError;
use crate::domain::foundation::{AccountId, Money, TransactionId, UserId};

/// Name of the field carrying the provider's signature.
pub const SIGNATURE_FIELD: &str = "signature";

/// An immutable, flat key/value webhook body.
#[derive(Debug, Clone, PartialEq)]
pub struct WebhookPayload {
    fields: Map<String, Value>,
}

impl WebhookPayload {
    /// Parses a request body into a payload.
    ///
    /// # Errors
    ///
    /// Returns `MalformedPayload` if the body is blank, is not JSON, is not a
    /// JSON object, or is an empty object.
    pub fn from_slice(body: &[u8]) -> Result<Self, WebhookError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Err(WebhookError::malformed("Empty payload"));
        }

        let value: Value = serde_json::from_slice(body)
            .map_err(|e| WebhookError::malformed(format!("invalid JSON: {}", e)))?;

        match value {
            Value::Object(fields) if fields.is_empty() => {
                Err(WebhookError::malformed("Empty payload"))
            }
            Value::Object(fields) => Ok(Self { fields }),
            _ => Err(WebhookError::malformed("payload must be a JSON object")),
        }
    }

    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn as_map(&self) -> &Map<String, Value> {
        &self.fields
    }

    /// The provided signature.
    ///
    /// # Errors
    ///
    /// `MissingField` when absent, `MalformedPayload` when not a string.
    pub fn signature(&self) -> Result<&str, WebhookError> {
        match self.fields.get(SIGNATURE_FIELD) {
            None => Err(WebhookError::MissingField(SIGNATURE_FIELD)),
            Some(Value::String(signature)) => Ok(signature),
            Some(_) => Err(WebhookError::malformed("signature must be a string")),
        }
    }

    /// Every field covered by the signature, in map order.
    pub fn signed_fields(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields
            .iter()
            .filter(|(key, _)| key.as_str() != SIGNATURE_FIELD)
    }
}

/// The typed content of a verified payment webhook.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentWebhook {
    pub transaction_id: TransactionId,
    pub user_id: UserId,
    pub account_id: AccountId,
    pub amount: Money,
}

impl TryFrom<&WebhookPayload> for PaymentWebhook {
    type Error = WebhookError;

    fn try_from(payload: &WebhookPayload) -> Result<Self, Self::Error> {
        let transaction_id = match required(payload, "transaction_id")? {
            Value::String(s) => TransactionId::new(s.as_str())
                .map_err(|e| WebhookError::malformed(e.to_string()))?,
            _ => return Err(WebhookError::malformed("transaction_id must be a string")),
        };

        let user_id = UserId::new(integer_field(payload, "user_id")?);
        let account_id = AccountId::new(integer_field(payload, "account_id")?);

        let amount = match required(payload, "amount")? {
            Value::String(s) => Money::parse(s),
            Value::Number(n) => Money::parse(&n.to_string()),
            _ => return Err(WebhookError::malformed("amount must be a decimal")),
        }
        .map_err(|e| WebhookError::malformed(e.to_string()))?;

        if !amount.is_positive() {
            return Err(WebhookError::malformed(format!(
                "amount must be positive, got {}",
                amount
            )));
        }

        Ok(PaymentWebhook {
            transaction_id,
            user_id,
            account_id,
            amount,
        })
    }
}

fn required<'a>(payload: &'a WebhookPayload, field: &'static str) -> Result<&'a Value, WebhookError> {
    match payload.get(field) {
        None | Some(Value::Null) => Err(WebhookError::MissingField(field)),
        Some(value) => Ok(value),
    }
}

/// Accepts a JSON integer or a string holding one.
fn integer_field(payload: &WebhookPayload, field: &'static str) -> Result<i64, WebhookError> {
    let parsed = match required(payload, field)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    };
    parsed.ok_or_else(|| WebhookError::malformed(format!("{} must be an integer", field)))
}
