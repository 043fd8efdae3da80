//! Payment webhook signature verification.
//!
//! The provider signs a webhook by concatenating the string form of every
//! field except `signature`, ordered by key, appending the shared secret, and
//! taking the lowercase hex SHA-256 digest of the result.

use secrecy::{ExposeSecret, SecretString};
use serde_json::{Number, Value};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;

use super::webhook_errors::WebhookError;
use super::webhook_payload::{PaymentWebhook, WebhookPayload};

/// Verifier for payment webhook signatures.
pub struct PaymentWebhookVerifier {
    /// Secret shared with the payment provider.
    secret: SecretString,
}

impl PaymentWebhookVerifier {
    /// Creates a new verifier with the given shared secret.
    pub fn new(secret: SecretString) -> Self {
        Self { secret }
    }

    /// Checks the payload's signature.
    ///
    /// Returns `Ok(false)` on a digest mismatch. The payload is only borrowed;
    /// the caller's data is never altered.
    ///
    /// # Errors
    ///
    /// - `MissingField` - No `signature` field
    /// - `MalformedPayload` - Signature is not a string, or a signed field
    ///   is a nested object or array
    pub fn verify(&self, payload: &WebhookPayload) -> Result<bool, WebhookError> {
        let provided = payload.signature()?;
        let expected = self.sign(payload)?;
        Ok(constant_time_compare(expected.as_bytes(), provided.as_bytes()))
    }

    /// Verifies the signature and parses the typed webhook.
    ///
    /// # Verification Steps
    ///
    /// 1. Build the canonical string from the signed fields
    /// 2. Compute the expected SHA-256 digest
    /// 3. Compare digests using constant-time comparison
    /// 4. Parse the typed payment fields
    ///
    /// # Errors
    ///
    /// - `InvalidSignature` - Signature verification failed
    /// - `MissingField` / `MalformedPayload` - Unsigned or unparseable payload
    pub fn verify_and_parse(&self, payload: &WebhookPayload) -> Result<PaymentWebhook, WebhookError> {
        if !self.verify(payload)? {
            return Err(WebhookError::InvalidSignature);
        }
        PaymentWebhook::try_from(payload)
    }

    /// Computes the lowercase hex signature the provider would attach.
    pub fn sign(&self, payload: &WebhookPayload) -> Result<String, WebhookError> {
        let mut message = canonical_string(payload)?;
        message.push_str(self.secret.expose_secret());

        Ok(hex::encode(Sha256::digest(message.as_bytes())))
    }
}

/// Concatenates signed field values in ascending key order, without separators.
pub fn canonical_string(payload: &WebhookPayload) -> Result<String, WebhookError> {
    let mut fields: Vec<(&String, &Value)> = payload.signed_fields().collect();
    fields.sort_by(|(a, _), (b, _)| a.cmp(b));

    let mut canonical = String::new();
    for (key, value) in fields {
        canonical.push_str(&scalar_text(key, value)?);
    }
    Ok(canonical)
}

/// String form of a scalar, matching the provider's rendering.
fn scalar_text(key: &str, value: &Value) -> Result<String, WebhookError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(number_text(n)),
        Value::Bool(true) => Ok("True".to_string()),
        Value::Bool(false) => Ok("False".to_string()),
        Value::Null => Ok("None".to_string()),
        Value::Array(_) | Value::Object(_) => Err(WebhookError::malformed(format!(
            "field '{}' must be a scalar",
            key
        ))),
    }
}

/// Integers print as-is. Floats print the way the provider's runtime prints
/// them: shortest round-trip digits, positional for decimal exponents in
/// `-4..16` (`10.1`, `25.0`), otherwise `1e-05` / `1e+16` style.
///
/// Integer literals outside the `i64`/`u64` range arrive here as floats and
/// are printed as floats, so a provider that signs such a value as an exact
/// integer will not verify.
fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() => float_text(f),
        _ => n.to_string(),
    }
}

fn float_text(f: f64) -> String {
    // `{:e}` gives the shortest round-trip digits, e.g. "-1.01e1"
    let sci = format!("{:e}", f.abs());
    let (mantissa, exp) = sci.split_once('e').unwrap_or((sci.as_str(), "0"));
    let exp: i32 = exp.parse().unwrap_or(0);
    let digits: String = mantissa.chars().filter(|c| *c != '.').collect();
    let sign = if f.is_sign_negative() { "-" } else { "" };

    if (-4..16).contains(&exp) {
        let point = exp + 1;
        let body = if point <= 0 {
            format!("0.{}{}", "0".repeat(point.unsigned_abs() as usize), digits)
        } else {
            let point = point as usize;
            if digits.len() > point {
                format!("{}.{}", &digits[..point], &digits[point..])
            } else {
                format!("{}{}.0", digits, "0".repeat(point - digits.len()))
            }
        };
        format!("{}{}", sign, body)
    } else {
        let (lead, rest) = digits.split_at(1);
        let fraction = if rest.is_empty() {
            String::new()
        } else {
            format!(".{}", rest)
        };
        let exp_sign = if exp < 0 { '-' } else { '+' };
        format!("{}{}{}e{}{:02}", sign, lead, fraction, exp_sign, exp.unsigned_abs())
    }
}

/// Performs constant-time comparison of two byte slices.
///
/// This prevents timing attacks that could leak information about the expected signature.
fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}
