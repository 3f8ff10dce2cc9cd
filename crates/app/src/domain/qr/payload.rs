//! Issuing and validating product QR payloads.
//!
//! A payload is a small JSON object printed into the product's QR image:
//!
//! ```json
//! { "productId": "PRD-1A2B3C4D", "type": "PRODUCT_QR", "timestamp": 1767225600000, "hash": "9f2c..." }
//! ```
//!
//! The hash is derived from the product code, the timestamp and a shared secret. It is
//! carried through validation untouched; nothing on the scanning side checks it.

use jiff::Timestamp;
use qrcode::{EcLevel, QrCode, render::svg};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::domain::qr::errors::QrPayloadError;

/// Discriminator every product payload carries.
pub const PRODUCT_QR_TAG: &str = "PRODUCT_QR";

const HASH_HEX_CHARS: usize = 16;

const QR_MIN_DIMENSION: u32 = 320;

/// Payload embedded in a product QR code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QrPayload {
    pub product_id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub timestamp: i64,
    pub hash: String,
}

impl QrPayload {
    /// Build the payload for a newly created product.
    #[must_use]
    pub fn issue(product_code: &str, issued_at: Timestamp, secret: &str) -> Self {
        let timestamp = issued_at.as_millisecond();

        Self {
            product_id: product_code.to_string(),
            kind: PRODUCT_QR_TAG.to_string(),
            timestamp,
            hash: payload_hash(product_code, timestamp, secret),
        }
    }

    /// Serialize to the text encoded into the QR image.
    ///
    /// # Errors
    ///
    /// Returns [`QrPayloadError::Encoding`] if serialization fails.
    pub fn to_text(&self) -> Result<String, QrPayloadError> {
        serde_json::to_string(self).map_err(|_source| QrPayloadError::Encoding)
    }

    /// Render the payload as an SVG QR image.
    ///
    /// # Errors
    ///
    /// Returns [`QrPayloadError::Encoding`] when the payload does not fit a QR code.
    pub fn render_svg(&self) -> Result<String, QrPayloadError> {
        let text = self.to_text()?;

        let code = QrCode::with_error_correction_level(text.as_bytes(), EcLevel::M)
            .map_err(|_source| QrPayloadError::Encoding)?;

        Ok(code
            .render::<svg::Color<'_>>()
            .min_dimensions(QR_MIN_DIMENSION, QR_MIN_DIMENSION)
            .build())
    }
}

/// Normalized result of validating a scanned payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedProduct {
    pub product_code: String,
}

/// Validate a scanned payload.
///
/// Accepts either a structured JSON object or a JSON string holding the serialized
/// object, as clients differ in whether they decode the QR text before sending it.
///
/// # Errors
///
/// * [`QrPayloadError::MalformedPayload`] when textual input is not valid JSON.
/// * [`QrPayloadError::InvalidPayloadType`] when the decoded value lacks a string
///   `productId` or its `type` is not [`PRODUCT_QR_TAG`].
pub fn validate_payload(raw: &Value) -> Result<ScannedProduct, QrPayloadError> {
    let decoded;

    let value = match raw {
        Value::String(text) => {
            decoded = serde_json::from_str::<Value>(text)
                .map_err(|_source| QrPayloadError::MalformedPayload)?;

            &decoded
        }
        other => other,
    };

    let Value::Object(fields) = value else {
        return Err(QrPayloadError::InvalidPayloadType);
    };

    if fields.get("type").and_then(Value::as_str) != Some(PRODUCT_QR_TAG) {
        return Err(QrPayloadError::InvalidPayloadType);
    }

    let product_code = fields
        .get("productId")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|code| !code.is_empty())
        .ok_or(QrPayloadError::InvalidPayloadType)?;

    Ok(ScannedProduct {
        product_code: product_code.to_string(),
    })
}

fn payload_hash(product_code: &str, timestamp: i64, secret: &str) -> String {
    let digest = Sha256::digest(format!("{product_code}{timestamp}{secret}").as_bytes());

    let mut hex = format!("{digest:x}");

    hex.truncate(HASH_HEX_CHARS);

    hex
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use testresult::TestResult;

    use super::*;

    #[test]
    fn issued_payload_validates_back_to_its_product_code() -> TestResult {
        let payload = QrPayload::issue("PRD-1A2B3C4D", Timestamp::UNIX_EPOCH, "secret");

        let text = payload.to_text()?;

        let scanned = validate_payload(&Value::String(text))?;

        assert_eq!(scanned.product_code, "PRD-1A2B3C4D");

        Ok(())
    }

    #[test]
    fn structured_payload_is_accepted() -> TestResult {
        let scanned = validate_payload(&json!({ "productId": "PRD-1", "type": "PRODUCT_QR" }))?;

        assert_eq!(scanned.product_code, "PRD-1");

        Ok(())
    }

    #[test]
    fn hash_is_not_checked() -> TestResult {
        let scanned = validate_payload(&json!({
            "productId": "PRD-1",
            "type": "PRODUCT_QR",
            "timestamp": 0,
            "hash": "definitely-wrong"
        }))?;

        assert_eq!(scanned.product_code, "PRD-1");

        Ok(())
    }

    #[test]
    fn undecodable_text_is_malformed() {
        let result = validate_payload(&json!("{not json"));

        assert_eq!(result, Err(QrPayloadError::MalformedPayload));
    }

    #[test]
    fn wrong_type_tag_is_rejected() {
        let result = validate_payload(&json!({ "productId": "PRD-1", "type": "COUPON" }));

        assert_eq!(result, Err(QrPayloadError::InvalidPayloadType));
    }

    #[test]
    fn missing_product_id_is_rejected() {
        let result = validate_payload(&json!({ "type": "PRODUCT_QR" }));

        assert_eq!(result, Err(QrPayloadError::InvalidPayloadType));
    }

    #[test]
    fn non_object_values_are_rejected() {
        assert_eq!(
            validate_payload(&json!(42)),
            Err(QrPayloadError::InvalidPayloadType)
        );
        assert_eq!(
            validate_payload(&json!("\"PRD-1\"")),
            Err(QrPayloadError::InvalidPayloadType)
        );
    }

    #[test]
    fn hash_depends_on_secret() {
        let a = QrPayload::issue("PRD-1", Timestamp::UNIX_EPOCH, "one");
        let b = QrPayload::issue("PRD-1", Timestamp::UNIX_EPOCH, "two");

        assert_eq!(a.hash.len(), HASH_HEX_CHARS);
        assert_ne!(a.hash, b.hash, "hash should change with the secret");
    }

    #[test]
    fn render_svg_produces_svg_document() -> TestResult {
        let svg = QrPayload::issue("PRD-1", Timestamp::UNIX_EPOCH, "secret").render_svg()?;

        assert!(svg.contains("<svg"), "expected an svg document");

        Ok(())
    }
}
