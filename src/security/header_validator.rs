use crate::errors::ApiError;
use axum::http::HeaderMap;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::{debug, warn};

type HmacSha256 = Hmac<Sha256>;

/// Validates the `X-App-ID` / `X-API-Key` / `X-Request-Timestamp` /
/// `X-Request-Signature` header set carried by trusted internal callers.
#[derive(Debug, Clone)]
pub struct CustomHeaderValidator {
    pub expected_app_id: String,
    pub expected_api_key: String,
    pub signature_secret: Option<String>,
    pub timestamp_tolerance: i64,
}

impl CustomHeaderValidator {
    pub fn new(
        app_id: String,
        api_key: String,
        signature_secret: Option<String>,
        timestamp_tolerance: i64,
    ) -> Self {
        Self {
            expected_app_id: app_id,
            expected_api_key: api_key,
            signature_secret,
            timestamp_tolerance,
        }
    }

    pub fn validate(&self, headers: &HeaderMap) -> Result<ValidatedRequest, ApiError> {
        let app_id = headers
            .get("X-App-ID")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("missing X-App-ID header".to_string()))?;

        if app_id != self.expected_app_id {
            warn!("rejected request with unrecognized X-App-ID");
            return Err(ApiError::Unauthorized("invalid X-App-ID".to_string()));
        }

        let api_key = headers
            .get("X-API-Key")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthorized("missing X-API-Key header".to_string()))?;

        if api_key != self.expected_api_key {
            warn!("rejected request with invalid X-API-Key");
            return Err(ApiError::Unauthorized("invalid X-API-Key".to_string()));
        }

        let timestamp = headers
            .get("X-Request-Timestamp")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<i64>().ok())
            .ok_or_else(|| {
                ApiError::Unauthorized("missing or invalid X-Request-Timestamp header".to_string())
            })?;

        let now = Utc::now().timestamp();
        let diff = (now - timestamp).abs();
        if diff > self.timestamp_tolerance {
            warn!(diff_seconds = diff, "timestamp outside tolerance window");
            return Err(ApiError::Unauthorized(
                "request timestamp out of tolerance window".to_string(),
            ));
        }

        if let Some(secret) = &self.signature_secret {
            let signature = headers
                .get("X-Request-Signature")
                .and_then(|v| v.to_str().ok())
                .ok_or_else(|| {
                    ApiError::Unauthorized("missing X-Request-Signature header".to_string())
                })?;

            let message = format!("{app_id}{timestamp}");
            if !Self::verify_signature(secret, &message, signature)? {
                warn!("rejected request with invalid signature");
                return Err(ApiError::Unauthorized("invalid signature".to_string()));
            }
        }

        debug!(app_id, "headers validated");
        Ok(ValidatedRequest { app_id: app_id.to_string(), timestamp })
    }

    fn verify_signature(secret: &str, message: &str, signature: &str) -> Result<bool, ApiError> {
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| ApiError::InternalError(format!("hmac key error: {e}")))?;
        mac.update(message.as_bytes());
        let expected = hex::encode(mac.finalize().into_bytes());
        Ok(expected.eq_ignore_ascii_case(signature))
    }

    /// Produce the signature a caller would send, useful for client-side tooling.
    pub fn sign(&self, app_id: &str, timestamp: i64) -> Result<String, ApiError> {
        let secret = self
            .signature_secret
            .as_deref()
            .ok_or_else(|| ApiError::InternalError("signing is not configured".to_string()))?;
        let message = format!("{app_id}{timestamp}");
        let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
            .map_err(|e| ApiError::InternalError(format!("hmac key error: {e}")))?;
        mac.update(message.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }
}

#[derive(Debug, Clone)]
pub struct ValidatedRequest {
    pub app_id: String,
    pub timestamp: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn validator() -> CustomHeaderValidator {
        CustomHeaderValidator::new(
            "app-1".to_string(),
            "key-1".to_string(),
            Some("secret".to_string()),
            300,
        )
    }

    #[test]
    fn rejects_missing_app_id() {
        let v = validator();
        let headers = HeaderMap::new();
        assert!(matches!(v.validate(&headers), Err(ApiError::Unauthorized(_))));
    }

    #[test]
    fn accepts_valid_signed_request() {
        let v = validator();
        let now = Utc::now().timestamp();
        let signature = v.sign("app-1", now).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert("X-App-ID", HeaderValue::from_static("app-1"));
        headers.insert("X-API-Key", HeaderValue::from_static("key-1"));
        headers.insert(
            "X-Request-Timestamp",
            HeaderValue::from_str(&now.to_string()).unwrap(),
        );
        headers.insert("X-Request-Signature", HeaderValue::from_str(&signature).unwrap());

        assert!(v.validate(&headers).is_ok());
    }

    #[test]
    fn rejects_stale_timestamp() {
        let v = validator();
        let old = Utc::now().timestamp() - 10_000;
        let signature = v.sign("app-1", old).unwrap();

        let mut headers = HeaderMap::new();
        headers.insert("X-App-ID", HeaderValue::from_static("app-1"));
        headers.insert("X-API-Key", HeaderValue::from_static("key-1"));
        headers.insert(
            "X-Request-Timestamp",
            HeaderValue::from_str(&old.to_string()).unwrap(),
        );
        headers.insert("X-Request-Signature", HeaderValue::from_str(&signature).unwrap());

        assert!(v.validate(&headers).is_err());
    }
}
