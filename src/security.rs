use crate::error::AppError;
use axum::http::HeaderMap;
use subtle::ConstantTimeEq;

/// Header carrying the shared secret on machine-to-machine calls.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Constant-time string comparison for secrets.
pub fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.as_bytes().ct_eq(b.as_bytes()).into()
}

/// Check the `x-api-key` header against the configured secret.
///
/// With no secret configured every caller passes.
pub fn require_api_key(headers: &HeaderMap, expected: Option<&str>) -> Result<(), AppError> {
    let Some(expected) = expected else {
        return Ok(());
    };

    let provided = headers
        .get(API_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if constant_time_compare(provided, expected) {
        Ok(())
    } else {
        Err(AppError::Unauthorized)
    }
}
