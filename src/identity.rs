use crate::error::AppError;
use crate::state::AppState;
use async_trait::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use axum::http::HeaderMap;
use serde::Serialize;
use std::sync::Arc;
use tracing::debug;

pub const USER_ID_HEADER: &str = "x-user-id";
pub const USER_EMAIL_HEADER: &str = "x-user-email";
pub const USER_STAFF_HEADER: &str = "x-user-staff";

/// The authenticated caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Principal {
    pub user_id: String,
    pub email: Option<String>,
    pub is_staff: bool,
}

/// Resolves the calling principal from an incoming request.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn resolve(&self, headers: &HeaderMap) -> Result<Principal, AppError>;
}

/// Trusts identity headers injected by the authenticating front proxy.
#[derive(Debug, Default, Clone)]
pub struct HeaderIdentity;

#[async_trait]
impl IdentityProvider for HeaderIdentity {
    async fn resolve(&self, headers: &HeaderMap) -> Result<Principal, AppError> {
        let user_id = header_value(headers, USER_ID_HEADER).ok_or(AppError::Unauthorized)?;
        let email = header_value(headers, USER_EMAIL_HEADER);
        let is_staff = header_value(headers, USER_STAFF_HEADER)
            .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
            .unwrap_or(false);

        Ok(Principal {
            user_id,
            email,
            is_staff,
        })
    }
}

fn header_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Principal {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let principal = state.identity.resolve(&parts.headers).await?;

        state
            .db
            .upsert_user(&principal.user_id, principal.email.as_deref(), principal.is_staff)
            .await?;

        debug!("Resolved principal {}", principal.user_id);
        Ok(principal)
    }
}

/// A principal holding staff privileges.
#[derive(Debug, Clone)]
pub struct Staff(pub Principal);

#[async_trait]
impl FromRequestParts<Arc<AppState>> for Staff {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &Arc<AppState>) -> Result<Self, Self::Rejection> {
        let principal = Principal::from_request_parts(parts, state).await?;
        if !principal.is_staff {
            return Err(AppError::Forbidden);
        }
        Ok(Staff(principal))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).expect("header"));
        }
        map
    }

    #[tokio::test]
    async fn test_resolves_all_headers() {
        let principal = HeaderIdentity
            .resolve(&headers(&[
                (USER_ID_HEADER, "u1"),
                (USER_EMAIL_HEADER, "jane@example.com"),
                (USER_STAFF_HEADER, "true"),
            ]))
            .await
            .expect("principal");

        assert_eq!(principal.user_id, "u1");
        assert_eq!(principal.email.as_deref(), Some("jane@example.com"));
        assert!(principal.is_staff);
    }

    #[tokio::test]
    async fn test_staff_defaults_to_false() {
        let principal = HeaderIdentity
            .resolve(&headers(&[(USER_ID_HEADER, "u1"), (USER_STAFF_HEADER, "no")]))
            .await
            .expect("principal");

        assert!(!principal.is_staff);
        assert_eq!(principal.email, None);
    }

    #[tokio::test]
    async fn test_staff_flag_variants() {
        for value in ["1", "TRUE", "yes"] {
            let principal = HeaderIdentity
                .resolve(&headers(&[(USER_ID_HEADER, "u1"), (USER_STAFF_HEADER, value)]))
                .await
                .expect("principal");
            assert!(principal.is_staff, "{} should mean staff", value);
        }
    }

    #[tokio::test]
    async fn test_missing_user_id_is_unauthorized() {
        let result = HeaderIdentity
            .resolve(&headers(&[(USER_EMAIL_HEADER, "jane@example.com")]))
            .await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_blank_user_id_is_unauthorized() {
        let result = HeaderIdentity.resolve(&headers(&[(USER_ID_HEADER, "   ")])).await;
        assert!(matches!(result, Err(AppError::Unauthorized)));
    }
}
