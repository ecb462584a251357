//! Identity extractor.
//!
//! Authentication happens upstream; by the time a request reaches the
//! storefront the authenticated user's ID is in the `x-user-id` header.

use axum::{extract::FromRequestParts, http::request::Parts};

use tee_studio_core::UserId;

use crate::error::{AppError, set_sentry_user};
use crate::models::CurrentUser;

/// The HTTP header carrying the authenticated user's ID.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Extractor that requires an authenticated user.
///
/// Rejects with 401 if the header is missing or not a positive integer.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireUser(user): RequireUser) -> impl IntoResponse {
///     format!("Hello, user {}!", user.id)
/// }
/// ```
pub struct RequireUser(pub CurrentUser);

impl<S> FromRequestParts<S> for RequireUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let raw = parts
            .headers
            .get(USER_ID_HEADER)
            .ok_or_else(|| AppError::Unauthorized("missing user identity".to_string()))?;

        let id = raw
            .to_str()
            .ok()
            .and_then(|s| s.parse::<UserId>().ok())
            .filter(|id| id.as_i32() > 0)
            .ok_or_else(|| AppError::Unauthorized("invalid user identity".to_string()))?;

        set_sentry_user(&id);
        tracing::Span::current().record("user_id", id.as_i32());

        Ok(Self(CurrentUser { id }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{Request, StatusCode};
    use axum::response::IntoResponse;

    use super::*;

    async fn extract(header: Option<&str>) -> Result<RequireUser, AppError> {
        let mut builder = Request::builder().uri("/api/v1/cart");
        if let Some(value) = header {
            builder = builder.header(USER_ID_HEADER, value);
        }
        let (mut parts, ()) = builder.body(()).unwrap().into_parts();
        RequireUser::from_request_parts(&mut parts, &()).await
    }

    #[tokio::test]
    async fn test_valid_header() {
        let RequireUser(user) = extract(Some(" 17 ")).await.unwrap();
        assert_eq!(user.id, UserId::new(17));
    }

    #[tokio::test]
    async fn test_missing_or_bad_header_is_unauthorized() {
        for header in [None, Some("abc"), Some("0"), Some("-3")] {
            let status = match extract(header).await {
                Ok(_) => StatusCode::OK,
                Err(err) => err.into_response().status(),
            };
            assert_eq!(status, StatusCode::UNAUTHORIZED, "header {header:?}");
        }
    }
}
