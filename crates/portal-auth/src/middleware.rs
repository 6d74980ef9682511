//! Authentication middleware for Axum

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header::AUTHORIZATION, request::Parts},
    middleware::Next,
    response::Response,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::AuthError;
use crate::jwt::{Claims, JwtManager};

/// Authenticated user information
///
/// Inserted into the request by [`auth_middleware`]; handlers take it as an
/// extractor argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: i64,
    pub email: String,
}

impl TryFrom<&Claims> for AuthUser {
    type Error = AuthError;

    fn try_from(claims: &Claims) -> Result<Self, Self::Error> {
        let id = claims.sub.parse().map_err(|_| AuthError::InvalidToken)?;
        Ok(Self {
            id,
            email: claims.email.clone(),
        })
    }
}

impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AuthError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Only present when the route sits behind auth_middleware
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AuthError::MissingAuthHeader)
    }
}

/// Extract bearer token from authorization header
fn extract_bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers
        .get(AUTHORIZATION)
        .ok_or(AuthError::MissingAuthHeader)?
        .to_str()
        .map_err(|_| AuthError::InvalidAuthHeader)?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or(AuthError::InvalidAuthHeader)?
        .trim();

    if token.is_empty() {
        return Err(AuthError::InvalidAuthHeader);
    }
    Ok(token)
}

/// Authentication middleware
///
/// Rejects the request with 401 unless it carries a valid, unexpired bearer
/// token. On success the resolved [`AuthUser`] is added to the request
/// extensions before the inner handler runs.
pub async fn auth_middleware(
    State(jwt_manager): State<Arc<JwtManager>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let user = extract_bearer_token(request.headers())
        .and_then(|token| jwt_manager.validate_token(token))
        .and_then(|claims| AuthUser::try_from(&claims))
        .inspect_err(|e| {
            warn!("Rejected request to {}: {}", request.uri().path(), e);
            metrics::counter!("portal_auth_rejections_total").increment(1);
        })?;

    debug!("Authenticated user: {} ({})", user.id, user.email);

    request.extensions_mut().insert(user);

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        Router,
        body::{Body, to_bytes},
        http::{Request as HttpRequest, StatusCode},
        middleware::from_fn_with_state,
        routing::get,
    };
    use chrono::{Duration, Utc};
    use std::sync::atomic::{AtomicBool, Ordering};
    use tower::ServiceExt;

    async fn whoami(user: AuthUser) -> String {
        user.id.to_string()
    }

    fn app(jwt: Arc<JwtManager>) -> Router {
        Router::new()
            .route("/me", get(whoami))
            .route_layer(from_fn_with_state(jwt, auth_middleware))
    }

    /// Router whose handler ignores identity and only records that it ran
    fn tracking_app(jwt: Arc<JwtManager>, reached: Arc<AtomicBool>) -> Router {
        Router::new()
            .route(
                "/me",
                get(move || {
                    let reached = reached.clone();
                    async move {
                        reached.store(true, Ordering::SeqCst);
                        "ran"
                    }
                }),
            )
            .route_layer(from_fn_with_state(jwt, auth_middleware))
    }

    fn request(auth: Option<&str>) -> HttpRequest<Body> {
        let mut builder = HttpRequest::builder().uri("/me");
        if let Some(value) = auth {
            builder = builder.header(AUTHORIZATION, value);
        }
        builder.body(Body::empty()).unwrap()
    }

    fn manager() -> Arc<JwtManager> {
        Arc::new(JwtManager::new("middleware-test-secret", 24).unwrap())
    }

    #[tokio::test]
    async fn test_valid_token_reaches_handler_with_identity() {
        let jwt = manager();
        let token = jwt.generate_token(42, "a@b.com").unwrap();

        let response = app(jwt)
            .oneshot(request(Some(&format!("Bearer {}", token))))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert_eq!(&body[..], b"42");
    }

    #[tokio::test]
    async fn test_missing_or_malformed_header_rejected() {
        let jwt = manager();
        let token = jwt.generate_token(42, "a@b.com").unwrap();

        let cases = [
            None,
            Some("".to_string()),
            Some("Bearer".to_string()),
            Some("Bearer ".to_string()),
            Some(format!("Basic {}", token)),
            Some(format!("bearer{}", token)),
            Some(token.clone()),
        ];

        for case in cases {
            let response = app(jwt.clone())
                .oneshot(request(case.as_deref()))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "case: {:?}", case);
        }
    }

    #[tokio::test]
    async fn test_rejected_requests_never_reach_handler() {
        let jwt = manager();
        let token = jwt.generate_token(42, "a@b.com").unwrap();
        let expired = jwt
            .generate_token_at(42, "a@b.com", Utc::now() - Duration::hours(25))
            .unwrap();

        let cases = [
            None,
            Some("Bearer ".to_string()),
            Some(format!("Basic {}", token)),
            Some(token.clone()),
            Some("Bearer not.a.jwt".to_string()),
            Some(format!("Bearer {}", expired)),
        ];

        for case in cases {
            let reached = Arc::new(AtomicBool::new(false));
            let response = tracking_app(jwt.clone(), reached.clone())
                .oneshot(request(case.as_deref()))
                .await
                .unwrap();
            assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "case: {:?}", case);
            assert!(!reached.load(Ordering::SeqCst), "handler ran for case: {:?}", case);
        }

        let reached = Arc::new(AtomicBool::new(false));
        let response = tracking_app(jwt, reached.clone())
            .oneshot(request(Some(&format!("Bearer {}", token))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(reached.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_expired_token_rejected() {
        let jwt = manager();
        let token = jwt
            .generate_token_at(42, "a@b.com", Utc::now() - Duration::hours(25))
            .unwrap();

        let response = app(jwt)
            .oneshot(request(Some(&format!("Bearer {}", token))))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_garbage_token_rejected() {
        let response = app(manager())
            .oneshot(request(Some("Bearer not.a.jwt")))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn test_auth_user_from_claims_requires_numeric_subject() {
        let claims = Claims {
            sub: "abc".to_string(),
            email: "a@b.com".to_string(),
            exp: 0,
            iat: 0,
        };
        assert!(matches!(AuthUser::try_from(&claims), Err(AuthError::InvalidToken)));

        let claims = Claims {
            sub: "42".to_string(),
            ..claims
        };
        assert_eq!(AuthUser::try_from(&claims).unwrap().id, 42);
    }
}
