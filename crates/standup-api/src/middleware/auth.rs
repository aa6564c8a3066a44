//! JWT Authentication Middleware
//!
//! Extracts the bearer token from the Authorization header, validates it, and
//! makes the caller available to handlers via Axum's Extension.

use axum::{
    extract::Request,
    http::{header, StatusCode},
    middleware::Next,
    response::Response,
    Json,
};
use serde::{Deserialize, Serialize};
use standup_auth::{JwtValidator, AUDIENCE, ISSUER};
use standup_core::{Actor, Role};
use std::sync::Arc;
use uuid::Uuid;

use crate::models::ErrorResponse;

/// Authenticated user context extracted from JWT
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    /// User ID (token subject)
    pub user_id: Uuid,
    /// User role (employee, manager, admin)
    pub role: Role,
}

impl AuthUser {
    pub fn actor(&self) -> Actor {
        Actor::new(self.user_id, self.role)
    }
}

/// JWT validation state shared across middleware instances
#[derive(Clone)]
pub struct JwtState {
    pub validator: Arc<JwtValidator>,
}

impl JwtState {
    /// Create new JWT state with the given secret
    pub fn new(secret: &[u8]) -> Self {
        Self {
            validator: Arc::new(
                JwtValidator::new(secret)
                    .with_issuer(ISSUER.to_string())
                    .with_audience(AUDIENCE.to_string()),
            ),
        }
    }
}

fn unauthorized(error: impl Into<String>, code: &str) -> (StatusCode, Json<ErrorResponse>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(ErrorResponse {
            error: error.into(),
            code: Some(code.to_string()),
            field: None,
        }),
    )
}

/// Authentication middleware that validates bearer tokens
///
/// # Errors
/// Returns 401 Unauthorized if:
/// - The Authorization header is missing or not `Bearer <token>`
/// - The token is malformed, expired, or signed with another secret
/// - The subject is not a user ID or the role claim is missing/unknown
pub async fn require_auth(
    state: axum::extract::State<Arc<JwtState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, (StatusCode, Json<ErrorResponse>)> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| unauthorized("Missing Authorization header", "MISSING_AUTH"))?;

    let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
        unauthorized(
            "Invalid Authorization header format. Expected 'Bearer <token>'",
            "INVALID_AUTH_FORMAT",
        )
    })?;

    // Validate JWT and extract claims
    let claims = state.validator.validate(token).map_err(|e| {
        unauthorized(format!("Invalid or expired token: {}", e), "INVALID_TOKEN")
    })?;

    let user_id = Uuid::parse_str(&claims.sub)
        .map_err(|_| unauthorized("Token subject is not a user ID", "INVALID_USER_ID"))?;

    let role = claims
        .role
        .as_deref()
        .ok_or_else(|| unauthorized("Token missing 'role' claim", "MISSING_ROLE"))?
        .parse::<Role>()
        .map_err(|e| unauthorized(format!("Invalid role claim: {}", e), "INVALID_ROLE"))?;

    request.extensions_mut().insert(AuthUser { user_id, role });

    Ok(next.run(request).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{body::Body, http::Request, middleware, routing::get, Router};
    use chrono::Duration;
    use standup_auth::JwtClaims;
    use tower::ServiceExt; // For oneshot()

    const SECRET: &[u8] = b"test-secret-key";

    // Test handler that returns the authenticated user
    async fn protected_handler(axum::Extension(user): axum::Extension<AuthUser>) -> Json<AuthUser> {
        Json(user)
    }

    fn create_test_app(jwt_secret: &[u8]) -> Router {
        let jwt_state = Arc::new(JwtState::new(jwt_secret));

        Router::new()
            .route("/protected", get(protected_handler))
            .layer(middleware::from_fn_with_state(
                jwt_state.clone(),
                require_auth,
            ))
            .with_state(jwt_state)
    }

    fn token(subject: &str, role: Option<&str>, validity: Duration, secret: &[u8]) -> String {
        let mut claims = JwtClaims::new(
            subject.to_string(),
            ISSUER.to_string(),
            AUDIENCE.to_string(),
            validity,
        );
        if let Some(role) = role {
            claims = claims.with_role(role.to_string());
        }
        JwtValidator::encode(secret, &claims).unwrap()
    }

    async fn call(app: Router, authorization: Option<String>) -> Response {
        let mut builder = Request::builder().uri("/protected");
        if let Some(value) = authorization {
            builder = builder.header("Authorization", value);
        }
        app.oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
    }

    async fn error_of(response: Response) -> ErrorResponse {
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&body).unwrap()
    }

    #[tokio::test]
    async fn test_auth_middleware_valid_token() {
        let user_id = Uuid::new_v4();
        let bearer = token(&user_id.to_string(), Some("manager"), Duration::hours(1), SECRET);

        let response = call(create_test_app(SECRET), Some(format!("Bearer {}", bearer))).await;
        assert_eq!(response.status(), StatusCode::OK);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let auth_user: AuthUser = serde_json::from_slice(&body).unwrap();

        assert_eq!(auth_user.user_id, user_id);
        assert_eq!(auth_user.role, Role::Manager);
        assert_eq!(auth_user.actor(), Actor::new(user_id, Role::Manager));
    }

    #[tokio::test]
    async fn test_auth_middleware_missing_authorization_header() {
        let response = call(create_test_app(SECRET), None).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_of(response).await.code.as_deref(), Some("MISSING_AUTH"));
    }

    #[tokio::test]
    async fn test_auth_middleware_invalid_bearer_format() {
        let response = call(
            create_test_app(SECRET),
            Some("InvalidFormat token123".to_string()),
        )
        .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let error = error_of(response).await;
        assert!(error.error.contains("Invalid Authorization header format"));
    }

    #[tokio::test]
    async fn test_auth_middleware_expired_token() {
        let bearer = token(
            &Uuid::new_v4().to_string(),
            Some("employee"),
            Duration::seconds(-120), // Already expired
            SECRET,
        );

        let response = call(create_test_app(SECRET), Some(format!("Bearer {}", bearer))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(error_of(response)
            .await
            .error
            .contains("Invalid or expired token"));
    }

    #[tokio::test]
    async fn test_auth_middleware_wrong_secret() {
        let bearer = token(
            &Uuid::new_v4().to_string(),
            Some("admin"),
            Duration::hours(1),
            b"wrong-secret-key",
        );

        let response = call(create_test_app(SECRET), Some(format!("Bearer {}", bearer))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_auth_middleware_rejects_non_uuid_subject() {
        let bearer = token("user-123", Some("admin"), Duration::hours(1), SECRET);

        let response = call(create_test_app(SECRET), Some(format!("Bearer {}", bearer))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            error_of(response).await.code.as_deref(),
            Some("INVALID_USER_ID")
        );
    }

    #[tokio::test]
    async fn test_auth_middleware_missing_role() {
        let bearer = token(&Uuid::new_v4().to_string(), None, Duration::hours(1), SECRET);

        let response = call(create_test_app(SECRET), Some(format!("Bearer {}", bearer))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(error_of(response)
            .await
            .error
            .contains("missing 'role' claim"));
    }

    #[tokio::test]
    async fn test_auth_middleware_unknown_role() {
        let bearer = token(
            &Uuid::new_v4().to_string(),
            Some("owner"),
            Duration::hours(1),
            SECRET,
        );

        let response = call(create_test_app(SECRET), Some(format!("Bearer {}", bearer))).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(error_of(response).await.code.as_deref(), Some("INVALID_ROLE"));
    }
}
