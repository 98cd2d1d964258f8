//! Request Authentication
//!
//! Two guards, both as axum middleware:
//! - **service key**: internal producers calling the admin index routes send
//!   a shared secret in `X-Service-API-Key`.
//! - **bearer**: end users present an HMAC-signed JWT carrying `exp`. The
//!   decoded claims are attached to the request as [`AuthUser`].

use crate::error::SearchError;

use axum::extract::{Request, State};
use axum::http::HeaderMap;
use axum::http::header::AUTHORIZATION;
use axum::middleware::Next;
use axum::response::Response;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const SERVICE_KEY_HEADER: &str = "X-Service-API-Key";

#[derive(Debug, Clone)]
pub struct AuthConfig {
    pub service_api_key: String,
    pub jwt_secret: String,
}

/// Identity of the caller as asserted by a valid bearer token. Registered
/// claims such as `exp` are checked by the decoder and not kept here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: String,
}

pub async fn require_service_key(
    State(auth): State<Arc<AuthConfig>>,
    request: Request,
    next: Next,
) -> Result<Response, SearchError> {
    check_service_key(request.headers(), &auth.service_api_key)?;
    Ok(next.run(request).await)
}

pub async fn require_bearer(
    State(auth): State<Arc<AuthConfig>>,
    mut request: Request,
    next: Next,
) -> Result<Response, SearchError> {
    let user = check_bearer(request.headers(), &auth.jwt_secret)?;
    tracing::debug!("Authenticated user {} ({})", user.username, user.role);
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}

pub fn check_service_key(headers: &HeaderMap, expected: &str) -> Result<(), SearchError> {
    let presented = headers
        .get(SERVICE_KEY_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if presented.is_empty() {
        return Err(SearchError::Unauthorized("Service API key required".into()));
    }
    if presented != expected {
        tracing::warn!("Rejected request with invalid service API key");
        return Err(SearchError::Unauthorized("Invalid service API key".into()));
    }
    Ok(())
}

pub fn check_bearer(headers: &HeaderMap, secret: &str) -> Result<AuthUser, SearchError> {
    let header = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();

    if header.is_empty() {
        return Err(SearchError::Unauthorized(
            "Authorization header required".into(),
        ));
    }

    let token = match header.split(' ').collect::<Vec<_>>().as_slice() {
        ["Bearer", token] => *token,
        _ => {
            return Err(SearchError::Unauthorized(
                "Invalid authorization header format".into(),
            ));
        }
    };

    let data = jsonwebtoken::decode::<AuthUser>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation(),
    )
    .map_err(|e| {
        tracing::debug!("Bearer token rejected: {}", e);
        SearchError::Unauthorized("Invalid token".into())
    })?;

    Ok(data.claims)
}

/// HMAC family only; `exp` is required and checked without leeway.
fn validation() -> Validation {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.algorithms = vec![Algorithm::HS256, Algorithm::HS384, Algorithm::HS512];
    validation.leeway = 0;
    validation
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;
    use jsonwebtoken::{EncodingKey, Header};
    use serde_json::json;

    const SECRET: &str = "test-secret";

    fn token(alg: Algorithm, secret: &str, exp: i64) -> String {
        let claims = json!({
            "id": "u1",
            "username": "ada",
            "email": "ada@example.com",
            "role": "admin",
            "exp": exp,
        });
        jsonwebtoken::encode(
            &Header::new(alg),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap()
    }

    fn future() -> i64 {
        chrono::Utc::now().timestamp() + 3600
    }

    fn bearer(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, HeaderValue::from_str(value).unwrap());
        headers
    }

    fn message(err: SearchError) -> String {
        err.to_string()
    }

    #[test]
    fn test_service_key() {
        let mut headers = HeaderMap::new();
        assert_eq!(
            message(check_service_key(&headers, "k").unwrap_err()),
            "Service API key required"
        );

        headers.insert(SERVICE_KEY_HEADER, HeaderValue::from_static("wrong"));
        assert_eq!(
            message(check_service_key(&headers, "k").unwrap_err()),
            "Invalid service API key"
        );

        headers.insert(SERVICE_KEY_HEADER, HeaderValue::from_static("k"));
        assert!(check_service_key(&headers, "k").is_ok());
    }

    #[test]
    fn test_bearer_valid_token() {
        for alg in [Algorithm::HS256, Algorithm::HS384, Algorithm::HS512] {
            let headers = bearer(&format!("Bearer {}", token(alg, SECRET, future())));

            let user = check_bearer(&headers, SECRET).unwrap();

            assert_eq!(user.id, "u1");
            assert_eq!(user.username, "ada");
            assert_eq!(user.role, "admin");
        }
    }

    #[test]
    fn test_bearer_header_problems() {
        assert_eq!(
            message(check_bearer(&HeaderMap::new(), SECRET).unwrap_err()),
            "Authorization header required"
        );
        assert_eq!(
            message(check_bearer(&bearer("Token abc"), SECRET).unwrap_err()),
            "Invalid authorization header format"
        );
        assert_eq!(
            message(check_bearer(&bearer("Bearer a b"), SECRET).unwrap_err()),
            "Invalid authorization header format"
        );
    }

    #[test]
    fn test_bearer_rejects_bad_tokens() {
        let wrong_secret = token(Algorithm::HS256, "other", future());
        let expired = token(Algorithm::HS256, SECRET, chrono::Utc::now().timestamp() - 60);

        for t in [wrong_secret, expired, "garbage".to_string()] {
            let err = check_bearer(&bearer(&format!("Bearer {}", t)), SECRET).unwrap_err();
            assert_eq!(message(err), "Invalid token");
        }
    }

    #[test]
    fn test_bearer_requires_exp() {
        let no_exp = jsonwebtoken::encode(
            &Header::new(Algorithm::HS256),
            &json!({ "id": "u1" }),
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        let result = check_bearer(&bearer(&format!("Bearer {}", no_exp)), SECRET);

        assert!(result.is_err());
    }
}
