//! Bearer token handling
//!
//! The console does not issue tokens. A caller's bearer token is forwarded
//! to the remote API unchanged; when a JWT secret is configured the token is
//! also verified locally and its subject used for audit attribution.

use axum::{
    body::Body,
    extract::{FromRequestParts, Request, State},
    http::{header, request::Parts},
    middleware::Next,
    response::{IntoResponse, Response},
};
use birthcare_client::ApiClient;
use jsonwebtoken::{Algorithm, DecodingKey, TokenData, Validation};
use serde::{Deserialize, Serialize};
use std::convert::Infallible;
use std::sync::Arc;

use crate::{
    audit::{self, AuditContext},
    config::AuthSettings,
    handlers::ApiError,
    AppState,
};

/// Where the front end sends a caller whose session is gone
pub const LOGIN_PATH: &str = "/login";

/// Authenticated caller
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub token: String,
    pub user_id: Option<String>,
    pub auth_type: AuthType,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AuthType {
    /// Opaque token, only checked by the remote API
    Bearer,
    Jwt,
}

#[derive(Debug, Serialize, Deserialize)]
struct JwtClaims {
    sub: Option<String>,
    #[serde(default)]
    email: Option<String>,
    exp: Option<u64>,
}

/// Authentication middleware
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    if request.uri().path() == "/health" {
        return Ok(next.run(request).await);
    }

    let client_ip = AuditContext::client_ip(request.extensions());
    let token = bearer_token(
        request
            .headers()
            .get(header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok()),
    )
    .map(str::to_string);

    let Some(token) = token else {
        if state.config.auth.required {
            audit::log_auth_attempt(&client_ip, None, false);
            return Err(ApiError::login_required("Missing bearer token").into_response());
        }
        return Ok(next.run(request).await);
    };

    let auth_user = authenticate(&state.config.auth, token).map_err(|e| {
        audit::log_auth_attempt(&client_ip, None, false);
        e.into_response()
    })?;

    audit::log_auth_attempt(&client_ip, auth_user.user_id.as_deref(), true);
    request.extensions_mut().insert(auth_user);

    Ok(next.run(request).await)
}

/// Token of an `Authorization: Bearer <token>` header
fn bearer_token(header_value: Option<&str>) -> Option<&str> {
    header_value?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[allow(clippy::result_large_err)]
fn authenticate(settings: &AuthSettings, token: String) -> Result<AuthUser, ApiError> {
    let Some(ref secret) = settings.jwt_secret else {
        return Ok(AuthUser {
            token,
            user_id: None,
            auth_type: AuthType::Bearer,
        });
    };

    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_aud = false;

    let token_data: TokenData<JwtClaims> = jsonwebtoken::decode(
        &token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(|e| ApiError::login_required(format!("Invalid token: {}", e)))?;

    let claims = token_data.claims;
    Ok(AuthUser {
        token,
        user_id: claims.sub.or(claims.email),
        auth_type: AuthType::Jwt,
    })
}

/// Per-request upstream client carrying the caller's token, plus the
/// caller's audit attribution
pub struct Caller {
    pub client: ApiClient,
    pub audit: AuditContext,
}

impl FromRequestParts<Arc<AppState>> for Caller {
    type Rejection = Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &Arc<AppState>,
    ) -> Result<Self, Self::Rejection> {
        let client = match parts.extensions.get::<AuthUser>() {
            Some(user) => state.upstream.with_token(user.token.clone()),
            None => state.upstream.clone(),
        };
        Ok(Self {
            client,
            audit: AuditContext::from_parts(parts),
        })
    }
}
