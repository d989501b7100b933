pub mod credentials;

use std::sync::Arc;

use anyhow::Result;
use axum::{
    async_trait,
    extract::{FromRequestParts, Request, State},
    http::request::Parts,
    middleware::Next,
    response::Response,
};
use axum_extra::{
    TypedHeader,
    extract::cookie::{Cookie, CookieJar, SameSite},
    headers::{Authorization, authorization::Bearer},
};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::axum_http::error_responses::AppError;
use invoicing::domain::entities::users::UserEntity;

pub const SESSION_COOKIE: &str = "session";

#[derive(Debug, Serialize, Deserialize)]
pub struct SessionClaims {
    pub sub: String,
    pub email: String,
    pub exp: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub token: String,
    pub user_id: String,
    pub email: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: String,
    pub email: String,
}

/// HS256 signing material for session tokens.
#[derive(Clone)]
pub struct SessionKeys {
    secret: String,
    ttl_seconds: i64,
}

impl std::fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionKeys")
            .field("ttl_seconds", &self.ttl_seconds)
            .finish_non_exhaustive()
    }
}

impl SessionKeys {
    pub fn new(secret: impl Into<String>, ttl_seconds: i64) -> Self {
        Self {
            secret: secret.into(),
            ttl_seconds,
        }
    }

    pub fn issue(&self, user: &UserEntity) -> Result<Session> {
        let expires_at = Utc::now() + Duration::seconds(self.ttl_seconds);
        let claims = SessionClaims {
            sub: user.id.clone(),
            email: user.email.clone(),
            exp: usize::try_from(expires_at.timestamp())?,
        };

        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )?;

        Ok(Session {
            token,
            user_id: claims.sub,
            email: claims.email,
            expires_at,
        })
    }

    pub fn validate(&self, token: &str) -> Result<SessionClaims> {
        let decoding_key = DecodingKey::from_secret(self.secret.as_bytes());
        let validation = Validation::new(Algorithm::HS256);

        let token_data = decode::<SessionClaims>(token, &decoding_key, &validation)
            .map_err(|e| anyhow::anyhow!("Session validation failed: {}", e))?;

        Ok(token_data.claims)
    }
}

pub fn session_cookie(session: &Session, secure: bool) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, session.token.clone()))
        .path("/")
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .build()
}

pub fn expired_session_cookie() -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, "")).path("/").build()
}

/// Route layer for pages behind the login. Accepts the session cookie or a bearer token.
pub async fn require_session(
    State(session_keys): State<Arc<SessionKeys>>,
    jar: CookieJar,
    bearer: Option<TypedHeader<Authorization<Bearer>>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = match (&bearer, jar.get(SESSION_COOKIE)) {
        (Some(TypedHeader(Authorization(bearer))), _) => bearer.token().to_string(),
        (None, Some(cookie)) => cookie.value().to_string(),
        (None, None) => {
            debug!("auth: request without session");
            return Err(AppError::Unauthorized);
        }
    };

    let claims = session_keys.validate(&token).map_err(|err| {
        debug!(error = %err, "auth: rejected session token");
        AppError::Unauthorized
    })?;

    request.extensions_mut().insert(AuthUser {
        user_id: claims.sub,
        email: claims.email,
    });

    Ok(next.run(request).await)
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthUser>()
            .cloned()
            .ok_or(AppError::Unauthorized)
    }
}
