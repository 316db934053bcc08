//! Session tokens and the authenticated-principal extractor

use super::error::{map_domain_error, ApiError};
use crate::contract::{CausasError, Id, Principal};
use anyhow::{bail, Result};
use axum::{
    extract::FromRequestParts,
    http::{
        header::{AUTHORIZATION, COOKIE, LOCATION},
        request::Parts,
        StatusCode,
    },
    response::{IntoResponse, Response},
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

const BEARER: &str = "Bearer ";

/// Name of the cookie carrying the session token
pub const SESSION_COOKIE: &str = "session";

/// Token claims
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Usuario id
    pub sub: String,
    pub username: String,
    /// Expiry, seconds since the epoch
    pub exp: i64,
}

/// Signing keys and login location, shared by every request
pub struct AuthSettings {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    login_url: String,
}

impl AuthSettings {
    pub fn new(secret: &str, login_url: &str) -> Result<Self> {
        if secret.is_empty() {
            bail!("jwt_secret must be configured");
        }
        Ok(Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            login_url: login_url.to_string(),
        })
    }

    /// Sign a token for `principal` valid for `ttl`
    pub fn issue_token(&self, principal: &Principal, ttl: Duration) -> Result<String> {
        let ttl = chrono::Duration::from_std(ttl)?;
        let claims = Claims {
            sub: principal.usuario_id.to_string(),
            username: principal.username.clone(),
            exp: (chrono::Utc::now() + ttl).timestamp(),
        };
        Ok(encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &self.encoding,
        )?)
    }

    /// Verify signature and expiry and recover the principal
    pub fn decode_token(&self, token: &str) -> Result<Principal> {
        let data = decode::<Claims>(token, &self.decoding, &self.validation)?;
        let usuario_id: Id = data.claims.sub.parse()?;
        Ok(Principal {
            usuario_id,
            username: data.claims.username,
        })
    }

    /// Redirect to the login page, returning to `next` afterwards
    pub fn login_redirect(&self, next: &str) -> LoginRedirect {
        LoginRedirect {
            location: format!("{}?next={}", self.login_url, urlencoding::encode(next)),
        }
    }
}

/// `303 See Other` to the login page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginRedirect {
    pub location: String,
}

impl IntoResponse for LoginRedirect {
    fn into_response(self) -> Response {
        (StatusCode::SEE_OTHER, [(LOCATION, self.location)]).into_response()
    }
}

/// Token from `Authorization: Bearer` first, then the session cookie
fn token_from(parts: &Parts) -> Option<String> {
    let bearer = parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix(BEARER))
        .map(str::trim)
        .filter(|token| !token.is_empty());
    if let Some(token) = bearer {
        return Some(token.to_string());
    }

    parts
        .headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|header| header.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, token)| token.trim().to_string())
        .filter(|token| !token.is_empty())
}

/// Authenticated caller of a page handler
pub struct Authenticated {
    pub principal: Principal,
    next: String,
    settings: Arc<AuthSettings>,
}

impl Authenticated {
    /// Map a domain error, sending the caller to the login page when the
    /// principal is no longer valid
    pub fn reject(&self, error: CausasError) -> ApiError {
        match error {
            CausasError::Unauthenticated => {
                ApiError::Login(self.settings.login_redirect(&self.next))
            }
            other => ApiError::Problem(map_domain_error(other)),
        }
    }
}

impl<S> FromRequestParts<S> for Authenticated
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let Some(settings) = parts.extensions.get::<Arc<AuthSettings>>().cloned() else {
            tracing::error!("auth settings missing from request extensions");
            return Err(StatusCode::INTERNAL_SERVER_ERROR.into_response());
        };

        let next = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str().to_string())
            .unwrap_or_else(|| "/".to_string());

        let Some(token) = token_from(parts) else {
            return Err(settings.login_redirect(&next).into_response());
        };

        match settings.decode_token(&token) {
            Ok(principal) => Ok(Self {
                principal,
                next,
                settings,
            }),
            Err(err) => {
                tracing::debug!(error = %err, path = %next, "rejecting session token");
                Err(settings.login_redirect(&next).into_response())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use axum::http::Request;

    fn settings() -> AuthSettings {
        AuthSettings::new("test-secret", "/cuentas/login/").unwrap()
    }

    fn principal() -> Principal {
        Principal {
            usuario_id: 4,
            username: "abogada".into(),
        }
    }

    #[test]
    fn test_token_round_trip() {
        let settings = settings();
        let token = settings
            .issue_token(&principal(), Duration::from_secs(60))
            .unwrap();
        assert_eq!(settings.decode_token(&token).unwrap(), principal());
    }

    #[test]
    fn test_token_signed_with_other_secret_is_rejected() {
        let other = AuthSettings::new("other-secret", "/login").unwrap();
        let token = other.issue_token(&principal(), Duration::from_secs(60)).unwrap();
        assert!(settings().decode_token(&token).is_err());
    }

    #[test]
    fn test_empty_secret_is_refused() {
        assert!(AuthSettings::new("", "/login").is_err());
    }

    #[test]
    fn test_login_redirect_encodes_next() {
        let redirect = settings().login_redirect("/causas/?estado=ACTIVO");
        assert_eq!(
            redirect.location,
            "/cuentas/login/?next=%2Fcausas%2F%3Festado%3DACTIVO"
        );
    }

    #[test]
    fn test_token_from_cookie_and_header() {
        let (parts, _) = Request::builder()
            .header(COOKIE, "theme=dark; session=abc.def.ghi")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(token_from(&parts).as_deref(), Some("abc.def.ghi"));

        let (parts, _) = Request::builder()
            .header(AUTHORIZATION, "Bearer xyz")
            .header(COOKIE, "session=abc")
            .body(())
            .unwrap()
            .into_parts();
        assert_eq!(token_from(&parts).as_deref(), Some("xyz"));

        let (parts, _) = Request::builder().body(()).unwrap().into_parts();
        assert_eq!(token_from(&parts), None);
    }
}
