//! Google identity for commenters and admins.
//!
//! The front end signs visitors in with Google and sends the resulting ID
//! token as `Authorization: Bearer <token>`. The token is checked against
//! Google's tokeninfo endpoint and the claims are validated locally before
//! the visitor is upserted into `users`.

use std::time::Duration;

use anyhow::Context;
use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use chrono::Utc;
use serde::{Deserialize, Deserializer};
use tracing::{debug, warn};

use crate::config::GoogleConfig;
use crate::error::ApiError;
use crate::models::{GoogleProfile, User};
use crate::state::AppState;

const VERIFY_TIMEOUT: Duration = Duration::from_secs(10);
const GOOGLE_ISSUERS: [&str; 2] = ["accounts.google.com", "https://accounts.google.com"];

/// Claims returned by the tokeninfo endpoint. Google encodes some numeric
/// and boolean claims as strings there.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenInfo {
    pub aud: String,
    pub iss: String,
    pub sub: String,
    pub email: Option<String>,
    #[serde(default, deserialize_with = "flexible_bool")]
    pub email_verified: bool,
    #[serde(deserialize_with = "flexible_i64")]
    pub exp: i64,
    pub name: Option<String>,
    pub picture: Option<String>,
}

fn flexible_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flexible {
        Bool(bool),
        Text(String),
    }

    Ok(match Flexible::deserialize(deserializer)? {
        Flexible::Bool(value) => value,
        Flexible::Text(text) => text.eq_ignore_ascii_case("true"),
    })
}

fn flexible_i64<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flexible {
        Number(i64),
        Text(String),
    }

    match Flexible::deserialize(deserializer)? {
        Flexible::Number(value) => Ok(value),
        Flexible::Text(text) => text.parse().map_err(serde::de::Error::custom),
    }
}

/// Check audience, issuer, expiry and email verification.
pub fn validate_claims(info: TokenInfo, client_id: &str, now: i64) -> Result<GoogleProfile, String> {
    if info.aud != client_id {
        return Err("Token was issued for a different client".to_string());
    }

    if !GOOGLE_ISSUERS.contains(&info.iss.as_str()) {
        return Err("Token was not issued by Google".to_string());
    }

    if info.exp <= now {
        return Err("Token has expired".to_string());
    }

    let email = match info.email {
        Some(email) if !email.trim().is_empty() => email,
        _ => return Err("Token carries no email address".to_string()),
    };

    if !info.email_verified {
        return Err("Google account email is not verified".to_string());
    }

    Ok(GoogleProfile {
        sub: info.sub,
        email,
        name: info.name,
        picture: info.picture,
    })
}

/// Pull the token out of an `Authorization: Bearer <token>` header value.
pub fn extract_bearer(header: Option<&str>) -> Result<&str, ApiError> {
    let header = header.ok_or_else(|| ApiError::unauthorized("Missing Authorization header"))?;

    let token = header
        .strip_prefix("Bearer ")
        .or_else(|| header.strip_prefix("bearer "))
        .map(str::trim)
        .ok_or_else(|| ApiError::unauthorized("Invalid Authorization format. Expected: Bearer <token>"))?;

    if token.is_empty() {
        return Err(ApiError::unauthorized("Empty bearer token"));
    }

    Ok(token)
}

/// Verifies Google ID tokens over HTTP.
pub struct GoogleVerifier {
    client: reqwest::Client,
    client_id: String,
    tokeninfo_url: String,
}

impl GoogleVerifier {
    pub fn new(config: &GoogleConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(VERIFY_TIMEOUT)
            .build()
            .context("Failed to build HTTP client for Google token verification")?;

        Ok(GoogleVerifier {
            client,
            client_id: config.client_id.clone(),
            tokeninfo_url: config.tokeninfo_url.clone(),
        })
    }

    pub async fn verify(&self, id_token: &str) -> Result<GoogleProfile, ApiError> {
        let response = self
            .client
            .get(&self.tokeninfo_url)
            .query(&[("id_token", id_token)])
            .send()
            .await
            .map_err(|e| {
                warn!("Google token verification request failed: {}", e);
                ApiError::Upstream("Could not reach Google to verify the sign-in".to_string())
            })?;

        let status = response.status();
        if status.is_client_error() {
            debug!("Google rejected ID token with status {}", status);
            return Err(ApiError::unauthorized("Invalid Google ID token"));
        }
        if !status.is_success() {
            warn!("Google tokeninfo returned HTTP {}", status);
            return Err(ApiError::Upstream(format!("Google tokeninfo returned HTTP {}", status.as_u16())));
        }

        let info: TokenInfo = response.json().await.map_err(|e| {
            warn!("Unreadable Google tokeninfo response: {}", e);
            ApiError::Upstream("Unexpected response from Google".to_string())
        })?;

        validate_claims(info, &self.client_id, Utc::now().timestamp()).map_err(ApiError::Unauthorized)
    }
}

/// A visitor signed in with a verified Google account.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok());
        let token = extract_bearer(header)?;

        let profile = state.google.verify(token).await?;
        let user = state.db.upsert_google_user(&profile).await?;

        Ok(CurrentUser(user))
    }
}

/// A signed-in visitor whose email is on the admin list.
#[derive(Debug, Clone)]
pub struct AdminUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;

        if !user.is_admin(&state.admin_emails) {
            warn!("Non-admin user {} attempted an admin operation", user.email);
            return Err(ApiError::forbidden("Admin access required"));
        }

        Ok(AdminUser(user))
    }
}
