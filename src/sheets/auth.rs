//! # Service Account Authentication
//!
//! OAuth 2.0 JWT-bearer flow for Google service accounts:
//! sign an RS256 assertion with the account's private key, exchange it at
//! the token URI, and cache the bearer token until shortly before expiry.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use super::errors::{SheetError, SheetResult};
use crate::observability::{Event, Logger};

/// OAuth scope for read/write spreadsheet access
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
const ASSERTION_TTL_SECS: i64 = 3600;

/// Tokens are refreshed this long before they actually expire
const EXPIRY_MARGIN_SECS: i64 = 60;

/// The fields of a service account key file that the flow needs
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("client_email", &self.client_email)
            .field("private_key", &"<redacted>")
            .field("token_uri", &self.token_uri)
            .finish()
    }
}

impl ServiceAccountKey {
    /// Parse a key from its JSON text
    pub fn from_json(json: &str) -> SheetResult<Self> {
        serde_json::from_str(json)
            .map_err(|e| SheetError::Auth(format!("Invalid service account key: {}", e)))
    }
}

/// JWT assertion claims
#[derive(Debug, Serialize, Deserialize)]
struct AssertionClaims {
    iss: String,
    scope: String,
    aud: String,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    token: String,
    expires_at: DateTime<Utc>,
}

/// Source of bearer tokens for the Sheets API
#[derive(Debug, Clone)]
pub enum TokenProvider {
    /// Fixed token, e.g. for an emulator or a token minted elsewhere
    Static(String),

    /// Service account JWT-bearer exchange
    ServiceAccount(ServiceAccountAuth),
}

impl TokenProvider {
    /// Create a static token provider
    pub fn static_token(token: impl Into<String>) -> Self {
        Self::Static(token.into())
    }

    /// Get a currently valid bearer token
    pub async fn get_token(&self, client: &reqwest::Client) -> SheetResult<String> {
        match self {
            Self::Static(token) => Ok(token.clone()),
            Self::ServiceAccount(auth) => auth.get_token(client).await,
        }
    }
}

/// Service account token exchange with caching
#[derive(Debug, Clone)]
pub struct ServiceAccountAuth {
    key: ServiceAccountKey,
    scope: String,
    cached: Arc<Mutex<Option<CachedToken>>>,
}

impl ServiceAccountAuth {
    pub fn new(key: ServiceAccountKey) -> Self {
        Self {
            key,
            scope: SPREADSHEETS_SCOPE.to_string(),
            cached: Arc::new(Mutex::new(None)),
        }
    }

    /// Build and sign the assertion for `now`
    fn sign_assertion(&self, now: DateTime<Utc>) -> SheetResult<String> {
        let claims = AssertionClaims {
            iss: self.key.client_email.clone(),
            scope: self.scope.clone(),
            aud: self.key.token_uri.clone(),
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_TTL_SECS,
        };

        let mut header = Header::new(Algorithm::RS256);
        header.kid = self.key.private_key_id.clone();

        let encoding_key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())
            .map_err(|e| SheetError::Auth(format!("Invalid private key: {}", e)))?;

        encode(&header, &claims, &encoding_key)
            .map_err(|e| SheetError::Auth(format!("Failed to sign assertion: {}", e)))
    }

    /// Get a valid token, exchanging a fresh assertion when the cached one is stale.
    /// The lock is held across the exchange so concurrent callers share one refresh.
    pub async fn get_token(&self, client: &reqwest::Client) -> SheetResult<String> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now();

        if let Some(token) = cached.as_ref() {
            if token.expires_at - Duration::seconds(EXPIRY_MARGIN_SECS) > now {
                return Ok(token.token.clone());
            }
        }

        let assertion = self.sign_assertion(now)?;
        let response = client
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SheetError::Auth(format!(
                "Token exchange failed ({}): {}",
                status.as_u16(),
                body
            )));
        }

        let token: TokenResponse = response.json().await?;
        let expires_at = now + Duration::seconds(token.expires_in);
        Logger::info(
            Event::TokenRefreshed,
            &[
                ("client_email", self.key.client_email.as_str()),
                ("expires_at", expires_at.to_rfc3339().as_str()),
            ],
        );

        *cached = Some(CachedToken {
            token: token.access_token.clone(),
            expires_at,
        });
        Ok(token.access_token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_from_json_defaults_token_uri() {
        let key = ServiceAccountKey::from_json(
            r#"{"client_email":"svc@project.iam.gserviceaccount.com","private_key":"---"}"#,
        )
        .unwrap();
        assert_eq!(key.token_uri, DEFAULT_TOKEN_URI);
        assert!(key.private_key_id.is_none());
    }

    #[test]
    fn test_key_debug_redacts_private_key() {
        let key = ServiceAccountKey::from_json(
            r#"{"client_email":"svc@x","private_key":"SECRET-MATERIAL"}"#,
        )
        .unwrap();
        let printed = format!("{:?}", key);
        assert!(!printed.contains("SECRET-MATERIAL"));
        assert!(printed.contains("svc@x"));
    }

    #[test]
    fn test_invalid_key_json() {
        assert!(matches!(
            ServiceAccountKey::from_json("not json"),
            Err(SheetError::Auth(_))
        ));
    }

    #[test]
    fn test_sign_rejects_non_pem_key() {
        let key = ServiceAccountKey::from_json(
            r#"{"client_email":"svc@x","private_key":"not a pem"}"#,
        )
        .unwrap();
        let auth = ServiceAccountAuth::new(key);
        assert!(matches!(auth.sign_assertion(Utc::now()), Err(SheetError::Auth(_))));
    }

    #[tokio::test]
    async fn test_static_token() {
        let provider = TokenProvider::static_token("ya29.test");
        let client = reqwest::Client::new();
        assert_eq!(provider.get_token(&client).await.unwrap(), "ya29.test");
    }
}
