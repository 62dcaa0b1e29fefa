//! Service-account credentials, and the OAuth2 access token they are exchanged for

use std::error::Error;
use std::sync::Mutex;

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use serde::{Deserialize, Serialize};

/// The OAuth2 scope that grants read/write access to spreadsheets
pub const SPREADSHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

static JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime of the signed assertion. Google refuses anything longer than one hour.
const ASSERTION_LIFETIME_SECS: i64 = 3600;

/// A cached token is renewed this long before it actually expires
const EXPIRY_MARGIN_SECS: i64 = 60;

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Clone, Debug)]
struct AccessToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl AccessToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(EXPIRY_MARGIN_SECS) < self.expires_at
    }
}

/// The identity of a Google service account, and the access token it currently holds.
///
/// This is meant to be created once per process: the token is cached and only renewed when it is about to expire.
pub struct ServiceAccount {
    client_email: String,
    key: EncodingKey,
    token_uri: String,

    cached_token: Mutex<Option<AccessToken>>,
}

impl ServiceAccount {
    /// Create a service account from its email and PEM-encoded RSA private key. This does not start a connection
    pub fn new<S: ToString, T: ToString>(client_email: S, private_key_pem: &str, token_uri: T) -> Result<Self, Box<dyn Error + Send + Sync>> {
        let key = EncodingKey::from_rsa_pem(private_key_pem.as_bytes())
            .map_err(|err| format!("Invalid service account private key: {}", err))?;

        Ok(Self {
            client_email: client_email.to_string(),
            key,
            token_uri: token_uri.to_string(),
            cached_token: Mutex::new(None),
        })
    }

    pub fn client_email(&self) -> &str { &self.client_email }

    fn signed_assertion(&self, now: DateTime<Utc>) -> Result<String, Box<dyn Error + Send + Sync>> {
        let claims = Claims {
            iss: &self.client_email,
            scope: SPREADSHEETS_SCOPE,
            aud: &self.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };
        let jwt = jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.key)?;
        Ok(jwt)
    }

    /// Return the current access token, or fetch a new one from the token endpoint if it is missing or about to expire
    pub async fn access_token(&self, http: &reqwest::Client) -> Result<String, Box<dyn Error + Send + Sync>> {
        let now = Utc::now();
        let cached = self.cached_token.lock().map_err(|_| "Token cache is poisoned")?.clone();
        if let Some(token) = cached {
            if token.is_fresh(now) {
                return Ok(token.value);
            }
        }

        log::debug!("Requesting a new access token for {}", self.client_email);
        let assertion = self.signed_assertion(now)?;
        let response = http
            .post(&self.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        if response.status().is_success() == false {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(format!("Unable to get an access token (HTTP status {}): {}", status, text).into());
        }

        let token: TokenResponse = response.json().await?;
        let fresh = AccessToken {
            value: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        };

        // The lock is not held across the request: two concurrent refreshes just waste one call
        *self.cached_token.lock().map_err(|_| "Token cache is poisoned")? = Some(fresh.clone());
        Ok(fresh.value)
    }
}
