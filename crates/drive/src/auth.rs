//! Service-account authentication.
//!
//! Google service accounts authenticate with a self-signed RS256 JWT that is
//! exchanged for a short-lived OAuth access token. The token is cached and
//! shared by every request the client makes, across worker threads.

use crate::error::{Error, Result};
use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::sync::Mutex;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Full Drive scope; permission changes need more than `drive.file`.
pub const DRIVE_SCOPE: &str = "https://www.googleapis.com/auth/drive";

/// Default OAuth token endpoint.
pub const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Lifetime requested for the signed assertion.
const ASSERTION_LIFETIME_SECS: u64 = 3600;

/// Refresh the access token this long before it expires.
const EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// The parts of a service-account key file the client needs.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    /// Service account email, used as the JWT issuer.
    pub client_email: String,
    /// PEM-encoded RSA private key.
    pub private_key: String,
    /// Token endpoint; Google's default when absent.
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    /// Load a key from a JSON credential file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::from_json(&content).map_err(|e| Error::Credentials {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Parse a key from JSON text.
    pub fn from_json(content: &str) -> Result<Self> {
        let key: Self = serde_json::from_str(content)?;
        if key.client_email.is_empty() {
            return Err(Error::Auth("client_email is empty".into()));
        }
        if key.private_key.is_empty() {
            return Err(Error::Auth("private_key is empty".into()));
        }
        Ok(key)
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: u64,
    exp: u64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    ASSERTION_LIFETIME_SECS
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    refresh_at: Instant,
}

/// Produces bearer tokens for API requests.
pub struct TokenProvider {
    key: ServiceAccountKey,
    scope: String,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    /// Create a provider for the Drive scope.
    pub fn new(key: ServiceAccountKey) -> Self {
        Self {
            key,
            scope: DRIVE_SCOPE.to_string(),
            cached: Mutex::new(None),
        }
    }

    /// Service account the tokens are issued for.
    pub fn client_email(&self) -> &str {
        &self.key.client_email
    }

    /// Sign the JWT assertion sent to the token endpoint.
    pub fn assertion(&self, now_secs: u64) -> Result<String> {
        let claims = Claims {
            iss: &self.key.client_email,
            scope: &self.scope,
            aud: &self.key.token_uri,
            iat: now_secs,
            exp: now_secs + ASSERTION_LIFETIME_SECS,
        };
        let key = EncodingKey::from_rsa_pem(self.key.private_key.as_bytes())?;
        Ok(encode(&Header::new(Algorithm::RS256), &claims, &key)?)
    }

    /// Return a valid access token, exchanging a new assertion when the
    /// cached one is missing or about to expire.
    ///
    /// The lock is held across the exchange so concurrent callers wait for a
    /// single refresh instead of each requesting a token.
    pub fn token(&self, agent: &ureq::Agent) -> Result<String> {
        let mut cached = match self.cached.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        if let Some(token) = cached.as_ref()
            && Instant::now() < token.refresh_at
        {
            return Ok(token.value.clone());
        }

        let fresh = self.exchange(agent)?;
        let value = fresh.value.clone();
        *cached = Some(fresh);
        Ok(value)
    }

    fn exchange(&self, agent: &ureq::Agent) -> Result<CachedToken> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| Error::Auth(format!("System time error: {}", e)))?
            .as_secs();
        let assertion = self.assertion(now)?;

        debug!("Requesting access token for {}", self.key.client_email);
        let mut response = agent
            .post(&self.key.token_uri)
            .send_form([
                ("grant_type", JWT_BEARER_GRANT),
                ("assertion", assertion.as_str()),
            ])?;

        let status = response.status().as_u16();
        if status >= 400 {
            let body = response.body_mut().read_to_string().unwrap_or_default();
            return Err(Error::Auth(format!("token endpoint returned {status}: {body}")));
        }

        let token: TokenResponse = response.body_mut().read_json()?;
        let lifetime = Duration::from_secs(token.expires_in).saturating_sub(EXPIRY_MARGIN);

        Ok(CachedToken {
            value: token.access_token,
            refresh_at: Instant::now() + lifetime,
        })
    }
}
