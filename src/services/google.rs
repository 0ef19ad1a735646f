//! Google service-account authentication and the Sheets values API
//!
//! Both the booking store and the audit log live in Google Sheets. They
//! share one [`GoogleSheetsClient`], which asks a [`TokenSource`] for an
//! OAuth access token before every call.

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::{Client, Url};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::error::{AppError, AppResult};

const SERVICE: &str = "google sheets";
const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";
const DEFAULT_TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Refresh a cached token this long before Google says it expires
const REFRESH_MARGIN_SECS: i64 = 60;

/// The fields of a service-account JSON key this service needs
#[derive(Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    DEFAULT_TOKEN_URI.to_string()
}

impl ServiceAccountKey {
    pub fn from_file(path: &str) -> AppResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Cannot read service account key {}: {}", path, e))
        })?;
        serde_json::from_str(&raw).map_err(|e| {
            AppError::Config(format!("Invalid service account key {}: {}", path, e))
        })
    }
}

/// Supplies OAuth bearer tokens for Google APIs
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> AppResult<String>;
}

/// A fixed token, e.g. from `gcloud auth print-access-token`
pub struct StaticToken(pub String);

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> AppResult<String> {
        Ok(self.0.clone())
    }
}

#[derive(Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    ASSERTION_LIFETIME_SECS
}

struct CachedToken {
    token: String,
    expires_at: i64,
}

/// Exchanges a signed RS256 assertion for an access token (JWT bearer grant)
/// and caches it until shortly before expiry.
pub struct ServiceAccountTokenSource {
    client: Client,
    client_email: String,
    token_uri: String,
    encoding_key: EncodingKey,
    cached: Mutex<Option<CachedToken>>,
}

impl ServiceAccountTokenSource {
    pub fn new(client: Client, key: ServiceAccountKey, token_uri: Option<String>) -> AppResult<Self> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| AppError::Config(format!("Invalid service account private key: {}", e)))?;

        Ok(Self {
            client,
            client_email: key.client_email,
            token_uri: token_uri.unwrap_or(key.token_uri),
            encoding_key,
            cached: Mutex::new(None),
        })
    }

    fn assertion(&self, now: i64) -> AppResult<String> {
        let claims = AssertionClaims {
            iss: &self.client_email,
            scope: SHEETS_SCOPE,
            aud: &self.token_uri,
            iat: now,
            exp: now + ASSERTION_LIFETIME_SECS,
        };

        encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| AppError::Internal(format!("Failed to sign token assertion: {}", e)))
    }
}

#[async_trait]
impl TokenSource for ServiceAccountTokenSource {
    async fn access_token(&self) -> AppResult<String> {
        let mut cached = self.cached.lock().await;
        let now = Utc::now().timestamp();

        if let Some(token) = cached.as_ref() {
            if token.expires_at - REFRESH_MARGIN_SECS > now {
                return Ok(token.token.clone());
            }
        }

        tracing::debug!("Requesting Google access token for {}", self.client_email);

        let assertion = self.assertion(now)?;
        let response: TokenResponse = self
            .client
            .post(&self.token_uri)
            .form(&[
                ("grant_type", "urn:ietf:params:oauth:grant-type:jwt-bearer"),
                ("assertion", assertion.as_str()),
            ])
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::upstream("google oauth", e))?
            .json()
            .await
            .map_err(|e| AppError::parse("google oauth", e))?;

        let token = response.access_token.clone();
        *cached = Some(CachedToken {
            token: response.access_token,
            expires_at: now + response.expires_in,
        });

        Ok(token)
    }
}

#[derive(Deserialize)]
struct ValueRange {
    #[serde(default)]
    values: Vec<Vec<Value>>,
}

/// Minimal client for the Sheets v4 `values` endpoints
#[derive(Clone)]
pub struct GoogleSheetsClient {
    client: Client,
    base_url: String,
    tokens: Arc<dyn TokenSource>,
}

impl GoogleSheetsClient {
    pub fn new(client: Client, base_url: impl Into<String>, tokens: Arc<dyn TokenSource>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
            tokens,
        }
    }

    /// `{base}/v4/spreadsheets/{id}/values/{last}` with each segment escaped
    fn values_url(&self, spreadsheet_id: &str, last: &str) -> AppResult<Url> {
        let mut url = Url::parse(&self.base_url)
            .map_err(|e| AppError::Config(format!("Invalid sheets base url: {}", e)))?;
        url.path_segments_mut()
            .map_err(|_| AppError::Config("Sheets base url cannot be a base".to_string()))?
            .pop_if_empty()
            .extend(["v4", "spreadsheets", spreadsheet_id, "values", last]);
        Ok(url)
    }

    /// Read a range as rows of display strings
    pub async fn get_values(&self, spreadsheet_id: &str, range: &str) -> AppResult<Vec<Vec<String>>> {
        let url = self.values_url(spreadsheet_id, range)?;
        let token = self.tokens.access_token().await?;

        tracing::debug!("Reading sheet range {}", range);

        let body: ValueRange = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::upstream(SERVICE, e))?
            .json()
            .await
            .map_err(|e| AppError::parse(SERVICE, e))?;

        Ok(body
            .values
            .into_iter()
            .map(|row| row.into_iter().map(cell_to_string).collect())
            .collect())
    }

    /// Append one row after the last row of the range's table
    pub async fn append_row(&self, spreadsheet_id: &str, range: &str, row: Vec<Value>) -> AppResult<()> {
        let url = self.values_url(spreadsheet_id, &format!("{}:append", range))?;
        let token = self.tokens.access_token().await?;

        tracing::debug!("Appending row to sheet range {}", range);

        self.client
            .post(url)
            .query(&[
                ("valueInputOption", "USER_ENTERED"),
                ("insertDataOption", "INSERT_ROWS"),
            ])
            .bearer_auth(token)
            .json(&json!({ "values": [row] }))
            .send()
            .await
            .and_then(|r| r.error_for_status())
            .map_err(|e| AppError::upstream(SERVICE, e))?;

        Ok(())
    }
}

fn cell_to_string(cell: Value) -> String {
    match cell {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
