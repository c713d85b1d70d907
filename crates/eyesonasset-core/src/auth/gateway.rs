//! Network login and registration.
//!
//! A failed login is reported once; retrying is left to the caller.

use std::fmt;
use std::time::Duration;

use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::api::extract_detail;
use crate::config::Config;
use crate::models::ValidationError;

use super::credentials::Credentials;
use super::session::{SessionRecord, SessionStore};

/// Registration endpoint
const REGISTER_PATH: &str = "/integrations/user";

/// Shown when the backend gives no usable detail or cannot be reached
pub const LOGIN_FALLBACK_MESSAGE: &str = "Invalid credentials or unable to reach the server.";

/// How credentials are put on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginEncoding {
    /// JSON body `{"login": ..., "password": ...}`
    #[default]
    Json,
    /// Form body `username=...&password=...`
    Form,
}

#[derive(Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    #[serde(default)]
    pub expires_in: Option<u64>,
}

fn default_token_type() -> String {
    "bearer".to_string()
}

impl fmt::Debug for LoginResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginResponse")
            .field("access_token", &"<redacted>")
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .finish()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RegisteredUser {
    pub id: i64,
    pub login: String,
    #[serde(default = "default_active")]
    pub is_active: bool,
}

fn default_active() -> bool {
    true
}

#[derive(Serialize)]
struct JsonCredentials<'a> {
    login: &'a str,
    password: &'a str,
}

#[derive(Error, Debug)]
pub enum LoginError {
    #[error(transparent)]
    Invalid(#[from] ValidationError),

    #[error("Login rejected (status {status})")]
    Rejected { status: u16, detail: Option<String> },

    #[error("Cannot reach server: {0}")]
    Unreachable(#[from] reqwest::Error),

    #[error("Invalid login response: {0}")]
    InvalidResponse(String),

    #[error("Failed to store session: {0}")]
    Storage(String),
}

impl LoginError {
    /// Message to show on the login form
    pub fn user_message(&self) -> String {
        match self {
            LoginError::Invalid(e) => e.to_string(),
            LoginError::Rejected {
                detail: Some(detail),
                ..
            } => detail.clone(),
            LoginError::Storage(_) => "Logged in, but the session could not be saved.".to_string(),
            _ => LOGIN_FALLBACK_MESSAGE.to_string(),
        }
    }
}

#[derive(Clone)]
pub struct AuthGateway {
    client: Client,
    base_url: String,
    auth_endpoint: String,
    encoding: LoginEncoding,
}

impl AuthGateway {
    pub fn new(config: &Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            auth_endpoint: config.auth_endpoint.clone(),
            encoding: config.login_encoding,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn check_response(response: Response) -> Result<Response, LoginError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().await.unwrap_or_default();
        Err(LoginError::Rejected {
            status: status.as_u16(),
            detail: extract_detail(&body),
        })
    }

    /// One authentication call; returns the issued token and its lifetime hint
    pub async fn login(&self, credentials: &Credentials) -> Result<LoginResponse, LoginError> {
        credentials.validate()?;
        let url = self.url(&self.auth_endpoint);
        debug!(identifier = %credentials.identifier, encoding = ?self.encoding, "Sending login request");

        let request = self.client.post(&url);
        let request = match self.encoding {
            LoginEncoding::Json => request.json(&JsonCredentials {
                login: &credentials.identifier,
                password: &credentials.password,
            }),
            LoginEncoding::Form => request.form(&[
                ("username", credentials.identifier.as_str()),
                ("password", credentials.password.as_str()),
            ]),
        };

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "Login request failed");
                return Err(LoginError::Unreachable(e));
            }
        };
        let response = Self::check_response(response).await?;

        let login: LoginResponse = response
            .json()
            .await
            .map_err(|e| LoginError::InvalidResponse(e.to_string()))?;
        if login.access_token.is_empty() {
            return Err(LoginError::InvalidResponse("empty access_token".to_string()));
        }
        Ok(login)
    }

    /// Log in and persist the session. The record is visible to the very
    /// next read of `store`.
    pub async fn sign_in(
        &self,
        credentials: &Credentials,
        store: &dyn SessionStore,
    ) -> Result<SessionRecord, LoginError> {
        let login = self.login(credentials).await?;
        let record = store
            .save(&login.access_token, login.expires_in)
            .map_err(|e| LoginError::Storage(e.to_string()))?;
        info!(identifier = %credentials.identifier, "Login successful");
        Ok(record)
    }

    /// Create an account. Does not log in.
    pub async fn register(&self, credentials: &Credentials) -> Result<RegisteredUser, LoginError> {
        credentials.validate()?;
        let response = self
            .client
            .post(self.url(REGISTER_PATH))
            .json(&JsonCredentials {
                login: &credentials.identifier,
                password: &credentials.password,
            })
            .send()
            .await?;
        let response = Self::check_response(response).await?;
        let user: RegisteredUser = response
            .json()
            .await
            .map_err(|e| LoginError::InvalidResponse(e.to_string()))?;
        info!(login = %user.login, "Account registered");
        Ok(user)
    }
}
