//! Authentication and session state.
//!
//! A client is either pre-authorized (built from an access token) or
//! credentialed (built from a username and API key). Credentialed clients log
//! in lazily on the first request that needs a token and cache the result in
//! the shared [`Session`]. Pre-authorized clients never log in; an expired
//! token surfaces as an API error on the call that used it.

use crate::client::{fallback_message, Client};
use crate::error::{Result, SkribbleError};
use serde::Serialize;
use tracing::{info, warn};

pub(crate) const LOGIN_PATH: &str = "/access/login";

/// Username and API key used to mint bearer tokens.
#[derive(Clone)]
pub(crate) struct Credentials {
    pub(crate) username: String,
    pub(crate) api_key: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

/// Mutable session state shared by all clones of a [`Client`].
#[derive(Debug, Default)]
pub(crate) struct Session {
    access_token: Option<String>,
}

impl Session {
    pub(crate) fn new(access_token: Option<String>) -> Self {
        Self { access_token }
    }
}

#[derive(Serialize)]
struct LoginRequest<'a> {
    username: &'a str,
    #[serde(rename = "api-key")]
    api_key: &'a str,
}

impl Client {
    /// Return the current bearer token, logging in first if none is cached.
    ///
    /// The session lock is held across the login, so concurrent callers on
    /// clones of one client trigger a single login.
    pub async fn authenticate(&self) -> Result<String> {
        let mut session = self.session.lock().await;
        if let Some(token) = &session.access_token {
            return Ok(token.clone());
        }

        let credentials = self.credentials.as_ref().ok_or_else(|| {
            SkribbleError::auth("not authenticated: no access token or credentials available")
        })?;
        let token = self.login(credentials).await?;
        session.access_token = Some(token.clone());
        Ok(token)
    }

    /// Discard the cached token and log in again with the stored credentials.
    pub async fn reauthenticate(&self) -> Result<String> {
        let credentials = self.credentials.as_ref().ok_or_else(|| {
            SkribbleError::auth("cannot log in again: client was built without credentials")
        })?;

        let mut session = self.session.lock().await;
        session.access_token = None;
        let token = self.login(credentials).await?;
        session.access_token = Some(token.clone());
        Ok(token)
    }

    /// The cached token, without making any request.
    pub async fn access_token(&self) -> Option<String> {
        self.session.lock().await.access_token.clone()
    }

    /// Returns true if a token is cached.
    pub async fn is_authenticated(&self) -> bool {
        self.session.lock().await.access_token.is_some()
    }

    /// Drop `rejected` from the session unless another caller already
    /// replaced it.
    pub(crate) async fn invalidate_token(&self, rejected: &str) {
        let mut session = self.session.lock().await;
        if session.access_token.as_deref() == Some(rejected) {
            session.access_token = None;
        }
    }

    async fn login(&self, credentials: &Credentials) -> Result<String> {
        let request = LoginRequest {
            username: &credentials.username,
            api_key: &credentials.api_key,
        };

        let response = self
            .http
            .post(self.url(LOGIN_PATH))
            .json(&request)
            .send()
            .await?;
        let status = response.status().as_u16();
        let body = response.text().await?;

        if status == 401 || status == 403 {
            warn!(username = %credentials.username, status, "login rejected");
            return Err(SkribbleError::Auth {
                message: "Invalid credentials".to_string(),
                status_code: Some(status),
            });
        }
        if !(200..300).contains(&status) {
            return Err(SkribbleError::api(
                fallback_message(status, &body),
                Some(status),
                Some(body),
            ));
        }

        let token = parse_token(&body);
        if token.is_empty() {
            return Err(SkribbleError::Auth {
                message: "login response did not contain an access token".to_string(),
                status_code: Some(status),
            });
        }

        info!(username = %credentials.username, "logged in to Skribble");
        Ok(token)
    }
}

/// The login endpoint answers with the bare token, sometimes JSON-quoted.
fn parse_token(body: &str) -> String {
    let body = body.trim();
    if body.starts_with('"') {
        if let Ok(token) = serde_json::from_str::<String>(body) {
            return token.trim().to_string();
        }
    }
    body.to_string()
}
