//! Skribble API client.
//!
//! The main entry point for interacting with the Skribble API. Every resource
//! client funnels its calls through [`Client::request`] or
//! [`Client::request_bytes`], which attach the bearer token, obtaining one
//! first if needed, and translate failures into [`SkribbleError`].

use crate::attachments::AttachmentsClient;
use crate::auth::{Credentials, Session};
use crate::documents::DocumentsClient;
use crate::error::{FieldError, Result, SkribbleError};
use crate::seals::SealsClient;
use crate::signature_requests::SignatureRequestsClient;
use reqwest::{header, Client as HttpClient, Method, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

pub(crate) const DEFAULT_BASE_URL: &str = "https://api.skribble.com/v2";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Skribble API client.
///
/// Cloning is cheap. Clones share one session, so a token obtained through
/// one handle is used by all of them.
///
/// # Example
///
/// ```rust,no_run
/// use skribble::Client;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = Client::with_credentials("api_demo_user", "api_key")?;
///
///     // The first call logs in and caches the token
///     let request = client.signature_requests().get("5c33d0cb-84aa").await?;
///     println!("{:?}", request.status_overall);
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Client {
    pub(crate) http: HttpClient,
    pub(crate) base_url: String,
    pub(crate) credentials: Option<Credentials>,
    pub(crate) session: Arc<Mutex<Session>>,
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

/// Configuration options for the client.
///
/// A usable configuration carries an access token, or both a username and
/// an API key. When both forms are present the token is used for requests
/// and the credentials are kept for logging in again.
#[derive(Clone, Default)]
pub struct ClientConfig {
    /// Base URL for the API (default: https://api.skribble.com/v2).
    pub base_url: Option<String>,
    /// API username.
    pub username: Option<String>,
    /// API key belonging to `username`.
    pub api_key: Option<String>,
    /// Pre-issued bearer token.
    pub access_token: Option<String>,
    /// Request timeout (default: 30 seconds).
    pub timeout: Option<Duration>,
    /// User-Agent header value.
    pub user_agent: Option<String>,
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("username", &self.username)
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl ClientConfig {
    /// Configuration that logs in with a username and API key.
    pub fn with_credentials(username: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            username: Some(username.into()),
            api_key: Some(api_key.into()),
            ..Default::default()
        }
    }

    /// Configuration that uses a pre-issued access token.
    pub fn with_access_token(token: impl Into<String>) -> Self {
        Self {
            access_token: Some(token.into()),
            ..Default::default()
        }
    }

    /// Override the base URL.
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Override the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Read configuration from `SKRIBBLE_*` environment variables.
    ///
    /// Recognized: `SKRIBBLE_BASE_URL`, `SKRIBBLE_USERNAME`,
    /// `SKRIBBLE_API_KEY`, `SKRIBBLE_ACCESS_TOKEN`, `SKRIBBLE_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub(crate) fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let timeout = match var("SKRIBBLE_TIMEOUT_SECS") {
            Some(raw) => {
                let secs = raw.trim().parse::<u64>().map_err(|_| {
                    SkribbleError::validation(
                        "invalid client configuration",
                        vec![FieldError::new(
                            "SKRIBBLE_TIMEOUT_SECS",
                            format!("expected a number of seconds, got '{raw}'"),
                        )],
                    )
                })?;
                Some(Duration::from_secs(secs))
            }
            None => None,
        };

        Ok(Self {
            base_url: var("SKRIBBLE_BASE_URL"),
            username: var("SKRIBBLE_USERNAME"),
            api_key: var("SKRIBBLE_API_KEY"),
            access_token: var("SKRIBBLE_ACCESS_TOKEN"),
            timeout,
            user_agent: None,
        })
    }

    fn has_access_token(&self) -> bool {
        self.access_token
            .as_deref()
            .is_some_and(|t| !t.trim().is_empty())
    }
}

impl Client {
    /// Create a client that logs in with a username and API key.
    ///
    /// No request is made until the first API call.
    pub fn with_credentials(username: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig::with_credentials(username, api_key))
    }

    /// Create a client from a pre-issued access token. It never logs in.
    pub fn with_access_token(token: impl Into<String>) -> Result<Self> {
        Self::with_config(ClientConfig::with_access_token(token))
    }

    /// Create a new Skribble client with custom configuration.
    ///
    /// Fails with an authentication error when the configuration carries
    /// neither an access token nor a username/API key pair.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use skribble::{Client, ClientConfig};
    /// use std::time::Duration;
    ///
    /// let client = Client::with_config(
    ///     ClientConfig::with_credentials("api_demo_user", "api_key")
    ///         .base_url("https://api.scribble.test/v2")
    ///         .timeout(Duration::from_secs(60)),
    /// )
    /// .unwrap();
    /// ```
    pub fn with_config(config: ClientConfig) -> Result<Self> {
        let access_token = if config.has_access_token() {
            config.access_token.clone()
        } else {
            None
        };
        let credentials = match (config.username, config.api_key) {
            (Some(username), Some(api_key))
                if !username.trim().is_empty() && !api_key.trim().is_empty() =>
            {
                Some(Credentials { username, api_key })
            }
            _ => None,
        };
        if access_token.is_none() && credentials.is_none() {
            return Err(SkribbleError::auth(
                "either an access token or a username and API key are required",
            ));
        }

        let timeout = config
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        let user_agent = config
            .user_agent
            .unwrap_or_else(|| format!("skribble-rust/{}", env!("CARGO_PKG_VERSION")));

        let http = HttpClient::builder()
            .timeout(timeout)
            .user_agent(user_agent)
            .build()
            .map_err(|e| SkribbleError::operation("build http client", e))?;

        let base_url = config
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        Ok(Self {
            http,
            base_url,
            credentials,
            session: Arc::new(Mutex::new(Session::new(access_token))),
        })
    }

    /// Create a client and authenticate it right away.
    ///
    /// Returns the freshly minted token when the client logged in with
    /// credentials, so callers can persist it, and `None` when an access
    /// token was supplied (no request is made in that case).
    pub async fn init(config: ClientConfig) -> Result<(Self, Option<String>)> {
        let token_supplied = config.has_access_token();
        let client = Self::with_config(config)?;
        if token_supplied {
            return Ok((client, None));
        }
        let token = client.authenticate().await?;
        Ok((client, Some(token)))
    }

    /// Get the base URL for the API.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Signature request operations.
    pub fn signature_requests(&self) -> SignatureRequestsClient {
        SignatureRequestsClient::new(self.clone())
    }

    /// Attachment operations.
    pub fn attachments(&self) -> AttachmentsClient {
        AttachmentsClient::new(self.clone())
    }

    /// Document operations.
    pub fn documents(&self) -> DocumentsClient {
        DocumentsClient::new(self.clone())
    }

    /// Seal operations.
    pub fn seals(&self) -> SealsClient {
        SealsClient::new(self.clone())
    }

    /// Send an authorized request and return the parsed JSON payload.
    ///
    /// An empty 2xx body yields `Value::Null`.
    pub async fn request<B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<Value>
    where
        B: Serialize + ?Sized,
    {
        self.request_with_query(method, path, &[], body).await
    }

    /// Send an authorized request and return the raw response bytes.
    pub async fn request_bytes(&self, method: Method, path: &str) -> Result<Vec<u8>> {
        let response = self.send::<()>(method, path, &[], None).await?;
        Ok(response.bytes().await?.to_vec())
    }

    pub(crate) async fn request_with_query<B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<Value>
    where
        B: Serialize + ?Sized,
    {
        let response = self.send(method, path, query, body).await?;
        let status = response.status().as_u16();
        let text = response.text().await?;
        parse_json_body(status, text)
    }

    /// Dispatch a request and decode the payload into `T`.
    ///
    /// A payload that does not match `T` is reported as an operation error
    /// named after `operation`.
    pub(crate) async fn call<T, B>(
        &self,
        operation: &str,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let value = self.request_with_query(method, path, query, body).await?;
        decode(operation, value)
    }

    /// Make an authenticated GET request.
    pub(crate) async fn get<T: DeserializeOwned>(&self, operation: &str, path: &str) -> Result<T> {
        self.call::<T, ()>(operation, Method::GET, path, &[], None)
            .await
    }

    /// Make an authenticated POST request.
    pub(crate) async fn post<T, B>(&self, operation: &str, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.call(operation, Method::POST, path, &[], Some(body))
            .await
    }

    /// Make an authenticated PUT request.
    pub(crate) async fn put<T, B>(&self, operation: &str, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.call(operation, Method::PUT, path, &[], Some(body))
            .await
    }

    /// Make an authenticated DELETE request.
    pub(crate) async fn delete<T: DeserializeOwned>(&self, operation: &str, path: &str) -> Result<T> {
        self.call::<T, ()>(operation, Method::DELETE, path, &[], None)
            .await
    }

    /// Send an authorized request, returning the response only if it is 2xx.
    pub(crate) async fn send<B>(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<reqwest::Response>
    where
        B: Serialize + ?Sized,
    {
        let token = self.authenticate().await?;
        let url = self.url(path);

        let mut request = self
            .http
            .request(method.clone(), &url)
            .header(header::AUTHORIZATION, format!("Bearer {}", token));
        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!(%method, path, status = status.as_u16(), "skribble request");

        if status.is_success() {
            Ok(response)
        } else {
            Err(self.parse_error(response, &token).await)
        }
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn parse_error(&self, response: reqwest::Response, token: &str) -> SkribbleError {
        let status = response.status().as_u16();
        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => return e.into(),
        };

        // A rejected token is dropped so the next call logs in again.
        if status == 401 && self.credentials.is_some() {
            warn!("request rejected with 401, discarding cached access token");
            self.invalidate_token(token).await;
        }

        classify_failure(status, body)
    }
}

/// Decode a JSON payload, naming the operation on mismatch.
pub(crate) fn decode<T: DeserializeOwned>(operation: &str, value: Value) -> Result<T> {
    serde_json::from_value(value).map_err(|e| SkribbleError::operation(operation, e))
}

fn parse_json_body(status: u16, text: String) -> Result<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    match serde_json::from_str(&text) {
        Ok(value) => Ok(value),
        Err(e) => Err(SkribbleError::Api {
            message: format!("invalid JSON in response: {e}"),
            status_code: Some(status),
            body: Some(text),
            source: Some(Box::new(e)),
        }),
    }
}

/// Map a non-2xx response of a regular (non-login) call to an error.
///
/// 400 and 422 are validation failures; everything else is an API error.
pub(crate) fn classify_failure(status: u16, body: String) -> SkribbleError {
    let json: Option<Value> = serde_json::from_str(&body).ok();
    let message = json
        .as_ref()
        .and_then(server_message)
        .unwrap_or_else(|| fallback_message(status, &body));

    if status == 400 || status == 422 {
        let errors = json.as_ref().map(field_errors).unwrap_or_default();
        return SkribbleError::Validation {
            message,
            errors,
            status_code: Some(status),
        };
    }

    SkribbleError::Api {
        message,
        status_code: Some(status),
        body: Some(body),
        source: None,
    }
}

pub(crate) fn fallback_message(status: u16, body: &str) -> String {
    let body = body.trim();
    if !body.is_empty() {
        return body.to_string();
    }
    StatusCode::from_u16(status)
        .ok()
        .and_then(|s| s.canonical_reason())
        .unwrap_or("request failed")
        .to_string()
}

fn server_message(value: &Value) -> Option<String> {
    let text = |v: &Value| v.as_str().map(str::to_string);
    value
        .get("message")
        .and_then(text)
        .or_else(|| match value.get("error") {
            Some(Value::Object(inner)) => inner.get("message").and_then(text),
            Some(other) => text(other),
            None => None,
        })
}

fn field_errors(value: &Value) -> Vec<FieldError> {
    let list = value
        .get("errors")
        .or_else(|| value.get("validation_errors"));

    match list {
        Some(Value::Array(items)) => items.iter().filter_map(field_error).collect(),
        Some(Value::Object(map)) => map
            .iter()
            .map(|(field, message)| FieldError::new(field.clone(), flatten_message(message)))
            .collect(),
        _ => Vec::new(),
    }
}

fn field_error(item: &Value) -> Option<FieldError> {
    match item {
        Value::String(message) => Some(FieldError::new("", message.clone())),
        Value::Object(map) => {
            let field = ["field", "path", "property"]
                .iter()
                .find_map(|k| map.get(*k).and_then(Value::as_str))
                .unwrap_or_default();
            let message = map.get("message").map(flatten_message)?;
            Some(FieldError::new(field, message))
        }
        _ => None,
    }
}

fn flatten_message(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(flatten_message)
            .collect::<Vec<_>>()
            .join(", "),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_client_with_credentials() {
        let client = Client::with_credentials("api_user", "secret").unwrap();
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
        assert!(client.credentials.is_some());
    }

    #[test]
    fn test_client_with_config_trims_base_url() {
        let client = Client::with_config(
            ClientConfig::with_access_token("token").base_url("https://custom.api.com/v2/"),
        )
        .unwrap();
        assert_eq!(client.base_url(), "https://custom.api.com/v2");
        assert_eq!(client.url("/documents"), "https://custom.api.com/v2/documents");
    }

    #[test]
    fn test_config_without_credentials_is_rejected() {
        let err = Client::with_config(ClientConfig::default()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Auth);

        // A username alone is not enough
        let partial = ClientConfig {
            username: Some("api_user".to_string()),
            ..Default::default()
        };
        assert!(Client::with_config(partial).is_err());

        let blank_token = ClientConfig::with_access_token("  ");
        assert!(Client::with_config(blank_token).is_err());
    }

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert!(config.base_url.is_none());
        assert!(config.timeout.is_none());
        assert!(config.user_agent.is_none());
    }

    #[test]
    fn test_config_debug_redacts_secrets() {
        let config = ClientConfig {
            access_token: Some("eyJsecret".to_string()),
            ..ClientConfig::with_credentials("api_user", "topsecret")
        };
        let printed = format!("{:?}", config);
        assert!(printed.contains("api_user"));
        assert!(!printed.contains("topsecret"));
        assert!(!printed.contains("eyJsecret"));
    }

    #[test]
    fn test_config_from_lookup() {
        let config = ClientConfig::from_lookup(|name| match name {
            "SKRIBBLE_USERNAME" => Some("api_user".to_string()),
            "SKRIBBLE_API_KEY" => Some("secret".to_string()),
            "SKRIBBLE_TIMEOUT_SECS" => Some("45".to_string()),
            "SKRIBBLE_ACCESS_TOKEN" => Some("".to_string()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.username.as_deref(), Some("api_user"));
        assert_eq!(config.timeout, Some(Duration::from_secs(45)));
        assert!(config.access_token.is_none());
        assert!(config.base_url.is_none());

        let err = ClientConfig::from_lookup(|name| {
            (name == "SKRIBBLE_TIMEOUT_SECS").then(|| "soon".to_string())
        })
        .unwrap_err();
        assert_eq!(err.validation_errors()[0].field, "SKRIBBLE_TIMEOUT_SECS");
    }

    #[test]
    fn test_classify_validation_failure() {
        let body = r#"{"message":"Invalid request","errors":[{"field":"title","message":"must not be blank"}]}"#;
        let err = classify_failure(400, body.to_string());
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.status_code(), Some(400));
        assert_eq!(
            err.validation_errors(),
            &[FieldError::new("title", "must not be blank")]
        );
    }

    #[test]
    fn test_classify_validation_map() {
        let body = r#"{"errors":{"signatures[0].account_email":["is required","must be an email"]}}"#;
        let err = classify_failure(422, body.to_string());
        assert_eq!(err.validation_errors()[0].field, "signatures[0].account_email");
        assert_eq!(
            err.validation_errors()[0].message,
            "is required, must be an email"
        );
    }

    #[test]
    fn test_classify_api_failure() {
        let err = classify_failure(404, r#"{"error":"Not found"}"#.to_string());
        assert_eq!(err.kind(), ErrorKind::Api);
        assert_eq!(err.to_string(), "API error (404): Not found");
        assert_eq!(err.body(), Some(r#"{"error":"Not found"}"#));

        let plain = classify_failure(500, "".to_string());
        assert_eq!(plain.to_string(), "API error (500): Internal Server Error");

        // 401 on a regular call stays an API error
        let unauthorized = classify_failure(401, "token expired".to_string());
        assert_eq!(unauthorized.kind(), ErrorKind::Api);
    }

    #[test]
    fn test_parse_json_body() {
        assert_eq!(parse_json_body(204, String::new()).unwrap(), Value::Null);
        assert_eq!(
            parse_json_body(200, r#"{"id":"1"}"#.to_string()).unwrap()["id"],
            "1"
        );

        let err = parse_json_body(200, "<html>".to_string()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Api);
        assert_eq!(err.body(), Some("<html>"));
    }

    #[test]
    fn test_decode_mismatch_is_operation_error() {
        let err = decode::<crate::types::Document>("get document", serde_json::json!([1, 2]))
            .unwrap_err();
        assert_eq!(err.operation_name(), Some("get document"));
    }
}
