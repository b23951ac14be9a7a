//! Seal operations.
//!
//! A seal is an organization stamp applied by the server. The sealed PDF is
//! stored as a new document; use the returned `document_id` with the
//! documents client to download or delete it.

use crate::client::Client;
use crate::error::Result;
use crate::types::{CreateSealRequest, SealResponse};

/// Client for seal operations.
///
/// Access via `client.seals()`.
pub struct SealsClient {
    client: Client,
}

impl SealsClient {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Seal a document, optionally with a visual signature.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use skribble::{Client, CreateSealRequest, Image, Position, VisualSignature};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = Client::with_credentials("api_demo_user", "api_key")?;
    ///
    ///     let sealed = client.seals().create(CreateSealRequest {
    ///         content: "JVBERi0xLjQ=".to_string(),
    ///         visual_signature: Some(VisualSignature {
    ///             position: Position {
    ///                 x: 20.0,
    ///                 y: 20.0,
    ///                 width: 260.0,
    ///                 height: 120.0,
    ///                 page: "0".to_string(),
    ///                 rotation: None,
    ///             },
    ///             image: Some(Image {
    ///                 content_type: "image/png".to_string(),
    ///                 content: "iVBORw0KGgo=".to_string(),
    ///             }),
    ///         }),
    ///         ..Default::default()
    ///     }).await?;
    ///     println!("Sealed document: {}", sealed.document_id);
    ///     Ok(())
    /// }
    /// ```
    pub async fn create(&self, request: CreateSealRequest) -> Result<SealResponse> {
        request.validate()?;
        self.client.post("create seal", "/seal", &request).await
    }

    /// Seal a document with a named seal account of the organization.
    ///
    /// # Arguments
    ///
    /// * `content` - Base64-encoded PDF
    /// * `account_name` - Seal account Skribble set up for the organization
    pub async fn create_specific(
        &self,
        content: impl Into<String>,
        account_name: Option<&str>,
    ) -> Result<SealResponse> {
        let request = CreateSealRequest {
            content: content.into(),
            account_name: account_name.map(str::to_string),
            ..Default::default()
        };
        request.validate()?;
        self.client
            .post("create specific seal", "/seal", &request)
            .await
    }
}
