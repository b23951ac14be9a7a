//! Document operations.
//!
//! This module provides the DocumentsClient for uploading, downloading and
//! previewing documents.

use crate::client::Client;
use crate::error::{Result, SkribbleError};
use crate::types::{require_id, CreateDocumentRequest, Document};
use reqwest::Method;
use serde::de::IgnoredAny;
use std::time::Duration;
use tracing::debug;
use urlencoding::encode;

/// Polling parameters for [`DocumentsClient::preview`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreviewOptions {
    /// Scale in percent: 20 for a thumbnail, 100 for full size.
    pub scale: u32,
    /// Extra polls after the first one while the image is not ready.
    pub max_retries: u32,
    /// Pause between polls.
    pub retry_delay: Duration,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            scale: 20,
            max_retries: 5,
            retry_delay: Duration::from_secs(2),
        }
    }
}

/// Client for document operations.
///
/// Access via `client.documents()`.
pub struct DocumentsClient {
    client: Client,
}

impl DocumentsClient {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Upload a document.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use skribble::{Client, CreateDocumentRequest};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = Client::with_credentials("api_demo_user", "api_key")?;
    ///     let pdf = std::fs::read("contract.pdf")?;
    ///
    ///     let document = client
    ///         .documents()
    ///         .add(CreateDocumentRequest::from_bytes("Contract", "application/pdf", &pdf))
    ///         .await?;
    ///     println!("Uploaded {} ({:?} pages)", document.id, document.page_count);
    ///     Ok(())
    /// }
    /// ```
    pub async fn add(&self, request: CreateDocumentRequest) -> Result<Document> {
        request.validate()?;
        self.client.post("add document", "/documents", &request).await
    }

    /// Get document metadata.
    pub async fn get(&self, document_id: &str) -> Result<Document> {
        require_id("document_id", document_id)?;
        self.client
            .get("get document", &format!("/documents/{}", encode(document_id)))
            .await
    }

    /// Download the document content.
    pub async fn download(&self, document_id: &str) -> Result<Vec<u8>> {
        require_id("document_id", document_id)?;
        self.client
            .request_bytes(Method::GET, &format!("/documents/{}/content", encode(document_id)))
            .await
    }

    /// Get the preview image of a page, polling until it has been rendered.
    ///
    /// A 202 or 204 response, or an empty body, means the image is still
    /// being generated: the call sleeps `retry_delay` and polls again, at most
    /// `max_retries` more times. When every poll came back not ready, the
    /// last response (status and body) is reported as an API error. Any other failure is
    /// returned immediately.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use skribble::{Client, PreviewOptions};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = Client::with_access_token("eyJhbGciOi...")?;
    ///
    ///     let thumbnail = client
    ///         .documents()
    ///         .preview("5c33d0cb-84aa", 0, PreviewOptions::default())
    ///         .await?;
    ///     std::fs::write("page-0.png", thumbnail)?;
    ///     Ok(())
    /// }
    /// ```
    pub async fn preview(
        &self,
        document_id: &str,
        page_id: u32,
        options: PreviewOptions,
    ) -> Result<Vec<u8>> {
        require_id("document_id", document_id)?;
        let path = format!("/documents/{}/pages/{}", encode(document_id), page_id);
        let query = [("scale", options.scale.to_string())];
        let attempts = options.max_retries.saturating_add(1);

        let mut last_status = 0;
        let mut last_body = String::new();
        for attempt in 1..=attempts {
            let response = self
                .client
                .send::<()>(Method::GET, &path, &query, None)
                .await?;
            let status = response.status().as_u16();
            let bytes = response.bytes().await?;

            if status != 202 && status != 204 && !bytes.is_empty() {
                return Ok(bytes.to_vec());
            }

            debug!(document_id, page_id, attempt, status, "preview not ready");
            last_status = status;
            last_body = String::from_utf8_lossy(&bytes).into_owned();
            if attempt < attempts {
                tokio::time::sleep(options.retry_delay).await;
            }
        }

        Err(SkribbleError::api(
            format!(
                "preview of page {} not ready after {} attempts",
                page_id, attempts
            ),
            Some(last_status),
            Some(last_body),
        ))
    }

    /// Delete a document.
    pub async fn delete(&self, document_id: &str) -> Result<()> {
        require_id("document_id", document_id)?;
        self.client
            .delete::<IgnoredAny>("delete document", &format!("/documents/{}", encode(document_id)))
            .await?;
        Ok(())
    }

    /// List documents, keeping at most `limit` of them.
    pub async fn list(&self, limit: Option<usize>) -> Result<Vec<Document>> {
        let mut documents: Vec<Document> = self.client.get("list documents", "/documents").await?;
        if let Some(limit) = limit {
            documents.truncate(limit);
        }
        Ok(documents)
    }
}
