//! Attachment operations.
//!
//! Attachments are extra files carried by a signature request. Uploads are
//! JSON with base64 content; downloads return the raw bytes.

use crate::client::Client;
use crate::error::Result;
use crate::types::{finish, require_id, AttachmentInfo, NewAttachment, SignatureRequest};
use reqwest::Method;
use serde::de::IgnoredAny;
use tracing::debug;
use urlencoding::encode;

/// Client for attachment operations.
///
/// Access via `client.attachments()`.
pub struct AttachmentsClient {
    client: Client,
}

impl AttachmentsClient {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Add attachments to a signature request.
    ///
    /// Issues one POST per attachment, in order, and returns the responses in
    /// the same order. All attachments are validated before the first upload;
    /// if an upload fails, the ones before it stay attached.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use skribble::{Client, NewAttachment};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = Client::with_credentials("api_demo_user", "api_key")?;
    ///     let terms = std::fs::read("terms.pdf")?;
    ///
    ///     let results = client.attachments().add("5c33d0cb-84aa", &[
    ///         NewAttachment::from_bytes("terms.pdf", "application/pdf", &terms),
    ///     ]).await?;
    ///     println!("{} attachment(s) uploaded", results.len());
    ///     Ok(())
    /// }
    /// ```
    pub async fn add(
        &self,
        signature_request_id: &str,
        attachments: &[NewAttachment],
    ) -> Result<Vec<SignatureRequest>> {
        require_id("signature_request_id", signature_request_id)?;
        let mut errors = Vec::new();
        for (i, attachment) in attachments.iter().enumerate() {
            attachment.check(&format!("attachments[{i}]"), &mut errors);
        }
        finish("invalid attachments", errors)?;

        let path = format!("/signature-requests/{}/attachments", encode(signature_request_id));
        let mut responses = Vec::with_capacity(attachments.len());
        for attachment in attachments {
            debug!(filename = %attachment.filename, "uploading attachment");
            let response: SignatureRequest =
                self.client.post("add attachment", &path, attachment).await?;
            responses.push(response);
        }
        Ok(responses)
    }

    /// Download the content of an attachment.
    pub async fn get(&self, signature_request_id: &str, attachment_id: &str) -> Result<Vec<u8>> {
        require_id("signature_request_id", signature_request_id)?;
        require_id("attachment_id", attachment_id)?;
        self.client
            .request_bytes(
                Method::GET,
                &format!(
                    "/signature-requests/{}/attachments/{}/content",
                    encode(signature_request_id),
                    encode(attachment_id)
                ),
            )
            .await
    }

    /// Remove an attachment from a signature request.
    pub async fn delete(&self, signature_request_id: &str, attachment_id: &str) -> Result<()> {
        require_id("signature_request_id", signature_request_id)?;
        require_id("attachment_id", attachment_id)?;
        self.client
            .delete::<IgnoredAny>(
                "delete attachment",
                &format!(
                    "/signature-requests/{}/attachments/{}",
                    encode(signature_request_id),
                    encode(attachment_id)
                ),
            )
            .await?;
        Ok(())
    }

    /// List the attachments of a signature request.
    pub async fn list(&self, signature_request_id: &str) -> Result<Vec<AttachmentInfo>> {
        require_id("signature_request_id", signature_request_id)?;
        let request: SignatureRequest = self
            .client
            .get(
                "list attachments",
                &format!("/signature-requests/{}", encode(signature_request_id)),
            )
            .await?;
        Ok(request.attachments)
    }
}
