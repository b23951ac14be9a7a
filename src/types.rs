//! Type definitions for the Skribble SDK.
//!
//! This module contains the request and response records for every endpoint.
//! Response records keep any field they do not model in `extra`, so nothing
//! the API returns is dropped.

use crate::error::{FieldError, Result, SkribbleError};
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Identity data of a signer.
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
pub struct SignerIdentityData {
    /// Email address of the signer.
    pub email_address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// An image used in a visual signature.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Image {
    /// MIME type, e.g. "image/png".
    pub content_type: String,
    /// Base64-encoded image data.
    pub content: String,
}

/// Placement of a visual signature on a page.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct Position {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Page index as a string, starting at "0".
    pub page: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<f64>,
}

/// A visual signature: where it goes and what it looks like.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
pub struct VisualSignature {
    pub position: Position,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<Image>,
}

/// A signer to attach to a signature request.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct SignerRequest {
    /// Skribble account email of the signer.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_email: Option<String>,
    /// Identity data for signers without a Skribble account.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signer_identity_data: Option<SignerIdentityData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visual_signature: Option<VisualSignature>,
    /// Position of the signer in the signing sequence.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notify: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl SignerRequest {
    /// A signer identified by account email only.
    pub fn with_email(email: impl Into<String>) -> Self {
        Self {
            account_email: Some(email.into()),
            ..Default::default()
        }
    }

    pub(crate) fn check(&self, field: &str, errors: &mut Vec<FieldError>) {
        let has_account = self
            .account_email
            .as_deref()
            .is_some_and(|e| !e.trim().is_empty());
        let has_identity = self
            .signer_identity_data
            .as_ref()
            .is_some_and(|d| !d.email_address.trim().is_empty());
        if !has_account && !has_identity {
            errors.push(FieldError::new(
                format!("{field}.account_email"),
                "signer needs an account_email or signer_identity_data.email_address",
            ));
        }
        if let Some(visual) = &self.visual_signature {
            visual.position.check(&format!("{field}.visual_signature.position"), errors);
        }
    }
}

impl Position {
    fn check(&self, field: &str, errors: &mut Vec<FieldError>) {
        if self.width <= 0.0 {
            errors.push(FieldError::new(format!("{field}.width"), "must be positive"));
        }
        if self.height <= 0.0 {
            errors.push(FieldError::new(format!("{field}.height"), "must be positive"));
        }
    }
}

/// A signer as reported by the API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Signature {
    /// Signer ID, used to remove the signer later.
    #[serde(default)]
    pub sid: Option<String>,
    #[serde(default)]
    pub account_email: Option<String>,
    #[serde(default)]
    pub signer_identity_data: Option<SignerIdentityData>,
    #[serde(default)]
    pub sequence: Option<u32>,
    #[serde(default)]
    pub notify: Option<bool>,
    /// Signing state, e.g. "OPEN" or "SIGNED".
    #[serde(default)]
    pub status_code: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// An attachment entry of a signature request.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AttachmentInfo {
    pub attachment_id: String,
    #[serde(default)]
    pub filename: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// A signature request.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SignatureRequest {
    /// Unique signature request identifier.
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    /// ID of the document being signed.
    #[serde(default)]
    pub document_id: Option<String>,
    #[serde(default)]
    pub legislation: Option<String>,
    #[serde(default)]
    pub quality: Option<String>,
    /// Overall status, e.g. "OPEN", "SIGNED", "WITHDRAWN".
    #[serde(default)]
    pub status_overall: Option<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub signatures: Vec<Signature>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub attachments: Vec<AttachmentInfo>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub cc_email_addresses: Vec<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Request to create a signature request.
///
/// The document comes from exactly one of `content`, `file_url` or
/// `document_id`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateSignatureRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// Base64-encoded PDF.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub legislation: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quality: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cc_email_addresses: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_success_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_error_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_update_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub write_access: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub signatures: Vec<SignerRequest>,
}

impl CreateSignatureRequest {
    /// Check the payload before it is sent.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        require_text("title", &self.title, &mut errors);
        if self.content.is_none() && self.file_url.is_none() && self.document_id.is_none() {
            errors.push(FieldError::new(
                "content",
                "one of content, file_url or document_id is required",
            ));
        }
        if let Some(content) = &self.content {
            require_base64("content", content, &mut errors);
        }
        for (i, signer) in self.signatures.iter().enumerate() {
            signer.check(&format!("signatures[{i}]"), &mut errors);
        }
        finish("invalid signature request", errors)
    }
}

/// Partial update of a signature request. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize)]
pub struct UpdateSignatureRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cc_email_addresses: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_success_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_error_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_update_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub write_access: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signatures: Option<Vec<SignerRequest>>,
}

/// Filters for listing signature requests.
#[derive(Debug, Clone, Default)]
pub struct ListSignatureRequestsQuery {
    pub account_email: Option<String>,
    /// Free-text search.
    pub search: Option<String>,
    pub signature_status: Option<String>,
    pub status_overall: Option<String>,
    pub page_number: Option<u32>,
    pub page_size: Option<u32>,
    /// Truncate the returned list to at most this many entries.
    pub limit: Option<usize>,
}

impl ListSignatureRequestsQuery {
    pub(crate) fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut params = Vec::new();
        if let Some(v) = &self.account_email {
            params.push(("account_email", v.clone()));
        }
        if let Some(v) = &self.search {
            params.push(("search", v.clone()));
        }
        if let Some(v) = &self.signature_status {
            params.push(("signature_status", v.clone()));
        }
        if let Some(v) = &self.status_overall {
            params.push(("status_overall", v.clone()));
        }
        if let Some(v) = self.page_number {
            params.push(("page_number", v.to_string()));
        }
        if let Some(v) = self.page_size {
            params.push(("page_size", v.to_string()));
        }
        params
    }
}

/// A file to attach to a signature request.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct NewAttachment {
    pub filename: String,
    pub content_type: String,
    /// Base64-encoded file content.
    pub content: String,
}

impl NewAttachment {
    /// Build an attachment from raw bytes.
    pub fn from_bytes(
        filename: impl Into<String>,
        content_type: impl Into<String>,
        bytes: &[u8],
    ) -> Self {
        Self {
            filename: filename.into(),
            content_type: content_type.into(),
            content: BASE64.encode(bytes),
        }
    }

    pub(crate) fn check(&self, field: &str, errors: &mut Vec<FieldError>) {
        require_text(&format!("{field}.filename"), &self.filename, errors);
        require_text(&format!("{field}.content_type"), &self.content_type, errors);
        require_base64(&format!("{field}.content"), &self.content, errors);
    }
}

/// Document metadata.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Document {
    /// Unique document identifier.
    pub id: String,
    #[serde(default)]
    pub parent_id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    /// Size in bytes.
    #[serde(default)]
    pub size: Option<u64>,
    #[serde(default)]
    pub page_count: Option<u32>,
    #[serde(default)]
    pub page_width: Option<f64>,
    #[serde(default)]
    pub page_height: Option<f64>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Request to upload a document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateDocumentRequest {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content_type: Option<String>,
    /// Base64-encoded document content.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub write_access: Vec<String>,
}

impl CreateDocumentRequest {
    /// Build an upload request from raw bytes.
    pub fn from_bytes(
        title: impl Into<String>,
        content_type: impl Into<String>,
        bytes: &[u8],
    ) -> Self {
        Self {
            title: title.into(),
            content_type: Some(content_type.into()),
            content: Some(BASE64.encode(bytes)),
            ..Default::default()
        }
    }

    /// Check the payload before it is sent.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        require_text("title", &self.title, &mut errors);
        match (&self.content, &self.file_url) {
            (None, None) => errors.push(FieldError::new(
                "content",
                "one of content or file_url is required",
            )),
            (Some(content), _) => require_base64("content", content, &mut errors),
            _ => {}
        }
        finish("invalid document", errors)
    }
}

/// Request to seal a document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CreateSealRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    /// Base64-encoded PDF to seal.
    pub content: String,
    /// Name of the seal account set up for the organization.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visual_signature: Option<VisualSignature>,
}

impl CreateSealRequest {
    /// Check the payload before it is sent.
    pub fn validate(&self) -> Result<()> {
        let mut errors = Vec::new();
        if self.content.is_empty() {
            errors.push(FieldError::new("content", "must not be empty"));
        } else {
            require_base64("content", &self.content, &mut errors);
        }
        if let Some(name) = &self.account_name {
            require_text("account_name", name, &mut errors);
        }
        if let Some(visual) = &self.visual_signature {
            visual.position.check("visual_signature.position", &mut errors);
        }
        finish("invalid seal", errors)
    }
}

/// Result of a seal operation. The sealed PDF is a new document.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SealResponse {
    pub document_id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Read a list the API may send as `null` as an empty list.
fn null_as_empty<'de, D, T>(deserializer: D) -> std::result::Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Reject blank identifiers before they end up in a request path.
pub(crate) fn require_id(field: &str, value: &str) -> Result<()> {
    let mut errors = Vec::new();
    require_text(field, value, &mut errors);
    finish("invalid identifier", errors)
}

pub(crate) fn require_text(field: &str, value: &str, errors: &mut Vec<FieldError>) {
    if value.trim().is_empty() {
        errors.push(FieldError::new(field, "must not be empty"));
    }
}

fn require_base64(field: &str, value: &str, errors: &mut Vec<FieldError>) {
    if BASE64.decode(value.trim()).is_err() {
        errors.push(FieldError::new(field, "is not valid base64"));
    }
}

pub(crate) fn finish(message: &str, errors: Vec<FieldError>) -> Result<()> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(SkribbleError::validation(message, errors))
    }
}
