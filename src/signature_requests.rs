//! Signature request operations.
//!
//! This module provides the SignatureRequestsClient for creating signature
//! requests and managing their signers.

use crate::client::Client;
use crate::error::{FieldError, Result};
use crate::types::{
    finish, require_id, CreateSignatureRequest, ListSignatureRequestsQuery, Signature,
    SignatureRequest, SignerRequest, UpdateSignatureRequest,
};
use reqwest::Method;
use serde::de::IgnoredAny;
use serde::Serialize;
use serde_json::Value;
use urlencoding::encode;

/// Client for signature request operations.
///
/// Access via `client.signature_requests()`.
pub struct SignatureRequestsClient {
    client: Client,
}

impl SignatureRequestsClient {
    pub(crate) fn new(client: Client) -> Self {
        Self { client }
    }

    /// Create a new signature request.
    ///
    /// The payload is validated locally first; an invalid payload fails with
    /// a validation error and nothing is sent.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use skribble::{Client, CreateSignatureRequest, SignerRequest};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = Client::with_credentials("api_demo_user", "api_key")?;
    ///
    ///     let request = client.signature_requests().create(CreateSignatureRequest {
    ///         title: "Employment contract".to_string(),
    ///         message: Some("Please sign".to_string()),
    ///         file_url: Some("https://pdfobject.com/pdf/sample.pdf".to_string()),
    ///         signatures: vec![SignerRequest::with_email("signer@example.com")],
    ///         ..Default::default()
    ///     }).await?;
    ///
    ///     println!("Created signature request {}", request.id);
    ///     Ok(())
    /// }
    /// ```
    pub async fn create(&self, request: CreateSignatureRequest) -> Result<SignatureRequest> {
        request.validate()?;
        self.client
            .post("create signature request", "/signature-requests", &request)
            .await
    }

    /// Get a signature request by ID.
    pub async fn get(&self, signature_request_id: &str) -> Result<SignatureRequest> {
        require_id("signature_request_id", signature_request_id)?;
        self.client
            .get(
                "get signature request",
                &format!("/signature-requests/{}", encode(signature_request_id)),
            )
            .await
    }

    /// List signature requests.
    ///
    /// Filters and page parameters are passed to the API as-is. `limit`
    /// truncates whatever the API returned.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use skribble::{Client, ListSignatureRequestsQuery};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = Client::with_access_token("eyJhbGciOi...")?;
    ///
    ///     let open = client.signature_requests().list(ListSignatureRequestsQuery {
    ///         status_overall: Some("OPEN".to_string()),
    ///         limit: Some(5),
    ///         ..Default::default()
    ///     }).await?;
    ///     println!("{} open requests", open.len());
    ///     Ok(())
    /// }
    /// ```
    pub async fn list(&self, query: ListSignatureRequestsQuery) -> Result<Vec<SignatureRequest>> {
        let mut requests: Vec<SignatureRequest> = self
            .client
            .call::<_, ()>(
                "list signature requests",
                Method::GET,
                "/signature-requests",
                &query.to_pairs(),
                None,
            )
            .await?;

        if let Some(limit) = query.limit {
            requests.truncate(limit);
        }
        Ok(requests)
    }

    /// Update fields of a signature request. Unset fields are left untouched.
    pub async fn update(
        &self,
        signature_request_id: &str,
        update: UpdateSignatureRequest,
    ) -> Result<SignatureRequest> {
        #[derive(Serialize)]
        struct Request<'a> {
            id: &'a str,
            #[serde(flatten)]
            update: &'a UpdateSignatureRequest,
        }

        require_id("signature_request_id", signature_request_id)?;
        if let Some(signers) = &update.signatures {
            check_signers(signers)?;
        }

        self.client
            .put(
                "update signature request",
                "/signature-requests",
                &Request {
                    id: signature_request_id,
                    update: &update,
                },
            )
            .await
    }

    /// Send a reminder to the signers who have not signed yet.
    pub async fn remind(&self, signature_request_id: &str) -> Result<()> {
        require_id("signature_request_id", signature_request_id)?;
        self.client
            .call::<IgnoredAny, ()>(
                "remind signers",
                Method::POST,
                &format!("/signature-requests/{}/remind", encode(signature_request_id)),
                &[],
                None,
            )
            .await?;
        Ok(())
    }

    /// Withdraw a signature request, optionally telling the signers why.
    pub async fn withdraw(&self, signature_request_id: &str, message: Option<&str>) -> Result<Value> {
        #[derive(Serialize)]
        struct Request<'a> {
            #[serde(skip_serializing_if = "Option::is_none")]
            message: Option<&'a str>,
        }

        require_id("signature_request_id", signature_request_id)?;
        self.client
            .post(
                "withdraw signature request",
                &format!("/signature-requests/{}/withdraw", encode(signature_request_id)),
                &Request { message },
            )
            .await
    }

    /// Delete a signature request.
    ///
    /// **Warning:** This operation is irreversible.
    pub async fn delete(&self, signature_request_id: &str) -> Result<Value> {
        require_id("signature_request_id", signature_request_id)?;
        self.client
            .delete(
                "delete signature request",
                &format!("/signature-requests/{}", encode(signature_request_id)),
            )
            .await
    }

    /// Add a signer to a signature request.
    ///
    /// # Example
    ///
    /// ```rust,no_run
    /// use skribble::{Client, SignerIdentityData, SignerRequest};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let client = Client::with_credentials("api_demo_user", "api_key")?;
    ///
    ///     let signer = client.signature_requests().add_signer("5c33d0cb-84aa", &SignerRequest {
    ///         signer_identity_data: Some(SignerIdentityData {
    ///             email_address: "new_signer@example.com".to_string(),
    ///             first_name: Some("John".to_string()),
    ///             last_name: Some("Doe".to_string()),
    ///             ..Default::default()
    ///         }),
    ///         ..Default::default()
    ///     }).await?;
    ///     println!("Signer ID: {:?}", signer.sid);
    ///     Ok(())
    /// }
    /// ```
    pub async fn add_signer(
        &self,
        signature_request_id: &str,
        signer: &SignerRequest,
    ) -> Result<Signature> {
        require_id("signature_request_id", signature_request_id)?;
        let mut errors = Vec::new();
        signer.check("signer", &mut errors);
        finish("invalid signer", errors)?;

        self.client
            .post(
                "add signer",
                &format!("/signature-requests/{}/signatures", encode(signature_request_id)),
                signer,
            )
            .await
    }

    /// Remove a signer from a signature request.
    pub async fn remove_signer(&self, signature_request_id: &str, signer_id: &str) -> Result<Value> {
        require_id("signature_request_id", signature_request_id)?;
        require_id("signer_id", signer_id)?;
        self.client
            .delete(
                "remove signer",
                &format!(
                    "/signature-requests/{}/signatures/{}",
                    encode(signature_request_id),
                    encode(signer_id)
                ),
            )
            .await
    }

    /// Replace all signers of a signature request.
    pub async fn replace_signers(
        &self,
        signature_request_id: &str,
        signers: Vec<SignerRequest>,
    ) -> Result<SignatureRequest> {
        #[derive(Serialize)]
        struct Request<'a> {
            id: &'a str,
            signatures: &'a [SignerRequest],
        }

        require_id("signature_request_id", signature_request_id)?;
        check_signers(&signers)?;

        self.client
            .put(
                "replace signers",
                "/signature-requests",
                &Request {
                    id: signature_request_id,
                    signatures: &signers,
                },
            )
            .await
    }
}

fn check_signers(signers: &[SignerRequest]) -> Result<()> {
    let mut errors = Vec::new();
    if signers.is_empty() {
        errors.push(FieldError::new("signatures", "at least one signer is required"));
    }
    for (i, signer) in signers.iter().enumerate() {
        signer.check(&format!("signatures[{i}]"), &mut errors);
    }
    finish("invalid signers", errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signature_requests_client_creation() {
        let client = Client::with_access_token("test_token").unwrap();
        let _requests = client.signature_requests();
    }

    #[test]
    fn test_check_signers() {
        assert!(check_signers(&[]).is_err());
        assert!(check_signers(&[SignerRequest::with_email("a@example.com")]).is_ok());

        let err = check_signers(&[
            SignerRequest::with_email("a@example.com"),
            SignerRequest::default(),
        ])
        .unwrap_err();
        assert_eq!(
            err.validation_errors()[0].field,
            "signatures[1].account_email"
        );
    }
}
