//! # Skribble Rust SDK
//!
//! Rust client for the Skribble electronic signature API.
//!
//! Create signature requests, manage their signers and attachments, upload
//! and preview documents, and seal PDFs with an organization seal.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use skribble::{Client, CreateSignatureRequest, SignerRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Log in lazily with an API username and key
//!     let client = Client::with_credentials("api_demo_user", "api_key")?;
//!
//!     let request = client.signature_requests().create(CreateSignatureRequest {
//!         title: "Test Signature Request".to_string(),
//!         file_url: Some("https://pdfobject.com/pdf/sample.pdf".to_string()),
//!         signatures: vec![SignerRequest::with_email("signer1@example.com")],
//!         ..Default::default()
//!     }).await?;
//!
//!     println!("Created signature request: {}", request.id);
//!     Ok(())
//! }
//! ```
//!
//! ## Authentication
//!
//! A client is built either from a username and API key, in which case it
//! logs in on the first request and caches the bearer token, or from a
//! pre-issued access token, in which case it never logs in. Use
//! [`Client::init`] to log in eagerly and get the token back for reuse:
//!
//! ```rust,no_run
//! use skribble::{Client, ClientConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let (client, token) =
//!         Client::init(ClientConfig::with_credentials("api_demo_user", "api_key")).await?;
//!
//!     // Later, or in another process
//!     let reused = Client::with_access_token(token.unwrap_or_default())?;
//!     # let _ = (client, reused);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! All operations return `Result<T, SkribbleError>`:
//!
//! ```rust,no_run
//! use skribble::{Client, SkribbleError};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::with_access_token("eyJhbGciOi...")?;
//!
//!     match client.documents().get("5c33d0cb-84aa").await {
//!         Ok(doc) => println!("Document: {:?}", doc.title),
//!         Err(SkribbleError::Validation { errors, .. }) => {
//!             for e in errors {
//!                 println!("  - {}", e);
//!             }
//!         }
//!         Err(SkribbleError::Auth { message, .. }) => println!("Check configuration: {}", message),
//!         Err(SkribbleError::Api { status_code, message, .. }) => {
//!             println!("Skribble returned {:?}: {}", status_code, message)
//!         }
//!         Err(e @ SkribbleError::Operation { .. }) => println!("{}", e),
//!     }
//!     Ok(())
//! }
//! ```

pub mod attachments;
mod auth;
pub mod client;
pub mod documents;
pub mod error;
pub mod seals;
pub mod signature_requests;
pub mod types;

// Re-export main types at the crate root
pub use client::{Client, ClientConfig};
pub use documents::PreviewOptions;
pub use error::{ErrorKind, FieldError, Result, SkribbleError};

// Re-export types module for easy access
pub use types::{
    AttachmentInfo, CreateDocumentRequest, CreateSealRequest, CreateSignatureRequest, Document,
    Image, ListSignatureRequestsQuery, NewAttachment, Position, SealResponse, Signature,
    SignatureRequest, SignerIdentityData, SignerRequest, UpdateSignatureRequest, VisualSignature,
};

/// HTTP method type accepted by [`Client::request`].
pub use reqwest::Method;
