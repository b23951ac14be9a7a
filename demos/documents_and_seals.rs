//! Documents and seals with the Skribble SDK.
//!
//! This example demonstrates:
//! - Logging in eagerly and printing the reusable token
//! - Uploading, inspecting, downloading and previewing a document
//! - Sealing a PDF and cleaning up the sealed document
//!
//! Run with:
//! ```bash
//! SKRIBBLE_USERNAME=api_demo_xxx SKRIBBLE_API_KEY=xxx cargo run --example documents_and_seals -- contract.pdf
//! ```

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use skribble::{Client, ClientConfig, CreateDocumentRequest, CreateSealRequest, PreviewOptions};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let pdf_path = std::env::args()
        .nth(1)
        .ok_or("usage: documents_and_seals <file.pdf>")?;
    let pdf = std::fs::read(&pdf_path)?;

    let (client, token) = Client::init(ClientConfig::from_env()?).await?;
    if let Some(token) = token {
        println!("Logged in; token can be reused via SKRIBBLE_ACCESS_TOKEN ({} chars)", token.len());
    }

    // Upload
    println!("\nUploading {}...", pdf_path);
    let document = client
        .documents()
        .add(CreateDocumentRequest::from_bytes("Test Document", "application/pdf", &pdf))
        .await?;
    println!("  ID:    {}", document.id);
    println!("  Pages: {:?}", document.page_count);

    let metadata = client.documents().get(&document.id).await?;
    println!("  Size:  {:?} bytes", metadata.size);

    let downloaded = client.documents().download(&document.id).await?;
    println!("\nDownloaded {} bytes (matches upload: {})", downloaded.len(), downloaded == pdf);

    let preview = client
        .documents()
        .preview(&document.id, 0, PreviewOptions::default())
        .await?;
    println!("Preview image: {} bytes", preview.len());

    client.documents().delete(&document.id).await?;
    println!("Document deleted");

    let documents = client.documents().list(Some(5)).await?;
    println!("\nFirst {} documents:", documents.len());
    for doc in &documents {
        println!("  - {} ({:?})", doc.id, doc.title);
    }

    // Seal
    println!("\nSealing...");
    let sealed = client
        .seals()
        .create(CreateSealRequest {
            title: Some("Sealed copy".to_string()),
            content: BASE64.encode(&pdf),
            ..Default::default()
        })
        .await?;
    println!("  Sealed document: {}", sealed.document_id);

    client.documents().delete(&sealed.document_id).await?;
    println!("  Sealed document deleted");

    println!("\nDone!");
    Ok(())
}
