//! Signature request lifecycle with the Skribble SDK.
//!
//! This example demonstrates:
//! - Creating a client from environment configuration
//! - Creating a signature request with two signers
//! - Adding an attachment and a signer, removing a signer
//! - Listing, withdrawing and deleting signature requests
//!
//! Run with:
//! ```bash
//! SKRIBBLE_USERNAME=api_demo_xxx SKRIBBLE_API_KEY=xxx cargo run --example signature_workflow
//! ```

use skribble::{
    Client, ClientConfig, CreateSignatureRequest, ListSignatureRequestsQuery, NewAttachment,
    SignerIdentityData, SignerRequest, SkribbleError,
};
use tracing_subscriber::EnvFilter;

const SAMPLE_PDF_URL: &str = "https://pdfobject.com/pdf/sample.pdf";

fn signer(email: &str, first: &str, last: &str, sequence: u32) -> SignerRequest {
    SignerRequest {
        account_email: Some(email.to_string()),
        signer_identity_data: Some(SignerIdentityData {
            email_address: email.to_string(),
            first_name: Some(first.to_string()),
            last_name: Some(last.to_string()),
            language: Some("en".to_string()),
            ..Default::default()
        }),
        sequence: Some(sequence),
        ..Default::default()
    }
}

async fn run(client: &Client) -> Result<(), SkribbleError> {
    let requests = client.signature_requests();

    println!("Creating signature request...");
    let created = requests
        .create(CreateSignatureRequest {
            title: "Test Signature Request".to_string(),
            message: Some("Please sign this test document".to_string()),
            file_url: Some(SAMPLE_PDF_URL.to_string()),
            signatures: vec![
                signer("signer1@example.com", "John", "Doe", 1),
                signer("signer2@example.com", "Jane", "Smith", 2),
            ],
            ..Default::default()
        })
        .await?;
    println!("  ID: {}", created.id);

    println!("\nAdding an attachment...");
    let attachment = NewAttachment::from_bytes("notes.txt", "text/plain", b"Signing notes");
    client.attachments().add(&created.id, &[attachment]).await?;

    println!("\nAdding a signer...");
    let added = requests
        .add_signer(&created.id, &signer("newsigner@example.com", "New", "Signer", 3))
        .await?;
    println!("  Signer ID: {:?}", added.sid);

    // Remove the second signer again
    let current = requests.get(&created.id).await?;
    let to_remove = current.signatures.iter().find(|s| {
        s.account_email.as_deref() == Some("signer2@example.com")
            || s
                .signer_identity_data
                .as_ref()
                .is_some_and(|d| d.email_address == "signer2@example.com")
    });
    match to_remove.and_then(|s| s.sid.as_deref()) {
        Some(sid) => {
            requests.remove_signer(&created.id, sid).await?;
            println!("  Removed signer {}", sid);
        }
        None => println!("  Signer to remove not found"),
    }

    let attachments = client.attachments().list(&created.id).await?;
    if let Some(first) = attachments.first() {
        let content = client
            .attachments()
            .get(&created.id, &first.attachment_id)
            .await?;
        println!("\nAttachment {}: {} bytes", first.attachment_id, content.len());
        client
            .attachments()
            .delete(&created.id, &first.attachment_id)
            .await?;
    }

    let listed = requests
        .list(ListSignatureRequestsQuery {
            limit: Some(5),
            ..Default::default()
        })
        .await?;
    println!("\nListed {} signature requests", listed.len());

    println!("\nWithdrawing and deleting...");
    requests
        .withdraw(&created.id, Some("Withdrawing for testing purposes"))
        .await?;
    requests.delete(&created.id).await?;

    println!("\nDone!");
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let client = Client::with_config(ClientConfig::from_env()?)?;

    if let Err(e) = run(&client).await {
        match &e {
            SkribbleError::Validation { errors, .. } => {
                eprintln!("Validation error: {}", e);
                for field in errors {
                    eprintln!("  - {}", field);
                }
            }
            SkribbleError::Auth { .. } => eprintln!("Check SKRIBBLE_* settings: {}", e),
            SkribbleError::Api { .. } => eprintln!("Skribble rejected the call: {}", e),
            SkribbleError::Operation { operation, .. } => {
                eprintln!("Operation '{}' failed: {}", operation, e)
            }
        }
        return Err(e.into());
    }
    Ok(())
}
