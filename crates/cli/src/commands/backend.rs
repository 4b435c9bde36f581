//! Commands that talk to the quotation backend.
//!
//! # Environment Variables
//!
//! See [`salesdesk_client::ClientConfig`]; `SALESDESK_API_URL` is required.

use salesdesk_client::{BackendClient, ClientConfig, LatestIdentifierSource, QuotationDesk};

use super::emit;

/// The latest identifier the backend reports for `prefix`.
pub async fn latest(prefix: &str) -> Result<Option<String>, Box<dyn std::error::Error>> {
    let config = ClientConfig::from_env()?;
    let client = BackendClient::new(&config)?;
    let latest = client.latest(prefix.trim()).await?;
    tracing::info!(prefix, latest = ?latest, "Fetched latest identifier");
    Ok(latest)
}

/// Load a quotation for revision and print the recomputed document.
pub async fn revise(quotation_no: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = ClientConfig::from_env()?;
    tracing::debug!(?config, "Loaded configuration");
    let desk = QuotationDesk::from_config(&config)?;
    let revision = desk.revise(quotation_no.trim()).await?;
    let warnings: Vec<String> = revision.warnings.iter().map(ToString::to_string).collect();
    emit(&serde_json::json!({
        "document": revision.document,
        "warnings": warnings,
    }))?;
    Ok(())
}
