//! Boundary traits the workflow is written against.
//!
//! [`crate::BackendClient`] implements all of them over HTTP. Tests and
//! other deployments can substitute their own.

use async_trait::async_trait;
use salesdesk_core::PersistencePayload;
use salesdesk_core::catalog::{
    CompanyDirectory, DropdownOptions, LeadDetails, ProductCatalog, ProductRecord,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ClientError;

/// Result of persisting a quotation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaveOutcome {
    pub success: bool,
    #[serde(default)]
    pub message: Option<String>,
}

/// Result of storing a rendered document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadOutcome {
    pub success: bool,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// Reports the most recently issued identifier of a sequence.
#[async_trait]
pub trait LatestIdentifierSource: Send + Sync {
    async fn latest(&self, prefix: &str) -> Result<Option<String>, ClientError>;
}

/// Fetches stored quotation records.
#[async_trait]
pub trait QuotationSource: Send + Sync {
    /// The raw record for `quotation_no`, unvalidated.
    async fn fetch_quotation(&self, quotation_no: &str) -> Result<Value, ClientError>;
}

/// Persists quotations.
#[async_trait]
pub trait QuotationSink: Send + Sync {
    async fn save_quotation(&self, payload: &PersistencePayload)
    -> Result<SaveOutcome, ClientError>;
}

/// Stores rendered quotation documents.
#[async_trait]
pub trait DocumentStorage: Send + Sync {
    async fn upload_document(
        &self,
        quotation_no: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadOutcome, ClientError>;
}

/// Read-only autofill data.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn dropdowns(&self) -> Result<DropdownOptions, ClientError>;

    async fn products(&self) -> Result<Vec<ProductRecord>, ClientError>;

    async fn lead_details(&self, lead_no: &str) -> Result<LeadDetails, ClientError>;

    async fn company_directory(&self) -> Result<CompanyDirectory, ClientError> {
        Ok(CompanyDirectory::from_dropdowns(&self.dropdowns().await?))
    }

    async fn product_catalog(&self) -> Result<ProductCatalog, ClientError> {
        Ok(ProductCatalog::from_records(&self.products().await?))
    }
}
