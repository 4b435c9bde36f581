//! The quotation workflow: create, revise, autofill, save.

use chrono::NaiveDate;
use salesdesk_core::raw::RawQuotationRecord;
use salesdesk_core::{QuotationDocument, Revision, reconstruct, to_persistence_payload};
use tracing::{info, instrument, warn};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::http::BackendClient;
use crate::issuer::{SequenceIssuer, SequenceStore, UnguardedSequenceStore};
use crate::ports::{CatalogSource, DocumentStorage, QuotationSink, QuotationSource};

/// Ties a backend to a number issuer.
#[derive(Debug)]
pub struct QuotationDesk<B, S> {
    backend: B,
    issuer: SequenceIssuer<S>,
    prefix: String,
}

impl QuotationDesk<BackendClient, UnguardedSequenceStore<BackendClient>> {
    /// A desk talking to the configured backend.
    ///
    /// The backend cannot claim numbers conditionally, so issuance goes
    /// through an [`UnguardedSequenceStore`].
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client cannot be built.
    pub fn from_config(config: &ClientConfig) -> Result<Self, ClientError> {
        let backend = BackendClient::new(config)?;
        let issuer = SequenceIssuer::new(
            UnguardedSequenceStore::new(backend.clone()),
            config.sequences.clone(),
            config.claim_attempts,
        );
        Ok(Self::new(backend, issuer, &config.quotation_prefix))
    }
}

impl<B, S> QuotationDesk<B, S>
where
    B: QuotationSource + QuotationSink + DocumentStorage + CatalogSource,
    S: SequenceStore,
{
    #[must_use]
    pub fn new(backend: B, issuer: SequenceIssuer<S>, prefix: &str) -> Self {
        Self {
            backend,
            issuer,
            prefix: prefix.to_string(),
        }
    }

    #[must_use]
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    #[must_use]
    pub const fn issuer(&self) -> &SequenceIssuer<S> {
        &self.issuer
    }

    /// An empty quotation with the next number, dated `today`.
    ///
    /// # Errors
    ///
    /// Returns error if no number could be issued.
    #[instrument(skip(self))]
    pub async fn new_quotation(&self, today: NaiveDate) -> Result<QuotationDocument, ClientError> {
        let quotation_no = self.issuer.issue(&self.prefix).await?;
        info!(%quotation_no, "Started quotation");
        Ok(QuotationDocument::new(quotation_no, today))
    }

    /// Load a stored quotation for revision.
    ///
    /// Totals are recomputed; warnings about the stored record are logged
    /// by the loader and returned alongside the document.
    ///
    /// # Errors
    ///
    /// Returns error only if the record cannot be fetched.
    #[instrument(skip(self))]
    pub async fn revise(&self, quotation_no: &str) -> Result<Revision, ClientError> {
        let record = self.backend.fetch_quotation(quotation_no).await?;
        let revision = reconstruct(&RawQuotationRecord::from_value(&record));
        info!(
            quotation_no,
            warnings = revision.warnings.len(),
            grand_total = %revision.document.totals().grand_total,
            "Loaded quotation for revision"
        );
        Ok(revision)
    }

    /// Fill the consignee and items from a lead.
    ///
    /// # Errors
    ///
    /// Returns error if the lead or the catalogs cannot be fetched.
    #[instrument(skip(self, document), fields(quotation_no = %document.quotation_no()))]
    pub async fn apply_lead(
        &self,
        document: &mut QuotationDocument,
        lead_no: &str,
    ) -> Result<(), ClientError> {
        let lead = self.backend.lead_details(lead_no).await?;
        let catalog = self.backend.product_catalog().await?;
        let directory = self.backend.company_directory().await?;
        document.apply_all(lead.edits(&catalog, &directory))?;
        info!(lead_no, items = document.items().len(), "Applied lead");
        Ok(())
    }

    /// Fill the consignee from the company directory.
    ///
    /// Returns `false` if the company is not listed.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be fetched.
    #[instrument(skip(self, document))]
    pub async fn apply_company(
        &self,
        document: &mut QuotationDocument,
        company: &str,
    ) -> Result<bool, ClientError> {
        let directory = self.backend.company_directory().await?;
        let Some(edit) = directory.apply(company) else {
            warn!(company, "Company not in directory");
            return Ok(false);
        };
        document.apply(edit)?;
        Ok(true)
    }

    /// Store the rendered document, then persist the quotation with its URL.
    ///
    /// Nothing is persisted if the upload fails. Returns the document URL.
    ///
    /// # Errors
    ///
    /// Returns `UploadFailed` if storage rejects the document or returns no
    /// URL, and `Rejected` if the store refuses the record.
    #[instrument(skip(self, document, rendered), fields(quotation_no = %document.quotation_no()))]
    pub async fn save(
        &self,
        document: &QuotationDocument,
        rendered: Vec<u8>,
    ) -> Result<String, ClientError> {
        let upload = self
            .backend
            .upload_document(document.quotation_no(), rendered)
            .await?;
        let url = match upload.url.filter(|url| !url.trim().is_empty()) {
            Some(url) if upload.success => url,
            _ => {
                return Err(ClientError::UploadFailed(
                    upload
                        .message
                        .unwrap_or_else(|| "no document URL returned".to_string()),
                ));
            }
        };

        let payload = to_persistence_payload(document, Some(url.clone()));
        let outcome = self.backend.save_quotation(&payload).await?;
        if !outcome.success {
            return Err(ClientError::Rejected(
                outcome
                    .message
                    .unwrap_or_else(|| "quotation was not saved".to_string()),
            ));
        }

        info!(%url, grand_total = %payload.grand_total, "Saved quotation");
        Ok(url)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;
    use rust_decimal_macros::dec;
    use salesdesk_core::catalog::{DropdownOptions, LeadDetails, ProductRecord};
    use salesdesk_core::{LineItem, PersistencePayload, SequenceRegistry};
    use serde_json::{Value, json};

    use super::*;
    use crate::issuer::MemorySequenceStore;
    use crate::ports::{SaveOutcome, UploadOutcome};

    #[derive(Default)]
    struct FakeBackend {
        records: HashMap<String, Value>,
        upload: Option<UploadOutcome>,
        save: Option<SaveOutcome>,
        saved: Mutex<Vec<PersistencePayload>>,
        leads: HashMap<String, Value>,
    }

    #[async_trait]
    impl QuotationSource for FakeBackend {
        async fn fetch_quotation(&self, quotation_no: &str) -> Result<Value, ClientError> {
            self.records
                .get(quotation_no)
                .cloned()
                .ok_or_else(|| ClientError::Api {
                    status: 404,
                    message: "Quotation not found".to_string(),
                })
        }
    }

    #[async_trait]
    impl QuotationSink for FakeBackend {
        async fn save_quotation(
            &self,
            payload: &PersistencePayload,
        ) -> Result<SaveOutcome, ClientError> {
            self.saved.lock().unwrap().push(payload.clone());
            Ok(self.save.clone().unwrap_or(SaveOutcome {
                success: true,
                message: None,
            }))
        }
    }

    #[async_trait]
    impl DocumentStorage for FakeBackend {
        async fn upload_document(
            &self,
            quotation_no: &str,
            _bytes: Vec<u8>,
        ) -> Result<UploadOutcome, ClientError> {
            Ok(self.upload.clone().unwrap_or_else(|| UploadOutcome {
                success: true,
                url: Some(format!("https://files.example.test/{quotation_no}.pdf")),
                message: None,
            }))
        }
    }

    #[async_trait]
    impl CatalogSource for FakeBackend {
        async fn dropdowns(&self) -> Result<DropdownOptions, ClientError> {
            Ok(serde_json::from_value(json!({
                "direct_company_name": ["Acme Pumps"],
                "direct_billing_address": ["12 Ring Road, Surat"],
                "direct_state": ["Gujarat"],
                "direct_client_name": ["R. Shah"],
                "direct_client_contact_no": ["9800000000"],
                "consignee_gstin_uin": ["24AAAAA0000A1Z5"],
                "consignee_state_code": ["24"]
            }))
            .unwrap())
        }

        async fn products(&self) -> Result<Vec<ProductRecord>, ClientError> {
            Ok(serde_json::from_value(json!([
                {"item_code": "BV-50", "item_name": "Ball Valve 50mm"}
            ]))
            .unwrap())
        }

        async fn lead_details(&self, lead_no: &str) -> Result<LeadDetails, ClientError> {
            let value = self.leads.get(lead_no).cloned().unwrap_or(Value::Null);
            serde_json::from_value(value).map_err(|e| ClientError::Parse(e.to_string()))
        }
    }

    fn desk(backend: FakeBackend) -> QuotationDesk<FakeBackend, MemorySequenceStore> {
        let issuer = SequenceIssuer::new(
            MemorySequenceStore::new().with_latest("QN", "QN-041"),
            SequenceRegistry::default(),
            3,
        );
        QuotationDesk::new(backend, issuer, "QN")
    }

    fn priced_document() -> QuotationDocument {
        let mut document =
            QuotationDocument::new("QN-042", NaiveDate::from_ymd_opt(2025, 5, 14).unwrap());
        document
            .apply(salesdesk_core::Edit::AddItem(LineItem::new(
                "Valve",
                dec!(2),
                dec!(100),
            )))
            .unwrap();
        document
    }

    #[tokio::test]
    async fn test_new_quotation_takes_next_number() {
        let desk = desk(FakeBackend::default());
        let today = NaiveDate::from_ymd_opt(2025, 5, 14).unwrap();
        let document = desk.new_quotation(today).await.unwrap();
        assert_eq!(document.quotation_no(), "QN-042");
        assert_eq!(document.date(), Some(today));
        assert!(document.items().is_empty());

        let next = desk.new_quotation(today).await.unwrap();
        assert_eq!(next.quotation_no(), "QN-043");
    }

    #[tokio::test]
    async fn test_revise_recomputes_and_reports() {
        let mut records = HashMap::new();
        records.insert(
            "QN-007".to_string(),
            json!({
                "quotationNo": "QN-007",
                "items": [{"name": "Valve", "qty": 2, "rate": 100, "discount": 10, "flatDiscount": 5}],
                "specialDiscount": 10,
                "grandTotal": 1
            }),
        );
        let desk = desk(FakeBackend {
            records,
            ..FakeBackend::default()
        });

        let revision = desk.revise("QN-007").await.unwrap();
        assert_eq!(revision.document.totals().grand_total, dec!(190.60));
        assert_eq!(revision.warnings.len(), 1);

        assert!(matches!(
            desk.revise("QN-999").await,
            Err(ClientError::Api { status: 404, .. })
        ));
    }

    #[tokio::test]
    async fn test_save_uploads_then_persists() {
        let desk = desk(FakeBackend::default());
        let url = desk.save(&priced_document(), vec![1, 2, 3]).await.unwrap();
        assert_eq!(url, "https://files.example.test/QN-042.pdf");

        let saved = desk.backend().saved.lock().unwrap();
        assert_eq!(saved.len(), 1);
        assert_eq!(saved[0].pdf_url.as_deref(), Some(url.as_str()));
        assert_eq!(saved[0].quotation_no, "QN-042");
    }

    #[tokio::test]
    async fn test_failed_upload_persists_nothing() {
        for upload in [
            UploadOutcome {
                success: false,
                url: None,
                message: Some("disk full".to_string()),
            },
            UploadOutcome {
                success: true,
                url: Some("  ".to_string()),
                message: None,
            },
        ] {
            let desk = desk(FakeBackend {
                upload: Some(upload),
                ..FakeBackend::default()
            });
            assert!(matches!(
                desk.save(&priced_document(), Vec::new()).await,
                Err(ClientError::UploadFailed(_))
            ));
            assert!(desk.backend().saved.lock().unwrap().is_empty());
        }
    }

    #[tokio::test]
    async fn test_rejected_save() {
        let desk = desk(FakeBackend {
            save: Some(SaveOutcome {
                success: false,
                message: Some("duplicate quotation".to_string()),
            }),
            ..FakeBackend::default()
        });
        assert!(matches!(
            desk.save(&priced_document(), Vec::new()).await,
            Err(ClientError::Rejected(m)) if m == "duplicate quotation"
        ));
    }

    #[tokio::test]
    async fn test_apply_lead_and_company() {
        let mut leads = HashMap::new();
        leads.insert(
            "LD-004".to_string(),
            json!({
                "company_name": "Acme Pumps",
                "sales_person_name": "Meera",
                "item_qty": "[{\"name\": \"Ball Valve 50mm\", \"quantity\": \"4\"}]"
            }),
        );
        let desk = desk(FakeBackend {
            leads,
            ..FakeBackend::default()
        });

        let mut document = priced_document();
        desk.apply_lead(&mut document, "LD-004").await.unwrap();
        assert_eq!(document.consignee().company_name, "Acme Pumps");
        assert_eq!(document.consignee().address, "12 Ring Road, Surat");
        assert_eq!(document.consignee().contact_name, "Meera");
        assert_eq!(document.consignee().state_code, "24");
        assert_eq!(document.items().len(), 1);
        assert_eq!(document.items()[0].code, "BV-50");
        assert_eq!(document.items()[0].quantity, dec!(4));

        let mut other = priced_document();
        assert!(desk.apply_company(&mut other, "acme pumps").await.unwrap());
        assert_eq!(other.consignee().gstin, "24AAAAA0000A1Z5");
        assert!(!desk.apply_company(&mut other, "Unknown Co").await.unwrap());
    }
}
