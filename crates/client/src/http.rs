//! HTTP adapter for the quotation backend.
//!
//! Every endpoint answers with a JSON envelope carrying a `success` flag and
//! an optional `message`. Non-2xx statuses become [`ClientError::Api`]; a
//! 2xx envelope with `success: false` becomes [`ClientError::Rejected`],
//! except for the save and upload calls whose outcome is returned as-is.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Url;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::multipart::{Form, Part};
use salesdesk_core::PersistencePayload;
use salesdesk_core::catalog::{DropdownOptions, LeadDetails, ProductRecord};
use salesdesk_core::sequence::latest_of;
use secrecy::ExposeSecret;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, instrument};

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::ports::{
    CatalogSource, DocumentStorage, LatestIdentifierSource, QuotationSink, QuotationSource,
    SaveOutcome, UploadOutcome,
};

/// Multipart field the backend reads the document from.
const UPLOAD_FIELD: &str = "pdf";

/// Client for the quotation backend's REST API.
#[derive(Clone)]
pub struct BackendClient {
    inner: Arc<BackendClientInner>,
}

struct BackendClientInner {
    client: reqwest::Client,
    base_url: Url,
    /// The only sequence the backend can list.
    quotation_prefix: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuotationNumbers {
    #[serde(default)]
    quotation_numbers: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct Data<T> {
    data: T,
}

#[derive(Debug, Deserialize)]
struct Dropdowns {
    #[serde(default)]
    dropdowns: DropdownOptions,
}

#[derive(Debug, Deserialize)]
struct Products {
    #[serde(default)]
    products: Vec<ProductRecord>,
}

#[derive(Debug, Deserialize)]
struct LeadResponse {
    #[serde(default)]
    sheet: Option<String>,
    #[serde(default)]
    data: LeadDetails,
}

impl BackendClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the token is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let mut headers = HeaderMap::new();
        if let Some(token) = &config.api_token {
            let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                .map_err(|e| ClientError::Parse(format!("Invalid API token format: {e}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            inner: Arc::new(BackendClientInner {
                client,
                base_url: config.api_url.clone(),
                quotation_prefix: config.quotation_prefix.clone(),
            }),
        })
    }

    /// The backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &Url {
        &self.inner.base_url
    }

    /// All issued quotation numbers, as the backend lists them.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the backend rejects it.
    #[instrument(skip(self))]
    pub async fn quotation_numbers(&self) -> Result<Vec<String>, ClientError> {
        let body: QuotationNumbers = self.get(&["quotation-lead", "quotation-numbers"]).await?;
        Ok(body
            .quotation_numbers
            .into_iter()
            .filter_map(|n| match n {
                Value::String(s) => Some(s),
                Value::Number(n) => Some(n.to_string()),
                _ => None,
            })
            .collect())
    }

    /// Build an endpoint URL, percent-encoding each segment.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ClientError> {
        let mut url = self.inner.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| ClientError::Parse("Base URL cannot carry a path".to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    /// GET an endpoint and unwrap its envelope.
    async fn get<T: DeserializeOwned>(&self, segments: &[&str]) -> Result<T, ClientError> {
        let url = self.endpoint(segments)?;
        debug!(%url, "GET");
        let response = self.inner.client.get(url).send().await?;
        unwrap_envelope(Self::handle_response(response).await?)
    }

    /// Check the status and parse the JSON body.
    async fn handle_response<T: DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, ClientError> {
        let status = response.status();
        if status.is_success() {
            return response
                .json()
                .await
                .map_err(|e| ClientError::Parse(format!("Failed to parse response: {e}")));
        }
        Err(Self::parse_error(response).await)
    }

    /// Prefer the envelope's `message`, then the raw body, then the reason.
    async fn parse_error(response: reqwest::Response) -> ClientError {
        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<Value>(&text)
            .ok()
            .and_then(|v| v.get("message").and_then(Value::as_str).map(str::to_string))
            .or_else(|| (!text.trim().is_empty()).then(|| text.trim().to_string()))
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            });
        ClientError::Api {
            status: status.as_u16(),
            message,
        }
    }
}

/// Reject `success: false`, then read the body. A missing flag counts as success.
fn unwrap_envelope<T: DeserializeOwned>(body: Value) -> Result<T, ClientError> {
    if body.get("success").and_then(Value::as_bool) == Some(false) {
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("Request was not successful");
        return Err(ClientError::Rejected(message.to_string()));
    }
    serde_json::from_value(body)
        .map_err(|e| ClientError::Parse(format!("Unexpected response shape: {e}")))
}

impl std::fmt::Debug for BackendClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendClient")
            .field("base_url", &self.inner.base_url.as_str())
            .field("quotation_prefix", &self.inner.quotation_prefix)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl LatestIdentifierSource for BackendClient {
    /// Only quotation numbers are listed; lead and order sequences are kept
    /// elsewhere, so any other prefix is an error rather than "none issued".
    async fn latest(&self, prefix: &str) -> Result<Option<String>, ClientError> {
        if prefix != self.inner.quotation_prefix {
            return Err(ClientError::UnsupportedSequence(prefix.to_string()));
        }
        let numbers = self.quotation_numbers().await?;
        Ok(latest_of(prefix, numbers.iter().map(String::as_str)))
    }
}

#[async_trait]
impl QuotationSource for BackendClient {
    #[instrument(skip(self))]
    async fn fetch_quotation(&self, quotation_no: &str) -> Result<Value, ClientError> {
        let body: Data<Value> = self
            .get(&["quotation-lead", "quotation-details", quotation_no])
            .await?;
        Ok(body.data)
    }
}

#[async_trait]
impl QuotationSink for BackendClient {
    #[instrument(skip(self, payload), fields(quotation_no = %payload.quotation_no))]
    async fn save_quotation(
        &self,
        payload: &PersistencePayload,
    ) -> Result<SaveOutcome, ClientError> {
        let url = self.endpoint(&["quotation-submit", "quotation"])?;
        let response = self.inner.client.post(url).json(payload).send().await?;
        Self::handle_response(response).await
    }
}

#[async_trait]
impl DocumentStorage for BackendClient {
    #[instrument(skip(self, bytes), fields(size = bytes.len()))]
    async fn upload_document(
        &self,
        quotation_no: &str,
        bytes: Vec<u8>,
    ) -> Result<UploadOutcome, ClientError> {
        let url = self.endpoint(&["quotation-submit", "upload-pdf"])?;
        let part = Part::bytes(bytes)
            .file_name(format!("Quotation_{quotation_no}.pdf"))
            .mime_str("application/pdf")?;
        let form = Form::new().part(UPLOAD_FIELD, part);
        let response = self.inner.client.post(url).multipart(form).send().await?;
        Self::handle_response(response).await
    }
}

#[async_trait]
impl CatalogSource for BackendClient {
    #[instrument(skip(self))]
    async fn dropdowns(&self) -> Result<DropdownOptions, ClientError> {
        let body: Dropdowns = self.get(&["quotation-submit", "dropdowns"]).await?;
        Ok(body.dropdowns)
    }

    #[instrument(skip(self))]
    async fn products(&self) -> Result<Vec<ProductRecord>, ClientError> {
        let body: Products = self.get(&["products"]).await?;
        Ok(body.products)
    }

    #[instrument(skip(self))]
    async fn lead_details(&self, lead_no: &str) -> Result<LeadDetails, ClientError> {
        let body: LeadResponse = self
            .get(&["quotation-lead", "lead-details", lead_no])
            .await?;
        debug!(sheet = ?body.sheet, "Loaded lead details");
        Ok(body.data)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn client(base: &str) -> BackendClient {
        let config = ClientConfig::from_lookup(|key| {
            (key == "SALESDESK_API_URL").then(|| base.to_string())
        })
        .unwrap();
        BackendClient::new(&config).unwrap()
    }

    #[test]
    fn test_endpoint_joins_under_base_path() {
        let client = client("http://localhost:5050/api");
        let url = client
            .endpoint(&["quotation-lead", "quotation-details", "QN-001"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5050/api/quotation-lead/quotation-details/QN-001"
        );
    }

    #[test]
    fn test_endpoint_encodes_segments() {
        let client = client("http://localhost:5050/");
        let url = client
            .endpoint(&["quotation-lead", "lead-details", "LD 1/2"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:5050/quotation-lead/lead-details/LD%201%2F2"
        );
    }

    #[test]
    fn test_unwrap_envelope() {
        let products: Products = unwrap_envelope(serde_json::json!({
            "products": [{"item_code": "P-1", "item_name": "Valve"}]
        }))
        .unwrap();
        assert_eq!(products.products.len(), 1);

        let rejected = unwrap_envelope::<Dropdowns>(serde_json::json!({
            "success": false,
            "message": "nope"
        }));
        assert!(matches!(rejected, Err(ClientError::Rejected(m)) if m == "nope"));

        let missing = unwrap_envelope::<Data<Value>>(serde_json::json!({"success": true}));
        assert!(matches!(missing, Err(ClientError::Parse(_))));
    }

    #[tokio::test]
    async fn test_latest_refuses_unlisted_sequences() {
        // No request is made, so nothing needs to listen on the port.
        let client = client("http://127.0.0.1:9/api");
        for prefix in ["LD", "DO", "qn"] {
            assert!(matches!(
                client.latest(prefix).await,
                Err(ClientError::UnsupportedSequence(p)) if p == prefix
            ));
        }
    }

    #[test]
    fn test_debug_hides_token() {
        let config = ClientConfig::from_lookup(|key| match key {
            "SALESDESK_API_URL" => Some("http://localhost:5050".to_string()),
            "SALESDESK_API_TOKEN" => Some("very-secret".to_string()),
            _ => None,
        })
        .unwrap();
        let client = BackendClient::new(&config).unwrap();
        assert!(!format!("{client:?}").contains("very-secret"));
    }
}
