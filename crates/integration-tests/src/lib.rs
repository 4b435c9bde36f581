//! Integration tests for Sales Desk.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p salesdesk-integration-tests
//! ```
//!
//! No external services are needed; backend calls go to a `wiremock`
//! server started per test.
//!
//! # Test Categories
//!
//! - `engine_properties` - Computation, revision and payload properties
//! - `sequence_issuance` - Identifier issuance, including concurrent issuers
//! - `backend_client` - REST adapter and quotation workflow over HTTP

#![cfg_attr(not(test), forbid(unsafe_code))]

use salesdesk_client::ClientConfig;
use serde_json::{Value, json};

/// Client configuration pointing at a mock server.
///
/// # Panics
///
/// Panics if `uri` is not a valid base URL.
#[must_use]
#[allow(clippy::expect_used)]
pub fn config_for(uri: &str) -> ClientConfig {
    let base = format!("{uri}/api");
    ClientConfig::from_lookup(|key| match key {
        "SALESDESK_API_URL" => Some(base.clone()),
        "SALESDESK_API_TOKEN" => Some("test-token".to_string()),
        "SALESDESK_HTTP_TIMEOUT_SECS" => Some("5".to_string()),
        _ => None,
    })
    .expect("mock server URI is a valid base URL")
}

/// A stored quotation as the backend returns it.
///
/// One item of qty 2 at 100 with 10% and 5/unit off, CGST and SGST at 9%,
/// and a special discount of 10: grand total 190.60.
#[must_use]
pub fn stored_quotation() -> Value {
    json!({
        "quotationNo": "QN-042",
        "quotationDate": "2025-05-14",
        "preparedBy": "Kiran",
        "consignorName": "Asha, Ravi",
        "consignorState": "Gujarat",
        "companyName": "Acme Pumps",
        "consigneeAddress": "12 Ring Road, Surat",
        "consigneeGSTIN": "24AAAAA0000A1Z5",
        "items": [
            {
                "code": "BV-50",
                "name": "Ball Valve 50mm",
                "description": "Forged brass",
                "gst": 18,
                "qty": 2,
                "units": "Nos",
                "rate": 100,
                "discount": 10,
                "flatDiscount": 5,
                "amount": 170
            }
        ],
        "totalFlatDiscount": 0,
        "specialDiscount": 10,
        "isIGST": false,
        "cgstRate": 9,
        "sgstRate": 9,
        "specialOffers": "Free delivery|Extended warranty",
        "notes": ["Prices ex-works"],
        "grandTotal": 190.6
    })
}
