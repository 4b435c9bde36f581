//! Integration tests for the REST adapter and the quotation workflow.
//!
//! Each test starts its own mock backend, mounted under `/api`.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use chrono::NaiveDate;
use rust_decimal_macros::dec;
use salesdesk_client::{
    BackendClient, CatalogSource, ClientError, LatestIdentifierSource, QuotationDesk,
    QuotationSource,
};
use salesdesk_integration_tests::{config_for, stored_quotation};
use serde_json::{Value, json};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_json(server: &MockServer, verb: &str, route: &str, body: Value) {
    Mock::given(method(verb))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_json(body))
        .mount(server)
        .await;
}

fn client(server: &MockServer) -> BackendClient {
    BackendClient::new(&config_for(&server.uri())).unwrap()
}

// =============================================================================
// Adapter Tests
// =============================================================================

#[tokio::test]
async fn test_latest_quotation_number() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/quotation-lead/quotation-numbers"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "quotationNumbers": ["QN-009", "QN-010", "QN-1000", "draft", "QN-099"]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let latest = client(&server).latest("QN").await.unwrap();
    assert_eq!(latest.as_deref(), Some("QN-1000"));
}

#[tokio::test]
async fn test_lead_and_order_numbers_are_not_listed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/quotation-lead/quotation-numbers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "quotationNumbers": ["QN-041", "LD-007"]
        })))
        .expect(0)
        .mount(&server)
        .await;

    let client = client(&server);
    for prefix in ["LD", "DO"] {
        assert!(matches!(
            client.latest(prefix).await,
            Err(ClientError::UnsupportedSequence(p)) if p == prefix
        ));
    }
}

#[tokio::test]
async fn test_envelope_failures() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "GET",
        "/api/quotation-lead/quotation-details/QN-404",
        json!({"success": false, "message": "Quotation not found"}),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/api/quotation-lead/quotation-details/QN-500"))
        .respond_with(
            ResponseTemplate::new(500).set_body_json(json!({"message": "sheet unavailable"})),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/api/quotation-lead/quotation-details/QN-BAD"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
        .mount(&server)
        .await;

    let client = client(&server);
    assert!(matches!(
        client.fetch_quotation("QN-404").await,
        Err(ClientError::Rejected(m)) if m == "Quotation not found"
    ));
    assert!(matches!(
        client.fetch_quotation("QN-500").await,
        Err(ClientError::Api { status: 500, message }) if message == "sheet unavailable"
    ));
    assert!(matches!(
        client.fetch_quotation("QN-BAD").await,
        Err(ClientError::Parse(_))
    ));
}

#[tokio::test]
async fn test_catalogs() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "GET",
        "/api/quotation-submit/dropdowns",
        json!({
            "success": true,
            "dropdowns": {
                "direct_company_name": ["Select Company", "Acme Pumps", ""],
                "direct_billing_address": ["", "12 Ring Road, Surat", ""],
                "direct_state": ["", "Gujarat", ""],
                "direct_client_name": ["", "R. Shah", ""],
                "direct_client_contact_no": ["", "9800000000", ""],
                "consignee_gstin_uin": ["", "24AAAAA0000A1Z5", ""],
                "consignee_state_code": ["", "24", ""]
            }
        }),
    )
    .await;
    mount_json(
        &server,
        "GET",
        "/api/products",
        json!({
            "success": true,
            "products": [
                {"item_code": "BV-50", "item_name": "Ball Valve 50mm"},
                {"item_code": 1020, "item_name": "Gate Valve Cast Iron 80mm"}
            ]
        }),
    )
    .await;

    let client = client(&server);
    let directory = client.company_directory().await.unwrap();
    assert_eq!(directory.len(), 1);
    assert_eq!(directory.get("Acme Pumps").unwrap().state_code, "24");

    let catalog = client.product_catalog().await.unwrap();
    assert_eq!(catalog.lookup("bv-50").unwrap().name, "Ball Valve 50mm");
    assert_eq!(catalog.lookup("1020").unwrap().code, "1020");
    assert_eq!(
        catalog.lookup("Gate Valve Cast Iron 100mm").unwrap().code,
        "1020"
    );
}

// =============================================================================
// Workflow Tests
// =============================================================================

#[tokio::test]
async fn test_new_quotation_numbers_from_backend() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "GET",
        "/api/quotation-lead/quotation-numbers",
        json!({"success": true, "quotationNumbers": ["QN-041"]}),
    )
    .await;

    let desk = QuotationDesk::from_config(&config_for(&server.uri())).unwrap();
    let today = NaiveDate::from_ymd_opt(2025, 5, 14).unwrap();
    let document = desk.new_quotation(today).await.unwrap();
    assert_eq!(document.quotation_no(), "QN-042");
    assert_eq!(document.date(), Some(today));
}

#[tokio::test]
async fn test_revise_then_save() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "GET",
        "/api/quotation-lead/quotation-details/QN-042",
        json!({"success": true, "data": stored_quotation()}),
    )
    .await;
    mount_json(
        &server,
        "POST",
        "/api/quotation-submit/upload-pdf",
        json!({"success": true, "url": "https://files.example.test/Quotation_QN-042.pdf"}),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/api/quotation-submit/quotation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(1)
        .mount(&server)
        .await;

    let desk = QuotationDesk::from_config(&config_for(&server.uri())).unwrap();
    let revision = desk.revise("QN-042").await.unwrap();
    assert!(revision.warnings.is_empty());
    assert_eq!(revision.document.totals().grand_total, dec!(190.60));

    let url = desk
        .save(&revision.document, b"%PDF-1.7 test".to_vec())
        .await
        .unwrap();
    assert_eq!(url, "https://files.example.test/Quotation_QN-042.pdf");

    let requests = server.received_requests().await.unwrap();
    let upload = requests
        .iter()
        .find(|r| r.url.path() == "/api/quotation-submit/upload-pdf")
        .unwrap();
    let body = String::from_utf8_lossy(&upload.body);
    assert!(body.contains("name=\"pdf\""));
    assert!(body.contains("filename=\"Quotation_QN-042.pdf\""));
    assert!(body.contains("application/pdf"));

    let saved = requests
        .iter()
        .find(|r| r.url.path() == "/api/quotation-submit/quotation")
        .unwrap();
    let payload: Value = serde_json::from_slice(&saved.body).unwrap();
    assert_eq!(payload["quotationNo"], "QN-042");
    assert_eq!(payload["pdfUrl"], url.as_str());
    assert_eq!(payload["isIGST"], false);
    assert_eq!(payload["grandTotal"], 190.6);
    assert_eq!(payload["specialOffers"], "Free delivery|Extended warranty");
}

#[tokio::test]
async fn test_failed_upload_skips_persist() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "POST",
        "/api/quotation-submit/upload-pdf",
        json!({"success": false, "message": "bucket unavailable"}),
    )
    .await;
    Mock::given(method("POST"))
        .and(path("/api/quotation-submit/quotation"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"success": true})))
        .expect(0)
        .mount(&server)
        .await;

    let desk = QuotationDesk::from_config(&config_for(&server.uri())).unwrap();
    let document = salesdesk_core::QuotationDocument::new(
        "QN-050",
        NaiveDate::from_ymd_opt(2025, 5, 14).unwrap(),
    );
    assert!(matches!(
        desk.save(&document, Vec::new()).await,
        Err(ClientError::UploadFailed(m)) if m == "bucket unavailable"
    ));
}

#[tokio::test]
async fn test_apply_lead_from_backend() {
    let server = MockServer::start().await;
    mount_json(
        &server,
        "GET",
        "/api/quotation-lead/lead-details/LD-004",
        json!({
            "success": true,
            "sheet": "ENQUIRY",
            "data": {
                "company_name": "Acme Pumps",
                "address": "Plot 7, GIDC",
                "salesperson_name": "Meera",
                "phone_number": 9_811_111_111_u64,
                "item_qty": [
                    {"name": "Ball Valve 50mm", "quantity": "3"},
                    {"name": "Custom Fitting", "quantity": "a few"},
                    {"name": "", "quantity": "2"}
                ]
            }
        }),
    )
    .await;
    mount_json(
        &server,
        "GET",
        "/api/quotation-submit/dropdowns",
        json!({"success": true, "dropdowns": {
            "direct_company_name": ["Acme Pumps"],
            "direct_state": ["Gujarat"],
            "consignee_state_code": ["24"]
        }}),
    )
    .await;
    mount_json(
        &server,
        "GET",
        "/api/products",
        json!({"success": true, "products": [{"item_code": "BV-50", "item_name": "Ball Valve 50mm"}]}),
    )
    .await;

    let desk = QuotationDesk::from_config(&config_for(&server.uri())).unwrap();
    let mut document = salesdesk_core::QuotationDocument::new(
        "QN-051",
        NaiveDate::from_ymd_opt(2025, 5, 14).unwrap(),
    );
    desk.apply_lead(&mut document, "LD-004").await.unwrap();

    let consignee = document.consignee();
    assert_eq!(consignee.company_name, "Acme Pumps");
    assert_eq!(consignee.address, "Plot 7, GIDC");
    assert_eq!(consignee.state, "Gujarat");
    assert_eq!(consignee.state_code, "24");
    assert_eq!(consignee.contact_name, "Meera");
    assert_eq!(consignee.contact_no, "9811111111");

    let items = document.items();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].code, "BV-50");
    assert_eq!(items[0].quantity, dec!(3));
    assert_eq!(items[0].gst_rate, dec!(18));
    assert_eq!(items[1].name, "Custom Fitting");
    assert_eq!(items[1].quantity, dec!(1));
}
