use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use policyscan::analyzer::{ChatCompletion, ChatRequest};
use policyscan::config::ServerConfig;
use policyscan::error::{AnalysisError, ExtractError};
use policyscan::spreadsheet::{read_table, XLSX_CONTENT_TYPE};
use policyscan::{
    ContentAnalysis, Document, DocumentExtractor, ExtractedText, Extraction, ExtractionMethod,
    ExtractionReport, FieldAnalyzer, PageKind, Pipeline,
};
use policyscan_server::{router, AppState};
use serde_json::{json, Value};
use tower::ServiceExt;

const BOUNDARY: &str = "policyscan-test-boundary";

struct FakeExtractor;

#[async_trait]
impl DocumentExtractor for FakeExtractor {
    async fn extract(&self, _document: &Document) -> Result<Extraction, ExtractError> {
        Ok(Extraction {
            text: ExtractedText::new("Policy No 3001/A/123456", ExtractionMethod::Text),
            report: ExtractionReport::Classified(ContentAnalysis::from_page_kinds(vec![
                PageKind::Text,
                PageKind::Text,
                PageKind::Image,
            ])),
        })
    }
}

struct FailingExtractor;

#[async_trait]
impl DocumentExtractor for FailingExtractor {
    async fn extract(&self, _document: &Document) -> Result<Extraction, ExtractError> {
        Err(ExtractError::ParsePdf("invalid file header".to_string()))
    }
}

struct FakeChat;

#[async_trait]
impl ChatCompletion for FakeChat {
    async fn complete(&self, _request: &ChatRequest) -> Result<String, AnalysisError> {
        Ok(r#"{"Current Policy number": "3001/A/123456", "Customer Name": "Ravi Kumar"}"#.to_string())
    }
}

fn app_with(extractor: Arc<dyn DocumentExtractor>) -> Router {
    let pipeline = Pipeline::new(extractor, FieldAnalyzer::new(Arc::new(FakeChat), true));
    router(AppState::new(pipeline), &ServerConfig::default())
}

fn app() -> Router {
    app_with(Arc::new(FakeExtractor))
}

fn multipart_body(field: &str, filename: &str, contents: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    body.extend_from_slice(
        format!(
            "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
            field, filename
        )
        .as_bytes(),
    );
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(contents);
    body.extend_from_slice(format!("\r\n--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn form_value_body(field: &str, value: &str) -> Vec<u8> {
    format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"{f}\"\r\n\r\n{v}\r\n--{b}--\r\n",
        b = BOUNDARY,
        f = field,
        v = value
    )
    .into_bytes()
}

fn upload_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_health() {
    let response = app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({"status": "healthy", "message": "PDF to Excel API is running"})
    );
}

#[tokio::test]
async fn test_upload_non_pdf_is_rejected() {
    let response = app()
        .oneshot(upload_request(multipart_body("file", "policy.docx", b"PK\x03\x04")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({"error": "Only PDF files are allowed"})
    );
}

#[tokio::test]
async fn test_upload_empty_filename_is_rejected() {
    let response = app()
        .oneshot(upload_request(multipart_body("file", "", b"%PDF-1.4")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await, json!({"error": "No file selected"}));
}

#[tokio::test]
async fn test_upload_whitespace_filename_is_not_pdf() {
    let response = app()
        .oneshot(upload_request(multipart_body("file", "   ", b"%PDF-1.4")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        json_body(response).await,
        json!({"error": "Only PDF files are allowed"})
    );
}

#[tokio::test]
async fn test_upload_file_field_without_filename_is_not_a_file() {
    let response = app()
        .oneshot(upload_request(form_value_body("file", "policy.pdf")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await, json!({"error": "No file uploaded"}));
}

#[tokio::test]
async fn test_upload_without_file_field() {
    let response = app()
        .oneshot(upload_request(multipart_body("document", "policy.pdf", b"%PDF-1.4")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await, json!({"error": "No file uploaded"}));
}

#[tokio::test]
async fn test_upload_without_multipart_body() {
    let request = Request::builder()
        .method("POST")
        .uri("/upload")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{}"))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await, json!({"error": "No file uploaded"}));
}

#[tokio::test]
async fn test_upload_success() {
    let response = app()
        .oneshot(upload_request(multipart_body("file", "Policy.PDF", b"%PDF-1.4")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["Current Policy number"], "3001/A/123456");
    assert_eq!(body["data"]["Customer Name"], "Ravi Kumar");
    assert_eq!(body["data"]["Vehicle Number"], "Not Found");
    assert_eq!(body["data"].as_object().unwrap().len(), 11);

    assert_eq!(
        body["pdf_analysis"],
        json!({
            "type": "text_dominant",
            "total_pages": 3,
            "text_pages": 2,
            "image_pages": 1,
            "mixed_pages": 0
        })
    );
    assert!(body.get("ocr_analysis").is_none());
    assert_eq!(body["extraction_method"], "text");
    assert_eq!(
        body["message"],
        "PDF processed successfully. Detected as text_dominant content."
    );
}

#[tokio::test]
async fn test_upload_extraction_failure_is_server_error() {
    let response = app_with(Arc::new(FailingExtractor))
        .oneshot(upload_request(multipart_body("file", "policy.pdf", b"garbage")))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = json_body(response).await;
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("invalid file header"));
}

#[tokio::test]
async fn test_download_excel_returns_workbook() {
    let request = Request::builder()
        .method("POST")
        .uri("/download-excel")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            json!({"Customer Name": "Ravi Kumar", "Sum Insured": "525000"}).to_string(),
        ))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE].to_str().unwrap(),
        XLSX_CONTENT_TYPE
    );
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.starts_with("attachment; filename=\"insurance_data_"));
    assert!(disposition.ends_with(".xlsx\""));

    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let table = read_table(&bytes).unwrap();
    assert_eq!(table.headers.len(), 11);
    assert_eq!(table.rows.len(), 1);
    assert_eq!(table.rows[0][2], "Ravi Kumar");
    assert_eq!(table.rows[0][4], "525000");
    assert_eq!(table.rows[0][0], "Not Found");
}

#[tokio::test]
async fn test_download_excel_rejects_missing_data() {
    for body in ["{}", "[]", "not json", "null"] {
        let request = Request::builder()
            .method("POST")
            .uri("/download-excel")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap();

        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "body: {}", body);
        assert_eq!(json_body(response).await, json!({"error": "No data provided"}));
    }
}

#[tokio::test]
async fn test_cors_preflight_allows_frontend_origin() {
    let request = Request::builder()
        .method("OPTIONS")
        .uri("/upload")
        .header(header::ORIGIN, "http://localhost:3000")
        .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
        .body(Body::empty())
        .unwrap();

    let response = app().oneshot(request).await.unwrap();

    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        "http://localhost:3000"
    );
}
