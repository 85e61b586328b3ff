//! Remote edit proxy tests against a mocked Claid API.
//!
//! Run with: `cargo test -p pixpress-api --test claid_upload_test`

mod helpers;

use axum_test::multipart::MultipartForm;
use helpers::fixtures::image_form;
use helpers::{remote_server, server_from_config, test_config, TEST_API_KEY};
use pixpress_core::ProcessingBackend;
use serde_json::{json, Value};

const UPLOAD_PATH: &str = "/v1/image/edit/upload";

#[tokio::test]
async fn test_claid_upload_returns_processed_bytes_with_headers() {
    let mut claid = mockito::Server::new_async().await;
    let tmp_url = format!("{}/tmp/edited.webp", claid.url());
    let upload = claid
        .mock("POST", UPLOAD_PATH)
        .match_header("authorization", format!("Bearer {}", TEST_API_KEY).as_str())
        .match_body(mockito::Matcher::AllOf(vec![
            mockito::Matcher::Regex(r#""width":640"#.to_string()),
            mockito::Matcher::Regex(r#""upscale":"faces""#.to_string()),
            mockito::Matcher::Regex(r#""polish":true"#.to_string()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({ "data": { "output": { "tmp_url": tmp_url, "mime": "image/webp" } } })
                .to_string(),
        )
        .create_async()
        .await;
    let download = claid
        .mock("GET", "/tmp/edited.webp")
        .with_status(200)
        .with_body(vec![7u8; 12])
        .create_async()
        .await;

    let server = remote_server(&claid.url());
    let form = image_form(20, 20)
        .add_text("width", "640")
        .add_text("upscale", "faces")
        .add_text("polish", "true");
    let response = server.post("/api/claid-upload").multipart(form).await;

    assert_eq!(response.status_code(), 200);
    assert_eq!(response.header("content-type"), "image/webp");
    assert_eq!(response.header("x-new-size"), "12");
    let claid_response: Value =
        serde_json::from_str(response.header("x-claid-response").to_str().unwrap()).unwrap();
    assert_eq!(claid_response["output"]["mime"], "image/webp");
    assert!(claid_response.get("data").is_none());
    assert_eq!(response.as_bytes().len(), 12);

    upload.assert_async().await;
    download.assert_async().await;
}

#[tokio::test]
async fn test_claid_upload_without_url_returns_raw_payload() {
    let mut claid = mockito::Server::new_async().await;
    claid
        .mock("POST", UPLOAD_PATH)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "data": { "status": "queued" } }).to_string())
        .create_async()
        .await;

    let server = remote_server(&claid.url());
    let response = server
        .post("/api/claid-upload")
        .multipart(image_form(8, 8))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["data"]["status"], "queued");
}

#[tokio::test]
async fn test_claid_upload_forwards_upstream_status() {
    let mut claid = mockito::Server::new_async().await;
    claid
        .mock("POST", UPLOAD_PATH)
        .with_status(503)
        .with_body(r#"{"error":"rate limited"}"#)
        .create_async()
        .await;

    let server = remote_server(&claid.url());
    let response = server
        .post("/api/claid-upload")
        .multipart(image_form(8, 8))
        .await;

    assert_eq!(response.status_code(), 503);
    let body: Value = response.json();
    assert_eq!(body["error"], "Claid API error: 503");
    assert_eq!(body["details"], r#"{"error":"rate limited"}"#);
}

#[tokio::test]
async fn test_claid_upload_non_json_success_is_processing_error() {
    let mut claid = mockito::Server::new_async().await;
    claid
        .mock("POST", UPLOAD_PATH)
        .with_status(200)
        .with_header("content-type", "text/html")
        .with_body("<html>gateway hiccup</html>")
        .create_async()
        .await;

    let server = remote_server(&claid.url());
    let response = server
        .post("/api/claid-upload")
        .multipart(image_form(8, 8))
        .await;

    assert_eq!(response.status_code(), 500);
    let body: Value = response.json();
    assert_eq!(body["error"], "Failed to process image");
    assert_eq!(body["code"], "PROCESSING_ERROR");
    assert!(body["details"].is_string());
}

#[tokio::test]
async fn test_claid_upload_without_api_key_is_configuration_error() {
    let mut claid = mockito::Server::new_async().await;
    let upload = claid
        .mock("POST", UPLOAD_PATH)
        .expect(0)
        .create_async()
        .await;

    let server = server_from_config(test_config(ProcessingBackend::Local, &claid.url(), None));
    let response = server
        .post("/api/claid-upload")
        .multipart(image_form(8, 8))
        .await;

    assert_eq!(response.status_code(), 500);
    let body: Value = response.json();
    assert_eq!(body["error"], "CLAID_API_KEY not configured");
    upload.assert_async().await;
}

#[tokio::test]
async fn test_claid_upload_rejects_malformed_field() {
    let claid = mockito::Server::new_async().await;
    let server = remote_server(&claid.url());

    let form = image_form(8, 8).add_text("decompress", "extreme");
    let response = server.post("/api/claid-upload").multipart(form).await;

    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_claid_upload_without_image_is_bad_request() {
    let claid = mockito::Server::new_async().await;
    let server = remote_server(&claid.url());

    let response = server
        .post("/api/claid-upload")
        .multipart(MultipartForm::new().add_text("width", "100"))
        .await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"], "No image file provided");
}
