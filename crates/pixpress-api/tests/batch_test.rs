//! Batch workflow tests: upload, process, download, reset.
//!
//! Run with: `cargo test -p pixpress-api --test batch_test`

mod helpers;

use axum_test::multipart::{MultipartForm, Part};
use axum_test::TestServer;
use helpers::fixtures::{create_png, image_part};
use helpers::{local_server, remote_server};
use serde_json::{json, Value};
use std::io::{Cursor, Read};

async fn upload(server: &TestServer, names: &[&str]) -> Value {
    let form = names.iter().fold(MultipartForm::new(), |form, name| {
        form.add_part("files", image_part(create_png(16, 12), name))
    });
    let response = server.post("/api/batch/images").multipart(form).await;
    assert_eq!(response.status_code(), 201);
    response.json()
}

fn zip_entries(data: &[u8]) -> Vec<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(data)).unwrap();
    let mut names = Vec::new();
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).unwrap();
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents).unwrap();
        assert!(!contents.is_empty());
        names.push(entry.name().to_string());
    }
    names.sort();
    names
}

#[tokio::test]
async fn test_upload_creates_pending_records() {
    let server = local_server();
    let png_len = create_png(16, 12).len();

    let body = upload(&server, &["a.png", "b.png"]).await;

    let images = body["images"].as_array().unwrap();
    assert_eq!(images.len(), 2);
    assert_ne!(images[0]["id"], images[1]["id"]);
    for image in images {
        assert_eq!(image["status"], "pending");
        assert_eq!(image["original_size"], png_len);
        let id = image["id"].as_str().unwrap();
        assert_eq!(
            image["preview_url"],
            format!("/api/batch/images/{}/preview", id)
        );
    }
    assert_eq!(body["summary"]["total"], 2);
    assert_eq!(body["summary"]["pending"], 2);
    assert_eq!(body["summary"]["download_ready"], false);
}

#[tokio::test]
async fn test_upload_ignores_non_image_files() {
    let server = local_server();

    let form = MultipartForm::new()
        .add_part(
            "files",
            Part::text("not an image")
                .file_name("notes.txt")
                .mime_type("text/plain"),
        )
        .add_part("files", image_part(create_png(4, 4), "kept.png"));
    let response = server.post("/api/batch/images").multipart(form).await;

    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    assert_eq!(body["images"].as_array().unwrap().len(), 1);
    assert_eq!(body["images"][0]["file_name"], "kept.png");
}

#[tokio::test]
async fn test_upload_with_only_non_images_is_rejected() {
    let server = local_server();

    let form = MultipartForm::new().add_part(
        "files",
        Part::text("hello").file_name("a.txt").mime_type("text/plain"),
    );
    let response = server.post("/api/batch/images").multipart(form).await;

    assert_eq!(response.status_code(), 400);
    let body: Value = response.json();
    assert_eq!(body["error"], "No image files provided");
}

#[tokio::test]
async fn test_preview_and_remove() {
    let server = local_server();
    let body = upload(&server, &["a.png"]).await;
    let id = body["images"][0]["id"].as_str().unwrap().to_string();

    let preview = server
        .get(&format!("/api/batch/images/{}/preview", id))
        .await;
    assert_eq!(preview.status_code(), 200);
    assert_eq!(preview.header("content-type"), "image/png");
    assert_eq!(preview.as_bytes().len(), create_png(16, 12).len());

    let removed = server.delete(&format!("/api/batch/images/{}", id)).await;
    assert_eq!(removed.status_code(), 204);

    let again = server.delete(&format!("/api/batch/images/{}", id)).await;
    assert_eq!(again.status_code(), 404);

    let batch: Value = server.get("/api/batch").await.json();
    assert_eq!(batch["summary"]["total"], 0);
}

#[tokio::test]
async fn test_process_all_then_download_archive() {
    let server = local_server();
    upload(&server, &["a.png", "b.png"]).await;

    let response = server
        .post("/api/batch/process")
        .json(&json!({ "preset": "YouTube Thumbnail", "quality": 70 }))
        .await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["report"]["processed"], 2);
    assert_eq!(body["report"]["completed"], 2);
    assert_eq!(body["report"]["failed"], 0);
    assert_eq!(body["summary"]["completed"], 2);
    assert_eq!(body["summary"]["pending"], 0);
    assert_eq!(body["summary"]["is_processing"], false);
    assert_eq!(body["summary"]["download_ready"], true);

    let batch: Value = server.get("/api/batch").await.json();
    for image in batch["images"].as_array().unwrap() {
        assert_eq!(image["status"], "completed");
        assert!(image["processed_size"].as_u64().unwrap() > 0);
        assert!(image["size_change_percent"].is_i64());
    }

    let download = server.get("/api/batch/download").await;
    assert_eq!(download.status_code(), 200);
    assert_eq!(download.header("content-type"), "application/zip");
    let disposition = download.header("content-disposition");
    let disposition = disposition.to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"processed-images-"));
    assert!(disposition.ends_with(".zip\""));

    assert_eq!(
        zip_entries(download.as_bytes()),
        vec!["processed_a.png".to_string(), "processed_b.png".to_string()]
    );
}

#[tokio::test]
async fn test_process_empty_batch_reports_nothing() {
    let server = local_server();

    let response = server.post("/api/batch/process").json(&json!({})).await;

    assert_eq!(response.status_code(), 200);
    let body: Value = response.json();
    assert_eq!(body["report"]["processed"], 0);
}

#[tokio::test]
async fn test_process_with_unknown_preset_is_rejected() {
    let server = local_server();
    upload(&server, &["a.png"]).await;

    let response = server
        .post("/api/batch/process")
        .json(&json!({ "preset": "Billboard" }))
        .await;

    assert_eq!(response.status_code(), 400);
    let batch: Value = server.get("/api/batch").await.json();
    assert_eq!(batch["images"][0]["status"], "pending");
}

#[tokio::test]
async fn test_download_before_processing_is_conflict() {
    let server = local_server();
    upload(&server, &["a.png"]).await;

    let response = server.get("/api/batch/download").await;

    assert_eq!(response.status_code(), 409);
}

#[tokio::test]
async fn test_reset_requires_confirmation() {
    let server = local_server();
    upload(&server, &["a.png", "b.png"]).await;

    let refused = server
        .post("/api/batch/reset")
        .json(&json!({ "confirm": false }))
        .await;
    assert_eq!(refused.status_code(), 409);
    let body: Value = refused.json();
    assert_eq!(body["code"], "CONFIRMATION_REQUIRED");

    let accepted = server
        .post("/api/batch/reset")
        .json(&json!({ "confirm": true }))
        .await;
    assert_eq!(accepted.status_code(), 200);
    let body: Value = accepted.json();
    assert_eq!(body["removed"], 2);

    let batch: Value = server.get("/api/batch").await.json();
    assert_eq!(batch["summary"]["total"], 0);
}

#[tokio::test]
async fn test_remote_failure_marks_only_that_image() {
    let mut claid = mockito::Server::new_async().await;
    let tmp_url = format!("{}/tmp/good.jpg", claid.url());
    claid
        .mock("POST", "/v1/image/edit/upload")
        .match_body(mockito::Matcher::Regex("bad\\.png".to_string()))
        .with_status(503)
        .with_body(r#"{"error":"rate limited"}"#)
        .create_async()
        .await;
    claid
        .mock("POST", "/v1/image/edit/upload")
        .match_body(mockito::Matcher::Regex("good\\.png".to_string()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "data": { "output": { "tmp_url": tmp_url } } }).to_string())
        .create_async()
        .await;
    claid
        .mock("GET", "/tmp/good.jpg")
        .with_status(200)
        .with_body(vec![3u8; 40])
        .create_async()
        .await;

    let server = remote_server(&claid.url());
    upload(&server, &["bad.png", "good.png"]).await;

    let body: Value = server
        .post("/api/batch/process")
        .json(&json!({}))
        .await
        .json();
    assert_eq!(body["report"]["completed"], 1);
    assert_eq!(body["report"]["failed"], 1);

    let batch: Value = server.get("/api/batch").await.json();
    let images = batch["images"].as_array().unwrap();
    let bad = images.iter().find(|i| i["file_name"] == "bad.png").unwrap();
    assert_eq!(bad["status"], "error");
    assert_eq!(bad["error"], "Claid API error: 503");
    let good = images.iter().find(|i| i["file_name"] == "good.png").unwrap();
    assert_eq!(good["status"], "completed");
    assert_eq!(good["processed_size"], 40);

    let download = server.get("/api/batch/download").await;
    assert_eq!(
        zip_entries(download.as_bytes()),
        vec!["processed_good.png".to_string()]
    );
}
