//! HTTP tests for the Notion and Cloudinary clients.
//!
//! Uses wiremock to stand in for both APIs.

use std::time::Duration;

use foreman_core::{AssetStore, CoreError, FolderOutcome, RecordStore};
use foreman_models::{ExternalLink, PageId, TaskStatus};
use foreman_remote::{
    CloudinaryConfig, CloudinaryStore, NotionClient, NotionTaskStore, PropertyNames, RemoteError,
    RetryPolicy,
};
use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_retry() -> RetryPolicy {
    RetryPolicy {
        max_attempts: 4,
        base_delay: Duration::from_millis(10),
        max_delay: Duration::from_millis(20),
    }
}

fn cloudinary(server: &MockServer) -> CloudinaryStore {
    let config = CloudinaryConfig {
        cloud_name: "demo".into(),
        api_key: "key".into(),
        api_secret: "secret".into(),
        root: "Project".into(),
    };
    CloudinaryStore::new(config)
        .unwrap()
        .with_base_url(server.uri())
        .with_retry(fast_retry())
}

fn notion(server: &MockServer) -> NotionTaskStore {
    let client = NotionClient::new("secret")
        .unwrap()
        .with_base_url(server.uri())
        .with_retry(fast_retry());
    NotionTaskStore::new(client, "tasks", None).with_properties(PropertyNames::default())
}

async fn request_count(server: &MockServer) -> usize {
    server.received_requests().await.map_or(0, |r| r.len())
}

// =============================================================================
// Cloudinary folders
// =============================================================================

#[tokio::test]
async fn test_folder_created() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/demo/folders/Project/Building"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;

    let outcome = cloudinary(&server).create_folder("Building").await.unwrap();
    assert_eq!(outcome, FolderOutcome::Created);
}

#[tokio::test]
async fn test_conflict_counts_as_existing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/demo/folders/Project/Building"))
        .respond_with(ResponseTemplate::new(409).set_body_string("Folder exists"))
        .mount(&server)
        .await;

    let outcome = cloudinary(&server).create_folder("Building").await.unwrap();
    assert_eq!(outcome, FolderOutcome::AlreadyExists);
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_already_exists_message_counts_as_existing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/demo/folders/Project/Building"))
        .respond_with(
            ResponseTemplate::new(400)
                .set_body_json(json!({ "error": { "message": "Folder already exists" } })),
        )
        .mount(&server)
        .await;

    let outcome = cloudinary(&server).create_folder("Building").await.unwrap();
    assert_eq!(outcome, FolderOutcome::AlreadyExists);
}

#[tokio::test]
async fn test_unavailable_then_created() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/demo/folders/Project/Building/Roof"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/demo/folders/Project/Building/Roof"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .mount(&server)
        .await;

    let outcome = cloudinary(&server).create_folder("Building/Roof").await.unwrap();
    assert_eq!(outcome, FolderOutcome::Created);
    assert_eq!(request_count(&server).await, 3);
}

#[tokio::test]
async fn test_unavailable_gives_up_after_max_attempts() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let result = cloudinary(&server).create_folder("Building").await;
    assert!(result.is_err());
    assert_eq!(request_count(&server).await, 4);
}

// =============================================================================
// Notion pages
// =============================================================================

#[tokio::test]
async fn test_missing_page_is_not_found() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pages/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_string("object_not_found"))
        .mount(&server)
        .await;

    let client = NotionClient::new("secret")
        .unwrap()
        .with_base_url(server.uri())
        .with_retry(fast_retry());
    let err = client.get_page(&PageId::from_string("missing")).await.unwrap_err();
    assert!(matches!(err, RemoteError::NotFound(body) if body.contains("object_not_found")));
    assert_eq!(request_count(&server).await, 1);
}

#[tokio::test]
async fn test_status_update_on_missing_page() {
    let server = MockServer::start().await;
    Mock::given(method("PATCH"))
        .and(path("/pages/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = notion(&server)
        .update_status(&PageId::from_string("missing"), TaskStatus::Done)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound(_)));
}

#[tokio::test]
async fn test_attachment_appended_after_existing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/pages/page-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "page-1",
            "properties": {
                "Вложения": {
                    "files": [
                        { "name": "plan", "type": "external", "external": { "url": "https://a/plan.pdf" } }
                    ]
                }
            }
        })))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path("/pages/page-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "page-1" })))
        .mount(&server)
        .await;

    let link = ExternalLink::new("photo", "https://b/photo.jpg");
    let count = notion(&server)
        .append_attachment(&PageId::from_string("page-1"), &link)
        .await
        .unwrap();
    assert_eq!(count, 2);

    let requests = server.received_requests().await.unwrap();
    let patch = requests
        .iter()
        .find(|r| r.method.as_str() == "PATCH")
        .expect("attachment list patched");
    let body: Value = serde_json::from_slice(&patch.body).unwrap();
    let files = body
        .pointer("/properties/Вложения/files")
        .and_then(Value::as_array)
        .unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0]["external"]["url"], "https://a/plan.pdf");
    assert_eq!(files[1]["name"], "photo");
    assert_eq!(files[1]["external"]["url"], "https://b/photo.jpg");
}
