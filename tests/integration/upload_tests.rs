//! Upload authorization integration tests.
//!
//! Tests verify:
//! - Successful grants and object key shape
//! - Extension validation (missing, disallowed, case-insensitive)
//! - Path stripping of traversal-looking filenames
//! - Signing failures are hidden behind a generic 500

use std::time::Duration;

use axum::http::StatusCode;
use serde_json::{json, Value};

use pic_gateway::UploadPolicy;

use super::test_utils::{
    assert_envelope_headers, get_json, is_lower_hex, test_router, test_router_with_policy,
    MockStatusStore, MockUploadSigner, TEST_BUCKET,
};

fn router_with(signer: MockUploadSigner) -> axum::Router {
    test_router(MockStatusStore::new("pic_id"), signer)
}

fn object_key(body: &Value) -> &str {
    body["object_key"].as_str().expect("object_key is a string")
}

// =============================================================================
// Successful Grants
// =============================================================================

#[tokio::test]
async fn test_upload_grant_success() {
    let signer = MockUploadSigner::new();
    let router = router_with(signer.clone());

    let (status, headers, body) = get_json(router, "/upload?filename=mycat.jpg").await;

    assert_eq!(status, StatusCode::OK);
    assert_envelope_headers(&headers);

    let key = object_key(&body).to_string();
    assert_eq!(body["expires_in"], json!(600));
    assert_eq!(
        body["upload_url"],
        json!(format!(
            "https://mock-storage.local/{}/{}?X-Amz-Expires=600",
            TEST_BUCKET, key
        ))
    );
    assert_eq!(body.as_object().unwrap().len(), 3);

    let requests = signer.get_requests().await;
    assert_eq!(
        requests,
        vec![(TEST_BUCKET.to_string(), key, Duration::from_secs(600))]
    );
}

#[tokio::test]
async fn test_upload_object_key_shape() {
    let router = router_with(MockUploadSigner::new());

    let (_, _, body) = get_json(router, "/upload?filename=holiday.png").await;
    let key = object_key(&body);

    assert_eq!(key.len(), 32 + ".png".len());
    assert!(key.ends_with(".png"));
    assert!(is_lower_hex(&key[..32]), "{key} should start with 32 hex digits");
}

#[tokio::test]
async fn test_upload_uppercase_extension_normalized() {
    let router = router_with(MockUploadSigner::new());

    let (status, _, body) = get_json(router, "/upload?filename=mycat.JPG").await;

    assert_eq!(status, StatusCode::OK);
    assert!(object_key(&body).ends_with(".jpg"));
}

#[tokio::test]
async fn test_upload_path_traversal_is_stripped() {
    let signer = MockUploadSigner::new();
    let router = router_with(signer.clone());

    let (status, _, body) = get_json(router, "/upload?filename=../../etc/passwd.png").await;

    assert_eq!(status, StatusCode::OK);
    let key = object_key(&body);
    assert!(key.ends_with(".png"));
    assert!(!key.contains('/'));
    assert!(!key.contains("passwd"));
}

#[tokio::test]
async fn test_upload_consecutive_keys_differ() {
    let router = router_with(MockUploadSigner::new());

    let (_, _, first) = get_json(router.clone(), "/upload?filename=mycat.jpg").await;
    let (_, _, second) = get_json(router, "/upload?filename=mycat.jpg").await;

    assert_ne!(object_key(&first), object_key(&second));
}

#[tokio::test]
async fn test_upload_custom_policy() {
    let policy = UploadPolicy::new("custom-bucket")
        .with_expiry_secs(120)
        .with_allowed_extensions([".webp", ".png"]);
    let signer = MockUploadSigner::new();
    let router = test_router_with_policy(MockStatusStore::new("pic_id"), signer.clone(), policy);

    let (status, _, body) = get_json(router.clone(), "/upload?filename=a.WebP").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["expires_in"], json!(120));
    assert!(object_key(&body).ends_with(".webp"));

    let requests = signer.get_requests().await;
    assert_eq!(requests[0].0, "custom-bucket");
    assert_eq!(requests[0].2, Duration::from_secs(120));

    let (status, _, body) = get_json(router, "/upload?filename=a.jpg").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body,
        json!({
            "error": "Only .png or .webp uploads are allowed",
            "allowed_extensions": [".png", ".webp"],
        })
    );
}

// =============================================================================
// Validation Errors
// =============================================================================

#[tokio::test]
async fn test_upload_missing_filename() {
    let signer = MockUploadSigner::new();
    let router = router_with(signer.clone());

    let (status, headers, body) = get_json(router, "/upload").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_envelope_headers(&headers);
    assert_eq!(
        body,
        json!({"error": "filename query param must include an extension"})
    );
    assert!(signer.get_requests().await.is_empty());
}

#[tokio::test]
async fn test_upload_filenames_without_extension() {
    for uri in [
        "/upload?filename=",
        "/upload?filename=mycat",
        "/upload?filename=some.dir/mycat",
    ] {
        let router = router_with(MockUploadSigner::new());
        let (status, _, body) = get_json(router, uri).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(
            body,
            json!({"error": "filename query param must include an extension"}),
            "{uri}"
        );
    }
}

#[tokio::test]
async fn test_upload_disallowed_extension() {
    let signer = MockUploadSigner::new();
    let router = router_with(signer.clone());

    let (status, headers, body) = get_json(router, "/upload?filename=archive.zip").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_envelope_headers(&headers);
    assert_eq!(
        body,
        json!({
            "error": "Only .jpg or .png uploads are allowed",
            "allowed_extensions": [".jpg", ".png"],
        })
    );
    assert!(signer.get_requests().await.is_empty());
}

#[tokio::test]
async fn test_upload_disallowed_extensions_case_insensitive() {
    for filename in ["photo.JPEG", "photo.gif", "photo.", "photo.png.exe"] {
        let router = router_with(MockUploadSigner::new());
        let (status, _, body) = get_json(router, &format!("/upload?filename={filename}")).await;

        assert_eq!(status, StatusCode::BAD_REQUEST, "{filename}");
        assert_eq!(body["allowed_extensions"], json!([".jpg", ".png"]), "{filename}");
    }
}

// =============================================================================
// Signing Failures
// =============================================================================

#[tokio::test]
async fn test_upload_signing_failure_is_generic() {
    let signer = MockUploadSigner::failing();
    let router = router_with(signer.clone());

    let (status, headers, body) = get_json(router, "/s3_upload?filename=mycat.png").await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_envelope_headers(&headers);
    assert_eq!(body, json!({"error": "Failed to generate upload URL"}));
    assert_eq!(signer.get_requests().await.len(), 1, "failures are not retried");
}
