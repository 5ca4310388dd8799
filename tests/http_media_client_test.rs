//! HTTP media client against a mock media service.

use mockito::Matcher;

use hireflow::adapters::media::HttpMediaClient;
use hireflow::domain::errors::AssetError;
use hireflow::domain::models::{DestroyResult, MediaConfig, UploadOptions};
use hireflow::domain::ports::RemoteAssetClient;

// base64("key:secret")
const BASIC_AUTH: &str = "Basic a2V5OnNlY3JldA==";

fn client_for(server: &mockito::Server) -> HttpMediaClient {
    let config = MediaConfig {
        base_url: server.url(),
        cloud_name: "demo".into(),
        api_key: "key".into(),
        api_secret: "secret".into(),
        timeout_secs: 5,
        ..MediaConfig::default()
    };
    HttpMediaClient::new(&config).unwrap()
}

fn pdf_options() -> UploadOptions {
    UploadOptions {
        file_name: Some("cv.pdf".into()),
        content_type: Some("application/pdf".into()),
    }
}

#[tokio::test]
async fn test_upload_success() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/v1_1/demo/raw/upload")
        .match_header("authorization", BASIC_AUTH)
        .match_body(Matcher::AllOf(vec![
            Matcher::Regex("name=\"folder\"".into()),
            Matcher::Regex("applications".into()),
            Matcher::Regex("filename=\"cv.pdf\"".into()),
        ]))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{"public_id":"applications/xyz","secure_url":"https://cdn.example/applications/xyz.pdf"}"#,
        )
        .create_async()
        .await;

    let client = client_for(&server);
    let asset = client
        .upload(b"%PDF-1.7", "applications", &pdf_options())
        .await
        .unwrap();

    assert_eq!(asset.id, "applications/xyz");
    assert_eq!(asset.url, "https://cdn.example/applications/xyz.pdf");
    mock.assert_async().await;
}

#[tokio::test]
async fn test_upload_falls_back_to_plain_url() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/v1_1/demo/raw/upload")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"public_id":"applications/xyz","url":"http://cdn.example/xyz"}"#)
        .create_async()
        .await;

    let asset = client_for(&server)
        .upload(b"x", "applications", &UploadOptions::default())
        .await
        .unwrap();
    assert_eq!(asset.url, "http://cdn.example/xyz");
}

#[tokio::test]
async fn test_upload_status_classification() {
    let cases = [
        (401, "config"),
        (403, "config"),
        (400, "rejected"),
        (413, "rejected"),
        (429, "unavailable"),
        (500, "unavailable"),
        (503, "unavailable"),
    ];

    for (status, expected) in cases {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1_1/demo/raw/upload")
            .with_status(status)
            .with_body(r#"{"error":{"message":"nope"}}"#)
            .create_async()
            .await;

        let err = client_for(&server)
            .upload(b"x", "applications", &pdf_options())
            .await
            .unwrap_err();

        let kind = match err {
            AssetError::StoreConfig(_) => "config",
            AssetError::Rejected { status: s, .. } => {
                assert_eq!(usize::from(s), status);
                "rejected"
            }
            AssetError::StoreUnavailable(_) => "unavailable",
            ref other => panic!("unexpected error for {status}: {other:?}"),
        };
        assert_eq!(kind, expected, "status {status}");
    }
}

#[tokio::test]
async fn test_destroy_results() {
    let mut server = mockito::Server::new_async().await;
    let ok = server
        .mock("POST", "/v1_1/demo/raw/destroy")
        .match_header("authorization", BASIC_AUTH)
        .match_body(Matcher::UrlEncoded("public_id".into(), "applications/a1".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"result":"ok"}"#)
        .create_async()
        .await;
    let gone = server
        .mock("POST", "/v1_1/demo/raw/destroy")
        .match_body(Matcher::UrlEncoded("public_id".into(), "applications/a2".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"result":"not found"}"#)
        .create_async()
        .await;
    let missing = server
        .mock("POST", "/v1_1/demo/raw/destroy")
        .match_body(Matcher::UrlEncoded("public_id".into(), "applications/a3".into()))
        .with_status(404)
        .create_async()
        .await;

    let client = client_for(&server);
    assert_eq!(client.destroy("applications/a1").await.unwrap(), DestroyResult::Destroyed);
    assert_eq!(client.destroy("applications/a2").await.unwrap(), DestroyResult::NotFound);
    assert_eq!(client.destroy("applications/a3").await.unwrap(), DestroyResult::NotFound);

    ok.assert_async().await;
    gone.assert_async().await;
    missing.assert_async().await;
}

#[tokio::test]
async fn test_unreachable_service_is_transient() {
    let config = MediaConfig {
        // Nothing listens on the discard port
        base_url: "http://127.0.0.1:9".into(),
        cloud_name: "demo".into(),
        api_key: "key".into(),
        api_secret: "secret".into(),
        timeout_secs: 2,
        ..MediaConfig::default()
    };
    let client = HttpMediaClient::new(&config).unwrap();

    let err = client.destroy("applications/a1").await.unwrap_err();
    assert!(err.is_transient(), "got {err:?}");
}
