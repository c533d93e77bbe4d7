use restyle_core::error::{GENERATION_FAILED_MESSAGE, INVALID_IMAGE_MESSAGE, NO_IMAGE_MESSAGE};
use restyle_core::{
    present, BlobStore, Candidate, GenerateClient, GenerateError, GenerateRequest, IntakeSource,
    StatusKind, View, Workflow, WorkflowError,
};
use std::path::PathBuf;
use std::sync::Arc;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const PAYLOAD: [u8; 10] = [0x89, b'P', b'N', b'G', 1, 2, 3, 4, 5, 6];

fn write_file(dir: &tempfile::TempDir, name: &str, bytes: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, bytes).unwrap();
    path
}

fn request(prompt: &str) -> GenerateRequest {
    GenerateRequest {
        image: Arc::from(&b"fake png bytes"[..]),
        file_name: "cat.png".to_string(),
        media_type: "image/png".to_string(),
        prompt: prompt.to_string(),
    }
}

#[tokio::test]
async fn test_client_sends_multipart_fields() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/generate"))
        .and(body_string_contains("name=\"image\""))
        .and(body_string_contains("filename=\"cat.png\""))
        .and(body_string_contains("name=\"prompt\""))
        .and(body_string_contains("ghibli style"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-type", "image/png")
                .set_body_bytes(PAYLOAD.to_vec()),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = GenerateClient::new(&server.uri());
    let image = client.generate(&request("ghibli style")).await.unwrap();

    assert_eq!(image.bytes, PAYLOAD.to_vec());
    assert_eq!(image.media_type, "image/png");
}

#[tokio::test]
async fn test_client_lets_transport_set_boundary() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![1]))
        .mount(&server)
        .await;

    GenerateClient::new(&server.uri())
        .generate(&request(""))
        .await
        .unwrap();

    let received = server.received_requests().await.unwrap();
    let content_type = received[0]
        .headers
        .get("content-type")
        .and_then(|v| v.to_str().ok())
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("multipart/form-data; boundary="));
}

#[tokio::test]
async fn test_client_reports_status_and_body() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/generate"))
        .respond_with(ResponseTemplate::new(500).set_body_string("out of GPU memory"))
        .mount(&server)
        .await;

    let err = GenerateClient::new(&server.uri())
        .generate(&request("ghibli style"))
        .await
        .unwrap_err();

    match err {
        GenerateError::Request { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "out of GPU memory");
        }
        other => panic!("expected request error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_client_transport_failure() {
    // Nothing listens on port 1.
    let err = GenerateClient::new("http://127.0.0.1:1")
        .generate(&request("x"))
        .await
        .unwrap_err();
    assert!(matches!(err, GenerateError::Transport(_)));
}

#[tokio::test]
async fn test_scenario_cat_png_ghibli_style() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/v1/generate"))
        .and(body_string_contains("ghibli style"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(PAYLOAD.to_vec()))
        .expect(1)
        .mount(&server)
        .await;
    let client = GenerateClient::new(&server.uri());

    let dir = tempfile::tempdir().unwrap();
    let cat = write_file(&dir, "cat.png", b"not really a png");
    let store = BlobStore::new();
    let mut wf = Workflow::with_store(store.clone());

    let staged = wf
        .offer(Candidate::from_path(cat, IntakeSource::Browse))
        .unwrap();
    assert_eq!(staged.file.media_type, "image/png");
    assert!(present(&wf).staged.is_some());

    wf.set_prompt("ghibli style");
    assert!(present(&wf).trigger_enabled);

    let (id, req) = wf.begin_generation().unwrap();
    assert_eq!(wf.status_kind(), StatusKind::Submitting);
    assert!(matches!(present(&wf).main, View::Loading));
    assert!(!present(&wf).trigger_enabled);
    assert!(wf.error().is_none());

    let outcome = client.generate(&req).await;
    assert!(wf.complete_generation(id, outcome));

    assert_eq!(wf.status_kind(), StatusKind::Succeeded);
    assert!(wf.error().is_none());
    let view = present(&wf);
    match view.main {
        View::Result(result) => {
            assert_eq!(result.size(), 10);
            assert_eq!(store.resolve(result.uri()).as_deref(), Some(&PAYLOAD[..]));
        }
        other => panic!("expected result view, got {other:?}"),
    }
    assert!(view.trigger_enabled);
}

#[tokio::test]
async fn test_generate_failure_uses_generic_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("stack trace here"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let mut wf = Workflow::new();
    wf.offer(Candidate::from_path(
        write_file(&dir, "cat.png", b"png"),
        IntakeSource::Drop,
    ))
    .unwrap();

    let status = wf.generate(&GenerateClient::new(&server.uri())).await.unwrap();

    assert_eq!(status, StatusKind::Failed);
    assert_eq!(wf.error(), Some(GENERATION_FAILED_MESSAGE));
    assert!(wf.result().is_none());
    assert!(wf.can_generate());
}

#[tokio::test]
async fn test_generate_transport_failure_settles() {
    let dir = tempfile::tempdir().unwrap();
    let mut wf = Workflow::new();
    wf.offer(Candidate::from_path(
        write_file(&dir, "cat.png", b"png"),
        IntakeSource::Browse,
    ))
    .unwrap();

    let status = wf
        .generate(&GenerateClient::new("http://127.0.0.1:1"))
        .await
        .unwrap();

    assert_eq!(status, StatusKind::Failed);
    assert_eq!(wf.error(), Some(GENERATION_FAILED_MESSAGE));
    assert!(!wf.is_submitting());
}

#[tokio::test]
async fn test_generate_without_image_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut wf = Workflow::new();
    let err = wf
        .generate(&GenerateClient::new(&server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, WorkflowError::Validation(_)));
    assert_eq!(wf.error(), Some(NO_IMAGE_MESSAGE));
    assert_eq!(wf.status_kind(), StatusKind::Idle);
}

#[tokio::test]
async fn test_scenario_notes_txt_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let notes = write_file(&dir, "notes.txt", b"shopping list");
    let mut wf = Workflow::new();

    wf.offer(Candidate::from_path(notes, IntakeSource::Drop))
        .unwrap_err();

    assert_eq!(wf.error(), Some(INVALID_IMAGE_MESSAGE));
    assert!(wf.staged().is_none());
    assert!(!present(&wf).trigger_enabled);

    assert!(wf.generate(&GenerateClient::new(&server.uri())).await.is_err());
}
