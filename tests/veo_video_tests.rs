//! Integration tests for the Veo client's start/poll/download pipeline.

use std::time::Duration;

use nanoveo::auth::Credentials;
use nanoveo::codec::EncodedAsset;
use nanoveo::video::{VeoClient, VideoEvent, VideoGenerator, VideoRequest};
use nanoveo::NanoVeoError;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const START_PATH: &str = "/models/veo-3.0-fast-generate-001:predictLongRunning";
const STATUS_PATH: &str = "/operations/op-1";

fn test_client(server: &MockServer) -> VeoClient {
    VeoClient::builder()
        .credentials(Credentials::new("test-key").unwrap())
        .base_url(server.uri())
        .poll_interval(Duration::from_millis(5))
        .build()
        .unwrap()
}

fn test_request() -> VideoRequest {
    let png = EncodedAsset::from_bytes(&[
        0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0,
    ])
    .unwrap();
    VideoRequest::new("animate it", png)
}

async fn mount_start(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path(START_PATH))
        .and(header("x-goog-api-key", "test-key"))
        .and(body_partial_json(json!({
            "parameters": {"numberOfVideos": 1, "aspectRatio": "9:16"}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "operations/op-1",
            "done": false
        })))
        .expect(1)
        .mount(server)
        .await;
}

/// Status returns done=false for `pending` calls, then done=true pointing at
/// the download URI.
async fn mount_status_sequence(server: &MockServer, pending: u64, video_uri: &str) {
    if pending > 0 {
        Mock::given(method("GET"))
            .and(path(STATUS_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "operations/op-1",
                "done": false
            })))
            .up_to_n_times(pending)
            .expect(pending)
            .mount(server)
            .await;
    }

    Mock::given(method("GET"))
        .and(path(STATUS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "operations/op-1",
            "done": true,
            "response": {
                "generatedVideos": [{"video": {"uri": video_uri}}]
            }
        })))
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn generate_polls_until_done_and_downloads() {
    let server = MockServer::start().await;
    let video_uri = format!("{}/files/video.mp4", server.uri());

    mount_start(&server).await;
    mount_status_sequence(&server, 2, &video_uri).await;

    Mock::given(method("GET"))
        .and(path("/files/video.mp4"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"mp4-bytes".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let video = test_client(&server)
        .generate(&test_request())
        .await
        .unwrap();

    assert_eq!(video.data, b"mp4-bytes");
    assert_eq!(video.mime_type, "video/mp4");
    // done=false twice, done=true on the third status call.
    assert_eq!(video.metadata.polls, 3);
    assert_eq!(
        video.metadata.model.as_deref(),
        Some("veo-3.0-fast-generate-001")
    );
}

#[tokio::test]
async fn generate_times_out_after_poll_bound() {
    let server = MockServer::start().await;

    mount_start(&server).await;

    // Never done; the client must stop at the bound, not keep calling.
    Mock::given(method("GET"))
        .and(path(STATUS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "operations/op-1",
            "done": false
        })))
        .expect(3)
        .mount(&server)
        .await;

    let client = VeoClient::builder()
        .credentials(Credentials::new("test-key").unwrap())
        .base_url(server.uri())
        .poll_interval(Duration::from_millis(5))
        .max_polls(3)
        .build()
        .unwrap();

    let err = client.generate(&test_request()).await.unwrap_err();
    match err {
        NanoVeoError::PollTimeout { attempts, .. } => assert_eq!(attempts, 3),
        other => panic!("expected PollTimeout, got: {other:?}"),
    }
}

#[tokio::test]
async fn generate_surfaces_job_error_without_downloading() {
    let server = MockServer::start().await;

    mount_start(&server).await;

    Mock::given(method("GET"))
        .and(path(STATUS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "operations/op-1",
            "done": true,
            "error": {"message": "Quota exceeded"}
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/files/video.mp4"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = test_client(&server)
        .generate(&test_request())
        .await
        .unwrap_err();
    assert!(matches!(err, NanoVeoError::JobFailed(msg) if msg == "Quota exceeded"));
}

#[tokio::test]
async fn generate_maps_empty_job_to_empty_result() {
    let server = MockServer::start().await;

    mount_start(&server).await;

    Mock::given(method("GET"))
        .and(path(STATUS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "operations/op-1",
            "done": true,
            "response": {"generatedVideos": []}
        })))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .generate(&test_request())
        .await
        .unwrap_err();
    assert!(matches!(err, NanoVeoError::EmptyResult));
}

#[tokio::test]
async fn generate_reports_blocked_job() {
    let server = MockServer::start().await;

    mount_start(&server).await;

    Mock::given(method("GET"))
        .and(path(STATUS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "operations/op-1",
            "done": true,
            "response": {
                "generatedVideos": [],
                "promptFeedback": {"blockReason": "SAFETY"}
            }
        })))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .generate(&test_request())
        .await
        .unwrap_err();
    assert!(matches!(err, NanoVeoError::ContentBlocked(reason) if reason == "SAFETY"));
}

#[tokio::test]
async fn generate_maps_failed_download_to_status() {
    let server = MockServer::start().await;
    let video_uri = format!("{}/files/video.mp4", server.uri());

    mount_start(&server).await;
    mount_status_sequence(&server, 0, &video_uri).await;

    Mock::given(method("GET"))
        .and(path("/files/video.mp4"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .generate(&test_request())
        .await
        .unwrap_err();
    assert!(matches!(err, NanoVeoError::DownloadFailed(404)));
}

#[tokio::test]
async fn generate_maps_failed_start_call() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(START_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;

    let err = test_client(&server)
        .generate(&test_request())
        .await
        .unwrap_err();
    assert!(matches!(err, NanoVeoError::StartFailed(msg) if msg.contains("500")));
}

#[tokio::test]
async fn generate_streaming_emits_bounded_progress_sequence() {
    let server = MockServer::start().await;
    let video_uri = format!("{}/files/video.mp4", server.uri());

    mount_start(&server).await;
    // done=false once, done=true on the second status call.
    mount_status_sequence(&server, 1, &video_uri).await;

    Mock::given(method("GET"))
        .and(path("/files/video.mp4"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"mp4-bytes".to_vec()))
        .mount(&server)
        .await;

    let mut events = test_client(&server).generate_streaming(test_request());

    let mut progress = Vec::new();
    let video = loop {
        match events.recv().await.expect("stream ended early") {
            VideoEvent::Progress(message) => progress.push(message),
            VideoEvent::Finished(video) => break video,
            VideoEvent::Failed(err) => panic!("generation failed: {err}"),
        }
    };

    // A start message, one per status check, and a completion message.
    assert_eq!(progress.len(), 4);
    assert_eq!(progress[0], "Starting video generation...");
    assert!(progress[1].contains("attempt 1"));
    assert!(progress[2].contains("attempt 2"));
    assert_eq!(progress[3], "Video ready.");

    assert_eq!(video.data, b"mp4-bytes");

    // The terminal event closes the stream.
    assert!(events.recv().await.is_none());
}

#[tokio::test]
async fn generate_streaming_terminates_with_failure_event() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(START_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .mount(&server)
        .await;

    let mut events = test_client(&server).generate_streaming(test_request());

    let mut saw_failure = false;
    while let Some(event) = events.recv().await {
        match event {
            VideoEvent::Progress(_) => {}
            VideoEvent::Finished(_) => panic!("expected failure"),
            VideoEvent::Failed(err) => {
                assert!(matches!(err, NanoVeoError::StartFailed(_)));
                saw_failure = true;
            }
        }
    }
    assert!(saw_failure);
}
