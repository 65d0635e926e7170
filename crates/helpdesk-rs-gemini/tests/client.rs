//! HTTP-level tests for the Gemini client against a mock server.

use helpdesk_rs_gemini::GeminiProvider;
use helpdesk_rs_protocol::{
    AspectRatio, ContentRequest, GenerativeProvider, GroundingSource, ImageRequest, Part,
    ProviderError, VideoOperation, VideoRequest,
};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};
use std::time::Duration;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn provider(server: &MockServer) -> GeminiProvider {
    GeminiProvider::new(
        format!("{}/v1beta/", server.uri()),
        "test-key",
        Duration::from_secs(5),
    )
    .expect("provider")
}

fn text_request(model: &str, text: &str) -> ContentRequest {
    ContentRequest {
        model: model.to_string(),
        system_instruction: Some("Answer briefly.".to_string()),
        parts: vec![Part::Text(text.to_string())],
        ..ContentRequest::default()
    }
}

async fn first_body(server: &MockServer) -> Value {
    let requests = server.received_requests().await.expect("recorded requests");
    requests[0].body_json().expect("json body")
}

/// generateContent posts to the model path with the API key header.
#[tokio::test]
async fn generate_content_parses_text_and_sources() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/gemini-2.5-flash:generateContent"))
        .and(header("x-goog-api-key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": { "role": "model", "parts": [{ "text": "Hello " }, { "text": "world" }] },
                "groundingMetadata": { "groundingChunks": [
                    { "web": { "uri": "https://example.org", "title": "Example" } }
                ]}
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = provider(&server)
        .generate_content(text_request("models/gemini-2.5-flash", "Hi"))
        .await
        .expect("response");
    assert_eq!(response.text(), "Hello world");
    assert_eq!(
        response.sources,
        vec![GroundingSource {
            title: "Example".to_string(),
            uri: "https://example.org".to_string(),
        }]
    );

    let body = first_body(&server).await;
    assert_eq!(body["systemInstruction"]["parts"][0]["text"], "Answer briefly.");
    assert_eq!(body["contents"][0]["parts"][0]["text"], "Hi");
}

/// Error envelopes become `ProviderError::Api` with the provider message.
#[tokio::test]
async fn error_envelope_maps_to_api_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": { "code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT" }
        })))
        .mount(&server)
        .await;

    let err = provider(&server)
        .generate_content(text_request("gemini-2.5-flash", "Hi"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ProviderError::Api {
            status: 400,
            message: "API key not valid.".to_string(),
        }
    );
}

/// Non-JSON error bodies are passed through as the message.
#[tokio::test]
async fn plain_error_body_is_kept() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
        .mount(&server)
        .await;

    let err = provider(&server)
        .generate_content(text_request("gemini-2.5-flash", "Hi"))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ProviderError::Api {
            status: 503,
            message: "upstream unavailable".to_string(),
        }
    );
}

/// Malformed success bodies are reported as decode errors.
#[tokio::test]
async fn malformed_success_body_is_a_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = provider(&server)
        .generate_content(text_request("gemini-2.5-flash", "Hi"))
        .await
        .unwrap_err();
    assert!(matches!(err, ProviderError::Decode(_)));
}

/// Imagen predictions are returned in order with their MIME types.
#[tokio::test]
async fn generate_images_reads_predictions() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/imagen-4.0-generate-001:predict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "predictions": [
                { "bytesBase64Encoded": "aW1n", "mimeType": "image/png" },
                { "raiFilteredReason": "filtered" }
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let images = provider(&server)
        .generate_images(ImageRequest {
            model: "imagen-4.0-generate-001".to_string(),
            prompt: "A well".to_string(),
            aspect_ratio: AspectRatio::Portrait,
            number_of_images: 1,
        })
        .await
        .expect("images");
    assert_eq!(images.len(), 1);
    assert_eq!(images[0].data_uri(), "data:image/png;base64,aW1n");

    let body = first_body(&server).await;
    assert_eq!(
        body,
        json!({
            "instances": [{ "prompt": "A well" }],
            "parameters": { "sampleCount": 1, "aspectRatio": "3:4" }
        })
    );
}

/// Video jobs start with predictLongRunning and are polled by operation name.
#[tokio::test]
async fn video_job_start_and_poll() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1beta/models/veo-3.1-fast-generate-preview:predictLongRunning"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "name": "models/veo/operations/abc123" })),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1beta/models/veo/operations/abc123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "models/veo/operations/abc123",
            "done": true,
            "response": { "generateVideoResponse": { "generatedSamples": [
                { "video": { "uri": "https://files.example/abc123.mp4" } }
            ]}}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let provider = provider(&server);
    let started = provider
        .start_video(VideoRequest {
            model: "veo-3.1-fast-generate-preview".to_string(),
            prompt: "A river cleanup".to_string(),
            seed_image: None,
            aspect_ratio: AspectRatio::Wide,
            resolution: "720p".to_string(),
        })
        .await
        .expect("start");
    assert_eq!(started, VideoOperation::running("models/veo/operations/abc123"));

    let finished = provider.poll_video(&started).await.expect("poll");
    assert_eq!(
        finished,
        VideoOperation::completed(
            "models/veo/operations/abc123",
            "https://files.example/abc123.mp4"
        )
    );
}

/// Operation-level errors are reported on the returned operation.
#[tokio::test]
async fn failed_operation_carries_error_message() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "name": "operations/bad",
            "done": true,
            "error": { "code": 3, "message": "prompt rejected" }
        })))
        .mount(&server)
        .await;

    let polled = provider(&server)
        .poll_video(&VideoOperation::running("operations/bad"))
        .await
        .expect("poll");
    assert!(polled.done);
    assert_eq!(polled.error.as_deref(), Some("prompt rejected"));
    assert_eq!(polled.video_uri, None);
}
