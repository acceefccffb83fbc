//! Provider-boundary contract tests against a mock HTTP server.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use solace::config::{ChatConfig, TtsConfig};
use solace::error::ConverseError;
use solace::reply::{FacialExpression, GenerateReplies, ReplyGenerator};
use solace::tts::{ElevenLabsSynthesizer, SynthesizeSpeech};
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn chat_config(server: &MockServer) -> ChatConfig {
    ChatConfig {
        api_url: server.uri(),
        ..Default::default()
    }
}

fn completion_with_content(content: &str) -> serde_json::Value {
    serde_json::json!({
        "choices": [{
            "index": 0,
            "message": {"role": "assistant", "content": content},
            "finish_reason": "stop"
        }]
    })
}

#[tokio::test]
async fn generator_parses_a_valid_completion() {
    let server = MockServer::start().await;
    let reply = r#"{"messages": [
        {"text": "Hi there!", "facialExpression": "smile", "animation": "TalkingOne"},
        {"text": "How can I help?", "facialExpression": "default", "animation": "Idle"}
    ]}"#;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("authorization", "Bearer test-key"))
        .and(body_partial_json(serde_json::json!({"model": "gemini-2.5-pro"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_with_content(reply)))
        .expect(1)
        .mount(&server)
        .await;

    let generator = ReplyGenerator::new(&chat_config(&server), "test-key".to_owned());
    let segments = generator.generate("hello").await.unwrap();
    assert_eq!(segments.len(), 2);
    assert_eq!(segments[0].facial_expression, FacialExpression::Smile);
}

#[tokio::test]
async fn generator_maps_provider_error_status_to_upstream_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
        .mount(&server)
        .await;

    let generator = ReplyGenerator::new(&chat_config(&server), "test-key".to_owned());
    let err = generator.generate("hello").await.unwrap_err();
    match err {
        ConverseError::UpstreamUnavailable(detail) => {
            assert!(detail.contains("503"));
        }
        other => panic!("expected UpstreamUnavailable, got {other:?}"),
    }
}

#[tokio::test]
async fn generator_rejects_prose_content_as_schema_violation() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(completion_with_content("Sorry, I can't help with that.")),
        )
        .mount(&server)
        .await;

    let generator = ReplyGenerator::new(&chat_config(&server), "test-key".to_owned());
    assert!(matches!(
        generator.generate("hello").await,
        Err(ConverseError::SchemaViolation(_))
    ));
}

#[tokio::test]
async fn generator_rejects_oversized_reply_as_schema_violation() {
    let server = MockServer::start().await;
    let one = r#"{"text": "x", "facialExpression": "default", "animation": "Idle"}"#;
    let reply = format!(r#"{{"messages": [{one}, {one}, {one}, {one}]}}"#);
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(completion_with_content(&reply)))
        .mount(&server)
        .await;

    let generator = ReplyGenerator::new(&chat_config(&server), "test-key".to_owned());
    assert!(matches!(
        generator.generate("hello").await,
        Err(ConverseError::SchemaViolation(_))
    ));
}

#[tokio::test]
async fn generator_treats_missing_choices_as_upstream_fault() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"choices": []})))
        .mount(&server)
        .await;

    let generator = ReplyGenerator::new(&chat_config(&server), "test-key".to_owned());
    assert!(matches!(
        generator.generate("hello").await,
        Err(ConverseError::UpstreamUnavailable(_))
    ));
}

fn tts_config(server: &MockServer) -> TtsConfig {
    TtsConfig {
        api_url: server.uri(),
        voice_id: "voice-123".to_owned(),
        ..Default::default()
    }
}

#[tokio::test]
async fn synthesizer_writes_provider_audio_to_the_destination() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/text-to-speech/voice-123"))
        .and(header("xi-api-key", "tts-key"))
        .and(body_partial_json(serde_json::json!({"text": "Hi there!"})))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"ID3fake-mp3".to_vec()))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("message_0.mp3");
    let synthesizer = ElevenLabsSynthesizer::new(&tts_config(&server), "tts-key".to_owned());
    synthesizer.synthesize("Hi there!", &dest).await.unwrap();
    assert_eq!(std::fs::read(&dest).unwrap(), b"ID3fake-mp3");
}

#[tokio::test]
async fn synthesizer_maps_provider_rejection_to_synthesis_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/text-to-speech/voice-123"))
        .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("message_0.mp3");
    let synthesizer = ElevenLabsSynthesizer::new(&tts_config(&server), "bad-key".to_owned());
    let err = synthesizer.synthesize("Hi there!", &dest).await.unwrap_err();
    assert!(matches!(err, ConverseError::SynthesisFailed(_)));
    assert!(!dest.exists());
}
