//! Integration tests for the streaming conversion pipeline

use crate::integration::mock_server::{audio_bytes, MockServerFixture, API_KEY, TTS_PATH};
use crate::integration::raw_server::{full_response, truncated_response, RawServer};
use mockito::Matcher;
use serde_json::json;
use voiceforge::error_code::ErrorKind;
use voiceforge::progress::{ProgressCallback, RecordingProgress};
use voiceforge::tts::{ConversionOutcome, ConversionRequest, Mp3Bitrate, SynthesisSettings};

fn assert_strictly_increasing(percentages: &[u8]) {
    for pair in percentages.windows(2) {
        assert!(pair[0] < pair[1], "progress regressed: {:?}", percentages);
    }
    assert!(percentages.iter().all(|p| *p <= 100));
}

#[tokio::test]
async fn test_declared_length_body_is_written_exactly() {
    let fixture = MockServerFixture::new().await;
    let body = audio_bytes(12_345);
    let mock = fixture.mock_audio(body.clone()).await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("out/story.mp3");
    let progress = RecordingProgress::new();
    let request = ConversionRequest::new("Hello from the test suite.", "speech-1.6");

    let outcome = fixture
        .client()
        .convert(&request, API_KEY, &dest, &progress)
        .await;

    assert_eq!(outcome, ConversionOutcome::success(&dest, 12_345));
    assert_eq!(std::fs::read(&dest).unwrap(), body);

    let percentages = progress.percentages();
    assert_strictly_increasing(&percentages);
    assert_eq!(percentages.first(), Some(&0));
    assert!(percentages.contains(&90));
    assert_eq!(progress.last(), Some(100));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_chunked_body_without_length_reaches_completion() {
    let fixture = MockServerFixture::new().await;
    let chunks: Vec<Vec<u8>> = (0..8).map(|_| audio_bytes(40 * 1024)).collect();
    let _mock = fixture.mock_chunked_audio(chunks).await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("chunked.mp3");
    let progress = RecordingProgress::new();
    let request = ConversionRequest::new("Chunked please.", "speech-1.6");

    let outcome = fixture
        .client()
        .convert(&request, API_KEY, &dest, &progress)
        .await;

    assert_eq!(outcome.bytes_written(), Some(8 * 40 * 1024));
    assert_eq!(std::fs::metadata(&dest).unwrap().len(), 8 * 40 * 1024);

    let percentages = progress.percentages();
    assert_strictly_increasing(&percentages);
    assert!(percentages.contains(&90));
    assert_eq!(percentages.last(), Some(&100));
}

#[tokio::test]
async fn test_unauthorized_writes_no_file() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture
        .mock_tts_error(401, r#"{"detail":"invalid token"}"#, None)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("never.mp3");
    let progress = RecordingProgress::new();
    let outcome = fixture
        .client()
        .convert(&ConversionRequest::new("hi", "speech-1.6"), "bad-key", &dest, &progress)
        .await;

    assert_eq!(outcome.kind(), Some(ErrorKind::AuthenticationFailure));
    assert!(!dest.exists());
    assert!(progress.last().unwrap_or(0) < 100);
}

#[tokio::test]
async fn test_empty_body_is_not_success() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture.mock_audio(Vec::new()).await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("empty.mp3");
    let outcome = fixture
        .client()
        .convert(
            &ConversionRequest::new("hi", "speech-1.6"),
            API_KEY,
            &dest,
            &RecordingProgress::new(),
        )
        .await;

    assert_eq!(outcome.kind(), Some(ErrorKind::EmptyResponse));
    assert!(!outcome.is_success());
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_status_classification() {
    let cases: [(usize, Option<&str>, ErrorKind); 4] = [
        (400, None, ErrorKind::BadRequest),
        (429, Some("30"), ErrorKind::RateLimited),
        (500, None, ErrorKind::ServiceError { status: 500 }),
        (503, None, ErrorKind::ServiceError { status: 503 }),
    ];
    for (status, retry_after, expected) in cases {
        let fixture = MockServerFixture::new().await;
        let _mock = fixture
            .mock_tts_error(status, r#"{"message":"nope"}"#, retry_after)
            .await;
        let dir = tempfile::tempdir().unwrap();
        let dest = dir.path().join("x.mp3");

        let outcome = fixture
            .client()
            .convert(
                &ConversionRequest::new("hi", "speech-1.6"),
                API_KEY,
                &dest,
                &RecordingProgress::new(),
            )
            .await;

        assert_eq!(outcome.kind(), Some(expected), "status {}", status);
        assert!(!dest.exists());
        if status == 429 {
            let detail = outcome.to_string();
            assert!(detail.contains("retry after 30s"), "{}", detail);
            assert!(detail.contains("nope"), "{}", detail);
        }
    }
}

#[tokio::test]
async fn test_model_voice_is_sent_as_header() {
    let fixture = MockServerFixture::new().await;
    let mock = {
        let mut server = fixture.server.lock().await;
        server
            .mock("POST", TTS_PATH)
            .match_header("model", "speech-1.5")
            .match_body(Matcher::PartialJson(json!({
                "text": "Model routing",
                "format": "mp3",
                "mp3_bitrate": 64
            })))
            .with_status(200)
            .with_body(audio_bytes(512))
            .create_async()
            .await
    };

    let dir = tempfile::tempdir().unwrap();
    let request =
        ConversionRequest::new("Model routing", "speech-1.5").with_bitrate(Mp3Bitrate::Kbps64);
    let outcome = fixture
        .client()
        .convert(&request, API_KEY, &dir.path().join("m.mp3"), &RecordingProgress::new())
        .await;

    assert!(outcome.is_success(), "{}", outcome);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_reference_voice_is_sent_in_body() {
    let fixture = MockServerFixture::new().await;
    let mock = {
        let mut server = fixture.server.lock().await;
        server
            .mock("POST", TTS_PATH)
            .match_header("model", Matcher::Missing)
            .match_body(Matcher::PartialJson(json!({
                "reference_id": "b545c585f631496c914815291da4e893",
                "temperature": 0.5,
                "prosody": {"speed": 0.75, "volume": 0}
            })))
            .with_status(200)
            .with_body(audio_bytes(256))
            .create_async()
            .await
    };

    let dir = tempfile::tempdir().unwrap();
    let request = ConversionRequest::new("Reference routing", "b545c585f631496c914815291da4e893")
        .with_settings(SynthesisSettings {
            speech_speed: Some(0.75),
            temperature: Some(0.5),
            ..SynthesisSettings::default()
        });
    let outcome = fixture
        .client()
        .convert(&request, API_KEY, &dir.path().join("r.mp3"), &RecordingProgress::new())
        .await;

    assert!(outcome.is_success(), "{}", outcome);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_repeated_conversions_are_independent() {
    let fixture = MockServerFixture::new().await;
    let mock = {
        let mut server = fixture.server.lock().await;
        server
            .mock("POST", TTS_PATH)
            .with_status(200)
            .with_body(audio_bytes(2048))
            .expect(2)
            .create_async()
            .await
    };

    let client = fixture.client();
    let dir = tempfile::tempdir().unwrap();
    let request = ConversionRequest::new("Same text twice.", "speech-1.6");
    let first = dir.path().join("first.mp3");
    let second = dir.path().join("second.mp3");

    let a = client.convert(&request, API_KEY, &first, &RecordingProgress::new()).await;
    let b = client.convert(&request, API_KEY, &second, &RecordingProgress::new()).await;

    assert_eq!(a, ConversionOutcome::success(&first, 2048));
    assert_eq!(b, ConversionOutcome::success(&second, 2048));
    assert_eq!(std::fs::read(&first).unwrap(), std::fs::read(&second).unwrap());
    mock.assert_async().await;
}

#[tokio::test]
async fn test_invalid_request_never_reaches_the_service() {
    let fixture = MockServerFixture::new().await;
    let mock = {
        let mut server = fixture.server.lock().await;
        server
            .mock("POST", TTS_PATH)
            .with_status(200)
            .expect(0)
            .create_async()
            .await
    };

    let dir = tempfile::tempdir().unwrap();
    let outcome = fixture
        .client()
        .convert(
            &ConversionRequest::new("   ", "speech-1.6"),
            API_KEY,
            &dir.path().join("x.mp3"),
            &RecordingProgress::new(),
        )
        .await;
    assert_eq!(outcome.kind(), Some(ErrorKind::BadRequest));

    let outcome = fixture
        .client()
        .convert(
            &ConversionRequest::new("text", "speech-1.6"),
            "",
            &dir.path().join("x.mp3"),
            &RecordingProgress::new(),
        )
        .await;
    assert_eq!(outcome.kind(), Some(ErrorKind::AuthenticationFailure));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_connection_refused_is_a_connection_error() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let client = voiceforge::FishAudioClient::builder()
        .base_url(format!("http://127.0.0.1:{}", port))
        .build()
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("x.mp3");
    let outcome = client
        .convert(
            &ConversionRequest::new("hi", "speech-1.6"),
            API_KEY,
            &dest,
            &RecordingProgress::new(),
        )
        .await;

    assert_eq!(outcome.kind(), Some(ErrorKind::ConnectionError));
    assert!(!dest.exists());
}

#[tokio::test]
async fn test_each_conversion_uses_its_own_connection() {
    let server = RawServer::start(full_response(&audio_bytes(4096)), false).await;
    let client = voiceforge::FishAudioClient::builder()
        .base_url(&server.base_url)
        .build()
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let request = ConversionRequest::new("Twice over one socket?", "speech-1.6");
    for name in ["one.mp3", "two.mp3"] {
        let dest = dir.path().join(name);
        let outcome = client
            .convert(&request, API_KEY, &dest, &RecordingProgress::new())
            .await;
        assert_eq!(outcome, ConversionOutcome::success(&dest, 4096));
    }

    // The server would happily keep the first connection alive.
    assert_eq!(server.connections(), 2);
}

#[tokio::test]
async fn test_stream_cut_midway_keeps_partial_file() {
    let sent = audio_bytes(100 * 1024);
    let server = RawServer::start(truncated_response(200 * 1024, &sent), true).await;
    let client = voiceforge::FishAudioClient::builder()
        .base_url(&server.base_url)
        .build()
        .unwrap();

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("partial.mp3");
    let progress = RecordingProgress::new();
    let outcome = client
        .convert(
            &ConversionRequest::new("Cut me off.", "speech-1.6"),
            API_KEY,
            &dest,
            &progress,
        )
        .await;

    assert_eq!(outcome.kind(), Some(ErrorKind::ConnectionError), "{}", outcome);
    let kept = std::fs::read(&dest).unwrap();
    assert!(!kept.is_empty());
    assert!(kept.len() <= sent.len());
    assert_eq!(kept[..], sent[..kept.len()]);
    assert!(progress.last().unwrap() < 100);
}

#[tokio::test]
async fn test_unwritable_destination_is_a_write_failure() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture.mock_audio(audio_bytes(1024)).await;

    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, b"x").unwrap();
    let dest = blocker.join("out.mp3");

    let progress = RecordingProgress::new();
    let outcome = fixture
        .client()
        .convert(&ConversionRequest::new("hi", "speech-1.6"), API_KEY, &dest, &progress)
        .await;

    assert_eq!(outcome.kind(), Some(ErrorKind::WriteFailure), "{}", outcome);
    assert!(!dest.exists());
    assert!(progress.last().unwrap() < 100);
}

struct PanickingProgress;

impl ProgressCallback for PanickingProgress {
    fn on_progress(&self, percent: u8, _message: &str) {
        if percent >= 25 {
            panic!("progress display crashed at {}", percent);
        }
    }
}

#[tokio::test]
async fn test_panicking_callback_does_not_abort_conversion() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture.mock_audio(audio_bytes(4096)).await;

    let dir = tempfile::tempdir().unwrap();
    let dest = dir.path().join("p.mp3");
    let outcome = fixture
        .client()
        .convert(
            &ConversionRequest::new("Keep going.", "speech-1.6"),
            API_KEY,
            &dest,
            &PanickingProgress,
        )
        .await;

    assert_eq!(outcome, ConversionOutcome::success(&dest, 4096));
}
