//! Integration tests for voice listing and credential validation

use crate::integration::mock_server::{MockServerFixture, API_KEY};
use mockito::Matcher;
use voiceforge::error_code::ErrorKind;
use voiceforge::tts::{TtsProvider, VoiceKind};

const MODEL_PAGE: &str = r#"{
    "total": 1234,
    "items": [
        {
            "_id": "802e3bc2b27e49c2995d23ef70e6ac89",
            "title": "Energetic Male",
            "description": "Upbeat narration",
            "languages": ["en"],
            "type": "tts",
            "author": {"nickname": "fishy"},
            "like_count": 42,
            "task_count": 1000,
            "tags": ["male"],
            "samples": []
        },
        {"_id": "not-a-voice", "title": "Classifier", "type": "svc"}
    ]
}"#;

#[tokio::test]
async fn test_list_voices_puts_models_first() {
    let fixture = MockServerFixture::new().await;
    let mock = {
        let mut server = fixture.server.lock().await;
        server
            .mock("GET", "/model")
            .match_header("authorization", "Bearer sk-test")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("page_size".into(), "5".into()),
                Matcher::UrlEncoded("page_number".into(), "1".into()),
            ]))
            .with_status(200)
            .with_body(MODEL_PAGE)
            .create_async()
            .await
    };

    let catalog = fixture.client().list_voices(API_KEY, 5).await.unwrap();

    assert_eq!(catalog.total_available, 1234);
    assert_eq!(catalog.voices[0].id, "speech-1.6");
    assert_eq!(catalog.voices[1].id, "speech-1.5");
    assert_eq!(catalog.voices.len(), 3);
    let human = &catalog.voices[2];
    assert_eq!(human.kind, VoiceKind::Human);
    assert_eq!(human.author, "fishy");
    assert_eq!(human.like_count, 42);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_page_size_is_capped() {
    let fixture = MockServerFixture::new().await;
    let mock = {
        let mut server = fixture.server.lock().await;
        server
            .mock("GET", "/model")
            .match_query(Matcher::UrlEncoded("page_size".into(), "100".into()))
            .with_status(200)
            .with_body(r#"{"total": 0, "items": []}"#)
            .create_async()
            .await
    };
    let catalog = fixture.client().list_voices(API_KEY, 500).await.unwrap();
    assert_eq!(catalog.human_voices().count(), 0);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_list_voices_errors() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture.mock_models(401, r#"{"detail":"bad key"}"#).await;
    let err = fixture.client().list_voices("bad", 10).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AuthenticationFailure);

    let fixture = MockServerFixture::new().await;
    let _mock = fixture.mock_models(502, "bad gateway").await;
    let err = fixture.client().list_voices(API_KEY, 10).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ServiceError { status: 502 });
}

#[tokio::test]
async fn test_undecodable_listing_falls_back_to_models() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture.mock_models(200, "<html>maintenance</html>").await;
    let catalog = fixture.client().list_voices(API_KEY, 10).await.unwrap();
    assert_eq!(catalog.ai_models().count(), 2);
    assert_eq!(catalog.human_voices().count(), 0);
}

#[tokio::test]
async fn test_validate_credential() {
    let fixture = MockServerFixture::new().await;
    let _mock = fixture.mock_models(200, r#"{"total": 0, "items": []}"#).await;
    let client = fixture.client();
    assert!(TtsProvider::validate_credential(&client, API_KEY).await);

    let fixture = MockServerFixture::new().await;
    let _mock = fixture.mock_models(401, "{}").await;
    assert!(!fixture.client().validate_credential("bad").await);
}

#[tokio::test]
async fn test_provider_interface_estimates_cost() {
    let fixture = MockServerFixture::new().await;
    let provider: Box<dyn TtsProvider> = Box::new(fixture.client());
    assert_eq!(
        provider.estimate_cost("short text", "speech-1.6").as_deref(),
        Some("~$0.01 (10 chars)")
    );
}
