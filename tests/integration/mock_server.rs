//! Mock Fish Audio server for integration tests

use mockito::{Matcher, Mock, Server, ServerGuard};
use std::io::Write;
use std::sync::Arc;
use tokio::sync::Mutex;
use voiceforge::tts::FishAudioClient;

pub const API_KEY: &str = "sk-test";
pub const TTS_PATH: &str = "/v1/tts";

/// Test fixture that manages a mock server
pub struct MockServerFixture {
    pub server: Arc<Mutex<ServerGuard>>,
    pub base_url: String,
}

impl MockServerFixture {
    pub async fn new() -> Self {
        let server = Server::new_async().await;
        let base_url = server.url();
        Self {
            server: Arc::new(Mutex::new(server)),
            base_url,
        }
    }

    /// Client pointed at the mock server
    pub fn client(&self) -> FishAudioClient {
        FishAudioClient::builder()
            .base_url(&self.base_url)
            .build()
            .expect("client builds against mock URL")
    }

    /// 200 with `body` as a regular (Content-Length) response
    pub async fn mock_audio(&self, body: Vec<u8>) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("POST", TTS_PATH)
            .match_header("authorization", format!("Bearer {}", API_KEY).as_str())
            .with_status(200)
            .with_header("content-type", "audio/mpeg")
            .with_body(body)
            .create_async()
            .await
    }

    /// 200 with `chunks` sent using chunked transfer encoding (no Content-Length)
    pub async fn mock_chunked_audio(&self, chunks: Vec<Vec<u8>>) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("POST", TTS_PATH)
            .with_status(200)
            .with_header("content-type", "audio/mpeg")
            .with_chunked_body(move |w| {
                for chunk in &chunks {
                    w.write_all(chunk)?;
                }
                Ok(())
            })
            .create_async()
            .await
    }

    /// Non-2xx response on the TTS endpoint
    pub async fn mock_tts_error(&self, status: usize, body: &str, retry_after: Option<&str>) -> Mock {
        let mut server = self.server.lock().await;
        let mut mock = server
            .mock("POST", TTS_PATH)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body);
        if let Some(secs) = retry_after {
            mock = mock.with_header("retry-after", secs);
        }
        mock.create_async().await
    }

    /// Response on the voice listing endpoint
    pub async fn mock_models(&self, status: usize, body: &str) -> Mock {
        let mut server = self.server.lock().await;
        server
            .mock("GET", "/model")
            .match_query(Matcher::Any)
            .with_status(status)
            .with_header("content-type", "application/json")
            .with_body(body)
            .create_async()
            .await
    }
}

/// Deterministic pseudo-audio payload
pub fn audio_bytes(len: usize) -> Vec<u8> {
    (0..len).map(|i| (i % 251) as u8).collect()
}
