//! Fish Audio client and the streaming conversion pipeline.

use super::provider::TtsProvider;
use super::types::{ConversionOutcome, ConversionRequest, VoiceRouting, DEFAULT_VOICE};
use super::voices::{ModelPage, VoiceCatalog};
use crate::pricing::CharacterPricing;
use crate::progress::{ProgressCallback, ProgressReporter, ProgressTuning, StreamSession};
use crate::transport::{classify_status, HttpTransport, TimeoutPolicy};
use crate::writer::{verify_output, StreamWriter};
use crate::{Error, Result};
use async_trait::async_trait;
use futures::StreamExt;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use serde::Serialize;
use std::path::Path;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub const PROVIDER_NAME: &str = "Fish Audio";
pub const DEFAULT_BASE_URL: &str = "https://api.fish.audio";
const TTS_PATH: &str = "/v1/tts";
const MODEL_PATH: &str = "/model";
const CHARACTER_LIMIT: usize = 10_000;
const SUPPORTED_FORMATS: &[&str] = &["mp3"];
const VALIDATE_TIMEOUT: Duration = Duration::from_secs(10);
const LIST_TIMEOUT: Duration = Duration::from_secs(30);
const MAX_PAGE_SIZE: usize = 100;

#[derive(Serialize)]
struct TtsPayload<'a> {
    text: &'a str,
    format: &'static str,
    mp3_bitrate: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    reference_id: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    prosody: Option<Prosody>,
}

#[derive(Serialize)]
struct Prosody {
    speed: f32,
    volume: i32,
}

/// JSON body and routing headers for one request.
fn build_payload(request: &ConversionRequest) -> Result<(serde_json::Value, HeaderMap)> {
    let mut headers = HeaderMap::new();
    let reference_id = match request.routing() {
        VoiceRouting::ModelHeader(model) => {
            headers.insert(
                HeaderName::from_static("model"),
                HeaderValue::from_static(model),
            );
            None
        }
        VoiceRouting::ReferenceId(id) => Some(id),
    };
    let settings = request.settings();
    let payload = TtsPayload {
        text: request.text(),
        format: "mp3",
        mp3_bitrate: request.bitrate().kbps(),
        reference_id,
        temperature: settings.temperature,
        top_p: settings.top_p,
        prosody: settings.speech_speed.map(|speed| Prosody { speed, volume: 0 }),
    };
    Ok((serde_json::to_value(&payload)?, headers))
}

/// Client for the Fish Audio HTTP API.
///
/// Holds no per-conversion state: every [`FishAudioClient::convert`] call owns its own
/// connection, output file and [`StreamSession`], so concurrent calls are independent.
pub struct FishAudioClient {
    transport: HttpTransport,
    timeouts: TimeoutPolicy,
    tuning: ProgressTuning,
    pricing: CharacterPricing,
}

impl FishAudioClient {
    pub fn builder() -> FishAudioClientBuilder {
        FishAudioClientBuilder::new()
    }

    pub fn base_url(&self) -> &str {
        self.transport.base_url()
    }

    pub fn timeouts(&self) -> &TimeoutPolicy {
        &self.timeouts
    }

    /// Run one conversion and fold the result into a [`ConversionOutcome`].
    pub async fn convert(
        &self,
        request: &ConversionRequest,
        credential: &str,
        destination: &Path,
        progress: &dyn ProgressCallback,
    ) -> ConversionOutcome {
        let started = Instant::now();
        let request_id = uuid::Uuid::new_v4().to_string();
        let mut reporter = ProgressReporter::new(progress);

        match self
            .run_conversion(request, credential, destination, &request_id, &mut reporter)
            .await
        {
            Ok(bytes_written) => {
                info!(
                    request_id = request_id.as_str(),
                    path = %destination.display(),
                    bytes_written,
                    duration_ms = started.elapsed().as_millis() as u64,
                    "conversion succeeded"
                );
                ConversionOutcome::success(destination, bytes_written)
            }
            Err(err) => {
                let kind = err.kind();
                info!(
                    request_id = request_id.as_str(),
                    error_kind = kind.name(),
                    http_status = err.http_status(),
                    duration_ms = started.elapsed().as_millis() as u64,
                    "conversion failed: {}",
                    err
                );
                ConversionOutcome::failure(&err)
            }
        }
    }

    async fn run_conversion(
        &self,
        request: &ConversionRequest,
        credential: &str,
        destination: &Path,
        request_id: &str,
        reporter: &mut ProgressReporter<'_>,
    ) -> Result<u64> {
        reporter.report(0, "Preparing request");
        request.validate()?;
        if credential.trim().is_empty() {
            return Err(Error::MissingCredential {
                provider: PROVIDER_NAME.to_string(),
            });
        }
        let char_count = request.char_count();
        if char_count > CHARACTER_LIMIT {
            warn!(
                char_count,
                limit = CHARACTER_LIMIT,
                "text exceeds the advisory character limit"
            );
        }
        let (body, headers) = build_payload(request)?;
        let timeout = self.timeouts.for_char_count(char_count);
        debug!(
            request_id,
            char_count,
            bitrate = request.bitrate().kbps(),
            timeout_secs = timeout.as_secs(),
            "request prepared"
        );
        reporter.report(10, "Request prepared");

        reporter.report(15, &format!("Sending request to {}", PROVIDER_NAME));
        let response = self
            .transport
            .open_stream(TTS_PATH, &body, headers, credential, timeout, request_id)
            .await?;
        debug!(
            request_id,
            http_status = response.status,
            content_length = response.content_length,
            upstream_request_id = response.upstream_request_id.as_deref(),
            "response headers received"
        );
        reporter.report(25, "Connected, waiting for audio");

        let mut session = StreamSession::begin(response.content_length, self.tuning);
        let mut writer = StreamWriter::create(destination).await?;
        reporter.report(session.last_percent(), "Receiving audio");

        let mut body = response.body;
        while let Some(chunk) = body.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(err) => {
                    // Partial output stays on disk.
                    let kept = writer.finish().await.unwrap_or_default();
                    warn!(request_id, bytes_kept = kept, "stream aborted mid-download");
                    return Err(err);
                }
            };
            writer.write_chunk(&chunk).await?;
            if let Some(percent) = session.record_chunk(chunk.len()) {
                reporter.report(percent, &receiving_message(session.bytes_downloaded()));
            }
        }
        drop(body);

        let bytes_written = writer.finish().await?;
        debug!(
            request_id,
            bytes_written,
            total_known = session.total_known(),
            stream_ms = session.elapsed().as_millis() as u64,
            "stream closed"
        );
        if bytes_written == 0 {
            remove_empty_output(destination).await;
            return Err(Error::EmptyResponse {
                provider: PROVIDER_NAME.to_string(),
            });
        }

        reporter.report(90, "Verifying output");
        let verified = verify_output(destination).await?;
        reporter.complete("Conversion complete");
        Ok(verified)
    }

    /// Built-in AI models followed by up to `limit` public reference voices.
    pub async fn list_voices(&self, credential: &str, limit: usize) -> Result<VoiceCatalog> {
        let query = [
            ("page_size", limit.clamp(1, MAX_PAGE_SIZE).to_string()),
            ("page_number", "1".to_string()),
        ];
        let resp = self
            .transport
            .get(MODEL_PATH, credential, &query, LIST_TIMEOUT)
            .await?;
        let status = resp.status().as_u16();
        let headers = resp.headers().clone();
        let text = resp
            .text()
            .await
            .map_err(|e| Error::Transport(e.into()))?;

        match status {
            200 => match serde_json::from_str::<ModelPage>(&text) {
                Ok(page) => Ok(page.into_catalog(PROVIDER_NAME, limit)),
                Err(e) => {
                    warn!(error = %e, "unreadable voice listing; using built-in models");
                    Ok(VoiceCatalog::builtin(PROVIDER_NAME))
                }
            },
            401 => Err(classify_status(PROVIDER_NAME, status, &headers, text)),
            _ => Err(Error::Remote {
                provider: PROVIDER_NAME.to_string(),
                status,
                message: format!("failed to list voices: {}", text.trim()),
            }),
        }
    }

    pub async fn validate_credential(&self, credential: &str) -> bool {
        let query = [("page_size", "1".to_string())];
        match self
            .transport
            .get(MODEL_PATH, credential, &query, VALIDATE_TIMEOUT)
            .await
        {
            Ok(resp) => resp.status().as_u16() == 200,
            Err(e) => {
                debug!(error = %e, "credential validation request failed");
                false
            }
        }
    }

    pub fn estimate_cost(&self, text: &str) -> String {
        self.pricing.estimate(text).format()
    }
}

fn receiving_message(downloaded: u64) -> String {
    format!("Receiving audio ({:.1} KB)", downloaded as f64 / 1024.0)
}

async fn remove_empty_output(path: &Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!(path = %path.display(), error = %e, "could not remove empty output file");
    }
}

#[async_trait]
impl TtsProvider for FishAudioClient {
    fn name(&self) -> &str {
        PROVIDER_NAME
    }

    fn default_voice(&self) -> &str {
        DEFAULT_VOICE
    }

    fn character_limit(&self) -> usize {
        CHARACTER_LIMIT
    }

    fn supported_formats(&self) -> &[&'static str] {
        SUPPORTED_FORMATS
    }

    async fn list_voices(&self, credential: &str, limit: usize) -> Result<VoiceCatalog> {
        FishAudioClient::list_voices(self, credential, limit).await
    }

    async fn validate_credential(&self, credential: &str) -> bool {
        FishAudioClient::validate_credential(self, credential).await
    }

    fn estimate_cost(&self, text: &str, _voice: &str) -> Option<String> {
        Some(FishAudioClient::estimate_cost(self, text))
    }

    async fn convert(
        &self,
        request: &ConversionRequest,
        credential: &str,
        destination: &Path,
        progress: &dyn ProgressCallback,
    ) -> ConversionOutcome {
        FishAudioClient::convert(self, request, credential, destination, progress).await
    }
}

pub struct FishAudioClientBuilder {
    base_url: Option<String>,
    timeouts: TimeoutPolicy,
    tuning: ProgressTuning,
}

impl FishAudioClientBuilder {
    pub fn new() -> Self {
        Self {
            base_url: None,
            timeouts: TimeoutPolicy::default(),
            tuning: ProgressTuning::default(),
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn timeouts(mut self, timeouts: TimeoutPolicy) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn tuning(mut self, tuning: ProgressTuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn build(self) -> Result<FishAudioClient> {
        let base_url = self
            .base_url
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        url::Url::parse(&base_url).map_err(|e| {
            Error::configuration(format!("invalid base URL '{}': {}", base_url, e))
        })?;
        Ok(FishAudioClient {
            transport: HttpTransport::new(PROVIDER_NAME, base_url)?,
            timeouts: self.timeouts,
            tuning: self.tuning,
            pricing: CharacterPricing::fish_audio(),
        })
    }
}

impl Default for FishAudioClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
