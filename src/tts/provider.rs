//! Provider abstraction and the startup-time registry.
//!
//! Each TTS service is one [`TtsProvider`] implementation; the CLI picks one by name
//! through a [`ProviderRegistry`] built once at startup.

use super::client::FishAudioClient;
use super::types::{ConversionOutcome, ConversionRequest};
use super::voices::VoiceCatalog;
use crate::progress::ProgressCallback;
use crate::{Error, ErrorContext, Result};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::Path;

/// Capability interface of a remote TTS service.
///
/// Object-safe, used as `Box<dyn TtsProvider>`.
#[async_trait]
pub trait TtsProvider: Send + Sync {
    /// Human-readable service name.
    fn name(&self) -> &str;

    fn default_voice(&self) -> &str;

    /// Advisory maximum input length in characters.
    fn character_limit(&self) -> usize;

    fn supported_formats(&self) -> &[&'static str];

    async fn list_voices(&self, credential: &str, limit: usize) -> Result<VoiceCatalog>;

    /// Whether `credential` is accepted by the service. Never errors.
    async fn validate_credential(&self, credential: &str) -> bool;

    /// Display string for the expected cost, `None` if the service has no price table.
    fn estimate_cost(&self, text: &str, voice: &str) -> Option<String>;

    /// Convert `request` into an MP3 file at `destination`.
    async fn convert(
        &self,
        request: &ConversionRequest,
        credential: &str,
        destination: &Path,
        progress: &dyn ProgressCallback,
    ) -> ConversionOutcome;
}

/// Constructor for one provider; receives the optional base URL override.
pub type ProviderFactory = fn(Option<&str>) -> Result<Box<dyn TtsProvider>>;

/// Explicit provider name → constructor mapping.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    factories: BTreeMap<String, ProviderFactory>,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register("fish_audio", fish_audio_factory);
        registry
    }

    pub fn register(&mut self, name: impl Into<String>, factory: ProviderFactory) {
        self.factories.insert(name.into().to_lowercase(), factory);
    }

    pub fn create(&self, name: &str, base_url: Option<&str>) -> Result<Box<dyn TtsProvider>> {
        let key = name.to_lowercase();
        let factory = self.factories.get(&key).ok_or_else(|| {
            Error::configuration_with_context(
                format!("unknown provider '{}'", name),
                ErrorContext::new()
                    .with_field_path("default_provider")
                    .with_details(format!("available: {}", self.names().join(", "))),
            )
        })?;
        factory(base_url)
    }

    /// Registered names in sorted order.
    pub fn names(&self) -> Vec<&str> {
        self.factories.keys().map(String::as_str).collect()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.contains_key(&name.to_lowercase())
    }
}

fn fish_audio_factory(base_url: Option<&str>) -> Result<Box<dyn TtsProvider>> {
    let mut builder = FishAudioClient::builder();
    if let Some(url) = base_url {
        builder = builder.base_url(url);
    }
    Ok(Box::new(builder.build()?))
}
