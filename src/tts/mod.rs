//! Text-to-speech providers: request types, the provider interface and the Fish Audio
//! implementation of the streaming conversion pipeline.

mod client;
mod provider;
mod types;
mod voices;

pub use client::{FishAudioClient, FishAudioClientBuilder, DEFAULT_BASE_URL, PROVIDER_NAME};
pub use provider::{ProviderFactory, ProviderRegistry, TtsProvider};
pub use types::{
    ConversionOutcome, ConversionRequest, Mp3Bitrate, ParagraphPause, SynthesisSettings,
    VoiceRouting, AI_MODELS, DEFAULT_VOICE,
};
pub use voices::{VoiceCatalog, VoiceInfo, VoiceKind};
