//! TTS (Text-to-Speech) request and outcome types.

use crate::error_code::ErrorKind;
use crate::{Error, ErrorContext, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Built-in AI models. They are selected through the `model` header; every other
/// voice identifier is a reference voice sent as `reference_id` in the body.
pub const AI_MODELS: [&str; 2] = ["speech-1.6", "speech-1.5"];

pub const DEFAULT_VOICE: &str = "speech-1.6";

/// Supported MP3 bitrates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub enum Mp3Bitrate {
    Kbps64,
    #[default]
    Kbps128,
    Kbps192,
}

impl Mp3Bitrate {
    pub const ALL: [Mp3Bitrate; 3] = [Self::Kbps64, Self::Kbps128, Self::Kbps192];

    pub fn kbps(&self) -> u32 {
        match self {
            Self::Kbps64 => 64,
            Self::Kbps128 => 128,
            Self::Kbps192 => 192,
        }
    }
}

impl TryFrom<u32> for Mp3Bitrate {
    type Error = Error;

    fn try_from(kbps: u32) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|b| b.kbps() == kbps)
            .ok_or_else(|| {
                Error::validation_with_context(
                    format!("unsupported MP3 bitrate {} kbps", kbps),
                    ErrorContext::new()
                        .with_field_path("request.mp3_bitrate")
                        .with_details("expected one of 64, 128, 192"),
                )
            })
    }
}

impl From<Mp3Bitrate> for u32 {
    fn from(b: Mp3Bitrate) -> u32 {
        b.kbps()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParagraphPause {
    Short,
    Medium,
    Long,
}

impl ParagraphPause {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Short => "short",
            Self::Medium => "medium",
            Self::Long => "long",
        }
    }
}

impl FromStr for ParagraphPause {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "short" => Ok(Self::Short),
            "medium" => Ok(Self::Medium),
            "long" => Ok(Self::Long),
            other => Err(Error::validation_with_context(
                format!("unknown paragraph pause '{}'", other),
                ErrorContext::new().with_details("expected short, medium or long"),
            )),
        }
    }
}

impl fmt::Display for ParagraphPause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Optional synthesis knobs; unset fields are left to the service defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SynthesisSettings {
    pub speech_speed: Option<f32>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub paragraph_pause: Option<ParagraphPause>,
}

/// How the voice identifier travels to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VoiceRouting<'a> {
    ModelHeader(&'static str),
    ReferenceId(&'a str),
}

/// One text-to-speech job. Built once per invocation and never modified afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversionRequest {
    text: String,
    voice: String,
    bitrate: Mp3Bitrate,
    settings: SynthesisSettings,
}

impl ConversionRequest {
    pub fn new(text: impl Into<String>, voice: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice: voice.into(),
            bitrate: Mp3Bitrate::default(),
            settings: SynthesisSettings::default(),
        }
    }

    pub fn with_bitrate(mut self, bitrate: Mp3Bitrate) -> Self {
        self.bitrate = bitrate;
        self
    }

    pub fn with_settings(mut self, settings: SynthesisSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn voice(&self) -> &str {
        &self.voice
    }

    pub fn bitrate(&self) -> Mp3Bitrate {
        self.bitrate
    }

    pub fn settings(&self) -> &SynthesisSettings {
        &self.settings
    }

    /// Length in Unicode scalar values.
    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }

    pub fn routing(&self) -> VoiceRouting<'_> {
        match AI_MODELS.iter().find(|m| **m == self.voice) {
            Some(model) => VoiceRouting::ModelHeader(*model),
            None => VoiceRouting::ReferenceId(&self.voice),
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.text.trim().is_empty() {
            return Err(Error::validation_with_context(
                "text is empty",
                ErrorContext::new()
                    .with_field_path("request.text")
                    .with_source("conversion_request"),
            ));
        }
        if self.voice.trim().is_empty() {
            return Err(Error::validation_with_context(
                "voice is empty",
                ErrorContext::new()
                    .with_field_path("request.voice")
                    .with_source("conversion_request"),
            ));
        }
        Ok(())
    }
}

/// Terminal result of a conversion. There is no partial success.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionOutcome {
    Success { path: PathBuf, bytes_written: u64 },
    Failure { kind: ErrorKind, detail: String },
}

impl ConversionOutcome {
    pub fn success(path: impl Into<PathBuf>, bytes_written: u64) -> Self {
        Self::Success {
            path: path.into(),
            bytes_written,
        }
    }

    pub fn failure(err: &Error) -> Self {
        Self::Failure {
            kind: err.kind(),
            detail: err.to_string(),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Self::Failure { kind, .. } => Some(*kind),
            Self::Success { .. } => None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::Success { path, .. } => Some(path),
            Self::Failure { .. } => None,
        }
    }

    pub fn bytes_written(&self) -> Option<u64> {
        match self {
            Self::Success { bytes_written, .. } => Some(*bytes_written),
            Self::Failure { .. } => None,
        }
    }
}

impl fmt::Display for ConversionOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Success {
                path,
                bytes_written,
            } => write!(f, "wrote {} bytes to {}", bytes_written, path.display()),
            Self::Failure { kind, detail } => write!(f, "{}: {}", kind, detail),
        }
    }
}
