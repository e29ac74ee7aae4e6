//! Named speech presets bundling a voice with synthesis settings.

use crate::tts::{ParagraphPause, SynthesisSettings};
use crate::{Error, ErrorContext, Result};
use once_cell::sync::Lazy;
use std::fmt::Write;

const FEMALE_VOICE: &str = "b545c585f631496c914815291da4e893";
const MALE_VOICE: &str = "728f6ff2240d49308e8137ffe66008e2";
const ENERGETIC_MALE_VOICE: &str = "802e3bc2b27e49c2995d23ef70e6ac89";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeechPreset {
    /// Lookup key, e.g. `female-narrator`.
    pub key: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub voice: &'static str,
    pub speech_speed: f32,
    pub temperature: f32,
    pub top_p: f32,
    pub paragraph_pause: ParagraphPause,
    pub use_case: &'static str,
}

impl SpeechPreset {
    pub fn to_settings(&self) -> SynthesisSettings {
        SynthesisSettings {
            speech_speed: Some(self.speech_speed),
            temperature: Some(self.temperature),
            top_p: Some(self.top_p),
            paragraph_pause: Some(self.paragraph_pause),
        }
    }

    pub fn describe(&self) -> String {
        format!(
            "{}: {} (Use case: {})",
            self.name, self.description, self.use_case
        )
    }
}

#[allow(clippy::too_many_arguments)]
fn preset(
    key: &'static str,
    name: &'static str,
    description: &'static str,
    voice: &'static str,
    speech_speed: f32,
    temperature: f32,
    top_p: f32,
    paragraph_pause: ParagraphPause,
    use_case: &'static str,
) -> SpeechPreset {
    SpeechPreset {
        key,
        name,
        description,
        voice,
        speech_speed,
        temperature,
        top_p,
        paragraph_pause,
        use_case,
    }
}

pub static PRESETS: Lazy<[SpeechPreset; 12]> = Lazy::new(|| {
    [
        preset(
            "female-narrator",
            "Female Narrator",
            "Professional female narrator for audiobooks and storytelling",
            FEMALE_VOICE,
            0.85,
            0.6,
            0.7,
            ParagraphPause::Long,
            "Audiobooks, storytelling, professional narration",
        ),
        preset(
            "male-narrator",
            "Male Narrator",
            "Professional male narrator for audiobooks and documentaries",
            MALE_VOICE,
            0.85,
            0.6,
            0.7,
            ParagraphPause::Long,
            "Audiobooks, documentaries, professional narration",
        ),
        preset(
            "audiobook",
            "Audiobook",
            "Optimized for long-form audiobook narration with clear pacing",
            FEMALE_VOICE,
            0.8,
            0.5,
            0.6,
            ParagraphPause::Long,
            "Long-form audiobooks, novels, literature",
        ),
        preset(
            "presentation",
            "Presentation",
            "Clear, professional speech for business presentations",
            ENERGETIC_MALE_VOICE,
            0.9,
            0.4,
            0.6,
            ParagraphPause::Medium,
            "Business presentations, corporate content, training",
        ),
        preset(
            "educational",
            "Educational",
            "Clear, engaging speech for educational content and tutorials",
            FEMALE_VOICE,
            0.85,
            0.6,
            0.7,
            ParagraphPause::Medium,
            "Educational content, tutorials, e-learning",
        ),
        preset(
            "podcast",
            "Podcast",
            "Conversational, natural speech for podcast content",
            FEMALE_VOICE,
            0.9,
            0.6,
            0.8,
            ParagraphPause::Short,
            "Podcasts, conversational content, interviews",
        ),
        preset(
            "news",
            "News",
            "Professional, authoritative speech for news and announcements",
            ENERGETIC_MALE_VOICE,
            0.95,
            0.4,
            0.6,
            ParagraphPause::Short,
            "News broadcasts, announcements, formal content",
        ),
        preset(
            "storytelling",
            "Storytelling",
            "Expressive, engaging speech for stories and creative content",
            FEMALE_VOICE,
            0.85,
            0.7,
            0.8,
            ParagraphPause::Medium,
            "Stories, creative writing, children's content",
        ),
        preset(
            "meditation",
            "Meditation",
            "Calm, soothing speech for meditation and relaxation content",
            FEMALE_VOICE,
            0.75,
            0.5,
            0.6,
            ParagraphPause::Long,
            "Meditation guides, relaxation, mindfulness content",
        ),
        preset(
            "technical",
            "Technical",
            "Clear, precise speech for technical documentation and manuals",
            "speech-1.6",
            0.85,
            0.4,
            0.6,
            ParagraphPause::Medium,
            "Technical documentation, manuals, specifications",
        ),
        preset(
            "conversational",
            "Conversational",
            "Natural, casual speech for everyday content",
            FEMALE_VOICE,
            0.9,
            0.7,
            0.7,
            ParagraphPause::Short,
            "Casual content, blogs, personal messages",
        ),
        preset(
            "dramatic",
            "Dramatic",
            "Expressive, theatrical speech for dramatic content",
            FEMALE_VOICE,
            0.8,
            0.8,
            0.8,
            ParagraphPause::Medium,
            "Dramatic readings, theater, emotional content",
        ),
    ]
});

pub fn get(key: &str) -> Result<&'static SpeechPreset> {
    PRESETS.iter().find(|p| p.key == key).ok_or_else(|| {
        Error::validation_with_context(
            format!("unknown speech preset '{}'", key),
            ErrorContext::new()
                .with_field_path("preset")
                .with_details(format!("available: {}", names().join(", "))),
        )
    })
}

/// Preset keys in sorted order.
pub fn names() -> Vec<&'static str> {
    let mut names: Vec<_> = PRESETS.iter().map(|p| p.key).collect();
    names.sort_unstable();
    names
}

/// Human-readable listing of every preset, sorted by key.
pub fn format_listing() -> String {
    let mut out = String::from("Available speech presets:\n");
    for key in names() {
        let Ok(p) = get(key) else { continue };
        let _ = writeln!(out, "  * {}: {}", p.key, p.description);
        let _ = writeln!(out, "    Use case: {}", p.use_case);
        let _ = writeln!(
            out,
            "    Parameters: speed={}, temp={}, top_p={}, pause={}",
            p.speech_speed, p.temperature, p.top_p, p.paragraph_pause
        );
        out.push('\n');
    }
    out
}
