//! Voice catalogue returned by `list_voices`.

use super::types::AI_MODELS;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceKind {
    Ai,
    Human,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceInfo {
    pub id: String,
    pub name: String,
    pub description: String,
    pub languages: Vec<String>,
    pub kind: VoiceKind,
    pub author: String,
    pub like_count: u64,
    pub task_count: u64,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceCatalog {
    pub provider: String,
    pub voices: Vec<VoiceInfo>,
    pub default_voice: String,
    /// Total number of voices the service reports, including the ones not fetched.
    pub total_available: u64,
}

impl VoiceCatalog {
    /// The catalogue used when the service listing cannot be decoded.
    pub fn builtin(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            voices: builtin_models(),
            default_voice: AI_MODELS[0].to_string(),
            total_available: 0,
        }
    }

    pub fn ai_models(&self) -> impl Iterator<Item = &VoiceInfo> {
        self.voices.iter().filter(|v| v.kind == VoiceKind::Ai)
    }

    pub fn human_voices(&self) -> impl Iterator<Item = &VoiceInfo> {
        self.voices.iter().filter(|v| v.kind == VoiceKind::Human)
    }

    pub fn find(&self, id: &str) -> Option<&VoiceInfo> {
        self.voices.iter().find(|v| v.id == id)
    }
}

fn builtin_models() -> Vec<VoiceInfo> {
    let model = |id: &str, name: &str, description: &str, languages: &[&str]| VoiceInfo {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        languages: languages.iter().map(|l| l.to_string()).collect(),
        kind: VoiceKind::Ai,
        author: "Fish Audio".to_string(),
        like_count: 0,
        task_count: 0,
        tags: Vec::new(),
    };
    vec![
        model(
            "speech-1.6",
            "Speech 1.6 (AI)",
            "Latest Fish Audio AI speech model",
            &["en", "zh", "ja", "ko", "fr", "de", "es", "ar"],
        ),
        model(
            "speech-1.5",
            "Speech 1.5 (AI)",
            "Previous generation AI speech model",
            &["en", "zh", "ja"],
        ),
    ]
}

/// One page of `GET /model`.
#[derive(Debug, Deserialize)]
pub(crate) struct ModelPage {
    #[serde(default)]
    total: u64,
    #[serde(default)]
    items: Vec<ModelItem>,
}

#[derive(Debug, Deserialize)]
struct ModelItem {
    #[serde(rename = "_id")]
    id: Option<String>,
    title: Option<String>,
    description: Option<String>,
    languages: Option<Vec<String>>,
    #[serde(rename = "type")]
    kind: Option<String>,
    author: Option<ModelAuthor>,
    #[serde(default)]
    like_count: u64,
    #[serde(default)]
    task_count: u64,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    samples: Vec<ModelSample>,
}

#[derive(Debug, Deserialize)]
struct ModelAuthor {
    nickname: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ModelSample {
    #[serde(default)]
    text: String,
}

const SAMPLE_PREVIEW_CHARS: usize = 100;

fn sample_preview(samples: &[ModelSample]) -> String {
    let Some(first) = samples.first() else {
        return String::new();
    };
    if first.text.chars().count() > SAMPLE_PREVIEW_CHARS {
        let head: String = first.text.chars().take(SAMPLE_PREVIEW_CHARS).collect();
        format!("{}...", head)
    } else {
        first.text.clone()
    }
}

impl ModelPage {
    /// Built-in models first, then up to `limit` reference voices of type `tts`.
    pub(crate) fn into_catalog(self, provider: &str, limit: usize) -> VoiceCatalog {
        let mut voices = builtin_models();
        voices.extend(
            self.items
                .into_iter()
                .take(limit)
                .filter(|item| item.kind.as_deref() == Some("tts"))
                .map(|item| {
                    let description = match item.description {
                        Some(d) if !d.trim().is_empty() => d,
                        _ => sample_preview(&item.samples),
                    };
                    VoiceInfo {
                        id: item.id.unwrap_or_else(|| "unknown".to_string()),
                        name: item.title.unwrap_or_else(|| "Unknown Voice".to_string()),
                        description,
                        languages: item.languages.unwrap_or_else(|| vec!["en".to_string()]),
                        kind: VoiceKind::Human,
                        author: item
                            .author
                            .and_then(|a| a.nickname)
                            .unwrap_or_else(|| "Unknown".to_string()),
                        like_count: item.like_count,
                        task_count: item.task_count,
                        tags: item.tags,
                    }
                }),
        );
        VoiceCatalog {
            provider: provider.to_string(),
            voices,
            default_voice: AI_MODELS[0].to_string(),
            total_available: self.total,
        }
    }
}
