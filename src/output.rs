//! Output file naming and collision handling.

use crate::{Error, ErrorContext, Result};
use std::path::{Path, PathBuf};
use tracing::info;

const MAX_VOICE_COMPONENT: usize = 50;
const MAX_FILENAME_BYTES: usize = 255;
const MAX_COLLISION_SUFFIX: u32 = 1000;
const INVALID_FILENAME_CHARS: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

fn clean_component(component: &str) -> String {
    component
        .replace(' ', "_")
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .take(MAX_VOICE_COMPONENT)
        .collect()
}

/// Make `filename` safe on every common filesystem, keeping the `.mp3` extension.
pub fn sanitize_filename(filename: &str) -> String {
    let replaced: String = filename
        .chars()
        .map(|c| if INVALID_FILENAME_CHARS.contains(&c) { '_' } else { c })
        .collect();
    let trimmed = replaced.trim_matches(|c| c == '.' || c == ' ');
    if trimmed.is_empty() {
        return "output.mp3".to_string();
    }
    if trimmed.len() <= MAX_FILENAME_BYTES {
        return trimmed.to_string();
    }
    let stem = trimmed.strip_suffix(".mp3").unwrap_or(trimmed);
    let mut cut = MAX_FILENAME_BYTES - ".mp3".len();
    while !stem.is_char_boundary(cut) {
        cut -= 1;
    }
    format!("{}.mp3", &stem[..cut])
}

/// `<stem>_<provider>_<voice>.mp3`, sanitised.
pub fn output_filename(input: &Path, provider: &str, voice: &str) -> String {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let mut parts = vec![stem];
    if !provider.is_empty() {
        parts.push(provider.to_string());
    }
    let voice = clean_component(voice);
    if !voice.is_empty() {
        parts.push(voice);
    }
    sanitize_filename(&format!("{}.mp3", parts.join("_")))
}

/// Pick the destination for converting `input`.
///
/// Existing files are kept unless `overwrite` is set; otherwise `_1`, `_2`, ... are
/// appended to the stem until a free name is found.
pub fn resolve_output_path(
    input: &Path,
    output_dir: &Path,
    provider: &str,
    voice: &str,
    overwrite: bool,
) -> Result<PathBuf> {
    let desired = output_dir.join(output_filename(input, provider, voice));
    if overwrite || !desired.exists() {
        return Ok(desired);
    }
    let stem = desired
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    for counter in 1..=MAX_COLLISION_SUFFIX {
        let candidate = output_dir.join(format!("{}_{}.mp3", stem, counter));
        if !candidate.exists() {
            info!(path = %candidate.display(), "output exists, using a numbered name");
            return Ok(candidate);
        }
    }
    Err(Error::write_failure(
        desired,
        "too many existing files with similar names",
    ))
}

/// Check that `dir` exists (creating it if needed) and is a directory.
pub fn ensure_output_dir(dir: &Path) -> Result<()> {
    std::fs::create_dir_all(dir).map_err(|e| {
        Error::write_failure(dir, format!("cannot create directory: {}", e))
    })?;
    if !dir.is_dir() {
        return Err(Error::validation_with_context(
            "output path is not a directory",
            ErrorContext::new()
                .with_field_path(dir.display().to_string())
                .with_source("output_handler"),
        ));
    }
    Ok(())
}
