//! Reading, validating and measuring input text files.

use crate::{Error, ErrorContext, Result};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use std::path::Path;
use tracing::{debug, info, warn};

pub const SUPPORTED_EXTENSIONS: &[&str] = &["txt"];
pub const MAX_FILE_SIZE_BYTES: u64 = 10 * 1024 * 1024;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n\n").expect("valid regex"));

const TYPOGRAPHIC_REPLACEMENTS: &[(char, &str)] = &[
    ('\u{201C}', "\""),
    ('\u{201D}', "\""),
    ('\u{2018}', "'"),
    ('\u{2019}', "'"),
    ('\u{2026}', "..."),
    ('\u{2013}', "-"),
    ('\u{2014}', "-"),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TextStats {
    pub characters: usize,
    pub characters_no_spaces: usize,
    pub words: usize,
    pub lines: usize,
    pub paragraphs: usize,
}

impl TextStats {
    pub fn of(text: &str) -> Self {
        Self {
            characters: text.chars().count(),
            characters_no_spaces: text.chars().filter(|c| *c != ' ').count(),
            words: text.split_whitespace().count(),
            lines: text.lines().count(),
            paragraphs: PARAGRAPH_BREAK
                .split(text)
                .filter(|p| !p.trim().is_empty())
                .count(),
        }
    }
}

fn file_error(path: &Path, message: impl Into<String>) -> Error {
    Error::validation_with_context(
        message,
        ErrorContext::new()
            .with_field_path(path.display().to_string())
            .with_source("input_handler"),
    )
}

/// Check that `path` is a readable `.txt` file within the size limit.
pub fn validate_file(path: &Path) -> Result<u64> {
    let meta = std::fs::metadata(path).map_err(|_| file_error(path, "file does not exist"))?;
    if !meta.is_file() {
        return Err(file_error(path, "path is not a file"));
    }
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(file_error(
            path,
            format!(
                "unsupported file type, supported: .{}",
                SUPPORTED_EXTENSIONS.join(", .")
            ),
        ));
    }
    if meta.len() > MAX_FILE_SIZE_BYTES {
        return Err(file_error(
            path,
            format!(
                "file too large ({:.1} MB), maximum is {} MB",
                meta.len() as f64 / (1024.0 * 1024.0),
                MAX_FILE_SIZE_BYTES / (1024 * 1024)
            ),
        ));
    }
    Ok(meta.len())
}

/// Decode file bytes: UTF-8 (BOM stripped) or, failing that, Latin-1.
pub fn decode_text(bytes: &[u8]) -> String {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => text.to_string(),
        Err(e) => {
            warn!(
                valid_up_to = e.valid_up_to(),
                "input is not valid UTF-8; decoding as Latin-1"
            );
            bytes.iter().map(|&b| b as char).collect()
        }
    }
}

/// Validate and read a text file; whitespace-only content is rejected.
pub fn read_text_file(path: &Path) -> Result<String> {
    validate_file(path)?;
    let bytes = std::fs::read(path)
        .map_err(|e| file_error(path, format!("failed to read file: {}", e)))?;
    let text = decode_text(&bytes);
    if text.trim().is_empty() {
        return Err(file_error(path, "file is empty or contains only whitespace"));
    }
    info!(
        path = %path.display(),
        characters = text.chars().count(),
        "input file read"
    );
    Ok(text)
}

/// Collapse whitespace runs and replace typographic punctuation with ASCII.
pub fn clean_text(text: &str) -> String {
    let mut cleaned = WHITESPACE.replace_all(text.trim(), " ").into_owned();
    for (from, to) in TYPOGRAPHIC_REPLACEMENTS {
        if cleaned.contains(*from) {
            cleaned = cleaned.replace(*from, to);
        }
    }
    debug!(
        before = text.len(),
        after = cleaned.len(),
        "text cleaned"
    );
    cleaned
}
