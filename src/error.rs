use crate::error_code::ErrorKind;
use crate::transport::TransportError;
use std::path::PathBuf;
use thiserror::Error;

/// Structured error context for configuration and validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorContext {
    /// Field path or configuration key that caused the error (e.g., "providers.fish_audio.default_voice")
    pub field_path: Option<String>,
    /// Additional context about the error (e.g., expected range, actual value)
    pub details: Option<String>,
    /// Source of the error (e.g., "config_manager", "input_handler")
    pub source: Option<String>,
}

impl ErrorContext {
    pub fn new() -> Self {
        Self {
            field_path: None,
            details: None,
            source: None,
        }
    }

    pub fn with_field_path(mut self, path: impl Into<String>) -> Self {
        self.field_path = Some(path.into());
        self
    }

    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = Some(source.into());
        self
    }
}

impl Default for ErrorContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Unified error type for VoiceForge.
///
/// Every variant maps onto exactly one [`ErrorKind`] through [`Error::kind`], which is
/// what callers of the conversion pipeline inspect.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{provider}: authentication failed: {message}")]
    Authentication { provider: String, message: String },

    #[error("{provider}: bad request: {message}")]
    BadRequest { provider: String, message: String },

    #[error(
        "{provider}: rate limit exceeded, please wait and try again{}{}",
        format_retry_after(.retry_after_ms),
        format_message(.message)
    )]
    RateLimited {
        provider: String,
        message: String,
        retry_after_ms: Option<u32>,
    },

    #[error("{provider}: service error (HTTP {status}): {message}")]
    Remote {
        provider: String,
        status: u16,
        message: String,
    },

    /// No credential was supplied; raised locally before any request is sent.
    #[error("{provider}: no API key configured")]
    MissingCredential { provider: String },

    #[error("{provider}: received empty audio data")]
    EmptyResponse { provider: String },

    #[error("Network transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Failed to write {}: {message}", .path.display())]
    WriteFailure { path: PathBuf, message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration file error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Configuration error: {message}{}", format_context(.context))]
    Configuration {
        message: String,
        context: ErrorContext,
    },

    #[error("Validation error: {message}{}", format_context(.context))]
    Validation {
        message: String,
        context: ErrorContext,
    },
}

fn format_retry_after(retry_after_ms: &Option<u32>) -> String {
    match retry_after_ms {
        Some(ms) => format!(" (retry after {}s)", ms / 1000),
        None => String::new(),
    }
}

fn format_message(message: &str) -> String {
    if message.is_empty() {
        String::new()
    } else {
        format!(": {}", message)
    }
}

// Helper function to format error context for display
fn format_context(ctx: &ErrorContext) -> String {
    let mut parts = Vec::new();
    if let Some(ref field) = ctx.field_path {
        parts.push(format!("field: {}", field));
    }
    if let Some(ref details) = ctx.details {
        parts.push(format!("details: {}", details));
    }
    if let Some(ref source) = ctx.source {
        parts.push(format!("source: {}", source));
    }
    if parts.is_empty() {
        String::new()
    } else {
        format!(" ({})", parts.join(", "))
    }
}

impl Error {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Error::Configuration {
            message: msg.into(),
            context: ErrorContext::new(),
        }
    }

    /// Create a new configuration error with structured context
    pub fn configuration_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Configuration {
            message: msg.into(),
            context,
        }
    }

    /// Create a new validation error with structured context
    pub fn validation_with_context(msg: impl Into<String>, context: ErrorContext) -> Self {
        Error::Validation {
            message: msg.into(),
            context,
        }
    }

    pub fn write_failure(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Error::WriteFailure {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// The failure kind surfaced to callers of the conversion pipeline.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Authentication { .. } | Error::MissingCredential { .. } => {
                ErrorKind::AuthenticationFailure
            }
            Error::BadRequest { .. } | Error::Validation { .. } | Error::Serialization(_) => {
                ErrorKind::BadRequest
            }
            Error::RateLimited { .. } => ErrorKind::RateLimited,
            Error::Remote { status, .. } => ErrorKind::ServiceError { status: *status },
            Error::EmptyResponse { .. } => ErrorKind::EmptyResponse,
            Error::Transport(_) => ErrorKind::ConnectionError,
            Error::WriteFailure { .. } | Error::Io(_) => ErrorKind::WriteFailure,
            Error::Yaml(_) | Error::Configuration { .. } => ErrorKind::Configuration,
        }
    }

    /// Status of the HTTP response this error was built from.
    ///
    /// `None` for failures raised locally or below the HTTP layer.
    pub fn http_status(&self) -> Option<u16> {
        match self {
            Error::Authentication { .. } => Some(401),
            Error::BadRequest { .. } => Some(400),
            Error::RateLimited { .. } => Some(429),
            Error::Remote { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Extract error context if available
    pub fn context(&self) -> Option<&ErrorContext> {
        match self {
            Error::Configuration { context, .. } | Error::Validation { context, .. } => {
                Some(context)
            }
            _ => None,
        }
    }
}
