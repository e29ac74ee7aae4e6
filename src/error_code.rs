//! Failure kinds surfaced by the conversion pipeline.
//!
//! Every failure a conversion can end in is reported as exactly one [`ErrorKind`],
//! each with a stable code, a snake_case name and a category.
//!
//! | Prefix | Category | Description                              |
//! |--------|----------|------------------------------------------|
//! | VF1xxx | client   | Credential and request-side errors       |
//! | VF2xxx | rate     | Throttling by the service                |
//! | VF3xxx | server   | Service failures, including empty bodies |
//! | VF4xxx | network  | Transport-level failures                 |
//! | VF5xxx | local    | Filesystem and configuration failures    |
//!
//! ## Example
//!
//! ```rust
//! use voiceforge::error_code::ErrorKind;
//!
//! let kind = ErrorKind::from_http_status(429);
//! assert_eq!(kind.code(), "VF2001");
//! assert!(kind.caller_may_retry());
//! assert_eq!(kind.category(), "rate");
//! ```

use std::fmt;

/// Kind of a failed conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// VF1001: Invalid, expired, or missing credential (HTTP 401)
    AuthenticationFailure,
    /// VF1002: Malformed parameters rejected by the service (HTTP 400) or by local validation
    BadRequest,
    /// VF2001: The service throttled the request (HTTP 429)
    RateLimited,
    /// VF3001: Any other non-2xx response
    ServiceError { status: u16 },
    /// VF3002: HTTP 200 with a zero-byte body
    EmptyResponse,
    /// VF4001: DNS, TCP, TLS or timeout failure before or during the stream
    ConnectionError,
    /// VF5001: Output file could not be written or was empty after the stream
    WriteFailure,
    /// VF5002: Local configuration is missing or invalid
    Configuration,
}

impl ErrorKind {
    /// Returns the stable code string (e.g., `"VF1001"`).
    #[inline]
    pub fn code(&self) -> &'static str {
        match self {
            Self::AuthenticationFailure => "VF1001",
            Self::BadRequest => "VF1002",
            Self::RateLimited => "VF2001",
            Self::ServiceError { .. } => "VF3001",
            Self::EmptyResponse => "VF3002",
            Self::ConnectionError => "VF4001",
            Self::WriteFailure => "VF5001",
            Self::Configuration => "VF5002",
        }
    }

    /// Returns the snake_case name (e.g., `"rate_limited"`).
    #[inline]
    pub fn name(&self) -> &'static str {
        match self {
            Self::AuthenticationFailure => "authentication_failure",
            Self::BadRequest => "bad_request",
            Self::RateLimited => "rate_limited",
            Self::ServiceError { .. } => "service_error",
            Self::EmptyResponse => "empty_response",
            Self::ConnectionError => "connection_error",
            Self::WriteFailure => "write_failure",
            Self::Configuration => "configuration",
        }
    }

    /// Returns the category: `"client"`, `"rate"`, `"server"`, `"network"`, or `"local"`.
    #[inline]
    pub fn category(&self) -> &'static str {
        match self {
            Self::AuthenticationFailure | Self::BadRequest => "client",
            Self::RateLimited => "rate",
            Self::ServiceError { .. } | Self::EmptyResponse => "server",
            Self::ConnectionError => "network",
            Self::WriteFailure | Self::Configuration => "local",
        }
    }

    /// Whether re-running the same conversion later can reasonably succeed.
    ///
    /// The pipeline itself never retries; this only informs the caller.
    #[inline]
    pub fn caller_may_retry(&self) -> bool {
        match self {
            Self::RateLimited | Self::ConnectionError | Self::EmptyResponse => true,
            Self::ServiceError { status } => *status >= 500,
            _ => false,
        }
    }

    /// Nominal HTTP status for the kind, if any.
    ///
    /// Kinds such as [`ErrorKind::AuthenticationFailure`] can also be raised locally;
    /// use [`crate::Error::http_status`] for the status actually received.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::AuthenticationFailure => Some(401),
            Self::BadRequest => Some(400),
            Self::RateLimited => Some(429),
            Self::ServiceError { status } => Some(*status),
            _ => None,
        }
    }

    /// Maps a non-2xx HTTP status code to its failure kind.
    ///
    /// Only 401, 400 and 429 have dedicated kinds; everything else is a service error
    /// carrying the status.
    pub fn from_http_status(status: u16) -> Self {
        match status {
            401 => Self::AuthenticationFailure,
            400 => Self::BadRequest,
            429 => Self::RateLimited,
            other => Self::ServiceError { status: other },
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ServiceError { status } => write!(f, "{} (HTTP {})", self.name(), status),
            _ => write!(f, "{}", self.name()),
        }
    }
}
