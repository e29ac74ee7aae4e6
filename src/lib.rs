//! # voiceforge
//!
//! Text-file to MP3 conversion through remote text-to-speech services.
//!
//! ## Overview
//!
//! The heart of the crate is a streaming conversion pipeline: one HTTP POST per
//! conversion, the audio body written to disk chunk by chunk as it arrives, and a
//! monotonic progress signal that stays smooth even when the server sends no
//! `Content-Length`.
//!
//! ## Key Features
//!
//! - **Streaming**: audio is never buffered whole in memory; see [`writer::StreamWriter`]
//! - **Adaptive progress**: exact when the size is declared, a time/size blend when it
//!   is not; see [`progress::ProgressEstimator`]
//! - **Typed failures**: every failure is a distinct [`error_code::ErrorKind`] on the
//!   returned [`tts::ConversionOutcome`]
//! - **Providers**: a [`tts::TtsProvider`] interface with a Fish Audio implementation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use voiceforge::progress::NoopProgress;
//! use voiceforge::tts::{ConversionRequest, FishAudioClient};
//! use std::path::Path;
//!
//! #[tokio::main]
//! async fn main() -> voiceforge::Result<()> {
//!     let client = FishAudioClient::builder().build()?;
//!     let request = ConversionRequest::new("Hello there.", "speech-1.6");
//!     let outcome = client
//!         .convert(&request, "your-api-key", Path::new("hello.mp3"), &NoopProgress)
//!         .await;
//!     println!("{}", outcome);
//!     Ok(())
//! }
//! ```
//!
//! ## Module Organization
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`tts`] | Requests, outcomes, providers and the conversion pipeline |
//! | [`transport`] | HTTP transport and timeout policy |
//! | [`progress`] | Progress estimation and callbacks |
//! | [`writer`] | Streamed output file writer |
//! | [`config`] | YAML settings and credential stores |
//! | [`input`] | Input file validation, decoding and statistics |
//! | [`output`] | Output naming and collision handling |
//! | [`presets`] | Named speech presets |
//! | [`pricing`] | Character-based cost estimation |
//! | [`logging`] | Subscriber setup for the binary |

pub mod config;
pub mod error_code;
pub mod input;
pub mod logging;
pub mod output;
pub mod presets;
pub mod pricing;
pub mod progress;
pub mod transport;
pub mod tts;
pub mod writer;

pub use progress::{ProgressCallback, ProgressEstimator, ProgressTuning};
pub use transport::TimeoutPolicy;
pub use tts::{
    ConversionOutcome, ConversionRequest, FishAudioClient, Mp3Bitrate, ProviderRegistry,
    SynthesisSettings, TtsProvider,
};

use futures::Stream;
use std::pin::Pin;

/// Result type alias for the library
pub type Result<T> = std::result::Result<T, Error>;

/// A unified pinned, boxed stream that emits `Result<T>`
pub type BoxStream<'a, T> = Pin<Box<dyn Stream<Item = Result<T>> + Send + 'a>>;

/// Error type for the library
pub mod error;
pub use error::{Error, ErrorContext};
