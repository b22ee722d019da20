//! # mandarin-assess
//!
//! A Rust library for scoring Mandarin pronunciation by comparing what a
//! speaker was asked to say with what a speech recognizer heard.
//!
//! ## Features
//!
//! - **Syllable-level scoring**: each syllable is split into initial, final and
//!   tone, and each component is scored separately
//! - **Readable feedback**: per-syllable clauses such as
//!   `tone: first tone (flat) → fourth tone (falling)` and a one-line summary
//! - **Evaluation harness**: run a labelled set of recordings through any
//!   transcription backend and report detection rates
//!
//! ## Quick Start
//!
//! ```toml
//! [dependencies]
//! mandarin-assess = "2026.10"
//! ```
//!
//! ```rust
//! # #[cfg(feature = "pinyin")] {
//! use mandarin_assess::scoring::assess;
//!
//! let result = assess("你好", "你好");
//! assert!(result.overall_match);
//! assert_eq!(result.score, 100.0);
//!
//! let result = assess("妈", "骂");
//! assert_eq!(result.score, 66.7);
//! println!("{}", result.summary); // Issues: 1 tone error(s)
//! # }
//! ```
//!
//! Without the `pinyin` feature, supply a [`romanize::Romanizer`] and call
//! [`scoring::assess_with`].

pub mod eval;
pub mod normalize;
pub mod romanize;
pub mod scoring;
pub mod transcriber;

use std::path::Path;

use serde::{Deserialize, Serialize};

/// The result of a transcription (speech-to-text) operation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    /// Recognized text. Usually Chinese, but may be romanized Latin text when
    /// the recognizer could not settle on Chinese.
    pub text: String,
    /// Language reported or requested for the recognition.
    #[serde(default)]
    pub language: Option<String>,
    /// Length of the recorded audio in seconds.
    #[serde(default)]
    pub duration: f64,
}

/// Common interface for speech-to-text backends.
///
/// Implementations turn one recorded utterance into text. Any failure is
/// reported as an error and handled by the caller; the scoring engine never
/// sees it.
pub trait TranscriptionProvider {
    /// Transcribe the audio file at `audio_path`.
    fn transcribe(
        &mut self,
        audio_path: &Path,
    ) -> Result<Transcription, Box<dyn std::error::Error>>;
}
