//! Evaluation harness for the assessment pipeline.
//!
//! Runs a labelled set of recordings through a [`TranscriptionProvider`],
//! scores each transcript against its expected text and reports how well the
//! system detected the intentional mistakes.
//!
//! # Metadata Layout
//!
//! ```yaml
//! test_cases:
//!   - filename: eval_ni_hao_perfect_001
//!     expected_chinese: 你好
//!     expected_pinyin: ni3 hao3
//!     error_type: correct
//!   - filename: eval_ma_wrong_tone_001
//!     expected_chinese: 妈
//!     expected_pinyin: ma1
//!     error_type: wrong_tone
//!     severity: major
//! ```
//!
//! Audio for each case is looked up as `<audio_dir>/<filename>.wav`.
//!
//! # Error Types
//!
//! `correct` cases should come back as a perfect match; anything reported as
//! wrong is a false positive. Every other error type (`wrong_tone`,
//! `wrong_initial`, `wrong_final`, ...) should be flagged; a perfect match is
//! a missed error.
//!
//! # Examples
//!
//! ```rust,no_run
//! # #[cfg(feature = "pinyin")] {
//! use mandarin_assess::eval::{run_evaluation, EvalParamsBuilder};
//! use mandarin_assess::transcriber::CommandTranscriber;
//!
//! let params = EvalParamsBuilder::default()
//!     .error_type("wrong_tone")
//!     .use_cache(true)
//!     .build()?;
//! let transcriber = CommandTranscriber::new("whisper-cli").with_args(["-l", "zh", "-nt", "-f"]);
//!
//! let run = run_evaluation(&params, transcriber)?;
//! println!("{}", run.report);
//! # }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! [`TranscriptionProvider`]: crate::TranscriptionProvider

pub mod cache;
pub mod report;
pub mod runner;

pub use cache::TranscriptCache;
pub use report::{console_report, summary_stats, timestamped_filename, write_csv, SummaryStats};
#[cfg(feature = "pinyin")]
pub use runner::run_evaluation;
pub use runner::{EvalResult, EvalRun, Evaluator};

use std::path::{Path, PathBuf};

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::normalize::ScriptTarget;

/// Default location of the test-case metadata.
pub const DEFAULT_METADATA_FILE: &str = "data/eval_metadata.yml";
/// Default directory holding the recordings.
pub const DEFAULT_AUDIO_DIR: &str = "data/eval_audio";
/// Default transcript cache.
pub const DEFAULT_CACHE_FILE: &str = "data/eval_transcriptions_cache.json";
/// Extension appended to each case's filename.
pub const AUDIO_EXTENSION: &str = "wav";

#[derive(thiserror::Error, Debug)]
pub enum EvalError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Metadata file not found: {0}")]
    MetadataNotFound(String),
    #[error("Invalid metadata: {0}")]
    Metadata(#[from] serde_yaml::Error),
    #[error("Invalid transcript cache: {0}")]
    Cache(#[from] serde_json::Error),
    #[error("Failed to write CSV: {0}")]
    Csv(#[from] csv::Error),
}

/// One labelled recording.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvalCase {
    /// Recording name, with or without extension.
    pub filename: String,
    /// Text the speaker was asked to say.
    pub expected_chinese: String,
    /// Reference romanization, if the metadata provides one.
    #[serde(default)]
    pub expected_pinyin: Option<String>,
    /// `correct`, or the kind of mistake made on purpose.
    pub error_type: String,
    #[serde(default)]
    pub severity: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Metadata {
    test_cases: Vec<EvalCase>,
}

/// Load test cases from a YAML metadata file.
pub fn load_eval_cases(metadata_file: &Path) -> Result<Vec<EvalCase>, EvalError> {
    if !metadata_file.exists() {
        return Err(EvalError::MetadataNotFound(
            metadata_file.display().to_string(),
        ));
    }
    let content = std::fs::read_to_string(metadata_file)?;
    let metadata: Metadata = serde_yaml::from_str(&content)?;
    log::info!(
        "Loaded {} test cases from {}",
        metadata.test_cases.len(),
        metadata_file.display()
    );
    Ok(metadata.test_cases)
}

/// Keep only the cases labelled with `error_type`.
pub fn filter_by_error_type(cases: Vec<EvalCase>, error_type: &str) -> Vec<EvalCase> {
    cases
        .into_iter()
        .filter(|case| case.error_type == error_type)
        .collect()
}

/// Build `dir/<stem>.<extension>`, dropping any extension already on `filename`.
pub fn audio_path(dir: &Path, filename: &str, extension: &str) -> PathBuf {
    let stem = Path::new(filename)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| filename.to_string());
    let extension = extension.trim_start_matches('.');
    dir.join(format!("{stem}.{extension}"))
}

/// Parameters for an evaluation run.
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
#[builder(default)]
pub struct EvalParams {
    /// YAML file listing the test cases.
    #[builder(setter(into))]
    pub metadata_file: PathBuf,
    /// Directory containing `<filename>.wav` for every case.
    #[builder(setter(into))]
    pub audio_dir: PathBuf,
    /// JSON transcript cache, keyed by case filename.
    #[builder(setter(into))]
    pub cache_file: PathBuf,
    /// Where to write a timestamped CSV. `None` skips the CSV.
    #[builder(setter(into, strip_option))]
    pub output_dir: Option<PathBuf>,
    /// Only evaluate cases with this error type.
    #[builder(setter(into, strip_option))]
    pub error_type: Option<String>,
    /// Reuse cached transcriptions instead of calling the provider.
    pub use_cache: bool,
    /// Script both texts are converted to before scoring.
    pub script: ScriptTarget,
}

impl Default for EvalParams {
    fn default() -> Self {
        Self {
            metadata_file: PathBuf::from(DEFAULT_METADATA_FILE),
            audio_dir: PathBuf::from(DEFAULT_AUDIO_DIR),
            cache_file: PathBuf::from(DEFAULT_CACHE_FILE),
            output_dir: None,
            error_type: None,
            use_cache: false,
            script: ScriptTarget::Simplified,
        }
    }
}
