use std::path::{Path, PathBuf};
use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::normalize::{is_romanization, normalize, ScriptConverter, ScriptTarget};
use crate::romanize::Romanizer;
use crate::scoring::assess_with;
use crate::{Transcription, TranscriptionProvider};

use super::{audio_path, EvalCase, TranscriptCache, AUDIO_EXTENSION};

/// Placeholder pinyin for transcripts that came back romanized.
pub const ROMANIZATION_PINYIN: &str = "N/A (romanization)";

/// Outcome of evaluating one test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalResult {
    pub filename: String,
    pub error_type: String,
    pub severity: Option<String>,
    pub expected_chinese: String,
    /// Normalized transcript; empty when transcription did not happen.
    pub actual_chinese: String,
    pub expected_pinyin: String,
    pub actual_pinyin: String,
    pub score: f64,
    pub overall_match: bool,
    pub summary: String,
    /// The transcript was Latin text rather than Chinese.
    pub is_romanization: bool,
    /// Seconds spent obtaining the transcript.
    pub processing_time: f64,
    pub used_cache: bool,
    /// Audio length in seconds as reported by the provider.
    pub duration: f64,
    /// Set when the case could not be assessed at all.
    pub error: Option<String>,
}

impl EvalResult {
    fn failed(case: &EvalCase, expected_pinyin: String, error: String) -> Self {
        Self {
            filename: case.filename.clone(),
            error_type: case.error_type.clone(),
            severity: case.severity.clone(),
            expected_chinese: case.expected_chinese.clone(),
            actual_chinese: String::new(),
            expected_pinyin,
            actual_pinyin: String::new(),
            score: 0.0,
            overall_match: false,
            summary: error.clone(),
            is_romanization: false,
            processing_time: 0.0,
            used_cache: false,
            duration: 0.0,
            error: Some(error),
        }
    }
}

/// Everything produced by [`run_evaluation`].
#[derive(Debug, Clone)]
pub struct EvalRun {
    pub results: Vec<EvalResult>,
    /// Rendered console report.
    pub report: String,
    /// CSV written when an output directory was configured.
    pub csv_path: Option<PathBuf>,
}

/// Runs test cases through transcription and assessment.
pub struct Evaluator<P> {
    provider: P,
    romanizer: Box<dyn Romanizer>,
    converter: Box<dyn ScriptConverter>,
    cache: TranscriptCache,
    use_cache: bool,
    audio_dir: PathBuf,
}

impl<P: TranscriptionProvider> Evaluator<P> {
    /// Create an evaluator that romanizes with the bundled pinyin dictionary.
    #[cfg(feature = "pinyin")]
    pub fn new(provider: P, audio_dir: impl Into<PathBuf>) -> Self {
        Self::with_romanizer(provider, audio_dir, crate::romanize::PinyinRomanizer)
    }

    pub fn with_romanizer(
        provider: P,
        audio_dir: impl Into<PathBuf>,
        romanizer: impl Romanizer + 'static,
    ) -> Self {
        Self {
            provider,
            romanizer: Box::new(romanizer),
            converter: ScriptTarget::default().converter(),
            cache: TranscriptCache::default(),
            use_cache: false,
            audio_dir: audio_dir.into(),
        }
    }

    /// Script converter applied to both texts. Defaults to simplified.
    pub fn with_converter(mut self, converter: impl ScriptConverter + 'static) -> Self {
        self.converter = Box::new(converter);
        self
    }

    /// Convert both texts to `target` before scoring.
    pub fn with_script(mut self, target: ScriptTarget) -> Self {
        self.converter = target.converter();
        self
    }

    /// Attach a transcript cache. New transcriptions are always recorded in it;
    /// existing entries are only reused when `use_cache` is set.
    pub fn with_cache(mut self, cache: TranscriptCache, use_cache: bool) -> Self {
        self.cache = cache;
        self.use_cache = use_cache;
        self
    }

    pub fn cache(&self) -> &TranscriptCache {
        &self.cache
    }

    pub fn cache_mut(&mut self) -> &mut TranscriptCache {
        &mut self.cache
    }

    /// Evaluate every case in order, logging progress.
    pub fn run(&mut self, cases: &[EvalCase]) -> Vec<EvalResult> {
        let total = cases.len();
        cases
            .iter()
            .enumerate()
            .map(|(i, case)| {
                let progress = (i + 1) as f64 / total as f64 * 100.0;
                log::info!(
                    "[{}/{total}] ({progress:.1}%) Processing: {}",
                    i + 1,
                    case.filename
                );
                self.run_case(case)
            })
            .collect()
    }

    /// Evaluate a single case. Failures become result records, never errors.
    pub fn run_case(&mut self, case: &EvalCase) -> EvalResult {
        let expected_text = normalize(&case.expected_chinese, self.converter.as_ref());
        let expected_pinyin = case
            .expected_pinyin
            .clone()
            .unwrap_or_else(|| self.romanizer.romanize(&expected_text).join(" "));

        let path = audio_path(&self.audio_dir, &case.filename, AUDIO_EXTENSION);
        if !path.exists() {
            log::warn!("Audio file not found: {}", path.display());
            return EvalResult::failed(
                case,
                expected_pinyin,
                format!("Audio file not found: {}", path.display()),
            );
        }

        let start = Instant::now();
        let (transcription, used_cache) = match self.transcription_for(case, &path) {
            Ok(found) => found,
            Err(e) => {
                log::warn!("Transcription failed for {}: {e}", case.filename);
                return EvalResult::failed(
                    case,
                    expected_pinyin,
                    format!("Transcription failed: {e}"),
                );
            }
        };
        let processing_time = start.elapsed().as_secs_f64();

        let actual_text = normalize(&transcription.text, self.converter.as_ref());
        let romanized = is_romanization(&actual_text);

        let (actual_pinyin, score, overall_match, summary) = if romanized {
            log::warn!(
                "{} transcribed as romanization: {actual_text:?}",
                case.filename
            );
            (
                ROMANIZATION_PINYIN.to_string(),
                0.0,
                false,
                format!("Transcription returned romanization: \"{actual_text}\" (cannot assess)"),
            )
        } else {
            let assessment = assess_with(self.romanizer.as_ref(), &expected_text, &actual_text);
            (
                assessment.actual_pinyin,
                assessment.score,
                assessment.overall_match,
                assessment.summary,
            )
        };

        EvalResult {
            filename: case.filename.clone(),
            error_type: case.error_type.clone(),
            severity: case.severity.clone(),
            expected_chinese: case.expected_chinese.clone(),
            actual_chinese: actual_text,
            expected_pinyin,
            actual_pinyin,
            score,
            overall_match,
            summary,
            is_romanization: romanized,
            processing_time,
            used_cache,
            duration: transcription.duration,
            error: None,
        }
    }

    fn transcription_for(
        &mut self,
        case: &EvalCase,
        path: &Path,
    ) -> Result<(Transcription, bool), Box<dyn std::error::Error>> {
        if self.use_cache {
            if let Some(cached) = self.cache.get(&case.filename) {
                return Ok((cached.clone(), true));
            }
        }
        let transcription = self.provider.transcribe(path)?;
        self.cache.insert(case.filename.clone(), transcription.clone());
        Ok((transcription, false))
    }
}

/// Load, evaluate, report and export according to `params`.
///
/// The transcript cache is saved whenever new transcriptions were obtained.
#[cfg(feature = "pinyin")]
pub fn run_evaluation<P: TranscriptionProvider>(
    params: &super::EvalParams,
    provider: P,
) -> Result<EvalRun, super::EvalError> {
    let mut cases = super::load_eval_cases(&params.metadata_file)?;
    if let Some(error_type) = &params.error_type {
        cases = super::filter_by_error_type(cases, error_type);
        log::info!(
            "Filtered to {} test cases with error_type='{error_type}'",
            cases.len()
        );
    }

    let cache = if params.use_cache {
        TranscriptCache::load(&params.cache_file)?
    } else {
        TranscriptCache::default()
    };

    let mut evaluator = Evaluator::new(provider, &params.audio_dir)
        .with_script(params.script)
        .with_cache(cache, params.use_cache);
    let results = evaluator.run(&cases);

    if evaluator.cache().is_dirty() {
        evaluator.cache_mut().save(&params.cache_file)?;
    }

    let report = super::console_report(&results);

    let csv_path = match &params.output_dir {
        Some(dir) if !results.is_empty() => {
            std::fs::create_dir_all(dir)?;
            let path = dir.join(super::timestamped_filename("eval_results", "csv"));
            super::write_csv(&results, &path)?;
            Some(path)
        }
        _ => None,
    };

    Ok(EvalRun {
        results,
        report,
        csv_path,
    })
}
