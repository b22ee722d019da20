use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use crate::{Transcription, TranscriptionProvider};

#[derive(thiserror::Error, Debug)]
pub enum TranscriberError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Transcriber program '{0}' not found. Check the path or install it.")]
    ProgramNotFound(String),
    #[error("Audio file not found: {0}")]
    AudioNotFound(String),
    #[error("Transcription failed: {0}")]
    Failed(String),
}

/// Transcribes audio by running an external speech-to-text program.
///
/// The program is invoked as `program [args...] <audio_path>` and must print
/// the transcript to stdout. Any whisper.cpp-style CLI that can be told to
/// print plain text works.
///
/// ```rust,no_run
/// use mandarin_assess::transcriber::CommandTranscriber;
/// use mandarin_assess::TranscriptionProvider;
/// use std::path::Path;
///
/// let mut transcriber = CommandTranscriber::new("whisper-cli")
///     .with_args(["-m", "models/ggml-base.bin", "-l", "zh", "-nt", "-np", "-f"]);
/// let result = transcriber.transcribe(Path::new("data/eval_audio/ni_hao.wav"))?;
/// println!("{} ({:.1}s)", result.text, result.duration);
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct CommandTranscriber {
    program: PathBuf,
    args: Vec<String>,
    language: Option<String>,
}

impl CommandTranscriber {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            args: Vec::new(),
            language: Some("zh".to_string()),
        }
    }

    /// Arguments placed before the audio path.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Language recorded on each [`Transcription`]. Informational only.
    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    fn run(&self, audio_path: &Path) -> Result<String, TranscriberError> {
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(audio_path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    TranscriberError::ProgramNotFound(self.program.display().to_string())
                } else {
                    TranscriberError::Io(e)
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(TranscriberError::Failed(format!(
                "{} exited with code {:?}: {stderr}",
                self.program.display(),
                output.status.code()
            )));
        }

        Ok(collapse_lines(&String::from_utf8_lossy(&output.stdout)))
    }
}

impl TranscriptionProvider for CommandTranscriber {
    fn transcribe(
        &mut self,
        audio_path: &Path,
    ) -> Result<Transcription, Box<dyn std::error::Error>> {
        if !audio_path.exists() {
            return Err(TranscriberError::AudioNotFound(audio_path.display().to_string()).into());
        }

        let text = self.run(audio_path)?;
        let duration = wav_duration_secs(audio_path).unwrap_or(0.0);
        log::debug!(
            "Transcribed {} ({duration:.2}s): {text}",
            audio_path.display()
        );

        Ok(Transcription {
            text,
            language: self.language.clone(),
            duration,
        })
    }
}

/// Join non-empty output lines with single spaces.
fn collapse_lines(stdout: &str) -> String {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Duration of a WAV file in seconds, or `None` for anything that is not a
/// readable WAV.
pub fn wav_duration_secs(path: &Path) -> Option<f64> {
    let is_wav = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("wav"));
    if !is_wav {
        return None;
    }

    match hound::WavReader::open(path) {
        Ok(reader) => {
            let spec = reader.spec();
            Some(reader.duration() as f64 / spec.sample_rate as f64)
        }
        Err(e) => {
            log::warn!("Could not read WAV header of {}: {e}", path.display());
            None
        }
    }
}
