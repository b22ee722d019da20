//! mandarin-eval: score a labelled set of recordings and report detection rates.

use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use mandarin_assess::eval::{
    run_evaluation, EvalParams, DEFAULT_AUDIO_DIR, DEFAULT_CACHE_FILE, DEFAULT_METADATA_FILE,
};
use mandarin_assess::normalize::ScriptTarget;
use mandarin_assess::transcriber::CommandTranscriber;

#[derive(Parser)]
#[command(name = "mandarin-eval")]
#[command(about = "Run the pronunciation assessment evaluation suite")]
#[command(version)]
struct Cli {
    /// YAML file listing the test cases
    #[arg(long, default_value = DEFAULT_METADATA_FILE)]
    metadata: PathBuf,

    /// Directory containing the recordings
    #[arg(long, default_value = DEFAULT_AUDIO_DIR)]
    audio_dir: PathBuf,

    /// Only evaluate one error type (e.g. wrong_tone, wrong_initial, correct)
    #[arg(long)]
    error_type: Option<String>,

    /// Directory for a timestamped CSV of the results
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Reuse cached transcriptions instead of re-running the transcriber
    #[arg(long)]
    use_cache: bool,

    /// Transcript cache file
    #[arg(long, default_value = DEFAULT_CACHE_FILE)]
    cache_file: PathBuf,

    /// Script transcripts are converted to before scoring
    #[arg(long, value_enum, default_value_t = ScriptTarget::Simplified)]
    script: ScriptTarget,

    /// Speech-to-text program, invoked as `<program> [args...] <audio>`
    #[arg(long, env = "MANDARIN_EVAL_TRANSCRIBER", default_value = "whisper-cli")]
    transcriber: PathBuf,

    /// Argument passed to the transcriber before the audio path (repeatable)
    #[arg(long = "transcriber-arg", allow_hyphen_values = true)]
    transcriber_args: Vec<String>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();
    let cli = Cli::parse();

    let params = EvalParams {
        metadata_file: cli.metadata,
        audio_dir: cli.audio_dir,
        cache_file: cli.cache_file,
        output_dir: cli.output,
        error_type: cli.error_type,
        use_cache: cli.use_cache,
        script: cli.script,
    };
    let transcriber = CommandTranscriber::new(cli.transcriber).with_args(cli.transcriber_args);

    let start = Instant::now();
    let run = run_evaluation(&params, transcriber)?;

    println!("{}", run.report);
    println!(
        "\nEvaluated {} cases in {:.2?}",
        run.results.len(),
        start.elapsed()
    );
    if let Some(path) = run.csv_path {
        println!("Detailed results saved to: {}", path.display());
    }
    Ok(())
}
