use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use serde::Serialize;

use super::{EvalError, EvalResult};

/// Error type label for recordings made without intentional mistakes.
pub const CORRECT: &str = "correct";

/// Detection rates below this percentage are flagged in the report.
const DETECTION_TARGET: f64 = 80.0;

/// More romanization fallbacks than this are flagged in the report.
const ROMANIZATION_WARN_COUNT: usize = 5;

/// Aggregate figures for one group of results.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GroupStats {
    pub count: usize,
    pub average_score: f64,
    /// Share of cases flagged as wrong, for error types other than `correct`.
    pub detection_rate: Option<f64>,
    /// Share of cases flagged as wrong, for `correct`.
    pub false_positive_rate: Option<f64>,
}

/// Aggregate figures for a whole evaluation run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total_cases: usize,
    pub average_score: f64,
    pub median_score: f64,
    pub min_score: f64,
    pub max_score: f64,
    pub perfect_count: usize,
    pub perfect_rate: f64,
    pub romanization_count: usize,
    pub by_error_type: BTreeMap<String, GroupStats>,
}

fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 / whole as f64 * 100.0
    }
}

fn group_by_error_type(results: &[EvalResult]) -> BTreeMap<&str, Vec<&EvalResult>> {
    let mut groups: BTreeMap<&str, Vec<&EvalResult>> = BTreeMap::new();
    for result in results {
        groups
            .entry(result.error_type.as_str())
            .or_default()
            .push(result);
    }
    groups
}

/// Compute summary statistics over a set of results.
pub fn summary_stats(results: &[EvalResult]) -> SummaryStats {
    let scores: Vec<f64> = results.iter().map(|r| r.score).collect();
    let perfect_count = results.iter().filter(|r| r.overall_match).count();

    let by_error_type = group_by_error_type(results)
        .into_iter()
        .map(|(error_type, group)| {
            let count = group.len();
            let perfect = group.iter().filter(|r| r.overall_match).count();
            let flagged = (count - perfect) as f64 / count as f64;
            let is_correct = error_type == CORRECT;
            let scores: Vec<f64> = group.iter().map(|r| r.score).collect();
            (
                error_type.to_string(),
                GroupStats {
                    count,
                    average_score: mean(&scores),
                    detection_rate: (!is_correct).then_some(flagged),
                    false_positive_rate: is_correct.then_some(flagged),
                },
            )
        })
        .collect();

    SummaryStats {
        total_cases: results.len(),
        average_score: mean(&scores),
        median_score: median(&scores),
        min_score: scores.iter().copied().reduce(f64::min).unwrap_or(0.0),
        max_score: scores.iter().copied().reduce(f64::max).unwrap_or(0.0),
        perfect_count,
        perfect_rate: if results.is_empty() {
            0.0
        } else {
            perfect_count as f64 / results.len() as f64
        },
        romanization_count: results.iter().filter(|r| r.is_romanization).count(),
        by_error_type,
    }
}

/// Detection rate for one error type, if any such cases were evaluated.
fn detection_percent(results: &[EvalResult], error_type: &str) -> Option<f64> {
    let group: Vec<&EvalResult> = results
        .iter()
        .filter(|r| r.error_type == error_type)
        .collect();
    if group.is_empty() {
        return None;
    }
    let detected = group.iter().filter(|r| !r.overall_match).count();
    Some(percent(detected, group.len()))
}

/// Render a human-readable report of an evaluation run.
pub fn console_report(results: &[EvalResult]) -> String {
    let rule = "=".repeat(80);
    let mut out = String::new();
    write_report(&mut out, results, &rule).expect("writing to a String never fails");
    out
}

fn write_report(out: &mut String, results: &[EvalResult], rule: &str) -> std::fmt::Result {
    writeln!(out, "{rule}")?;
    writeln!(out, "EVALUATION RESULTS")?;
    writeln!(out, "{rule}")?;
    writeln!(out)?;

    if results.is_empty() {
        writeln!(out, "No test cases evaluated.")?;
        writeln!(out)?;
        return write!(out, "{rule}");
    }

    let stats = summary_stats(results);
    let total = stats.total_cases;
    let audio_secs: f64 = results.iter().map(|r| r.duration).sum();
    let processing_secs: f64 = results.iter().map(|r| r.processing_time).sum();

    writeln!(out, "Total Test Cases: {total}")?;
    writeln!(
        out,
        "Audio Duration: {audio_secs:.1} seconds ({:.2} minutes)",
        audio_secs / 60.0
    )?;
    writeln!(out, "Processing Time: {processing_secs:.1} seconds")?;
    writeln!(
        out,
        "Average processing time per file: {:.2}s",
        processing_secs / total as f64
    )?;
    writeln!(out)?;

    writeln!(out, "--- Overall Performance ---")?;
    writeln!(out, "Average Score: {:.1}%", stats.average_score)?;
    writeln!(out, "Median Score: {:.1}%", stats.median_score)?;
    writeln!(
        out,
        "Score Range: {:.1}% - {:.1}%",
        stats.min_score, stats.max_score
    )?;
    writeln!(
        out,
        "Perfect Pronunciations: {}/{total} ({:.1}%)",
        stats.perfect_count,
        percent(stats.perfect_count, total)
    )?;
    writeln!(out)?;

    writeln!(out, "--- Performance by Error Type ---")?;
    for (error_type, group) in group_by_error_type(results) {
        let n = group.len();
        let perfect = group.iter().filter(|r| r.overall_match).count();
        let flagged = n - perfect;
        let scores: Vec<f64> = group.iter().map(|r| r.score).collect();

        writeln!(out)?;
        writeln!(out, "{error_type} (n={n}):")?;
        writeln!(out, "  Average Score: {:.1}%", mean(&scores))?;
        writeln!(out, "  Perfect: {perfect}/{n} ({:.1}%)", percent(perfect, n))?;
        if error_type == CORRECT {
            if flagged > 0 {
                writeln!(
                    out,
                    "  ⚠ False Positives: {flagged}/{n} ({:.1}%)",
                    percent(flagged, n)
                )?;
                writeln!(
                    out,
                    "    (System incorrectly flagged correct pronunciation as wrong)"
                )?;
            }
        } else {
            writeln!(
                out,
                "  Detection Rate: {flagged}/{n} ({:.1}%)",
                percent(flagged, n)
            )?;
            if perfect > 0 {
                writeln!(
                    out,
                    "  ⚠ Missed Errors: {perfect}/{n} ({:.1}%)",
                    percent(perfect, n)
                )?;
            }
        }
    }

    writeln!(out)?;
    writeln!(out, "--- Romanization Analysis ---")?;
    writeln!(
        out,
        "Romanization Fallbacks: {}/{total} ({:.1}%)",
        stats.romanization_count,
        percent(stats.romanization_count, total)
    )?;
    if stats.romanization_count > 0 {
        writeln!(
            out,
            "  (Cases where the recognizer could not transcribe to Chinese)"
        )?;
    }

    writeln!(out)?;
    writeln!(out, "--- Failure Analysis ---")?;
    writeln!(out)?;

    let missed: Vec<&EvalResult> = results
        .iter()
        .filter(|r| r.error_type != CORRECT && r.overall_match)
        .collect();
    if missed.is_empty() {
        writeln!(
            out,
            "✓ No missed errors - system detected all intentional mistakes!"
        )?;
    } else {
        writeln!(
            out,
            "Cases where system MISSED errors ({} total):",
            missed.len()
        )?;
        for r in missed {
            writeln!(out, "  • {}", r.filename)?;
            writeln!(
                out,
                "    Expected error: {} ({})",
                r.error_type,
                r.severity.as_deref().unwrap_or("unknown")
            )?;
            writeln!(out, "    Score: {}% (should be lower)", r.score)?;
            writeln!(out, "    Summary: {}", r.summary)?;
        }
    }
    writeln!(out)?;

    let false_positives: Vec<&EvalResult> = results
        .iter()
        .filter(|r| r.error_type == CORRECT && !r.overall_match)
        .collect();
    if false_positives.is_empty() {
        writeln!(
            out,
            "✓ No false positives - system correctly validated all perfect pronunciations!"
        )?;
    } else {
        writeln!(
            out,
            "Cases where system INCORRECTLY flagged errors ({} total):",
            false_positives.len()
        )?;
        for r in false_positives {
            writeln!(out, "  • {}", r.filename)?;
            writeln!(out, "    Expected: Perfect (100%)")?;
            writeln!(out, "    Got: {}%", r.score)?;
            writeln!(out, "    Summary: {}", r.summary)?;
        }
    }
    writeln!(out)?;

    writeln!(out, "--- Recommendations ---")?;
    writeln!(out)?;
    for (error_type, label, advice) in [
        (
            "wrong_tone",
            "Tone error detection",
            "Needs improvement - consider additional tone-specific tests",
        ),
        (
            "wrong_initial",
            "Initial consonant error detection",
            "Needs improvement",
        ),
        (
            "wrong_final",
            "Final/vowel error detection",
            "Needs improvement",
        ),
    ] {
        if let Some(rate) = detection_percent(results, error_type) {
            writeln!(out, "• {label}: {rate:.1}%")?;
            if rate < DETECTION_TARGET {
                writeln!(out, "  ⚠ {advice}")?;
            }
        }
    }
    if stats.romanization_count > ROMANIZATION_WARN_COUNT {
        writeln!(
            out,
            "• High romanization rate ({} cases)",
            stats.romanization_count
        )?;
        writeln!(
            out,
            "  → Consider implementing fuzzy matching for romanized output"
        )?;
    }

    writeln!(out)?;
    write!(out, "{rule}")
}

#[derive(Serialize)]
struct CsvRow<'a> {
    filename: &'a str,
    error_type: &'a str,
    severity: Option<&'a str>,
    score: f64,
    overall_match: bool,
    expected_chinese: &'a str,
    actual_chinese: &'a str,
    expected_pinyin: &'a str,
    actual_pinyin: &'a str,
    summary: &'a str,
    is_romanization: bool,
    processing_time: f64,
}

impl<'a> From<&'a EvalResult> for CsvRow<'a> {
    fn from(r: &'a EvalResult) -> Self {
        Self {
            filename: &r.filename,
            error_type: &r.error_type,
            severity: r.severity.as_deref(),
            score: r.score,
            overall_match: r.overall_match,
            expected_chinese: &r.expected_chinese,
            actual_chinese: &r.actual_chinese,
            expected_pinyin: &r.expected_pinyin,
            actual_pinyin: &r.actual_pinyin,
            summary: &r.summary,
            is_romanization: r.is_romanization,
            processing_time: r.processing_time,
        }
    }
}

/// Write one CSV row per result, with a header row.
pub fn write_csv(results: &[EvalResult], path: &Path) -> Result<(), EvalError> {
    let mut writer = csv::Writer::from_path(path)?;
    for result in results {
        writer.serialize(CsvRow::from(result))?;
    }
    writer.flush()?;
    log::info!("Wrote {} results to {}", results.len(), path.display());
    Ok(())
}

/// `base_YYYYmmdd_HHMMSS.ext` using local time.
pub fn timestamped_filename(base: &str, extension: &str) -> String {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    format!("{base}_{timestamp}.{}", extension.trim_start_matches('.'))
}

#[cfg(test)]
mod tests {
    use super::{console_report, summary_stats, timestamped_filename, write_csv};
    use crate::eval::EvalResult;

    fn result(filename: &str, error_type: &str, score: f64, overall_match: bool) -> EvalResult {
        EvalResult {
            filename: filename.to_string(),
            error_type: error_type.to_string(),
            severity: None,
            expected_chinese: "你好".to_string(),
            actual_chinese: "你好".to_string(),
            expected_pinyin: "ni3 hao3".to_string(),
            actual_pinyin: "ni3 hao3".to_string(),
            score,
            overall_match,
            summary: if overall_match {
                "✓ Perfect pronunciation!".to_string()
            } else {
                "Issues: 1 tone error(s)".to_string()
            },
            is_romanization: false,
            processing_time: 0.5,
            used_cache: false,
            duration: 2.0,
            error: None,
        }
    }

    fn sample() -> Vec<EvalResult> {
        vec![
            result("perfect_001", "correct", 100.0, true),
            result("perfect_002", "correct", 83.3, false),
            result("tone_001", "wrong_tone", 66.7, false),
            result("tone_002", "wrong_tone", 100.0, true),
        ]
    }

    #[test]
    fn stats_cover_scores_and_groups() {
        let stats = summary_stats(&sample());
        assert_eq!(stats.total_cases, 4);
        assert_eq!(stats.perfect_count, 2);
        assert_eq!(stats.perfect_rate, 0.5);
        assert_eq!(stats.min_score, 66.7);
        assert_eq!(stats.max_score, 100.0);
        assert!((stats.median_score - 91.65).abs() < 1e-9);

        let correct = &stats.by_error_type["correct"];
        assert_eq!(correct.count, 2);
        assert_eq!(correct.false_positive_rate, Some(0.5));
        assert_eq!(correct.detection_rate, None);

        let tone = &stats.by_error_type["wrong_tone"];
        assert_eq!(tone.detection_rate, Some(0.5));
        assert_eq!(tone.false_positive_rate, None);
    }

    #[test]
    fn report_lists_missed_errors_and_false_positives() {
        let report = console_report(&sample());
        assert!(report.contains("Total Test Cases: 4"));
        assert!(report.contains("Perfect Pronunciations: 2/4 (50.0%)"));
        assert!(report.contains("wrong_tone (n=2):"));
        assert!(report.contains("Detection Rate: 1/2 (50.0%)"));
        assert!(report.contains("⚠ False Positives: 1/2 (50.0%)"));
        assert!(report.contains("Cases where system MISSED errors (1 total):"));
        assert!(report.contains("  • tone_002"));
        assert!(report.contains("Cases where system INCORRECTLY flagged errors (1 total):"));
        assert!(report.contains("  • perfect_002"));
        assert!(report.contains("• Tone error detection: 50.0%"));
        assert!(report.contains("⚠ Needs improvement"));
    }

    #[test]
    fn report_congratulates_clean_runs() {
        let results = vec![
            result("perfect_001", "correct", 100.0, true),
            result("tone_001", "wrong_tone", 66.7, false),
        ];
        let report = console_report(&results);
        assert!(report.contains("✓ No missed errors"));
        assert!(report.contains("✓ No false positives"));
        assert!(report.contains("• Tone error detection: 100.0%"));
        assert!(!report.contains("⚠"));
    }

    #[test]
    fn report_flags_heavy_romanization() {
        let results: Vec<EvalResult> = (0..6)
            .map(|i| {
                let mut r = result(&format!("roman_{i}"), "wrong_initial", 0.0, false);
                r.is_romanization = true;
                r
            })
            .collect();
        let report = console_report(&results);
        assert!(report.contains("Romanization Fallbacks: 6/6 (100.0%)"));
        assert!(report.contains("High romanization rate (6 cases)"));
    }

    #[test]
    fn empty_run_has_a_report() {
        let report = console_report(&[]);
        assert!(report.contains("No test cases evaluated."));
    }

    #[test]
    fn csv_has_fixed_column_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("results.csv");
        let mut rows = sample();
        rows[2].severity = Some("major".to_string());
        write_csv(&rows, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "filename,error_type,severity,score,overall_match,expected_chinese,actual_chinese,\
             expected_pinyin,actual_pinyin,summary,is_romanization,processing_time"
        );
        assert!(lines.next().unwrap().starts_with("perfect_001,correct,,100.0,true,你好"));
        assert!(content.contains("tone_002"));
        assert!(content.contains("wrong_tone,major,66.7,false"));
    }

    #[test]
    fn timestamped_filename_has_expected_shape() {
        let name = timestamped_filename("eval_results", ".csv");
        assert!(name.starts_with("eval_results_"));
        assert!(name.ends_with(".csv"));
        // eval_results_ + YYYYmmdd_HHMMSS + .csv
        assert_eq!(name.len(), "eval_results_".len() + 15 + 4);
    }
}
