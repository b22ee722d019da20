use serde::{Deserialize, Serialize};

use crate::romanize::Romanizer;

use super::compare::{compare, ComparisonResult};
use super::summary::summarize;
use super::syllable::{decompose, Syllable};

/// Points available per syllable: initial, final and tone.
const COMPONENTS_PER_SYLLABLE: usize = 3;

/// Comparison of the syllable pair found at one position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyllableDetail {
    /// 0-based index within the utterance.
    pub position: usize,
    /// Expected syllable as romanized, e.g. `"ma1"`.
    pub expected: String,
    /// Syllable actually heard.
    pub actual: String,
    #[serde(flatten)]
    pub comparison: ComparisonResult,
}

/// Full result of assessing one utterance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssessmentResult {
    /// True when every syllable matched.
    pub overall_match: bool,
    /// Percentage of matching components, 0.0–100.0 with one decimal.
    pub score: f64,
    /// Space-separated expected syllables, e.g. `"ni3 hao3"`.
    pub expected_pinyin: String,
    /// Space-separated observed syllables.
    pub actual_pinyin: String,
    /// Per-position comparisons; empty when the syllable counts differ.
    pub syllable_details: Vec<SyllableDetail>,
    /// One-line feedback for the whole utterance.
    pub summary: String,
}

/// Assess `actual_text` against `expected_text` using pinyin romanization.
///
/// Both texts must already be normalized (see [`crate::normalize`]).
///
/// ```
/// use mandarin_assess::scoring::assess;
///
/// let result = assess("妈", "骂");
/// assert_eq!(result.score, 66.7);
/// assert!(!result.overall_match);
/// ```
#[cfg(feature = "pinyin")]
pub fn assess(expected_text: &str, actual_text: &str) -> AssessmentResult {
    assess_with(
        &crate::romanize::PinyinRomanizer,
        expected_text,
        actual_text,
    )
}

/// Assess `actual_text` against `expected_text` with a caller-supplied romanizer.
///
/// Syllables are aligned strictly by position. Differing syllable counts end
/// the assessment with a zero score and no per-syllable details.
pub fn assess_with<R: Romanizer + ?Sized>(
    romanizer: &R,
    expected_text: &str,
    actual_text: &str,
) -> AssessmentResult {
    let expected_pinyin = romanizer.romanize(expected_text);
    let actual_pinyin = romanizer.romanize(actual_text);

    let expected: Vec<Syllable> = expected_pinyin.iter().map(|s| decompose(s)).collect();
    let actual: Vec<Syllable> = actual_pinyin.iter().map(|s| decompose(s)).collect();

    if expected.len() != actual.len() {
        log::debug!(
            "Syllable count mismatch: expected {}, got {}",
            expected.len(),
            actual.len()
        );
        return AssessmentResult {
            overall_match: false,
            score: 0.0,
            expected_pinyin: expected_pinyin.join(" "),
            actual_pinyin: actual_pinyin.join(" "),
            syllable_details: Vec::new(),
            summary: format!(
                "Length mismatch: expected {} syllables, got {}",
                expected.len(),
                actual.len()
            ),
        };
    }

    let syllable_details: Vec<SyllableDetail> = expected
        .iter()
        .zip(&actual)
        .enumerate()
        .map(|(position, (exp, act))| SyllableDetail {
            position,
            expected: exp.full.clone(),
            actual: act.full.clone(),
            comparison: compare(exp, act),
        })
        .collect();

    let comparisons: Vec<ComparisonResult> = syllable_details
        .iter()
        .map(|d| d.comparison.clone())
        .collect();

    let correct: usize = comparisons.iter().map(|c| c.matched_components()).sum();
    let score = component_score(correct, expected.len());
    let overall_match = comparisons.iter().all(|c| c.is_match);

    log::debug!(
        "Assessed {} syllables: {correct} components correct, score {score}",
        expected.len()
    );

    AssessmentResult {
        overall_match,
        score,
        expected_pinyin: expected_pinyin.join(" "),
        actual_pinyin: actual_pinyin.join(" "),
        summary: summarize(&comparisons),
        syllable_details,
    }
}

/// Percentage of correct components, rounded to one decimal place.
///
/// Zero syllables score 0.0.
fn component_score(correct: usize, syllables: usize) -> f64 {
    let total = syllables * COMPONENTS_PER_SYLLABLE;
    if total == 0 {
        return 0.0;
    }
    let raw = correct as f64 / total as f64 * 100.0;
    (raw * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::{assess_with, component_score};
    use crate::romanize::Romanizer;
    use crate::scoring::summary::PERFECT_SUMMARY;

    /// One syllable per character, looked up in a fixed table.
    struct TableRomanizer(HashMap<char, &'static str>);

    impl TableRomanizer {
        fn new() -> Self {
            Self(
                [
                    ('妈', "ma1"),
                    ('骂', "ma4"),
                    ('你', "ni3"),
                    ('李', "li3"),
                    ('好', "hao3"),
                    ('谢', "xie4"),
                    ('吗', "ma"),
                ]
                .into_iter()
                .collect(),
            )
        }
    }

    impl Romanizer for TableRomanizer {
        fn romanize(&self, text: &str) -> Vec<String> {
            text.chars()
                .filter_map(|c| self.0.get(&c).map(|s| s.to_string()))
                .collect()
        }
    }

    #[test]
    fn identical_text_scores_full_marks() {
        let result = assess_with(&TableRomanizer::new(), "你好", "你好");
        assert!(result.overall_match);
        assert_eq!(result.score, 100.0);
        assert_eq!(result.expected_pinyin, "ni3 hao3");
        assert_eq!(result.actual_pinyin, "ni3 hao3");
        assert_eq!(result.summary, PERFECT_SUMMARY);
        assert_eq!(result.syllable_details.len(), 2);
    }

    #[test]
    fn wrong_tone_costs_one_third_of_a_syllable() {
        let result = assess_with(&TableRomanizer::new(), "妈", "骂");
        assert!(!result.overall_match);
        assert_eq!(result.score, 66.7);
        assert!(result.summary.contains("tone error"));
    }

    #[test]
    fn details_are_tagged_with_position_and_syllables() {
        let result = assess_with(&TableRomanizer::new(), "你好", "李好");
        let details = &result.syllable_details;
        assert_eq!(details[0].position, 0);
        assert_eq!(details[0].expected, "ni3");
        assert_eq!(details[0].actual, "li3");
        assert!(!details[0].comparison.initial_match);
        assert_eq!(details[1].position, 1);
        assert!(details[1].comparison.is_match);
        // 5 of 6 components
        assert_eq!(result.score, 83.3);
    }

    #[test]
    fn length_mismatch_scores_zero() {
        let result = assess_with(&TableRomanizer::new(), "你好", "你");
        assert!(!result.overall_match);
        assert_eq!(result.score, 0.0);
        assert!(result.syllable_details.is_empty());
        assert!(result.summary.contains("Length mismatch"));
        assert!(result.summary.contains("expected 2"));
        assert!(result.summary.contains("got 1"));
        assert_eq!(result.expected_pinyin, "ni3 hao3");
        assert_eq!(result.actual_pinyin, "ni3");
    }

    #[test]
    fn empty_inputs_do_not_divide_by_zero() {
        let result = assess_with(&TableRomanizer::new(), "", "");
        assert_eq!(result.score, 0.0);
        assert!(result.overall_match);
        assert!(result.syllable_details.is_empty());
        assert_eq!(result.summary, PERFECT_SUMMARY);
    }

    #[test]
    fn neutral_tone_without_digit_is_compared() {
        let result = assess_with(&TableRomanizer::new(), "吗", "妈");
        assert!(!result.overall_match);
        assert!(!result.syllable_details[0].comparison.tone_match);
        assert!(result.syllable_details[0]
            .comparison
            .feedback
            .contains("neutral tone → first tone (flat)"));
    }

    #[test]
    fn more_mismatches_never_score_higher() {
        let scores: Vec<f64> = (0..=6).rev().map(|c| component_score(c, 2)).collect();
        assert!(scores.windows(2).all(|w| w[0] >= w[1]));
        assert_eq!(component_score(2, 1), 66.7);
        assert_eq!(component_score(1, 1), 33.3);
        assert_eq!(component_score(0, 0), 0.0);
    }

    #[test]
    fn result_serializes_with_flattened_details() {
        let result = assess_with(&TableRomanizer::new(), "妈", "骂");
        let json = serde_json::to_value(&result).unwrap();
        let detail = &json["syllable_details"][0];
        assert_eq!(detail["position"], 0);
        assert_eq!(detail["expected"], "ma1");
        assert_eq!(detail["match"], false);
        assert_eq!(detail["tone_match"], false);
    }

    #[cfg(feature = "pinyin")]
    mod with_pinyin {
        use crate::scoring::assess;

        #[test]
        fn perfect_greeting() {
            let result = assess("你好", "你好");
            assert!(result.overall_match);
            assert_eq!(result.score, 100.0);
            assert_eq!(result.expected_pinyin, "ni3 hao3");
        }

        #[test]
        fn tone_slip_between_ma1_and_ma4() {
            let result = assess("妈", "骂");
            assert_eq!(result.expected_pinyin, "ma1");
            assert_eq!(result.actual_pinyin, "ma4");
            assert_eq!(result.score, 66.7);
            assert!(!result.overall_match);
            assert!(result.summary.contains("tone error"));
        }

        #[test]
        fn different_word_scores_below_full() {
            let result = assess("你好", "谢谢");
            assert!(!result.overall_match);
            assert!(result.score < 100.0);
        }

        #[test]
        fn length_mismatch() {
            let result = assess("你好", "你");
            assert_eq!(result.score, 0.0);
            assert!(result.summary.contains("expected 2 syllables"));
            assert!(result.summary.contains("got 1"));
        }
    }
}
