use serde::{Deserialize, Serialize};

use super::syllable::{tone_name, Syllable};

/// Feedback attached to a syllable that matched its reference.
pub const CORRECT_FEEDBACK: &str = "✓ Correct";

/// Outcome of comparing one expected syllable against what was heard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonResult {
    #[serde(rename = "match")]
    pub is_match: bool,
    pub initial_match: bool,
    pub final_match: bool,
    pub tone_match: bool,
    /// Mismatching components as `expected → actual` clauses.
    pub feedback: String,
}

impl ComparisonResult {
    fn perfect() -> Self {
        Self {
            is_match: true,
            initial_match: true,
            final_match: true,
            tone_match: true,
            feedback: CORRECT_FEEDBACK.to_string(),
        }
    }

    /// Number of components (out of three) that matched.
    pub fn matched_components(&self) -> usize {
        [self.initial_match, self.final_match, self.tone_match]
            .iter()
            .filter(|&&m| m)
            .count()
    }
}

/// Compare an expected syllable with the one actually produced.
///
/// Identical `full` strings are a match without looking at the components.
pub fn compare(expected: &Syllable, actual: &Syllable) -> ComparisonResult {
    if expected.full == actual.full {
        return ComparisonResult::perfect();
    }

    let initial_match = expected.initial == actual.initial;
    let final_match = expected.final_ == actual.final_;
    let tone_match = expected.tone == actual.tone;

    let mut errors = Vec::new();
    if !initial_match {
        errors.push(format!(
            "initial: '{}' → '{}'",
            expected.initial, actual.initial
        ));
    }
    if !final_match {
        errors.push(format!("final: '{}' → '{}'", expected.final_, actual.final_));
    }
    if !tone_match {
        errors.push(format!(
            "tone: {} → {}",
            tone_name(&expected.tone),
            tone_name(&actual.tone)
        ));
    }

    let is_match = initial_match && final_match && tone_match;
    let feedback = if errors.is_empty() {
        CORRECT_FEEDBACK.to_string()
    } else {
        format!("✗ {}", errors.join(", "))
    };

    ComparisonResult {
        is_match,
        initial_match,
        final_match,
        tone_match,
        feedback,
    }
}
