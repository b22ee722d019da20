use super::compare::ComparisonResult;

/// Summary returned when every syllable matched.
pub const PERFECT_SUMMARY: &str = "✓ Perfect pronunciation!";

/// Per-category mismatch counts across an utterance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ErrorTally {
    pub tone: usize,
    pub initial: usize,
    pub final_: usize,
}

impl ErrorTally {
    pub fn from_comparisons(comparisons: &[ComparisonResult]) -> Self {
        comparisons.iter().fold(Self::default(), |mut tally, c| {
            tally.tone += usize::from(!c.tone_match);
            tally.initial += usize::from(!c.initial_match);
            tally.final_ += usize::from(!c.final_match);
            tally
        })
    }
}

/// Condense a sequence of syllable comparisons into one line of feedback.
///
/// Categories are reported in the fixed order tone, initial, final, and
/// categories without errors are left out.
pub fn summarize(comparisons: &[ComparisonResult]) -> String {
    if comparisons.iter().all(|c| c.is_match) {
        return PERFECT_SUMMARY.to_string();
    }

    let tally = ErrorTally::from_comparisons(comparisons);
    let mut parts = Vec::with_capacity(3);
    if tally.tone > 0 {
        parts.push(format!("{} tone error(s)", tally.tone));
    }
    if tally.initial > 0 {
        parts.push(format!("{} initial consonant error(s)", tally.initial));
    }
    if tally.final_ > 0 {
        parts.push(format!("{} vowel/final error(s)", tally.final_));
    }

    format!("Issues: {}", parts.join(", "))
}
