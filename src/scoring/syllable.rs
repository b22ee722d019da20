use serde::{Deserialize, Serialize};

/// Tone assigned when a syllable carries no trailing tone digit.
pub const NEUTRAL_TONE: &str = "5";

/// Mandarin initial consonants in declaration order.
pub const INITIALS: [&str; 23] = [
    "b", "p", "m", "f", // labials
    "d", "t", "n", "l", // alveolars
    "g", "k", "h", // velars
    "j", "q", "x", // palatals
    "zh", "ch", "sh", "r", // retroflexes
    "z", "c", "s", // dentals
    "y", "w", // semivowels
];

/// [`INITIALS`] ordered longest first, ties kept in declaration order.
///
/// Prefix matching walks this table in order, so `zh` is tried before `z`.
pub const INITIALS_SORTED: [&str; 23] = [
    "zh", "ch", "sh", // two-letter clusters
    "b", "p", "m", "f", "d", "t", "n", "l", "g", "k", "h", "j", "q", "x", "r", "z", "c", "s",
    "y", "w",
];

/// A romanized syllable split into its phonetic components.
///
/// Mandarin syllables have the shape `(initial) + final + tone`. For a syllable
/// that carried a tone digit, `full == initial + final_ + tone`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Syllable {
    /// The syllable exactly as it was given, e.g. `"ni3"`.
    pub full: String,
    /// Leading consonant cluster, empty for vowel-initial syllables like `"ai4"`.
    pub initial: String,
    /// Vowel nucleus plus optional nasal coda.
    #[serde(rename = "final")]
    pub final_: String,
    /// Tone digit `"1"`..`"5"`; `"5"` when the input had none.
    pub tone: String,
}

/// Human-readable name for a tone digit.
///
/// Unknown digits are returned unchanged.
pub fn tone_name(tone: &str) -> &str {
    match tone {
        "1" => "first tone (flat)",
        "2" => "second tone (rising)",
        "3" => "third tone (fall-rise)",
        "4" => "fourth tone (falling)",
        "5" => "neutral tone",
        other => other,
    }
}

/// Split a tone-numbered pinyin syllable into initial, final and tone.
///
/// ```
/// use mandarin_assess::scoring::decompose;
///
/// let syl = decompose("zhi1");
/// assert_eq!(syl.initial, "zh");
/// assert_eq!(syl.final_, "i");
/// assert_eq!(syl.tone, "1");
/// ```
pub fn decompose(syllable: &str) -> Syllable {
    let (base, tone) = match syllable.chars().next_back() {
        Some(last) if last.is_ascii_digit() => {
            (&syllable[..syllable.len() - 1], last.to_string())
        }
        _ => (syllable, NEUTRAL_TONE.to_string()),
    };

    let (initial, final_) = INITIALS_SORTED
        .iter()
        .find_map(|init| base.strip_prefix(init).map(|rest| (*init, rest)))
        .unwrap_or(("", base));

    Syllable {
        full: syllable.to_string(),
        initial: initial.to_string(),
        final_: final_.to_string(),
        tone,
    }
}
