//! Phonetic comparison and scoring.
//!
//! Mandarin syllables are compared component by component rather than as
//! whole strings, so a learner who only misses the tone still gets credit
//! for the initial and final.
//!
//! # Pipeline
//!
//! ```text
//! text ──romanize──▶ ["ni3", "hao3"] ──decompose──▶ Syllable ──compare──▶ ComparisonResult
//!                                                                         │
//!                                                   AssessmentResult ◀──summarize/score
//! ```
//!
//! # Scoring
//!
//! Each syllable is worth three points: initial, final and tone. The score is
//! the percentage of matching components across the utterance, rounded to one
//! decimal place. A single wrong tone on a one-syllable word scores `66.7`.
//!
//! Syllables are aligned strictly by position. When the expected and observed
//! texts romanize to a different number of syllables, the assessment stops
//! with a zero score and a `Length mismatch` summary.
//!
//! # Examples
//!
//! ```rust
//! use mandarin_assess::scoring::{compare, decompose};
//!
//! let result = compare(&decompose("ma1"), &decompose("ma4"));
//! assert!(result.initial_match && result.final_match);
//! assert!(!result.tone_match);
//! ```

pub mod assess;
pub mod compare;
pub mod summary;
pub mod syllable;

#[cfg(feature = "pinyin")]
pub use assess::assess;
pub use assess::{assess_with, AssessmentResult, SyllableDetail};
pub use compare::{compare, ComparisonResult};
pub use summary::summarize;
pub use syllable::{decompose, tone_name, Syllable, INITIALS, INITIALS_SORTED};
