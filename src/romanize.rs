//! Conversion from Chinese script to tone-numbered pinyin syllables.
//!
//! Scoring only needs an ordered list of syllables such as `["ni3", "hao3"]`,
//! so any source of romanization can be plugged in through [`Romanizer`].
//! With the `pinyin` feature (enabled by default) [`PinyinRomanizer`] uses the
//! `pinyin` crate's dictionary.

/// Turns canonical Chinese text into romanized syllables with a trailing
/// tone digit.
pub trait Romanizer {
    /// Romanize `text`, one syllable per character.
    ///
    /// Heteronyms are not expanded: each character yields its single most
    /// common reading.
    fn romanize(&self, text: &str) -> Vec<String>;
}

/// Dictionary-backed pinyin romanizer.
///
/// Characters without a pinyin reading are grouped into runs and passed through
/// verbatim as a single token; whitespace ends a run and is dropped.
#[cfg(feature = "pinyin")]
#[derive(Debug, Clone, Copy, Default)]
pub struct PinyinRomanizer;

#[cfg(feature = "pinyin")]
impl PinyinRomanizer {
    /// Romanize for display, with tone marks instead of digits (`"nǐ hǎo"`).
    pub fn romanize_display(&self, text: &str) -> String {
        let mut out = Vec::new();
        self.walk(text, |reading| reading.with_tone(), &mut out);
        out.join(" ")
    }

    fn walk(
        &self,
        text: &str,
        render: impl Fn(pinyin::Pinyin) -> &'static str,
        out: &mut Vec<String>,
    ) {
        use pinyin::ToPinyin;

        let mut run = String::new();
        for ch in text.chars() {
            match ch.to_pinyin() {
                Some(reading) => {
                    flush_run(&mut run, out);
                    out.push(render(reading).to_string());
                }
                None if ch.is_whitespace() => flush_run(&mut run, out),
                None => run.push(ch),
            }
        }
        flush_run(&mut run, out);
    }
}

#[cfg(feature = "pinyin")]
impl Romanizer for PinyinRomanizer {
    fn romanize(&self, text: &str) -> Vec<String> {
        let mut out = Vec::new();
        self.walk(text, |reading| reading.with_tone_num_end(), &mut out);
        out
    }
}

#[cfg(feature = "pinyin")]
fn flush_run(run: &mut String, out: &mut Vec<String>) {
    if !run.is_empty() {
        out.push(std::mem::take(run));
    }
}

/// Romanize `text` with the default pinyin dictionary.
#[cfg(feature = "pinyin")]
pub fn to_pinyin(text: &str) -> Vec<String> {
    PinyinRomanizer.romanize(text)
}
