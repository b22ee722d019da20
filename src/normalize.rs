//! Text clean-up applied before romanization.
//!
//! Transcription services return text with punctuation, spacing and sometimes
//! traditional characters. Scoring compares syllables position by position,
//! so every one of those must be removed or canonicalized first.
//!
//! With the `zhconv` feature (enabled by default) [`ZhConverter`] folds
//! traditional characters into simplified ones. Some traditional characters
//! carry a different default pinyin reading than their simplified form
//! (`髮` vs `发`), so skipping this step turns correct speech into tone errors.

use std::borrow::Cow;

use serde::{Deserialize, Serialize};

/// Maps script variants (e.g. traditional characters) to one canonical script.
pub trait ScriptConverter {
    fn to_canonical<'a>(&self, text: &'a str) -> Cow<'a, str>;
}

/// Converter that leaves text unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PassThrough;

impl ScriptConverter for PassThrough {
    fn to_canonical<'a>(&self, text: &'a str) -> Cow<'a, str> {
        Cow::Borrowed(text)
    }
}

/// Script that transcripts are converted to before scoring.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum ScriptTarget {
    /// Simplified characters, the script the pinyin dictionary is keyed on.
    #[default]
    Simplified,
    Traditional,
    /// Leave the text as transcribed.
    Unchanged,
}

impl ScriptTarget {
    /// Converter producing this script.
    ///
    /// Without the `zhconv` feature only [`ScriptTarget::Unchanged`] can be
    /// honoured; the other targets fall back to [`PassThrough`] with a warning.
    pub fn converter(self) -> Box<dyn ScriptConverter> {
        match self {
            ScriptTarget::Unchanged => Box::new(PassThrough),
            #[cfg(feature = "zhconv")]
            target => Box::new(ZhConverter::new(target)),
            #[cfg(not(feature = "zhconv"))]
            target => {
                log::warn!(
                    "Script conversion to {target:?} needs the `zhconv` feature; leaving text unchanged"
                );
                Box::new(PassThrough)
            }
        }
    }
}

/// Converter backed by the `zhconv` conversion tables.
#[cfg(feature = "zhconv")]
#[derive(Debug, Clone, Copy)]
pub struct ZhConverter {
    target: ScriptTarget,
}

#[cfg(feature = "zhconv")]
impl ZhConverter {
    pub fn new(target: ScriptTarget) -> Self {
        Self { target }
    }

    /// Traditional to simplified.
    pub fn simplified() -> Self {
        Self::new(ScriptTarget::Simplified)
    }
}

#[cfg(feature = "zhconv")]
impl ScriptConverter for ZhConverter {
    fn to_canonical<'a>(&self, text: &'a str) -> Cow<'a, str> {
        let variant = match self.target {
            ScriptTarget::Simplified => zhconv::Variant::ZhHans,
            ScriptTarget::Traditional => zhconv::Variant::ZhHant,
            ScriptTarget::Unchanged => return Cow::Borrowed(text),
        };
        let converted = zhconv::zhconv(text, variant);
        if converted == text {
            Cow::Borrowed(text)
        } else {
            Cow::Owned(converted)
        }
    }
}

/// Remove everything that is not a letter, ideograph or digit.
///
/// Handles ASCII and full-width CJK punctuation alike.
pub fn strip_non_speech(text: &str) -> String {
    text.chars().filter(|c| c.is_alphanumeric()).collect()
}

/// Canonicalize the script of `text`, then strip punctuation and whitespace.
pub fn normalize<C: ScriptConverter + ?Sized>(text: &str, converter: &C) -> String {
    strip_non_speech(&converter.to_canonical(text))
}

fn is_cjk_ideograph(ch: char) -> bool {
    ('\u{4e00}'..='\u{9fff}').contains(&ch)
}

/// True when a transcription came back in Latin letters instead of Chinese.
///
/// Speech recognizers fall back to romanization when they cannot match the
/// audio to Chinese with confidence. Blank text is not romanization.
pub fn is_romanization(text: &str) -> bool {
    if text.chars().any(is_cjk_ideograph) {
        return false;
    }
    !text.trim().is_empty()
}

#[cfg(test)]
mod tests {
    use std::borrow::Cow;

    use super::{
        is_romanization, normalize, strip_non_speech, PassThrough, ScriptConverter, ScriptTarget,
    };

    struct SwapWo;

    impl ScriptConverter for SwapWo {
        fn to_canonical<'a>(&self, text: &'a str) -> Cow<'a, str> {
            Cow::Owned(text.replace('妳', "你"))
        }
    }

    #[test]
    fn strips_ascii_and_cjk_punctuation() {
        assert_eq!(strip_non_speech("你好，世界！"), "你好世界");
        assert_eq!(strip_non_speech("你好. 谢谢?"), "你好谢谢");
        assert_eq!(strip_non_speech("「你好」 …"), "你好");
    }

    #[test]
    fn keeps_latin_letters_and_digits() {
        assert_eq!(strip_non_speech("ni hao 3"), "nihao3");
    }

    #[test]
    fn normalize_converts_before_stripping() {
        assert_eq!(normalize("妳好！", &SwapWo), "你好");
        assert_eq!(normalize(" 你好 ", &PassThrough), "你好");
    }

    #[test]
    fn chinese_text_is_not_romanization() {
        assert!(!is_romanization("你好"));
        assert!(!is_romanization("ni 好"));
    }

    #[test]
    fn latin_text_is_romanization() {
        assert!(is_romanization("Ni Hao"));
        assert!(is_romanization("ni hao"));
    }

    #[test]
    fn blank_text_is_not_romanization() {
        assert!(!is_romanization(""));
        assert!(!is_romanization("   "));
    }

    #[test]
    fn unchanged_target_keeps_traditional_text() {
        let converter = ScriptTarget::Unchanged.converter();
        assert_eq!(normalize("頭髮", converter.as_ref()), "頭髮");
    }

    #[test]
    fn script_target_parses_from_lowercase_names() {
        let target: ScriptTarget = serde_json::from_str("\"traditional\"").unwrap();
        assert_eq!(target, ScriptTarget::Traditional);
        assert_eq!(ScriptTarget::default(), ScriptTarget::Simplified);
    }

    #[cfg(feature = "zhconv")]
    mod with_zhconv {
        use super::super::{normalize, ScriptConverter, ScriptTarget, ZhConverter};

        #[test]
        fn folds_traditional_into_simplified() {
            let converter = ZhConverter::simplified();
            assert_eq!(converter.to_canonical("頭髮"), "头发");
            assert_eq!(normalize("你們好！", &converter), "你们好");
        }

        #[test]
        fn simplified_text_is_borrowed_untouched() {
            let converted = ZhConverter::simplified().to_canonical("你好");
            assert!(matches!(converted, std::borrow::Cow::Borrowed("你好")));
        }

        #[test]
        fn converts_towards_traditional_on_request() {
            let converter = ScriptTarget::Traditional.converter();
            assert_eq!(converter.to_canonical("你们"), "你們");
        }
    }
}
