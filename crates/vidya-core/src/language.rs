use serde::{Deserialize, Serialize};

/// Languages the tutor can answer in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    Hindi,
    Marathi,
}

impl Language {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::English => "english",
            Self::Hindi => "hindi",
            Self::Marathi => "marathi",
        }
    }

    #[must_use]
    pub fn display_name(self) -> &'static str {
        match self {
            Self::English => "English",
            Self::Hindi => "Hindi",
            Self::Marathi => "Marathi",
        }
    }

    /// Whether replies in this language are expected in Devanagari script.
    #[must_use]
    pub fn expects_devanagari(self) -> bool {
        matches!(self, Self::Hindi | Self::Marathi)
    }
}

/// Count characters in the Devanagari block (U+0900–U+097F).
#[must_use]
pub fn devanagari_count(text: &str) -> usize {
    text.chars()
        .filter(|c| ('\u{0900}'..='\u{097F}').contains(c))
        .count()
}

/// Count ASCII Latin letters.
#[must_use]
pub fn latin_count(text: &str) -> usize {
    text.chars().filter(char::is_ascii_alphabetic).count()
}

/// Pluggable check that generated text is in the expected writing system.
///
/// The retry control flow in [`crate::chat::ChatEngine`] only depends on
/// this one method, so a real language-ID backend can be substituted
/// without touching it.
pub trait ScriptValidator: Send + Sync {
    fn is_acceptable(&self, text: &str, language: Language) -> bool;
}

/// English phrases a model emits when it refuses to answer in the
/// requested language.
const REFUSAL_PHRASES: &[&str] = &[
    "only in english",
    "english only",
    "can only",
    "cannot provide",
    "unable to fulfill",
];

/// Substring-based validator: refusal phrases plus Devanagari/Latin
/// character counting. Best effort, not calibrated.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeuristicScriptValidator;

impl ScriptValidator for HeuristicScriptValidator {
    fn is_acceptable(&self, text: &str, language: Language) -> bool {
        if !language.expects_devanagari() {
            return true;
        }

        let lower = text.to_lowercase();
        if REFUSAL_PHRASES.iter().any(|p| lower.contains(p)) {
            return false;
        }

        let devanagari = devanagari_count(text);
        devanagari > 0 && latin_count(text) <= devanagari
    }
}
