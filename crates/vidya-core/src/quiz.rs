//! Structured quiz generation with a one-shot JSON repair fallback.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use vidya_llm::LlmError;
use vidya_llm::provider::{LlmProvider, Message};

use crate::language::Language;
use crate::text::truncate_chars;

pub const MIN_QUESTIONS: usize = 1;
pub const MAX_QUESTIONS: usize = 10;
pub const DEFAULT_QUESTIONS: usize = 5;

const MAX_QUESTION_CHARS: usize = 300;
const MAX_OPTION_CHARS: usize = 120;
const MAX_EXPLANATION_CHARS: usize = 400;
const MAX_OPTIONS: usize = 4;

const SCHEMA: &str = r#"{"questions":[{"q":"...","options":["...","...","...","..."],"answerIndex":0,"explanation":"..."}]}"#;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    #[must_use]
    pub fn phrase(self) -> &'static str {
        match self {
            Self::Easy => "simple, confidence-building",
            Self::Medium => "moderately challenging",
            Self::Hard => "challenging, concept-stretching",
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct QuizSpec {
    pub topic: Option<String>,
    pub difficulty: Difficulty,
    pub language: Language,
    pub num_questions: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Question {
    #[serde(rename = "q")]
    pub text: String,
    pub options: Vec<String>,
    #[serde(rename = "answerIndex")]
    pub answer_index: u8,
    pub explanation: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Quiz {
    pub questions: Vec<Question>,
}

#[derive(Debug, thiserror::Error)]
pub enum QuizError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("model output is not a valid quiz")]
    MalformedOutput,
}

/// Generates quizzes through one generation call plus at most one
/// corrective reformat call when the output fails to parse.
pub struct QuizGenerator<P: LlmProvider> {
    provider: Arc<P>,
}

impl<P: LlmProvider> QuizGenerator<P> {
    #[must_use]
    pub fn new(provider: Arc<P>) -> Self {
        Self { provider }
    }

    /// Generate a sanitized quiz for the given spec.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider fails, or if the output has no
    /// `questions` array after the corrective call.
    pub async fn generate(&self, spec: &QuizSpec) -> Result<Quiz, QuizError> {
        let count = resolve_count(spec.num_questions);
        let system = instruction(spec.language, count, spec.difficulty);
        let topic = spec
            .topic
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map_or_else(|| default_topic(spec.language).to_owned(), str::to_owned);

        let raw = self
            .provider
            .chat(&[Message::system(system), Message::user(topic)])
            .await?;

        let value = match parse(&raw) {
            Ok(value) => value,
            Err(_) => self.repair_then_parse(&raw).await?,
        };

        let questions = value
            .get("questions")
            .and_then(Value::as_array)
            .ok_or(QuizError::MalformedOutput)?;

        Ok(Quiz {
            questions: questions.iter().take(count).map(sanitize_question).collect(),
        })
    }

    /// One-shot fallback: ask the model to reformat its own output into
    /// strict JSON, then parse that.
    async fn repair_then_parse(&self, raw: &str) -> Result<Value, QuizError> {
        let fixed = self
            .provider
            .chat(&[Message::user(format!(
                "Reformat the following text into strict JSON exactly matching the shape \
                 {SCHEMA}. Output JSON only, with no preamble, prose, or markdown fences:\n\n{raw}"
            ))])
            .await?;
        parse(&fixed).map_err(|_| QuizError::MalformedOutput)
    }
}

fn resolve_count(requested: Option<u32>) -> usize {
    requested.map_or(DEFAULT_QUESTIONS, |n| {
        usize::try_from(n)
            .unwrap_or(MAX_QUESTIONS)
            .clamp(MIN_QUESTIONS, MAX_QUESTIONS)
    })
}

fn parse(raw: &str) -> Result<Value, serde_json::Error> {
    serde_json::from_str(strip_code_fences(raw))
}

/// Drop a ```json fence wrapper, including any prose outside the fence.
/// Unfenced input is returned trimmed.
fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(start) = trimmed.find("```") else {
        return trimmed;
    };
    let after = &trimmed[start + 3..];
    let body_start = after.find('\n').map_or(0, |i| i + 1);
    let body = &after[body_start..];
    let body_end = body.find("```").unwrap_or(body.len());
    body[..body_end].trim()
}

fn sanitize_question(value: &Value) -> Question {
    let text = truncate_chars(
        value.get("q").and_then(Value::as_str).unwrap_or(""),
        MAX_QUESTION_CHARS,
    )
    .to_owned();

    let options = value
        .get("options")
        .and_then(Value::as_array)
        .map(|opts| {
            opts.iter()
                .take(MAX_OPTIONS)
                .map(|o| truncate_chars(o.as_str().unwrap_or(""), MAX_OPTION_CHARS).to_owned())
                .collect()
        })
        .unwrap_or_default();

    let answer_index = value
        .get("answerIndex")
        .and_then(Value::as_u64)
        .map_or(0, |i| u8::try_from(i.min(3)).unwrap_or(0));

    let explanation = truncate_chars(
        value.get("explanation").and_then(Value::as_str).unwrap_or(""),
        MAX_EXPLANATION_CHARS,
    )
    .to_owned();

    Question {
        text,
        options,
        answer_index,
        explanation,
    }
}

fn instruction(language: Language, count: usize, difficulty: Difficulty) -> String {
    match language {
        Language::English => format!(
            "You are a quiz generator for school students. Create exactly {count} {} \
             multiple-choice questions in English. Respond with strict JSON only, no prose or \
             markdown fences, exactly in the shape {SCHEMA}. Each question must have exactly 4 \
             options.",
            difficulty.phrase()
        ),
        Language::Hindi => format!(
            "You are a quiz generator for school students. Create exactly {count} {} \
             multiple-choice questions in Hindi, written in Devanagari script. Respond with \
             strict JSON only, no prose or markdown fences, exactly in the shape {SCHEMA}. Each \
             question must have exactly 4 options.",
            difficulty.phrase()
        ),
        Language::Marathi => format!(
            "You are a quiz generator for school students. Create exactly {count} {} \
             multiple-choice questions in Marathi, written in Devanagari script. Respond with \
             strict JSON only, no prose or markdown fences, exactly in the shape {SCHEMA}. Each \
             question must have exactly 4 options.",
            difficulty.phrase()
        ),
    }
}

fn default_topic(language: Language) -> &'static str {
    match language {
        Language::English => "General knowledge for school students",
        Language::Hindi => "विद्यालय के छात्रों के लिए सामान्य ज्ञान",
        Language::Marathi => "शालेय विद्यार्थ्यांसाठी सामान्य ज्ञान",
    }
}
