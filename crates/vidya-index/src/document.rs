use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

/// Filename pattern carrying lesson metadata: `Std 8 Math Lesson No.34.docx`.
static FILENAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)Std\s+(\w+)\s+(\w+)\s+Lesson\s+No\.?(\d+)")
        .expect("filename pattern must compile")
});

/// Tokens too common to carry lesson-specific signal.
const STOP_WORDS: &[&str] = &[
    "the", "a", "an", "and", "or", "but", "in", "on", "at", "to", "for", "of", "with", "by", "is",
    "are", "was", "were", "be", "been", "have", "has", "had", "do", "does", "did", "will", "would",
    "could", "should", "may", "might", "can", "must",
];

const MAX_KEYWORDS: usize = 20;

/// A single parsed curriculum file. Built once at load, immutable afterwards.
#[derive(Debug, Clone, Serialize)]
pub struct LessonDocument {
    /// Source filename, used as the document identity.
    pub id: String,
    pub subject: String,
    pub standard: String,
    pub lesson_number: String,
    pub title: String,
    pub content: String,
    pub keywords: Vec<String>,
}

impl LessonDocument {
    /// Build a document from its source filename and extracted text.
    ///
    /// Metadata comes from the filename pattern; on mismatch all three
    /// fields fall back to `"Unknown"`. Title is always the filename with
    /// its extension stripped.
    #[must_use]
    pub fn new(filename: &str, content: String) -> Self {
        let (standard, subject, lesson_number) = parse_filename(filename);
        let keywords = extract_keywords(&content);
        Self {
            id: filename.to_owned(),
            subject,
            standard,
            lesson_number,
            title: strip_extension(filename),
            content,
            keywords,
        }
    }
}

fn parse_filename(filename: &str) -> (String, String, String) {
    FILENAME_PATTERN.captures(filename).map_or_else(
        || ("Unknown".into(), "Unknown".into(), "Unknown".into()),
        |caps| (caps[1].to_owned(), caps[2].to_owned(), caps[3].to_owned()),
    )
}

fn strip_extension(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map_or(filename, |(stem, _)| stem)
        .to_owned()
}

/// First 20 whitespace tokens longer than 3 characters that are not stop
/// words, lowercased, in encounter order. No dedup, no frequency ranking.
pub(crate) fn extract_keywords(content: &str) -> Vec<String> {
    content
        .split_whitespace()
        .map(str::to_lowercase)
        .filter(|word| word.chars().count() > 3 && !STOP_WORDS.contains(&word.as_str()))
        .take(MAX_KEYWORDS)
        .collect()
}
