//! Language-specific instruction building with optional lesson context.

use vidya_index::DocumentStore;

use crate::language::Language;
use crate::text::truncate_chars;

/// Creative-writing request markers, matched as whole tokens.
const CREATIVE_TRIGGERS: &[&str] = &["poem", "story", "कविता", "कहानी", "गोष्ट"];

/// Curriculum-related markers, matched as substrings.
const LESSON_TRIGGERS: &[&str] = &[
    "lesson", "chapter", "syllabus", "math", "english", "marathi", "subject", "topic", "unit",
];

/// The widget serves Std 8 students; lesson retrieval is pinned to that
/// standard.
const LESSON_STANDARD: &str = "8";

/// Characters of document content included per context block.
const CONTEXT_EXCERPT_CHARS: usize = 800;

const ENGLISH_BASE: &str = "You are a friendly tutor for school students. Always respond only in \
     English. Explain clearly and politely. Do not use asterisks or any emphasis characters; \
     reply in plain text only.";

const HINDI_BASE: &str = "You are a friendly tutor for school students. Always respond only in \
     Hindi, written in Devanagari script. Explain clearly and politely. Do not use asterisks or \
     any emphasis characters; reply in plain text only.";

const MARATHI_BASE: &str = "You are a friendly tutor for school students. Always respond only in \
     Marathi, written in Devanagari script. Explain clearly and politely. Do not use asterisks \
     or any emphasis characters; reply in plain text only.";

const CREATIVE_CLAUSE: &str = "If the student asks for a poem, story, or other creative \
     writing, you may compose it for them.";

/// System instruction plus the directive-prefixed user message.
#[derive(Debug, Clone)]
pub struct ComposedPrompt {
    pub system: String,
    pub user: String,
}

#[must_use]
pub fn base_instruction(language: Language) -> &'static str {
    match language {
        Language::English => ENGLISH_BASE,
        Language::Hindi => HINDI_BASE,
        Language::Marathi => MARATHI_BASE,
    }
}

/// Short per-message language directive, redundant with the system
/// instruction on purpose.
#[must_use]
pub fn directive(language: Language) -> &'static str {
    match language {
        Language::English => "Answer strictly in English, plain text only.",
        Language::Hindi => "Answer strictly in Hindi (Devanagari script), plain text only.",
        Language::Marathi => "Answer strictly in Marathi (Devanagari script), plain text only.",
    }
}

/// Build the full prompt for one chat turn.
///
/// Appends a creative-writing permission clause when the message asks for
/// one, and a lesson context block when the message mentions curriculum
/// terms and the store has relevant Std 8 content.
#[must_use]
pub fn compose(message: &str, language: Language, store: &DocumentStore) -> ComposedPrompt {
    let mut system = base_instruction(language).to_owned();

    if has_creative_trigger(message) {
        system.push(' ');
        system.push_str(CREATIVE_CLAUSE);
    }

    if has_lesson_trigger(message) {
        let matches = store.search(message, None, Some(LESSON_STANDARD));
        if !matches.is_empty() {
            system.push_str("\n\nLesson material from the Std 8 syllabus:");
            for doc in matches {
                system.push_str(&format!(
                    "\n[{} — Lesson {}]\n{}",
                    doc.subject,
                    doc.lesson_number,
                    truncate_chars(&doc.content, CONTEXT_EXCERPT_CHARS)
                ));
            }
            system.push_str(
                "\nAnswer directly from the lesson material above. Do not ask the student \
                 for clarification.",
            );
        }
    }

    ComposedPrompt {
        system,
        user: format!("{} {message}", directive(language)),
    }
}

fn has_creative_trigger(message: &str) -> bool {
    message.to_lowercase().split_whitespace().any(|word| {
        let word = word.trim_matches(|c: char| c.is_ascii_punctuation() || c == '।');
        CREATIVE_TRIGGERS.contains(&word)
    })
}

fn has_lesson_trigger(message: &str) -> bool {
    let lower = message.to_lowercase();
    LESSON_TRIGGERS.iter().any(|t| lower.contains(t))
}

#[cfg(test)]
mod tests {
    use vidya_index::LessonDocument;

    use super::*;

    fn store_with_area_lesson() -> DocumentStore {
        DocumentStore::from_documents(vec![LessonDocument::new(
            "Std 8 Math Lesson No.12.docx",
            "area of triangle is half base times height".into(),
        )])
    }

    #[test]
    fn plain_message_gets_base_instruction_only() {
        let store = DocumentStore::default();
        let prompt = compose("what is gravity?", Language::English, &store);
        assert_eq!(prompt.system, ENGLISH_BASE);
        assert_eq!(
            prompt.user,
            "Answer strictly in English, plain text only. what is gravity?"
        );
    }

    #[test]
    fn creative_trigger_appends_clause() {
        let store = DocumentStore::default();
        let prompt = compose("Write me a poem!", Language::English, &store);
        assert!(prompt.system.contains("creative"));
    }

    #[test]
    fn creative_trigger_matches_hindi_token() {
        let store = DocumentStore::default();
        let prompt = compose("एक कहानी सुनाओ", Language::Hindi, &store);
        assert!(prompt.system.contains("creative"));
    }

    #[test]
    fn history_does_not_match_story_token() {
        let store = DocumentStore::default();
        let prompt = compose("tell me about history", Language::English, &store);
        assert!(!prompt.system.contains("creative"));
    }

    #[test]
    fn lesson_trigger_appends_context_block() {
        let store = store_with_area_lesson();
        let prompt = compose("explain the math lesson about area", Language::English, &store);
        assert!(prompt.system.contains("Lesson material"));
        assert!(prompt.system.contains("[Math — Lesson 12]"));
        assert!(prompt.system.contains("area of triangle"));
        assert!(prompt.system.contains("Do not ask the student"));
    }

    #[test]
    fn lesson_trigger_without_matches_leaves_base() {
        let store = DocumentStore::default();
        let prompt = compose("explain the math lesson", Language::English, &store);
        assert!(!prompt.system.contains("Lesson material"));
    }

    #[test]
    fn context_excerpt_capped_at_800_chars() {
        let long = "word ".repeat(500);
        let store = DocumentStore::from_documents(vec![LessonDocument::new(
            "Std 8 Math Lesson No.1.docx",
            long,
        )]);
        let prompt = compose("math word", Language::English, &store);
        let block_start = prompt.system.find("[Math — Lesson 1]").unwrap();
        let block = &prompt.system[block_start..];
        // excerpt + surrounding instruction stays well under the raw length
        assert!(block.chars().count() < 1000);
    }

    #[test]
    fn hindi_user_message_gets_devanagari_directive() {
        let store = DocumentStore::default();
        let prompt = compose("2+2 क्या है?", Language::Hindi, &store);
        assert!(prompt.user.starts_with("Answer strictly in Hindi"));
        assert!(prompt.user.ends_with("2+2 क्या है?"));
        assert!(prompt.system.contains("Devanagari"));
    }
}
