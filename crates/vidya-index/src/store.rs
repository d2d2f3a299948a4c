use std::collections::HashMap;
use std::path::Path;

use crate::document::LessonDocument;
use crate::loader::extract_docx_text;

/// Maximum documents returned by a relevance search.
const MAX_RESULTS: usize = 3;

/// In-memory lesson corpus, populated once at startup.
///
/// Alongside each document the store keeps a tokenized lowercase form of
/// `subject + standard + lesson_number + content`. The search path scans
/// raw content and keywords instead of this index (see DESIGN.md).
#[derive(Debug, Default)]
pub struct DocumentStore {
    documents: Vec<LessonDocument>,
    token_index: HashMap<String, Vec<String>>,
}

impl DocumentStore {
    /// Load all `.docx` files from `dir`.
    ///
    /// A missing directory yields an empty store. Individual files that
    /// fail to read or parse are logged and skipped; the load always
    /// completes.
    #[must_use]
    pub fn load(dir: &Path) -> Self {
        if !dir.exists() {
            tracing::info!(dir = %dir.display(), "lesson directory not found, skipping load");
            return Self::default();
        }

        let entries = match std::fs::read_dir(dir) {
            Ok(entries) => entries,
            Err(e) => {
                tracing::error!(dir = %dir.display(), "failed to read lesson directory: {e}");
                return Self::default();
            }
        };

        let mut store = Self::default();
        for entry in entries.flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("docx") {
                continue;
            }
            let filename = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("unknown.docx")
                .to_owned();

            match extract_docx_text(&path) {
                Ok(content) => {
                    tracing::debug!(file = %filename, chars = content.len(), "loaded lesson");
                    store.insert(LessonDocument::new(&filename, content));
                }
                Err(e) => {
                    tracing::warn!(file = %filename, "skipping lesson file: {e}");
                }
            }
        }

        tracing::info!(count = store.len(), "lesson documents loaded");
        store
    }

    /// Build a store from pre-parsed documents. Intended for tests and
    /// embedding scenarios where no filesystem corpus exists.
    #[must_use]
    pub fn from_documents(documents: Vec<LessonDocument>) -> Self {
        let mut store = Self::default();
        for doc in documents {
            store.insert(doc);
        }
        store
    }

    fn insert(&mut self, doc: LessonDocument) {
        let searchable = format!(
            "{} {} {} {}",
            doc.subject, doc.standard, doc.lesson_number, doc.content
        );
        let tokens = searchable
            .to_lowercase()
            .split_whitespace()
            .map(str::to_owned)
            .collect();
        self.token_index.insert(doc.id.clone(), tokens);
        self.documents.push(doc);
    }

    /// Score every document against the query and return the top matches.
    ///
    /// Additive scoring: +10 per matching subject/standard filter
    /// (case-insensitive substring), +1 per query token found in the
    /// content, +2 more when a stored keyword contains the token.
    /// Documents scoring 0 are excluded; at most 3 are returned, ties
    /// keeping load order (stable sort).
    #[must_use]
    pub fn search(
        &self,
        query: &str,
        subject: Option<&str>,
        standard: Option<&str>,
    ) -> Vec<&LessonDocument> {
        let query_tokens: Vec<String> = query
            .to_lowercase()
            .split_whitespace()
            .map(str::to_owned)
            .collect();
        let subject = subject.map(str::to_lowercase);
        let standard = standard.map(str::to_lowercase);

        let mut scored: Vec<(&LessonDocument, u32)> = Vec::new();
        for doc in &self.documents {
            let mut score = 0u32;

            if let Some(ref subj) = subject
                && doc.subject.to_lowercase().contains(subj)
            {
                score += 10;
            }
            if let Some(ref std_filter) = standard
                && doc.standard.to_lowercase().contains(std_filter)
            {
                score += 10;
            }

            let content = doc.content.to_lowercase();
            for token in &query_tokens {
                if content.contains(token.as_str()) {
                    score += 1;
                }
                if doc.keywords.iter().any(|kw| kw.contains(token.as_str())) {
                    score += 2;
                }
            }

            if score > 0 {
                scored.push((doc, score));
            }
        }

        scored.sort_by(|a, b| b.1.cmp(&a.1));
        scored.truncate(MAX_RESULTS);
        scored.into_iter().map(|(doc, _)| doc).collect()
    }

    /// All documents whose subject contains `subject`, case-insensitively.
    #[must_use]
    pub fn by_subject(&self, subject: &str) -> Vec<&LessonDocument> {
        let needle = subject.to_lowercase();
        self.documents
            .iter()
            .filter(|doc| doc.subject.to_lowercase().contains(&needle))
            .collect()
    }

    /// All documents whose standard contains `standard`, case-insensitively.
    #[must_use]
    pub fn by_standard(&self, standard: &str) -> Vec<&LessonDocument> {
        let needle = standard.to_lowercase();
        self.documents
            .iter()
            .filter(|doc| doc.standard.to_lowercase().contains(&needle))
            .collect()
    }

    /// Distinct subjects in first-seen order.
    #[must_use]
    pub fn available_subjects(&self) -> Vec<String> {
        dedup_first_seen(self.documents.iter().map(|d| d.subject.clone()))
    }

    /// Distinct standards in first-seen order.
    #[must_use]
    pub fn available_standards(&self) -> Vec<String> {
        dedup_first_seen(self.documents.iter().map(|d| d.standard.clone()))
    }

    #[must_use]
    pub fn documents(&self) -> &[LessonDocument] {
        &self.documents
    }

    /// The per-document tokenized index built at load. Not consulted by
    /// `search`; exposed read-only so the behavior stays pinned.
    #[must_use]
    pub fn token_index(&self) -> &HashMap<String, Vec<String>> {
        &self.token_index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}

fn dedup_first_seen(values: impl Iterator<Item = String>) -> Vec<String> {
    let mut seen = Vec::new();
    for value in values {
        if !seen.contains(&value) {
            seen.push(value);
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::write_fixture_docx;

    fn fixture_store() -> DocumentStore {
        DocumentStore::from_documents(vec![
            LessonDocument::new(
                "Std 8 Math Lesson No.12.docx",
                "area of triangle is half base times height".into(),
            ),
            LessonDocument::new(
                "Std 8 Science Lesson No.3.docx",
                "photosynthesis converts light into chemical energy".into(),
            ),
            LessonDocument::new(
                "Std 9 Math Lesson No.1.docx",
                "linear equations in two variables".into(),
            ),
            LessonDocument::new("misc-notes.docx", "general study tips".into()),
        ])
    }

    #[test]
    fn load_missing_directory_is_empty() {
        let store = DocumentStore::load(Path::new("/nonexistent/lesson_dataset"));
        assert!(store.is_empty());
    }

    #[test]
    fn load_reads_docx_and_skips_others() {
        let dir = tempfile::tempdir().unwrap();
        write_fixture_docx(
            &dir.path().join("Std 8 Math Lesson No.12.docx"),
            "area of triangle is half base times height",
        );
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        std::fs::write(dir.path().join("broken.docx"), "not a zip").unwrap();

        let store = DocumentStore::load(dir.path());
        assert_eq!(store.len(), 1);
        let doc = &store.documents()[0];
        assert_eq!(doc.subject, "Math");
        assert_eq!(doc.standard, "8");
        assert_eq!(doc.lesson_number, "12");
        assert!(doc.content.contains("triangle"));
    }

    #[test]
    fn search_finds_area_lesson_with_standard_filter() {
        let store = fixture_store();
        let results = store.search("What is the area formula?", None, Some("8"));
        assert!(!results.is_empty());
        assert_eq!(results[0].id, "Std 8 Math Lesson No.12.docx");
        assert_eq!(results[0].subject, "Math");
        assert_eq!(results[0].lesson_number, "12");
    }

    #[test]
    fn search_excludes_zero_scores() {
        let store = fixture_store();
        let results = store.search("quantum entanglement", None, None);
        assert!(results.is_empty());
    }

    #[test]
    fn search_caps_at_three() {
        let store = fixture_store();
        // Standard filter "8" alone matches two; a broad token matches more.
        let results = store.search("lesson", None, Some("8"));
        assert!(results.len() <= 3);
    }

    #[test]
    fn search_score_monotonic_with_matching_tokens() {
        let store = fixture_store();
        let one = store.search("triangle", None, None);
        let two = store.search("triangle height", None, None);
        assert_eq!(one[0].id, "Std 8 Math Lesson No.12.docx");
        assert_eq!(two[0].id, "Std 8 Math Lesson No.12.docx");
    }

    #[test]
    fn search_is_idempotent() {
        let store = fixture_store();
        let a: Vec<String> = store
            .search("triangle", None, Some("8"))
            .iter()
            .map(|d| d.id.clone())
            .collect();
        let b: Vec<String> = store
            .search("triangle", None, Some("8"))
            .iter()
            .map(|d| d.id.clone())
            .collect();
        assert_eq!(a, b);
    }

    #[test]
    fn subject_filter_adds_weight() {
        let store = fixture_store();
        // "math" subject filter should rank Std 9 Math over Std 8 Science
        // even though neither content matches the query tokens.
        let results = store.search("equations", Some("math"), None);
        assert_eq!(results[0].id, "Std 9 Math Lesson No.1.docx");
    }

    #[test]
    fn by_standard_substring_case_insensitive() {
        let store = fixture_store();
        assert_eq!(store.by_standard("8").len(), 2);
        assert_eq!(store.by_subject("MATH").len(), 2);
    }

    #[test]
    fn available_values_dedup_first_seen() {
        let store = fixture_store();
        assert_eq!(
            store.available_subjects(),
            vec!["Math", "Science", "Unknown"]
        );
        assert_eq!(store.available_standards(), vec!["8", "9", "Unknown"]);
    }

    #[test]
    fn token_index_built_per_document() {
        let store = fixture_store();
        let tokens = store
            .token_index()
            .get("Std 8 Math Lesson No.12.docx")
            .unwrap();
        assert!(tokens.contains(&"math".to_owned()));
        assert!(tokens.contains(&"triangle".to_owned()));
    }
}
