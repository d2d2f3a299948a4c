use std::sync::Arc;

use vidya_index::DocumentStore;
use vidya_llm::any::AnyProvider;
use vidya_memory::TurnStore;

use crate::chat::ChatEngine;
use crate::quiz::QuizGenerator;

/// Everything a request handler needs, built once at startup and passed
/// explicitly. There is no process-wide singleton; tests construct their
/// own contexts around fixture documents and mock providers.
pub struct TutorContext {
    pub documents: Arc<DocumentStore>,
    pub chat: ChatEngine<AnyProvider>,
    pub quiz: QuizGenerator<AnyProvider>,
}

impl TutorContext {
    #[must_use]
    pub fn new(provider: AnyProvider, documents: DocumentStore, turns: Option<TurnStore>) -> Self {
        let documents = Arc::new(documents);
        let provider = Arc::new(provider);

        let mut chat = ChatEngine::new(Arc::clone(&provider), Arc::clone(&documents));
        if let Some(turns) = turns {
            chat = chat.with_turn_store(turns);
        }

        Self {
            documents,
            chat,
            quiz: QuizGenerator::new(provider),
        }
    }
}
