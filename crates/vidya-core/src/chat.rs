//! Chat turn handling: composed prompt, script enforcement retries,
//! cleanup, and turn persistence.

use std::sync::Arc;

use vidya_index::DocumentStore;
use vidya_llm::LlmError;
use vidya_llm::provider::{LlmProvider, Message};
use vidya_memory::TurnStore;

use crate::language::{HeuristicScriptValidator, Language, ScriptValidator, devanagari_count};
use crate::prompt;

/// English refusal fragments that, surviving all retries, replace the
/// whole reply with a fixed apology.
const OVERRIDE_PHRASES: &[&str] = &[
    "can only answer in english",
    "cannot provide",
    "unable to fulfill",
];

/// Drives one chat turn against the provider, enforcing the requested
/// language with up to two extra calls: a retry with a short directive,
/// then a rewrite of the reply itself.
pub struct ChatEngine<P: LlmProvider> {
    provider: Arc<P>,
    store: Arc<DocumentStore>,
    validator: Box<dyn ScriptValidator>,
    turns: Option<TurnStore>,
}

impl<P: LlmProvider> ChatEngine<P> {
    #[must_use]
    pub fn new(provider: Arc<P>, store: Arc<DocumentStore>) -> Self {
        Self {
            provider,
            store,
            validator: Box::new(HeuristicScriptValidator),
            turns: None,
        }
    }

    #[must_use]
    pub fn with_validator(mut self, validator: Box<dyn ScriptValidator>) -> Self {
        self.validator = validator;
        self
    }

    #[must_use]
    pub fn with_turn_store(mut self, turns: TurnStore) -> Self {
        self.turns = Some(turns);
        self
    }

    /// Answer one student message in the requested language.
    ///
    /// # Errors
    ///
    /// Returns an error if any provider call fails; the caller surfaces it
    /// as a generic upstream failure.
    pub async fn respond(&self, message: &str, language: Language) -> Result<String, LlmError> {
        let composed = prompt::compose(message, language, &self.store);

        let mut reply = self
            .call(&[
                Message::system(composed.system.clone()),
                Message::user(composed.user),
            ])
            .await?;

        if language.expects_devanagari() && !self.validator.is_acceptable(&reply, language) {
            tracing::debug!(language = language.as_str(), "script gate failed, retrying");
            reply = self
                .call(&[
                    Message::system(composed.system),
                    Message::user(format!("Please answer in {}.", language.display_name())),
                ])
                .await?;
        }

        if language.expects_devanagari() && devanagari_count(&reply) == 0 {
            tracing::debug!(language = language.as_str(), "no Devanagari in reply, rewriting");
            let rewritten = self
                .call(&[Message::user(format!(
                    "Rewrite the following text strictly in {} (Devanagari script) with no \
                     preamble or explanation:\n\n{reply}",
                    language.display_name()
                ))])
                .await?;
            if devanagari_count(&rewritten) > 0 {
                reply = rewritten;
            }
        }

        reply = reply.replace('*', "");

        let lower = reply.to_lowercase();
        if OVERRIDE_PHRASES.iter().any(|p| lower.contains(p)) {
            reply = apology(language).to_owned();
        }

        if let Some(ref turns) = self.turns
            && let Err(e) = turns.save_turn(message, language.as_str(), &reply).await
        {
            tracing::warn!("failed to persist chat turn: {e}");
        }

        Ok(reply)
    }

    /// A missing reply is an empty string, not an error; everything else
    /// propagates.
    async fn call(&self, messages: &[Message]) -> Result<String, LlmError> {
        match self.provider.chat(messages).await {
            Ok(text) => Ok(text),
            Err(LlmError::EmptyResponse { .. }) => Ok(String::new()),
            Err(e) => Err(e),
        }
    }
}

fn apology(language: Language) -> &'static str {
    match language {
        Language::English => "Sorry, I can answer only in English. Please ask in English.",
        Language::Hindi => {
            "क्षमा करें, मैं केवल हिंदी में उत्तर दे सकता हूँ। कृपया हिंदी में पूछें।"
        }
        Language::Marathi => {
            "क्षमस्व, मी फक्त मराठीत उत्तर देऊ शकते. कृपया मराठीत विचारा."
        }
    }
}
