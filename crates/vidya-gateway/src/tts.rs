//! Thin proxy client for the translate text-to-speech endpoint.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum TtsError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("tts upstream failed (status {0})")]
    Upstream(u16),
}

#[derive(Debug, Clone)]
pub struct TtsClient {
    client: reqwest::Client,
    base_url: String,
}

impl TtsClient {
    #[must_use]
    pub fn new(mut base_url: String) -> Self {
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: vidya_llm::http::default_client(),
            base_url,
        }
    }

    /// Fetch spoken audio for `text`, returned as MP3 bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the upstream request fails or responds with a
    /// non-success status.
    pub async fn synthesize(&self, text: &str, lang: &str) -> Result<Vec<u8>, TtsError> {
        let response = self
            .client
            .get(format!("{}/translate_tts", self.base_url))
            .query(&[("ie", "UTF-8"), ("q", text), ("tl", lang), ("client", "tw-ob")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            tracing::error!("tts upstream error {status}");
            return Err(TtsError::Upstream(status.as_u16()));
        }

        Ok(response.bytes().await?.to_vec())
    }
}
