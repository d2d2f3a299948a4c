use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::LlmError;
use crate::provider::{LlmProvider, Message, Role};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
    max_output_tokens: u32,
}

impl fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("client", &"<reqwest::Client>")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("max_output_tokens", &self.max_output_tokens)
            .finish()
    }
}

impl Clone for GeminiProvider {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            model: self.model.clone(),
            max_output_tokens: self.max_output_tokens,
        }
    }
}

impl GeminiProvider {
    #[must_use]
    pub fn new(api_key: String, mut base_url: String, model: String, max_output_tokens: u32) -> Self {
        while base_url.ends_with('/') {
            base_url.pop();
        }
        Self {
            client: crate::http::default_client(),
            api_key,
            base_url,
            model,
            max_output_tokens,
        }
    }

    #[must_use]
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    async fn send_request(&self, messages: &[Message]) -> Result<String, LlmError> {
        let (system, contents) = convert_messages(messages);

        let body = GenerateRequest {
            system_instruction: system.map(|text| InstructionPayload {
                parts: vec![Part { text }],
            }),
            contents,
            generation_config: GenerationConfig {
                max_output_tokens: self.max_output_tokens,
            },
        };

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.base_url, self.model
            ))
            .header("x-goog-api-key", &self.api_key)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await.map_err(LlmError::Http)?;

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(LlmError::RateLimited);
        }

        if !status.is_success() {
            tracing::error!("Gemini API error {status}: {text}");
            return Err(LlmError::Api {
                provider: "gemini",
                status: status.as_u16(),
            });
        }

        let resp: GenerateResponse = serde_json::from_str(&text)?;

        let reply: String = resp
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .map(|c| {
                c.parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .concat()
            })
            .unwrap_or_default();

        if reply.is_empty() {
            return Err(LlmError::EmptyResponse { provider: "gemini" });
        }

        Ok(reply)
    }
}

impl LlmProvider for GeminiProvider {
    async fn chat(&self, messages: &[Message]) -> Result<String, LlmError> {
        self.send_request(messages).await
    }

    fn name(&self) -> &str {
        "gemini"
    }
}

/// Split system messages from the conversation: Gemini takes the system
/// instruction as a dedicated top-level field, not a `contents` role.
fn convert_messages(messages: &[Message]) -> (Option<String>, Vec<ContentPayload>) {
    let mut system_parts: Vec<&str> = Vec::new();
    let mut contents = Vec::new();

    for msg in messages {
        match msg.role {
            Role::System => system_parts.push(&msg.content),
            Role::User | Role::Assistant => contents.push(ContentPayload {
                role: match msg.role {
                    Role::User => "user",
                    _ => "model",
                },
                parts: vec![Part {
                    text: msg.content.clone(),
                }],
            }),
        }
    }

    let system = if system_parts.is_empty() {
        None
    } else {
        Some(system_parts.join("\n\n"))
    };

    (system, contents)
}

#[derive(Serialize)]
struct GenerateRequest {
    #[serde(rename = "systemInstruction", skip_serializing_if = "Option::is_none")]
    system_instruction: Option<InstructionPayload>,
    contents: Vec<ContentPayload>,
    #[serde(rename = "generationConfig")]
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct InstructionPayload {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct ContentPayload {
    role: &'static str,
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[cfg(test)]
mod tests {
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn provider(base_url: String) -> GeminiProvider {
        GeminiProvider::new("test-key".into(), base_url, "gemini-2.5-flash".into(), 1024)
    }

    fn candidate_body(text: &str) -> serde_json::Value {
        serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": text}], "role": "model"}}]
        })
    }

    #[test]
    fn new_strips_trailing_slashes() {
        let p = provider("http://localhost:1234///".into());
        assert_eq!(p.base_url, "http://localhost:1234");
    }

    #[test]
    fn debug_redacts_api_key() {
        let debug = format!("{:?}", provider("http://x".into()));
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("test-key"));
    }

    #[test]
    fn convert_messages_splits_system() {
        let msgs = vec![
            Message::system("rules"),
            Message::user("hello"),
            Message {
                role: Role::Assistant,
                content: "hi".into(),
            },
        ];
        let (system, contents) = convert_messages(&msgs);
        assert_eq!(system.as_deref(), Some("rules"));
        assert_eq!(contents.len(), 2);
        assert_eq!(contents[0].role, "user");
        assert_eq!(contents[1].role, "model");
    }

    #[test]
    fn convert_messages_without_system() {
        let (system, contents) = convert_messages(&[Message::user("hi")]);
        assert!(system.is_none());
        assert_eq!(contents.len(), 1);
    }

    #[tokio::test]
    async fn chat_returns_candidate_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/models/gemini-2.5-flash:generateContent"))
            .and(header("x-goog-api-key", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body("2 + 2 = 4")))
            .expect(1)
            .mount(&server)
            .await;

        let p = provider(server.uri());
        let reply = p.chat(&[Message::user("2+2?")]).await.unwrap();
        assert_eq!(reply, "2 + 2 = 4");
    }

    #[tokio::test]
    async fn chat_sends_system_instruction() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "systemInstruction": {"parts": [{"text": "tutor rules"}]}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(candidate_body("ok")))
            .expect(1)
            .mount(&server)
            .await;

        let p = provider(server.uri());
        let reply = p
            .chat(&[Message::system("tutor rules"), Message::user("q")])
            .await
            .unwrap();
        assert_eq!(reply, "ok");
    }

    #[tokio::test]
    async fn chat_empty_candidates_is_empty_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"candidates": []})),
            )
            .mount(&server)
            .await;

        let p = provider(server.uri());
        let err = p.chat(&[Message::user("q")]).await.unwrap_err();
        assert!(matches!(err, LlmError::EmptyResponse { provider: "gemini" }));
    }

    #[tokio::test]
    async fn chat_maps_429_to_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let p = provider(server.uri());
        let err = p.chat(&[Message::user("q")]).await.unwrap_err();
        assert!(matches!(err, LlmError::RateLimited));
    }

    #[tokio::test]
    async fn chat_maps_server_error_to_api_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("overloaded"))
            .mount(&server)
            .await;

        let p = provider(server.uri());
        let err = p.chat(&[Message::user("q")]).await.unwrap_err();
        assert!(matches!(
            err,
            LlmError::Api {
                provider: "gemini",
                status: 503
            }
        ));
    }

    #[tokio::test]
    async fn chat_unreachable_errors() {
        let p = provider("http://127.0.0.1:1".into());
        assert!(p.chat(&[Message::user("q")]).await.is_err());
    }
}
