use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use vidya_core::{Difficulty, Language, QuizSpec};

use super::server::AppState;

#[derive(Deserialize)]
pub(crate) struct ChatRequest {
    pub message: String,
    pub language: Language,
}

#[derive(Serialize)]
struct ChatResponse {
    reply: String,
}

#[derive(Deserialize)]
pub(crate) struct QuizRequest {
    pub topic: Option<String>,
    pub difficulty: Difficulty,
    pub language: Language,
    #[serde(rename = "numQuestions")]
    pub num_questions: Option<u32>,
}

#[derive(Deserialize)]
pub(crate) struct TtsRequest {
    pub text: String,
    pub lang: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct LessonsResponse {
    subjects: Vec<String>,
    standards: Vec<String>,
    total_documents: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct DebugDocumentsResponse {
    status: &'static str,
    message: String,
    subjects: Vec<String>,
    standards: Vec<String>,
    total_documents: usize,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    uptime_secs: u64,
}

fn invalid_input() -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(serde_json::json!({"error": "Invalid input"})),
    )
        .into_response()
}

fn upstream_failure(message: &str) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(serde_json::json!({"error": message})),
    )
        .into_response()
}

pub(crate) async fn chat_handler(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(req)) = payload else {
        return invalid_input();
    };
    if req.message.is_empty() {
        return invalid_input();
    }

    match state.ctx.chat.respond(&req.message, req.language).await {
        Ok(reply) => Json(ChatResponse { reply }).into_response(),
        Err(e) => {
            tracing::error!("chat generation failed: {e}");
            upstream_failure("Failed to process chat message")
        }
    }
}

pub(crate) async fn quiz_handler(
    State(state): State<AppState>,
    payload: Result<Json<QuizRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(req)) = payload else {
        return invalid_input();
    };

    let spec = QuizSpec {
        topic: req.topic,
        difficulty: req.difficulty,
        language: req.language,
        num_questions: req.num_questions,
    };

    match state.ctx.quiz.generate(&spec).await {
        Ok(quiz) => Json(quiz).into_response(),
        Err(e) => {
            tracing::error!("quiz generation failed: {e}");
            upstream_failure("Failed to generate quiz")
        }
    }
}

pub(crate) async fn lessons_handler(State(state): State<AppState>) -> Response {
    Json(LessonsResponse {
        subjects: state.ctx.documents.available_subjects(),
        standards: state.ctx.documents.available_standards(),
        total_documents: state.ctx.documents.len(),
    })
    .into_response()
}

pub(crate) async fn debug_documents_handler(State(state): State<AppState>) -> Response {
    let total = state.ctx.documents.len();
    Json(DebugDocumentsResponse {
        status: "ok",
        message: format!("{total} lesson documents loaded"),
        subjects: state.ctx.documents.available_subjects(),
        standards: state.ctx.documents.available_standards(),
        total_documents: total,
    })
    .into_response()
}

pub(crate) async fn tts_handler(
    State(state): State<AppState>,
    payload: Result<Json<TtsRequest>, JsonRejection>,
) -> Response {
    let Ok(Json(req)) = payload else {
        return invalid_input();
    };
    if req.text.is_empty() || req.lang.is_empty() {
        return invalid_input();
    }

    match state.tts.synthesize(&req.text, &req.lang).await {
        Ok(audio) => ([(header::CONTENT_TYPE, "audio/mpeg")], audio).into_response(),
        Err(e) => {
            tracing::error!("tts proxy failed: {e}");
            upstream_failure("Failed to synthesize speech")
        }
    }
}

pub(crate) async fn health_handler(State(state): State<AppState>) -> Response {
    Json(HealthResponse {
        status: "ok",
        uptime_secs: state.started_at.elapsed().as_secs(),
    })
    .into_response()
}
