//! HTTP surface of the gateway.
//!
//! A thin boundary layer: each handler selects exactly one pipeline path,
//! forwards the payload, and shapes the response. No business logic lives
//! here — the stages in [`crate::pipeline`] are the system.
//!
//! # Endpoints
//!
//! | Method | Path       | Description                                       |
//! |--------|------------|---------------------------------------------------|
//! | `GET`  | `/`        | Liveness probe                                    |
//! | `POST` | `/rewrite` | Multi-modal upload → culturally-adapted rewrite   |
//! | `POST` | `/tts`     | Text → synthesized speech (`audio/mpeg` bytes)    |
//! | `POST` | `/quiz`    | Explanatory text → 3-question quiz                |
//! | `POST` | `/chat`    | Conversation turn → tutoring persona reply        |
//!
//! # Error Contract
//!
//! Caller mistakes produce a 4xx with a JSON body:
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "No file or text input provided." } }
//! ```
//!
//! Provider-tier failures never become error responses; they degrade inside
//! the payload per the pipeline stage contracts.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted: the gateway is consumed
//! directly by browser front-ends.

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::config::GatewayConfig;
use crate::error::GatewayError;
use crate::pipeline::chat::{ChatTurn, PersonaChat};
use crate::pipeline::extract::{InputPayload, TextExtractor};
use crate::pipeline::quiz::{Quiz, QuizGenerator};
use crate::pipeline::rewrite::ContentRewriter;
use crate::pipeline::speech::SpeechSynthesizer;

/// Upload ceiling. Covers the provider's own audio-upload limit with room
/// for dense PDFs.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// Shared application state: the five pipeline stages, each holding the one
/// process-wide provider handle. Cloned per request by Axum's `State`.
#[derive(Clone)]
pub struct AppState {
    extractor: TextExtractor,
    rewriter: ContentRewriter,
    quizzes: QuizGenerator,
    speech: SpeechSynthesizer,
    chat: PersonaChat,
}

impl AppState {
    /// Wire the pipeline stages to the provider resolved from `config`.
    /// The provider handle is created exactly once, here.
    pub fn new(config: &GatewayConfig) -> Self {
        let provider = config.resolve_provider();
        Self {
            extractor: TextExtractor::new(provider.clone()),
            rewriter: ContentRewriter::new(provider.clone()),
            quizzes: QuizGenerator::new(provider.clone()),
            speech: SpeechSynthesizer::new(provider.clone()),
            chat: PersonaChat::new(provider),
        }
    }
}

/// Build the gateway router.
pub fn router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/", get(handle_root))
        .route("/rewrite", post(handle_rewrite))
        .route("/tts", post(handle_tts))
        .route("/quiz", post(handle_quiz))
        .route("/chat", post(handle_chat))
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .with_state(state)
}

/// Bind `config.bind` and serve until the process is terminated.
pub async fn run_server(config: &GatewayConfig) -> std::io::Result<()> {
    let state = AppState::new(config);
    let app = router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind).await?;
    info!("gateway listening on http://{}", listener.local_addr()?);
    axum::serve(listener, app).await
}

// ============ Error response ============

/// JSON error body for caller-facing failures.
#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

/// Inner error detail with a machine-readable code and a human message.
#[derive(Serialize)]
struct ErrorDetail {
    code: &'static str,
    message: String,
}

/// Internal error type that converts into an HTTP response.
pub struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

impl From<GatewayError> for ApiError {
    fn from(e: GatewayError) -> Self {
        // Every gateway error is the caller's to fix; they all map to 400,
        // matching the surface this gateway is wire-compatible with.
        ApiError {
            status: StatusCode::BAD_REQUEST,
            code: "bad_request",
            message: e.to_string(),
        }
    }
}

// ============ GET / ============

#[derive(Serialize)]
struct RootResponse {
    message: &'static str,
}

/// Liveness probe.
async fn handle_root() -> Json<RootResponse> {
    Json(RootResponse {
        message: "lessonloom gateway is running",
    })
}

// ============ POST /rewrite ============

#[derive(Serialize)]
struct RewriteResponse {
    original_text: String,
    rewritten_text: String,
    image_prompt: String,
}

/// Multipart upload → extraction → culturally-adapted rewrite.
async fn handle_rewrite(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<RewriteResponse>, ApiError> {
    let mut file: Option<(String, Bytes)> = None;
    let mut text_input: Option<String> = None;
    let mut culture: Option<String> = None;
    let mut page_number: usize = 1;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| GatewayError::MalformedMultipart(e.to_string()))?
    {
        let malformed = |e: axum::extract::multipart::MultipartError| {
            GatewayError::MalformedMultipart(e.to_string())
        };
        // Field name is copied out first: reading the field body consumes it.
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let bytes = field.bytes().await.map_err(malformed)?;
                file = Some((content_type, bytes));
            }
            "text_input" => text_input = Some(field.text().await.map_err(malformed)?),
            "culture" => culture = Some(field.text().await.map_err(malformed)?),
            "page_number" => {
                let raw = field.text().await.map_err(malformed)?;
                page_number = raw.trim().parse().map_err(|_| ApiError {
                    status: StatusCode::BAD_REQUEST,
                    code: "bad_request",
                    message: format!("page_number must be a positive integer, got '{raw}'"),
                })?;
            }
            // Unknown fields are ignored, not rejected.
            _ => {}
        }
    }

    let culture = culture.ok_or_else(|| ApiError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request",
        message: "culture field is required".to_string(),
    })?;

    let payload = select_payload(text_input, file, page_number)?;

    let original_text = state
        .extractor
        .extract(payload)
        .await
        .map_err(GatewayError::from)?;
    if original_text.is_empty() {
        return Err(GatewayError::EmptyExtraction.into());
    }

    let rewritten = state.rewriter.rewrite(&original_text, &culture).await;

    Ok(Json(RewriteResponse {
        original_text,
        rewritten_text: rewritten.rewritten_text,
        image_prompt: rewritten.image_prompt,
    }))
}

/// Choose the input branch: non-empty `text_input` wins over `file`.
///
/// An empty `text_input` field is treated as absent, so a request carrying
/// both an empty text field and a file still takes the file branch.
fn select_payload(
    text_input: Option<String>,
    file: Option<(String, Bytes)>,
    page_number: usize,
) -> Result<InputPayload, GatewayError> {
    match (text_input, file) {
        (Some(text), _) if !text.is_empty() => Ok(InputPayload::RawText(text)),
        (_, Some((content_type, bytes))) => {
            Ok(InputPayload::from_upload(&content_type, bytes, page_number)?)
        }
        _ => Err(GatewayError::MissingInput),
    }
}

// ============ POST /tts ============

#[derive(Deserialize)]
struct TtsRequest {
    text: String,
    voice: String,
}

/// Text → synthesized speech. Always 200; failures yield an empty body.
async fn handle_tts(State(state): State<AppState>, Json(req): Json<TtsRequest>) -> Response {
    let audio = state.speech.synthesize(&req.text, &req.voice).await;
    ([(header::CONTENT_TYPE, "audio/mpeg")], audio).into_response()
}

// ============ POST /quiz ============

#[derive(Deserialize)]
struct QuizRequest {
    text: String,
}

/// Explanatory text → quiz. Always 200; failures yield an empty question list.
async fn handle_quiz(State(state): State<AppState>, Json(req): Json<QuizRequest>) -> Json<Quiz> {
    Json(state.quizzes.generate(&req.text).await)
}

// ============ POST /chat ============

#[derive(Deserialize)]
struct ChatRequest {
    message: String,
    history: Vec<ChatTurn>,
    context: String,
    culture: String,
}

#[derive(Serialize)]
struct ChatResponse {
    response: String,
}

/// Conversation turn → tutoring persona reply. Always 200.
async fn handle_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Json<ChatResponse> {
    let response = state
        .chat
        .respond(&req.message, &req.history, &req.context, &req.culture)
        .await;
    Json(ChatResponse { response })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nonempty_text_wins_over_file() {
        let payload = select_payload(
            Some("verbatim".into()),
            Some(("application/pdf".into(), Bytes::from_static(b"%PDF"))),
            1,
        )
        .unwrap();
        assert!(matches!(payload, InputPayload::RawText(t) if t == "verbatim"));
    }

    #[test]
    fn empty_text_falls_through_to_file() {
        let payload = select_payload(
            Some(String::new()),
            Some(("application/pdf".into(), Bytes::from_static(b"%PDF"))),
            3,
        )
        .unwrap();
        assert!(matches!(payload, InputPayload::Pdf { page_number: 3, .. }));
    }

    #[test]
    fn neither_input_is_a_client_error() {
        let err = select_payload(None, None, 1).unwrap_err();
        assert!(matches!(err, GatewayError::MissingInput));

        let err = select_payload(Some(String::new()), None, 1).unwrap_err();
        assert!(matches!(err, GatewayError::MissingInput));
    }

    #[test]
    fn unsupported_file_type_is_a_client_error() {
        let err = select_payload(
            None,
            Some(("application/zip".into(), Bytes::from_static(b"PK"))),
            1,
        )
        .unwrap_err();
        assert_eq!(err.to_string(), "Unsupported file type: application/zip");
    }

    #[test]
    fn api_error_body_shape() {
        let e = ApiError::from(GatewayError::MissingInput);
        let body = ErrorBody {
            error: ErrorDetail {
                code: e.code,
                message: e.message,
            },
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["error"]["code"], "bad_request");
        assert_eq!(json["error"]["message"], "No file or text input provided.");
    }
}
