//! HTTP surface: board extraction from an uploaded photo, and board solving.
//!
//! | Route                      | Purpose                                     |
//! |----------------------------|---------------------------------------------|
//! | `GET /`, `GET /index.js`   | front-end page and script                   |
//! | `GET /health`              | liveness                                    |
//! | `POST /extract-board`      | multipart `file` upload → `{board}`         |
//! | `POST /solve-game`         | `{board_string}` → `{best_words, total_words}` |
//! | `GET /solve-game/{board}`  | same as above, board in the path            |

use axum::{
    Json, Router,
    extract::{
        DefaultBodyLimit, Multipart, Path, State,
        multipart::MultipartRejection,
    },
    http::{StatusCode, header},
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::board::CanonicalBoard;
use crate::engine::BoardEngine;
use crate::error::{ExtractError, SolveError};
use crate::image::RawImage;
use crate::model::OcrModel;
use crate::solver::{SolveResult, WordSearch, solve};

const INDEX_HTML: &str = include_str!("../static/index.html");
const INDEX_JS: &str = include_str!("../static/index.js");

/// Multipart field carrying the board photo.
pub const UPLOAD_FIELD: &str = "file";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardResponse {
    pub board: CanonicalBoard,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BoardRequest {
    pub board_string: String,
}

/// Shared, read-only state of the service.
pub struct AppState<M: OcrModel, W: WordSearch> {
    pub engine: BoardEngine<M>,
    pub solver: W,
    pub top_words: usize,
}

/// Builds the service router; uploads larger than `max_upload_bytes` are refused.
pub fn router<M, W>(state: AppState<M, W>, max_upload_bytes: usize) -> Router
where
    M: OcrModel + 'static,
    W: WordSearch + 'static,
{
    Router::new()
        .route("/", get(|| async { Html(INDEX_HTML) }))
        .route("/index.js", get(index_js))
        .route("/health", get(|| async { Json(json!({ "status": "ok" })) }))
        .route("/extract-board", post(extract_board::<M, W>))
        .route("/solve-game", post(solve_game::<M, W>))
        .route("/solve-game/{board}", get(solve_game_path::<M, W>))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(Arc::new(state))
}

async fn index_js() -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "text/javascript")], INDEX_JS)
}

async fn extract_board<M: OcrModel + 'static, W: WordSearch + 'static>(
    State(state): State<Arc<AppState<M, W>>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<BoardResponse>, ApiError> {
    let mut multipart = multipart.map_err(|e| ApiError::upload(e.status(), e.body_text()))?;
    let image = read_upload(&mut multipart).await?;
    log::info!("Received {} byte board photo", image.len());

    let extraction = state.engine.extract(&image).await?;
    log::info!(
        "Read {}x{} board in {:?} ({:?} waiting on the model)",
        extraction.grid.row_count(),
        extraction.grid.column_count(),
        extraction.start_time.elapsed(),
        extraction.duration
    );
    Ok(Json(BoardResponse {
        board: extraction.board,
    }))
}

async fn read_upload(multipart: &mut Multipart) -> Result<RawImage, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::upload(e.status(), e.body_text()))?
    {
        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }
        let content_type = field.content_type().map(str::to_owned);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::upload(e.status(), e.body_text()))?;
        return Ok(RawImage::new(bytes.to_vec(), content_type.as_deref()));
    }

    Err(ExtractError::invalid_image(format!("missing multipart field `{UPLOAD_FIELD}`")).into())
}

async fn solve_game<M: OcrModel + 'static, W: WordSearch + 'static>(
    State(state): State<Arc<AppState<M, W>>>,
    Json(request): Json<BoardRequest>,
) -> Result<Json<SolveResult>, ApiError> {
    Ok(Json(solve(
        &state.solver,
        &request.board_string,
        state.top_words,
    )?))
}

async fn solve_game_path<M: OcrModel + 'static, W: WordSearch + 'static>(
    State(state): State<Arc<AppState<M, W>>>,
    Path(board): Path<String>,
) -> Result<Json<SolveResult>, ApiError> {
    Ok(Json(solve(&state.solver, &board, state.top_words)?))
}

/// Caller-facing error: a short classification, never the raw model reply.
#[derive(Debug)]
pub enum ApiError {
    Extract(ExtractError),
    Solve(SolveError),
    /// The upload went over the configured body limit.
    UploadTooLarge(String),
}

impl From<ExtractError> for ApiError {
    fn from(err: ExtractError) -> Self {
        Self::Extract(err)
    }
}

impl From<SolveError> for ApiError {
    fn from(err: SolveError) -> Self {
        Self::Solve(err)
    }
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    upstream_status: Option<u16>,
}

impl ApiError {
    /// Classifies a failure to read the multipart upload.
    fn upload(status: StatusCode, message: String) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            Self::UploadTooLarge(message)
        } else {
            Self::Extract(ExtractError::invalid_image(message))
        }
    }

    fn status(&self) -> StatusCode {
        match self {
            ApiError::Extract(err) => match err {
                ExtractError::InvalidImage { .. } => StatusCode::BAD_REQUEST,
                ExtractError::InferenceServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
                ExtractError::InferenceRequestFailed { .. }
                | ExtractError::InferenceResponseMalformed { .. } => StatusCode::BAD_GATEWAY,
                ExtractError::EmptyModelOutput
                | ExtractError::ModelOutputNotJson { .. }
                | ExtractError::MalformedGrid { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            },
            ApiError::Solve(SolveError::InvalidBoard { .. }) => StatusCode::BAD_REQUEST,
            ApiError::Solve(SolveError::Dictionary { .. }) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::UploadTooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
        }
    }

    fn body(&self) -> ErrorBody {
        match self {
            ApiError::Extract(err) => ErrorBody {
                error: err.kind(),
                message: err.to_string(),
                upstream_status: err.upstream_status(),
            },
            ApiError::Solve(err) => ErrorBody {
                error: err.kind(),
                message: err.to_string(),
                upstream_status: None,
            },
            ApiError::UploadTooLarge(message) => ErrorBody {
                error: "upload_too_large",
                message: message.clone(),
                upstream_status: None,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = self.body();
        if status.is_server_error() {
            log::error!("Request failed ({}): {}", body.error, body.message);
        } else {
            log::warn!("Request rejected ({}): {}", body.error, body.message);
        }
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_failures_to_statuses() {
        let cases = [
            (ExtractError::invalid_image("x"), StatusCode::BAD_REQUEST),
            (
                ExtractError::InferenceServiceUnavailable {
                    endpoint: "http://localhost:1234".to_string(),
                    message: "connection refused".to_string(),
                },
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ExtractError::upstream_status_failure(500),
                StatusCode::BAD_GATEWAY,
            ),
            (
                ExtractError::InferenceRequestFailed {
                    status: None,
                    reason: "builder error".to_string(),
                },
                StatusCode::BAD_GATEWAY,
            ),
            (ExtractError::EmptyModelOutput, StatusCode::UNPROCESSABLE_ENTITY),
            (
                ExtractError::malformed_grid("ragged"),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn error_body_carries_kind_and_upstream_status() {
        let body = ApiError::from(ExtractError::upstream_status_failure(500)).body();
        assert_eq!(
            serde_json::to_value(&body).unwrap(),
            json!({
                "error": "inference_request_failed",
                "message": "inference request failed: upstream status 500",
                "upstream_status": 500,
            })
        );
    }

    #[test]
    fn oversized_upload_is_payload_too_large() {
        let err = ApiError::upload(StatusCode::PAYLOAD_TOO_LARGE, "length limit exceeded".into());
        assert_eq!(err.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(err.body().error, "upload_too_large");

        let err = ApiError::upload(StatusCode::BAD_REQUEST, "bad boundary".into());
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.body().error, "invalid_image");
    }

    #[test]
    fn invalid_board_is_a_client_error() {
        let err = ApiError::from(SolveError::invalid_board("rows have different lengths"));
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.body().error, "invalid_board");
    }
}
