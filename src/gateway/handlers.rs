use crate::analysis::AnalysisOutcome;
use crate::error::AnalysisError;
use crate::media::Upload;
use axum::{
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};

use super::AppState;

/// Multipart field carrying the images.
const FILES_FIELD: &str = "files";

/// `GET /`: liveness banner
pub(super) async fn handle_root() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "Character Checker API is running with Gemini AI"
    }))
}

/// `GET /health`: configured models and whether an API key is present
pub(super) async fn handle_health(State(state): State<AppState>) -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "models": state.service.models(),
        "vision_configured": state.service.vision_configured(),
    }))
}

/// `POST /analyze`: run a consistency check over 2-5 uploaded images
pub(super) async fn handle_analyze(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let multipart = match multipart {
        Ok(multipart) => multipart,
        Err(rejection) => {
            tracing::warn!("Rejected analyze request: {}", rejection.body_text());
            return error_response(StatusCode::BAD_REQUEST, rejection.body_text());
        }
    };

    let uploads = match read_uploads(multipart).await {
        Ok(uploads) => uploads,
        Err(e) => {
            tracing::warn!("Malformed multipart body: {}", e.body_text());
            return error_response(e.status(), e.body_text());
        }
    };

    match state.service.analyze(uploads).await {
        Ok(AnalysisOutcome::Report(report)) => (StatusCode::OK, Json(*report)).into_response(),
        // Count violations are answered with 200 and an `error` field.
        Ok(AnalysisOutcome::Rejected { error }) => error_response(StatusCode::OK, error),
        Err(e @ AnalysisError::Image { .. }) => {
            error_response(StatusCode::UNPROCESSABLE_ENTITY, e.to_string())
        }
        Err(e @ AnalysisError::Worker(_)) => {
            tracing::error!("Analysis worker failed: {e}");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

async fn read_uploads(mut multipart: Multipart) -> Result<Vec<Upload>, MultipartError> {
    let mut uploads = Vec::new();
    while let Some(field) = multipart.next_field().await? {
        if field.name() != Some(FILES_FIELD) {
            continue;
        }
        let filename = field.file_name().map(ToOwned::to_owned);
        let data = field.bytes().await?;
        uploads.push(Upload::new(filename, data.to_vec()));
    }
    Ok(uploads)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    let body = serde_json::json!({ "error": message.into() });
    (status, Json(body)).into_response()
}
