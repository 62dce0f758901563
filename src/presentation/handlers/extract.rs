use axum::Json;
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use crate::application::extraction::PipelineError;
use crate::application::extraction::tasks::{ScopeTask, SummaryTask};
use crate::application::ports::{
    ChatResponder, CompletionBackend, PageExtractor, PageExtractorError,
};
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// One-shot tender summary extraction: the uploaded file goes through the
/// cascade without being stored.
#[tracing::instrument(skip(state, multipart))]
pub async fn extract_summary_handler<B, C, P>(
    State(state): State<AppState<B, C, P>>,
    multipart: Multipart,
) -> impl IntoResponse
where
    B: CompletionBackend + 'static,
    C: ChatResponder + 'static,
    P: PageExtractor + 'static,
{
    let pages = match read_pdf_pages(state.page_extractor.as_ref(), multipart).await {
        Ok(pages) => pages,
        Err(response) => return response,
    };

    match state.pipeline.run(&SummaryTask, &pages).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(PipelineError::BackendNotConfigured) => backend_not_configured(),
    }
}

/// One-shot scope-of-work extraction over an uploaded file.
#[tracing::instrument(skip(state, multipart))]
pub async fn extract_scope_handler<B, C, P>(
    State(state): State<AppState<B, C, P>>,
    multipart: Multipart,
) -> impl IntoResponse
where
    B: CompletionBackend + 'static,
    C: ChatResponder + 'static,
    P: PageExtractor + 'static,
{
    let pages = match read_pdf_pages(state.page_extractor.as_ref(), multipart).await {
        Ok(pages) => pages,
        Err(response) => return response,
    };

    match state.pipeline.run(&ScopeTask, &pages).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(PipelineError::BackendNotConfigured) => backend_not_configured(),
    }
}

fn backend_not_configured() -> Response {
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Json(ErrorResponse {
            error: "Completion backend is not configured".to_string(),
        }),
    )
        .into_response()
}

/// Pulls the `file` field out of the multipart body and extracts its page
/// texts. Failures come back as ready-made error responses.
async fn read_pdf_pages<P>(extractor: &P, mut multipart: Multipart) -> Result<Vec<String>, Response>
where
    P: PageExtractor,
{
    let field = loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("file") => break field,
            Ok(Some(_)) => continue,
            Ok(None) => {
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: "No file uploaded or invalid file".to_string(),
                    }),
                )
                    .into_response());
            }
            Err(e) => {
                return Err((
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: format!("Failed to read multipart: {}", e),
                    }),
                )
                    .into_response());
            }
        }
    };

    let filename = field.file_name().unwrap_or("unknown").to_string();
    if !filename.to_lowercase().ends_with(".pdf") {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Only PDF files are supported".to_string(),
            }),
        )
            .into_response());
    }

    let data = match field.bytes().await {
        Ok(d) => d,
        Err(e) => {
            return Err((
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("Failed to read file: {}", e),
                }),
            )
                .into_response());
        }
    };

    match extractor.extract_pages(&data).await {
        Ok(pages) => Ok(pages),
        Err(PageExtractorError::InvalidDocument(reason)) => Err((
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: format!("Failed to extract text from PDF: {}", reason),
            }),
        )
            .into_response()),
        Err(PageExtractorError::Timeout) => Err((
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ErrorResponse {
                error: "PDF extraction timed out".to_string(),
            }),
        )
            .into_response()),
    }
}
