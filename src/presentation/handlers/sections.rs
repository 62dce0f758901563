use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::Serialize;

use crate::application::extraction::PipelineError;
use crate::application::extraction::tasks::SectionTask;
use crate::application::ports::{ChatResponder, CompletionBackend, PageExtractor};
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Runs the sectionwise extraction cascade over a stored document and
/// returns the pipeline outcome verbatim: the mode tells the client how
/// the result was produced.
#[tracing::instrument(skip(state))]
pub async fn analyze_sections_handler<B, C, P>(
    State(state): State<AppState<B, C, P>>,
    Path(id): Path<String>,
) -> impl IntoResponse
where
    B: CompletionBackend + 'static,
    C: ChatResponder + 'static,
    P: PageExtractor + 'static,
{
    let Some(document) = state.document_store.get(&id).await else {
        return (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Document not found".to_string(),
            }),
        )
            .into_response();
    };

    match state.pipeline.run(&SectionTask, &document.pages).await {
        Ok(outcome) => (StatusCode::OK, Json(outcome)).into_response(),
        Err(PipelineError::BackendNotConfigured) => {
            tracing::warn!("Section analysis requested without a configured backend");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: "Completion backend is not configured".to_string(),
                }),
            )
                .into_response()
        }
    }
}
