use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};

use crate::application::ports::{ChatResponder, CompletionBackend, PageExtractor};
use crate::application::services::{AnalysisError, TenderAnalysis};
use crate::presentation::state::AppState;

const DEFAULT_QUERY: &str = "Provide a comprehensive analysis of this tender document including key requirements, financial details, and important dates.";

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Deserialize, Default)]
pub struct AnalyzeRequest {
    #[serde(default)]
    pub query: Option<String>,
}

#[derive(Serialize)]
pub struct AnalyzeResponse {
    pub document_id: String,
    pub query: String,
    pub analysis: TenderAnalysis,
    pub relevant_chunks: Vec<RelevantChunk>,
    pub message: String,
}

#[derive(Serialize)]
pub struct RelevantChunk {
    pub chunk_text: String,
    pub score: f32,
}

#[tracing::instrument(skip(state, request))]
pub async fn analyze_document_handler<B, C, P>(
    State(state): State<AppState<B, C, P>>,
    Path(id): Path<String>,
    Json(request): Json<AnalyzeRequest>,
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

    let query = match request.query {
        Some(q) if !q.trim().is_empty() => q,
        _ => DEFAULT_QUERY.to_string(),
    };

    let hits = state.document_store.search(&query, 5).await;
    let chunk_texts: Vec<String> = hits.iter().map(|hit| hit.chunk_text.clone()).collect();
    let document_text = document.pages.join("\n\n");

    let analysis = match state
        .analysis_service
        .analyze(&document_text, &chunk_texts, &query)
        .await
    {
        Ok(analysis) => analysis,
        Err(AnalysisError::BackendNotConfigured) => {
            tracing::warn!("Analysis requested without a configured backend");
            return (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(ErrorResponse {
                    error: "Completion backend is not configured".to_string(),
                }),
            )
                .into_response();
        }
        Err(AnalysisError::Completion(e)) => {
            tracing::error!(error = %e, "Document analysis failed");
            return (
                StatusCode::BAD_GATEWAY,
                Json(ErrorResponse {
                    error: format!("Failed to analyze document: {}", e),
                }),
            )
                .into_response();
        }
    };

    let relevant_chunks = hits
        .into_iter()
        .map(|hit| RelevantChunk {
            chunk_text: hit.chunk_text,
            score: hit.score,
        })
        .collect();

    (
        StatusCode::OK,
        Json(AnalyzeResponse {
            document_id: id,
            query,
            analysis,
            relevant_chunks,
            message: "Document analysis completed successfully".to_string(),
        }),
    )
        .into_response()
}
