use axum::Json;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::ports::{
    ChatResponder, CompletionBackend, PageExtractor, PageExtractorError,
};
use crate::domain::{DocumentMetadata, StoredDocument};
use crate::infrastructure::store::content_hash;
use crate::presentation::state::AppState;

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct UploadResponse {
    pub document_id: String,
    pub filename: String,
    pub pages: usize,
    pub metadata: MetadataBody,
    pub message: String,
}

#[derive(Serialize)]
pub struct MetadataBody {
    pub page_count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,
}

impl From<&DocumentMetadata> for MetadataBody {
    fn from(metadata: &DocumentMetadata) -> Self {
        Self {
            page_count: metadata.page_count,
            title: metadata.title.clone(),
            author: metadata.author.clone(),
            subject: metadata.subject.clone(),
        }
    }
}

#[derive(Serialize)]
pub struct DocumentListResponse {
    pub documents: Vec<DocumentInfo>,
}

#[derive(Serialize)]
pub struct DocumentInfo {
    pub id: String,
    pub filename: String,
    pub pages: usize,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Serialize)]
pub struct DocumentDetail {
    pub id: String,
    pub filename: String,
    pub metadata: MetadataBody,
    pub pages: Vec<String>,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub results: Vec<SearchHitBody>,
}

#[derive(Serialize)]
pub struct SearchHitBody {
    pub document_id: String,
    pub chunk_text: String,
    pub score: f32,
}

#[tracing::instrument(skip(state, multipart))]
pub async fn upload_document_handler<B, C, P>(
    State(state): State<AppState<B, C, P>>,
    mut multipart: Multipart,
) -> impl IntoResponse
where
    B: CompletionBackend + 'static,
    C: ChatResponder + 'static,
    P: PageExtractor + 'static,
{
    let field = loop {
        match multipart.next_field().await {
            Ok(Some(field)) if field.name() == Some("file") => break field,
            Ok(Some(_)) => continue,
            Ok(None) => {
                tracing::warn!("Upload request without a file field");
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: "No file uploaded or invalid file".to_string(),
                    }),
                )
                    .into_response();
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to read multipart");
                return (
                    StatusCode::BAD_REQUEST,
                    Json(ErrorResponse {
                        error: format!("Failed to read multipart: {}", e),
                    }),
                )
                    .into_response();
            }
        }
    };

    let filename = field.file_name().unwrap_or("unknown").to_string();
    if !filename.to_lowercase().ends_with(".pdf") {
        tracing::warn!(filename = %filename, "Rejected non-PDF upload");
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Only PDF files are supported".to_string(),
            }),
        )
            .into_response();
    }

    let data = match field.bytes().await {
        Ok(d) => d,
        Err(e) => {
            tracing::error!(error = %e, "Failed to read file bytes");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("Failed to read file: {}", e),
                }),
            )
                .into_response();
        }
    };

    tracing::debug!(filename = %filename, bytes = data.len(), "Processing file upload");

    let pages = match state.page_extractor.extract_pages(&data).await {
        Ok(pages) => pages,
        Err(PageExtractorError::InvalidDocument(reason)) => {
            tracing::warn!(error = %reason, "PDF parsing failed");
            return (
                StatusCode::BAD_REQUEST,
                Json(ErrorResponse {
                    error: format!("Failed to extract text from PDF: {}", reason),
                }),
            )
                .into_response();
        }
        Err(PageExtractorError::Timeout) => {
            tracing::error!("PDF extraction timed out");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "PDF extraction timed out".to_string(),
                }),
            )
                .into_response();
        }
    };

    if pages.iter().all(|page| page.trim().is_empty()) {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "No extractable text found in document".to_string(),
            }),
        )
            .into_response();
    }

    let metadata = match state.page_extractor.extract_metadata(&data).await {
        Ok(metadata) => metadata,
        Err(e) => {
            tracing::warn!(error = %e, "Metadata extraction failed; continuing without it");
            DocumentMetadata {
                page_count: pages.len(),
                ..DocumentMetadata::default()
            }
        }
    };

    let document_id = content_hash(&data);
    let page_count = pages.len();
    let metadata_body = MetadataBody::from(&metadata);

    let document = StoredDocument::new(document_id.clone(), filename.clone(), pages, metadata);
    state.document_store.insert(document).await;

    tracing::info!(document_id = %document_id, filename = %filename, page_count, "Document uploaded");

    (
        StatusCode::CREATED,
        Json(UploadResponse {
            document_id,
            filename,
            pages: page_count,
            metadata: metadata_body,
            message: "Document uploaded and processed successfully".to_string(),
        }),
    )
        .into_response()
}

#[tracing::instrument(skip(state))]
pub async fn list_documents_handler<B, C, P>(
    State(state): State<AppState<B, C, P>>,
) -> impl IntoResponse
where
    B: CompletionBackend + 'static,
    C: ChatResponder + 'static,
    P: PageExtractor + 'static,
{
    let documents = state
        .document_store
        .list()
        .await
        .into_iter()
        .map(|summary| DocumentInfo {
            id: summary.id,
            filename: summary.filename,
            pages: summary.page_count,
            uploaded_at: summary.uploaded_at,
        })
        .collect();

    (StatusCode::OK, Json(DocumentListResponse { documents }))
}

#[tracing::instrument(skip(state))]
pub async fn get_document_handler<B, C, P>(
    State(state): State<AppState<B, C, P>>,
    Path(id): Path<String>,
) -> impl IntoResponse
where
    B: CompletionBackend + 'static,
    C: ChatResponder + 'static,
    P: PageExtractor + 'static,
{
    match state.document_store.get(&id).await {
        Some(document) => (
            StatusCode::OK,
            Json(DocumentDetail {
                id: document.id,
                filename: document.filename,
                metadata: MetadataBody::from(&document.metadata),
                pages: document.pages,
                uploaded_at: document.uploaded_at,
            }),
        )
            .into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Document not found".to_string(),
            }),
        )
            .into_response(),
    }
}

#[tracing::instrument(skip(state))]
pub async fn delete_document_handler<B, C, P>(
    State(state): State<AppState<B, C, P>>,
    Path(id): Path<String>,
) -> impl IntoResponse
where
    B: CompletionBackend + 'static,
    C: ChatResponder + 'static,
    P: PageExtractor + 'static,
{
    if state.document_store.remove(&id).await {
        tracing::info!(document_id = %id, "Document deleted");
        (
            StatusCode::OK,
            Json(serde_json::json!({ "message": "Document deleted successfully" })),
        )
            .into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(ErrorResponse {
                error: "Document not found".to_string(),
            }),
        )
            .into_response()
    }
}

#[tracing::instrument(skip(state, params))]
pub async fn search_documents_handler<B, C, P>(
    State(state): State<AppState<B, C, P>>,
    Query(params): Query<SearchParams>,
) -> impl IntoResponse
where
    B: CompletionBackend + 'static,
    C: ChatResponder + 'static,
    P: PageExtractor + 'static,
{
    let query = params.q.unwrap_or_default();
    if query.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: "Search query is required".to_string(),
            }),
        )
            .into_response();
    }

    let results = state
        .document_store
        .search(&query, 10)
        .await
        .into_iter()
        .map(|hit| SearchHitBody {
            document_id: hit.document_id,
            chunk_text: hit.chunk_text,
            score: hit.score,
        })
        .collect();

    (StatusCode::OK, Json(SearchResponse { query, results })).into_response()
}
