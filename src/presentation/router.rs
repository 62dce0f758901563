use axum::Router;
use axum::middleware;
use axum::routing::{get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::application::ports::{ChatResponder, CompletionBackend, PageExtractor};
use crate::infrastructure::observability::request_id_middleware;
use crate::presentation::handlers::{
    analyze_document_handler, analyze_sections_handler, chat_socket_handler,
    delete_document_handler, extract_scope_handler, extract_summary_handler, get_document_handler,
    health_handler, list_documents_handler, search_documents_handler, upload_document_handler,
};
use crate::presentation::state::AppState;

pub fn create_router<B, C, P>(state: AppState<B, C, P>) -> Router
where
    B: CompletionBackend + 'static,
    C: ChatResponder + 'static,
    P: PageExtractor + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(DefaultOnResponse::new().level(Level::INFO));

    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/v1/documents",
            post(upload_document_handler::<B, C, P>).get(list_documents_handler::<B, C, P>),
        )
        .route(
            "/api/v1/documents/search",
            get(search_documents_handler::<B, C, P>),
        )
        .route(
            "/api/v1/documents/{id}",
            get(get_document_handler::<B, C, P>).delete(delete_document_handler::<B, C, P>),
        )
        .route(
            "/api/v1/documents/{id}/analyze",
            post(analyze_document_handler::<B, C, P>),
        )
        .route(
            "/api/v1/documents/{id}/sections",
            post(analyze_sections_handler::<B, C, P>),
        )
        .route(
            "/api/v1/extract/summary",
            post(extract_summary_handler::<B, C, P>),
        )
        .route(
            "/api/v1/extract/scope",
            post(extract_scope_handler::<B, C, P>),
        )
        .route("/ws/chat", get(chat_socket_handler::<B, C, P>))
        .layer(middleware::from_fn(request_id_middleware))
        .layer(trace_layer)
        .layer(cors)
        .with_state(state)
}
