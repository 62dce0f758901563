use std::sync::Arc;

use crate::application::extraction::ExtractionPipeline;
use crate::application::ports::{ChatResponder, CompletionBackend, PageExtractor};
use crate::application::services::AnalysisService;
use crate::infrastructure::store::InMemoryDocumentStore;
use crate::presentation::config::Settings;

pub struct AppState<B, C, P>
where
    B: CompletionBackend,
    C: ChatResponder,
    P: PageExtractor,
{
    pub pipeline: Arc<ExtractionPipeline<B>>,
    pub analysis_service: Arc<AnalysisService<B>>,
    pub chat_responder: Arc<C>,
    pub page_extractor: Arc<P>,
    pub document_store: Arc<InMemoryDocumentStore>,
    pub settings: Settings,
}

impl<B, C, P> Clone for AppState<B, C, P>
where
    B: CompletionBackend,
    C: ChatResponder,
    P: PageExtractor,
{
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
            analysis_service: Arc::clone(&self.analysis_service),
            chat_responder: Arc::clone(&self.chat_responder),
            page_extractor: Arc::clone(&self.page_extractor),
            document_store: Arc::clone(&self.document_store),
            settings: self.settings.clone(),
        }
    }
}
