use std::sync::Arc;

use kbase_core::error::Result;
use kbase_core::settings::Settings;
use kbase_core::traits::{Embedder, Generator, VectorStore};
use kbase_core::Chunker;
use kbase_hybrid::{AnswerService, GenerationScorer, Ingestor, RerankScorer, Reranker, RetrievalPipeline};
use kbase_model::{get_default_embedder, OllamaClient, OllamaGenerator};
use kbase_text::LexicalScorer;
use kbase_vector::open_store;

/// Every service, built once from settings and shared read-only.
pub struct App {
    pub settings: Settings,
    pub ingestor: Ingestor,
    pub answers: AnswerService,
    pipeline: Arc<RetrievalPipeline>,
}

impl App {
    /// Connect to the configured model server and vector index.
    pub async fn build(settings: Settings) -> Result<Self> {
        let embedder = get_default_embedder(&settings)?;
        let store = open_store(&settings).await?;
        let client = OllamaClient::new(&settings.ollama)?;
        let generator: Arc<dyn Generator> =
            Arc::new(OllamaGenerator::new(client.clone(), settings.generation.model.clone()));
        let scorer: Option<Arc<dyn RerankScorer>> = settings.rerank.enabled.then(|| {
            let rerank_model = OllamaGenerator::new(client, settings.rerank.model.clone());
            Arc::new(GenerationScorer::new(Arc::new(rerank_model))) as Arc<dyn RerankScorer>
        });
        tracing::info!(
            ollama = %settings.ollama.base_url,
            backend = ?settings.vector_store.backend,
            rerank = settings.rerank.enabled,
            "services ready"
        );
        Ok(Self::from_parts(settings, embedder, store, generator, scorer))
    }

    pub fn from_parts(
        settings: Settings,
        embedder: Arc<dyn Embedder>,
        store: Arc<dyn VectorStore>,
        generator: Arc<dyn Generator>,
        scorer: Option<Arc<dyn RerankScorer>>,
    ) -> Self {
        let mut pipeline = RetrievalPipeline::new(
            embedder.clone(),
            store.clone(),
            LexicalScorer::from_config(&settings.lexical),
            settings.retrieval,
        );
        if let Some(scorer) = scorer {
            pipeline = pipeline.with_reranker(Reranker::new(scorer, settings.rerank.concurrency), settings.rerank.candidates);
        }
        let pipeline = Arc::new(pipeline);
        let ingestor = Ingestor::new(Chunker::new(settings.chunking), embedder, store, settings.embedding.batch_size);
        let answers = AnswerService::new(pipeline.clone(), generator);
        Self { settings, ingestor, answers, pipeline }
    }

    pub fn pipeline(&self) -> &RetrievalPipeline {
        &self.pipeline
    }
}
