//! Question-answering pipeline orchestrator.
//!
//! The [`QaPipeline`] coordinates the full ingest-and-answer workflow by
//! composing an [`EmbeddingProvider`], a [`GenerationProvider`], a
//! [`VectorStore`], a [`Chunker`], and a [`PromptTemplate`].
//!
//! # Example
//!
//! ```rust,ignore
//! use finbot_rag::{QaPipeline, RagConfig, InMemoryVectorStore, FixedSizeChunker};
//!
//! let pipeline = QaPipeline::builder()
//!     .config(RagConfig::default())
//!     .embedding_provider(Arc::new(my_embedder))
//!     .generation_provider(Arc::new(my_llm))
//!     .vector_store(Arc::new(InMemoryVectorStore::new()))
//!     .chunker(Arc::new(FixedSizeChunker::new(400, 50)))
//!     .build()?;
//!
//! pipeline.create_collection("docs").await?;
//! pipeline.ingest("docs", &document).await?;
//! let answer = pipeline.answer("docs", "What is compound interest?").await?;
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::chunking::Chunker;
use crate::config::RagConfig;
use crate::document::{Chunk, Document, SearchResult};
use crate::embedding::EmbeddingProvider;
use crate::error::{RagError, Result};
use crate::generation::GenerationProvider;
use crate::prompt::PromptTemplate;
use crate::vectorstore::VectorStore;

/// A generated answer together with the retrieved context that produced it.
///
/// Only the `answer` field is surfaced over HTTP; `sources` is available for
/// callers that want to inspect or display the supporting chunks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QaAnswer {
    /// The answer synthesized by the generation provider.
    pub answer: String,
    /// The chunks retrieved as context for the answer.
    pub sources: Vec<SearchResult>,
}

/// The question-answering pipeline orchestrator.
///
/// Coordinates document ingestion (chunk → embed → store) and answer
/// synthesis (embed → search → prompt → generate). Construct one via
/// [`QaPipeline::builder()`]; once built the pipeline is immutable and can be
/// shared across request handlers behind an `Arc`.
pub struct QaPipeline {
    config: RagConfig,
    embedding_provider: Arc<dyn EmbeddingProvider>,
    generation_provider: Arc<dyn GenerationProvider>,
    vector_store: Arc<dyn VectorStore>,
    chunker: Arc<dyn Chunker>,
    prompt: PromptTemplate,
}

impl QaPipeline {
    /// Create a new [`QaPipelineBuilder`].
    pub fn builder() -> QaPipelineBuilder {
        QaPipelineBuilder::default()
    }

    /// Return a reference to the pipeline configuration.
    pub fn config(&self) -> &RagConfig {
        &self.config
    }

    /// Create a named collection in the vector store.
    ///
    /// The collection is created with the dimensionality reported by the
    /// configured [`EmbeddingProvider`].
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Pipeline`] if the vector store operation fails.
    pub async fn create_collection(&self, name: &str) -> Result<()> {
        let dimensions = self.embedding_provider.dimensions();
        self.vector_store.create_collection(name, dimensions).await.map_err(|e| {
            error!(collection = name, error = %e, "failed to create collection");
            RagError::Pipeline(format!("failed to create collection '{name}': {e}"))
        })
    }

    /// Ingest a single document: chunk → embed → store.
    ///
    /// Embeddings for all chunks are requested in one batched call. Returns
    /// the chunks that were stored (with embeddings attached).
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Pipeline`] if embedding or storage fails,
    /// including the document ID in the error message.
    pub async fn ingest(&self, collection: &str, document: &Document) -> Result<Vec<Chunk>> {
        let mut chunks = self.chunker.chunk(document);
        if chunks.is_empty() {
            info!(document.id = %document.id, chunk_count = 0, "ingested document (empty)");
            return Ok(chunks);
        }

        let texts: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();

        let embeddings = self.embedding_provider.embed_batch(&texts).await.map_err(|e| {
            error!(document.id = %document.id, error = %e, "embedding failed during ingestion");
            RagError::Pipeline(format!("embedding failed for document '{}': {e}", document.id))
        })?;

        for (chunk, embedding) in chunks.iter_mut().zip(embeddings) {
            chunk.embedding = embedding;
        }

        self.vector_store.upsert(collection, &chunks).await.map_err(|e| {
            error!(document.id = %document.id, error = %e, "upsert failed during ingestion");
            RagError::Pipeline(format!("upsert failed for document '{}': {e}", document.id))
        })?;

        let chunk_count = chunks.len();
        info!(document.id = %document.id, chunk_count, "ingested document");

        Ok(chunks)
    }

    /// Retrieve context for a query: embed → search → filter by threshold.
    ///
    /// Returns at most `top_k` results ordered by descending relevance score.
    /// Results below the configured `similarity_threshold` are filtered out.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Pipeline`] if embedding or search fails.
    pub async fn retrieve(&self, collection: &str, query: &str) -> Result<Vec<SearchResult>> {
        let query_embedding = self.embedding_provider.embed(query).await.map_err(|e| {
            error!(error = %e, "embedding failed during retrieval");
            RagError::Pipeline(format!("query embedding failed: {e}"))
        })?;

        let results = self
            .vector_store
            .search(collection, &query_embedding, self.config.top_k)
            .await
            .map_err(|e| {
                error!(collection, error = %e, "vector store search failed");
                RagError::Pipeline(format!("search failed in collection '{collection}': {e}"))
            })?;

        let threshold = self.config.similarity_threshold;
        let filtered: Vec<SearchResult> =
            results.into_iter().filter(|r| r.score >= threshold).collect();

        info!(result_count = filtered.len(), "retrieval completed");

        Ok(filtered)
    }

    /// Answer a query: retrieve context, compose the prompt, generate.
    ///
    /// The two provider calls are sequential because generation depends on
    /// the retrieved context. Nothing is cached between calls.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Pipeline`] if retrieval or generation fails.
    pub async fn answer(&self, collection: &str, query: &str) -> Result<QaAnswer> {
        let sources = self.retrieve(collection, query).await?;

        let prompt = self.prompt.render(&sources, query);

        let answer = self.generation_provider.generate(&prompt).await.map_err(|e| {
            error!(error = %e, "answer generation failed");
            RagError::Pipeline(format!("answer generation failed: {e}"))
        })?;

        info!(source_count = sources.len(), answer_len = answer.len(), "answered query");

        Ok(QaAnswer { answer, sources })
    }
}

/// Builder for constructing a [`QaPipeline`].
///
/// All fields except `prompt` are required; `prompt` defaults to
/// [`PromptTemplate::default()`]. Call [`build()`](QaPipelineBuilder::build)
/// to validate and produce the pipeline.
#[derive(Default)]
pub struct QaPipelineBuilder {
    config: Option<RagConfig>,
    embedding_provider: Option<Arc<dyn EmbeddingProvider>>,
    generation_provider: Option<Arc<dyn GenerationProvider>>,
    vector_store: Option<Arc<dyn VectorStore>>,
    chunker: Option<Arc<dyn Chunker>>,
    prompt: Option<PromptTemplate>,
}

impl QaPipelineBuilder {
    /// Set the pipeline configuration.
    pub fn config(mut self, config: RagConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set the embedding provider.
    pub fn embedding_provider(mut self, provider: Arc<dyn EmbeddingProvider>) -> Self {
        self.embedding_provider = Some(provider);
        self
    }

    /// Set the generation provider.
    pub fn generation_provider(mut self, provider: Arc<dyn GenerationProvider>) -> Self {
        self.generation_provider = Some(provider);
        self
    }

    /// Set the vector store backend.
    pub fn vector_store(mut self, store: Arc<dyn VectorStore>) -> Self {
        self.vector_store = Some(store);
        self
    }

    /// Set the document chunker.
    pub fn chunker(mut self, chunker: Arc<dyn Chunker>) -> Self {
        self.chunker = Some(chunker);
        self
    }

    /// Set a custom prompt template.
    pub fn prompt(mut self, prompt: PromptTemplate) -> Self {
        self.prompt = Some(prompt);
        self
    }

    /// Build the [`QaPipeline`], validating that all required fields are set.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if any required field is missing.
    pub fn build(self) -> Result<QaPipeline> {
        let config =
            self.config.ok_or_else(|| RagError::Config("config is required".to_string()))?;
        let embedding_provider = self
            .embedding_provider
            .ok_or_else(|| RagError::Config("embedding_provider is required".to_string()))?;
        let generation_provider = self
            .generation_provider
            .ok_or_else(|| RagError::Config("generation_provider is required".to_string()))?;
        let vector_store = self
            .vector_store
            .ok_or_else(|| RagError::Config("vector_store is required".to_string()))?;
        let chunker =
            self.chunker.ok_or_else(|| RagError::Config("chunker is required".to_string()))?;

        Ok(QaPipeline {
            config,
            embedding_provider,
            generation_provider,
            vector_store,
            chunker,
            prompt: self.prompt.unwrap_or_default(),
        })
    }
}
