//! End-to-end pipeline tests with deterministic mock providers.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use finbot_rag::{
    Document, EmbeddingProvider, FixedSizeChunker, GenerationProvider, InMemoryVectorStore,
    PromptTemplate, QaPipeline, RagConfig, RagError,
};

/// Deterministic hash-based embeddings so tests need no API keys.
struct HashEmbeddingProvider {
    dimensions: usize,
    calls: AtomicUsize,
}

impl HashEmbeddingProvider {
    fn new(dimensions: usize) -> Self {
        Self { dimensions, calls: AtomicUsize::new(0) }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for HashEmbeddingProvider {
    async fn embed(&self, text: &str) -> finbot_rag::Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let hash = text.bytes().fold(0u64, |acc, b| acc.wrapping_mul(31).wrapping_add(b as u64));
        let mut emb = vec![0.0f32; self.dimensions];
        for (i, v) in emb.iter_mut().enumerate() {
            *v = ((hash.wrapping_add(i as u64)) as f32).sin();
        }
        let norm: f32 = emb.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            emb.iter_mut().for_each(|x| *x /= norm);
        }
        Ok(emb)
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }
}

/// Echoes the prompt it received, or fails on demand.
struct EchoGenerationProvider {
    fail: bool,
}

#[async_trait::async_trait]
impl GenerationProvider for EchoGenerationProvider {
    async fn generate(&self, prompt: &str) -> finbot_rag::Result<String> {
        if self.fail {
            return Err(RagError::Generation {
                provider: "Echo".into(),
                message: "simulated outage".into(),
            });
        }
        Ok(format!("ANSWER[{prompt}]"))
    }
}

fn build_pipeline(
    embedder: Arc<HashEmbeddingProvider>,
    fail_generation: bool,
) -> QaPipeline {
    let config = RagConfig::builder()
        .chunk_size(120)
        .chunk_overlap(20)
        .top_k(3)
        .similarity_threshold(-1.0)
        .build()
        .unwrap();

    QaPipeline::builder()
        .config(config)
        .embedding_provider(embedder)
        .generation_provider(Arc::new(EchoGenerationProvider { fail: fail_generation }))
        .vector_store(Arc::new(InMemoryVectorStore::new()))
        .chunker(Arc::new(FixedSizeChunker::new(120, 20)))
        .prompt(PromptTemplate::new("context<{context}> question<{question}>").unwrap())
        .build()
        .unwrap()
}

fn sample_document() -> Document {
    Document::new(
        "financial_literacy",
        "An emergency fund covers three to six months of living expenses. \
         Compound interest means interest earned on interest over time. \
         Diversification spreads investment risk across many assets. \
         A budget tracks income against spending every month. \
         Paying off high-interest debt first usually saves the most money. \
         A credit score reflects how reliably someone has repaid borrowed money. \
         Index funds offer broad market exposure at low cost. \
         Insurance transfers the cost of rare but severe events to an insurer.",
    )
}

#[tokio::test]
async fn ingest_then_answer_returns_generated_text() {
    let embedder = Arc::new(HashEmbeddingProvider::new(32));
    let pipeline = build_pipeline(embedder, false);

    pipeline.create_collection("docs").await.unwrap();
    let chunks = pipeline.ingest("docs", &sample_document()).await.unwrap();
    assert!(!chunks.is_empty());

    let result = pipeline.answer("docs", "What is an emergency fund?").await.unwrap();
    assert!(result.answer.starts_with("ANSWER["));
    assert!(result.answer.contains("question<What is an emergency fund?>"));
    assert!(!result.sources.is_empty());
}

#[tokio::test]
async fn retrieval_is_bounded_by_top_k() {
    let embedder = Arc::new(HashEmbeddingProvider::new(32));
    let pipeline = build_pipeline(embedder, false);

    pipeline.create_collection("docs").await.unwrap();
    let chunks = pipeline.ingest("docs", &sample_document()).await.unwrap();
    assert!(chunks.len() > 3, "sample document should produce more than top_k chunks");

    let results = pipeline.retrieve("docs", "interest").await.unwrap();
    assert!(results.len() <= 3);
    assert_eq!(results.len(), 3);
}

#[tokio::test]
async fn retrieval_returns_fewer_when_index_is_smaller_than_top_k() {
    let embedder = Arc::new(HashEmbeddingProvider::new(32));
    let pipeline = build_pipeline(embedder, false);

    pipeline.create_collection("docs").await.unwrap();
    pipeline.ingest("docs", &Document::new("tiny", "one short note")).await.unwrap();

    let results = pipeline.retrieve("docs", "note").await.unwrap();
    assert_eq!(results.len(), 1);
}

#[tokio::test]
async fn answer_embeds_the_query_exactly_once() {
    let embedder = Arc::new(HashEmbeddingProvider::new(32));
    let pipeline = build_pipeline(embedder.clone(), false);

    pipeline.create_collection("docs").await.unwrap();
    pipeline.ingest("docs", &sample_document()).await.unwrap();

    let after_ingest = embedder.calls.load(Ordering::SeqCst);
    pipeline.answer("docs", "budgeting?").await.unwrap();
    assert_eq!(embedder.calls.load(Ordering::SeqCst), after_ingest + 1);
}

#[tokio::test]
async fn generation_failure_propagates_as_pipeline_error() {
    let embedder = Arc::new(HashEmbeddingProvider::new(32));
    let pipeline = build_pipeline(embedder, true);

    pipeline.create_collection("docs").await.unwrap();
    pipeline.ingest("docs", &sample_document()).await.unwrap();

    let err = pipeline.answer("docs", "anything").await.unwrap_err();
    assert!(matches!(err, RagError::Pipeline(_)));
    assert!(err.to_string().contains("generation"));
}

#[tokio::test]
async fn ingesting_empty_document_is_a_no_op() {
    let embedder = Arc::new(HashEmbeddingProvider::new(32));
    let pipeline = build_pipeline(embedder.clone(), false);

    pipeline.create_collection("docs").await.unwrap();
    let chunks = pipeline.ingest("docs", &Document::new("empty", "")).await.unwrap();
    assert!(chunks.is_empty());
    assert_eq!(embedder.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn builder_rejects_missing_components() {
    let err = QaPipeline::builder().config(RagConfig::default()).build().err();
    assert!(matches!(err, Some(RagError::Config(_))));
}
