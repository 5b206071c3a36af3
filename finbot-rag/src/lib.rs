//! # finbot-rag
//!
//! Retrieval-augmented generation (RAG) pipeline for the finbot
//! question-answering service.
//!
//! ## Overview
//!
//! The crate composes four pluggable pieces behind traits:
//!
//! - [`Chunker`] — splits a [`Document`] into overlapping [`Chunk`]s
//! - [`EmbeddingProvider`] — turns text into vectors
//! - [`VectorStore`] — stores chunks and answers top-k similarity searches
//! - [`GenerationProvider`] — synthesizes an answer from a composed prompt
//!
//! [`QaPipeline`] wires them together: ingest (chunk → embed → store) at
//! startup, then answer (embed → retrieve → prompt → generate) per query.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use finbot_rag::{
//!     FixedSizeChunker, InMemoryVectorStore, OpenAIChatProvider,
//!     OpenAIEmbeddingProvider, QaPipeline, RagConfig,
//! };
//!
//! let config = RagConfig::builder().chunk_size(400).chunk_overlap(50).top_k(3).build()?;
//! let pipeline = QaPipeline::builder()
//!     .config(config)
//!     .embedding_provider(Arc::new(OpenAIEmbeddingProvider::from_env()?))
//!     .generation_provider(Arc::new(OpenAIChatProvider::from_env()?))
//!     .vector_store(Arc::new(InMemoryVectorStore::new()))
//!     .chunker(Arc::new(FixedSizeChunker::new(400, 50)))
//!     .build()?;
//!
//! pipeline.create_collection("docs").await?;
//! pipeline.ingest("docs", &document).await?;
//! let answer = pipeline.answer("docs", "What is an emergency fund?").await?;
//! ```

pub mod chunking;
pub mod config;
pub mod document;
pub mod embedding;
pub mod error;
pub mod generation;
pub mod inmemory;
pub mod openai;
pub mod pipeline;
pub mod prompt;
pub mod vectorstore;

pub use chunking::{Chunker, FixedSizeChunker};
pub use config::{RagConfig, RagConfigBuilder};
pub use document::{Chunk, Document, SearchResult};
pub use embedding::EmbeddingProvider;
pub use error::{RagError, Result};
pub use generation::GenerationProvider;
pub use inmemory::InMemoryVectorStore;
pub use openai::{OpenAIChatProvider, OpenAIEmbeddingProvider};
pub use pipeline::{QaAnswer, QaPipeline, QaPipelineBuilder};
pub use prompt::PromptTemplate;
pub use vectorstore::VectorStore;
