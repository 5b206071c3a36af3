//! Generation provider trait for synthesizing answers from prompts.

use async_trait::async_trait;

use crate::error::Result;

/// A provider that generates text from a prompt.
///
/// This is the capability seam for the answer-synthesis step: the pipeline
/// composes retrieved context and the user question into a single prompt and
/// hands it to whichever backend implements this trait. Swapping vendors is
/// a matter of passing a different implementation to the pipeline builder.
#[async_trait]
pub trait GenerationProvider: Send + Sync {
    /// Generate a completion for the given prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;
}
