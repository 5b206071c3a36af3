//! Prompt template for composing retrieved context with the user question.

use crate::document::SearchResult;
use crate::error::{RagError, Result};

/// Placeholder replaced with the joined context chunks.
const CONTEXT_PLACEHOLDER: &str = "{context}";

/// Placeholder replaced with the raw user question.
const QUESTION_PLACEHOLDER: &str = "{question}";

const DEFAULT_TEMPLATE: &str = "\
Use the following pieces of context to answer the question at the end. \
If you don't know the answer based on the context, just say that you \
don't know, don't try to make up an answer.

Context:
{context}

Question: {question}

Answer:";

/// Renders retrieved chunks and the user question into a single prompt.
///
/// The template must contain the `{context}` and `{question}` placeholders.
/// Retrieved chunk texts are joined with blank lines ("stuff" composition:
/// all retrieved context goes into one prompt).
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self { template: DEFAULT_TEMPLATE.to_string() }
    }
}

impl PromptTemplate {
    /// Create a prompt template from a custom template string.
    ///
    /// # Errors
    ///
    /// Returns [`RagError::Config`] if the template is missing either
    /// placeholder.
    pub fn new(template: impl Into<String>) -> Result<Self> {
        let template = template.into();
        for placeholder in [CONTEXT_PLACEHOLDER, QUESTION_PLACEHOLDER] {
            if !template.contains(placeholder) {
                return Err(RagError::Config(format!(
                    "prompt template is missing the {placeholder} placeholder"
                )));
            }
        }
        Ok(Self { template })
    }

    /// Render the prompt for the given retrieved results and question.
    pub fn render(&self, results: &[SearchResult], question: &str) -> String {
        let context =
            results.iter().map(|r| r.chunk.text.as_str()).collect::<Vec<_>>().join("\n\n");
        self.template
            .replace(CONTEXT_PLACEHOLDER, &context)
            .replace(QUESTION_PLACEHOLDER, question)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use crate::document::Chunk;

    fn result(text: &str) -> SearchResult {
        SearchResult {
            chunk: Chunk {
                id: "c1".to_string(),
                text: text.to_string(),
                embedding: Vec::new(),
                metadata: HashMap::new(),
                document_id: "doc_1".to_string(),
            },
            score: 1.0,
        }
    }

    #[test]
    fn render_includes_context_and_question() {
        let template = PromptTemplate::default();
        let prompt =
            template.render(&[result("Save three months of expenses.")], "What should I save?");
        assert!(prompt.contains("Save three months of expenses."));
        assert!(prompt.contains("Question: What should I save?"));
    }

    #[test]
    fn render_joins_multiple_chunks_with_blank_lines() {
        let template = PromptTemplate::default();
        let prompt = template.render(&[result("first"), result("second")], "q");
        assert!(prompt.contains("first\n\nsecond"));
    }

    #[test]
    fn render_with_no_results_leaves_context_empty() {
        let template = PromptTemplate::new("C:{context} Q:{question}").unwrap();
        assert_eq!(template.render(&[], "why?"), "C: Q:why?");
    }

    #[test]
    fn custom_template_requires_placeholders() {
        let err = PromptTemplate::new("no placeholders here").unwrap_err();
        assert!(matches!(err, RagError::Config(_)));
    }
}
