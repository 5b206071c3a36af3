//! Startup knowledge loading with a built-in fallback document.

use std::path::Path;

use finbot_rag::Document;
use tracing::{info, warn};

/// Built-in placeholder used when the knowledge document cannot be read.
/// Keeps the service answering (degraded) instead of failing startup.
pub const FALLBACK_TEXT: &str = "\
Financial literacy is the ability to understand and use money skills \
effectively. A budget compares monthly income against spending so that \
saving happens on purpose rather than by accident. An emergency fund of \
three to six months of living expenses protects against job loss or \
unexpected bills. Compound interest makes early, regular saving far more \
powerful than larger amounts saved later. High-interest debt, such as \
credit card balances, should usually be paid down before investing. \
Diversification spreads investments across many assets so that no single \
failure is ruinous.";

/// Where the knowledge document came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnowledgeSource {
    /// Loaded from the configured file.
    File,
    /// The file was missing or unreadable; the built-in placeholder is used.
    Fallback,
}

impl KnowledgeSource {
    /// True when the service is running on the built-in placeholder text.
    pub fn is_fallback(self) -> bool {
        matches!(self, Self::Fallback)
    }
}

/// Load the knowledge document from `path`.
///
/// A missing or unreadable file is a deliberate degraded mode, not an error:
/// it logs a warning and substitutes [`FALLBACK_TEXT`] so startup always
/// succeeds.
pub fn load_document(path: &Path) -> (Document, KnowledgeSource) {
    match std::fs::read_to_string(path) {
        Ok(text) => {
            info!(path = %path.display(), bytes = text.len(), "loaded knowledge document");
            let mut document = Document::new("financial_literacy", text);
            document.source_uri = Some(path.display().to_string());
            (document, KnowledgeSource::File)
        }
        Err(e) => {
            warn!(
                path = %path.display(),
                error = %e,
                "knowledge document unavailable, falling back to built-in text"
            );
            (Document::new("financial_literacy", FALLBACK_TEXT), KnowledgeSource::Fallback)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    #[test]
    fn missing_file_falls_back_to_builtin_text() {
        let (document, source) = load_document(Path::new("does/not/exist.txt"));
        assert!(source.is_fallback());
        assert_eq!(document.text, FALLBACK_TEXT);
        assert!(document.source_uri.is_none());
    }

    #[test]
    fn existing_file_is_loaded_verbatim() {
        let path = PathBuf::from(std::env::temp_dir())
            .join(format!("finbot_knowledge_{}.txt", std::process::id()));
        std::fs::write(&path, "saving beats spending").unwrap();

        let (document, source) = load_document(&path);
        std::fs::remove_file(&path).ok();

        assert_eq!(source, KnowledgeSource::File);
        assert_eq!(document.text, "saving beats spending");
        assert_eq!(document.source_uri.as_deref(), Some(path.display().to_string().as_str()));
    }
}
