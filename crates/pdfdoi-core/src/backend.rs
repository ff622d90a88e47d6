use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::layout::LayoutNode;

/// Error type for layout backend operations.
#[derive(Error, Debug)]
pub enum BackendError {
    #[error("failed to open document: {0}")]
    OpenError(String),
    #[error("document text is not extractable: {0}")]
    DecodeUnavailable(String),
    #[error("failed to extract page layout: {0}")]
    ExtractionError(String),
}

/// Lazily decoded pages of one document, each a root [`LayoutNode::Container`].
pub type Pages<'a> = Box<dyn Iterator<Item = Result<LayoutNode, BackendError>> + 'a>;

/// Trait for document decoding backends.
///
/// Implementors turn a document on disk into per-page layout trees; block
/// reconstruction and identifier extraction live in [`crate::scan::Scanner`].
pub trait LayoutBackend: Send + Sync {
    /// Short name used in log output.
    fn name(&self) -> &str;

    /// Open `path` and return its pages in order.
    ///
    /// Pages must be decoded only as the iterator is advanced.
    fn open_pages(&self, path: &Path) -> Result<Pages<'_>, BackendError>;
}

/// Backend serving pre-built layout trees, keyed by path.
///
/// Useful for tests and for callers that obtain layout from elsewhere.
#[derive(Debug, Default)]
pub struct MemoryBackend {
    documents: HashMap<PathBuf, Option<Vec<LayoutNode>>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a document made of `pages`.
    pub fn with_document(mut self, path: impl Into<PathBuf>, pages: Vec<LayoutNode>) -> Self {
        self.documents.insert(path.into(), Some(pages));
        self
    }

    /// Register a document whose text cannot be extracted.
    pub fn with_protected_document(mut self, path: impl Into<PathBuf>) -> Self {
        self.documents.insert(path.into(), None);
        self
    }
}

impl LayoutBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    fn open_pages(&self, path: &Path) -> Result<Pages<'_>, BackendError> {
        match self.documents.get(path) {
            Some(Some(pages)) => Ok(Box::new(pages.iter().cloned().map(Ok))),
            Some(None) => Err(BackendError::DecodeUnavailable(format!(
                "{} is protected",
                path.display()
            ))),
            None => Err(BackendError::OpenError(format!(
                "{}: no such document",
                path.display()
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_path_is_open_error() {
        let backend = MemoryBackend::new();
        let err = backend.open_pages(Path::new("missing.pdf")).err();
        assert!(matches!(err, Some(BackendError::OpenError(_))));
    }

    #[test]
    fn protected_document_is_decode_unavailable() {
        let backend = MemoryBackend::new().with_protected_document("locked.pdf");
        let err = backend.open_pages(Path::new("locked.pdf")).err();
        assert!(matches!(err, Some(BackendError::DecodeUnavailable(_))));
    }

    #[test]
    fn pages_come_back_in_order() {
        let backend = MemoryBackend::new().with_document(
            "a.pdf",
            vec![LayoutNode::container(vec![]), LayoutNode::Other],
        );
        let pages: Vec<_> = backend
            .open_pages(Path::new("a.pdf"))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(pages, vec![LayoutNode::container(vec![]), LayoutNode::Other]);
    }
}
