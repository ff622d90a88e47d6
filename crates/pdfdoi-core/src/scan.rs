//! First-hit identifier search over the leading pages of a document.

use std::path::Path;

use thiserror::Error;

use crate::backend::{BackendError, LayoutBackend};
use crate::blocks::reconstruct;
use crate::config::ScanConfig;
use crate::identifiers::{Identifier, IdentifierExtractor};
use crate::layout::LayoutNode;

#[derive(Error, Debug)]
pub enum ScanError {
    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Drives block reconstruction and identifier extraction page by page.
#[derive(Debug, Clone)]
pub struct Scanner {
    config: ScanConfig,
    extractor: IdentifierExtractor,
}

impl Default for Scanner {
    fn default() -> Self {
        Self::new(ScanConfig::default())
    }
}

impl Scanner {
    pub fn new(config: ScanConfig) -> Self {
        let extractor = config.extractor();
        Self { config, extractor }
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Return the first identifier on the first `max_pages` pages.
    ///
    /// Stops pulling pages as soon as an identifier is found. A page that
    /// fails to decode aborts the scan with its error.
    pub fn scan_pages<I>(&self, pages: I) -> Result<Option<Identifier>, BackendError>
    where
        I: IntoIterator<Item = Result<LayoutNode, BackendError>>,
    {
        for (index, page) in pages.into_iter().take(self.config.max_pages).enumerate() {
            let page = page?;
            if let Some(id) = self.scan_page(&page) {
                tracing::debug!(page = index + 1, id = %id, "identifier found");
                return Ok(Some(id));
            }
            tracing::trace!(page = index + 1, "no identifier on page");
        }
        Ok(None)
    }

    /// Return the first identifier in a single page tree.
    pub fn scan_page(&self, page: &LayoutNode) -> Option<Identifier> {
        reconstruct(page, self.config.tolerance)
            .find_map(|block| self.extractor.extract(&block).next())
    }

    /// Open `path` with `backend` and scan it.
    ///
    /// Documents the backend cannot extract text from yield `Ok(None)`.
    pub fn scan_path(
        &self,
        backend: &dyn LayoutBackend,
        path: &Path,
    ) -> Result<Option<Identifier>, ScanError> {
        if self.config.max_pages == 0 {
            return Ok(None);
        }
        let pages = match backend.open_pages(path) {
            Ok(pages) => pages,
            Err(BackendError::DecodeUnavailable(reason)) => {
                tracing::info!(
                    backend = backend.name(),
                    path = %path.display(),
                    reason = %reason,
                    "document is not extractable, skipping"
                );
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };
        Ok(self.scan_pages(pages)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScanConfigBuilder;
    use crate::layout::BoundingBox;

    fn line(words: &[&str]) -> LayoutNode {
        let mut x = 0.0;
        let leaves = words
            .iter()
            .map(|w| {
                let width = 5.0 * w.len() as f32;
                let node = LayoutNode::text(BoundingBox::new(x, 0.0, x + width, 10.0), *w);
                x += width;
                node
            })
            .collect();
        LayoutNode::container(vec![LayoutNode::container(leaves)])
    }

    #[test]
    fn finds_doi_split_over_fragments() {
        let page = line(&["Journal ", "doi:10.", "1000/", "abc."]);
        let scanner = Scanner::default();
        assert_eq!(scanner.scan_page(&page), Some(Identifier::Doi("10.1000/abc".into())));
    }

    #[test]
    fn doi_wins_over_arxiv_in_the_same_block() {
        let page = line(&["arXiv:2101.00001 ", "doi:10.1000/abc"]);
        assert_eq!(
            Scanner::default().scan_page(&page),
            Some(Identifier::Doi("10.1000/abc".into()))
        );
    }

    #[test]
    fn earlier_block_wins_regardless_of_kind() {
        let page = LayoutNode::container(vec![line(&["arXiv:2101.00001"]), line(&["doi:10.1/x"])]);
        assert_eq!(
            Scanner::default().scan_page(&page),
            Some(Identifier::Arxiv("2101.00001".into()))
        );
    }

    #[test]
    fn max_pages_bounds_the_search() {
        let pages = || {
            vec![
                Ok(line(&["nothing"])),
                Ok(line(&["nothing"])),
                Ok(line(&["doi:10.1/late"])),
            ]
        };
        let scanner = Scanner::new(ScanConfigBuilder::new().max_pages(2).build().unwrap());
        assert_eq!(scanner.scan_pages(pages()).unwrap(), None);

        let scanner = Scanner::new(ScanConfigBuilder::new().max_pages(3).build().unwrap());
        assert_eq!(
            scanner.scan_pages(pages()).unwrap(),
            Some(Identifier::Doi("10.1/late".into()))
        );
    }

    #[test]
    fn page_error_surfaces() {
        let pages = vec![
            Ok(line(&["nothing"])),
            Err(BackendError::ExtractionError("bad page".into())),
        ];
        let result = Scanner::default().scan_pages(pages);
        assert!(matches!(result, Err(BackendError::ExtractionError(_))));
    }

    #[test]
    fn zero_pages_is_not_found() {
        let pages: Vec<Result<LayoutNode, BackendError>> = vec![];
        assert_eq!(Scanner::default().scan_pages(pages).unwrap(), None);
    }
}
