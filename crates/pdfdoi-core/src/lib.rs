//! Locate the DOI or arXiv ID printed on the first pages of an article.
//!
//! Pipeline:
//! 1. A [`LayoutBackend`] decodes a document into per-page [`LayoutNode`] trees
//! 2. [`blocks::reconstruct`] glues fragmented text back into logical blocks
//! 3. [`IdentifierExtractor`] repairs known mojibake and matches identifiers
//! 4. [`Scanner`] stops at the first identifier within `max_pages` pages

pub mod backend;
pub mod blocks;
pub mod citation;
pub mod config;
pub mod config_file;
pub mod identifiers;
pub mod layout;
pub mod scan;

pub use backend::{BackendError, LayoutBackend, MemoryBackend, Pages};
pub use blocks::{TextBlocks, reconstruct};
pub use citation::{CitationError, CitationSource, CrossRef};
pub use config::{ConfigError, ListOverride, ScanConfig, ScanConfigBuilder};
pub use identifiers::{Identifier, IdentifierExtractor, Identifiers, extract_identifiers};
pub use layout::{BoundingBox, LayoutNode};
pub use scan::{ScanError, Scanner};
