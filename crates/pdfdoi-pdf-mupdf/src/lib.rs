use std::path::Path;

use mupdf::{Document, Page, TextBlockType, TextPageFlags};

use pdfdoi_core::{BackendError, BoundingBox, LayoutBackend, LayoutNode, Pages};

/// MuPDF-based implementation of [`LayoutBackend`].
///
/// This crate is the only one that links mupdf (AGPL-3.0), so embedders
/// supplying their own layout trees do not depend on it.
///
/// Each page becomes a container of text blocks, each block a container of
/// lines, each line a container of one text leaf per character. Image
/// blocks are kept as [`LayoutNode::Other`] separators unless disabled.
pub struct MupdfBackend {
    preserve_images: bool,
}

impl Default for MupdfBackend {
    fn default() -> Self {
        Self {
            preserve_images: true,
        }
    }
}

impl MupdfBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether image blocks separate the text around them (default: true).
    pub fn with_images(mut self, preserve: bool) -> Self {
        self.preserve_images = preserve;
        self
    }

    fn flags(&self) -> TextPageFlags {
        if self.preserve_images {
            TextPageFlags::PRESERVE_IMAGES
        } else {
            TextPageFlags::empty()
        }
    }
}

impl LayoutBackend for MupdfBackend {
    fn name(&self) -> &str {
        "mupdf"
    }

    fn open_pages(&self, path: &Path) -> Result<Pages<'_>, BackendError> {
        let path_str = path
            .to_str()
            .ok_or_else(|| BackendError::OpenError("invalid path encoding".into()))?;

        let document =
            Document::open(path_str).map_err(|e| BackendError::OpenError(e.to_string()))?;

        if document
            .needs_password()
            .map_err(|e| BackendError::OpenError(e.to_string()))?
        {
            return Err(BackendError::DecodeUnavailable(
                "document is password protected".into(),
            ));
        }

        let count = document
            .page_count()
            .map_err(|e| BackendError::ExtractionError(e.to_string()))?;
        tracing::debug!(path = %path.display(), pages = count, "opened document");

        Ok(Box::new(MupdfPages {
            document,
            flags: self.flags(),
            next: 0,
            count,
        }))
    }
}

/// Loads and converts one page per `next()` call.
struct MupdfPages {
    document: Document,
    flags: TextPageFlags,
    next: i32,
    count: i32,
}

impl Iterator for MupdfPages {
    type Item = Result<LayoutNode, BackendError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.count {
            return None;
        }
        let index = self.next;
        self.next += 1;

        let page = self
            .document
            .load_page(index)
            .map_err(|e| BackendError::ExtractionError(format!("page {}: {}", index + 1, e)));
        Some(page.and_then(|page| page_layout(&page, self.flags)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = usize::try_from(self.count - self.next).unwrap_or(0);
        (remaining, Some(remaining))
    }
}

/// Convert a page's structured text into a layout tree.
fn page_layout(page: &Page, flags: TextPageFlags) -> Result<LayoutNode, BackendError> {
    let text_page = page
        .to_text_page(flags)
        .map_err(|e| BackendError::ExtractionError(e.to_string()))?;

    let mut blocks = Vec::new();
    for block in text_page.blocks() {
        match block.r#type() {
            TextBlockType::Text => {
                let lines = block
                    .lines()
                    .map(|line| {
                        let leaves = line
                            .chars()
                            .map(|c| {
                                let q = c.quad();
                                LayoutNode::text(
                                    hull([
                                        (q.ul.x, q.ul.y),
                                        (q.ur.x, q.ur.y),
                                        (q.ll.x, q.ll.y),
                                        (q.lr.x, q.lr.y),
                                    ]),
                                    glyph_text(c.char()),
                                )
                            })
                            .collect();
                        LayoutNode::container(leaves)
                    })
                    .collect();
                blocks.push(LayoutNode::container(lines));
            }
            _ => blocks.push(LayoutNode::Other),
        }
    }
    Ok(LayoutNode::container(blocks))
}

/// Axis-aligned box enclosing a (possibly rotated) glyph quad.
fn hull(points: [(f32, f32); 4]) -> BoundingBox {
    let (mut x0, mut y0) = points[0];
    let (mut x1, mut y1) = points[0];
    for &(x, y) in &points[1..] {
        x0 = x0.min(x);
        y0 = y0.min(y);
        x1 = x1.max(x);
        y1 = y1.max(y);
    }
    BoundingBox::new(x0, y0, x1, y1)
}

/// Glyphs without a Unicode mapping become U+FFFD.
fn glyph_text(c: Option<char>) -> String {
    c.unwrap_or('\u{FFFD}').to_string()
}
