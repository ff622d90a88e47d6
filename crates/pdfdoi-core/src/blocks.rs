//! Reassemble logical text blocks from fragmented layout trees.
//!
//! PDF producers split text arbitrarily: a word may arrive as one fragment
//! per glyph, and a line may be cut wherever the font or kerning changes.
//! [`reconstruct`] glues consecutive sibling fragments back together when the
//! horizontal gap between them is small relative to the preceding fragment,
//! and emits a block boundary wherever the gap is too wide, a non-text node
//! intervenes, or a container starts or ends.

use std::mem;
use std::slice;

use crate::layout::{BoundingBox, LayoutNode};

/// Lazily reconstruct the text blocks of `node` in document order.
///
/// `tolerance` scales the smaller dimension of the preceding fragment to give
/// the widest gap still treated as a continuation. Every call starts a fresh
/// single forward pass.
pub fn reconstruct(node: &LayoutNode, tolerance: f32) -> TextBlocks<'_> {
    TextBlocks {
        tolerance,
        stack: vec![Frame::new(slice::from_ref(node))],
    }
}

/// Iterator returned by [`reconstruct`].
///
/// Walks the tree depth-first with one [`Frame`] per open container, so a
/// container's pending text never mixes with its parent's.
#[derive(Debug)]
pub struct TextBlocks<'a> {
    tolerance: f32,
    stack: Vec<Frame<'a>>,
}

#[derive(Debug)]
struct Frame<'a> {
    children: slice::Iter<'a, LayoutNode>,
    buffer: String,
    prev: Option<&'a LayoutNode>,
}

impl<'a> Frame<'a> {
    fn new(children: &'a [LayoutNode]) -> Self {
        Self {
            children: children.iter(),
            buffer: String::new(),
            prev: None,
        }
    }

    fn flush(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(mem::take(&mut self.buffer))
        }
    }
}

impl Iterator for TextBlocks<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            let frame = self.stack.last_mut()?;

            let Some(child) = frame.children.next() else {
                let mut finished = self.stack.pop()?;
                if let Some(block) = finished.flush() {
                    return Some(block);
                }
                continue;
            };

            let prev = frame.prev.replace(child);
            match child {
                LayoutNode::Text { bbox, content } => {
                    let split = match prev {
                        Some(LayoutNode::Text { bbox: prev_bbox, .. }) => {
                            breaks_continuation(prev_bbox, bbox, self.tolerance)
                        }
                        _ => false,
                    };
                    let block = if split { frame.flush() } else { None };
                    frame.buffer.push_str(content);
                    if block.is_some() {
                        return block;
                    }
                }
                LayoutNode::Container { children } => {
                    let pending = frame.flush();
                    self.stack.push(Frame::new(children));
                    if pending.is_some() {
                        return pending;
                    }
                }
                LayoutNode::Other => {
                    if let Some(block) = frame.flush() {
                        return Some(block);
                    }
                }
            }
        }
    }
}

/// Whether `current` is too far from `prev` to continue its block.
///
/// Malformed geometry on either side always breaks the block.
fn breaks_continuation(prev: &BoundingBox, current: &BoundingBox, tolerance: f32) -> bool {
    if !prev.is_well_formed() || !current.is_well_formed() {
        tracing::trace!(?prev, ?current, "malformed fragment geometry, splitting block");
        return true;
    }
    let gap = current.hdistance(prev);
    let threshold = tolerance * prev.width().min(prev.height());
    gap > threshold
}
