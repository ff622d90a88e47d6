//! Positioned text model produced by a [`LayoutBackend`](crate::LayoutBackend).
//!
//! A page is a tree: [`LayoutNode::Container`] groups children in document
//! order, [`LayoutNode::Text`] carries a fragment of text with its bounding
//! box, and [`LayoutNode::Other`] marks a non-text primitive (image, rule,
//! curve) whose geometry is irrelevant.

/// Axis-aligned bounding box in page units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub x0: f32,
    pub y0: f32,
    pub x1: f32,
    pub y1: f32,
}

impl BoundingBox {
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> f32 {
        (self.x1 - self.x0).max(0.0)
    }

    pub fn height(&self) -> f32 {
        (self.y1 - self.y0).max(0.0)
    }

    /// All coordinates finite and not inverted.
    pub fn is_well_formed(&self) -> bool {
        [self.x0, self.y0, self.x1, self.y1]
            .iter()
            .all(|v| v.is_finite())
            && self.x1 >= self.x0
            && self.y1 >= self.y0
    }

    /// Horizontal gap between two boxes; zero when their x-projections overlap.
    pub fn hdistance(&self, other: &BoundingBox) -> f32 {
        if self.x0 <= other.x1 && other.x0 <= self.x1 {
            0.0
        } else {
            (self.x0 - other.x1).abs().min((self.x1 - other.x0).abs())
        }
    }
}

/// A node in a page's layout tree.
#[derive(Debug, Clone, PartialEq)]
pub enum LayoutNode {
    /// Atomic text-bearing fragment.
    Text { bbox: BoundingBox, content: String },
    /// Grouping node (text line, text block, page) visited in order.
    Container { children: Vec<LayoutNode> },
    /// Non-text primitive; always separates text on either side.
    Other,
}

impl LayoutNode {
    pub fn text(bbox: BoundingBox, content: impl Into<String>) -> Self {
        LayoutNode::Text {
            bbox,
            content: content.into(),
        }
    }

    pub fn container(children: Vec<LayoutNode>) -> Self {
        LayoutNode::Container { children }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, LayoutNode::Text { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn width_and_height_are_non_negative() {
        let b = BoundingBox::new(10.0, 5.0, 2.0, 1.0);
        assert_eq!(b.width(), 0.0);
        assert_eq!(b.height(), 0.0);
        assert!(!b.is_well_formed());
    }

    #[test]
    fn hdistance_disjoint_boxes() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(13.0, 0.0, 23.0, 10.0);
        assert_eq!(a.hdistance(&b), 3.0);
        assert_eq!(b.hdistance(&a), 3.0);
    }

    #[test]
    fn hdistance_overlapping_is_zero() {
        let a = BoundingBox::new(0.0, 0.0, 10.0, 10.0);
        let b = BoundingBox::new(8.0, 50.0, 20.0, 60.0);
        assert_eq!(a.hdistance(&b), 0.0);
    }

    #[test]
    fn non_finite_box_is_malformed() {
        assert!(!BoundingBox::new(0.0, 0.0, f32::NAN, 1.0).is_well_formed());
        assert!(!BoundingBox::new(f32::NEG_INFINITY, 0.0, 1.0, 1.0).is_well_formed());
        assert!(BoundingBox::new(0.0, 0.0, 0.0, 0.0).is_well_formed());
    }
}
