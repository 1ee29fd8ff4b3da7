/// Canvas geometry shared by zones and groups.
///
/// Node rectangles are a pure function of a node's position and its size, where
/// the size comes from a [`NodeSizeProvider`]. The canvas renderer measures
/// nodes; the core only sees the measured value (if any) and a fallback.
use serde::{Deserialize, Serialize};

use crate::graph::SequenceNode;

/// Position in canvas space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    pub fn new(x: f64, y: f64) -> Self {
        Position { x, y }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    /// Return this position shifted by (dx, dy)
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Position::new(self.x + dx, self.y + dy)
    }
}

impl Default for Position {
    fn default() -> Self {
        Position { x: 0.0, y: 0.0 }
    }
}

/// Width and height of a node rectangle
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Size { width, height }
    }

    /// A usable size: finite and non-negative on both axes
    pub fn is_valid(&self) -> bool {
        self.width.is_finite() && self.height.is_finite() && self.width >= 0.0 && self.height >= 0.0
    }
}

/// Axis-aligned rectangle in canvas space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl BoundingBox {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        BoundingBox {
            x,
            y,
            width,
            height,
        }
    }

    pub fn from_origin_size(origin: Position, size: Size) -> Self {
        BoundingBox::new(origin.x, origin.y, size.width, size.height)
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    pub fn center(&self) -> Position {
        Position::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Edges are inclusive: a point on the border is inside.
    pub fn contains(&self, point: Position) -> bool {
        point.x >= self.x && point.x <= self.right() && point.y >= self.y && point.y <= self.bottom()
    }

    /// Grow the rectangle by `padding` on every side
    pub fn padded(&self, padding: f64) -> Self {
        BoundingBox::new(
            self.x - padding,
            self.y - padding,
            self.width + padding * 2.0,
            self.height + padding * 2.0,
        )
    }
}

/// Supplies the size used for a node's rectangle.
///
/// Implementations typically return the renderer's measured size and fall back
/// to a fixed default for nodes that have not been measured yet.
pub trait NodeSizeProvider {
    fn size_of(&self, node: &SequenceNode) -> Size;
}

/// Uses the size recorded on the node, or a fixed fallback when unmeasured.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeasuredOrDefault {
    pub fallback: Size,
}

impl MeasuredOrDefault {
    pub fn new(fallback: Size) -> Self {
        MeasuredOrDefault { fallback }
    }
}

impl Default for MeasuredOrDefault {
    fn default() -> Self {
        MeasuredOrDefault::new(Size::new(DEFAULT_NODE_WIDTH, DEFAULT_NODE_HEIGHT))
    }
}

impl NodeSizeProvider for MeasuredOrDefault {
    fn size_of(&self, node: &SequenceNode) -> Size {
        match node.size {
            Some(size) if size.is_valid() => size,
            _ => self.fallback,
        }
    }
}

pub const DEFAULT_NODE_WIDTH: f64 = 180.0;
pub const DEFAULT_NODE_HEIGHT: f64 = 70.0;

/// Rectangle covered by a node
pub fn node_rect(node: &SequenceNode, sizes: &dyn NodeSizeProvider) -> BoundingBox {
    BoundingBox::from_origin_size(node.position, sizes.size_of(node))
}

/// Center point of a node's rectangle
pub fn node_center(node: &SequenceNode, sizes: &dyn NodeSizeProvider) -> Position {
    node_rect(node, sizes).center()
}

/// Smallest rectangle enclosing every given node, expanded by `padding`.
///
/// Returns `None` when the iterator yields no nodes.
pub fn enclosing_box<'a>(
    nodes: impl IntoIterator<Item = &'a SequenceNode>,
    sizes: &dyn NodeSizeProvider,
    padding: f64,
) -> Option<BoundingBox> {
    let mut min_x = f64::INFINITY;
    let mut min_y = f64::INFINITY;
    let mut max_x = f64::NEG_INFINITY;
    let mut max_y = f64::NEG_INFINITY;
    let mut count = 0usize;

    for node in nodes {
        let rect = node_rect(node, sizes);
        min_x = min_x.min(rect.x);
        min_y = min_y.min(rect.y);
        max_x = max_x.max(rect.right());
        max_y = max_y.max(rect.bottom());
        count += 1;
    }

    if count == 0 {
        return None;
    }

    Some(BoundingBox::new(min_x, min_y, max_x - min_x, max_y - min_y).padded(padding))
}
