//! Mapping touches to header toggles.

use crate::diff::{DiffTree, NodeId};
use crate::layout::Walk;
use crate::style::Style;

/// A touch position in viewport space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Outcome of a touch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitResult {
    /// The header of file `n` was touched and its flag flipped
    ToggledFile(usize),
    /// The header of hunk `(file, hunk)` was touched and its flag flipped
    ToggledHunk(usize, usize),
    /// The touch landed on a body line, a margin, or past the content
    NoTarget,
}

impl HitResult {
    #[must_use]
    pub fn toggled(self) -> bool {
        !matches!(self, HitResult::NoTarget)
    }
}

/// The header whose band contains the content-space coordinate `content_y`.
///
/// Walks the same bands the layout produces and stops at the first match.
#[must_use]
pub fn locate(tree: &DiffTree, content_y: f32, style: &Style) -> Option<NodeId> {
    Walk::new(tree, style)
        .take_while(|band| band.top <= content_y)
        .find(|band| band.node.is_header() && band.contains(content_y))
        .map(|band| band.node)
}

/// Toggle the header under `touch`, given the current scroll offset.
///
/// The caller owns re-running the layout and re-clamping the scroll offset
/// when the result is a toggle.
pub fn hit_test(tree: &mut DiffTree, touch: Point, scroll_y: f32, style: &Style) -> HitResult {
    let content_y = touch.y + scroll_y;
    let Some(node) = locate(tree, content_y, style) else {
        return HitResult::NoTarget;
    };

    match (node, tree.toggle(node)) {
        (NodeId::File(file), Some(_)) => HitResult::ToggledFile(file),
        (NodeId::Hunk { file, hunk }, Some(_)) => HitResult::ToggledHunk(file, hunk),
        _ => HitResult::NoTarget,
    }
}
