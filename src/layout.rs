//! Vertical geometry of a diff tree.
//!
//! [`Walk`] is the one implementation of the geometry rule. Content height,
//! hit-testing and render culling all consume it, so they cannot disagree
//! about where a node is.
//!
//! Starting from a cursor at 0, in document order:
//!
//! - each file adds `file_header_height`; unless the file is collapsed, each
//!   of its hunks adds `hunk_header_height`, then `line_height` per line
//!   unless the hunk is collapsed, then `hunk_margin`
//! - after a file's hunks (or straight after its header when collapsed) the
//!   cursor advances by `file_margin`
//!
//! The final cursor value is the content height.

use crate::diff::{DiffTree, NodeId};
use crate::style::Style;
use std::iter::FusedIterator;

/// The vertical extent of one drawn node, in content space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub node: NodeId,
    pub top: f32,
    pub height: f32,
}

impl Band {
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Half-open: the top edge belongs to the band, the bottom edge does not.
    #[must_use]
    pub fn contains(&self, y: f32) -> bool {
        y >= self.top && y < self.bottom()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Stage {
    FileHeader,
    HunkHeader,
    Lines,
    HunkEnd,
    FileEnd,
    Done,
}

/// Lazily yields the [`Band`] of every visible node in document order.
///
/// Margins advance the cursor without producing a band. Once the iterator
/// is exhausted, [`Walk::cursor`] is the content height.
#[derive(Debug, Clone)]
pub struct Walk<'a> {
    tree: &'a DiffTree,
    style: &'a Style,
    cursor: f32,
    file: usize,
    hunk: usize,
    line: usize,
    stage: Stage,
}

impl<'a> Walk<'a> {
    #[must_use]
    pub fn new(tree: &'a DiffTree, style: &'a Style) -> Self {
        Self {
            tree,
            style,
            cursor: 0.0,
            file: 0,
            hunk: 0,
            line: 0,
            stage: Stage::FileHeader,
        }
    }

    /// Distance advanced so far.
    #[must_use]
    pub fn cursor(&self) -> f32 {
        self.cursor
    }

    /// Run the walk to the end and return the content height.
    #[must_use]
    pub fn finish(mut self) -> f32 {
        self.by_ref().for_each(drop);
        self.cursor
    }

    fn emit(&mut self, node: NodeId, height: f32) -> Band {
        let band = Band {
            node,
            top: self.cursor,
            height,
        };
        self.cursor += height;
        band
    }
}

impl Iterator for Walk<'_> {
    type Item = Band;

    fn next(&mut self) -> Option<Band> {
        loop {
            match self.stage {
                Stage::FileHeader => {
                    let Some(file) = self.tree.files.get(self.file) else {
                        self.stage = Stage::Done;
                        return None;
                    };
                    self.hunk = 0;
                    self.stage = if file.collapsed {
                        Stage::FileEnd
                    } else {
                        Stage::HunkHeader
                    };
                    return Some(self.emit(NodeId::File(self.file), self.style.file_header_height));
                }
                Stage::HunkHeader => {
                    let Some(hunk) = self.tree.hunk(self.file, self.hunk) else {
                        self.stage = Stage::FileEnd;
                        continue;
                    };
                    self.line = 0;
                    self.stage = if hunk.collapsed {
                        Stage::HunkEnd
                    } else {
                        Stage::Lines
                    };
                    let node = NodeId::Hunk {
                        file: self.file,
                        hunk: self.hunk,
                    };
                    return Some(self.emit(node, self.style.hunk_header_height));
                }
                Stage::Lines => {
                    if self.tree.line(self.file, self.hunk, self.line).is_none() {
                        self.stage = Stage::HunkEnd;
                        continue;
                    }
                    let node = NodeId::Line {
                        file: self.file,
                        hunk: self.hunk,
                        line: self.line,
                    };
                    self.line += 1;
                    return Some(self.emit(node, self.style.line_height));
                }
                Stage::HunkEnd => {
                    self.cursor += self.style.hunk_margin;
                    self.hunk += 1;
                    self.stage = Stage::HunkHeader;
                }
                Stage::FileEnd => {
                    self.cursor += self.style.file_margin;
                    self.file += 1;
                    self.stage = Stage::FileHeader;
                }
                Stage::Done => return None,
            }
        }
    }
}

impl FusedIterator for Walk<'_> {}

/// Cached result of a full walk.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Layout {
    /// Bands in document order; tops are non-decreasing
    pub bands: Vec<Band>,
    pub content_height: f32,
}

impl Layout {
    /// Bands overlapping the content-space range `[top, bottom)`.
    #[must_use]
    pub fn visible(&self, top: f32, bottom: f32) -> &[Band] {
        let start = self.bands.partition_point(|band| band.bottom() <= top);
        let end = self.bands.partition_point(|band| band.top < bottom);
        self.bands.get(start..end.max(start)).unwrap_or_default()
    }
}

/// Compute every band and the content height for the tree's current
/// collapse state.
#[must_use]
pub fn layout(tree: &DiffTree, style: &Style) -> Layout {
    let mut walk = Walk::new(tree, style);
    let bands = walk.by_ref().collect();
    Layout {
        bands,
        content_height: walk.cursor(),
    }
}
