//! The state behind one diff display: tree, cached layout, scroll offset
//! and viewport, plus the operations the transport, input and rendering
//! sides call on it.
//!
//! Every mutating operation leaves the view consistent before it returns:
//! the layout matches the tree's collapse flags and the scroll offset is
//! clamped against the current content height.
//!
//! # Examples
//!
//! ```
//! use touchdiff::style::Style;
//! use touchdiff::view::{DiffView, Viewport};
//!
//! let mut view = DiffView::new(Style::default(), Viewport::new(400.0, 800.0));
//! assert!(view.load(b"diff --git a/foo.c b/foo.c\n@@ -1 +1 @@\n-old\n+new\n"));
//! assert!(view.on_touch(10.0, 16.0)); // file header: collapse
//! assert_eq!(view.content_height(), 40.0);
//! assert_eq!(view.visible_nodes().len(), 1);
//! ```

use crate::diff::{DiffStats, DiffTree, LineKind, NodeId};
use crate::hit::{self, Point};
use crate::layout::{self, Layout};
use crate::parse::{self, ParseError};
use crate::scroll;
use crate::style::{Color, Style};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Size of the visible area.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    #[must_use]
    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned rectangle in viewport space.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemKind {
    FileHeader,
    HunkHeader,
    Line(LineKind),
}

/// Everything a renderer needs to draw one node.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderItem<'a> {
    pub node: NodeId,
    pub kind: ItemKind,
    pub text: &'a str,
    pub rect: Rect,
    pub collapsed: bool,
    pub color: Color,
}

impl fmt::Display for RenderItem<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let indent = usize::from(self.node.depth()) * 2;
        write!(f, "{:.1}\t{:indent$}", self.rect.y, "")?;
        match self.kind {
            ItemKind::FileHeader | ItemKind::HunkHeader => {
                let chevron = if self.collapsed { '▸' } else { '▾' };
                write!(f, "{} {}", chevron, self.text)
            }
            ItemKind::Line(kind) => write!(f, "{}{}", kind.marker(), self.text),
        }
    }
}

/// A diff display's complete mutable state.
#[derive(Debug, Clone)]
pub struct DiffView {
    style: Style,
    tree: Option<DiffTree>,
    layout: Layout,
    scroll_y: f32,
    viewport: Viewport,
}

impl DiffView {
    #[must_use]
    pub fn new(style: Style, viewport: Viewport) -> Self {
        Self {
            style,
            tree: None,
            layout: Layout::default(),
            scroll_y: 0.0,
            viewport,
        }
    }

    #[must_use]
    pub fn style(&self) -> &Style {
        &self.style
    }

    /// The active tree, if the last load succeeded.
    #[must_use]
    pub fn tree(&self) -> Option<&DiffTree> {
        self.tree.as_ref()
    }

    #[must_use]
    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    #[must_use]
    pub fn scroll_y(&self) -> f32 {
        self.scroll_y
    }

    #[must_use]
    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    #[must_use]
    pub fn content_height(&self) -> f32 {
        self.layout.content_height
    }

    #[must_use]
    pub fn stats(&self) -> DiffStats {
        self.tree.as_ref().map(DiffTree::stats).unwrap_or_default()
    }

    /// Replace the displayed diff with the one in `buffer`.
    ///
    /// On success the new tree starts fully expanded and scrolled to the top.
    /// On failure the previous tree is discarded as well, so nothing is shown.
    /// Returns whether a tree is now active.
    pub fn load(&mut self, buffer: &[u8]) -> bool {
        self.try_load(buffer).is_ok()
    }

    /// [`load`](Self::load), keeping the reason for a failure.
    ///
    /// # Errors
    ///
    /// Returns the [`ParseError`] that rejected `buffer`; the view is empty
    /// afterwards.
    pub fn try_load(&mut self, buffer: &[u8]) -> Result<DiffStats, ParseError> {
        self.scroll_y = 0.0;
        match parse::parse(buffer) {
            Ok(tree) => {
                let stats = tree.stats();
                self.tree = Some(tree);
                self.relayout();
                tracing::info!(
                    files = stats.files,
                    hunks = stats.hunks,
                    content_height = self.layout.content_height,
                    "loaded diff"
                );
                Ok(stats)
            }
            Err(e) => {
                self.tree = None;
                self.relayout();
                tracing::warn!(error = %e, bytes = buffer.len(), "diff load failed, display cleared");
                Err(e)
            }
        }
    }

    /// Handle a tap at viewport coordinates `(x, y)`.
    ///
    /// Returns `true` if a header was toggled and the view needs a redraw.
    pub fn on_touch(&mut self, x: f32, y: f32) -> bool {
        let Some(tree) = self.tree.as_mut() else {
            return false;
        };

        let result = hit::hit_test(tree, Point::new(x, y), self.scroll_y, &self.style);
        if !result.toggled() {
            return false;
        }

        self.relayout();
        tracing::debug!(
            ?result,
            content_height = self.layout.content_height,
            scroll_y = self.scroll_y,
            "toggled"
        );
        true
    }

    /// Scroll by a drag delta.
    pub fn on_scroll(&mut self, delta_y: f32) {
        self.scroll_y = scroll::apply_delta(
            self.scroll_y,
            delta_y,
            self.style.sensitivity,
            self.layout.content_height,
            self.viewport.height,
        );
    }

    /// Change the viewport size, keeping the scroll offset in range.
    pub fn resize(&mut self, viewport: Viewport) {
        self.viewport = viewport;
        self.scroll_y = scroll::clamp(
            self.scroll_y,
            self.layout.content_height,
            self.viewport.height,
        );
    }

    pub fn collapse_all(&mut self) {
        self.set_all_collapsed(true);
    }

    pub fn expand_all(&mut self) {
        self.set_all_collapsed(false);
    }

    fn set_all_collapsed(&mut self, collapsed: bool) {
        if let Some(tree) = self.tree.as_mut() {
            tree.set_all_collapsed(collapsed);
            self.relayout();
        }
    }

    /// Recompute the layout and re-clamp the scroll offset against it.
    fn relayout(&mut self) {
        self.layout = match &self.tree {
            Some(tree) => layout::layout(tree, &self.style),
            None => Layout::default(),
        };
        self.scroll_y = scroll::clamp(
            self.scroll_y,
            self.layout.content_height,
            self.viewport.height,
        );
    }

    fn color(&self, kind: ItemKind) -> Color {
        let palette = &self.style.palette;
        match kind {
            ItemKind::FileHeader => palette.file_header,
            ItemKind::HunkHeader => palette.hunk_header,
            ItemKind::Line(LineKind::Added) => palette.added,
            ItemKind::Line(LineKind::Removed) => palette.removed,
            ItemKind::Line(LineKind::Context) => palette.context,
        }
    }

    /// Nodes intersecting the viewport at the current scroll offset, with
    /// rectangles in viewport space.
    #[must_use]
    pub fn visible_nodes(&self) -> Vec<RenderItem<'_>> {
        let Some(tree) = &self.tree else {
            return Vec::new();
        };

        let top = self.scroll_y;
        let bottom = top + self.viewport.height;
        self.layout
            .visible(top, bottom)
            .iter()
            .filter_map(|band| {
                let kind = match band.node {
                    NodeId::File(_) => ItemKind::FileHeader,
                    NodeId::Hunk { .. } => ItemKind::HunkHeader,
                    NodeId::Line { file, hunk, line } => {
                        ItemKind::Line(tree.line(file, hunk, line)?.kind)
                    }
                };
                let x = f32::from(band.node.depth()) * self.style.indent;
                Some(RenderItem {
                    node: band.node,
                    kind,
                    text: tree.text(band.node)?,
                    rect: Rect {
                        x,
                        y: band.top - top,
                        width: (self.viewport.width - x).max(0.0),
                        height: band.height,
                    },
                    collapsed: tree.is_collapsed(band.node),
                    color: self.color(kind),
                })
            })
            .collect()
    }
}

/// A view shared between the transport thread and the render/input loop.
pub type SharedView = Arc<Mutex<DiffView>>;

#[must_use]
pub fn shared(view: DiffView) -> SharedView {
    Arc::new(Mutex::new(view))
}

/// Lock a shared view. Every operation leaves the view consistent before
/// it returns, so a lock poisoned by a panicking holder is still usable.
pub fn lock(view: &SharedView) -> MutexGuard<'_, DiffView> {
    view.lock().unwrap_or_else(PoisonError::into_inner)
}
