//! Collapsible, scrollable trees of `git diff` output for touch displays.
//!
//! Raw diff bytes go in through [`DiffView::load`]; touches and drags go in
//! through [`DiffView::on_touch`] and [`DiffView::on_scroll`]; a renderer
//! reads [`DiffView::visible_nodes`] each frame.

use error_set::error_set;

pub mod diff;
pub mod hit;
pub mod layout;
pub mod parse;
pub mod scroll;
pub mod server;
pub mod style;
pub mod view;

pub use diff::{DiffStats, DiffTree, File, Hunk, Line, LineKind, NodeId};
pub use parse::ParseError;
pub use server::ServerError;
pub use style::{Style, StyleError};
pub use view::{DiffView, RenderItem, SharedView, Viewport};

error_set! {
    /// Top-level error for touchdiff operations
    TouchdiffError := {
        #[display("Failed to read input: {message}")]
        Input { message: String },
        #[display("Failed to write output: {message}")]
        Output { message: String },
        ParseError(ParseError),
        StyleError(StyleError),
        ServerError(ServerError),
    }
}
