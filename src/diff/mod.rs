//! The diff tree: files own hunks, hunks own lines.

pub mod file;
pub mod hunk;
pub mod tree;

pub use file::File;
pub use hunk::{Hunk, Line, LineKind};
pub use tree::{DiffStats, DiffTree, NodeId};
