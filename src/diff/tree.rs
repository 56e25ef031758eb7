use super::file::File;
use super::hunk::{Hunk, Line};
use std::fmt;

/// Address of a node in a [`DiffTree`], by position in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeId {
    File(usize),
    Hunk { file: usize, hunk: usize },
    Line { file: usize, hunk: usize, line: usize },
}

impl NodeId {
    /// Headers are the only nodes that can be collapsed.
    #[must_use]
    pub fn is_header(self) -> bool {
        !matches!(self, NodeId::Line { .. })
    }

    /// Nesting depth: files are 0, hunks 1, lines 2.
    #[must_use]
    pub fn depth(self) -> u8 {
        match self {
            NodeId::File(_) => 0,
            NodeId::Hunk { .. } => 1,
            NodeId::Line { .. } => 2,
        }
    }
}

/// Line and node counts for a tree or a single file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DiffStats {
    pub files: usize,
    pub hunks: usize,
    pub added: usize,
    pub removed: usize,
    pub context: usize,
}

impl std::ops::AddAssign for DiffStats {
    fn add_assign(&mut self, other: Self) {
        self.files += other.files;
        self.hunks += other.hunks;
        self.added += other.added;
        self.removed += other.removed;
        self.context += other.context;
    }
}

impl fmt::Display for DiffStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} files, {} hunks, +{} -{}",
            self.files, self.hunks, self.added, self.removed
        )
    }
}

/// A parsed diff: files in the order they appeared in the input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiffTree {
    pub files: Vec<File>,
}

impl DiffTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    #[must_use]
    pub fn stats(&self) -> DiffStats {
        let mut stats = DiffStats::default();
        for file in &self.files {
            stats += file.stats();
        }
        stats
    }

    #[must_use]
    pub fn hunk(&self, file: usize, hunk: usize) -> Option<&Hunk> {
        self.files.get(file)?.hunks.get(hunk)
    }

    #[must_use]
    pub fn line(&self, file: usize, hunk: usize, line: usize) -> Option<&Line> {
        self.hunk(file, hunk)?.lines.get(line)
    }

    /// Display text of a node: the path, the hunk header, or the line content.
    #[must_use]
    pub fn text(&self, node: NodeId) -> Option<&str> {
        match node {
            NodeId::File(file) => self.files.get(file).map(|f| f.path.as_str()),
            NodeId::Hunk { file, hunk } => self.hunk(file, hunk).map(|h| h.header.as_str()),
            NodeId::Line { file, hunk, line } => {
                self.line(file, hunk, line).map(|l| l.content.as_str())
            }
        }
    }

    /// Collapse state of a header node; lines are never collapsed.
    #[must_use]
    pub fn is_collapsed(&self, node: NodeId) -> bool {
        match node {
            NodeId::File(file) => self.files.get(file).is_some_and(|f| f.collapsed),
            NodeId::Hunk { file, hunk } => self.hunk(file, hunk).is_some_and(|h| h.collapsed),
            NodeId::Line { .. } => false,
        }
    }

    /// Toggle the collapse flag of a header node.
    ///
    /// Returns the new state, or `None` if the node is a line or does not
    /// exist. Only the addressed node's flag changes.
    pub fn toggle(&mut self, node: NodeId) -> Option<bool> {
        match node {
            NodeId::File(file) => self.files.get_mut(file).map(File::toggle),
            NodeId::Hunk { file, hunk } => self
                .files
                .get_mut(file)?
                .hunks
                .get_mut(hunk)
                .map(Hunk::toggle),
            NodeId::Line { .. } => None,
        }
    }

    /// Set every file and hunk flag to `collapsed`.
    pub fn set_all_collapsed(&mut self, collapsed: bool) {
        for file in &mut self.files {
            file.collapsed = collapsed;
            for hunk in &mut file.hunks {
                hunk.collapsed = collapsed;
            }
        }
    }
}

impl fmt::Display for DiffTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for file in &self.files {
            write!(f, "{}", file)?;
        }
        Ok(())
    }
}
