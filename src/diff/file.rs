use super::hunk::{Hunk, LineKind};
use super::tree::DiffStats;
use std::fmt;

/// All hunks for one file of a diff.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct File {
    /// Destination path (`b/` side of the `diff --git` header, prefix removed)
    pub path: String,
    /// Hunks in the order they appeared
    pub hunks: Vec<Hunk>,
    pub collapsed: bool,
}

impl File {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            hunks: Vec::new(),
            collapsed: false,
        }
    }

    /// Flip the collapse flag, returning the new state.
    ///
    /// Hunk flags are left alone, so expanding a file restores the hunk
    /// state it had before it was collapsed.
    pub fn toggle(&mut self) -> bool {
        self.collapsed = !self.collapsed;
        self.collapsed
    }

    #[must_use]
    pub fn stats(&self) -> DiffStats {
        let mut stats = DiffStats {
            files: 1,
            hunks: self.hunks.len(),
            ..DiffStats::default()
        };
        for hunk in &self.hunks {
            stats.added += hunk.count(LineKind::Added);
            stats.removed += hunk.count(LineKind::Removed);
            stats.context += hunk.count(LineKind::Context);
        }
        stats
    }
}

/// Write `prefix` + `path` as a single header token, quoting it the way git
/// does when the bare form would not survive whitespace tokenization.
fn write_path_token(f: &mut fmt::Formatter<'_>, prefix: &str, path: &str) -> fmt::Result {
    let needs_quotes = path
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || c == '"' || c == '\\');
    if !needs_quotes {
        return write!(f, "{}{}", prefix, path);
    }

    write!(f, "\"{}", prefix)?;
    for c in path.chars() {
        match c {
            '"' => f.write_str("\\\"")?,
            '\\' => f.write_str("\\\\")?,
            '\n' => f.write_str("\\n")?,
            '\t' => f.write_str("\\t")?,
            '\r' => f.write_str("\\r")?,
            c if c.is_control() => {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    write!(f, "\\{:03o}", byte)?;
                }
            }
            c => write!(f, "{}", c)?,
        }
    }
    f.write_str("\"")
}

impl fmt::Display for File {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("diff --git ")?;
        write_path_token(f, "a/", &self.path)?;
        f.write_str(" ")?;
        write_path_token(f, "b/", &self.path)?;
        f.write_str("\n")?;

        for hunk in &self.hunks {
            write!(f, "{}", hunk)?;
        }

        Ok(())
    }
}
