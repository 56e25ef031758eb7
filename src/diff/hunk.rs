use std::fmt;

/// What a hunk body line does to the file, decided by its leading marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineKind {
    /// Unchanged line (` ` marker)
    Context,
    /// Line present only in the new version (`+` marker)
    Added,
    /// Line present only in the old version (`-` marker)
    Removed,
}

impl LineKind {
    /// Map a leading marker character to its kind.
    #[must_use]
    pub fn from_marker(marker: char) -> Option<Self> {
        match marker {
            ' ' => Some(LineKind::Context),
            '+' => Some(LineKind::Added),
            '-' => Some(LineKind::Removed),
            _ => None,
        }
    }

    /// The marker character this kind is written with in a diff.
    #[must_use]
    pub fn marker(self) -> char {
        match self {
            LineKind::Context => ' ',
            LineKind::Added => '+',
            LineKind::Removed => '-',
        }
    }
}

/// A single body line of a hunk.
///
/// `content` is the text after the marker; the marker itself is recoverable
/// from `kind`, so `to_string()` gives back the original diff line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    pub content: String,
    pub kind: LineKind,
}

impl Line {
    pub fn new(kind: LineKind, content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            kind,
        }
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.kind.marker(), self.content)
    }
}

/// A contiguous block of lines under one `@@ ... @@` header.
///
/// The header is kept verbatim; its line ranges are never decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hunk {
    pub header: String,
    pub lines: Vec<Line>,
    pub collapsed: bool,
}

impl Hunk {
    pub fn new(header: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            lines: Vec::new(),
            collapsed: false,
        }
    }

    /// Flip the collapse flag, returning the new state.
    pub fn toggle(&mut self) -> bool {
        self.collapsed = !self.collapsed;
        self.collapsed
    }

    /// Number of body lines of the given kind.
    #[must_use]
    pub fn count(&self, kind: LineKind) -> usize {
        self.lines.iter().filter(|line| line.kind == kind).count()
    }
}

impl fmt::Display for Hunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.header)?;
        for line in &self.lines {
            writeln!(f, "{}", line)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;

    fn sample() -> Hunk {
        Hunk {
            header: "@@ -10,2 +10,3 @@ fn main()".to_string(),
            lines: vec![
                Line::new(LineKind::Context, "    let a = 1;"),
                Line::new(LineKind::Removed, "    let b = 2;"),
                Line::new(LineKind::Added, "    let b = 3;"),
                Line::new(LineKind::Added, ""),
            ],
            collapsed: false,
        }
    }

    #[test]
    fn markers_map_both_ways() {
        for kind in [LineKind::Context, LineKind::Added, LineKind::Removed] {
            assert_eq!(LineKind::from_marker(kind.marker()), Some(kind));
        }
        assert_eq!(LineKind::from_marker('@'), None);
        assert_eq!(LineKind::from_marker('\\'), None);
    }

    #[test]
    fn line_display_restores_marker() {
        assert_eq!(Line::new(LineKind::Removed, "old").to_string(), "-old");
        assert_eq!(Line::new(LineKind::Added, "").to_string(), "+");
        assert_eq!(Line::new(LineKind::Context, "ctx").to_string(), " ctx");
    }

    #[test]
    fn render_hunk() {
        assert_eq!(
            sample().to_string(),
            "@@ -10,2 +10,3 @@ fn main()\n     let a = 1;\n-    let b = 2;\n+    let b = 3;\n+\n"
        );
    }

    #[test]
    fn toggle_flips_only_this_hunk() {
        let mut hunk = sample();
        assert!(hunk.toggle());
        assert!(hunk.collapsed);
        assert!(!hunk.toggle());
        assert_eq!(hunk.lines, sample().lines);
    }

    #[test]
    fn count_by_kind() {
        let hunk = sample();
        assert_eq!(hunk.count(LineKind::Added), 2);
        assert_eq!(hunk.count(LineKind::Removed), 1);
        assert_eq!(hunk.count(LineKind::Context), 1);
    }
}
