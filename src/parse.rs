//! Parsing raw `git diff` output into a [`DiffTree`].
//!
//! The input is split on `\n` (a trailing `\r` is dropped) and every line is
//! classified on its own by [`classify`]. What a line becomes then depends
//! only on whether a file or hunk is currently open:
//!
//! - `diff --git <a> <b>` opens a new [`File`] and closes any open hunk
//! - `@@` opens a new [`Hunk`] in the current file
//! - ` `, `+` or `-` appends a [`Line`] to the current hunk
//! - anything else (`index`, `---`/`+++`, `\ No newline`, stray text) is dropped
//!
//! Header paths are scanned with [`path_token`], which understands both bare
//! tokens and git's C-style quoted form.
//!
//! # Examples
//!
//! ```
//! use touchdiff::diff::LineKind;
//! use touchdiff::parse::parse;
//!
//! let tree = parse(b"diff --git a/foo.c b/foo.c\n@@ -1 +1 @@\n-old\n+new\n").unwrap();
//! assert_eq!(tree.files[0].path, "foo.c");
//! assert_eq!(tree.files[0].hunks[0].lines[1].kind, LineKind::Added);
//! ```

use crate::diff::{DiffTree, File, Hunk, Line, LineKind};
use error_set::error_set;
use nom::{
    IResult, Parser,
    branch::alt,
    bytes::complete::{is_not, take_till1, take_while_m_n},
    character::complete::{anychar, char, space0},
    combinator::{map, map_res, opt},
    multi::fold_many0,
    sequence::{delimited, preceded},
};

error_set! {
    /// Errors from turning a diff buffer into a tree
    ParseError := {
        /// The buffer was zero bytes long
        #[display("Empty diff buffer")]
        EmptyInput,
        /// Tree storage could not grow
        #[display("Out of memory while building the diff tree")]
        AllocationFailure,
    }
}

const FILE_HEADER_PREFIX: &str = "diff --git ";
const HUNK_HEADER_PREFIX: &str = "@@";

/// What a single input line looks like, independent of parser state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass<'a> {
    /// `diff --git ` line; carries the text after the prefix
    FileHeader(&'a str),
    /// `@@` line; carries the whole line
    HunkHeader(&'a str),
    /// Marker line; carries the text after the marker
    Body(LineKind, &'a str),
    /// Everything else
    Other,
}

/// Classify a line (without its terminator) by fixed precedence.
#[must_use]
pub fn classify(line: &str) -> LineClass<'_> {
    if let Some(rest) = line.strip_prefix(FILE_HEADER_PREFIX) {
        return LineClass::FileHeader(rest);
    }
    if line.starts_with(HUNK_HEADER_PREFIX) {
        return LineClass::HunkHeader(line);
    }

    let mut chars = line.chars();
    match chars.next().and_then(LineKind::from_marker) {
        Some(kind) => LineClass::Body(kind, chars.as_str()),
        None => LineClass::Other,
    }
}

/// A piece of a quoted token.
enum Fragment<'a> {
    Literal(&'a str),
    Byte(u8),
    Char(char),
}

/// Three octal digits naming one raw byte (`\303`).
fn octal_byte(input: &str) -> IResult<&str, u8> {
    map_res(
        take_while_m_n(3, 3, |c: char| c.is_digit(8)),
        |digits: &str| u8::from_str_radix(digits, 8),
    )
    .parse(input)
}

fn unescape(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        'r' => '\r',
        'a' => '\x07',
        'b' => '\x08',
        'f' => '\x0c',
        'v' => '\x0b',
        other => other,
    }
}

fn escaped(input: &str) -> IResult<&str, Fragment<'_>> {
    preceded(
        char('\\'),
        alt((
            map(octal_byte, Fragment::Byte),
            map(anychar, |c| Fragment::Char(unescape(c))),
        )),
    )
    .parse(input)
}

fn fragment(input: &str) -> IResult<&str, Fragment<'_>> {
    alt((map(is_not("\"\\"), Fragment::Literal), escaped)).parse(input)
}

/// `"..."` with backslash escapes; octal escapes are raw bytes, so the result
/// is decoded as UTF-8 only once the closing quote is reached.
fn quoted_token(input: &str) -> IResult<&str, String> {
    map(
        delimited(
            char('"'),
            fold_many0(fragment, Vec::new, |mut bytes: Vec<u8>, piece| {
                match piece {
                    Fragment::Literal(text) => bytes.extend_from_slice(text.as_bytes()),
                    Fragment::Byte(byte) => bytes.push(byte),
                    Fragment::Char(c) => {
                        let mut buf = [0u8; 4];
                        bytes.extend_from_slice(c.encode_utf8(&mut buf).as_bytes());
                    }
                }
                bytes
            }),
            char('"'),
        ),
        |bytes: Vec<u8>| String::from_utf8_lossy(&bytes).into_owned(),
    )
    .parse(input)
}

fn bare_token(input: &str) -> IResult<&str, String> {
    map(take_till1(|c: char| c.is_whitespace()), |token: &str| {
        token.to_string()
    })
    .parse(input)
}

/// Scan one header path token: quoted if it starts with a well-formed
/// `"..."`, otherwise everything up to the next whitespace.
///
/// # Examples
///
/// ```
/// use touchdiff::parse::path_token;
///
/// assert_eq!(path_token("a/foo.c b/foo.c").unwrap(), (" b/foo.c", "a/foo.c".to_string()));
/// assert_eq!(path_token(r#""a/my file" rest"#).unwrap(), (" rest", "a/my file".to_string()));
/// assert_eq!(path_token(r#""caf\303\251""#).unwrap(), ("", "café".to_string()));
/// ```
pub fn path_token(input: &str) -> IResult<&str, String> {
    alt((quoted_token, bare_token)).parse(input)
}

fn two_tokens(input: &str) -> IResult<&str, (Option<String>, Option<String>)> {
    (
        preceded(space0, opt(path_token)),
        preceded(space0, opt(path_token)),
    )
        .parse(input)
}

/// Unquoted `a/X b/X` where `X` may itself contain spaces.
fn symmetric_split(rest: &str) -> Option<&str> {
    let body = rest.trim().strip_prefix("a/")?;
    let name_len = body.len().checked_sub(3)?;
    if name_len % 2 != 0 {
        return None;
    }
    let name_len = name_len / 2;
    let old = body.get(..name_len)?;
    let new = body.get(name_len..)?.strip_prefix(" b/")?;
    (old == new).then_some(old)
}

/// The two paths named by a `diff --git` header, prefixes removed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderPaths {
    pub old: Option<String>,
    pub new: Option<String>,
}

impl HeaderPaths {
    /// Decompose the text following `diff --git `.
    #[must_use]
    pub fn parse(rest: &str) -> Self {
        let Ok((remainder, (old, new))) = two_tokens(rest) else {
            return Self::default();
        };

        if !remainder.trim().is_empty() && !rest.trim_start().starts_with('"') {
            if let Some(name) = symmetric_split(rest) {
                return Self {
                    old: Some(name.to_string()),
                    new: Some(name.to_string()),
                };
            }
        }

        Self {
            old: old.map(|path| strip_side(path, "a/")),
            new: new.map(|path| strip_side(path, "b/")),
        }
    }

    /// The destination path, falling back to the source path.
    #[must_use]
    pub fn path(self) -> String {
        match (self.old, self.new) {
            (_, Some(new)) if !new.is_empty() => new,
            (Some(old), _) => old,
            _ => String::new(),
        }
    }
}

fn strip_side(path: String, prefix: &str) -> String {
    match path.strip_prefix(prefix) {
        Some(stripped) => stripped.to_string(),
        None => path,
    }
}

fn try_push<T>(items: &mut Vec<T>, item: T) -> Result<(), ParseError> {
    items
        .try_reserve(1)
        .map_err(|_| ParseError::AllocationFailure)?;
    items.push(item);
    Ok(())
}

fn try_string(text: &str) -> Result<String, ParseError> {
    let mut owned = String::new();
    owned
        .try_reserve_exact(text.len())
        .map_err(|_| ParseError::AllocationFailure)?;
    owned.push_str(text);
    Ok(owned)
}

/// Parse a complete diff buffer.
///
/// Lines that do not fit the current context are dropped rather than
/// reported. The only failures are an empty buffer and running out of
/// memory, and in both cases no tree is returned.
///
/// # Errors
///
/// Returns [`ParseError::EmptyInput`] for a zero-length buffer and
/// [`ParseError::AllocationFailure`] if tree storage cannot grow.
pub fn parse(bytes: &[u8]) -> Result<DiffTree, ParseError> {
    if bytes.is_empty() {
        return Err(ParseError::EmptyInput);
    }

    let mut tree = DiffTree::new();

    for raw in bytes.split(|&b| b == b'\n') {
        let raw = match raw {
            [rest @ .., b'\r'] => rest,
            _ => raw,
        };
        let line = String::from_utf8_lossy(raw);

        match classify(&line) {
            LineClass::FileHeader(rest) => {
                try_push(&mut tree.files, File::new(HeaderPaths::parse(rest).path()))?;
            }
            LineClass::HunkHeader(header) => {
                if let Some(file) = tree.files.last_mut() {
                    try_push(&mut file.hunks, Hunk::new(try_string(header)?))?;
                }
            }
            LineClass::Body(kind, content) => {
                if let Some(hunk) = tree.files.last_mut().and_then(|f| f.hunks.last_mut()) {
                    try_push(&mut hunk.lines, Line::new(kind, try_string(content)?))?;
                }
            }
            LineClass::Other => {}
        }
    }

    let stats = tree.stats();
    tracing::debug!(
        bytes = bytes.len(),
        files = stats.files,
        hunks = stats.hunks,
        lines = stats.added + stats.removed + stats.context,
        "parsed diff"
    );

    Ok(tree)
}


#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    fn arb_path() -> impl Strategy<Value = String> {
        prop::collection::vec(
            prop_oneof![
                prop::char::range('a', 'z'),
                Just(' '),
                Just('/'),
                Just('"'),
                Just('\\'),
                Just('é'),
            ],
            1..16,
        )
        .prop_map(|chars| chars.into_iter().collect())
    }

    fn arb_line() -> impl Strategy<Value = Line> {
        (
            prop_oneof![
                Just(LineKind::Context),
                Just(LineKind::Added),
                Just(LineKind::Removed)
            ],
            prop::collection::vec(prop::char::range(' ', '~'), 0..20),
        )
            .prop_map(|(kind, chars)| Line::new(kind, chars.into_iter().collect::<String>()))
    }

    fn arb_hunk() -> impl Strategy<Value = Hunk> {
        (1..500u32, prop::collection::vec(arb_line(), 0..6)).prop_map(|(start, lines)| Hunk {
            header: format!("@@ -{start} +{start} @@"),
            lines,
            collapsed: false,
        })
    }

    fn arb_tree() -> impl Strategy<Value = DiffTree> {
        prop::collection::vec(
            (arb_path(), prop::collection::vec(arb_hunk(), 0..4)).prop_map(|(path, hunks)| File {
                path,
                hunks,
                collapsed: false,
            }),
            0..4,
        )
        .prop_map(|files| DiffTree { files })
    }

    proptest! {
        /// Identical bytes always give identical trees, all expanded
        #[test]
        fn parse_is_deterministic(bytes in prop::collection::vec(any::<u8>(), 1..512)) {
            let first = parse(&bytes).unwrap();
            let second = parse(&bytes).unwrap();
            prop_assert!(first.files.iter().all(|f| !f.collapsed));
            prop_assert!(first.files.iter().flat_map(|f| &f.hunks).all(|h| !h.collapsed));
            prop_assert_eq!(first, second);
        }

        /// Rendering a tree as diff text and parsing it back preserves
        /// paths, headers, and line kinds and order
        #[test]
        fn rendered_tree_reparses(tree in arb_tree()) {
            let rendered = tree.to_string();
            if rendered.is_empty() {
                prop_assert!(parse(rendered.as_bytes()).is_err());
            } else {
                prop_assert_eq!(parse(rendered.as_bytes()).unwrap(), tree);
            }
        }
    }
}
