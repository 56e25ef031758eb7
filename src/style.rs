//! Geometry constants and colours, loadable from a TOML file.
//!
//! Every field has a default, so a style file only needs the values it
//! changes:
//!
//! ```toml
//! line_height = 22.0
//! sensitivity = 1.5
//!
//! [palette]
//! added = "#2ea043"
//! ```

use error_set::error_set;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const CONFIG_FILE: &str = ".touchdiff.toml";

error_set! {
    /// Errors from loading a style
    StyleError := {
        #[display("Failed to read style file {path}: {message}")]
        Read { path: String, message: String },
        #[display("Invalid style file {path}: {message}")]
        Toml { path: String, message: String },
        #[display("Invalid colour '{value}': expected #rrggbb or #rrggbbaa")]
        InvalidColor { value: String },
        #[display("Invalid value {value} for {field}")]
        InvalidStyle { field: String, value: f32 },
    }
}

/// An RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 0xff }
    }
}

impl FromStr for Color {
    type Err = StyleError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let invalid = || StyleError::InvalidColor {
            value: value.to_string(),
        };

        let hex = value.strip_prefix('#').ok_or_else(invalid)?;
        if !matches!(hex.len(), 6 | 8) || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| invalid());
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
            a: if hex.len() == 8 { channel(6)? } else { 0xff },
        })
    }
}

impl TryFrom<String> for Color {
    type Error = StyleError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

/// Colours per kind of drawn node.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Palette {
    pub file_header: Color,
    pub hunk_header: Color,
    pub added: Color,
    pub removed: Color,
    pub context: Color,
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            file_header: Color::rgb(0x30, 0x36, 0x3d),
            hunk_header: Color::rgb(0x1f, 0x3a, 0x5f),
            added: Color::rgb(0x1a, 0x4d, 0x2e),
            removed: Color::rgb(0x5c, 0x1f, 0x24),
            context: Color::rgb(0x0d, 0x11, 0x17),
        }
    }
}

/// Layout and input constants shared by layout, hit-testing and scrolling.
///
/// All lengths are in the renderer's logical pixels.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Style {
    pub file_header_height: f32,
    pub hunk_header_height: f32,
    pub line_height: f32,
    /// Space after a file's subtree, before the next file
    pub file_margin: f32,
    /// Space after each hunk, before the next hunk
    pub hunk_margin: f32,
    /// Multiplier applied to every scroll delta
    pub sensitivity: f32,
    /// Horizontal indent per tree depth
    pub indent: f32,
    pub palette: Palette,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            file_header_height: 32.0,
            hunk_header_height: 24.0,
            line_height: 18.0,
            file_margin: 8.0,
            hunk_margin: 4.0,
            sensitivity: 1.0,
            indent: 12.0,
            palette: Palette::default(),
        }
    }
}

impl Style {
    /// Reject lengths that would make the layout go backwards or non-finite.
    ///
    /// # Errors
    ///
    /// Returns [`StyleError::InvalidStyle`] naming the first bad field.
    pub fn validate(self) -> Result<Self, StyleError> {
        let lengths = [
            ("file_header_height", self.file_header_height),
            ("hunk_header_height", self.hunk_header_height),
            ("line_height", self.line_height),
            ("file_margin", self.file_margin),
            ("hunk_margin", self.hunk_margin),
            ("indent", self.indent),
        ];
        for (field, value) in lengths {
            if !value.is_finite() || value < 0.0 {
                return Err(StyleError::InvalidStyle {
                    field: field.to_string(),
                    value,
                });
            }
        }
        if !self.sensitivity.is_finite() || self.sensitivity <= 0.0 {
            return Err(StyleError::InvalidStyle {
                field: "sensitivity".to_string(),
                value: self.sensitivity,
            });
        }
        Ok(self)
    }

    /// Parse and validate a style from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`StyleError::Toml`] for malformed TOML, unknown keys or bad
    /// colours, and [`StyleError::InvalidStyle`] for out-of-range values.
    pub fn from_toml(text: &str, origin: &str) -> Result<Self, StyleError> {
        toml::from_str::<Style>(text)
            .map_err(|e| StyleError::Toml {
                path: origin.to_string(),
                message: e.to_string(),
            })?
            .validate()
    }

    fn read(path: &Path) -> Result<Self, StyleError> {
        let text = std::fs::read_to_string(path).map_err(|e| StyleError::Read {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        tracing::debug!(path = %path.display(), "loaded style file");
        Self::from_toml(&text, &path.display().to_string())
    }

    /// Load the style from `explicit` if given, otherwise from the first of
    /// `./.touchdiff.toml` and `$HOME/.touchdiff.toml` that exists, otherwise
    /// use the defaults.
    ///
    /// # Errors
    ///
    /// An explicit path must be readable; a file that is found must be valid.
    pub fn load(explicit: Option<&Path>) -> Result<Self, StyleError> {
        if let Some(path) = explicit {
            return Self::read(path);
        }

        match default_locations().into_iter().find(|p| p.is_file()) {
            Some(path) => Self::read(&path),
            None => Ok(Self::default()),
        }
    }
}

fn default_locations() -> Vec<PathBuf> {
    let mut locations = vec![PathBuf::from(CONFIG_FILE)];
    if let Some(home) = std::env::var_os("HOME") {
        locations.push(PathBuf::from(home).join(CONFIG_FILE));
    }
    locations
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use similar_asserts::assert_eq;
    use std::io::Write;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(Style::default().validate().unwrap(), Style::default());
    }

    #[test]
    fn partial_file_overrides_only_named_fields() {
        let style = Style::from_toml("line_height = 22.0\n[palette]\nadded = \"#2ea043\"\n", "test")
            .unwrap();
        assert_eq!(style.line_height, 22.0);
        assert_eq!(style.file_header_height, 32.0);
        assert_eq!(style.palette.added, Color::rgb(0x2e, 0xa0, 0x43));
        assert_eq!(style.palette.removed, Palette::default().removed);
    }

    #[test]
    fn colours_accept_alpha() {
        let color: Color = "#10203040".parse().unwrap();
        assert_eq!(
            color,
            Color {
                r: 0x10,
                g: 0x20,
                b: 0x30,
                a: 0x40
            }
        );
    }

    #[test]
    fn colours_reject_bad_forms() {
        for value in ["102030", "#12345", "#gg0000", "#1020304050", ""] {
            assert!(
                matches!(value.parse::<Color>(), Err(StyleError::InvalidColor { .. })),
                "{value}"
            );
        }
    }

    #[test]
    fn bad_colour_in_file_is_a_toml_error() {
        let result = Style::from_toml("[palette]\nadded = \"green\"\n", "test");
        assert!(matches!(result, Err(StyleError::Toml { .. })));
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = Style::from_toml("line_hieght = 20.0\n", "test");
        assert!(matches!(result, Err(StyleError::Toml { .. })));
    }

    #[test]
    fn negative_lengths_are_rejected() {
        let result = Style::from_toml("hunk_margin = -1.0\n", "test");
        assert!(matches!(
            result,
            Err(StyleError::InvalidStyle { ref field, .. }) if field == "hunk_margin"
        ));
    }

    #[test]
    fn zero_sensitivity_is_rejected() {
        let result = Style::from_toml("sensitivity = 0.0\n", "test");
        assert!(matches!(result, Err(StyleError::InvalidStyle { .. })));
    }

    #[test]
    fn load_explicit_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "file_margin = 0.0").unwrap();
        let style = Style::load(Some(file.path())).unwrap();
        assert_eq!(style.file_margin, 0.0);
    }

    #[test]
    fn load_missing_explicit_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let result = Style::load(Some(&dir.path().join("absent.toml")));
        assert!(matches!(result, Err(StyleError::Read { .. })));
    }
}
