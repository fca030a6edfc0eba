use std::fmt;
use std::path::PathBuf;

use crate::raster::BitmapError;

/// Errors produced while building a [`Font`](super::Font) or looking glyphs up.
#[derive(Debug)]
pub enum FontError {
    /// The font file could not be read.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The rasterizer rejected the font data.
    Parse(String),
    /// A codepoint lies outside the font's packed range.
    OutOfRange {
        codepoint: u32,
        first: u32,
        last: u32,
    },
    /// The codepoint range holds no codepoints (`first > last`).
    EmptyRange { first: u32, last: u32 },
    /// The font size is not a positive finite number.
    InvalidSize(f32),
    /// A glyph did not fit into the remaining atlas space.
    AtlasFull { codepoint: u32 },
    /// The packer returned a table that does not cover the range.
    GlyphCount { expected: usize, found: usize },
    /// The atlas bitmap does not have the required shape.
    Atlas(BitmapError),
}

impl fmt::Display for FontError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontError::Io { path, source } => {
                write!(f, "could not open font file {}: {source}", path.display())
            }
            FontError::Parse(msg) => write!(f, "font parse error: {msg}"),
            FontError::OutOfRange {
                codepoint,
                first,
                last,
            } => write!(
                f,
                "codepoint {codepoint} outside packed range [{first}, {last}]"
            ),
            FontError::EmptyRange { first, last } => {
                write!(f, "empty codepoint range [{first}, {last}]")
            }
            FontError::InvalidSize(size) => write!(f, "invalid font size {size}"),
            FontError::AtlasFull { codepoint } => {
                write!(f, "font atlas is full; codepoint {codepoint} does not fit")
            }
            FontError::GlyphCount { expected, found } => write!(
                f,
                "packer returned {found} glyphs for a range of {expected}"
            ),
            FontError::Atlas(e) => write!(f, "font atlas: {e}"),
        }
    }
}

impl std::error::Error for FontError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FontError::Io { source, .. } => Some(source),
            FontError::Atlas(e) => Some(e),
            _ => None,
        }
    }
}

impl From<BitmapError> for FontError {
    fn from(e: BitmapError) -> Self {
        FontError::Atlas(e)
    }
}
