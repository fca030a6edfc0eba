//! Font atlas and text layout.
//!
//! A [`Font`] packs one contiguous codepoint range into an RGBA atlas at
//! construction. [`Text`] lays a formatted string out against a font as
//! parallel sequences of screen rects and atlas texture rects, ready to be
//! pushed into the renderer's text batch.

mod error;
mod font;
mod layout;
mod packer;

pub use error::FontError;
pub use font::Font;
pub use layout::{Text, DEFAULT_TEXT_CAPACITY};
pub use packer::{FontduePacker, GlyphPacker, PackedGlyph};

#[cfg(test)]
pub(crate) use font::fixtures;
