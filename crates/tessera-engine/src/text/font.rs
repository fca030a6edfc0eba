use std::ops::RangeInclusive;
use std::path::Path;

use crate::raster::{Bitmap, BitmapError, RGBA_CHANNELS};

use super::{FontError, FontduePacker, GlyphPacker, PackedGlyph};

/// Glyph atlas for one contiguous codepoint range.
///
/// Built once and immutable afterwards: the atlas and the glyph table are
/// fixed for the font's lifetime. There is no way to add ranges or to
/// regenerate at another size; build a new `Font` instead.
#[derive(Debug, Clone)]
pub struct Font {
    atlas: Bitmap,
    first: u32,
    last: u32,
    font_size: f32,
    glyphs: Vec<PackedGlyph>,
}

impl Font {
    /// Reads the font file at `path` and packs `codepoints` into `atlas` at
    /// `font_size` pixels using [`FontduePacker`].
    ///
    /// `atlas` must be an RGBA bitmap large enough for the whole range.
    pub fn new(
        atlas: Bitmap,
        codepoints: RangeInclusive<u32>,
        font_size: f32,
        path: impl AsRef<Path>,
    ) -> Result<Self, FontError> {
        Self::with_packer(atlas, codepoints, font_size, path, &FontduePacker::default())
    }

    /// Like [`new`](Self::new) with a caller-supplied packer.
    pub fn with_packer(
        atlas: Bitmap,
        codepoints: RangeInclusive<u32>,
        font_size: f32,
        path: impl AsRef<Path>,
        packer: &dyn GlyphPacker,
    ) -> Result<Self, FontError> {
        let path = path.as_ref();
        let data = std::fs::read(path).map_err(|source| FontError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let font = Self::from_bytes(atlas, codepoints, font_size, &data, packer)?;
        log::info!(
            "font {} packed: codepoints [{}, {}] at {}px into {}x{} atlas",
            path.display(),
            font.first,
            font.last,
            font.font_size,
            font.atlas.width(),
            font.atlas.height(),
        );
        Ok(font)
    }

    /// Packs `codepoints` from in-memory font data.
    ///
    /// Glyphs are rasterized into a temporary single-channel bitmap of the
    /// atlas' size, which is then expanded into the RGBA atlas.
    pub fn from_bytes(
        mut atlas: Bitmap,
        codepoints: RangeInclusive<u32>,
        font_size: f32,
        data: &[u8],
        packer: &dyn GlyphPacker,
    ) -> Result<Self, FontError> {
        let (first, last) = (*codepoints.start(), *codepoints.end());
        if codepoints.is_empty() {
            return Err(FontError::EmptyRange { first, last });
        }
        if !(font_size.is_finite() && font_size > 0.0) {
            return Err(FontError::InvalidSize(font_size));
        }
        if atlas.channels() != RGBA_CHANNELS {
            return Err(BitmapError::ShapeMismatch {
                expected: (atlas.width(), atlas.height(), RGBA_CHANNELS),
                found: atlas.shape(),
            }
            .into());
        }

        let mut coverage = Bitmap::new(atlas.width(), atlas.height(), 1);
        let glyphs = packer.pack(data, font_size, codepoints, &mut coverage)?;

        let expected = (last - first) as usize + 1;
        if glyphs.len() != expected {
            return Err(FontError::GlyphCount {
                expected,
                found: glyphs.len(),
            });
        }

        atlas.copy_grayscale_as_rgba(&coverage)?;

        Ok(Self {
            atlas,
            first,
            last,
            font_size,
            glyphs,
        })
    }

    /// Metrics for `ch`.
    #[inline]
    pub fn get_glyph(&self, ch: char) -> Result<&PackedGlyph, FontError> {
        self.glyph(u32::from(ch))
    }

    /// Metrics for `codepoint`; fails outside `[first, last]`.
    pub fn glyph(&self, codepoint: u32) -> Result<&PackedGlyph, FontError> {
        if codepoint < self.first || codepoint > self.last {
            return Err(FontError::OutOfRange {
                codepoint,
                first: self.first,
                last: self.last,
            });
        }
        Ok(&self.glyphs[(codepoint - self.first) as usize])
    }

    /// The RGBA atlas.
    #[inline]
    pub fn atlas(&self) -> &Bitmap {
        &self.atlas
    }

    /// Pixel size the glyphs were packed at.
    #[inline]
    pub fn font_size(&self) -> f32 {
        self.font_size
    }

    #[inline]
    pub fn first(&self) -> u32 {
        self.first
    }

    #[inline]
    pub fn last(&self) -> u32 {
        self.last
    }

    #[inline]
    pub fn codepoints(&self) -> RangeInclusive<u32> {
        self.first..=self.last
    }
}
