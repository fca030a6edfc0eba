use std::ops::RangeInclusive;

use crate::raster::{Bitmap, BitmapError};

use super::FontError;

// ── atlas constants ────────────────────────────────────────────────────────

const GLYPH_PADDING: u32 = 1; // pixels between glyphs in the atlas

// ── packed glyph ──────────────────────────────────────────────────────────

/// Placement and metrics of one glyph in a font atlas.
///
/// `x0..x1` × `y0..y1` is the glyph's pixel box in the atlas. Offsets are
/// relative to the pen position on the baseline (+Y down), and all values are
/// in pixels at the font's packing size.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct PackedGlyph {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
    pub x_offset: f32,
    pub y_offset: f32,
    pub x_advance: f32,
}

impl PackedGlyph {
    #[inline]
    pub fn width(&self) -> u32 {
        self.x1 - self.x0
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.y1 - self.y0
    }
}

// ── packer contract ───────────────────────────────────────────────────────

/// Rasterizes a codepoint range into a single-channel atlas.
///
/// Returns one [`PackedGlyph`] per codepoint, in range order.
pub trait GlyphPacker {
    fn pack(
        &self,
        font_data: &[u8],
        font_size: f32,
        codepoints: RangeInclusive<u32>,
        target: &mut Bitmap,
    ) -> Result<Vec<PackedGlyph>, FontError>;
}

/// [`GlyphPacker`] backed by `fontdue`, placing glyphs on shelves.
#[derive(Debug, Copy, Clone)]
pub struct FontduePacker {
    pub padding: u32,
}

impl Default for FontduePacker {
    fn default() -> Self {
        Self {
            padding: GLYPH_PADDING,
        }
    }
}

impl GlyphPacker for FontduePacker {
    fn pack(
        &self,
        font_data: &[u8],
        font_size: f32,
        codepoints: RangeInclusive<u32>,
        target: &mut Bitmap,
    ) -> Result<Vec<PackedGlyph>, FontError> {
        if target.channels() != 1 {
            return Err(BitmapError::ShapeMismatch {
                expected: (target.width(), target.height(), 1),
                found: target.shape(),
            }
            .into());
        }

        let settings = fontdue::FontSettings {
            scale: font_size,
            ..fontdue::FontSettings::default()
        };
        let font = fontdue::Font::from_bytes(font_data, settings)
            .map_err(|e| FontError::Parse(e.to_string()))?;

        let mut shelves = ShelfPacker::new(target.width(), target.height(), self.padding);
        let mut glyphs = Vec::new();

        for codepoint in codepoints {
            // Surrogates have no char; they keep an empty entry so indexing stays dense.
            let Some(ch) = char::from_u32(codepoint) else {
                glyphs.push(PackedGlyph::default());
                continue;
            };

            let (metrics, coverage) = font.rasterize(ch, font_size);
            let (w, h) = (metrics.width as u32, metrics.height as u32);

            let (x, y) = if w == 0 || h == 0 {
                (0, 0)
            } else {
                let (x, y) = shelves
                    .place(w, h)
                    .ok_or(FontError::AtlasFull { codepoint })?;
                blit(target, &coverage, x, y, w, h);
                (x, y)
            };

            glyphs.push(PackedGlyph {
                x0: x,
                y0: y,
                x1: x + w,
                y1: y + h,
                x_offset: metrics.xmin as f32,
                y_offset: -(metrics.ymin as f32 + metrics.height as f32),
                x_advance: metrics.advance_width,
            });
        }

        Ok(glyphs)
    }
}

/// Copies a tightly packed `w × h` coverage buffer into `target` at `(x, y)`.
fn blit(target: &mut Bitmap, coverage: &[u8], x: u32, y: u32, w: u32, h: u32) {
    let stride = target.stride();
    let bytes = target.as_bytes_mut();
    for (row, src) in coverage.chunks_exact(w as usize).take(h as usize).enumerate() {
        let start = (y as usize + row) * stride + x as usize;
        bytes[start..start + w as usize].copy_from_slice(src);
    }
}

// ── shelf packer ──────────────────────────────────────────────────────────

/// Row-based rectangle packer.
///
/// Rectangles are placed left-to-right on the current shelf; a new shelf
/// starts below the tallest rectangle of the previous one when the current
/// shelf runs out of width.
#[derive(Debug, Clone)]
pub(crate) struct ShelfPacker {
    width: u32,
    height: u32,
    padding: u32,
    cursor_x: u32,
    cursor_y: u32,
    row_height: u32,
}

impl ShelfPacker {
    pub(crate) fn new(width: u32, height: u32, padding: u32) -> Self {
        Self {
            width,
            height,
            padding,
            cursor_x: padding,
            cursor_y: padding,
            row_height: 0,
        }
    }

    /// Reserves a `w × h` box and returns its top-left corner, or `None` when
    /// the atlas has no room left.
    pub(crate) fn place(&mut self, w: u32, h: u32) -> Option<(u32, u32)> {
        if self.cursor_x + w + self.padding > self.width {
            self.cursor_y += self.row_height + self.padding;
            self.cursor_x = self.padding;
            self.row_height = 0;
        }

        if self.cursor_x + w + self.padding > self.width
            || self.cursor_y + h + self.padding > self.height
        {
            return None;
        }

        let at = (self.cursor_x, self.cursor_y);
        self.cursor_x += w + self.padding;
        self.row_height = self.row_height.max(h);
        Some(at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn overlaps(a: (u32, u32, u32, u32), b: (u32, u32, u32, u32)) -> bool {
        a.0 < b.2 && b.0 < a.2 && a.1 < b.3 && b.1 < a.3
    }

    // ── shelf packer ──────────────────────────────────────────────────────

    #[test]
    fn shelf_boxes_never_overlap() {
        let mut packer = ShelfPacker::new(64, 64, 1);
        let sizes = [(10, 12), (20, 5), (7, 7), (30, 9), (15, 15), (40, 3), (5, 20)];
        let mut boxes = Vec::new();
        for (w, h) in sizes {
            let (x, y) = packer.place(w, h).unwrap();
            assert!(x + w <= 64 && y + h <= 64);
            boxes.push((x, y, x + w, y + h));
        }
        for (i, a) in boxes.iter().enumerate() {
            for b in &boxes[i + 1..] {
                assert!(!overlaps(*a, *b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn shelf_wraps_to_next_row() {
        let mut packer = ShelfPacker::new(32, 64, 1);
        assert_eq!(packer.place(20, 10), Some((1, 1)));
        // 1 + 20 + 1 + 20 + 1 > 32 → new row below the first one.
        assert_eq!(packer.place(20, 4), Some((1, 12)));
    }

    #[test]
    fn shelf_reports_full_atlas() {
        let mut packer = ShelfPacker::new(16, 16, 1);
        assert!(packer.place(14, 14).is_some());
        assert!(packer.place(14, 14).is_none());
        assert!(packer.place(20, 1).is_none());
    }

    // ── blit ──────────────────────────────────────────────────────────────

    #[test]
    fn blit_writes_rows_at_offset() {
        let mut target = Bitmap::new(4, 3, 1);
        blit(&mut target, &[1, 2, 3, 4], 1, 1, 2, 2);
        assert_eq!(
            target.as_bytes(),
            &[0, 0, 0, 0, 0, 1, 2, 0, 0, 3, 4, 0]
        );
    }

    // ── fontdue packer ────────────────────────────────────────────────────

    #[test]
    fn rejects_multichannel_target() {
        let mut target = Bitmap::new(8, 8, 4);
        let err = FontduePacker::default()
            .pack(&[], 12.0, 65..=66, &mut target)
            .unwrap_err();
        assert!(matches!(err, FontError::Atlas(_)));
    }

    #[test]
    fn rejects_garbage_font_data() {
        let mut target = Bitmap::new(8, 8, 1);
        let err = FontduePacker::default()
            .pack(b"not a font", 12.0, 65..=66, &mut target)
            .unwrap_err();
        assert!(matches!(err, FontError::Parse(_)));
    }

    #[test]
    #[ignore = "needs /usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf"]
    fn packs_system_font() {
        let path = "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf";
        let data = std::fs::read(path).unwrap();

        let mut target = Bitmap::new(512, 512, 1);
        let glyphs = FontduePacker::default()
            .pack(&data, 32.0, 32..=126, &mut target)
            .unwrap();

        assert_eq!(glyphs.len(), 95);
        let a = glyphs[(u32::from('A') - 32) as usize];
        assert!(a.width() > 0 && a.height() > 0);
        assert!(a.x_advance > 0.0);
        assert!(a.y_offset < 0.0, "capitals sit above the baseline");
        assert!(target.as_bytes().iter().any(|&v| v > 0));
    }
}
