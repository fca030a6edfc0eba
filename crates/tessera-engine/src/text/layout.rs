use std::fmt::{self, Write as _};

use crate::coords::{Rect, TexRect, Vec2};

use super::{Font, FontError};

/// Default bound on the formatted length of a [`Text`], in bytes.
pub const DEFAULT_TEXT_CAPACITY: usize = 128;

/// A formatted string laid out against a [`Font`].
///
/// Holds two parallel sequences: `rects()[i]` is the screen rect of the
/// `i`-th character and `tex_rects()[i]` its sub-rectangle in the font atlas.
/// Layout is a single left-to-right line starting with the pen at `(0, 0)` on
/// the baseline; there is no kerning and no wrapping.
///
/// The only mutation is [`adjust_text`](Self::adjust_text), a translation.
#[derive(Debug, Clone, PartialEq)]
pub struct Text {
    content: String,
    rects: Vec<Rect>,
    tex_rects: Vec<TexRect>,
    size: Vec2,
    atlas_size: (u32, u32),
    truncated: bool,
}

impl Text {
    /// Formats `args` (bounded by [`DEFAULT_TEXT_CAPACITY`]) and lays it out
    /// at `text_size` pixels.
    pub fn new(font: &Font, text_size: f32, args: fmt::Arguments<'_>) -> Result<Self, FontError> {
        Self::with_capacity(font, text_size, DEFAULT_TEXT_CAPACITY, args)
    }

    /// Like [`new`](Self::new) with an explicit byte bound.
    ///
    /// Output beyond `capacity` bytes is dropped at a char boundary and the
    /// text is flagged as [`truncated`](Self::truncated).
    pub fn with_capacity(
        font: &Font,
        text_size: f32,
        capacity: usize,
        args: fmt::Arguments<'_>,
    ) -> Result<Self, FontError> {
        let mut writer = BoundedWriter::new(capacity);
        if writer.write_fmt(args).is_err() {
            log::warn!("text formatting failed; laying out the partial output");
        }
        let BoundedWriter {
            buf: content,
            truncated,
            ..
        } = writer;

        if truncated {
            log::warn!("text truncated to {capacity} bytes: {content:?}");
        }

        let scaling = text_size / font.font_size();
        let (atlas_w, atlas_h) = (font.atlas().width(), font.atlas().height());

        let mut rects = Vec::with_capacity(content.len());
        let mut tex_rects = Vec::with_capacity(content.len());
        let mut pen_x = 0.0f32;
        let pen_y = 0.0f32;

        for ch in content.chars() {
            let glyph = font.get_glyph(ch)?;

            let x0 = pen_x + glyph.x_offset * scaling;
            let x1 = x0 + glyph.width() as f32 * scaling;
            let y0 = pen_y + glyph.y_offset * scaling;
            let y1 = y0 + glyph.height() as f32 * scaling;
            rects.push(Rect::new(x0, y0, x1, y1));

            tex_rects.push(TexRect::from_pixels(
                glyph.x0, glyph.y0, glyph.x1, glyph.y1, atlas_w, atlas_h,
            ));

            pen_x += glyph.x_advance * scaling;
        }

        let width = match (rects.first(), rects.last()) {
            (Some(first), Some(last)) => last.x1 - first.x0,
            _ => 0.0,
        };

        Ok(Self {
            content,
            rects,
            tex_rects,
            size: Vec2::new(width, text_size),
            atlas_size: (atlas_w, atlas_h),
            truncated,
        })
    }

    /// Translates every glyph rect by `(dx, dy)`.
    ///
    /// Translations accumulate: calling this twice moves the text by
    /// `(2 * dx, 2 * dy)`.
    pub fn adjust_text(&mut self, dx: f32, dy: f32) {
        for rect in &mut self.rects {
            *rect = rect.translated(dx, dy);
        }
    }

    /// Screen rects, one per character.
    #[inline]
    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    /// Atlas texture rects, one per character.
    #[inline]
    pub fn tex_rects(&self) -> &[TexRect] {
        &self.tex_rects
    }

    /// Number of laid-out characters.
    #[inline]
    pub fn len(&self) -> usize {
        self.rects.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Bounding extent: first glyph's left edge to last glyph's right edge,
    /// by the text size.
    #[inline]
    pub fn size(&self) -> Vec2 {
        self.size
    }

    /// Size of the atlas the tex-rects were normalized against.
    ///
    /// Tex-rects are only meaningful when sampled from that same atlas.
    #[inline]
    pub fn atlas_size(&self) -> (u32, u32) {
        self.atlas_size
    }

    /// The formatted string that was laid out.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.content
    }

    /// Whether formatting hit the capacity bound.
    #[inline]
    pub fn truncated(&self) -> bool {
        self.truncated
    }
}

/// `fmt::Write` sink that keeps at most `capacity` bytes.
struct BoundedWriter {
    buf: String,
    capacity: usize,
    truncated: bool,
}

impl BoundedWriter {
    fn new(capacity: usize) -> Self {
        Self {
            buf: String::with_capacity(capacity.min(DEFAULT_TEXT_CAPACITY)),
            capacity,
            truncated: false,
        }
    }
}

impl fmt::Write for BoundedWriter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.truncated {
            return Ok(());
        }

        let room = self.capacity - self.buf.len();
        if s.len() <= room {
            self.buf.push_str(s);
            return Ok(());
        }

        let mut cut = room;
        while !s.is_char_boundary(cut) {
            cut -= 1;
        }
        self.buf.push_str(&s[..cut]);
        self.truncated = true;
        Ok(())
    }
}
