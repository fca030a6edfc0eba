/// Rectangle in normalized texture space (`0..=1` on both axes).
///
/// `(s0, t0)` maps to the top-left corner of a quad and `(s1, t1)` to the
/// bottom-right one.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct TexRect {
    pub s0: f32,
    pub t0: f32,
    pub s1: f32,
    pub t1: f32,
}

impl TexRect {
    /// All-zero coordinates, used by untextured quads.
    pub const ZERO: TexRect = TexRect::new(0.0, 0.0, 0.0, 0.0);

    /// The whole texture.
    pub const FULL: TexRect = TexRect::new(0.0, 0.0, 1.0, 1.0);

    #[inline]
    pub const fn new(s0: f32, t0: f32, s1: f32, t1: f32) -> Self {
        Self { s0, t0, s1, t1 }
    }

    /// Normalizes a pixel box `[x0, x1) × [y0, y1)` by the texture extent.
    #[inline]
    pub fn from_pixels(x0: u32, y0: u32, x1: u32, y1: u32, width: u32, height: u32) -> Self {
        let w = width.max(1) as f32;
        let h = height.max(1) as f32;
        Self::new(x0 as f32 / w, y0 as f32 / h, x1 as f32 / w, y1 as f32 / h)
    }
}
