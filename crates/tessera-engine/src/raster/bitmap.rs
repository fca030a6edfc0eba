use super::BitmapError;

/// Owned pixel buffer of `width * height * channels` bytes, row-major.
///
/// The channel count is fixed at construction and the bitmap is never
/// resized; a different size means building a new `Bitmap`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    channels: u32,
    pixels: Vec<u8>,
}

impl Bitmap {
    /// Allocates zeroed storage.
    pub fn new(width: u32, height: u32, channels: u32) -> Self {
        let len = Self::byte_len(width, height, channels);
        Self {
            width,
            height,
            channels,
            pixels: vec![0; len],
        }
    }

    /// Wraps an existing buffer, checking that its length matches the shape.
    pub fn from_raw(
        width: u32,
        height: u32,
        channels: u32,
        pixels: Vec<u8>,
    ) -> Result<Self, BitmapError> {
        let expected = Self::byte_len(width, height, channels);
        if pixels.len() != expected {
            return Err(BitmapError::BufferSize {
                expected,
                found: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            channels,
            pixels,
        })
    }

    #[inline]
    fn byte_len(width: u32, height: u32, channels: u32) -> usize {
        width as usize * height as usize * channels as usize
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn channels(&self) -> u32 {
        self.channels
    }

    #[inline]
    pub fn shape(&self) -> (u32, u32, u32) {
        (self.width, self.height, self.channels)
    }

    /// Raw bytes, row-major, `channels` bytes per pixel.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.pixels
    }

    #[inline]
    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    /// Bytes per row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.width as usize * self.channels as usize
    }

    /// Iterates pixels in row-major order; each item is one channel group.
    pub fn pixels(&self) -> impl ExactSizeIterator<Item = &[u8]> + '_ {
        self.pixels.chunks_exact(self.channels.max(1) as usize)
    }

    pub fn pixels_mut(&mut self) -> impl ExactSizeIterator<Item = &mut [u8]> + '_ {
        self.pixels.chunks_exact_mut(self.channels.max(1) as usize)
    }

    fn offset(&self, x: u32, y: u32) -> Result<usize, BitmapError> {
        if x >= self.width || y >= self.height {
            return Err(BitmapError::OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            });
        }
        Ok(y as usize * self.stride() + x as usize * self.channels as usize)
    }

    /// Channel group of the pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Result<&[u8], BitmapError> {
        let start = self.offset(x, y)?;
        Ok(&self.pixels[start..start + self.channels as usize])
    }

    pub fn pixel_mut(&mut self, x: u32, y: u32) -> Result<&mut [u8], BitmapError> {
        let start = self.offset(x, y)?;
        let end = start + self.channels as usize;
        Ok(&mut self.pixels[start..end])
    }

    /// Packs a 4-channel pixel into a `u32`, low byte first: R, G, B, A.
    pub fn pixel_rgba_u32(&self, x: u32, y: u32) -> Result<u32, BitmapError> {
        if self.channels != 4 {
            return Err(BitmapError::ShapeMismatch {
                expected: (self.width, self.height, 4),
                found: self.shape(),
            });
        }
        let p = self.pixel(x, y)?;
        Ok(u32::from_le_bytes([p[0], p[1], p[2], p[3]]))
    }

    /// Expands a single-channel `src` of the same size into this RGBA bitmap.
    ///
    /// Each gray value `g` becomes `(g, g, g, g)`. Fails without touching
    /// `self` unless `self` has 4 channels and `src` is a 1-channel bitmap of
    /// identical dimensions.
    pub fn copy_grayscale_as_rgba(&mut self, src: &Bitmap) -> Result<(), BitmapError> {
        if self.channels != 4 {
            return Err(BitmapError::ShapeMismatch {
                expected: (self.width, self.height, 4),
                found: self.shape(),
            });
        }
        if src.width != self.width || src.height != self.height || src.channels != 1 {
            return Err(BitmapError::ShapeMismatch {
                expected: (self.width, self.height, 1),
                found: src.shape(),
            });
        }

        for (dst, &g) in self.pixels.chunks_exact_mut(4).zip(src.pixels.iter()) {
            dst.copy_from_slice(&[g, g, g, g]);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_ramp(width: u32, height: u32) -> Bitmap {
        let pixels = (0..width * height).map(|i| (i * 7 % 256) as u8).collect();
        Bitmap::from_raw(width, height, 1, pixels).unwrap()
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn new_is_zeroed() {
        let b = Bitmap::new(3, 2, 4);
        assert_eq!(b.as_bytes().len(), 24);
        assert!(b.as_bytes().iter().all(|&v| v == 0));
    }

    #[test]
    fn from_raw_rejects_wrong_length() {
        let err = Bitmap::from_raw(2, 2, 4, vec![0; 15]).unwrap_err();
        assert_eq!(
            err,
            BitmapError::BufferSize {
                expected: 16,
                found: 15
            }
        );
    }

    // ── iteration ─────────────────────────────────────────────────────────

    #[test]
    fn pixels_yields_one_group_per_pixel() {
        let b = Bitmap::new(4, 3, 2);
        assert_eq!(b.pixels().len(), 12);
        assert!(b.pixels().all(|p| p.len() == 2));
    }

    #[test]
    fn pixel_is_bounds_checked() {
        let b = Bitmap::new(2, 2, 1);
        assert!(b.pixel(1, 1).is_ok());
        assert!(matches!(b.pixel(2, 0), Err(BitmapError::OutOfBounds { .. })));
    }

    // ── copy_grayscale_as_rgba ────────────────────────────────────────────

    #[test]
    fn grayscale_expands_to_equal_rgba_channels() {
        let src = gray_ramp(5, 4);
        let mut dst = Bitmap::new(5, 4, 4);
        dst.copy_grayscale_as_rgba(&src).unwrap();

        for (g, rgba) in src.pixels().zip(dst.pixels()) {
            assert_eq!(rgba, &[g[0], g[0], g[0], g[0]]);
        }
    }

    #[test]
    fn grayscale_packs_low_to_high() {
        let src = Bitmap::from_raw(1, 1, 1, vec![0x80]).unwrap();
        let mut dst = Bitmap::new(1, 1, 4);
        dst.copy_grayscale_as_rgba(&src).unwrap();
        assert_eq!(dst.pixel_rgba_u32(0, 0).unwrap(), 0x8080_8080);
    }

    #[test]
    fn grayscale_rejects_mismatched_dimensions() {
        let src = gray_ramp(4, 4);
        let mut dst = Bitmap::new(5, 4, 4);
        let err = dst.copy_grayscale_as_rgba(&src).unwrap_err();
        assert!(matches!(err, BitmapError::ShapeMismatch { .. }));
        assert!(dst.as_bytes().iter().all(|&v| v == 0));
    }

    #[test]
    fn grayscale_rejects_multichannel_source() {
        let src = Bitmap::new(4, 4, 3);
        let mut dst = Bitmap::new(4, 4, 4);
        assert!(matches!(
            dst.copy_grayscale_as_rgba(&src),
            Err(BitmapError::ShapeMismatch {
                found: (4, 4, 3),
                ..
            })
        ));
    }

    #[test]
    fn grayscale_rejects_non_rgba_destination() {
        let src = gray_ramp(2, 2);
        let mut dst = Bitmap::new(2, 2, 3);
        assert!(dst.copy_grayscale_as_rgba(&src).is_err());
    }
}
