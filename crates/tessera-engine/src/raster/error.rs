use std::fmt;

/// Precondition violations on [`Bitmap`](super::Bitmap) operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BitmapError {
    /// Source and destination do not have the shapes an operation requires.
    /// Shapes are `(width, height, channels)`.
    ShapeMismatch {
        expected: (u32, u32, u32),
        found: (u32, u32, u32),
    },
    /// A raw pixel buffer does not hold `width * height * channels` bytes.
    BufferSize { expected: usize, found: usize },
    /// A pixel coordinate lies outside the bitmap.
    OutOfBounds {
        x: u32,
        y: u32,
        width: u32,
        height: u32,
    },
}

impl fmt::Display for BitmapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BitmapError::ShapeMismatch { expected, found } => write!(
                f,
                "bitmap shape mismatch: expected {}x{}x{}, found {}x{}x{}",
                expected.0, expected.1, expected.2, found.0, found.1, found.2
            ),
            BitmapError::BufferSize { expected, found } => write!(
                f,
                "bitmap buffer holds {found} bytes, expected {expected}"
            ),
            BitmapError::OutOfBounds {
                x,
                y,
                width,
                height,
            } => write!(f, "pixel ({x}, {y}) outside {width}x{height} bitmap"),
        }
    }
}

impl std::error::Error for BitmapError {}
