use std::fmt;
use std::path::PathBuf;

use crate::raster::ImageLoadError;
use crate::text::FontError;

use super::batch::BatchError;

#[derive(Debug)]
pub enum RenderError {
    /// The image file could not be read or decoded.
    Image(ImageLoadError),
    /// A decoded image did not have the expected channel count.
    ChannelMismatch {
        path: PathBuf,
        expected: u32,
        found: u32,
    },
    Font(FontError),
    /// A [`Text`](crate::text::Text) was laid out against a different atlas.
    AtlasMismatch {
        expected: (u32, u32),
        found: (u32, u32),
    },
    Batch(BatchError),
    /// WGSL failed validation.
    Shader(String),
}

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RenderError::Image(e) => write!(f, "image error: {e}"),
            RenderError::ChannelMismatch {
                path,
                expected,
                found,
            } => write!(
                f,
                "{}: expected {expected} channels, found {found}",
                path.display()
            ),
            RenderError::Font(e) => write!(f, "font error: {e}"),
            RenderError::AtlasMismatch { expected, found } => write!(
                f,
                "text laid out for a {}x{} atlas, renderer atlas is {}x{}",
                found.0, found.1, expected.0, expected.1
            ),
            RenderError::Batch(e) => write!(f, "batch error: {e}"),
            RenderError::Shader(msg) => write!(f, "shader compilation failed: {msg}"),
        }
    }
}

impl std::error::Error for RenderError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            RenderError::Image(e) => Some(e),
            RenderError::Font(e) => Some(e),
            RenderError::Batch(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ImageLoadError> for RenderError {
    fn from(e: ImageLoadError) -> Self {
        RenderError::Image(e)
    }
}

impl From<FontError> for RenderError {
    fn from(e: FontError) -> Self {
        RenderError::Font(e)
    }
}

impl From<BatchError> for RenderError {
    fn from(e: BatchError) -> Self {
        RenderError::Batch(e)
    }
}
