//! Paint model: what a rectangle is filled with.
//!
//! Geometry types remain in `coords`.

pub mod color;

use std::path::{Path, PathBuf};

pub use color::Color;

/// Fill source for [`Renderer::draw_rect`](crate::render::Renderer::draw_rect).
///
/// `Solid` quads go to the colored batch. `Image` quads are loaded from disk,
/// bound to the texture unit and flushed immediately.
#[derive(Debug, Clone, PartialEq)]
pub enum Paint {
    Solid(Color),
    Image(PathBuf),
}

impl Paint {
    #[inline]
    pub fn image(path: impl Into<PathBuf>) -> Self {
        Paint::Image(path.into())
    }
}

impl From<Color> for Paint {
    #[inline]
    fn from(color: Color) -> Self {
        Paint::Solid(color)
    }
}

impl From<&Path> for Paint {
    #[inline]
    fn from(path: &Path) -> Self {
        Paint::Image(path.to_path_buf())
    }
}

impl From<PathBuf> for Paint {
    #[inline]
    fn from(path: PathBuf) -> Self {
        Paint::Image(path)
    }
}

impl From<&str> for Paint {
    #[inline]
    fn from(path: &str) -> Self {
        Paint::Image(PathBuf::from(path))
    }
}
