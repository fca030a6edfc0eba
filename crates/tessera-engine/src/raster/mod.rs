//! CPU-side pixel buffers.
//!
//! `Bitmap` owns raw pixel memory and is used for the font atlas and for
//! images loaded from disk. Image decoding is behind the [`ImageLoader`] trait
//! so the renderer can be exercised without touching the filesystem.

mod bitmap;
mod error;
mod loader;

pub use bitmap::Bitmap;
pub use error::BitmapError;
pub use loader::{FileImageLoader, ImageLoadError, ImageLoader, RGBA_CHANNELS};
