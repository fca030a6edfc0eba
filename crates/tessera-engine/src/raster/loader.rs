use std::fmt;
use std::path::{Path, PathBuf};

use super::Bitmap;

/// Channel count the renderer expects from image loads.
pub const RGBA_CHANNELS: u32 = 4;

/// Error returned by [`ImageLoader::load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageLoadError {
    pub path: PathBuf,
    pub message: String,
}

impl fmt::Display for ImageLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "could not load image {}: {}", self.path.display(), self.message)
    }
}

impl std::error::Error for ImageLoadError {}

/// Decodes an image file into an RGBA bitmap.
///
/// Implementations should request [`RGBA_CHANNELS`] channels; the renderer
/// rejects any other channel count.
pub trait ImageLoader {
    fn load(&self, path: &Path) -> Result<Bitmap, ImageLoadError>;
}

/// Loads images from disk with the `image` crate, converted to RGBA8.
#[derive(Debug, Default, Copy, Clone)]
pub struct FileImageLoader;

impl ImageLoader for FileImageLoader {
    fn load(&self, path: &Path) -> Result<Bitmap, ImageLoadError> {
        let fail = |message: String| ImageLoadError {
            path: path.to_path_buf(),
            message,
        };

        let rgba = image::open(path).map_err(|e| fail(e.to_string()))?.to_rgba8();
        let (width, height) = rgba.dimensions();
        let bitmap = Bitmap::from_raw(width, height, RGBA_CHANNELS, rgba.into_raw())
            .map_err(|e| fail(e.to_string()))?;

        log::debug!("loaded image {} ({width}x{height})", path.display());
        Ok(bitmap)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reports_path() {
        let path = Path::new("definitely/not/here.png");
        let err = FileImageLoader.load(path).unwrap_err();
        assert_eq!(err.path, path);
        assert!(err.to_string().contains("here.png"));
    }

    #[test]
    fn decodes_png_as_rgba() {
        let path = std::env::temp_dir().join(format!("tessera-loader-{}.png", std::process::id()));
        let img = image::RgbImage::from_pixel(3, 2, image::Rgb([10, 20, 30]));
        img.save(&path).unwrap();

        let bitmap = FileImageLoader.load(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(bitmap.shape(), (3, 2, RGBA_CHANNELS));
        assert_eq!(bitmap.pixel(2, 1).unwrap(), &[10, 20, 30, 255]);
    }
}
