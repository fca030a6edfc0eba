use crate::paint::Color;
use crate::raster::Bitmap;

use super::vertex::Vertex;

/// Who currently owns the single texture binding slot.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum TextureOwner {
    FontAtlas,
    Image,
}

/// The small set of GPU operations the batching renderer issues.
///
/// Calls arrive in submission order and must be executed in that order:
/// a `draw` uses the most recent `set_textured`, `bind_texture` and
/// `upload_vertices` that preceded it.
pub trait GpuBackend {
    /// Sets the frame size (logical px) used to map vertices to clip space.
    fn set_frame_size(&mut self, width: f32, height: f32);

    /// Clears the color target.
    fn clear(&mut self, color: Color);

    /// Selects sampled (`true`) or solid (`false`) fragment output.
    fn set_textured(&mut self, textured: bool);

    /// Replaces the active texture with the contents of `image` (RGBA8).
    fn bind_texture(&mut self, owner: TextureOwner, image: &Bitmap);

    /// Replaces the vertex data used by the next draw.
    fn upload_vertices(&mut self, vertices: &[Vertex]);

    /// Draws `vertex_count` vertices as a triangle list.
    fn draw(&mut self, vertex_count: u32);
}
