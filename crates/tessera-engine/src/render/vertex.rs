use bytemuck::{Pod, Zeroable};

use crate::coords::{Rect, TexRect};
use crate::paint::Color;

/// Vertices per quad: two triangles, no index buffer.
pub const VERTICES_PER_QUAD: usize = 6;

/// Vertex layout consumed by the quad shader.
///
///  offset  0  position    [f32; 2]   loc 0
///  offset  8  color       [f32; 4]   loc 1
///  offset 24  tex_coords  [f32; 2]   loc 2
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
    pub tex_coords: [f32; 2],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 3] = wgpu::vertex_attr_array![
        0 => Float32x2, // position
        1 => Float32x4, // color
        2 => Float32x2  // tex_coords
    ];

    #[inline]
    pub const fn new(position: [f32; 2], color: [f32; 4], tex_coords: [f32; 2]) -> Self {
        Self {
            position,
            color,
            tex_coords,
        }
    }

    pub(crate) fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// One rectangle as a triangle list.
///
/// Order: top-left, top-right, bottom-left, then top-right, bottom-left,
/// bottom-right.
#[repr(C)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Pod, Zeroable)]
pub struct Quad {
    pub vertices: [Vertex; VERTICES_PER_QUAD],
}

impl Quad {
    pub fn new(rect: Rect, color: Color, tex: TexRect) -> Self {
        let c = color.to_array();
        let tl = Vertex::new([rect.x0, rect.y0], c, [tex.s0, tex.t0]);
        let tr = Vertex::new([rect.x1, rect.y0], c, [tex.s1, tex.t0]);
        let bl = Vertex::new([rect.x0, rect.y1], c, [tex.s0, tex.t1]);
        let br = Vertex::new([rect.x1, rect.y1], c, [tex.s1, tex.t1]);
        Self {
            vertices: [tl, tr, bl, tr, bl, br],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_32_bytes() {
        assert_eq!(std::mem::size_of::<Vertex>(), 32);
        assert_eq!(std::mem::size_of::<Quad>(), 32 * VERTICES_PER_QUAD);
    }

    #[test]
    fn quad_winds_two_triangles() {
        let q = Quad::new(
            Rect::new(10.0, 20.0, 30.0, 40.0),
            Color::RED,
            TexRect::new(0.0, 0.25, 0.5, 0.75),
        );
        let positions: Vec<[f32; 2]> = q.vertices.iter().map(|v| v.position).collect();
        assert_eq!(
            positions,
            vec![
                [10.0, 20.0],
                [30.0, 20.0],
                [10.0, 40.0],
                [30.0, 20.0],
                [10.0, 40.0],
                [30.0, 40.0],
            ]
        );
        assert_eq!(q.vertices[0].tex_coords, [0.0, 0.25]);
        assert_eq!(q.vertices[5].tex_coords, [0.5, 0.75]);
        assert!(q.vertices.iter().all(|v| v.color == [1.0, 0.0, 0.0, 1.0]));
    }
}
