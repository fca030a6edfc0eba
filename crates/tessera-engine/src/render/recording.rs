use crate::paint::Color;
use crate::raster::Bitmap;

use super::backend::{GpuBackend, TextureOwner};
use super::vertex::Vertex;

/// One call made against a [`RecordingBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum GpuCall {
    FrameSize { width: f32, height: f32 },
    Clear(Color),
    SetTextured(bool),
    BindTexture {
        owner: TextureOwner,
        width: u32,
        height: u32,
    },
    Upload(Vec<Vertex>),
    Draw(u32),
}

/// Headless backend that records every call.
///
/// Useful for tests and for inspecting what a frame would submit.
#[derive(Debug, Default)]
pub struct RecordingBackend {
    calls: Vec<GpuCall>,
}

impl RecordingBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> &[GpuCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<GpuCall> {
        std::mem::take(&mut self.calls)
    }

    /// Vertex counts of all draws, in order.
    pub fn draws(&self) -> Vec<u32> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                GpuCall::Draw(n) => Some(*n),
                _ => None,
            })
            .collect()
    }

    /// Owners of all texture binds, in order.
    pub fn binds(&self) -> Vec<TextureOwner> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                GpuCall::BindTexture { owner, .. } => Some(*owner),
                _ => None,
            })
            .collect()
    }
}

impl GpuBackend for RecordingBackend {
    fn set_frame_size(&mut self, width: f32, height: f32) {
        self.calls.push(GpuCall::FrameSize { width, height });
    }

    fn clear(&mut self, color: Color) {
        self.calls.push(GpuCall::Clear(color));
    }

    fn set_textured(&mut self, textured: bool) {
        self.calls.push(GpuCall::SetTextured(textured));
    }

    fn bind_texture(&mut self, owner: TextureOwner, image: &Bitmap) {
        self.calls.push(GpuCall::BindTexture {
            owner,
            width: image.width(),
            height: image.height(),
        });
    }

    fn upload_vertices(&mut self, vertices: &[Vertex]) {
        self.calls.push(GpuCall::Upload(vertices.to_vec()));
    }

    fn draw(&mut self, vertex_count: u32) {
        self.calls.push(GpuCall::Draw(vertex_count));
    }
}
