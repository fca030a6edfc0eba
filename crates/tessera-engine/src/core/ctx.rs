use winit::window::Window;

use crate::render::{Renderer, WgpuBackend};
use crate::time::FrameTime;

/// Read-only handle to the window being drawn.
pub struct WindowCtx<'a> {
    pub window: &'a Window,
}

impl<'a> WindowCtx<'a> {
    /// Logical window size as `(width, height)`.
    pub fn logical_size(&self) -> (f32, f32) {
        let logical: winit::dpi::LogicalSize<f64> =
            self.window.inner_size().to_logical(self.window.scale_factor());
        (logical.width as f32, logical.height as f32)
    }

    pub fn scale_factor(&self) -> f32 {
        self.window.scale_factor() as f32
    }
}

/// Per-frame context passed to [`App::on_frame`](super::App::on_frame).
pub struct FrameCtx<'a> {
    pub window: WindowCtx<'a>,
    pub renderer: &'a mut Renderer<WgpuBackend>,
    pub time: FrameTime,
}

impl FrameCtx<'_> {
    /// Logical window width.
    pub fn width(&self) -> f32 {
        self.window.logical_size().0
    }

    /// Logical window height.
    pub fn height(&self) -> f32 {
        self.window.logical_size().1
    }
}
