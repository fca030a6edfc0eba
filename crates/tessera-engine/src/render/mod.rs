//! Quad batching and GPU submission.
//!
//! [`Renderer`] accumulates draw calls into three fixed-capacity batches and
//! hands them to a [`GpuBackend`]. [`WgpuBackend`] executes them on the GPU;
//! [`RecordingBackend`] only records them.
//!
//! Convention:
//! - CPU geometry is in logical pixels (top-left origin, +Y down).
//! - The vertex shader converts to NDC using a per-draw frame size uniform.

mod backend;
mod batch;
mod config;
mod ctx;
mod error;
mod recording;
mod renderer;
mod vertex;
mod wgpu_backend;

pub use backend::{GpuBackend, TextureOwner};
pub use batch::{BatchError, QuadBatch, QuadType};
pub use config::{ErrorPolicy, RendererConfig, DEFAULT_BATCH_CAPACITY};
pub use ctx::{RenderCtx, RenderTarget};
pub use error::RenderError;
pub use recording::{GpuCall, RecordingBackend};
pub use renderer::Renderer;
pub use vertex::{Quad, Vertex, VERTICES_PER_QUAD};
pub use wgpu_backend::WgpuBackend;
