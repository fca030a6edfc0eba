/// One acquired surface frame.
///
/// Hand it back to `Gpu::present` promptly: while it is alive no further
/// frame can be acquired.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
