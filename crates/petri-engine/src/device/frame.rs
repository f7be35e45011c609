/// One acquired swapchain image plus the encoder recording into it.
///
/// Hand it back to `Gpu::submit` promptly; holding the surface texture blocks
/// acquisition of the next one.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
