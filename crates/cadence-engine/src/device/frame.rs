/// One acquired swapchain frame.
///
/// Short-lived: holding the surface texture blocks acquisition of the next
/// frame, so the canvas submits it at the end of every fired frame.
pub struct GpuFrame {
    pub surface_texture: wgpu::SurfaceTexture,
    pub view: wgpu::TextureView,
    pub encoder: wgpu::CommandEncoder,
}
