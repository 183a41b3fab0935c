use anyhow::{anyhow, Result};
use wgpu::util::DeviceExt;
use winit::dpi::PhysicalSize;
use winit::window::Window;

use crate::coords::{SurfaceGeometry, Transform2D, Vec2, Viewport};
use crate::core::{SchedulerConfig, Surface};
use crate::paint::color::{linear_to_srgb, Color};

use super::{Gpu, GpuFrame, GpuInit};

/// Options for a managed canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasOptions {
    /// Desired callback invocation rate.
    pub target_fps: f32,

    /// Clear to `clear_color` before each fired frame.
    pub auto_clear: bool,

    /// Resize the drawable to fill the window on geometry changes.
    pub auto_resize: bool,

    /// Apply pointer events to the canvas's `PointerState`.
    pub track_pointer: bool,

    /// Fixed drawable size in physical pixels; disables auto-resize.
    pub resolution: Option<(u32, u32)>,

    pub clear_color: Color,
}

impl Default for CanvasOptions {
    fn default() -> Self {
        Self {
            target_fps: 60.0,
            auto_clear: true,
            auto_resize: true,
            track_pointer: true,
            resolution: None,
            clear_color: Color::BLACK,
        }
    }
}

impl CanvasOptions {
    pub fn target_fps(mut self, fps: f32) -> Self {
        self.target_fps = fps;
        self
    }

    pub fn auto_clear(mut self, on: bool) -> Self {
        self.auto_clear = on;
        self
    }

    pub fn auto_resize(mut self, on: bool) -> Self {
        self.auto_resize = on;
        self
    }

    pub fn track_pointer(mut self, on: bool) -> Self {
        self.track_pointer = on;
        self
    }

    pub fn resolution(mut self, width: u32, height: u32) -> Self {
        self.resolution = Some((width, height));
        self
    }

    pub fn clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    pub fn scheduler_config(&self) -> SchedulerConfig {
        SchedulerConfig::new(self.target_fps).auto_clear(self.auto_clear)
    }

    /// Whether the drawable follows the window size.
    pub fn resizes(&self) -> bool {
        self.auto_resize && self.resolution.is_none()
    }
}

/// Drawing context handed to render callbacks.
///
/// Exposes the wgpu device/queue and, while a frame is being drawn, its
/// encoder and color view. `fill` and `fill_rect` cover simple 2D drawing
/// without a pipeline.
///
/// The current transform (`translate`/`scale`) applies to `fill_rect` and
/// persists across frames until `reset_transform`.
pub struct DrawCtx {
    device: wgpu::Device,
    queue: wgpu::Queue,
    format: wgpu::TextureFormat,
    copy_dst: bool,
    geometry: SurfaceGeometry,
    transform: Transform2D,
    frame: Option<GpuFrame>,
    warned_fill_rect: bool,
}

/// Encoder + color view of the frame being drawn.
pub struct RenderTarget<'a> {
    pub encoder: &'a mut wgpu::CommandEncoder,
    pub view: &'a wgpu::TextureView,
}

impl DrawCtx {
    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Drawable size in logical pixels.
    pub fn viewport(&self) -> Viewport {
        self.geometry.viewport()
    }

    pub fn translate(&mut self, x: f32, y: f32) {
        self.transform = self.transform.translate(x, y);
    }

    pub fn scale(&mut self, x: f32, y: f32) {
        self.transform = self.transform.scale(x, y);
    }

    pub fn reset_transform(&mut self) {
        self.transform = Transform2D::IDENTITY;
    }

    pub fn transform(&self) -> Transform2D {
        self.transform
    }

    /// `None` outside of a fired frame.
    pub fn target(&mut self) -> Option<RenderTarget<'_>> {
        let frame = self.frame.as_mut()?;
        Some(RenderTarget {
            encoder: &mut frame.encoder,
            view: &frame.view,
        })
    }

    /// Fills the whole frame with `color`.
    pub fn fill(&mut self, color: Color) {
        let Some(frame) = self.frame.as_mut() else {
            return;
        };

        // Dropped immediately; the load op does the work.
        let _rpass = frame.encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
            label: Some("cadence fill"),
            color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                view: &frame.view,
                resolve_target: None,
                ops: wgpu::Operations {
                    load: wgpu::LoadOp::Clear(color.to_wgpu()),
                    store: wgpu::StoreOp::Store,
                },
                depth_slice: None,
            })],
            depth_stencil_attachment: None,
            timestamp_writes: None,
            occlusion_query_set: None,
            multiview_mask: None,
        });
    }

    /// Fills an axis-aligned rectangle given in logical pixels, after the
    /// current transform.
    ///
    /// Pixels are overwritten (no blending). Requires an 8-bit RGBA/BGRA
    /// surface that accepts copies; otherwise this logs once and does nothing.
    pub fn fill_rect(&mut self, origin: Vec2, size: Vec2, color: Color) {
        let Some(frame) = self.frame.as_mut() else {
            return;
        };

        let pixel = match encode_pixel(color, self.format) {
            Some(p) if self.copy_dst => p,
            _ => {
                if !self.warned_fill_rect {
                    log::warn!(
                        "fill_rect unsupported on this surface ({:?}, copy_dst={})",
                        self.format,
                        self.copy_dst
                    );
                    self.warned_fill_rect = true;
                }
                return;
            }
        };

        let (origin, size) = self.transform.map_rect(origin, size);
        let Some((x, y, w, h)) = clip_rect(origin, size, self.geometry.scale_factor, self.geometry.size) else {
            return;
        };

        let row = w as usize * 4;
        let padded = row.next_multiple_of(wgpu::COPY_BYTES_PER_ROW_ALIGNMENT as usize);
        let mut data = vec![0_u8; padded * h as usize];
        for line in data.chunks_exact_mut(padded) {
            for px in line[..row].chunks_exact_mut(4) {
                px.copy_from_slice(&pixel);
            }
        }

        let buffer = self.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("cadence fill_rect"),
            contents: &data,
            usage: wgpu::BufferUsages::COPY_SRC,
        });

        frame.encoder.copy_buffer_to_texture(
            wgpu::TexelCopyBufferInfo {
                buffer: &buffer,
                layout: wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(padded as u32),
                    rows_per_image: Some(h),
                },
            },
            wgpu::TexelCopyTextureInfo {
                texture: &frame.surface_texture.texture,
                mip_level: 0,
                origin: wgpu::Origin3d { x, y, z: 0 },
                aspect: wgpu::TextureAspect::All,
            },
            wgpu::Extent3d {
                width: w,
                height: h,
                depth_or_array_layers: 1,
            },
        );
    }
}

/// wgpu-backed drawable surface for one window.
///
/// Owns the GPU context and tracks surface geometry. Implements [`Surface`]
/// so the scheduler can drive it directly.
pub struct Canvas<'w> {
    window: &'w Window,
    gpu: Gpu<'w>,
    clear_color: Color,
    draw: DrawCtx,
}

impl<'w> Canvas<'w> {
    /// Creates the canvas for `window`.
    ///
    /// Fails with `ConfigError::MissingSurface` when the drawable would be zero-sized.
    pub async fn new(window: &'w Window, init: GpuInit, options: &CanvasOptions) -> Result<Self> {
        let size = match options.resolution {
            Some((w, h)) => PhysicalSize::new(w, h),
            None => window.inner_size(),
        };

        let gpu = Gpu::new(window, size, init).await?;

        let mut geometry = SurfaceGeometry::new(
            (size.width, size.height),
            window.scale_factor(),
            options.resizes(),
        );
        geometry.on_moved(viewport_offset(window));

        let draw = DrawCtx {
            device: gpu.device().clone(),
            queue: gpu.queue().clone(),
            format: gpu.surface_format(),
            copy_dst: gpu.surface_usage().contains(wgpu::TextureUsages::COPY_DST),
            geometry,
            transform: Transform2D::IDENTITY,
            frame: None,
            warned_fill_rect: false,
        };

        Ok(Self {
            window,
            gpu,
            clear_color: options.clear_color,
            draw,
        })
    }

    pub fn window(&self) -> &Window {
        self.window
    }

    /// Window resized: recompute the offset and, when resizing is on, the drawable size.
    pub fn on_resized(&mut self, new_size: PhysicalSize<u32>) {
        self.draw.geometry.on_moved(viewport_offset(self.window));
        if self.draw.geometry.on_resized((new_size.width, new_size.height)) {
            self.gpu.resize(new_size);
            log::debug!("canvas resized to {}x{}", new_size.width, new_size.height);
        }
    }

    pub fn on_moved(&mut self) {
        self.draw.geometry.on_moved(viewport_offset(self.window));
    }

    pub fn on_scale_factor_changed(&mut self, scale_factor: f64) {
        self.draw.geometry.on_scale_factor_changed(scale_factor);
        self.on_resized(self.window.inner_size());
    }
}

impl Surface for Canvas<'_> {
    type Context = DrawCtx;

    fn geometry(&self) -> SurfaceGeometry {
        self.draw.geometry
    }

    fn begin_frame(&mut self) -> Result<bool> {
        if !self.draw.geometry.is_drawable() {
            return Ok(false);
        }

        match self.gpu.begin_frame() {
            Ok(frame) => {
                self.draw.frame = Some(frame);
                Ok(true)
            }
            Err(err) => {
                let action = self.gpu.handle_surface_error(err);
                if action.is_fatal() {
                    return Err(anyhow!("surface out of memory"));
                }
                log::debug!("frame skipped: {action:?}");
                Ok(false)
            }
        }
    }

    fn clear(&mut self) {
        self.draw.fill(self.clear_color);
    }

    fn context(&mut self) -> &mut DrawCtx {
        &mut self.draw
    }

    fn end_frame(&mut self) {
        if let Some(frame) = self.draw.frame.take() {
            self.window.pre_present_notify();
            self.gpu.submit(frame);
        }
    }
}

/// Surface origin in desktop coordinates (logical px).
///
/// Platforms that cannot report window positions (e.g. Wayland) yield zero.
fn viewport_offset(window: &Window) -> Vec2 {
    match window.inner_position() {
        Ok(pos) => {
            let logical = pos.to_logical::<f64>(window.scale_factor());
            Vec2::new(logical.x as f32, logical.y as f32)
        }
        Err(_) => Vec2::zero(),
    }
}

/// Converts a color to the byte layout of an 8-bit surface format.
fn encode_pixel(color: Color, format: wgpu::TextureFormat) -> Option<[u8; 4]> {
    let (r, g, b, a) = color.to_straight();
    let srgb = format.is_srgb();
    let channel = |v: f32| {
        let v = if srgb { linear_to_srgb(v) } else { v };
        (v.clamp(0.0, 1.0) * 255.0).round() as u8
    };
    let alpha = (a.clamp(0.0, 1.0) * 255.0).round() as u8;

    match format {
        wgpu::TextureFormat::Rgba8Unorm | wgpu::TextureFormat::Rgba8UnormSrgb => {
            Some([channel(r), channel(g), channel(b), alpha])
        }
        wgpu::TextureFormat::Bgra8Unorm | wgpu::TextureFormat::Bgra8UnormSrgb => {
            Some([channel(b), channel(g), channel(r), alpha])
        }
        _ => None,
    }
}

/// Maps a logical-pixel rectangle to a physical pixel rect clipped to `bounds`.
///
/// Returns `(x, y, width, height)`, or `None` when nothing is left.
fn clip_rect(origin: Vec2, size: Vec2, scale: f64, bounds: (u32, u32)) -> Option<(u32, u32, u32, u32)> {
    let x0 = (f64::from(origin.x) * scale).floor().max(0.0);
    let y0 = (f64::from(origin.y) * scale).floor().max(0.0);
    let x1 = (f64::from(origin.x + size.x) * scale).ceil().min(f64::from(bounds.0));
    let y1 = (f64::from(origin.y + size.y) * scale).ceil().min(f64::from(bounds.1));

    if x1 <= x0 || y1 <= y0 {
        return None;
    }

    Some((x0 as u32, y0 as u32, (x1 - x0) as u32, (y1 - y0) as u32))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let o = CanvasOptions::default();
        assert_eq!(o.target_fps, 60.0);
        assert!(o.auto_clear && o.auto_resize && o.track_pointer);
        assert!(o.resizes());
    }

    #[test]
    fn fixed_resolution_disables_resize() {
        let o = CanvasOptions::default().resolution(320, 200);
        assert!(!o.resizes());
        assert!(!CanvasOptions::default().auto_resize(false).resizes());
    }

    #[test]
    fn scheduler_config_carries_rate_and_clear() {
        let cfg = CanvasOptions::default().target_fps(24.0).auto_clear(false).scheduler_config();
        assert_eq!(cfg, SchedulerConfig::new(24.0).auto_clear(false));
    }

    #[test]
    fn encode_pixel_orders_channels() {
        let c = Color::from_straight(1.0, 0.0, 0.0, 1.0);
        assert_eq!(encode_pixel(c, wgpu::TextureFormat::Rgba8Unorm), Some([255, 0, 0, 255]));
        assert_eq!(encode_pixel(c, wgpu::TextureFormat::Bgra8Unorm), Some([0, 0, 255, 255]));
        assert_eq!(encode_pixel(c, wgpu::TextureFormat::Rgba16Float), None);
    }

    #[test]
    fn encode_pixel_applies_srgb_curve() {
        let mid = Color::from_straight(0.2158605, 0.2158605, 0.2158605, 1.0);
        assert_eq!(encode_pixel(mid, wgpu::TextureFormat::Rgba8UnormSrgb), Some([128, 128, 128, 255]));
        assert_eq!(encode_pixel(mid, wgpu::TextureFormat::Rgba8Unorm), Some([55, 55, 55, 255]));
    }

    #[test]
    fn clip_rect_scales_and_clips() {
        let bounds = (100, 50);
        assert_eq!(
            clip_rect(Vec2::new(10.0, 10.0), Vec2::new(5.0, 5.0), 2.0, bounds),
            Some((20, 20, 10, 10))
        );
        assert_eq!(
            clip_rect(Vec2::new(-5.0, 40.0), Vec2::new(20.0, 20.0), 1.0, bounds),
            Some((0, 40, 15, 10))
        );
        assert_eq!(clip_rect(Vec2::new(200.0, 0.0), Vec2::new(5.0, 5.0), 1.0, bounds), None);
        assert_eq!(clip_rect(Vec2::new(0.0, 0.0), Vec2::new(-5.0, 5.0), 1.0, bounds), None);
    }
}
