//! GPU device + surface management.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating & configuring the Surface (swapchain)
//! - the `Canvas`: the wgpu-backed `core::Surface` the runtime hands to the scheduler

mod canvas;
mod error;
mod frame;
mod gpu;
mod init;
mod surface;

pub use canvas::{Canvas, CanvasOptions, DrawCtx, RenderTarget};
pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use gpu::Gpu;
pub use init::GpuInit;
