use anyhow::Result;

use crate::coords::SurfaceGeometry;

/// Drawable surface driven by the scheduler.
///
/// Implemented by the platform adapter (see `device::Canvas`) and by test
/// doubles. The scheduler calls, per fired frame and in order:
/// `begin_frame`, `clear` (when auto-clear is on), the render callback with
/// `context`, then `end_frame`. Between `begin_frame` and `end_frame` the
/// drawing context belongs to the scheduler's loop.
pub trait Surface {
    /// Drawing context handed to render callbacks.
    type Context;

    fn geometry(&self) -> SurfaceGeometry;

    /// Prepares the next frame.
    ///
    /// `Ok(false)` skips this frame (transient, e.g. surface being reconfigured).
    /// `Err` is fatal and stops the loop.
    fn begin_frame(&mut self) -> Result<bool>;

    fn clear(&mut self);

    fn context(&mut self) -> &mut Self::Context;

    /// Finishes the frame started by `begin_frame` (submit + present).
    fn end_frame(&mut self);
}
