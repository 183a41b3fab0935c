use crate::coords::SurfaceGeometry;
use crate::input::PointerState;
use crate::time::FrameTiming;

/// Frame-rate metrics for one fired frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FpsMetrics {
    /// Measured rate: frames counted in the last closed one-second window.
    pub current: f32,

    /// Configured target rate.
    pub target: f32,

    /// Seconds since the previous fired frame.
    pub delta: f32,

    /// `1 / current`; scale per-frame motion by this for rate-independent animation.
    pub animation_mult: f32,
}

impl FpsMetrics {
    pub(crate) fn new(timing: &FrameTiming, target: f32) -> Self {
        Self {
            current: timing.measured_fps,
            target,
            delta: timing.dt,
            animation_mult: 1.0 / timing.measured_fps,
        }
    }
}

/// Loop requests made from a render callback or an input handler.
///
/// Requests are buffered and applied in order after the callback returns.
#[derive(Debug, Default)]
pub struct LoopControl {
    commands: Vec<LoopCommand>,
}

impl LoopControl {
    /// Suppresses the callback from the next tick on; pacing keeps running.
    pub fn pause(&mut self) {
        self.commands.push(LoopCommand::Pause);
    }

    pub fn resume(&mut self) {
        self.commands.push(LoopCommand::Resume);
    }

    /// Stops the loop. `restart` (or `draw`) starts it again.
    pub fn stop(&mut self) {
        self.commands.push(LoopCommand::Stop);
    }

    /// Starts the loop again with the current callback and user data, with
    /// fresh timing. Same as calling `draw` with them.
    pub fn restart(&mut self) {
        self.commands.push(LoopCommand::Restart);
    }

    /// Stops the loop for good and releases the callback.
    pub fn dispose(&mut self) {
        self.commands.push(LoopCommand::Dispose);
    }

    pub(crate) fn drain(&mut self) -> impl Iterator<Item = LoopCommand> + '_ {
        self.commands.drain(..)
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub(crate) enum LoopCommand {
    Pause,
    Resume,
    Stop,
    Restart,
    Dispose,
}

/// Context passed to input handlers.
///
/// Gives handlers the same loop control a render callback has, so a paused or
/// stopped loop can be brought back from outside the callback.
pub struct EventContext<'a, U> {
    pub pointer: &'a PointerState,

    /// `None` before the first `draw`.
    pub user_data: Option<&'a mut U>,

    pub control: &'a mut LoopControl,

    pub running: bool,
    pub paused: bool,
}

/// Per-frame context passed to the render callback.
///
/// Lifetimes:
/// - `'a` is the duration of the callback invocation
pub struct FrameContext<'a, C> {
    /// Surface geometry as of this frame.
    pub surface: SurfaceGeometry,

    /// Drawing context; exclusively borrowed for the duration of the callback.
    pub ctx: &'a mut C,

    pub fps: FpsMetrics,

    /// Pointer state as of the last input event processed before this frame.
    pub pointer: &'a PointerState,

    /// Fired-frame counter since the loop (re)started.
    pub frame_index: u64,

    pub control: &'a mut LoopControl,
}
