use std::time::Duration;

const WINDOW: Duration = Duration::from_secs(1);

/// Rolling frame-rate window.
///
/// Counts fired frames until the accumulated frame time exceeds one second,
/// then publishes the count as the measured rate and starts a new window.
/// The published value is an integer frame count, so it only changes once per
/// closed window rather than jittering every frame.
///
/// A window closes on the first frame that pushes it *past* one second, so its
/// length is always at least one second and usually slightly more.
#[derive(Debug, Clone, Default)]
pub struct FpsWindow {
    elapsed: Duration,
    frames: u32,
}

impl FpsWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one fired frame of length `dt`.
    ///
    /// Returns the frame count of the window when this frame closed it.
    pub fn record(&mut self, dt: Duration) -> Option<u32> {
        self.elapsed += dt;
        self.frames += 1;

        if self.elapsed > WINDOW {
            let count = self.frames;
            self.reset();
            return Some(count);
        }

        None
    }

    pub fn reset(&mut self) {
        self.elapsed = Duration::ZERO;
        self.frames = 0;
    }

    /// Time accumulated in the open window.
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Frames counted in the open window.
    pub fn frames(&self) -> u32 {
        self.frames
    }
}
