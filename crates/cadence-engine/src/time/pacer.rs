use std::time::{Duration, Instant};

use super::fps::FpsWindow;

/// Timing snapshot for one fired frame.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTiming {
    /// Timestamp of the tick that fired this frame.
    pub now: Instant,

    /// Time since the previous fired frame, in seconds.
    pub dt: f32,

    /// Most recently published frame rate (the target rate until the first
    /// measurement window closes).
    pub measured_fps: f32,

    /// True when this frame closed a measurement window.
    pub window_closed: bool,

    /// Monotonic fired-frame counter since the last reset.
    pub frame_index: u64,
}

/// Throttles a display-rate tick stream down to a target frame rate.
///
/// One `FramePacer` per loop. Feed it every tick through [`advance`](Self::advance);
/// it returns `Some` only for ticks that should fire a frame.
///
/// Scheduling error is carried forward in `drift` so a tick that lands late lets
/// the next frame fire correspondingly early. `drift` is clamped to
/// `[0, interval]`: after a stall the pacer catches up by at most one frame
/// instead of bursting.
#[derive(Debug, Clone)]
pub struct FramePacer {
    target_fps: f32,
    interval: Duration,
    last: Instant,
    drift: Duration,
    window: FpsWindow,
    measured_fps: f32,
    frame_index: u64,
}

impl FramePacer {
    /// Creates a pacer whose first interval starts at `now`.
    ///
    /// `target_fps` must be finite and positive; callers validate it upstream.
    pub fn new(target_fps: f32, now: Instant) -> Self {
        debug_assert!(target_fps.is_finite() && target_fps > 0.0);
        Self {
            target_fps,
            interval: interval_for(target_fps),
            last: now,
            drift: Duration::ZERO,
            window: FpsWindow::new(),
            measured_fps: target_fps,
            frame_index: 0,
        }
    }

    /// Drops all timing state and restarts the first interval at `now`.
    pub fn reset(&mut self, now: Instant) {
        self.last = now;
        self.drift = Duration::ZERO;
        self.window.reset();
        self.measured_fps = self.target_fps;
        self.frame_index = 0;
    }

    /// Processes one tick.
    ///
    /// Returns `None` when the tick arrived too early; no state changes in that case.
    pub fn advance(&mut self, now: Instant) -> Option<FrameTiming> {
        let elapsed = now.saturating_duration_since(self.last);

        if elapsed < self.interval.saturating_sub(self.drift) {
            return None;
        }

        let closed = self.window.record(elapsed);
        if let Some(count) = closed {
            self.measured_fps = count as f32;
            log::trace!("fps window closed: {count} frames");
        }

        // drift + elapsed - interval, clamped to [0, interval].
        self.drift = (self.drift + elapsed)
            .saturating_sub(self.interval)
            .min(self.interval);

        self.last = now;

        let timing = FrameTiming {
            now,
            dt: elapsed.as_secs_f32(),
            measured_fps: self.measured_fps,
            window_closed: closed.is_some(),
            frame_index: self.frame_index,
        };

        self.frame_index = self.frame_index.wrapping_add(1);

        Some(timing)
    }

    pub fn target_fps(&self) -> f32 {
        self.target_fps
    }

    /// Ideal time between fired frames.
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Accumulated scheduling error, always within `[0, interval]`.
    pub fn drift(&self) -> Duration {
        self.drift
    }

    pub fn measured_fps(&self) -> f32 {
        self.measured_fps
    }

    /// Timestamp of the last fired frame (or of the last reset).
    pub fn last_tick(&self) -> Instant {
        self.last
    }

    /// Earliest tick timestamp that fires the next frame.
    pub fn next_due(&self) -> Instant {
        self.last + self.interval.saturating_sub(self.drift)
    }

    pub fn window(&self) -> &FpsWindow {
        &self.window
    }
}

/// Frame interval for a target rate.
///
/// Saturates at `Duration::MAX` for rates whose interval does not fit; use
/// [`try_interval_for`] to detect that case.
pub fn interval_for(target_fps: f32) -> Duration {
    try_interval_for(target_fps).unwrap_or(Duration::MAX)
}

/// Frame interval for a target rate, or `None` when it is not representable.
pub fn try_interval_for(target_fps: f32) -> Option<Duration> {
    Duration::try_from_secs_f64(1.0 / f64::from(target_fps)).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Tick period for a display rate, rounded up to whole nanoseconds.
    fn hz(rate: u64) -> Duration {
        Duration::from_nanos(1_000_000_000_u64.div_ceil(rate))
    }

    /// Feeds `ticks` evenly spaced ticks and returns the fired frames.
    fn run(pacer: &mut FramePacer, start: Instant, period: Duration, ticks: u32) -> Vec<FrameTiming> {
        (1..=ticks)
            .filter_map(|k| pacer.advance(start + period * k))
            .collect()
    }

    /// Small deterministic jitter source (LCG), in microseconds.
    fn jitter(seed: &mut u64, max_us: u64) -> Duration {
        *seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
        Duration::from_micros((*seed >> 33) % (max_us + 1))
    }

    #[test]
    fn thirty_fps_on_sixty_hz_fires_every_other_tick() {
        let t0 = Instant::now();
        let mut pacer = FramePacer::new(30.0, t0);

        let fired: Vec<bool> = (1..=8)
            .map(|k| pacer.advance(t0 + hz(60) * k).is_some())
            .collect();
        assert_eq!(fired, vec![false, true, false, true, false, true, false, true]);
    }

    #[test]
    fn measured_fps_converges_after_first_second() {
        let t0 = Instant::now();
        let mut pacer = FramePacer::new(30.0, t0);

        let frames = run(&mut pacer, t0, hz(60), 60 * 3);
        let closes: Vec<&FrameTiming> = frames.iter().filter(|f| f.window_closed).collect();

        assert!(!closes.is_empty());
        for f in &closes {
            assert!((f.measured_fps - 30.0).abs() <= 1.0, "measured {}", f.measured_fps);
        }
        assert!((pacer.measured_fps() - 30.0).abs() <= 1.0);
    }

    #[test]
    fn measured_fps_starts_at_target() {
        let t0 = Instant::now();
        let mut pacer = FramePacer::new(45.0, t0);
        let first = pacer.advance(t0 + Duration::from_millis(30)).unwrap();
        assert_eq!(first.measured_fps, 45.0);
        assert!(!first.window_closed);
    }

    #[test]
    fn long_run_rate_matches_target() {
        let cases = [(30.0_f32, 60_u64), (24.0, 144), (50.0, 120), (60.0, 240), (60.0, 60)];

        for (target, rate) in cases {
            let t0 = Instant::now();
            let mut pacer = FramePacer::new(target, t0);
            let seconds = 10;
            let fired = run(&mut pacer, t0, hz(rate), (rate * seconds) as u32).len() as f32;
            let expected = target * seconds as f32;
            assert!(
                (fired - expected).abs() <= expected * 0.02 + 1.0,
                "target {target} @ {rate}Hz fired {fired}, expected ~{expected}"
            );
        }
    }

    #[test]
    fn throttled_tick_changes_nothing() {
        let t0 = Instant::now();
        let mut pacer = FramePacer::new(30.0, t0);
        let before = (pacer.last_tick(), pacer.drift(), pacer.window().frames());

        assert!(pacer.advance(t0 + Duration::from_millis(5)).is_none());
        assert_eq!((pacer.last_tick(), pacer.drift(), pacer.window().frames()), before);
    }

    #[test]
    fn drift_stays_within_interval_under_jitter() {
        let t0 = Instant::now();
        let mut pacer = FramePacer::new(60.0, t0);
        let mut seed = 7_u64;
        let mut now = t0;

        for _ in 0..5_000 {
            now += Duration::from_millis(4) + jitter(&mut seed, 40_000);
            pacer.advance(now);
            assert!(pacer.drift() <= pacer.interval());
        }
    }

    #[test]
    fn stall_does_not_cause_catch_up_burst() {
        let t0 = Instant::now();
        let mut pacer = FramePacer::new(30.0, t0);
        let interval = pacer.interval();

        run(&mut pacer, t0, hz(60), 60);

        // One long stall, then a flood of 1ms ticks.
        let delay = Duration::from_millis(500);
        let stall_end = pacer.last_tick() + delay;
        assert!(pacer.advance(stall_end).is_some());
        assert_eq!(pacer.drift(), interval);

        let fired = run(&mut pacer, stall_end, Duration::from_millis(1), 100).len();

        // 100ms at 30fps is three frames; the clamp allows one extra.
        assert!((3..=4).contains(&fired), "fired {fired}");

        let bound = (delay.as_secs_f64() / interval.as_secs_f64()).ceil() as usize;
        assert!(fired - 3 <= bound);
    }

    #[test]
    fn reset_restores_fresh_state() {
        let t0 = Instant::now();
        let mut pacer = FramePacer::new(30.0, t0);
        run(&mut pacer, t0, Duration::from_millis(47), 100);
        assert!(pacer.drift() > Duration::ZERO);

        let t1 = t0 + Duration::from_secs(60);
        pacer.reset(t1);
        assert_eq!(pacer.drift(), Duration::ZERO);
        assert_eq!(pacer.last_tick(), t1);
        assert_eq!(pacer.window().frames(), 0);
        assert_eq!(pacer.measured_fps(), 30.0);

        let first = pacer.advance(t1 + interval_for(30.0)).unwrap();
        assert_eq!(first.frame_index, 0);
    }

    #[test]
    fn next_due_is_the_firing_threshold() {
        let t0 = Instant::now();
        let mut pacer = FramePacer::new(30.0, t0);
        pacer.advance(t0 + Duration::from_millis(40)).unwrap();

        let due = pacer.next_due();
        assert!(due < t0 + Duration::from_millis(40) + pacer.interval());
        assert!(pacer.clone().advance(due - Duration::from_nanos(1)).is_none());
        assert!(pacer.advance(due).is_some());
    }

    #[test]
    fn measured_fps_recomputed_once_per_second() {
        let t0 = Instant::now();
        let mut pacer = FramePacer::new(30.0, t0);
        let frames = run(&mut pacer, t0, hz(60), 60 * 10);
        assert_eq!(frames.len(), 300);
        assert_eq!(frames.iter().filter(|f| f.window_closed).count(), 10);
    }

    #[test]
    fn interval_for_tiny_rates_does_not_panic() {
        assert_eq!(try_interval_for(1e-30), None);
        assert_eq!(interval_for(1e-30), Duration::MAX);
        assert_eq!(try_interval_for(0.5), Some(Duration::from_secs(2)));
    }

    #[test]
    fn earlier_timestamp_is_throttled() {
        let t0 = Instant::now() + Duration::from_secs(1);
        let mut pacer = FramePacer::new(30.0, t0);
        assert!(pacer.advance(t0 - Duration::from_millis(10)).is_none());
    }
}
