use std::time::{Duration, Instant};

use crate::input::PointerState;
use crate::time::{FramePacer, TickSource};

use super::config::SchedulerConfig;
use super::ctx::{EventContext, FpsMetrics, FrameContext, LoopCommand, LoopControl};
use super::error::SchedulerError;
use super::surface::Surface;

/// Render callback: receives the frame context and the caller's user data.
///
/// Returning `Err` stops the loop.
pub type RenderFn<C, U> = dyn FnMut(&mut FrameContext<'_, C>, &mut U) -> anyhow::Result<()>;

/// Result of feeding one tick to the scheduler.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TickOutcome {
    /// No loop is running (never started, stopped, or disposed).
    Idle,
    /// Tick arrived before the next frame was due.
    Throttled,
    /// Frame was due but the callback is paused.
    Paused,
    /// Frame was due but the surface could not provide one.
    Skipped,
    /// Callback ran.
    Fired,
}

/// Timing state of the active loop.
///
/// Created by the first `draw`, reset (not replaced) by later ones.
#[derive(Debug, Clone)]
pub struct ScheduleState {
    running: bool,
    pacer: FramePacer,
}

impl ScheduleState {
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn pacer(&self) -> &FramePacer {
        &self.pacer
    }
}

/// Frame-pacing scheduler.
///
/// Converts a display-rate tick stream into a throttled, measured, pausable
/// cadence and invokes a render callback on every fired frame.
///
/// The scheduler is a state machine advanced once per tick ([`tick`](Self::tick)),
/// so one scheduler can only ever run one loop: `draw` on a running scheduler
/// replaces the callback and resets timing instead of starting a second loop.
/// [`run`](Self::run) drives it from a blocking [`TickSource`].
///
/// `C` is the surface's drawing context type, `U` the user data threaded into
/// every callback invocation.
pub struct FrameScheduler<C, U = ()> {
    config: SchedulerConfig,
    schedule: Option<ScheduleState>,
    render: Option<Box<RenderFn<C, U>>>,
    user_data: Option<U>,
    paused: bool,
    disposed: bool,
    generation: u64,
}

impl<C, U> FrameScheduler<C, U> {
    pub fn new(config: SchedulerConfig) -> Result<Self, SchedulerError> {
        config.validate()?;
        Ok(Self {
            config,
            schedule: None,
            render: None,
            user_data: None,
            paused: false,
            disposed: false,
            generation: 0,
        })
    }

    /// Starts the loop with timing anchored at the current instant.
    ///
    /// See [`draw_at`](Self::draw_at).
    pub fn draw<F>(&mut self, callback: F, user_data: U) -> Result<(), SchedulerError>
    where
        F: FnMut(&mut FrameContext<'_, C>, &mut U) -> anyhow::Result<()> + 'static,
    {
        self.draw_at(Instant::now(), callback, user_data)
    }

    /// Starts the loop, or restarts it when already running.
    ///
    /// A restart supersedes the previous callback: its next tick belongs to the
    /// new one, and timing starts fresh from `now` (no drift, empty FPS window).
    /// The pause flag is left as is.
    pub fn draw_at<F>(&mut self, now: Instant, callback: F, user_data: U) -> Result<(), SchedulerError>
    where
        F: FnMut(&mut FrameContext<'_, C>, &mut U) -> anyhow::Result<()> + 'static,
    {
        if self.disposed {
            return Err(SchedulerError::Disposed);
        }

        self.start_schedule(now);

        self.render = Some(Box::new(callback));
        self.user_data = Some(user_data);
        Ok(())
    }

    /// Restarts the loop with the current callback and user data.
    ///
    /// See [`restart_at`](Self::restart_at).
    pub fn restart(&mut self) -> Result<(), SchedulerError> {
        self.restart_at(Instant::now())
    }

    /// Same as `draw_at` with the callback and user data already registered.
    ///
    /// Fails with [`SchedulerError::NotStarted`] before the first `draw`.
    pub fn restart_at(&mut self, now: Instant) -> Result<(), SchedulerError> {
        if self.disposed {
            return Err(SchedulerError::Disposed);
        }
        if self.render.is_none() {
            return Err(SchedulerError::NotStarted);
        }
        self.start_schedule(now);
        Ok(())
    }

    fn start_schedule(&mut self, now: Instant) {
        self.generation = self.generation.wrapping_add(1);

        match &mut self.schedule {
            Some(schedule) => {
                if schedule.running {
                    log::debug!("restarting frame loop (generation {})", self.generation);
                } else {
                    log::debug!("starting frame loop (generation {})", self.generation);
                }
                schedule.pacer.reset(now);
                schedule.running = true;
            }
            None => {
                log::debug!(
                    "starting frame loop at {} fps (generation {})",
                    self.config.target_fps,
                    self.generation
                );
                self.schedule = Some(ScheduleState {
                    running: true,
                    pacer: FramePacer::new(self.config.target_fps, now),
                });
            }
        }
    }

    /// Runs an input handler outside of a frame.
    ///
    /// The handler gets the user data and a [`LoopControl`]; its requests are
    /// applied at `now` once it returns. A handler error stops the loop like a
    /// callback error does.
    pub fn dispatch<F>(&mut self, now: Instant, pointer: &PointerState, handler: F) -> Result<(), SchedulerError>
    where
        F: FnOnce(&mut EventContext<'_, U>) -> anyhow::Result<()>,
    {
        if self.disposed {
            return Err(SchedulerError::Disposed);
        }

        let mut control = LoopControl::default();
        let (running, paused) = (self.is_running(), self.paused);

        let result = {
            let mut cx = EventContext {
                pointer,
                user_data: self.user_data_mut(),
                control: &mut control,
                running,
                paused,
            };
            handler(&mut cx)
        };

        if let Err(err) = result {
            self.stop();
            log::error!("input handler failed, frame loop stopped: {err:#}");
            return Err(SchedulerError::Callback(err));
        }

        self.apply_control(now, &mut control)
    }

    fn apply_control(&mut self, now: Instant, control: &mut LoopControl) -> Result<(), SchedulerError> {
        for cmd in control.drain() {
            match cmd {
                LoopCommand::Pause => self.pause(),
                LoopCommand::Resume => self.resume(),
                LoopCommand::Stop => self.stop(),
                LoopCommand::Restart => self.restart_at(now)?,
                LoopCommand::Dispose => self.dispose(),
            }
        }
        Ok(())
    }

    /// Runs one loop iteration for a tick at `now`.
    ///
    /// On a due frame: `begin_frame`, optional clear, callback (unless paused),
    /// `end_frame`. A callback or surface error stops the loop and is returned.
    pub fn tick<S>(
        &mut self,
        now: Instant,
        surface: &mut S,
        pointer: &PointerState,
    ) -> Result<TickOutcome, SchedulerError>
    where
        S: Surface<Context = C>,
    {
        if self.disposed {
            return Ok(TickOutcome::Idle);
        }

        let Some(schedule) = self.schedule.as_mut().filter(|s| s.running) else {
            return Ok(TickOutcome::Idle);
        };

        let Some(timing) = schedule.pacer.advance(now) else {
            return Ok(TickOutcome::Throttled);
        };

        // Nothing to draw and nothing to clear.
        if self.paused && !self.config.auto_clear {
            return Ok(TickOutcome::Paused);
        }

        match surface.begin_frame() {
            Ok(true) => {}
            Ok(false) => return Ok(TickOutcome::Skipped),
            Err(err) => {
                schedule.running = false;
                log::error!("surface failed, frame loop stopped: {err:#}");
                return Err(SchedulerError::Surface(err));
            }
        }

        if self.config.auto_clear {
            surface.clear();
        }

        if self.paused {
            surface.end_frame();
            return Ok(TickOutcome::Paused);
        }

        let (Some(render), Some(user_data)) = (self.render.as_mut(), self.user_data.as_mut()) else {
            surface.end_frame();
            return Ok(TickOutcome::Idle);
        };

        let mut control = LoopControl::default();
        let geometry = surface.geometry();

        // Scope to ensure the context borrow ends before the frame is finished.
        let result = {
            let mut frame = FrameContext {
                surface: geometry,
                ctx: surface.context(),
                fps: FpsMetrics::new(&timing, self.config.target_fps),
                pointer,
                frame_index: timing.frame_index,
                control: &mut control,
            };

            render(&mut frame, user_data)
        };

        surface.end_frame();

        if let Err(err) = result {
            schedule.running = false;
            log::error!("render callback failed, frame loop stopped: {err:#}");
            return Err(SchedulerError::Callback(err));
        }

        self.apply_control(now, &mut control)?;

        Ok(TickOutcome::Fired)
    }

    /// Blocking loop: waits on `ticks` and feeds each tick to [`tick`](Self::tick).
    ///
    /// Returns when the loop is stopped or disposed, or when the tick source
    /// detaches. A source that never ticks keeps this suspended.
    pub fn run<T, S>(
        &mut self,
        ticks: &mut T,
        surface: &mut S,
        pointer: &PointerState,
    ) -> Result<(), SchedulerError>
    where
        T: TickSource + ?Sized,
        S: Surface<Context = C>,
    {
        if self.disposed {
            return Err(SchedulerError::Disposed);
        }

        while self.is_running() {
            let Some(now) = ticks.next_tick() else {
                log::debug!("tick source detached");
                break;
            };
            self.tick(now, surface, pointer)?;
        }

        Ok(())
    }

    /// Stops the loop; the next tick is a no-op. Idempotent.
    pub fn stop(&mut self) {
        if let Some(schedule) = self.schedule.as_mut().filter(|s| s.running) {
            schedule.running = false;
            log::debug!("frame loop stopped (generation {})", self.generation);
        }
    }

    /// Suppresses the callback; pacing and FPS measurement keep running.
    pub fn pause(&mut self) {
        if self.disposed {
            log::warn!("pause() on a disposed scheduler ignored");
            return;
        }
        if !self.paused {
            self.paused = true;
            log::debug!("frame loop paused");
        }
    }

    pub fn resume(&mut self) {
        if self.disposed {
            log::warn!("resume() on a disposed scheduler ignored");
            return;
        }
        if self.paused {
            self.paused = false;
            log::debug!("frame loop resumed");
        }
    }

    /// Stops the loop for good and drops the callback and user data.
    ///
    /// Later ticks are no-ops and `draw` returns [`SchedulerError::Disposed`].
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.stop();
        self.render = None;
        self.user_data = None;
        self.disposed = true;
        log::debug!("frame scheduler disposed");
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn schedule(&self) -> Option<&ScheduleState> {
        self.schedule.as_ref()
    }

    pub fn is_running(&self) -> bool {
        !self.disposed && self.schedule.as_ref().is_some_and(|s| s.running)
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    pub fn target_fps(&self) -> f32 {
        self.config.target_fps
    }

    /// Last published measured rate; the target rate before the loop starts.
    pub fn measured_fps(&self) -> f32 {
        self.schedule
            .as_ref()
            .map_or(self.config.target_fps, |s| s.pacer.measured_fps())
    }

    /// Earliest tick that fires the next frame; `None` when no loop is running.
    pub fn next_due(&self) -> Option<Instant> {
        self.schedule
            .as_ref()
            .filter(|s| s.running && !self.disposed)
            .map(|s| s.pacer.next_due())
    }

    pub fn drift(&self) -> Duration {
        self.schedule
            .as_ref()
            .map_or(Duration::ZERO, |s| s.pacer.drift())
    }

    /// Number of `draw` calls accepted so far.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn user_data(&self) -> Option<&U> {
        self.user_data.as_ref()
    }

    pub fn user_data_mut(&mut self) -> Option<&mut U> {
        self.user_data.as_mut()
    }
}
