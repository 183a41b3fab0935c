use std::time::Instant;

use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{EventContext, FrameContext, FrameScheduler, TickOutcome};
use crate::device::{Canvas, CanvasOptions, DrawCtx, GpuInit};
use crate::input::platform::winit::translate_window_event;
use crate::input::{InputEvent, PointerState};

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub canvas: CanvasOptions,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "cadence".to_string(),
            initial_size: LogicalSize::new(1280.0, 720.0),
            canvas: CanvasOptions::default(),
        }
    }
}

impl RuntimeConfig {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn size(mut self, width: f64, height: f64) -> Self {
        self.initial_size = LogicalSize::new(width, height);
        self
    }

    pub fn canvas(mut self, canvas: CanvasOptions) -> Self {
        self.canvas = canvas;
        self
    }
}

/// Entry point for the runtime.
///
/// Opens one window with a managed [`Canvas`] and drives a [`FrameScheduler`]
/// from the window's redraw ticks until the window closes or the loop is
/// disposed.
pub struct Runtime;

impl Runtime {
    /// Runs `callback` at `config.canvas.target_fps` until the window closes.
    ///
    /// Blocks the calling thread. A callback or surface failure stops the loop,
    /// closes the window and is returned.
    pub fn run<U, F>(config: RuntimeConfig, gpu_init: GpuInit, user_data: U, callback: F) -> Result<()>
    where
        U: 'static,
        F: FnMut(&mut FrameContext<'_, DrawCtx>, &mut U) -> Result<()> + 'static,
    {
        Self::run_with_input(config, gpu_init, user_data, callback, |_, _| Ok(()))
    }

    /// Like [`run`](Self::run), with `on_input` called for every input event.
    ///
    /// The handler can pause, resume, stop, restart or dispose the loop through
    /// `cx.control`, which is how a loop paused or stopped from the render
    /// callback is brought back. Pointer events are only delivered when
    /// `track_pointer` is on.
    pub fn run_with_input<U, F, H>(
        config: RuntimeConfig,
        gpu_init: GpuInit,
        user_data: U,
        callback: F,
        on_input: H,
    ) -> Result<()>
    where
        U: 'static,
        F: FnMut(&mut FrameContext<'_, DrawCtx>, &mut U) -> Result<()> + 'static,
        H: FnMut(&InputEvent, &mut EventContext<'_, U>) -> Result<()> + 'static,
    {
        let scheduler = FrameScheduler::new(config.canvas.scheduler_config())?;
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, scheduler, callback, user_data, on_input);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.failure.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    pointer: PointerState,

    window: Window,

    #[borrows(window)]
    #[covariant]
    canvas: Canvas<'this>,
}

struct AppState<U, F, H>
where
    U: 'static,
    F: FnMut(&mut FrameContext<'_, DrawCtx>, &mut U) -> Result<()> + 'static,
    H: FnMut(&InputEvent, &mut EventContext<'_, U>) -> Result<()> + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,

    scheduler: FrameScheduler<DrawCtx, U>,

    /// Callback and user data until the loop is started on the first `resumed`.
    pending: Option<(F, U)>,

    on_input: H,

    entry: Option<WindowEntry>,

    /// The runtime paused the loop because the window became invisible.
    paused_by_occlusion: bool,

    failure: Option<anyhow::Error>,
    exit_requested: bool,
}

impl<U, F, H> AppState<U, F, H>
where
    U: 'static,
    F: FnMut(&mut FrameContext<'_, DrawCtx>, &mut U) -> Result<()> + 'static,
    H: FnMut(&InputEvent, &mut EventContext<'_, U>) -> Result<()> + 'static,
{
    fn new(
        config: RuntimeConfig,
        gpu_init: GpuInit,
        scheduler: FrameScheduler<DrawCtx, U>,
        callback: F,
        user_data: U,
        on_input: H,
    ) -> Self {
        Self {
            config,
            gpu_init,
            scheduler,
            pending: Some((callback, user_data)),
            on_input,
            entry: None,
            paused_by_occlusion: false,
            failure: None,
            exit_requested: false,
        }
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        log::error!("{err:#}");
        self.failure.get_or_insert(err);
        self.close(event_loop);
    }

    fn close(&mut self, event_loop: &ActiveEventLoop) {
        self.scheduler.dispose();
        self.entry = None;
        self.exit_requested = true;
        event_loop.exit();
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let gpu_init = self.gpu_init.clone();
        let options = &self.config.canvas;

        let entry = WindowEntryTryBuilder {
            pointer: PointerState::default(),
            window,
            canvas_builder: |w| {
                pollster::block_on(Canvas::new(w, gpu_init, options))
                    .context("GPU initialization failed for window")
            },
        }
        .try_build()?;

        self.entry = Some(entry);
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        if let Some((callback, user_data)) = self.pending.take() {
            self.scheduler.draw(callback, user_data)?;
        }
        Ok(())
    }

    fn redraw(&mut self, event_loop: &ActiveEventLoop) {
        // Split borrows to avoid `self` capture inside `ouroboros` closures.
        let (scheduler, entry) = (&mut self.scheduler, &mut self.entry);
        let Some(entry) = entry.as_mut() else {
            return;
        };

        let result = entry.with_mut(|fields| scheduler.tick(Instant::now(), fields.canvas, fields.pointer));

        match result {
            Ok(TickOutcome::Skipped) => log::trace!("no drawable this tick"),
            Ok(_) => {}
            Err(err) => {
                self.fail(event_loop, err.into());
                return;
            }
        }

        if self.scheduler.is_disposed() {
            log::debug!("frame loop disposed from callback, closing window");
            self.close(event_loop);
        }
    }

    /// Applies pointer events to the pointer state, then hands the event to the
    /// input handler.
    fn deliver(&mut self, event_loop: &ActiveEventLoop, event: InputEvent) {
        let (scheduler, on_input, entry) = (&mut self.scheduler, &mut self.on_input, &mut self.entry);
        let Some(entry) = entry.as_mut() else {
            return;
        };

        if let InputEvent::Pointer(ev) = &event {
            entry.with_pointer_mut(|pointer| pointer.apply_event(*ev));
        }

        let now = Instant::now();
        let result = entry.with_pointer(|pointer| scheduler.dispatch(now, pointer, |cx| on_input(&event, cx)));

        if let Err(err) = result {
            self.fail(event_loop, err.into());
            return;
        }

        if self.scheduler.is_disposed() {
            log::debug!("frame loop disposed from input handler, closing window");
            self.close(event_loop);
        }
    }

    fn on_occluded(&mut self, occluded: bool) {
        if occluded {
            if !self.scheduler.is_paused() {
                self.scheduler.pause();
                self.paused_by_occlusion = true;
            }
        } else if self.paused_by_occlusion {
            self.paused_by_occlusion = false;
            self.scheduler.resume();
        }
    }
}

impl<U, F, H> ApplicationHandler for AppState<U, F, H>
where
    U: 'static,
    F: FnMut(&mut FrameContext<'_, DrawCtx>, &mut U) -> Result<()> + 'static,
    H: FnMut(&InputEvent, &mut EventContext<'_, U>) -> Result<()> + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || self.exit_requested {
            return;
        }

        if let Err(e) = self.create_window_entry(event_loop) {
            self.fail(event_loop, e.context("failed to create initial window"));
            return;
        }

        if let Err(e) = self.start() {
            self.fail(event_loop, e);
            return;
        }

        if let Some(entry) = &self.entry {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let Some(entry) = &self.entry else {
            event_loop.set_control_flow(ControlFlow::Wait);
            return;
        };

        // Sleep until the next frame is due instead of redrawing at display rate.
        match self.scheduler.next_due() {
            Some(due) if Instant::now() >= due => {
                event_loop.set_control_flow(ControlFlow::Wait);
                entry.with_window(|w| w.request_redraw());
            }
            Some(due) => event_loop.set_control_flow(ControlFlow::WaitUntil(due)),
            None => event_loop.set_control_flow(ControlFlow::Wait),
        }
    }

    fn window_event(&mut self, event_loop: &ActiveEventLoop, _window_id: WindowId, event: WindowEvent) {
        if self.exit_requested {
            event_loop.exit();
            return;
        }

        let Some(entry) = &self.entry else {
            return;
        };

        let input = entry
            .with_window(|w| translate_window_event(w, &event))
            .filter(|ev| self.config.canvas.track_pointer || !matches!(ev, InputEvent::Pointer(_)));

        if let Some(input) = input {
            self.deliver(event_loop, input);
            if self.exit_requested {
                return;
            }
        }

        let Some(entry) = self.entry.as_mut() else {
            return;
        };

        match &event {
            WindowEvent::CloseRequested => {
                log::trace!("window close requested");
                self.close(event_loop);
            }

            WindowEvent::Resized(new_size) => {
                entry.with_canvas_mut(|canvas| canvas.on_resized(*new_size));
            }

            WindowEvent::Moved(_) => {
                entry.with_canvas_mut(|canvas| canvas.on_moved());
            }

            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                entry.with_canvas_mut(|canvas| canvas.on_scale_factor_changed(*scale_factor));
            }

            WindowEvent::Occluded(occluded) => self.on_occluded(*occluded),

            WindowEvent::RedrawRequested => self.redraw(event_loop),

            _ => {}
        }
    }
}
