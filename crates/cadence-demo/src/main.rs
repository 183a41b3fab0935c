use std::time::Duration;

use anyhow::{Context, Result};

use cadence_engine::coords::{SurfaceGeometry, Vec2};
use cadence_engine::core::{EventContext, FrameContext, FrameScheduler, SchedulerConfig, Surface};
use cadence_engine::device::{CanvasOptions, DrawCtx, GpuInit};
use cadence_engine::input::{InputEvent, Key, PointerState};
use cadence_engine::logging::{init_logging, LoggingConfig};
use cadence_engine::paint::Color;
use cadence_engine::time::{IntervalTicker, TickSource};
use cadence_engine::window::{Runtime, RuntimeConfig};

/// Cells per row of the color field.
const COLUMNS: u32 = 24;

/// Hue drift in degrees per second, independent of the frame rate.
const HUE_SPEED: f32 = 40.0;

/// Length of a headless run.
const HEADLESS_RUN: Duration = Duration::from_secs(3);

/// Animation state threaded through every frame.
struct Field {
    phase: f32,
    pulse: f32,
}

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let mut headless = false;
    let mut target_fps = 30.0;
    for arg in std::env::args().skip(1) {
        if arg == "--headless" {
            headless = true;
        } else {
            target_fps = arg
                .parse::<f32>()
                .with_context(|| format!("invalid target fps {arg:?}"))?;
        }
    }

    if headless {
        return run_headless(target_fps, &mut IntervalTicker::new(60.0));
    }

    let config = RuntimeConfig::default()
        .title("cadence")
        .size(960.0, 540.0)
        .canvas(
            CanvasOptions::default()
                .target_fps(target_fps)
                .clear_color(Color::from_srgb_u8(0x10, 0x12, 0x18, 0xff)),
        );

    log::info!("running color field at {target_fps} fps (space: pause, r: restart, esc: quit)");

    let field = Field { phase: 0.0, pulse: 0.0 };
    Runtime::run_with_input(config, GpuInit::default(), field, draw_field, on_input)
}

fn on_input(event: &InputEvent, cx: &mut EventContext<'_, Field>) -> Result<()> {
    if event.is_key_press(&Key::Space) {
        if cx.paused {
            cx.control.resume();
        } else {
            cx.control.pause();
        }
    } else if event.is_key_press(&Key::Character("r".to_string())) {
        if let Some(field) = cx.user_data.as_deref_mut() {
            field.phase = 0.0;
        }
        cx.control.restart();
    } else if event.is_key_press(&Key::Escape) {
        cx.control.dispose();
    }
    Ok(())
}

fn draw_field(frame: &mut FrameContext<'_, DrawCtx>, field: &mut Field) -> Result<()> {
    // One full measurement window per report.
    let report_every = frame.fps.target.round().max(1.0) as u64;
    if frame.frame_index > 0 && frame.frame_index % report_every == 0 {
        log::info!(
            "fps {:.0}/{:.0} (dt {:.1} ms)",
            frame.fps.current,
            frame.fps.target,
            frame.fps.delta * 1000.0
        );
    }

    field.phase = (field.phase + HUE_SPEED * frame.fps.animation_mult).rem_euclid(360.0);

    let target_pulse = if frame.pointer.pressed { 1.0 } else { 0.0 };
    field.pulse += (target_pulse - field.pulse) * (8.0 * frame.fps.animation_mult).min(1.0);

    let viewport = frame.ctx.viewport();
    if !viewport.is_valid() {
        return Ok(());
    }

    let cell = viewport.width / COLUMNS as f32;
    let rows = (viewport.height / cell).ceil() as u32;
    let pointer = Some(frame.pointer.position).filter(|p| frame.pointer.hovering && viewport.contains(*p));
    let reach = viewport.width * (0.15 + 0.25 * field.pulse);

    for row in 0..rows {
        for col in 0..COLUMNS {
            let origin = Vec2::new(col as f32 * cell, row as f32 * cell);
            let center = origin + Vec2::new(cell, cell) * 0.5;
            let uv = viewport.normalize(center);

            let glow = pointer
                .map(|p| (1.0 - center.distance(p) / reach).max(0.0))
                .unwrap_or(0.0);

            let hue = field.phase + uv.x * 120.0 + uv.y * 60.0;
            let color = Color::from_hsv(hue, 0.65 - 0.4 * glow, 0.35 + 0.6 * glow);

            let inset = cell * (0.08 + 0.12 * (1.0 - glow));
            frame.ctx.fill_rect(
                origin + Vec2::new(inset, inset),
                Vec2::new(cell - 2.0 * inset, cell - 2.0 * inset),
                color,
            );
        }
    }

    // Marker centered on the pointer, drawn as a unit square in marker space.
    if let Some(p) = pointer {
        let size = cell * (0.5 + 0.5 * field.pulse);
        frame.ctx.translate(p.x, p.y);
        frame.ctx.scale(size, size);
        frame.ctx.fill_rect(Vec2::new(-0.5, -0.5), Vec2::new(1.0, 1.0), Color::WHITE);
        frame.ctx.reset_transform();
    }

    Ok(())
}

/// Surface without a window: counts presented frames.
struct Headless {
    presented: u64,
}

impl Surface for Headless {
    type Context = u64;

    fn geometry(&self) -> SurfaceGeometry {
        SurfaceGeometry::new((640, 360), 1.0, false)
    }

    fn begin_frame(&mut self) -> Result<bool> {
        Ok(true)
    }

    fn clear(&mut self) {}

    fn context(&mut self) -> &mut u64 {
        &mut self.presented
    }

    fn end_frame(&mut self) {
        self.presented += 1;
    }
}

/// Paces a callback off a simulated display for a few seconds, without a GPU.
fn run_headless(target_fps: f32, ticks: &mut dyn TickSource) -> Result<()> {
    let mut scheduler: FrameScheduler<u64, Duration> = FrameScheduler::new(SchedulerConfig::new(target_fps))?;
    let mut surface = Headless { presented: 0 };

    scheduler.draw(
        |frame, elapsed| {
            *elapsed += Duration::from_secs_f32(frame.fps.delta);
            if frame.frame_index > 0 && frame.frame_index % frame.fps.target.round().max(1.0) as u64 == 0 {
                log::info!("headless fps {:.0}/{:.0}", frame.fps.current, frame.fps.target);
            }
            if *elapsed >= HEADLESS_RUN {
                frame.control.stop();
            }
            Ok(())
        },
        Duration::ZERO,
    )?;

    scheduler.run(ticks, &mut surface, &PointerState::default())?;

    log::info!(
        "headless run done: {} frames presented, measured {:.0} fps",
        surface.presented,
        scheduler.measured_fps()
    );
    Ok(())
}
