use std::env;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{DeviceEvent, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{ModifiersState, PhysicalKey};
use winit::window::WindowBuilder;

use crate::config::save_options;
use crate::input::{InputEvent, NoJoysticks};
use crate::session::{FrameOutcome, Session};
use crate::sim::Simulation;

use super::keymap::{key_event, mouse_button_event};
use super::window::WindowFrontend;

pub const FPS_ENV_VAR: &str = "RAILCAB_FPS";

/// Frame pacing target while the driver has CPU mode (limit frame rate) on.
pub const LIMITED_FPS: u32 = 30;

/// Sleep after each frame spent in `Pause`.
pub const PAUSED_SLEEP: Duration = Duration::from_millis(10);

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    pub window_width: u32,
    pub window_height: u32,
    /// Render pacing target; `None` or 0 runs uncapped.
    pub target_fps: Option<u32>,
    pub metrics_log_interval: Duration,
    /// Where the session's options are written on shutdown; `None` skips it.
    pub options_file: Option<PathBuf>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "cabview".to_string(),
            window_width: 960,
            window_height: 600,
            target_fps: None,
            metrics_log_interval: Duration::from_secs(1),
            options_file: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum HostError {
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize pixel surface: {0}")]
    CreateSurface(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

/// Opens the cab window and drives `session` until it asks to quit.
pub fn run_app<S: Simulation>(
    config: LoopConfig,
    mut session: Session,
    mut simulation: S,
) -> Result<(), HostError> {
    let event_loop = EventLoop::new().map_err(HostError::CreateEventLoop)?;
    let window: &'static winit::window::Window = Box::leak(Box::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(HostError::CreateWindow)?,
    ));
    let mut frontend =
        WindowFrontend::new(window, config.window_title.clone()).map_err(HostError::CreateSurface)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let render_cap = normalize_fps_cap(resolve_fps_cap(config.target_fps));
    let metrics_log_interval =
        normalize_non_zero_duration(config.metrics_log_interval, Duration::from_secs(1));
    info!(
        render_fps_cap = %format_fps_cap(render_cap),
        limited_fps = LIMITED_FPS,
        metrics_log_interval_ms = metrics_log_interval.as_millis() as u64,
        "loop_config"
    );

    let options_file = config.options_file.clone();
    let metrics = session.metrics_handle();
    let mut joysticks = NoJoysticks;
    let mut modifiers = ModifiersState::empty();
    let mut last_frame_instant = Instant::now();
    let mut last_present_instant = Instant::now();
    let mut last_metrics_log = Instant::now();

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window.id() => match event {
                WindowEvent::CloseRequested => {
                    info!(reason = "window_close", "shutdown_requested");
                    session.push_event(InputEvent::Quit);
                }
                WindowEvent::Resized(new_size) => {
                    session.push_event(InputEvent::Resize {
                        width: new_size.width,
                        height: new_size.height,
                    });
                    if let Err(error) = frontend.resize(new_size.width, new_size.height) {
                        warn!(error = %error, "surface_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::ScaleFactorChanged { .. } => {
                    let size = window.inner_size();
                    if let Err(error) = frontend.resize(size.width, size.height) {
                        warn!(error = %error, "surface_resize_failed");
                        window_target.exit();
                    }
                }
                WindowEvent::ModifiersChanged(new_modifiers) => {
                    modifiers = new_modifiers.state();
                }
                WindowEvent::KeyboardInput { event, .. } => {
                    if let PhysicalKey::Code(code) = event.physical_key {
                        if let Some(input) = key_event(code, event.state, event.repeat, modifiers)
                        {
                            session.push_event(input);
                        }
                    }
                }
                WindowEvent::MouseInput { state, button, .. } => {
                    if let Some(input) = mouse_button_event(button, state) {
                        session.push_event(input);
                    }
                }
                WindowEvent::RedrawRequested => {
                    let now = Instant::now();
                    let real_dt = now.saturating_duration_since(last_frame_instant);
                    last_frame_instant = now;

                    let outcome = session.update_frame(
                        real_dt.as_secs_f64(),
                        &mut simulation,
                        &mut frontend,
                        &mut joysticks,
                    );
                    frontend.sync_cursor_grab(session.mouse_grab_enabled());
                    match outcome {
                        FrameOutcome::Quit(request) => {
                            info!(request = ?request, "shutdown_requested");
                            window_target.exit();
                            return;
                        }
                        FrameOutcome::Paused => thread::sleep(PAUSED_SLEEP),
                        FrameOutcome::Continue => {}
                    }

                    let target = frame_target(render_cap, session.display().limit_frame_rate);
                    let elapsed_since_last_present =
                        Instant::now().saturating_duration_since(last_present_instant);
                    let cap_sleep = compute_cap_sleep(elapsed_since_last_present, target);
                    if cap_sleep > Duration::ZERO {
                        thread::sleep(cap_sleep);
                    }

                    session.render_frame(&mut frontend);
                    if let Some(error) = frontend.take_render_error() {
                        warn!(error = %error, "surface_draw_failed");
                        window_target.exit();
                    }
                    last_present_instant = Instant::now();

                    if now.saturating_duration_since(last_metrics_log) >= metrics_log_interval {
                        last_metrics_log = now;
                        let snapshot = metrics.snapshot();
                        info!(
                            fps = snapshot.fps,
                            time_factor = snapshot.time_factor,
                            sub_steps = snapshot.sub_steps,
                            mode = ?session.mode(),
                            "loop_metrics"
                        );
                    }
                }
                _ => {}
            },
            Event::DeviceEvent {
                event: DeviceEvent::MouseMotion { delta },
                ..
            } => {
                session.push_event(InputEvent::MouseMotion {
                    dx: delta.0,
                    dy: delta.1,
                });
            }
            Event::AboutToWait => {
                window.request_redraw();
            }
            Event::LoopExiting => {
                if let Some(path) = &options_file {
                    persist_options(path, &session);
                }
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(HostError::EventLoopRun)
}

fn persist_options(path: &Path, session: &Session) {
    match save_options(path, &session.current_options()) {
        Ok(()) => info!(path = %path.display(), "options_saved"),
        Err(error) => warn!(error = %error, "options_save_failed"),
    }
}

fn normalize_non_zero_duration(value: Duration, fallback: Duration) -> Duration {
    if value.is_zero() {
        fallback
    } else {
        value
    }
}

fn normalize_fps_cap(cap: Option<u32>) -> Option<u32> {
    cap.filter(|value| *value > 0)
}

fn target_frame_duration(fps: Option<u32>) -> Option<Duration> {
    fps.map(|fps| Duration::from_secs_f64(1.0 / fps as f64))
}

/// CPU mode lowers the pacing target but never raises it.
fn frame_target(render_cap: Option<u32>, limit_frame_rate: bool) -> Option<Duration> {
    let cap = if limit_frame_rate {
        Some(render_cap.map_or(LIMITED_FPS, |cap| cap.min(LIMITED_FPS)))
    } else {
        render_cap
    };
    target_frame_duration(cap)
}

fn compute_cap_sleep(elapsed: Duration, target: Option<Duration>) -> Duration {
    match target {
        Some(frame_target) if elapsed < frame_target => frame_target - elapsed,
        _ => Duration::ZERO,
    }
}

fn format_fps_cap(cap: Option<u32>) -> String {
    match cap {
        Some(value) => value.to_string(),
        None => "off".to_string(),
    }
}

fn resolve_fps_cap(config_fps: Option<u32>) -> Option<u32> {
    match env::var(FPS_ENV_VAR) {
        Ok(value) => parse_fps_override(&value).unwrap_or_else(|| {
            warn!(
                env_var = FPS_ENV_VAR,
                value = value.as_str(),
                "invalid fps env var value; falling back to config"
            );
            config_fps
        }),
        Err(env::VarError::NotPresent) => config_fps,
        Err(err) => {
            warn!(
                env_var = FPS_ENV_VAR,
                error = %err,
                "unable to read fps env var; falling back to config"
            );
            config_fps
        }
    }
}

/// `Some(None)` for "off"/"0", `Some(Some(n))` for a number, `None` if invalid.
fn parse_fps_override(value: &str) -> Option<Option<u32>> {
    let value = value.trim();
    if value.eq_ignore_ascii_case("off") {
        return Some(None);
    }
    value.parse::<u32>().ok().map(|fps| normalize_fps_cap(Some(fps)))
}
