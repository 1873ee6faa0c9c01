use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::Arc;
use std::time::{Duration, Instant};

use pixels::Error as PixelsError;
use thiserror::Error;
use tracing::{error, info, warn};
use winit::dpi::LogicalSize;
use winit::error::{EventLoopError, OsError};
use winit::event::{ElementState, Event, KeyEvent, MouseButton, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{KeyCode, PhysicalKey};
use winit::window::WindowBuilder;

use crate::error::LevelError;
use crate::geometry::Vec2;

use super::clock::TickClock;
use super::input::{ActionStates, EdgeStates, InputAction, KeyEdge};
use super::{DrawList, InputSnapshot, Renderer, Scene, SceneCommand};

#[derive(Debug, Clone)]
pub struct LoopConfig {
    pub window_title: String,
    /// Logical window size, also the framebuffer size scenes draw into.
    pub window_width: u32,
    pub window_height: u32,
    pub target_tps: u32,
    /// Ticks one frame may run before the rest of the backlog is dropped.
    pub max_ticks_per_frame: u32,
    pub rate_log_interval: Duration,
    /// Executable started next to this one on `SceneCommand::LaunchCompanion`.
    pub companion_binary: Option<String>,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            window_title: "Tileworld".to_string(),
            window_width: 700,
            window_height: 700,
            target_tps: 60,
            max_ticks_per_frame: 5,
            rate_log_interval: Duration::from_secs(1),
            companion_binary: None,
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("failed to load scene: {0}")]
    SceneLoad(#[source] LevelError),
    #[error("failed to create event loop: {0}")]
    CreateEventLoop(#[source] EventLoopError),
    #[error("failed to create application window: {0}")]
    CreateWindow(#[source] OsError),
    #[error("failed to initialize renderer: {0}")]
    CreateRenderer(#[source] PixelsError),
    #[error("event loop failed: {0}")]
    EventLoopRun(#[source] EventLoopError),
}

pub fn run_app(config: LoopConfig, mut scene: Box<dyn Scene>) -> Result<(), AppError> {
    scene.load().map_err(AppError::SceneLoad)?;
    info!(title = %config.window_title, "scene_loaded");

    let event_loop = EventLoop::new().map_err(AppError::CreateEventLoop)?;
    let window = Arc::new(
        WindowBuilder::new()
            .with_title(config.window_title.clone())
            .with_inner_size(LogicalSize::new(
                config.window_width as f64,
                config.window_height as f64,
            ))
            .build(&event_loop)
            .map_err(AppError::CreateWindow)?,
    );
    let window_for_loop = Arc::clone(&window);
    let mut renderer = Renderer::new(window, config.window_width, config.window_height)
        .map_err(AppError::CreateRenderer)?;

    event_loop.set_control_flow(ControlFlow::Poll);

    let mut clock = TickClock::new(
        config.target_tps,
        config.max_ticks_per_frame,
        config.rate_log_interval,
        Instant::now(),
    );
    info!(
        target_tps = config.target_tps,
        tick_ms = clock.tick_duration().as_secs_f64() * 1000.0,
        max_ticks_per_frame = config.max_ticks_per_frame,
        "loop_config"
    );

    let mut input_collector = InputCollector::default();
    let mut last_applied_title: Option<String> = None;
    let mut draw_list = DrawList::default();

    event_loop
        .run(move |event, window_target| match event {
            Event::WindowEvent { window_id, event } if window_id == window_for_loop.id() => {
                match event {
                    WindowEvent::CloseRequested => {
                        input_collector.mark_quit_requested();
                        info!(reason = "window_close", "shutdown_requested");
                        window_target.exit();
                    }
                    WindowEvent::Resized(new_size) => {
                        if let Err(error) = renderer.resize(new_size.width, new_size.height) {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                        }
                    }
                    WindowEvent::ScaleFactorChanged { .. } => {
                        let size = window_for_loop.inner_size();
                        if let Err(error) = renderer.resize(size.width, size.height) {
                            warn!(error = %error, "renderer_resize_failed");
                            window_target.exit();
                        }
                    }
                    WindowEvent::CursorMoved { position, .. } => {
                        let mapped =
                            renderer.window_to_buffer_px(position.x as f32, position.y as f32);
                        input_collector.set_cursor_position_px(mapped);
                    }
                    WindowEvent::CursorLeft { .. } => {
                        input_collector.set_cursor_position_px(None);
                    }
                    WindowEvent::MouseInput { state, button, .. } => {
                        input_collector.handle_mouse_input(button, state);
                    }
                    WindowEvent::KeyboardInput { event, .. } => {
                        input_collector.handle_keyboard_input(&event);
                    }
                    WindowEvent::RedrawRequested => {
                        let now = Instant::now();
                        let frame = clock.frame(now);
                        for _ in 0..frame.ticks {
                            let command = scene.update(&input_collector.snapshot_for_tick());
                            if ends_loop(command, config.companion_binary.as_deref()) {
                                window_target.exit();
                                break;
                            }
                        }
                        if frame.skipped > Duration::ZERO {
                            warn!(
                                skipped_ms = frame.skipped.as_millis() as u64,
                                "tick_backlog_dropped"
                            );
                        }

                        draw_list.clear([0, 0, 0, 255]);
                        scene.render(&mut draw_list);
                        if let Err(error) = renderer.render(&draw_list) {
                            warn!(error = %error, "renderer_draw_failed");
                            window_target.exit();
                        }

                        let next_title = scene.debug_title();
                        if next_title != last_applied_title {
                            match &next_title {
                                Some(title) => window_for_loop.set_title(title),
                                None => window_for_loop.set_title(&config.window_title),
                            }
                            last_applied_title = next_title;
                        }
                        if let Some(rates) = clock.rates(now) {
                            info!(
                                fps = rates.fps,
                                tps = rates.tps,
                                frame_time_ms = rates.frame_time_ms,
                                "loop_rates"
                            );
                        }
                    }
                    _ => {}
                }
            }
            Event::AboutToWait => {
                window_for_loop.request_redraw();
            }
            Event::LoopExiting => {
                scene.unload();
                info!("shutdown");
            }
            _ => {}
        })
        .map_err(AppError::EventLoopRun)
}

/// Applies a scene command; true when the loop should stop.
fn ends_loop(command: SceneCommand, companion: Option<&str>) -> bool {
    match command {
        SceneCommand::None => false,
        SceneCommand::Quit => {
            info!(reason = "scene_quit", "shutdown_requested");
            true
        }
        SceneCommand::LaunchCompanion => match launch_companion(companion) {
            Ok(()) => {
                info!(reason = "companion_launched", "shutdown_requested");
                true
            }
            Err(error) => {
                error!(error = %error, "companion_launch_failed");
                false
            }
        },
    }
}

#[derive(Debug, Error)]
enum CompanionError {
    #[error("no companion program is configured")]
    NotConfigured,
    #[error("failed to resolve current executable path: {0}")]
    CurrentExe(#[source] io::Error),
    #[error("failed to start {path}: {source}")]
    Spawn {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Starts the companion executable from this executable's directory without
/// waiting on it.
fn launch_companion(binary: Option<&str>) -> Result<(), CompanionError> {
    let binary = binary.ok_or(CompanionError::NotConfigured)?;
    let exe = env::current_exe().map_err(CompanionError::CurrentExe)?;
    let path = companion_path(&exe, binary);
    let child = Command::new(&path)
        .spawn()
        .map_err(|source| CompanionError::Spawn {
            path: path.clone(),
            source,
        })?;
    info!(path = %path.display(), pid = child.id(), "companion_started");
    Ok(())
}

fn companion_path(current_exe: &Path, binary: &str) -> PathBuf {
    current_exe.with_file_name(format!("{binary}{}", env::consts::EXE_SUFFIX))
}

#[derive(Debug, Default)]
struct InputCollector {
    quit_requested: bool,
    action_states: ActionStates,
    edge_states: EdgeStates,
    cursor_position_px: Option<Vec2>,
    left_mouse_is_down: bool,
    right_mouse_is_down: bool,
}

impl InputCollector {
    fn mark_quit_requested(&mut self) {
        self.quit_requested = true;
    }

    fn handle_keyboard_input(&mut self, key_event: &KeyEvent) {
        let is_pressed = key_event.state == ElementState::Pressed;
        self.handle_physical_key(key_event.physical_key, is_pressed);
    }

    fn handle_physical_key(&mut self, key: PhysicalKey, is_pressed: bool) {
        if let Some(action) = action_for_key(key) {
            self.action_states.set(action, is_pressed);
        }
        if let Some(edge) = edge_for_key(key) {
            self.edge_states.handle(edge, is_pressed);
        }
    }

    fn snapshot_for_tick(&mut self) -> InputSnapshot {
        InputSnapshot::new(
            self.quit_requested,
            self.action_states,
            self.edge_states.take_pressed(),
            self.cursor_position_px,
            self.left_mouse_is_down,
            self.right_mouse_is_down,
        )
    }

    fn set_cursor_position_px(&mut self, position: Option<Vec2>) {
        self.cursor_position_px = position;
    }

    fn handle_mouse_input(&mut self, button: MouseButton, state: ElementState) {
        let is_down = state == ElementState::Pressed;
        match button {
            MouseButton::Left => self.left_mouse_is_down = is_down,
            MouseButton::Right => self.right_mouse_is_down = is_down,
            _ => {}
        }
    }
}

fn action_for_key(key: PhysicalKey) -> Option<InputAction> {
    match key {
        PhysicalKey::Code(KeyCode::KeyA) | PhysicalKey::Code(KeyCode::ArrowLeft) => {
            Some(InputAction::MoveLeft)
        }
        PhysicalKey::Code(KeyCode::KeyD) | PhysicalKey::Code(KeyCode::ArrowRight) => {
            Some(InputAction::MoveRight)
        }
        PhysicalKey::Code(KeyCode::KeyW)
        | PhysicalKey::Code(KeyCode::ArrowUp)
        | PhysicalKey::Code(KeyCode::Space) => Some(InputAction::Jump),
        _ => None,
    }
}

fn edge_for_key(key: PhysicalKey) -> Option<KeyEdge> {
    let PhysicalKey::Code(code) = key else {
        return None;
    };
    match code {
        KeyCode::Escape => Some(KeyEdge::Back),
        KeyCode::Enter | KeyCode::NumpadEnter => Some(KeyEdge::Confirm),
        KeyCode::KeyR => Some(KeyEdge::Restart),
        KeyCode::F5 => Some(KeyEdge::Save),
        KeyCode::F9 => Some(KeyEdge::Load),
        KeyCode::PageUp => Some(KeyEdge::NextLevel),
        KeyCode::PageDown => Some(KeyEdge::PreviousLevel),
        KeyCode::KeyE => Some(KeyEdge::OpenEditor),
        KeyCode::KeyG => Some(KeyEdge::OpenGame),
        KeyCode::KeyM => Some(KeyEdge::MainMenu),
        _ => None,
    }
}
