//! AR view application shell
//!
//! Hosts one AR view in a winit window: owns the window-scoped render
//! engine and HUD, mounts a [`SessionManager`] once the GPU is up, and
//! routes input - HUD first, then select/drag gestures - into the session.
//! HUD actions (start, stop, retry) are applied synchronously in the same
//! dispatch turn that produced them, so acquisition never loses the user
//! gesture to a scheduler.

use std::sync::Arc;
use std::time::Instant;

use log::warn;
use winit::{
    application::ApplicationHandler,
    dpi::PhysicalSize,
    event::{ElementState, MouseButton, WindowEvent},
    event_loop::{ActiveEventLoop, ControlFlow, EventLoop},
    window::{Window, WindowAttributes},
};

use crate::capture::{CaptureSource, SyntheticCamera};
use crate::gfx::{RenderEngine, SceneGraphics};
use crate::menu::MenuItem;
use crate::session::{manager::RendererFactory, SessionConfig, SessionManager};
use crate::ui::{draw_hud, HudAction, UiManager};
use crate::xr::{UnsupportedXr, XrRuntime};

pub struct ArApp {
    event_loop: Option<EventLoop<()>>,
    state: AppState,
}

struct AppState {
    window: Option<Arc<Window>>,
    engine: Option<RenderEngine>,
    ui: Option<UiManager>,
    session: Option<SessionManager>,

    // Collaborators held until the session manager mounts in `resumed`.
    pending_capture: Option<Box<dyn CaptureSource>>,
    pending_xr: Option<Box<dyn XrRuntime>>,
    config: SessionConfig,

    item: Option<MenuItem>,
    cursor_x: f32,
    mouse_down: bool,
}

impl ArApp {
    /// Creates an AR view with the default desktop collaborators: the
    /// synthetic camera and no XR runtime (heuristic strategy).
    pub fn new() -> Self {
        let event_loop = EventLoop::new().expect("Failed to create event loop");

        Self {
            event_loop: Some(event_loop),
            state: AppState {
                window: None,
                engine: None,
                ui: None,
                session: None,
                pending_capture: Some(Box::new(SyntheticCamera::new())),
                pending_xr: Some(Box::new(UnsupportedXr)),
                config: SessionConfig::default(),
                item: None,
                cursor_x: 0.0,
                mouse_down: false,
            },
        }
    }

    /// Swaps in real capture/XR backends.
    pub fn with_sources(mut self, capture: Box<dyn CaptureSource>, xr: Box<dyn XrRuntime>) -> Self {
        self.state.pending_capture = Some(capture);
        self.state.pending_xr = Some(xr);
        self
    }

    pub fn with_config(mut self, config: SessionConfig) -> Self {
        self.state.config = config;
        self
    }

    /// The dish to preview. Absence is the valid "no dish selected" state.
    pub fn set_item(&mut self, item: MenuItem) {
        self.state.item = Some(item);
    }

    /// Run the application (consumes self and starts the event loop)
    pub fn run(mut self) {
        let event_loop = self.event_loop.take().expect("Event loop already consumed");
        event_loop.set_control_flow(ControlFlow::Poll);

        event_loop
            .run_app(&mut self.state)
            .expect("Failed to run event loop");
    }
}

impl Default for ArApp {
    fn default() -> Self {
        Self::new()
    }
}

impl AppState {
    fn apply_hud_action(&mut self, action: HudAction) {
        let Some(session) = self.session.as_mut() else {
            return;
        };

        if action.stop {
            session.stop();
        }
        if action.start {
            if let Some(item) = self.item.as_ref() {
                // Failure already moved the session to its error phase; the
                // HUD shows the reason and offers retry.
                if let Err(err) = session.start(item) {
                    warn!("AR session failed to start: {err}");
                }
            }
        }
        if action.back_to_menu {
            session.stop();
            self.item = None;
        }
    }
}

impl ApplicationHandler for AppState {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let Ok(window) = event_loop.create_window(
            WindowAttributes::default()
                .with_title("AR dish preview")
                .with_inner_size(winit::dpi::LogicalSize::new(1000, 700)),
        ) else {
            return;
        };
        let window = Arc::new(window);
        self.window = Some(window.clone());

        let (width, height) = window.inner_size().into();
        let engine = pollster::block_on(RenderEngine::new(window.clone(), width, height));

        let ui = UiManager::new(
            engine.device(),
            engine.queue(),
            engine.surface_format(),
            &window,
        );

        // Session-scoped GPU bundles are built from these shared handles,
        // but only the session manager ever owns one.
        let device = engine.device().clone();
        let queue = engine.queue().clone();
        let format = engine.surface_format();
        let factory: RendererFactory = Box::new(move |scene| {
            Box::new(SceneGraphics::new(
                device.clone(),
                queue.clone(),
                format,
                scene,
            ))
        });

        let capture = self
            .pending_capture
            .take()
            .unwrap_or_else(|| Box::new(SyntheticCamera::new()));
        let xr = self
            .pending_xr
            .take()
            .unwrap_or_else(|| Box::new(UnsupportedXr));

        let mut session = SessionManager::new(capture, xr, factory, self.config.clone());
        session.set_output_size(width, height);

        self.session = Some(session);
        self.ui = Some(ui);
        self.engine = Some(engine);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: winit::window::WindowId,
        event: WindowEvent,
    ) {
        let Some(window) = self.window.clone() else {
            return;
        };

        // HUD gets first refusal on input.
        if let Some(ui) = self.ui.as_mut() {
            let ui_event: winit::event::Event<()> = winit::event::Event::WindowEvent {
                window_id,
                event: event.clone(),
            };
            if ui.handle_input(&window, &ui_event) {
                window.request_redraw();
                return;
            }
        }

        match event {
            WindowEvent::KeyboardInput {
                event:
                    winit::event::KeyEvent {
                        physical_key: winit::keyboard::PhysicalKey::Code(key_code),
                        state: ElementState::Pressed,
                        ..
                    },
                ..
            } => match key_code {
                winit::keyboard::KeyCode::Escape => {
                    if let Some(session) = self.session.as_mut() {
                        session.stop();
                    }
                    event_loop.exit();
                }
                winit::keyboard::KeyCode::Space => {
                    // Space doubles as start (idle/error) and select
                    // (searching), both synchronously in this handler.
                    if let Some(session) = self.session.as_mut() {
                        if session.phase().can_start() {
                            if let Some(item) = self.item.as_ref() {
                                let _ = session.start(item);
                            }
                        } else {
                            session.confirm_placement();
                        }
                    }
                }
                winit::keyboard::KeyCode::KeyR => {
                    // Release a held anchor and search again.
                    if let Some(session) = self.session.as_mut() {
                        session.release_placement();
                    }
                }
                _ => {}
            },
            WindowEvent::Resized(PhysicalSize { width, height }) => {
                if let Some(engine) = self.engine.as_mut() {
                    engine.resize(width, height);
                }
                if let Some(session) = self.session.as_mut() {
                    session.set_output_size(width, height);
                }
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor_x = position.x as f32;
                if self.mouse_down {
                    if let Some(session) = self.session.as_mut() {
                        session.pointer_move(0, self.cursor_x);
                    }
                }
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => {
                let Some(session) = self.session.as_mut() else {
                    return;
                };
                match state {
                    ElementState::Pressed => {
                        self.mouse_down = true;
                        // A tap is the select gesture while searching and
                        // the start of a drag once placed.
                        session.confirm_placement();
                        session.pointer_down(0, self.cursor_x);
                    }
                    ElementState::Released => {
                        self.mouse_down = false;
                        session.pointer_up(0);
                    }
                }
            }
            WindowEvent::CloseRequested => {
                if let Some(session) = self.session.as_mut() {
                    session.stop();
                }
                event_loop.exit();
            }
            WindowEvent::RedrawRequested => {
                let Some(session) = self.session.as_mut() else {
                    return;
                };

                session.tick(Instant::now());
                session.prepare_frame();

                let phase = session.phase().clone();
                let strategy = session.strategy();
                let item = self.item.clone();
                let mut action = HudAction::default();

                let session_parts = if phase.is_active() {
                    session.render_parts()
                } else {
                    None
                };

                if let (Some(engine), Some(ui)) = (self.engine.as_mut(), self.ui.as_mut()) {
                    let action_ref = &mut action;
                    engine.render_frame(
                        session_parts,
                        Some(|device: &wgpu::Device,
                              queue: &wgpu::Queue,
                              encoder: &mut wgpu::CommandEncoder,
                              view: &wgpu::TextureView| {
                            ui.draw(device, queue, encoder, &window, view, |ui_frame| {
                                *action_ref =
                                    draw_hud(ui_frame, item.as_ref(), &phase, strategy);
                            });
                        }),
                    );
                }

                self.apply_hud_action(action);
            }
            _ => (),
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(ref window) = self.window {
            window.request_redraw();
        }
    }
}
