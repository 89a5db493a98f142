//! Session lifecycle manager
//!
//! Sole owner of the AR session state machine and of every session-scoped
//! resource: the capture stream or XR session, the session renderer, the
//! scene, the anchor provider and the frame driver. Acquisition happens
//! synchronously inside [`SessionManager::start`] so the host's
//! user-gesture context is never lost to a scheduler, and teardown always
//! runs in the same order - frame loop first, then the capture/session
//! handle, then GPU resources - on success, error and cancel paths alike.

use std::time::{Duration, Instant};

use log::{debug, info, trace, warn};

use super::frame::{FrameDriver, TickInput};
use super::state::{ActiveMode, SessionPhase};
use crate::anchor::{
    select_strategy, AnchorStrategy, HeuristicConfig, HitTestProvider, MarkerHeuristicProvider,
};
use crate::assets;
use crate::capture::{CaptureFrame, CaptureRequest, CaptureSource, CaptureStream};
use crate::error::SessionError;
use crate::gfx::scene::ArScene;
use crate::gfx::scene_renderer::SessionRenderer;
use crate::interaction::DragRotator;
use crate::menu::MenuItem;
use crate::placement::PlacementController;
use crate::xr::{XrRuntime, XrSupport};

/// Per-view configuration for sessions.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub capture_request: CaptureRequest,
    pub heuristic: HeuristicConfig,
    /// Bound on waiting for the capture surface's first frame.
    pub surface_timeout: Duration,
    /// Idle yaw rate (degrees/second) on the heuristic strategy.
    pub idle_spin_degrees: f32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            capture_request: CaptureRequest::default(),
            heuristic: HeuristicConfig::default(),
            surface_timeout: Duration::from_secs(2),
            idle_spin_degrees: 18.0,
        }
    }
}

/// Builds the session-scoped renderer for a freshly assembled scene.
pub type RendererFactory = Box<dyn FnMut(&mut ArScene) -> Box<dyn SessionRenderer>>;

/// Owns and drives one AR session at a time.
pub struct SessionManager {
    phase: SessionPhase,
    config: SessionConfig,
    output_size: (u32, u32),

    // View-mount-scoped collaborators.
    capture: Box<dyn CaptureSource>,
    xr: Box<dyn XrRuntime>,
    xr_support: XrSupport,
    renderer_factory: RendererFactory,

    // Session-scoped resources, all `None` outside `active`.
    stream: Option<Box<dyn CaptureStream>>,
    renderer: Option<Box<dyn SessionRenderer>>,
    scene: Option<ArScene>,
    placement: Option<PlacementController>,
    driver: Option<FrameDriver>,
    xr_session_live: bool,

    rotator: DragRotator,
    latest_frame: Option<CaptureFrame>,
}

impl SessionManager {
    /// Creates a manager for one AR view. The capability query runs once,
    /// here, and decides the anchor strategy for every session this view
    /// starts.
    pub fn new(
        capture: Box<dyn CaptureSource>,
        xr: Box<dyn XrRuntime>,
        renderer_factory: RendererFactory,
        config: SessionConfig,
    ) -> Self {
        let xr_support = xr.support();
        debug!("XR capability query: {xr_support:?}");

        Self {
            phase: SessionPhase::Idle,
            config,
            output_size: (1280, 720),
            capture,
            xr,
            xr_support,
            renderer_factory,
            stream: None,
            renderer: None,
            scene: None,
            placement: None,
            driver: None,
            xr_session_live: false,
            rotator: DragRotator::default(),
            latest_frame: None,
        }
    }

    pub fn phase(&self) -> &SessionPhase {
        &self.phase
    }

    fn set_phase(&mut self, phase: SessionPhase) {
        if self.phase != phase {
            debug!("session phase: {:?} -> {:?}", self.phase, phase);
        }
        self.phase = phase;
    }

    pub fn strategy(&self) -> AnchorStrategy {
        select_strategy(self.xr_support)
    }

    pub fn xr_support(&self) -> XrSupport {
        self.xr_support
    }

    /// Current output surface size; drives the scene camera's aspect.
    pub fn set_output_size(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.output_size = (width, height);
        if let Some(scene) = self.scene.as_mut() {
            scene.camera.resize_projection(width, height);
        }
    }

    /// Starts a session for `item`.
    ///
    /// Must be invoked directly from a user-gesture handler: every
    /// acquisition step (permission prompt included) runs synchronously
    /// within this call, before it returns. On failure all
    /// partially-acquired resources are released and the session lands in
    /// `error`, from which another `start` is the retry path.
    pub fn start(&mut self, item: &MenuItem) -> Result<(), SessionError> {
        if !self.phase.can_start() {
            trace!("start ignored in phase {:?}", self.phase);
            return Ok(());
        }

        self.set_phase(SessionPhase::Requesting);
        match self.acquire_and_assemble(item) {
            Ok(()) => {
                self.set_phase(SessionPhase::Active(ActiveMode::Searching));
                info!("AR session active for '{}'", item.name);
                Ok(())
            }
            Err(err) => {
                warn!("session start failed: {err}");
                self.release_resources();
                self.set_phase(SessionPhase::Error(err.clone()));
                Err(err)
            }
        }
    }

    /// The acquisition sequence. Resources accumulate in `self` as they are
    /// acquired so the error path can release exactly what exists.
    fn acquire_and_assemble(&mut self, item: &MenuItem) -> Result<(), SessionError> {
        let strategy = self.strategy();
        debug!("starting session with {strategy:?}");

        match strategy {
            AnchorStrategy::SpatialHitTest => {
                self.xr.begin_session()?;
                self.xr_session_live = true;
            }
            AnchorStrategy::HeuristicMarker => {
                // Stored before the readiness wait so the error path can
                // stop a stream whose surface never comes up.
                self.stream = Some(self.capture.open(&self.config.capture_request)?);
                if let Some(stream) = self.stream.as_mut() {
                    // The render loop is gated on this: no driver exists
                    // until the surface has produced a frame or timed out.
                    stream.wait_ready(self.config.surface_timeout)?;
                }
            }
        }

        // Asset failures are absorbed inside the resolver; from here on the
        // session has a model no matter what the menu pointed at.
        let model = assets::resolve(item.asset_ref(), &item.name);
        let (width, height) = self.output_size;
        let mut scene = ArScene::new(model, width, height);

        self.renderer = Some((self.renderer_factory)(&mut scene));
        self.scene = Some(scene);

        let provider: Box<dyn crate::anchor::AnchorProvider> = match strategy {
            AnchorStrategy::SpatialHitTest => Box::new(HitTestProvider::new()),
            AnchorStrategy::HeuristicMarker => {
                Box::new(MarkerHeuristicProvider::new(self.config.heuristic.clone()))
            }
        };
        self.placement = Some(PlacementController::new(provider));
        self.driver = Some(FrameDriver::new(self.config.idle_spin_degrees));
        Ok(())
    }

    /// Runs one render-loop tick. A no-op outside `active`.
    pub fn tick(&mut self, now: Instant) {
        if !self.phase.is_active() {
            return;
        }
        let (Some(driver), Some(placement), Some(scene)) = (
            self.driver.as_mut(),
            self.placement.as_mut(),
            self.scene.as_mut(),
        ) else {
            return;
        };

        let xr_frame = if self.xr_session_live {
            self.xr.next_frame()
        } else {
            None
        };
        if let Some(stream) = self.stream.as_mut() {
            if let Some(frame) = stream.latest_frame() {
                self.latest_frame = Some(frame);
            }
        }

        driver.tick(
            TickInput {
                now,
                xr_frame,
                camera_frame: self.latest_frame.as_ref(),
                dragging: self.rotator.is_dragging(),
            },
            placement,
            scene,
        );

        let mode = if placement.placed() {
            ActiveMode::Placed
        } else {
            ActiveMode::Searching
        };
        if self.phase != SessionPhase::Active(mode) {
            self.set_phase(SessionPhase::Active(mode));
        }
    }

    /// Discrete select gesture: confirms placement on the spatial strategy.
    pub fn confirm_placement(&mut self) {
        if !self.phase.is_active() {
            return;
        }
        if let Some(placement) = self.placement.as_mut() {
            placement.confirm();
        }
    }

    /// Releases a confirmed/detected anchor and searches again.
    pub fn release_placement(&mut self) {
        if let Some(placement) = self.placement.as_mut() {
            placement.release();
        }
        self.rotator.cancel();
    }

    /// Pointer handling for drag-to-rotate. `pointer` distinguishes fingers
    /// or mouse; only the first active pointer drives the gesture.
    pub fn pointer_down(&mut self, pointer: u64, x: f32) {
        let placed = self
            .placement
            .as_ref()
            .map(|p| p.placed())
            .unwrap_or(false);
        self.rotator.begin(pointer, x, placed);
    }

    pub fn pointer_move(&mut self, pointer: u64, x: f32) {
        if let Some(delta) = self.rotator.drag(pointer, x) {
            if let Some(scene) = self.scene.as_mut() {
                scene.model.add_yaw(delta);
            }
        }
    }

    pub fn pointer_up(&mut self, pointer: u64) {
        self.rotator.end(pointer);
    }

    /// Uploads per-tick state to the session renderer. Call after `tick`
    /// and before handing the renderer to the engine.
    pub fn prepare_frame(&mut self) {
        if let (Some(renderer), Some(scene)) = (self.renderer.as_mut(), self.scene.as_mut()) {
            renderer.prepare(scene, self.latest_frame.as_ref());
        }
    }

    /// The session's renderer and scene for the engine's draw, while one
    /// exists.
    pub fn render_parts(&mut self) -> Option<(&mut dyn SessionRenderer, &ArScene)> {
        match (self.renderer.as_mut(), self.scene.as_ref()) {
            (Some(renderer), Some(scene)) => Some((renderer.as_mut(), scene)),
            _ => None,
        }
    }

    /// Stops the session and releases everything. Idempotent: stopping an
    /// already-idle manager (or stopping twice) has no effect.
    pub fn stop(&mut self) {
        if self.phase.is_idle() {
            trace!("stop ignored: already idle");
            return;
        }
        self.set_phase(SessionPhase::Ended);
        self.release_resources();
        self.set_phase(SessionPhase::Idle);
    }

    /// Ordered teardown. Safe to call with any subset of resources
    /// acquired; each release hook runs at most once per session.
    fn release_resources(&mut self) {
        // 1. Frame loop and timers stop first so nothing ticks against
        // resources mid-release.
        if self.driver.take().is_some() {
            debug!("frame loop cancelled");
        }
        self.placement = None;
        self.rotator.cancel();

        // 2. End the capture/session handle.
        if let Some(mut stream) = self.stream.take() {
            stream.stop();
            debug!("capture stream stopped");
        }
        if self.xr_session_live {
            self.xr.end_session();
            self.xr_session_live = false;
            debug!("XR session ended");
        }

        // 3. GPU resources last.
        if let Some(renderer) = self.renderer.take() {
            renderer.dispose();
        }
        self.scene = None;
        self.latest_frame = None;
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        // View unmount is an exit path like any other.
        self.stop();
    }
}
