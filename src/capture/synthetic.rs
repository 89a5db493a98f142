//! Synthetic capture source
//!
//! Renders camera frames in software so the engine can run on machines
//! without a camera and so tests can script every acquisition outcome. The
//! default scene is a bright tabletop with a dark placemat in the middle,
//! which the marker heuristic classifies as surface-like.

use std::time::Duration;

use rand::Rng;

use super::{CaptureError, CaptureFrame, CaptureRequest, CaptureSource, CaptureStream};

/// What the fake camera is pointed at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntheticScene {
    /// Bright surface with a dark placemat: surface-like.
    Tabletop,
    /// Uniformly bright: no target.
    Blank,
    /// Uniformly dark: no contrast.
    Unlit,
}

/// Software camera implementing [`CaptureSource`].
pub struct SyntheticCamera {
    scene: SyntheticScene,
    fail_with: Option<CaptureError>,
    never_ready: bool,
}

impl SyntheticCamera {
    pub fn new() -> Self {
        Self {
            scene: SyntheticScene::Tabletop,
            fail_with: None,
            never_ready: false,
        }
    }

    pub fn with_scene(scene: SyntheticScene) -> Self {
        Self {
            scene,
            ..Self::new()
        }
    }

    /// A camera whose acquisition always fails with `err`.
    pub fn failing(err: CaptureError) -> Self {
        Self {
            fail_with: Some(err),
            ..Self::new()
        }
    }

    /// A camera that opens but never delivers a first frame, for exercising
    /// the surface-readiness timeout.
    pub fn never_ready() -> Self {
        Self {
            never_ready: true,
            ..Self::new()
        }
    }
}

impl Default for SyntheticCamera {
    fn default() -> Self {
        Self::new()
    }
}

impl CaptureSource for SyntheticCamera {
    fn open(&mut self, request: &CaptureRequest) -> Result<Box<dyn CaptureStream>, CaptureError> {
        if let Some(err) = self.fail_with.clone() {
            return Err(err);
        }
        if request.min_width > request.ideal_width || request.min_height > request.ideal_height {
            return Err(CaptureError::ConstraintUnsatisfiable(format!(
                "minimum {}x{} exceeds ideal {}x{}",
                request.min_width, request.min_height, request.ideal_width, request.ideal_height
            )));
        }

        Ok(Box::new(SyntheticStream {
            width: request.ideal_width,
            height: request.ideal_height,
            scene: self.scene,
            never_ready: self.never_ready,
            stopped: false,
        }))
    }
}

struct SyntheticStream {
    width: u32,
    height: u32,
    scene: SyntheticScene,
    never_ready: bool,
    stopped: bool,
}

impl SyntheticStream {
    fn render_frame(&self) -> CaptureFrame {
        let (w, h) = (self.width as usize, self.height as usize);
        let mut pixels = vec![0u8; w * h * 4];
        let mut rng = rand::rng();

        for y in 0..h {
            for x in 0..w {
                let base: i16 = match self.scene {
                    SyntheticScene::Blank => 220,
                    SyntheticScene::Unlit => 20,
                    SyntheticScene::Tabletop => {
                        // Dark placemat ellipse centered in a bright frame.
                        let dx = (x as f32 / w as f32) - 0.5;
                        let dy = (y as f32 / h as f32) - 0.5;
                        if dx * dx + dy * dy < 0.09 {
                            45
                        } else {
                            210
                        }
                    }
                };
                let noise: i16 = rng.random_range(-8..=8);
                let value = (base + noise).clamp(0, 255) as u8;
                let offset = (y * w + x) * 4;
                pixels[offset] = value;
                pixels[offset + 1] = value;
                pixels[offset + 2] = value;
                pixels[offset + 3] = 255;
            }
        }

        CaptureFrame::new(self.width, self.height, pixels)
    }
}

impl CaptureStream for SyntheticStream {
    fn wait_ready(&mut self, timeout: Duration) -> Result<(), CaptureError> {
        if self.never_ready {
            // Simulated metadata that never arrives; report the full wait.
            return Err(CaptureError::Timeout { waited: timeout });
        }
        Ok(())
    }

    fn latest_frame(&mut self) -> Option<CaptureFrame> {
        if self.stopped || self.never_ready {
            return None;
        }
        Some(self.render_frame())
    }

    fn resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    fn stop(&mut self) {
        self.stopped = true;
    }

    fn is_stopped(&self) -> bool {
        self.stopped
    }
}
