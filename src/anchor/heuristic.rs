//! Heuristic marker strategy
//!
//! Fallback for hosts without world tracking. Camera frames are sampled on
//! a fixed interval and classified by a coarse brightness proxy: a frame
//! whose dark-pixel ratio sits inside a band (neither blank nor uniformly
//! dark) counts as "surface-like". A bounded hysteresis counter debounces
//! the classification stream into `detected`/`lost` transitions that toggle
//! dish visibility. This is deliberately not a vision algorithm - it finds
//! "something plausibly like a dark placemat in frame", nothing more, and
//! its constants are tuned for the original demo's lighting rather than
//! derived from anything principled.

use std::time::{Duration, Instant};

use cgmath::{Quaternion, Vector3};
use log::{debug, trace};

use super::{Anchor, AnchorProvider, AnchorStrategy, FrameInput};
use crate::capture::CaptureFrame;

/// Tunables for the brightness heuristic.
///
/// Treat these as configuration, not physics: the defaults match the demo
/// environment and will need retuning for other lighting.
#[derive(Debug, Clone)]
pub struct HeuristicConfig {
    /// How often camera frames are sampled. Sampling every render frame
    /// would burn CPU for no benefit.
    pub sample_interval: Duration,
    /// Every n-th pixel of a frame is inspected.
    pub sample_stride: usize,
    /// Mean RGB intensity below this classifies a sampled pixel as dark.
    pub dark_threshold: u8,
    /// A frame is surface-like when its dark ratio lies strictly inside
    /// this band.
    pub surface_band: (f32, f32),
    /// Consecutive-ish surface-like frames needed to raise `detected`;
    /// also the counter's cap.
    pub debounce_frames: u32,
}

impl Default for HeuristicConfig {
    fn default() -> Self {
        Self {
            sample_interval: Duration::from_millis(250),
            sample_stride: 16,
            dark_threshold: 90,
            surface_band: (0.05, 0.85),
            debounce_frames: 3,
        }
    }
}

/// Debounced transition raised by the [`DetectionCounter`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetectionEvent {
    Detected,
    Lost,
}

/// Bounded hysteresis counter.
///
/// Increments (capped at the threshold) on surface-like observations and
/// decrements otherwise. Crossing the threshold while undetected raises
/// [`DetectionEvent::Detected`] exactly once; draining to zero while
/// detected raises [`DetectionEvent::Lost`]. Single noisy frames therefore
/// cannot flicker the state.
#[derive(Debug, Clone)]
pub struct DetectionCounter {
    value: u32,
    threshold: u32,
    detected: bool,
}

impl DetectionCounter {
    pub fn new(threshold: u32) -> Self {
        Self {
            value: 0,
            threshold: threshold.max(1),
            detected: false,
        }
    }

    pub fn is_detected(&self) -> bool {
        self.detected
    }

    pub fn observe(&mut self, surface_like: bool) -> Option<DetectionEvent> {
        if surface_like {
            self.value = (self.value + 1).min(self.threshold);
            if !self.detected && self.value >= self.threshold {
                self.detected = true;
                return Some(DetectionEvent::Detected);
            }
        } else {
            self.value = self.value.saturating_sub(1);
            if self.detected && self.value == 0 {
                self.detected = false;
                return Some(DetectionEvent::Lost);
            }
        }
        None
    }

    pub fn reset(&mut self) {
        self.value = 0;
        self.detected = false;
    }
}

/// Classifies one frame as surface-like or not.
pub fn classify_frame(frame: &CaptureFrame, config: &HeuristicConfig) -> bool {
    let stride = config.sample_stride.max(1);
    let mut sampled = 0usize;
    let mut dark = 0usize;

    let mut index = 0;
    while index < frame.pixel_count() {
        sampled += 1;
        if frame.mean_intensity(index) < config.dark_threshold {
            dark += 1;
        }
        index += stride;
    }

    if sampled == 0 {
        return false;
    }

    let ratio = dark as f32 / sampled as f32;
    let (low, high) = config.surface_band;
    trace!("frame dark ratio {ratio:.3} (band {low:.2}..{high:.2})");
    ratio > low && ratio < high
}

/// Anchor provider backed by the brightness heuristic.
///
/// Unlike the spatial strategy, detection here is continuously reversible:
/// the dish appears and disappears as confidence rises and falls, and there
/// is no confirm step. The anchor pose itself is canonical - a fixed spot
/// in front of the viewer - since 2-D frames give no depth to pin to.
pub struct MarkerHeuristicProvider {
    config: HeuristicConfig,
    counter: DetectionCounter,
    last_sample: Option<Instant>,
    canonical: Anchor,
}

impl MarkerHeuristicProvider {
    /// Pose the dish takes while detected: slightly below eye line, just
    /// over half a meter out.
    const CANONICAL_POSITION: [f32; 3] = [0.0, -0.15, -0.6];

    pub fn new(config: HeuristicConfig) -> Self {
        let counter = DetectionCounter::new(config.debounce_frames);
        Self {
            config,
            counter,
            last_sample: None,
            canonical: Anchor::new(
                Vector3::from(Self::CANONICAL_POSITION),
                Quaternion::new(1.0, 0.0, 0.0, 0.0),
            ),
        }
    }

    fn due_for_sample(&self, now: Instant) -> bool {
        match self.last_sample {
            Some(last) => now.duration_since(last) >= self.config.sample_interval,
            None => true,
        }
    }
}

impl Default for MarkerHeuristicProvider {
    fn default() -> Self {
        Self::new(HeuristicConfig::default())
    }
}

impl AnchorProvider for MarkerHeuristicProvider {
    fn strategy(&self) -> AnchorStrategy {
        AnchorStrategy::HeuristicMarker
    }

    fn update(&mut self, input: &FrameInput<'_>) {
        let Some(frame) = input.camera else {
            return;
        };
        if !self.due_for_sample(input.now) {
            return;
        }
        self.last_sample = Some(input.now);

        let surface_like = classify_frame(frame, &self.config);
        if let Some(event) = self.counter.observe(surface_like) {
            debug!("marker heuristic: {event:?}");
        }
    }

    fn candidate(&self) -> Option<Anchor> {
        // No placement cursor on this strategy; visibility does the talking.
        None
    }

    fn confirm(&mut self) -> Option<Anchor> {
        None
    }

    fn release(&mut self) {
        self.counter.reset();
        self.last_sample = None;
    }

    fn anchor(&self) -> Option<Anchor> {
        if self.counter.is_detected() {
            Some(self.canonical)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uniform_frame(width: u32, height: u32, value: u8) -> CaptureFrame {
        let mut pixels = vec![value; (width * height * 4) as usize];
        for alpha in pixels.iter_mut().skip(3).step_by(4) {
            *alpha = 255;
        }
        CaptureFrame::new(width, height, pixels)
    }

    /// A frame whose left `dark_fraction` of pixels are dark.
    fn split_frame(width: u32, height: u32, dark_fraction: f32) -> CaptureFrame {
        let split = (width as f32 * dark_fraction) as u32;
        let mut pixels = Vec::with_capacity((width * height * 4) as usize);
        for _y in 0..height {
            for x in 0..width {
                let value = if x < split { 30 } else { 220 };
                pixels.extend_from_slice(&[value, value, value, 255]);
            }
        }
        CaptureFrame::new(width, height, pixels)
    }

    #[test]
    fn blank_and_unlit_frames_are_not_surface_like() {
        let config = HeuristicConfig::default();
        assert!(!classify_frame(&uniform_frame(64, 64, 220), &config));
        assert!(!classify_frame(&uniform_frame(64, 64, 20), &config));
    }

    #[test]
    fn mixed_frame_is_surface_like() {
        let config = HeuristicConfig::default();
        assert!(classify_frame(&split_frame(64, 64, 0.4), &config));
    }

    #[test]
    fn hysteresis_monotonicity() {
        let threshold = 3;
        let mut counter = DetectionCounter::new(threshold);

        // T-1 surface-like frames: not yet detected.
        for _ in 0..threshold - 1 {
            assert_eq!(counter.observe(true), None);
        }
        // T-th frame fires the transition exactly once.
        assert_eq!(counter.observe(true), Some(DetectionEvent::Detected));
        // Further surface-like frames do not re-fire.
        assert_eq!(counter.observe(true), None);
        assert!(counter.is_detected());

        // T non-surface-like frames drain the capped counter to zero.
        for i in 0..threshold {
            let expected = if i == threshold - 1 {
                Some(DetectionEvent::Lost)
            } else {
                None
            };
            assert_eq!(counter.observe(false), expected);
        }
        assert!(!counter.is_detected());
    }

    #[test]
    fn single_noisy_frame_does_not_flicker() {
        let mut counter = DetectionCounter::new(3);
        for _ in 0..3 {
            counter.observe(true);
        }
        assert!(counter.is_detected());

        // One bad frame must not lose the surface.
        assert_eq!(counter.observe(false), None);
        assert!(counter.is_detected());
        counter.observe(true);
        assert!(counter.is_detected());
    }

    #[test]
    fn provider_toggles_visibility_reversibly() {
        let config = HeuristicConfig {
            debounce_frames: 2,
            ..HeuristicConfig::default()
        };
        let interval = config.sample_interval;
        let mut provider = MarkerHeuristicProvider::new(config);

        let surface = split_frame(64, 64, 0.4);
        let blank = uniform_frame(64, 64, 220);
        let t0 = Instant::now();

        let mut tick = |provider: &mut MarkerHeuristicProvider, frame, step: u32| {
            provider.update(&FrameInput {
                xr: None,
                camera: Some(frame),
                now: t0 + interval * step,
            });
        };

        tick(&mut provider, &surface, 0);
        assert!(!provider.object_visible());
        tick(&mut provider, &surface, 1);
        assert!(provider.object_visible());
        assert_eq!(provider.anchor().unwrap().position.z, -0.6);

        tick(&mut provider, &blank, 2);
        tick(&mut provider, &blank, 3);
        assert!(!provider.object_visible());

        // Reversible: the surface can come back.
        tick(&mut provider, &surface, 4);
        tick(&mut provider, &surface, 5);
        assert!(provider.object_visible());
    }

    #[test]
    fn sampling_respects_interval() {
        let config = HeuristicConfig {
            debounce_frames: 2,
            ..HeuristicConfig::default()
        };
        let interval = config.sample_interval;
        let mut provider = MarkerHeuristicProvider::new(config);
        let surface = split_frame(64, 64, 0.4);
        let t0 = Instant::now();

        // Many render ticks inside one sampling interval count as a single
        // observation, so two-frame debounce cannot be satisfied.
        for _ in 0..10 {
            provider.update(&FrameInput {
                xr: None,
                camera: Some(&surface),
                now: t0,
            });
        }
        assert!(!provider.object_visible());

        provider.update(&FrameInput {
            xr: None,
            camera: Some(&surface),
            now: t0 + interval,
        });
        assert!(provider.object_visible());
    }
}
