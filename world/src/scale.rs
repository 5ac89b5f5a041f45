//! Staged background shrink and the sprite tweens that follow it.

use std::{f32::consts::PI, time::Duration};

use cat_siege_core::{Viewport, MAX_SCALE_STEPS};
use glam::Vec2;

/// Length of one shrink step.
pub(crate) const SCALE_STEP_DURATION: Duration = Duration::from_millis(1000);

/// Fraction of the initial background scale left after the last step.
const FINAL_SCALE_FRACTION: f32 = 0.3;

/// Collision bodies are slightly larger than the drawn sprite.
const BODY_PADDING: f32 = 1.2;

const NARROW_VIEWPORT_WIDTH: f32 = 600.0;
const NARROW_ZOOM: f32 = 0.8;
const WIDE_ZOOM: f32 = 1.2;

/// Collision body for a texture drawn at `scale`.
pub(crate) fn body_size(texture: Vec2, scale: f32) -> Vec2 {
    texture * scale * BODY_PADDING
}

/// Background ratio reached once `step` shrink steps have run.
pub(crate) fn step_ratio(step: u8) -> f32 {
    1.0 - (1.0 - FINAL_SCALE_FRACTION) * f32::from(step) / f32::from(MAX_SCALE_STEPS)
}

/// Scale that covers the viewport with the background, zoomed by viewport class.
pub(crate) fn initial_background_scale(viewport: Viewport, background: Vec2) -> f32 {
    let cover = (viewport.width() / background.x).max(viewport.height() / background.y);
    let cover = if cover.is_finite() { cover } else { 1.0 };
    if viewport.width() < NARROW_VIEWPORT_WIDTH {
        cover * NARROW_ZOOM
    } else {
        cover * WIDE_ZOOM
    }
}

fn ease_in_out_sine(t: f32) -> f32 {
    -((PI * t.clamp(0.0, 1.0)).cos() - 1.0) / 2.0
}

/// Interpolation endpoints for one sprite.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct ScaleTween {
    from: f32,
    to: f32,
}

impl ScaleTween {
    pub(crate) const fn new(from: f32, to: f32) -> Self {
        Self { from, to }
    }

    pub(crate) fn sample(&self, eased: f32) -> f32 {
        self.from + (self.to - self.from) * eased
    }

    pub(crate) const fn target(&self) -> f32 {
        self.to
    }
}

/// Outcome of advancing the shrink clock.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) enum StepProgress {
    /// Step still running; carries the eased progress in `[0, 1]`.
    InFlight(f32),
    /// Step finished during this advance.
    Completed(u8),
}

/// Tracks the background ratio and the shrink step in flight.
#[derive(Clone, Debug)]
pub(crate) struct ScaleTransition {
    initial_background: f32,
    step: u8,
    ratio: f32,
    elapsed: Option<Duration>,
}

impl ScaleTransition {
    pub(crate) fn new(initial_background: f32) -> Self {
        Self {
            initial_background,
            step: 0,
            ratio: 1.0,
            elapsed: None,
        }
    }

    pub(crate) const fn step(&self) -> u8 {
        self.step
    }

    /// Ratio new sprites are scaled by; jumps to the target when a step begins.
    pub(crate) const fn ratio(&self) -> f32 {
        self.ratio
    }

    pub(crate) fn background_scale(&self) -> f32 {
        self.initial_background * self.ratio
    }

    /// Starts the next step and returns the previous and new ratios.
    pub(crate) fn begin_step(&mut self) -> Option<(f32, f32)> {
        if self.step >= MAX_SCALE_STEPS {
            return None;
        }
        let previous = self.ratio;
        self.step += 1;
        self.ratio = step_ratio(self.step);
        self.elapsed = Some(Duration::ZERO);
        Some((previous, self.ratio))
    }

    /// Stops the step in flight, if any, and returns its number.
    pub(crate) fn finish_in_flight(&mut self) -> Option<u8> {
        self.elapsed.take().map(|_| self.step)
    }

    pub(crate) fn advance(&mut self, dt: Duration) -> Option<StepProgress> {
        let elapsed = self.elapsed?.saturating_add(dt);
        if elapsed >= SCALE_STEP_DURATION {
            self.elapsed = None;
            return Some(StepProgress::Completed(self.step));
        }
        self.elapsed = Some(elapsed);
        let t = elapsed.as_secs_f32() / SCALE_STEP_DURATION.as_secs_f32();
        Some(StepProgress::InFlight(ease_in_out_sine(t)))
    }
}
