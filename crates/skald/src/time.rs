//! Frame timing and delta time.
//!
//! [`FrameTime`] is advanced by the game loop once per simulated frame. The
//! delta is wall-clock time since the previous tick, capped so a stall (a
//! breakpoint, a hidden tab) never produces one huge physics step.

use std::time::Instant;

/// Timing for the running simulation. All values are zero while editing.
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameTime {
    /// Seconds covered by the current frame (after capping).
    delta: f32,
    /// Sum of every delta since simulation start.
    elapsed: f32,
    frame_count: u64,
    last_tick: Option<Instant>,
}

impl FrameTime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `now` as the reference point for the next delta without
    /// advancing. Used when play starts or resumes.
    pub fn rebase(&mut self, now: Instant) {
        self.last_tick = Some(now);
    }

    /// Advance to `now`, capping the delta at `max_delta` seconds.
    /// Returns the delta applied.
    pub fn advance(&mut self, now: Instant, max_delta: f32) -> f32 {
        let raw = self
            .last_tick
            .map(|last| now.saturating_duration_since(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last_tick = Some(now);
        self.delta = raw.min(max_delta);
        self.elapsed += self.delta;
        self.frame_count += 1;
        self.delta
    }

    /// Back to zero: no delta, no elapsed time, no frames.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn delta_secs(&self) -> f32 {
        self.delta
    }

    pub fn elapsed_secs(&self) -> f32 {
        self.elapsed
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Estimated FPS based on the last delta.
    pub fn fps(&self) -> f32 {
        if self.delta > 0.0 { 1.0 / self.delta } else { 0.0 }
    }
}
