//! Frame timing utilities

use std::time::{Duration, Instant};

/// Longest frame step handed to animations. A stalled frame (window drag,
/// breakpoint) would otherwise finish a cross-fade in a single step.
const MAX_FRAME_STEP: Duration = Duration::from_millis(100);

/// Tracks frame timing and calculates FPS
pub struct FrameTimer {
    last_frame: Instant,
    delta: Duration,
    frame_count: u64,
    fps_timer: Instant,
    fps: f32,
    fps_frame_count: u32,
}

impl FrameTimer {
    /// Create a new frame timer
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            last_frame: now,
            delta: Duration::ZERO,
            frame_count: 0,
            fps_timer: now,
            fps: 0.0,
            fps_frame_count: 0,
        }
    }

    /// Call once per frame to update timing
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    fn tick_at(&mut self, now: Instant) {
        self.delta = now.saturating_duration_since(self.last_frame).min(MAX_FRAME_STEP);
        self.last_frame = now;
        self.frame_count += 1;
        self.fps_frame_count += 1;

        // Update FPS every second
        let fps_elapsed = now.saturating_duration_since(self.fps_timer);
        if fps_elapsed >= Duration::from_secs(1) {
            self.fps = self.fps_frame_count as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = 0;
            self.fps_timer = now;
        }
    }

    /// Delta time in seconds, clamped to the maximum frame step
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Current FPS (updated every second)
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Total frame count
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delta_is_clamped() {
        let mut timer = FrameTimer::new();
        let start = timer.last_frame;
        timer.tick_at(start + Duration::from_secs(5));
        assert!((timer.delta_secs() - 0.1).abs() < 1e-6);
        assert_eq!(timer.frame_count(), 1);
    }

    #[test]
    fn test_fps_updates_after_one_second() {
        let mut timer = FrameTimer::new();
        let start = timer.last_frame;
        for i in 1..=60 {
            timer.tick_at(start + Duration::from_micros(i * 16_667));
        }
        assert!(timer.fps() > 55.0 && timer.fps() < 65.0, "fps = {}", timer.fps());
    }
}
