//! Frame timing for the animation loop.
//!
//! The starfield advances one simulation step per display refresh, so
//! the clock's jobs are counting frames (the periodic background flush
//! keys off the frame counter) and measuring a smoothed FPS.

use std::time::{Duration, Instant};

/// Per-frame timing: frame count and FPS.
#[derive(Debug)]
pub struct FrameClock {
    frame_count: u64,
    fps: f32,
    fps_frame_count: u64,
    fps_update_time: Instant,
    fps_update_interval: Duration,
}

impl FrameClock {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            frame_count: 0,
            fps: 0.0,
            fps_frame_count: 0,
            fps_update_time: now,
            fps_update_interval: Duration::from_millis(500),
        }
    }

    /// Advance to the next frame. Call once per display refresh.
    pub fn tick(&mut self) {
        let now = Instant::now();
        self.frame_count += 1;

        let fps_elapsed = now.duration_since(self.fps_update_time);
        if fps_elapsed >= self.fps_update_interval {
            let frames_since = self.frame_count - self.fps_frame_count;
            self.fps = frames_since as f32 / fps_elapsed.as_secs_f32();
            self.fps_frame_count = self.frame_count;
            self.fps_update_time = now;
        }
    }

    /// Frames since the clock was created.
    #[inline]
    pub fn frame(&self) -> u64 {
        self.frame_count
    }

    /// Smoothed frames per second, updated twice a second.
    #[inline]
    pub fn fps(&self) -> f32 {
        self.fps
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn tick_advances_the_frame_counter() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.frame(), 0);
        clock.tick();
        assert_eq!(clock.frame(), 1);
    }

    #[test]
    fn fps_updates_after_the_measurement_window() {
        let mut clock = FrameClock::new();
        assert_eq!(clock.fps(), 0.0);
        clock.tick();
        thread::sleep(Duration::from_millis(510));
        clock.tick();
        assert!(clock.fps() > 0.0);
    }
}
