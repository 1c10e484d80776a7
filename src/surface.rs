//! Surface dimensions and debounced resize handling.
//!
//! The engine simulates and draws in logical (DPI-independent) pixels;
//! the GPU surface is configured in physical pixels. [`Viewport`]
//! carries both. Window resize events are debounced: a pending size is
//! applied only once no further resize has arrived for the debounce
//! window, so rapid resize bursts reconfigure the surface once.

use std::time::{Duration, Instant};

use winit::dpi::PhysicalSize;

/// Delay before a pending resize takes effect.
pub const RESIZE_DEBOUNCE: Duration = Duration::from_millis(150);

/// Logical drawing dimensions plus the device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    /// Logical width in DPI-independent pixels.
    pub width: f32,
    /// Logical height in DPI-independent pixels.
    pub height: f32,
    /// Device pixel ratio (`>= 1.0` on ordinary displays).
    pub scale_factor: f64,
}

impl Viewport {
    /// Derive logical dimensions from a physical size and scale factor.
    pub fn from_physical(size: PhysicalSize<u32>, scale_factor: f64) -> Self {
        let logical = size.to_logical::<f64>(scale_factor.max(f64::MIN_POSITIVE));
        Self {
            width: logical.width as f32,
            height: logical.height as f32,
            scale_factor,
        }
    }

    /// Screen center in logical pixels.
    #[inline]
    pub fn center(&self) -> (f32, f32) {
        (self.width * 0.5, self.height * 0.5)
    }

    /// The larger of width and height; the default spawn box extent.
    #[inline]
    pub fn max_extent(&self) -> f32 {
        self.width.max(self.height)
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 720.0,
            scale_factor: 1.0,
        }
    }
}

/// Debouncer for window resize events.
///
/// Each [`request`](Self::request) restarts the timer, so only the last
/// size of a resize burst is ever applied. Timing is passed in rather
/// than read from the wall clock, which keeps the type testable.
#[derive(Debug)]
pub struct ResizeDebouncer {
    pending: Option<(PhysicalSize<u32>, Instant)>,
    delay: Duration,
}

impl ResizeDebouncer {
    pub fn new(delay: Duration) -> Self {
        Self {
            pending: None,
            delay,
        }
    }

    /// Record a resize. Supersedes any earlier pending size.
    pub fn request(&mut self, size: PhysicalSize<u32>, now: Instant) {
        self.pending = Some((size, now));
    }

    /// Take the pending size if the debounce window has elapsed.
    pub fn take_ready(&mut self, now: Instant) -> Option<PhysicalSize<u32>> {
        match self.pending {
            Some((size, at)) if now.duration_since(at) >= self.delay => {
                self.pending = None;
                Some(size)
            }
            _ => None,
        }
    }

    /// Whether a resize is waiting for its window to elapse.
    #[inline]
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

impl Default for ResizeDebouncer {
    fn default() -> Self {
        Self::new(RESIZE_DEBOUNCE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn viewport_halves_physical_size_at_2x_scale() {
        let view = Viewport::from_physical(PhysicalSize::new(2560, 1440), 2.0);
        assert_eq!(view.width, 1280.0);
        assert_eq!(view.height, 720.0);
        assert_eq!(view.max_extent(), 1280.0);
    }

    #[test]
    fn debounce_holds_until_window_elapses() {
        let mut debouncer = ResizeDebouncer::default();
        let t0 = Instant::now();
        debouncer.request(PhysicalSize::new(800, 600), t0);

        assert_eq!(debouncer.take_ready(t0 + Duration::from_millis(100)), None);
        assert_eq!(
            debouncer.take_ready(t0 + Duration::from_millis(151)),
            Some(PhysicalSize::new(800, 600))
        );
        assert!(!debouncer.is_pending());
    }

    #[test]
    fn duplicate_requests_in_one_window_apply_once() {
        let mut debouncer = ResizeDebouncer::default();
        let t0 = Instant::now();
        let size = PhysicalSize::new(1024, 768);
        debouncer.request(size, t0);
        debouncer.request(size, t0 + Duration::from_millis(1));

        let ready = debouncer.take_ready(t0 + Duration::from_millis(200));
        assert_eq!(ready, Some(size));
        // The second identical request left nothing extra behind.
        assert_eq!(debouncer.take_ready(t0 + Duration::from_secs(1)), None);
    }

    #[test]
    fn later_request_supersedes_earlier_one() {
        let mut debouncer = ResizeDebouncer::default();
        let t0 = Instant::now();
        debouncer.request(PhysicalSize::new(800, 600), t0);
        debouncer.request(PhysicalSize::new(640, 480), t0 + Duration::from_millis(50));

        // First request's window has elapsed, but it was replaced.
        assert_eq!(debouncer.take_ready(t0 + Duration::from_millis(160)), None);
        assert_eq!(
            debouncer.take_ready(t0 + Duration::from_millis(201)),
            Some(PhysicalSize::new(640, 480))
        );
    }
}
