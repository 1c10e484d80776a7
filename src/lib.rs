//! # Warpfield - Tunnel Starfield Engine
//!
//! An infinite fly-through particle animation: a simulated camera
//! travels through a field of point-lights, each rendered as a soft
//! circle with a fading, tapering motion trail.
//!
//! ## Quick Start
//!
//! ```ignore
//! use warpfield::prelude::*;
//!
//! fn main() -> Result<(), StarfieldError> {
//!     Starfield::new()
//!         .with_star_count(300)
//!         .with_speed(6.0)
//!         .with_trail_length(10)
//!         .run()
//! }
//! ```
//!
//! ## How it works
//!
//! Every star carries a world-space offset from the viewing axis and a
//! depth. Each frame the depth shrinks by the configured speed; the
//! star is projected with `k = focal_length / depth` and drawn at
//! `center + offset * k`, so it accelerates outward and grows as it
//! nears the camera. Once it crosses the near plane it is re-seeded at
//! the far plane in place - the star set never changes size.
//!
//! Two mechanisms produce the comet look:
//!
//! - a bounded per-star **trail** ring buffer of recent screen
//!   positions, drawn as strokes that taper and fade toward the tail;
//! - a translucent background wash over a persistent accumulation
//!   texture, so each frame's image decays instead of vanishing.
//!
//! Spawns honor a **dead zone**: a configurable minimum projected
//! distance from the screen center, enforced by bounded rejection
//! sampling (see [`spawn::Spawner`]).
//!
//! ## Headless use
//!
//! The simulation core ([`field::StarField`]) runs without a window or
//! GPU and hands back screen-space draw data, which is how the test
//! suite exercises every property of the stepper.

pub mod config;
pub mod error;
pub mod field;
mod render;
pub mod spawn;
pub mod star;
pub mod surface;
pub mod time;

mod engine;

pub use config::StarfieldConfig;
pub use engine::{Starfield, StopHandle};
pub use error::{GpuError, StarfieldError};
pub use field::{DrawList, HeadInstance, SegmentInstance, StarField};
pub use glam::Vec2;
pub use star::{Star, Trail};
pub use surface::Viewport;

/// Convenient re-exports for common usage.
pub mod prelude {
    pub use crate::config::StarfieldConfig;
    pub use crate::engine::{Starfield, StopHandle};
    pub use crate::error::StarfieldError;
    pub use crate::field::StarField;
    pub use crate::surface::Viewport;
    pub use crate::time::FrameClock;
    pub use crate::Vec2;
}
