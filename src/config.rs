//! Starfield configuration.
//!
//! A [`StarfieldConfig`] is immutable once the engine is built. Values
//! outside the documented ranges are not rejected unless they make the
//! spawn policy unsatisfiable: a zero star count renders nothing and a
//! non-positive speed freezes the field in place. Both are visually
//! degenerate but harmless, so they pass validation untouched.

use crate::error::StarfieldError;

/// Depth below which a star has passed the camera and respawns.
pub const NEAR_PLANE: f32 = 1.0;

/// Extra depth range behind the far plane used when reintroducing a
/// star after it passes the camera.
pub const RESPAWN_DEPTH_BAND: f32 = 200.0;

/// Configuration for a starfield engine.
#[derive(Debug, Clone)]
pub struct StarfieldConfig {
    /// Number of stars. The set size is constant for the engine's
    /// lifetime; stars are recycled, never destroyed.
    pub star_count: u32,
    /// Depth units each star travels toward the camera per step.
    pub speed: f32,
    /// Background RGBA. The alpha channel is the per-frame fade
    /// strength: lower alpha leaves longer cross-frame ghosting.
    pub base_color: [f32; 4],
    /// Star RGBA. The alpha channel caps head and trail opacity.
    pub star_color: [f32; 4],
    /// Dead zone: minimum projected distance from screen center at
    /// which a star may spawn, in logical pixels.
    pub min_radius: f32,
    /// Half-extent of the spawn box in world units. `None` uses the
    /// larger of the viewport's width and height, re-read every frame.
    pub max_radius: Option<f32>,
    /// Number of historical screen points retained per star (>= 1).
    pub trail_length: usize,
    /// Base radius scalar. Each star's own base radius is randomized
    /// in `[0.5, 1.5)` of this value at engine start.
    pub star_radius: f32,
    /// Perspective focal length: `k = focal_length / depth`.
    pub focal_length: f32,
    /// Every this many frames the background repaint is opaque,
    /// bounding long-run ghosting. `0` disables the periodic flush.
    pub flush_interval: u64,
}

impl Default for StarfieldConfig {
    fn default() -> Self {
        Self {
            star_count: 200,
            speed: 5.0,
            base_color: [0.02, 0.02, 0.05, 0.3],
            star_color: [0.9, 0.95, 1.0, 1.0],
            min_radius: 80.0,
            max_radius: None,
            trail_length: 8,
            star_radius: 1.0,
            focal_length: 500.0,
            flush_interval: 300,
        }
    }
}

impl StarfieldConfig {
    /// Check that the spawn policy can terminate for this configuration.
    ///
    /// With an explicit `max_radius` smaller than `min_radius` every
    /// rejection-sampling attempt could fail, so that combination is
    /// refused outright. (The sampler additionally bounds its retry
    /// loop at runtime, see [`crate::spawn::Spawner`].)
    pub fn validate(&self) -> Result<(), StarfieldError> {
        if let Some(max) = self.max_radius {
            if self.min_radius > max {
                return Err(StarfieldError::InvalidConfig(format!(
                    "min_radius ({}) exceeds max_radius ({}); the dead zone would swallow every spawn candidate",
                    self.min_radius, max
                )));
            }
        }
        if self.trail_length == 0 {
            return Err(StarfieldError::InvalidConfig(
                "trail_length must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        assert!(StarfieldConfig::default().validate().is_ok());
    }

    #[test]
    fn dead_zone_larger_than_spawn_box_is_rejected() {
        let config = StarfieldConfig {
            min_radius: 500.0,
            max_radius: Some(100.0),
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(StarfieldError::InvalidConfig(_))
        ));
    }

    #[test]
    fn zero_trail_capacity_is_rejected() {
        let config = StarfieldConfig {
            trail_length: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }
}
