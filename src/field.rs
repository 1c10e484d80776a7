//! The star store and per-frame stepper.
//!
//! [`StarField`] owns the fixed set of stars and advances them one
//! simulation step per call, producing a [`DrawList`] of screen-space
//! primitives for the renderer. It is fully headless: everything here
//! runs without a window or GPU, which is how the integration tests
//! exercise it.

use bytemuck::{Pod, Zeroable};
use glam::Vec2;

use crate::config::{StarfieldConfig, NEAR_PLANE, RESPAWN_DEPTH_BAND};
use crate::error::StarfieldError;
use crate::spawn::Spawner;
use crate::star::Star;
use crate::surface::Viewport;

/// Trail strokes never taper fully to zero width.
const MIN_SEGMENT_WIDTH: f32 = 0.05;
/// Trail opacity ceiling at the newest point (scaled by star alpha).
const TRAIL_MAX_ALPHA: f32 = 0.5;
/// Head radius floor: a star is never smaller than this on screen.
const HEAD_MIN_RADIUS: f32 = 0.75;
/// Head radius ceiling: bounds the one-frame flare as a star passes
/// the near plane, where `k` spikes.
const HEAD_MAX_RADIUS: f32 = 24.0;

/// One star head: a filled soft circle in logical pixels.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct HeadInstance {
    pub center: [f32; 2],
    pub radius: f32,
    pub alpha: f32,
}

/// One tapered trail stroke between consecutive trail points.
/// `width` and `alpha` hold the older/newer endpoint values; the
/// renderer interpolates along the segment.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct SegmentInstance {
    pub p0: [f32; 2],
    pub p1: [f32; 2],
    pub width: [f32; 2],
    pub alpha: [f32; 2],
}

/// Screen-space draw data for one frame. Buffers are reused across
/// frames; steady-state stepping allocates nothing.
#[derive(Debug, Default)]
pub struct DrawList {
    pub segments: Vec<SegmentInstance>,
    pub heads: Vec<HeadInstance>,
}

impl DrawList {
    fn clear(&mut self) {
        self.segments.clear();
        self.heads.clear();
    }
}

/// The fixed-size star set plus the stepping logic.
pub struct StarField {
    config: StarfieldConfig,
    stars: Vec<Star>,
    spawner: Spawner,
    draw: DrawList,
    respawns: u64,
}

impl StarField {
    /// Build a field and seed every star via the spawn policy.
    pub fn new(config: StarfieldConfig, view: Viewport) -> Result<Self, StarfieldError> {
        let spawner = Spawner::new(config.min_radius, config.focal_length);
        Self::with_spawner(config, view, spawner)
    }

    /// Deterministic variant for tests and reproducible fields.
    pub fn with_seed(
        config: StarfieldConfig,
        view: Viewport,
        seed: u64,
    ) -> Result<Self, StarfieldError> {
        let spawner = Spawner::with_seed(config.min_radius, config.focal_length, seed);
        Self::with_spawner(config, view, spawner)
    }

    fn with_spawner(
        config: StarfieldConfig,
        view: Viewport,
        mut spawner: Spawner,
    ) -> Result<Self, StarfieldError> {
        config.validate()?;

        let max_radius = config.max_radius.unwrap_or_else(|| view.max_extent());
        let far_depth = view.width;

        let stars = (0..config.star_count)
            .map(|_| {
                let mut star = Star::new(config.trail_length);
                star.base_radius = spawner.random_base_radius(config.star_radius);
                let (pos, depth) = spawner.initial(max_radius, far_depth);
                star.reinitialize(pos, depth);
                star
            })
            .collect();

        let draw = DrawList {
            segments: Vec::with_capacity(
                config.star_count as usize * config.trail_length.saturating_sub(1),
            ),
            heads: Vec::with_capacity(config.star_count as usize),
        };

        Ok(Self {
            config,
            stars,
            spawner,
            draw,
            respawns: 0,
        })
    }

    /// Advance every star one step and rebuild the draw list.
    ///
    /// Each star's projection is computed exactly once per call. A star
    /// whose depth crosses the near plane respawns in place and
    /// continues the same step with its new position, so the set size
    /// never changes.
    pub fn step(&mut self, view: Viewport) -> &DrawList {
        let (cx, cy) = view.center();
        let max_radius = self.config.max_radius.unwrap_or_else(|| view.max_extent());
        let far_depth = view.width;
        let star_alpha = self.config.star_color[3];

        self.draw.clear();

        for star in &mut self.stars {
            star.depth -= self.config.speed;
            if star.depth < NEAR_PLANE {
                let (pos, depth) = self.spawner.respawn(max_radius, far_depth);
                star.reinitialize(pos, depth);
                self.respawns += 1;
            }

            let k = self.config.focal_length / star.depth;
            let projected = Vec2::new(star.pos.x * k + cx, star.pos.y * k + cy);
            let head_radius = (star.base_radius * k).clamp(HEAD_MIN_RADIUS, HEAD_MAX_RADIUS);

            star.trail.push(projected);

            // Strokes between consecutive trail points, oldest first:
            // width tapers up to the head radius, alpha up to the cap.
            let points = star.trail.len();
            if points >= 2 {
                let denom = (points - 1) as f32;
                let mut iter = star.trail.iter();
                let mut prev = iter.next();
                for (i, p1) in iter.enumerate() {
                    let t0 = i as f32 / denom;
                    let t1 = (i + 1) as f32 / denom;
                    if let Some(p0) = prev {
                        self.draw.segments.push(SegmentInstance {
                            p0: p0.to_array(),
                            p1: p1.to_array(),
                            width: [
                                (head_radius * t0).max(MIN_SEGMENT_WIDTH),
                                (head_radius * t1).max(MIN_SEGMENT_WIDTH),
                            ],
                            alpha: [
                                TRAIL_MAX_ALPHA * star_alpha * t0,
                                TRAIL_MAX_ALPHA * star_alpha * t1,
                            ],
                        });
                    }
                    prev = Some(p1);
                }
            }

            // Nearer stars render more opaque.
            let proximity =
                1.0 - (star.depth / (far_depth + RESPAWN_DEPTH_BAND)).clamp(0.0, 1.0);
            self.draw.heads.push(HeadInstance {
                center: projected.to_array(),
                radius: head_radius,
                alpha: star_alpha * (0.4 + 0.6 * proximity),
            });
        }

        &self.draw
    }

    /// The stars, for inspection.
    #[inline]
    pub fn stars(&self) -> &[Star] {
        &self.stars
    }

    /// Total respawns since the field was built.
    #[inline]
    pub fn respawn_count(&self) -> u64 {
        self.respawns
    }

    /// The configuration the field was built with.
    #[inline]
    pub fn config(&self) -> &StarfieldConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_view() -> Viewport {
        Viewport {
            width: 800.0,
            height: 600.0,
            scale_factor: 1.0,
        }
    }

    fn small_field(star_count: u32) -> StarField {
        let config = StarfieldConfig {
            star_count,
            ..Default::default()
        };
        StarField::with_seed(config, test_view(), 1).unwrap()
    }

    fn small_field_seeded(seed: u64) -> StarField {
        let config = StarfieldConfig {
            star_count: 1,
            ..Default::default()
        };
        StarField::with_seed(config, test_view(), seed).unwrap()
    }

    #[test]
    fn depth_stays_positive_after_every_step() {
        let mut field = small_field(50);
        for _ in 0..2000 {
            field.step(test_view());
            for star in field.stars() {
                assert!(star.depth > 0.0);
            }
        }
    }

    #[test]
    fn draw_list_counts_match_the_star_set() {
        let mut field = small_field(25);
        // Warm up past the trail capacity.
        for _ in 0..20 {
            field.step(test_view());
        }
        let trail_len = field.config().trail_length;
        let draw = field.step(test_view());
        assert_eq!(draw.heads.len(), 25);
        // Stars that just respawned have shorter trails, so the
        // segment count is at most the full-trail total.
        assert!(draw.segments.len() <= 25 * (trail_len - 1));
        assert!(!draw.segments.is_empty());
    }

    #[test]
    fn segment_taper_is_monotonic_toward_the_head() {
        // A star deep enough not to respawn during warm-up, so the
        // measured step sees a full trail.
        let mut field = (0..20)
            .map(small_field_seeded)
            .find(|f| f.stars()[0].depth > 200.0)
            .unwrap();
        for _ in 0..20 {
            field.step(test_view());
        }
        let draw = field.step(test_view());
        for pair in draw.segments.windows(2) {
            assert!(pair[0].width[1] <= pair[1].width[1] + 1e-6);
            assert!(pair[0].alpha[1] <= pair[1].alpha[1] + 1e-6);
        }
        // Oldest end is near-transparent and near-zero width.
        let first = &draw.segments[0];
        assert!(first.alpha[0] < 1e-6);
        assert!((first.width[0] - MIN_SEGMENT_WIDTH).abs() < 1e-6);
    }

    #[test]
    fn head_radius_is_clamped() {
        let mut field = small_field(100);
        for _ in 0..500 {
            let draw = field.step(test_view());
            for head in &draw.heads {
                assert!(head.radius >= HEAD_MIN_RADIUS);
                assert!(head.radius <= HEAD_MAX_RADIUS);
            }
        }
    }

    #[test]
    fn stepping_reuses_draw_buffers() {
        let mut field = small_field(50);
        for _ in 0..20 {
            field.step(test_view());
        }
        let cap_segments = field.draw.segments.capacity();
        let cap_heads = field.draw.heads.capacity();
        for _ in 0..200 {
            field.step(test_view());
        }
        assert_eq!(field.draw.segments.capacity(), cap_segments);
        assert_eq!(field.draw.heads.capacity(), cap_heads);
    }
}
