//! The star record and its bounded trail buffer.

use glam::Vec2;

/// Fixed-capacity history of a star's projected screen positions.
///
/// Implemented as a ring buffer with a write cursor: at capacity the
/// oldest slot is overwritten in place, so steady-state pushes never
/// allocate. Iteration order is oldest to newest.
#[derive(Debug, Clone)]
pub struct Trail {
    slots: Vec<Vec2>,
    start: usize,
    len: usize,
}

impl Trail {
    /// Create an empty trail with room for `capacity` points.
    pub fn new(capacity: usize) -> Self {
        Self {
            slots: vec![Vec2::ZERO; capacity.max(1)],
            start: 0,
            len: 0,
        }
    }

    /// Maximum number of retained points.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of currently retained points.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the trail holds no points.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append a point, overwriting the oldest slot at capacity.
    pub fn push(&mut self, point: Vec2) {
        let cap = self.slots.len();
        if self.len < cap {
            self.slots[(self.start + self.len) % cap] = point;
            self.len += 1;
        } else {
            self.slots[self.start] = point;
            self.start = (self.start + 1) % cap;
        }
    }

    /// Drop all points. The backing allocation is kept.
    pub fn clear(&mut self) {
        self.start = 0;
        self.len = 0;
    }

    /// Retained point by logical index, `0` = oldest.
    #[inline]
    pub fn get(&self, index: usize) -> Option<Vec2> {
        if index < self.len {
            Some(self.slots[(self.start + index) % self.slots.len()])
        } else {
            None
        }
    }

    /// Iterate retained points, oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = Vec2> + '_ {
        (0..self.len).map(move |i| self.slots[(self.start + i) % self.slots.len()])
    }
}

/// A single star in the field.
///
/// `pos` is the offset from the viewing center in world units, not
/// screen pixels; `depth` is the distance from the camera along the
/// viewing axis and stays strictly positive while the star travels.
#[derive(Debug, Clone)]
pub struct Star {
    /// World-space offset from the viewing center.
    pub pos: Vec2,
    /// Distance from the camera. Decreases every step.
    pub depth: f32,
    /// Per-star size scalar, fixed at engine start.
    pub base_radius: f32,
    /// Projected screen-position history.
    pub trail: Trail,
}

impl Star {
    /// Create a star with an empty trail. The spawner assigns real
    /// position and depth before the first step.
    pub fn new(trail_capacity: usize) -> Self {
        Self {
            pos: Vec2::ZERO,
            depth: 1.0,
            base_radius: 1.0,
            trail: Trail::new(trail_capacity),
        }
    }

    /// Reinitialize in place: one assignment of position and depth plus
    /// a trail reset, so the star is never observed mid-respawn with
    /// inconsistent fields.
    pub fn reinitialize(&mut self, pos: Vec2, depth: f32) {
        self.pos = pos;
        self.depth = depth;
        self.trail.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trail_grows_until_capacity() {
        let mut trail = Trail::new(4);
        for i in 0..3 {
            trail.push(Vec2::splat(i as f32));
        }
        assert_eq!(trail.len(), 3);
        assert_eq!(trail.get(0), Some(Vec2::splat(0.0)));
        assert_eq!(trail.get(2), Some(Vec2::splat(2.0)));
    }

    #[test]
    fn trail_overwrites_oldest_at_capacity() {
        let mut trail = Trail::new(4);
        for i in 0..10 {
            trail.push(Vec2::splat(i as f32));
        }
        assert_eq!(trail.len(), 4);
        // Steps 7..=10 survive (1-based): pushes 6,7,8,9 zero-based.
        let points: Vec<Vec2> = trail.iter().collect();
        assert_eq!(points[0], Vec2::splat(6.0));
        assert_eq!(points[3], Vec2::splat(9.0));
    }

    #[test]
    fn trail_clear_keeps_capacity() {
        let mut trail = Trail::new(4);
        for i in 0..6 {
            trail.push(Vec2::splat(i as f32));
        }
        trail.clear();
        assert!(trail.is_empty());
        assert_eq!(trail.capacity(), 4);
        trail.push(Vec2::new(1.0, 2.0));
        assert_eq!(trail.get(0), Some(Vec2::new(1.0, 2.0)));
    }

    #[test]
    fn reinitialize_resets_all_fields_at_once() {
        let mut star = Star::new(4);
        star.trail.push(Vec2::ONE);
        star.reinitialize(Vec2::new(3.0, -4.0), 700.0);
        assert_eq!(star.pos, Vec2::new(3.0, -4.0));
        assert_eq!(star.depth, 700.0);
        assert!(star.trail.is_empty());
    }
}
