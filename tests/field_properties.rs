//! Integration tests for the headless simulation core.
//!
//! These exercise the stepper, spawn policy and resize handling
//! end-to-end without a window or GPU.

use std::time::{Duration, Instant};

use warpfield::config::NEAR_PLANE;
use warpfield::spawn::Spawner;
use warpfield::surface::{ResizeDebouncer, Viewport};
use warpfield::{StarField, StarfieldConfig, StarfieldError};
use winit::dpi::PhysicalSize;

fn view_800x600() -> Viewport {
    Viewport {
        width: 800.0,
        height: 600.0,
        scale_factor: 1.0,
    }
}

// ============================================================================
// Depth invariant
// ============================================================================

#[test]
fn depth_is_strictly_positive_after_every_step() {
    let config = StarfieldConfig {
        star_count: 100,
        speed: 7.0,
        ..Default::default()
    };
    let mut field = StarField::with_seed(config, view_800x600(), 3).unwrap();

    for _ in 0..3000 {
        field.step(view_800x600());
        for star in field.stars() {
            assert!(star.depth > 0.0, "star depth {} after step", star.depth);
        }
    }
}

// ============================================================================
// Trail bounds and warm-up
// ============================================================================

#[test]
fn trail_never_exceeds_capacity_and_fills_after_warmup() {
    let trail_length = 8;
    let config = StarfieldConfig {
        star_count: 200,
        trail_length,
        ..Default::default()
    };
    let mut field = StarField::with_seed(config, view_800x600(), 11).unwrap();

    for _ in 0..20 {
        field.step(view_800x600());
        for star in field.stars() {
            assert!(star.trail.len() <= trail_length);
        }
    }

    // After warm-up, only stars that respawned recently may hold a
    // partial trail; each respawn accounts for at most one of them.
    let non_full = field
        .stars()
        .iter()
        .filter(|s| s.trail.len() < trail_length)
        .count() as u64;
    assert!(non_full <= field.respawn_count());
    assert!(
        field.stars().iter().any(|s| s.trail.len() == trail_length),
        "no star reached a full trail after warm-up"
    );
}

#[test]
fn trail_retains_the_most_recent_projections() {
    // trail_length=4, 10 steps without a respawn: the oldest retained
    // point must be the projection from step 7, not step 1.
    let config = StarfieldConfig {
        star_count: 1,
        speed: 0.5,
        trail_length: 4,
        min_radius: 0.0,
        ..Default::default()
    };

    // Pick a seed whose star starts deep enough to survive 10 steps.
    let mut field = (0..20)
        .find_map(|seed| {
            let field = StarField::with_seed(config.clone(), view_800x600(), seed).ok()?;
            (field.stars()[0].depth > 10.0).then_some(field)
        })
        .expect("no seed produced a star deep enough for the scenario");

    let mut per_step_newest = Vec::new();
    for _ in 0..10 {
        field.step(view_800x600());
        let trail = &field.stars()[0].trail;
        per_step_newest.push(trail.get(trail.len() - 1).unwrap());
    }

    assert_eq!(field.respawn_count(), 0);
    let trail = &field.stars()[0].trail;
    assert_eq!(trail.len(), 4);
    assert_eq!(trail.get(0), Some(per_step_newest[6])); // step 7
    assert_eq!(trail.get(3), Some(per_step_newest[9])); // step 10
}

// ============================================================================
// Respawn scenario
// ============================================================================

#[test]
fn single_fast_star_respawns_exactly_once_with_a_cleared_trail() {
    let config = StarfieldConfig {
        star_count: 1,
        speed: 10.0,
        min_radius: 0.0,
        ..Default::default()
    };
    let mut field = StarField::with_seed(config, view_800x600(), 5).unwrap();

    let z0 = field.stars()[0].depth;
    let steps_to_cross = ((z0 - NEAR_PLANE) / 10.0).floor() as u32 + 1;

    for _ in 0..steps_to_cross {
        field.step(view_800x600());
    }

    assert_eq!(field.respawn_count(), 1);
    // The respawn cleared the trail; the same step then appended the
    // star's new projection, so exactly one point remains.
    assert_eq!(field.stars()[0].trail.len(), 1);
    assert!(field.stars()[0].depth > 0.0);

    field.step(view_800x600());
    assert_eq!(field.stars()[0].trail.len(), 2);
}

// ============================================================================
// Spawn policy dead zone
// ============================================================================

#[test]
fn ten_thousand_spawns_all_clear_a_100px_dead_zone() {
    let focal = 500.0;
    let mut spawner = Spawner::with_seed(100.0, focal, 17);

    for _ in 0..10_000 {
        let (pos, depth) = spawner.initial(800.0, 800.0);
        let projected = pos.length() * focal / depth;
        assert!(
            projected >= 100.0 - 1e-3,
            "projected distance {} inside the dead zone",
            projected
        );
    }
}

#[test]
fn dead_zone_larger_than_spawn_box_fails_construction() {
    let config = StarfieldConfig {
        min_radius: 500.0,
        max_radius: Some(100.0),
        ..Default::default()
    };
    let result = StarField::with_seed(config, view_800x600(), 1);
    assert!(matches!(result, Err(StarfieldError::InvalidConfig(_))));
}

// ============================================================================
// Resize debouncing
// ============================================================================

#[test]
fn repeated_identical_resizes_in_one_window_apply_once() {
    let mut debouncer = ResizeDebouncer::default();
    let t0 = Instant::now();
    let size = PhysicalSize::new(1920, 1080);

    debouncer.request(size, t0);
    debouncer.request(size, t0 + Duration::from_millis(2));

    assert_eq!(
        debouncer.take_ready(t0 + Duration::from_millis(200)),
        Some(size)
    );
    assert_eq!(debouncer.take_ready(t0 + Duration::from_secs(1)), None);
}

#[test]
fn stepper_picks_up_new_dimensions_without_disruption() {
    let config = StarfieldConfig {
        star_count: 50,
        ..Default::default()
    };
    let mut field = StarField::with_seed(config, view_800x600(), 23).unwrap();

    for _ in 0..10 {
        field.step(view_800x600());
    }

    let wider = Viewport {
        width: 1600.0,
        height: 900.0,
        scale_factor: 1.0,
    };
    let draw = field.step(wider);
    assert_eq!(draw.heads.len(), 50);
    for star in field.stars() {
        assert!(star.depth > 0.0);
    }
}
