#![allow(clippy::float_cmp)]

use super::*;

const EPSILON: f64 = 1e-9;

fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < EPSILON
}

fn bounds() -> MapBounds {
    MapBounds::new(0.0, 0.0, 400.0, 400.0)
}

fn pt(x: f64, y: f64) -> Point {
    Point::new(x, y)
}

// =============================================================
// Defaults
// =============================================================

#[test]
fn default_view() {
    let v = ViewState::default();
    assert_eq!(v.zoom_level(), 1.0);
    assert_eq!(v.center(), pt(0.0, 0.0));
    assert!(v.follow_player());
    assert!(!v.is_panning());
    assert_eq!(v.zoom_range(), ZoomRange::NORMAL);
}

// =============================================================
// Zoom
// =============================================================

#[test]
fn zoom_in_multiplies_by_step() {
    let mut v = ViewState::default();
    v.zoom_in();
    assert!(approx_eq(v.zoom_level(), 1.5));
    v.zoom_out();
    assert!(approx_eq(v.zoom_level(), 1.0));
}

#[test]
fn zoom_in_clamps_at_max() {
    let mut v = ViewState::default();
    for _ in 0..50 {
        v.zoom_in();
        assert!(v.zoom_level() <= 10.0);
    }
    assert_eq!(v.zoom_level(), 10.0);
}

#[test]
fn zoom_out_clamps_at_min() {
    let mut v = ViewState::default();
    for _ in 0..50 {
        v.zoom_out();
        assert!(v.zoom_level() >= 0.01);
    }
    assert_eq!(v.zoom_level(), 0.01);
}

#[test]
fn extended_range_widens_bounds() {
    let mut v = ViewState::default();
    v.set_extended_range(true);
    for _ in 0..50 {
        v.zoom_in();
    }
    assert_eq!(v.zoom_level(), 50.0);
    for _ in 0..100 {
        v.zoom_out();
    }
    assert_eq!(v.zoom_level(), 0.001);
}

#[test]
fn leaving_extended_range_reclamps() {
    let mut v = ViewState::default();
    v.set_extended_range(true);
    v.set_zoom(40.0);
    v.set_extended_range(false);
    assert_eq!(v.zoom_level(), 10.0);
    v.set_extended_range(true);
    v.set_zoom(0.002);
    v.set_extended_range(false);
    assert_eq!(v.zoom_level(), 0.01);
}

#[test]
fn zoom_by_ignores_bad_factors() {
    let mut v = ViewState::default();
    v.zoom_by(0.0);
    v.zoom_by(-2.0);
    v.zoom_by(f64::NAN);
    v.zoom_by(f64::INFINITY);
    assert_eq!(v.zoom_level(), 1.0);
}

#[test]
fn set_zoom_ignores_nan() {
    let mut v = ViewState::default();
    v.set_zoom(f64::NAN);
    assert_eq!(v.zoom_level(), 1.0);
}

// =============================================================
// Pan gesture
// =============================================================

#[test]
fn press_outside_bounds_stays_idle() {
    let mut v = ViewState::default();
    assert!(!v.pointer_down(pt(500.0, 10.0), &bounds()));
    assert!(v.drag_state().is_idle());
}

#[test]
fn small_move_keeps_tracking() {
    let mut v = ViewState::default();
    v.pointer_down(pt(100.0, 100.0), &bounds());
    assert!(!v.pointer_move(pt(102.0, 102.0), bounds()));
    assert!(matches!(v.drag_state(), DragState::Tracking { .. }));
    assert!(v.follow_player());
    assert_eq!(v.center(), pt(0.0, 0.0));
}

#[test]
fn move_at_exactly_threshold_does_not_pan() {
    let mut v = ViewState::default();
    v.pointer_down(pt(100.0, 100.0), &bounds());
    v.pointer_move(pt(103.0, 100.0), bounds());
    assert!(!v.is_panning());
}

#[test]
fn drag_past_threshold_pans_and_disables_follow() {
    let mut v = ViewState::default();
    assert!(v.follow_player());
    v.pointer_down(pt(100.0, 100.0), &bounds());
    assert!(v.pointer_move(pt(110.0, 100.0), bounds()));
    assert!(v.is_panning());
    assert!(!v.follow_player());

    v.pointer_up();
    assert!(!v.is_panning());
    assert!(!v.follow_player());
}

#[test]
fn pan_moves_center_opposite_to_drag() {
    let mut v = ViewState::default();
    // scale = 400 / 4000 = 0.1 px per world unit
    v.pointer_down(pt(200.0, 200.0), &bounds());
    v.pointer_move(pt(210.0, 195.0), bounds());
    assert!(approx_eq(v.center().x, -100.0));
    assert!(approx_eq(v.center().y, 50.0));
    v.pointer_move(pt(220.0, 195.0), bounds());
    assert!(approx_eq(v.center().x, -200.0));
}

#[test]
fn pan_delta_includes_tracking_movement() {
    let mut v = ViewState::default();
    v.pointer_down(pt(200.0, 200.0), &bounds());
    v.pointer_move(pt(202.0, 200.0), bounds());
    v.pointer_move(pt(210.0, 200.0), bounds());
    // Delta from the last tracked point (202) to 210 = 8px = 80 world units.
    assert!(approx_eq(v.center().x, -80.0));
}

#[test]
fn pan_respects_zoom() {
    let mut v = ViewState::default();
    v.set_zoom(2.0);
    v.pointer_down(pt(200.0, 200.0), &bounds());
    v.pointer_move(pt(220.0, 200.0), bounds());
    assert!(approx_eq(v.center().x, -100.0));
}

#[test]
fn pointer_up_reports_gesture_and_resets() {
    let mut v = ViewState::default();
    v.pointer_down(pt(50.0, 50.0), &bounds());
    let ended = v.pointer_up();
    assert!(matches!(ended, DragState::Tracking { .. }));
    assert!(v.drag_state().is_idle());
    assert!(v.pointer_up().is_idle());
}

#[test]
fn second_press_while_tracking_is_ignored() {
    let mut v = ViewState::default();
    v.pointer_down(pt(50.0, 50.0), &bounds());
    assert!(!v.pointer_down(pt(60.0, 60.0), &bounds()));
}

#[test]
fn move_while_idle_is_noop() {
    let mut v = ViewState::default();
    assert!(!v.pointer_move(pt(300.0, 300.0), bounds()));
    assert_eq!(v.center(), pt(0.0, 0.0));
}

#[test]
fn cancel_drag_returns_to_idle() {
    let mut v = ViewState::default();
    v.pointer_down(pt(50.0, 50.0), &bounds());
    v.pointer_move(pt(90.0, 50.0), bounds());
    v.cancel_drag();
    assert!(v.drag_state().is_idle());
}

// =============================================================
// Follow
// =============================================================

#[test]
fn enable_follow_recenters_immediately() {
    let mut v = ViewState::default();
    v.disable_follow_player();
    v.enable_follow_player(pt(123.0, -45.0));
    assert!(v.follow_player());
    assert_eq!(v.center(), pt(123.0, -45.0));
}

#[test]
fn follow_tick_tracks_player() {
    let mut v = ViewState::default();
    assert!(v.follow_tick(Some(pt(10.0, 20.0))));
    assert_eq!(v.center(), pt(10.0, 20.0));
    assert!(!v.follow_tick(Some(pt(10.0, 20.0))));
    assert!(!v.follow_tick(None));
}

#[test]
fn follow_tick_ignored_when_not_following() {
    let mut v = ViewState::default();
    v.disable_follow_player();
    assert!(!v.follow_tick(Some(pt(10.0, 20.0))));
    assert_eq!(v.center(), pt(0.0, 0.0));
}

#[test]
fn transform_uses_view() {
    let mut v = ViewState::default();
    v.set_center(pt(100.0, 100.0));
    let t = v.transform(bounds());
    assert_eq!(t.world_to_screen(pt(100.0, 100.0)), pt(200.0, 200.0));
}
