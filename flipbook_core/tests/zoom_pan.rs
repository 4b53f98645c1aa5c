// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
use flipbook_core::input::{PointerEvent, PointerEventKind};
use glam::Vec2;
use proptest::prelude::*;
use testutil::ZoomOp;

#[test]
fn zoom_buttons_saturate() {
    let mut viewer = testutil::viewer(4);
    for _ in 0..40 {
        viewer.zoom_in();
    }
    assert_eq!(viewer.zoom(), 3.0);
    assert!(!viewer.can_zoom_in());
    for _ in 0..40 {
        viewer.zoom_out();
    }
    assert_eq!(viewer.zoom(), 1.0);
    assert!(!viewer.can_zoom_out());
}

fn drag(viewer: &mut flipbook_core::Viewer, by: Vec2) {
    let start = Vec2::new(800.0, 400.0);
    viewer.pointer(&PointerEvent::mouse(PointerEventKind::Down, start, 0.0, Some(0)));
    viewer.pointer(&PointerEvent::mouse(PointerEventKind::Move, start + by, 10.0, Some(0)));
    viewer.pointer(&PointerEvent::mouse(PointerEventKind::Up, start + by, 20.0, Some(0)));
}

#[test]
fn zooming_out_reclamps_pan_in_the_same_call() {
    let mut viewer = testutil::viewer(4);
    viewer.frame(0.0, 0.016);
    viewer.set_zoom(2.0);
    drag(&mut viewer, Vec2::new(-5000.0, 5000.0));
    let wide = viewer.pan();
    assert!(viewer.rig().bounds(2.0).contains(wide));
    assert!(wide.x < 0.0 && wide.y < 0.0);

    viewer.set_zoom(1.0);
    let pan = viewer.pan();
    assert!(viewer.rig().bounds(1.0).contains(pan));
    assert!(pan.x.abs() < wide.x.abs());
}

#[test]
fn pan_follows_drag_direction() {
    let mut viewer = testutil::viewer(4);
    viewer.frame(0.0, 0.016);
    viewer.set_zoom(3.0);
    drag(&mut viewer, Vec2::new(40.0, 40.0));
    // screen y grows downward
    assert!(viewer.pan().x > 0.0);
    assert!(viewer.pan().y < 0.0);
}

#[test]
fn mobile_side_moves_the_book() {
    let mut viewer = testutil::viewer_with(4, testutil::mobile_viewport());
    let left = viewer.frame(0.0, 0.016).position.x;
    viewer.set_side(flipbook_core::types::Side::Right);
    let frames = testutil::run(&mut viewer, 16.0, 5000.0);
    let right = frames.last().unwrap().position.x;
    assert!(left < 0.0);
    assert!((right + left).abs() < 1e-3);
}

proptest! {
    #[test]
    fn zoom_stays_in_range(ops in proptest::collection::vec(testutil::zoom_op_strategy(), 1..60)) {
        let mut viewer = testutil::viewer(2);
        for op in ops {
            let z = match op {
                ZoomOp::In => viewer.zoom_in(),
                ZoomOp::Out => viewer.zoom_out(),
                ZoomOp::Set(v) => viewer.set_zoom(v),
            };
            prop_assert!((1.0..=3.0).contains(&z));
            prop_assert!(viewer.rig().bounds(z).contains(viewer.pan()));
        }
    }
}
