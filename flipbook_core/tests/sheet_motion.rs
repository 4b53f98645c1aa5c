// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
use flipbook_core::config::{PageConfig, TurnConfig};
use flipbook_core::sheet::depth_offset;
use proptest::prelude::*;

#[test]
fn stack_depth_is_bounded_for_reference_sizes() {
    let turn = TurnConfig::default();
    let page = PageConfig::default();
    for total in [2usize, 50, 500] {
        for current in [0, total / 2, total] {
            let max = (0..total)
                .map(|i| depth_offset(i, current, total, page.depth, &turn))
                .fold(f32::MIN, f32::max);
            assert!(max <= turn.max_visual_depth, "{total} sheets at {current}: {max}");
        }
    }
}

#[test]
fn settled_sheets_are_rigid() {
    let mut viewer = testutil::viewer(12);
    viewer.set_requested_page(4);
    let frames = testutil::run(&mut viewer, 0.0, 8000.0);
    let last = frames.last().unwrap();
    for (sheet, snap) in viewer.book().sheets().iter().zip(&last.sheets) {
        assert!(sheet.turning_time() < 0.1);
        assert!(sheet.target_rotations()[1..]
            .iter()
            .all(|b| b.turn == 0.0 && b.fold == 0.0));
        assert!(snap.bones[1..].iter().all(|b| b.turn == 0.0 && b.fold == 0.0));
    }
}

#[test]
fn turning_sheet_curls_then_flattens() {
    let mut viewer = testutil::viewer(4);
    viewer.set_requested_page(1);
    let frames = testutil::run(&mut viewer, 0.0, 250.0);
    let mid = &frames[frames.len() / 2].sheets[0];
    assert!(mid.turning_time > 0.5);
    assert!(mid.bones[1..].iter().any(|b| b.turn != 0.0));
    let frames = testutil::run(&mut viewer, 250.0, 6000.0);
    let end = &frames.last().unwrap().sheets[0];
    assert!(end.opened);
    assert!(end.bones[1..].iter().all(|b| b.turn == 0.0));
}

#[test]
fn far_sheet_depth_follows_stack_position() {
    let turn = TurnConfig::default();
    let z = depth_offset(499, 0, 500, 0.003, &turn);
    assert!((z + 0.1497).abs() < 1e-4, "{z}");
    let mut distinct: Vec<f32> = (50..500).map(|i| depth_offset(i, 0, 500, 0.003, &turn)).collect();
    distinct.dedup();
    assert_eq!(distinct.len(), 450);
}

proptest! {
    #[test]
    fn depth_never_exceeds_visual_limit(
        total in testutil::sheet_count_strategy(),
        current_frac in 0.0f64..=1.0,
        depth in 0.0f32..0.05,
    ) {
        let turn = TurnConfig::default();
        let current = (total as f64 * current_frac) as usize;
        for i in 0..total {
            let z = depth_offset(i, current, total, depth, &turn);
            prop_assert!(z <= turn.max_visual_depth);
            if i > current {
                prop_assert!(z <= 0.0);
            }
        }
    }
}
