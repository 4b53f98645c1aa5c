// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: single-sheet turn controller
//!
//! A sheet owns its bone chain and nothing else touches it. Every frame the
//! controller edge-detects the `opened` flag, evaluates the turning envelope,
//! derives a target angle per bone and damps the chain toward it.

use crate::config::{PageConfig, TurnConfig};
use crate::easing::{damp_angle, turning_envelope};
use crate::geometry::{pose, BoneRotation, Pose, INLINE_BONES};
use crate::texture::{PageImage, SheetSurfaces, TextureCache};
use crate::types::CursorStyle;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use std::f32::consts::{FRAC_PI_2, PI};

/// Bone rotations for one sheet, inline for the default chain length.
pub type BoneChain = SmallVec<[BoneRotation; INLINE_BONES]>;

/// Front and back images of one leaf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SheetImages {
    /// Image shown while the sheet lies on the right
    pub front: PageImage,
    /// Image shown once turned; placeholder when absent
    pub back: Option<PageImage>,
}

/// Per-frame inputs handed to a sheet by the book.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SheetFrame {
    /// `animated_page > index`
    pub opened: bool,
    /// `animated_page == 0`
    pub book_closed: bool,
    /// Animated page cursor
    pub current_page: usize,
    /// Sheets in the book
    pub total_sheets: usize,
    /// Frame timestamp in milliseconds
    pub now_ms: f64,
    /// Seconds since the previous frame
    pub delta: f32,
}

/// Serialisable view of a sheet after a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetSnapshot {
    /// Position in the stack
    pub index: usize,
    /// Opened flag used this frame
    pub opened: bool,
    /// Z offset along the sheet normal
    pub depth: f32,
    /// Turning envelope value
    pub turning_time: f32,
    /// Damped bone rotations
    pub bones: Vec<BoneRotation>,
}

/// Controller for one physical two-sided sheet.
#[derive(Debug, Clone)]
pub struct Sheet {
    index: usize,
    images: SheetImages,
    bones: BoneChain,
    targets: BoneChain,
    turn_started_at: Option<f64>,
    last_opened: bool,
    is_turning: bool,
    turning_time: f32,
    depth: f32,
    hovered: bool,
}

impl Sheet {
    /// Create a sheet already resting in the `opened` position.
    pub fn new(index: usize, images: SheetImages, bone_count: usize, opened: bool) -> Self {
        let mut bones: BoneChain = SmallVec::from_elem(BoneRotation::default(), bone_count.max(1));
        bones[0].turn = if opened { -FRAC_PI_2 } else { FRAC_PI_2 };
        Self {
            index,
            images,
            targets: bones.clone(),
            bones,
            turn_started_at: None,
            last_opened: opened,
            is_turning: false,
            turning_time: 0.0,
            depth: 0.0,
            hovered: false,
        }
    }

    /// Advance the sheet by one frame.
    pub fn update(&mut self, frame: &SheetFrame, turn: &TurnConfig, page: &PageConfig) {
        if frame.opened != self.last_opened {
            self.last_opened = frame.opened;
            let guard_passed = self
                .turn_started_at
                .map(|t| frame.now_ms - t > turn.restart_guard_ms)
                .unwrap_or(true);
            if !self.is_turning || guard_passed {
                self.turn_started_at = Some(frame.now_ms);
                self.is_turning = true;
            }
        }

        let elapsed = self
            .turn_started_at
            .map(|t| frame.now_ms - t)
            .unwrap_or(f64::INFINITY);
        self.turning_time = turning_envelope(elapsed, turn.duration_ms);
        if self.turning_time > turn.settle_threshold || elapsed >= turn.duration_ms {
            self.is_turning = false;
        }

        let target = target_rotation(frame.opened, frame.book_closed, self.index, frame.total_sheets, turn);
        bone_targets(
            &mut self.targets,
            target,
            self.turning_time,
            frame.book_closed,
            frame.total_sheets,
            turn,
        );

        for (bone, goal) in self.bones.iter_mut().zip(&self.targets) {
            bone.turn = damp_angle(bone.turn, goal.turn, turn.turn_tau, frame.delta);
            bone.fold = damp_angle(bone.fold, goal.fold, turn.fold_tau, frame.delta);
        }

        self.depth = depth_offset(self.index, frame.current_page, frame.total_sheets, page.depth, turn);
    }

    /// Page to request when this sheet is clicked.
    pub fn click_target_page(&self) -> usize {
        if self.last_opened {
            self.index
        } else {
            self.index + 1
        }
    }

    /// Position in the stack.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Images on both sides.
    pub fn images(&self) -> &SheetImages {
        &self.images
    }

    /// Opened flag seen on the last frame.
    pub fn opened(&self) -> bool {
        self.last_opened
    }

    /// `true` while a turn is in flight.
    pub fn is_turning(&self) -> bool {
        self.is_turning
    }

    /// Turning envelope from the last frame.
    pub fn turning_time(&self) -> f32 {
        self.turning_time
    }

    /// Damped bone rotations.
    pub fn rotations(&self) -> &[BoneRotation] {
        &self.bones
    }

    /// Targets the bones were damped toward on the last frame.
    pub fn target_rotations(&self) -> &[BoneRotation] {
        &self.targets
    }

    /// Z offset from the last frame.
    pub fn depth(&self) -> f32 {
        self.depth
    }

    /// Pose the bone chain in sheet space.
    pub fn pose(&self, segment_width: f32) -> Pose {
        pose(&self.bones, segment_width, self.depth)
    }

    /// Resolve this sheet's faces from decoded textures.
    pub fn surfaces(&self, textures: &TextureCache) -> SheetSurfaces {
        SheetSurfaces::new(
            textures.get(Some(&self.images.front)).clone(),
            textures.get(self.images.back.as_ref()).clone(),
        )
    }

    /// Track hover and report the cursor to show.
    pub fn set_hovered(&mut self, hovered: bool, click_enabled: bool) -> CursorStyle {
        self.hovered = hovered && click_enabled;
        self.cursor(click_enabled)
    }

    /// Cursor affordance for this sheet.
    pub fn cursor(&self, click_enabled: bool) -> CursorStyle {
        if self.hovered && click_enabled {
            CursorStyle::Pointer
        } else {
            CursorStyle::Auto
        }
    }

    /// Serialisable copy of the current state.
    pub fn snapshot(&self) -> SheetSnapshot {
        SheetSnapshot {
            index: self.index,
            opened: self.last_opened,
            depth: self.depth,
            turning_time: self.turning_time,
            bones: self.bones.to_vec(),
        }
    }
}

/// Root angle for a sheet: a quarter turn either way plus the stack stagger.
pub fn target_rotation(
    opened: bool,
    book_closed: bool,
    index: usize,
    total_sheets: usize,
    turn: &TurnConfig,
) -> f32 {
    let mut target = if opened { -FRAC_PI_2 } else { FRAC_PI_2 };
    if !book_closed {
        target += index as f32 * stagger_increment(total_sheets, turn);
    }
    target
}

/// Per-sheet stagger in radians, shrinking for thick books.
pub fn stagger_increment(total_sheets: usize, turn: &TurnConfig) -> f32 {
    let spread = turn.stagger_budget_deg / total_sheets.max(1) as f32;
    spread.min(turn.stagger_cap_deg).to_radians()
}

/// Fold magnitude in radians, shrinking for thick books.
pub fn fold_angle(target: f32, total_sheets: usize, turn: &TurnConfig) -> f32 {
    let spread = turn.fold_budget_deg / total_sheets.max(1) as f32;
    target.signum() * spread.min(turn.fold_cap_deg).to_radians()
}

/// Fill `out` with the target rotation of every bone.
///
/// Closed books and settled sheets are rigid: bone 0 carries the whole turn
/// and every other bone is exactly zero.
pub fn bone_targets(
    out: &mut BoneChain,
    target: f32,
    turning_time: f32,
    book_closed: bool,
    total_sheets: usize,
    turn: &TurnConfig,
) {
    let count = out.len();
    let resting = turning_time < turn.rest_threshold;
    let rigid = book_closed || resting;
    let fold = if rigid {
        0.0
    } else {
        fold_angle(target, total_sheets, turn)
    };

    for (i, bone) in out.iter_mut().enumerate() {
        if rigid {
            bone.turn = if i == 0 { target } else { 0.0 };
            bone.fold = 0.0;
            continue;
        }
        let fi = i as f32;
        let wave = fi * PI / count as f32;
        let inside = if i < turn.inside_bones {
            (fi * 0.2 + 0.25).sin()
        } else {
            0.0
        };
        let outside = if i >= turn.inside_bones {
            (fi * 0.3 + 0.09).cos()
        } else {
            0.0
        };
        let turning = wave.sin() * turning_time;
        bone.turn = turn.inside_strength * inside * target - turn.outside_strength * outside * target
            + turn.turning_strength * turning * target;

        let fold_intensity = if i > turn.fold_start_bone {
            (wave - 0.5).sin() * turning_time
        } else {
            0.0
        };
        bone.fold = fold * fold_intensity;
    }
}

/// Z offset of a sheet, capped above by `max_visual_depth` and compressed
/// for sheets far from the cursor. Unopened sheets keep distinct, decreasing
/// offsets so the stack order follows `index`.
pub fn depth_offset(
    index: usize,
    current_page: usize,
    total_sheets: usize,
    page_depth: f32,
    turn: &TurnConfig,
) -> f32 {
    let raw = (current_page as f32 - index as f32) * page_depth;
    let bounded = raw.min(turn.max_visual_depth);
    let distance = (index as f32 - current_page as f32).abs();
    let window = (total_sheets as f32 * turn.compression_window).max(turn.compression_window_min);
    let compression = (1.0 - distance / window).max(turn.compression_floor);
    bounded * compression
}
