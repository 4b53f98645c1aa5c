// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: viewer configuration and JSON loader

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::io::Read;

/// Physical dimensions of one sheet in world units.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PageConfig {
    /// Width of a single page
    pub width: f32,
    /// Height of a single page
    pub height: f32,
    /// Thickness of one sheet
    pub depth: f32,
    /// Number of bending segments along the width
    pub segments: u32,
    /// Subdivisions along the height
    pub height_segments: u32,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            width: 1.28,
            height: 1.71,
            depth: 0.003,
            segments: 30,
            height_segments: 2,
        }
    }
}

impl PageConfig {
    /// Width of one bending segment.
    pub fn segment_width(&self) -> f32 {
        self.width / self.segments as f32
    }

    /// Bones in a sheet's chain (one more than segments).
    pub fn bone_count(&self) -> usize {
        self.segments as usize + 1
    }
}

/// Page-turn curve shaping.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TurnConfig {
    /// Length of the turning envelope in milliseconds
    pub duration_ms: f64,
    /// Minimum time before an in-flight turn may restart
    pub restart_guard_ms: f64,
    /// Envelope value above which the turn counts as no longer in flight
    pub settle_threshold: f32,
    /// Envelope value below which a sheet is held rigid
    pub rest_threshold: f32,
    /// Smoothing time constant for the turn (y) axis
    pub turn_tau: f32,
    /// Smoothing time constant for the fold (x) axis
    pub fold_tau: f32,
    /// Spine-side bend strength
    pub inside_strength: f32,
    /// Leading-edge bend strength
    pub outside_strength: f32,
    /// Travelling-wave strength
    pub turning_strength: f32,
    /// Bones below this index get the inside curve, the rest the outside curve
    pub inside_bones: usize,
    /// Bones above this index receive the fold
    pub fold_start_bone: usize,
    /// Stagger spread across the whole book, in degrees
    pub stagger_budget_deg: f32,
    /// Upper bound on per-sheet stagger, in degrees
    pub stagger_cap_deg: f32,
    /// Fold spread across the whole book, in degrees
    pub fold_budget_deg: f32,
    /// Upper bound on the fold angle, in degrees
    pub fold_cap_deg: f32,
    /// Bound on any sheet's z offset
    pub max_visual_depth: f32,
    /// Smallest depth compression applied to far sheets
    pub compression_floor: f32,
    /// Fraction of the book used as the compression window
    pub compression_window: f32,
    /// Smallest compression window, in sheets
    pub compression_window_min: f32,
}

impl Default for TurnConfig {
    fn default() -> Self {
        Self {
            duration_ms: 400.0,
            restart_guard_ms: 200.0,
            settle_threshold: 0.98,
            rest_threshold: 0.1,
            turn_tau: 0.5,
            fold_tau: 0.3,
            inside_strength: 0.04,
            outside_strength: 0.01,
            turning_strength: 0.025,
            inside_bones: 8,
            fold_start_bone: 8,
            stagger_budget_deg: 20.0,
            stagger_cap_deg: 0.8,
            fold_budget_deg: 10.0,
            fold_cap_deg: 2.0,
            max_visual_depth: 0.15,
            compression_floor: 0.1,
            compression_window: 0.1,
            compression_window_min: 10.0,
        }
    }
}

/// Page-cursor stepping cadence.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CursorConfig {
    /// Step interval while far from the target
    pub fast_step_ms: f64,
    /// Step interval near the target
    pub slow_step_ms: f64,
    /// Distance (pages) above which the fast interval is used
    pub fast_threshold: usize,
}

impl Default for CursorConfig {
    fn default() -> Self {
        Self {
            fast_step_ms: 50.0,
            slow_step_ms: 150.0,
            fast_threshold: 2,
        }
    }
}

/// Viewport fitting and camera smoothing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CameraConfig {
    /// Css widths at or below this are treated as mobile
    pub mobile_breakpoint: f32,
    /// Fraction of the viewport (w, h) the book may use on mobile
    pub mobile_margin: [f32; 2],
    /// Fraction of the viewport (w, h) the book may use on desktop
    pub desktop_margin: [f32; 2],
    /// Lower bound on the base scale
    pub min_scale: f32,
    /// Upper bound on the base scale
    pub max_scale: f32,
    /// Comfort factor applied on mobile
    pub mobile_comfort: f32,
    /// Comfort factor applied on desktop
    pub desktop_comfort: f32,
    /// Smoothing time constant for scale and position
    pub damping_tau: f32,
    /// Pan slack as a fraction of the render scale
    pub pan_margin: f32,
    /// Extra reach as a fraction of the viewport width when zoomed
    pub edge_reach_viewport: f32,
    /// Extra reach as a fraction of one scaled page width when zoomed
    pub edge_reach_page: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            mobile_breakpoint: 768.0,
            mobile_margin: [0.86, 0.76],
            desktop_margin: [0.92, 0.82],
            min_scale: 0.35,
            max_scale: 2.0,
            mobile_comfort: 0.9,
            desktop_comfort: 1.05,
            damping_tau: 0.35,
            pan_margin: 0.02,
            edge_reach_viewport: 0.35,
            edge_reach_page: 0.6,
        }
    }
}

/// Zoom stepping and the click-disable threshold.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ZoomConfig {
    /// Increment per zoom button press
    pub step: f32,
    /// Upper zoom bound (lower bound is always 1)
    pub max: f32,
    /// Zoom reached by a double click from 1x
    pub double_click: f32,
    /// Zoom steps after which clicks turn into pans on mobile
    pub click_disable_steps_mobile: u32,
    /// Zoom steps after which clicks turn into pans on desktop
    pub click_disable_steps_desktop: u32,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            step: 0.15,
            max: 3.0,
            double_click: 2.0,
            click_disable_steps_mobile: 3,
            click_disable_steps_desktop: 2,
        }
    }
}

/// Gesture timing.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    /// Two taps closer than this form a double click
    pub double_click_ms: f64,
    /// Minimum interval between accepted page turns
    pub turn_debounce_ms: f64,
    /// Pointer travel (css px) beyond which a press is no longer a tap
    pub click_slop_px: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            double_click_ms: 300.0,
            turn_debounce_ms: 300.0,
            click_slop_px: 6.0,
        }
    }
}

/// Upper bound on mesh subdivisions in either direction.
pub const MAX_SEGMENTS: u32 = 256;

/// Root configuration for a viewer session.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ViewerConfig {
    /// Sheet dimensions
    pub page: PageConfig,
    /// Turn animation
    pub turn: TurnConfig,
    /// Cursor stepping
    pub cursor: CursorConfig,
    /// Camera rig
    pub camera: CameraConfig,
    /// Zoom controls
    pub zoom: ZoomConfig,
    /// Gesture timing
    pub input: InputConfig,
}

impl ViewerConfig {
    /// Clamp values that would break the engine's invariants.
    pub fn validate(mut self) -> Self {
        self.page.segments = self.page.segments.clamp(1, MAX_SEGMENTS);
        self.page.height_segments = self.page.height_segments.clamp(1, MAX_SEGMENTS);
        self.page.width = self.page.width.max(f32::EPSILON);
        self.page.height = self.page.height.max(f32::EPSILON);
        self.page.depth = self.page.depth.max(0.0);
        self.turn.duration_ms = self.turn.duration_ms.max(1.0);
        self.turn.turn_tau = self.turn.turn_tau.max(f32::EPSILON);
        self.turn.fold_tau = self.turn.fold_tau.max(f32::EPSILON);
        self.turn.max_visual_depth = self.turn.max_visual_depth.abs();
        self.cursor.fast_step_ms = self.cursor.fast_step_ms.max(0.0);
        self.cursor.slow_step_ms = self.cursor.slow_step_ms.max(0.0);
        self.camera.min_scale = self.camera.min_scale.max(f32::EPSILON);
        self.camera.max_scale = self.camera.max_scale.max(self.camera.min_scale);
        self.camera.damping_tau = self.camera.damping_tau.max(f32::EPSILON);
        self.zoom.max = self.zoom.max.max(1.0);
        self.zoom.step = self.zoom.step.abs();
        self.zoom.double_click = self.zoom.double_click.clamp(1.0, self.zoom.max);
        self
    }
}

/// Load a config from a reader containing JSON. Missing fields take defaults.
pub fn from_reader<R: Read>(mut reader: R) -> Result<ViewerConfig> {
    let mut s = String::new();
    reader.read_to_string(&mut s)?;
    let config: ViewerConfig = serde_json::from_str(&s)?;
    Ok(config.validate())
}

/// Load a config directly from a byte slice containing JSON.
pub fn from_slice(data: &[u8]) -> Result<ViewerConfig> {
    let cursor = std::io::Cursor::new(data);
    from_reader(cursor)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_yields_defaults() {
        let config = from_slice(b"{}").unwrap();
        assert_eq!(config, ViewerConfig::default());
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = from_slice(br#"{"zoom": {"max": 4.0}, "page": {"segments": 12}}"#).unwrap();
        assert_eq!(config.zoom.max, 4.0);
        assert_eq!(config.zoom.step, 0.15);
        assert_eq!(config.page.segments, 12);
        assert_eq!(config.page.width, 1.28);
    }

    #[test]
    fn validate_repairs_degenerate_values() {
        let config = from_slice(br#"{"page": {"segments": 0}, "zoom": {"max": 0.5}}"#).unwrap();
        assert_eq!(config.page.segments, 1);
        assert_eq!(config.zoom.max, 1.0);
        assert_eq!(config.zoom.double_click, 1.0);

        let config = from_slice(br#"{"page": {"segments": 100000}}"#).unwrap();
        assert_eq!(config.page.segments, MAX_SEGMENTS);
    }

    #[test]
    fn malformed_json_is_an_error() {
        assert!(from_slice(b"{ not json").is_err());
    }

    #[test]
    fn segment_width_divides_page() {
        let page = PageConfig::default();
        assert!((page.segment_width() * 30.0 - page.width).abs() < 1e-6);
        assert_eq!(page.bone_count(), 31);
    }
}
