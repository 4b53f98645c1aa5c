// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: shared intent state for one viewer session

use crate::types::Side;
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Lowest zoom factor; zoom is relative to the fitted base scale.
pub const MIN_ZOOM: f32 = 1.0;

/// State every control may write and every renderer may read.
///
/// Owned by the viewer and passed by reference to the gesture layer, the
/// book and the camera rig. Setters clamp instead of failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookViewState {
    requested_page: usize,
    animated_page: usize,
    sheet_count: usize,
    zoom: f32,
    max_zoom: f32,
    /// World-unit pan, re-clamped by the camera rig every frame
    pub pan: Vec2,
    side: Side,
    muted: bool,
}

impl BookViewState {
    /// Fresh state for a document with `sheet_count` sheets.
    pub fn new(sheet_count: usize, max_zoom: f32) -> Self {
        Self {
            requested_page: 0,
            animated_page: 0,
            sheet_count,
            zoom: MIN_ZOOM,
            max_zoom: max_zoom.max(MIN_ZOOM),
            pan: Vec2::ZERO,
            side: Side::Left,
            muted: false,
        }
    }

    /// Target page cursor.
    pub fn requested_page(&self) -> usize {
        self.requested_page
    }

    /// Request a page; clamps to `[0, sheet_count]`. Returns the stored value.
    pub fn set_requested_page(&mut self, page: usize) -> usize {
        self.requested_page = page.min(self.sheet_count);
        self.requested_page
    }

    /// Request a page from a signed value, clamping negatives to 0.
    pub fn set_requested_page_signed(&mut self, page: i64) -> usize {
        self.set_requested_page(page.max(0) as usize)
    }

    /// Page cursor the sheets currently render against.
    pub fn animated_page(&self) -> usize {
        self.animated_page
    }

    pub(crate) fn set_animated_page(&mut self, page: usize) {
        self.animated_page = page.min(self.sheet_count);
    }

    /// Number of sheets in the loaded document.
    pub fn sheet_count(&self) -> usize {
        self.sheet_count
    }

    /// Reset for a new document, keeping zoom and mute preferences.
    pub fn reset_document(&mut self, sheet_count: usize) {
        self.sheet_count = sheet_count;
        self.requested_page = 0;
        self.animated_page = 0;
        self.side = Side::Left;
        self.pan = Vec2::ZERO;
    }

    /// Current zoom factor in `[1, max_zoom]`.
    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    /// Upper zoom bound.
    pub fn max_zoom(&self) -> f32 {
        self.max_zoom
    }

    /// Set zoom, clamped to `[1, max_zoom]`. NaN resets to 1.
    ///
    /// Callers holding a viewport must re-clamp `pan` afterwards.
    pub fn set_zoom(&mut self, zoom: f32) -> f32 {
        self.zoom = if zoom.is_nan() {
            MIN_ZOOM
        } else {
            zoom.clamp(MIN_ZOOM, self.max_zoom)
        };
        self.zoom
    }

    /// Active half of the spread in single-page mode.
    pub fn side(&self) -> Side {
        self.side
    }

    /// Set the active side.
    pub fn set_side(&mut self, side: Side) {
        self.side = side;
    }

    /// Whether the page-turn sound is suppressed.
    pub fn muted(&self) -> bool {
        self.muted
    }

    /// Set the mute flag.
    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    /// `true` when the book is showing its front cover.
    pub fn book_closed(&self) -> bool {
        self.animated_page == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requested_page_is_clamped() {
        let mut s = BookViewState::new(4, 3.0);
        assert_eq!(s.set_requested_page(9), 4);
        assert_eq!(s.set_requested_page_signed(-3), 0);
        assert_eq!(s.set_requested_page(2), 2);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut s = BookViewState::new(4, 3.0);
        assert_eq!(s.set_zoom(7.0), 3.0);
        assert_eq!(s.set_zoom(0.2), 1.0);
        assert_eq!(s.set_zoom(f32::NAN), 1.0);
    }

    #[test]
    fn reset_keeps_preferences() {
        let mut s = BookViewState::new(4, 3.0);
        s.set_zoom(2.0);
        s.set_muted(true);
        s.set_requested_page(3);
        s.set_animated_page(3);
        s.reset_document(10);
        assert_eq!(s.requested_page(), 0);
        assert_eq!(s.animated_page(), 0);
        assert_eq!(s.zoom(), 2.0);
        assert!(s.muted());
        assert_eq!(s.sheet_count(), 10);
    }
}
