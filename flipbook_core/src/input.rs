// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: pointer gestures over the book
//!
//! Below the click-disable zoom a press and release on a sheet is a tap.
//! Taps are held for one double-click window so a second tap can turn into
//! a zoom toggle instead of two page turns. Above the threshold a press
//! starts a drag that pans the book until the pointer is released or
//! cancelled. Two touch pointers pinch-zoom at any level.

use crate::book::Book;
use crate::camera::CameraRig;
use crate::config::InputConfig;
use crate::error::{FlipbookError, Result};
use crate::state::BookViewState;
use crate::types::CursorStyle;
use glam::Vec2;
use std::collections::BTreeMap;

/// Device that produced a pointer event.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PointerKind {
    /// Mouse or trackpad
    #[default]
    Mouse,
    /// Finger
    Touch,
    /// Stylus
    Pen,
    /// Anything else
    Unknown,
}

impl PointerKind {
    /// Map a DOM `pointerType` string.
    pub fn from_pointer_type(value: &str) -> Self {
        match value {
            "mouse" => PointerKind::Mouse,
            "touch" => PointerKind::Touch,
            "pen" => PointerKind::Pen,
            _ => PointerKind::Unknown,
        }
    }
}

/// Host pointer identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PointerId(pub i32);

/// Phase of a pointer event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PointerEventKind {
    /// Button pressed or finger down
    Down,
    /// Position changed
    Move,
    /// Button released or finger lifted
    Up,
    /// Platform took the pointer away
    Cancel,
    /// Pointer left the render surface
    Leave,
}

/// One pointer event in css pixels relative to the render surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointerEvent {
    /// Phase
    pub kind: PointerEventKind,
    /// Pointer identity
    pub id: PointerId,
    /// Device
    pub pointer: PointerKind,
    /// Css-pixel position
    pub position: Vec2,
    /// Event timestamp in milliseconds
    pub time_ms: f64,
    /// Sheet under the pointer, as picked by the host
    pub hit: Option<usize>,
}

impl PointerEvent {
    /// Mouse event helper.
    pub fn mouse(kind: PointerEventKind, position: Vec2, time_ms: f64, hit: Option<usize>) -> Self {
        Self {
            kind,
            id: PointerId(1),
            pointer: PointerKind::Mouse,
            position,
            time_ms,
            hit,
        }
    }
}

/// What a gesture asks the viewer to do.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gesture {
    /// Request `page` after a tap on `sheet`
    Turn {
        /// Tapped sheet
        sheet: usize,
        /// Page to request
        page: usize,
    },
    /// Flip between 1x and the double-click zoom
    ToggleZoom,
    /// Pinch set an absolute zoom
    Zoom(f32),
}

/// Pointer capture on the render surface.
pub trait PointerCapture {
    /// Route all events for `id` to the surface.
    fn set_pointer_capture(&mut self, id: PointerId) -> Result<()>;
    /// Stop routing events for `id`.
    fn release_pointer_capture(&mut self, id: PointerId) -> Result<()>;
}

/// Capture for hosts without the capability.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCapture;

impl PointerCapture for NoCapture {
    fn set_pointer_capture(&mut self, _id: PointerId) -> Result<()> {
        Err(FlipbookError::Unsupported("pointer capture"))
    }

    fn release_pointer_capture(&mut self, _id: PointerId) -> Result<()> {
        Err(FlipbookError::Unsupported("pointer capture"))
    }
}

/// Press that stays a tap until it travels past the slop radius.
#[derive(Clone, Copy, Debug)]
pub struct ClickGesture {
    start: Vec2,
    sheet: Option<usize>,
    max_slop: f32,
    moved: bool,
    active: bool,
}

impl ClickGesture {
    /// Inactive gesture with the given slop in css pixels.
    pub fn new_with_slop(max_slop: f32) -> Self {
        Self {
            start: Vec2::ZERO,
            sheet: None,
            max_slop,
            moved: false,
            active: false,
        }
    }

    /// Start tracking a press.
    pub fn arm(&mut self, position: Vec2, sheet: Option<usize>) {
        self.start = position;
        self.sheet = sheet;
        self.moved = false;
        self.active = true;
    }

    /// Feed a pointer position.
    pub fn update(&mut self, position: Vec2) {
        if !self.active || self.moved {
            return;
        }
        if position.distance_squared(self.start) > self.max_slop * self.max_slop {
            self.moved = true;
        }
    }

    /// Sheet tapped if the press is still a tap and ends on the same sheet.
    pub fn tapped_sheet(&self, release_hit: Option<usize>) -> Option<usize> {
        if !self.active || self.moved {
            return None;
        }
        match (self.sheet, release_hit) {
            (Some(a), Some(b)) if a == b => Some(a),
            _ => None,
        }
    }

    /// Forget the press.
    pub fn clear(&mut self) {
        self.active = false;
        self.moved = false;
        self.sheet = None;
    }
}

#[derive(Clone, Copy, Debug)]
struct PendingTap {
    sheet: usize,
    at: f64,
    turn: bool,
}

/// Splits taps into single taps (page turns) and double taps (zoom).
#[derive(Clone, Debug)]
pub struct TapDisambiguator {
    window_ms: f64,
    debounce_ms: f64,
    pending: Option<PendingTap>,
    last_turn_at: Option<f64>,
}

impl TapDisambiguator {
    /// Disambiguator with the given double-click window and turn debounce.
    pub fn new(window_ms: f64, debounce_ms: f64) -> Self {
        Self {
            window_ms,
            debounce_ms,
            pending: None,
            last_turn_at: None,
        }
    }

    /// Register a tap. A tap inside the window of a pending one yields
    /// [`Gesture::ToggleZoom`] and swallows both.
    pub fn tap(&mut self, sheet: usize, now_ms: f64, click_enabled: bool) -> Option<Gesture> {
        if let Some(prev) = self.pending.take() {
            if now_ms - prev.at <= self.window_ms {
                log::debug!("double tap on sheet {sheet}, toggling zoom");
                return Some(Gesture::ToggleZoom);
            }
        }
        self.pending = Some(PendingTap {
            sheet,
            at: now_ms,
            turn: click_enabled,
        });
        None
    }

    /// `true` while a tap waits for its window to close.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Resolve an expired pending tap into a turn.
    pub fn poll(&mut self, now_ms: f64, book: &Book) -> Option<Gesture> {
        let tap = self.pending?;
        if now_ms - tap.at <= self.window_ms {
            return None;
        }
        self.pending = None;
        if !tap.turn {
            return None;
        }
        let sheet = book.sheets().get(tap.sheet)?;
        if sheet.is_turning() {
            log::debug!("tap on sheet {} ignored, already turning", tap.sheet);
            return None;
        }
        if let Some(last) = self.last_turn_at {
            if now_ms - last < self.debounce_ms {
                log::debug!("tap on sheet {} debounced", tap.sheet);
                return None;
            }
        }
        self.last_turn_at = Some(now_ms);
        log::debug!("tap on sheet {} accepted", tap.sheet);
        Some(Gesture::Turn {
            sheet: tap.sheet,
            page: sheet.click_target_page(),
        })
    }

    /// Drop any pending tap.
    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

/// Per-session drag state.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum DragState {
    /// No drag
    #[default]
    Idle,
    /// Panning with `id`
    Dragging {
        /// Captured pointer
        id: PointerId,
        /// Css position at press
        start: Vec2,
        /// Pan at press
        pan_start: Vec2,
    },
}

#[derive(Clone, Copy, Debug)]
struct Pinch {
    start_distance: f32,
    start_zoom: f32,
}

/// Turns raw pointer events into gestures, pan updates and cursor state.
#[derive(Clone, Debug)]
pub struct GestureLayer {
    cfg: InputConfig,
    drag: DragState,
    click: ClickGesture,
    taps: TapDisambiguator,
    touches: BTreeMap<PointerId, Vec2>,
    pinch: Option<Pinch>,
    hovered: Option<usize>,
}

impl GestureLayer {
    /// Idle layer.
    pub fn new(cfg: InputConfig) -> Self {
        Self {
            click: ClickGesture::new_with_slop(cfg.click_slop_px),
            taps: TapDisambiguator::new(cfg.double_click_ms, cfg.turn_debounce_ms),
            cfg,
            drag: DragState::Idle,
            touches: BTreeMap::new(),
            pinch: None,
            hovered: None,
        }
    }

    /// Current drag state.
    pub fn drag(&self) -> DragState {
        self.drag
    }

    /// Sheet under a hovering pointer.
    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    /// Cursor to show for the current interaction.
    pub fn cursor(&self, click_enabled: bool) -> CursorStyle {
        match self.drag {
            DragState::Dragging { .. } => CursorStyle::Grabbing,
            DragState::Idle if click_enabled && self.hovered.is_some() => CursorStyle::Pointer,
            DragState::Idle => CursorStyle::Auto,
        }
    }

    /// Timing the layer was built with.
    pub fn config(&self) -> &InputConfig {
        &self.cfg
    }

    /// Handle one pointer event. Pan is written straight into `state`, clamped
    /// to the rig bounds.
    pub fn handle(
        &mut self,
        event: &PointerEvent,
        state: &mut BookViewState,
        rig: &CameraRig,
        capture: &mut dyn PointerCapture,
    ) -> Option<Gesture> {
        let click_enabled = rig.click_enabled(state.zoom());
        if event.pointer == PointerKind::Touch {
            if let Some(gesture) = self.track_touch(event, state, capture) {
                return Some(gesture);
            }
            if self.pinch.is_some() {
                return None;
            }
        }

        match event.kind {
            PointerEventKind::Down => {
                self.click.arm(event.position, event.hit);
                if !click_enabled {
                    self.start_drag(event, state, capture);
                }
                None
            }
            PointerEventKind::Move => {
                self.hovered = if click_enabled { event.hit } else { None };
                self.click.update(event.position);
                if let DragState::Dragging { id, start, pan_start } = self.drag {
                    if id == event.id && !click_enabled {
                        let delta = rig.screen_delta_to_pan(event.position - start, state.zoom());
                        state.pan = rig.bounds(state.zoom()).clamp(pan_start + delta);
                    }
                }
                None
            }
            PointerEventKind::Up => {
                self.end_drag(event.id, capture);
                let tapped = self.click.tapped_sheet(event.hit);
                self.click.clear();
                tapped.and_then(|sheet| self.taps.tap(sheet, event.time_ms, click_enabled))
            }
            PointerEventKind::Cancel => {
                self.end_drag(event.id, capture);
                self.click.clear();
                None
            }
            PointerEventKind::Leave => {
                self.hovered = None;
                None
            }
        }
    }

    /// Resolve timed gestures. Call once per frame.
    pub fn poll(&mut self, now_ms: f64, book: &Book) -> Option<Gesture> {
        self.taps.poll(now_ms, book)
    }

    /// Forget every in-flight gesture, e.g. on document reload.
    pub fn reset(&mut self, capture: &mut dyn PointerCapture) {
        if let DragState::Dragging { id, .. } = self.drag {
            self.end_drag(id, capture);
        }
        self.click.clear();
        self.taps.cancel();
        self.touches.clear();
        self.pinch = None;
        self.hovered = None;
    }

    fn start_drag(&mut self, event: &PointerEvent, state: &BookViewState, capture: &mut dyn PointerCapture) {
        self.drag = DragState::Dragging {
            id: event.id,
            start: event.position,
            pan_start: state.pan,
        };
        if let Err(err) = capture.set_pointer_capture(event.id) {
            log::warn!("pointer capture unavailable, dragging without it: {err}");
        }
        log::debug!("drag started with pointer {:?}", event.id);
    }

    fn end_drag(&mut self, id: PointerId, capture: &mut dyn PointerCapture) {
        let DragState::Dragging { id: active, .. } = self.drag else {
            return;
        };
        if active != id {
            return;
        }
        self.drag = DragState::Idle;
        if let Err(err) = capture.release_pointer_capture(id) {
            log::debug!("pointer capture release failed: {err}");
        }
        log::debug!("drag ended with pointer {id:?}");
    }

    fn track_touch(
        &mut self,
        event: &PointerEvent,
        state: &BookViewState,
        capture: &mut dyn PointerCapture,
    ) -> Option<Gesture> {
        match event.kind {
            PointerEventKind::Down => {
                self.touches.insert(event.id, event.position);
                if self.touches.len() == 2 {
                    let distance = self.touch_distance();
                    if distance > 0.0 {
                        self.pinch = Some(Pinch {
                            start_distance: distance,
                            start_zoom: state.zoom(),
                        });
                        // a pinch takes over from a drag by the first finger
                        if let DragState::Dragging { id, .. } = self.drag {
                            self.end_drag(id, capture);
                        }
                        self.click.clear();
                        self.taps.cancel();
                        log::debug!("pinch started at zoom {}", state.zoom());
                    }
                }
                None
            }
            PointerEventKind::Move => {
                if let Some(p) = self.touches.get_mut(&event.id) {
                    *p = event.position;
                }
                let pinch = self.pinch?;
                let distance = self.touch_distance();
                if distance <= 0.0 {
                    return None;
                }
                Some(Gesture::Zoom(pinch.start_zoom * distance / pinch.start_distance))
            }
            PointerEventKind::Up | PointerEventKind::Cancel | PointerEventKind::Leave => {
                self.touches.remove(&event.id);
                if self.pinch.is_some() && self.touches.len() < 2 {
                    self.pinch = None;
                    self.click.clear();
                    log::debug!("pinch ended");
                    // swallow the release that ended the pinch
                    return None;
                }
                None
            }
        }
    }

    fn touch_distance(&self) -> f32 {
        let mut points = self.touches.values();
        match (points.next(), points.next()) {
            (Some(a), Some(b)) => a.distance(*b),
            _ => 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CameraConfig, CursorConfig, PageConfig, TurnConfig, ZoomConfig};
    use crate::texture::PageImage;
    use crate::types::Viewport;

    struct Recording(Vec<&'static str>);

    impl PointerCapture for Recording {
        fn set_pointer_capture(&mut self, _id: PointerId) -> Result<()> {
            self.0.push("set");
            Ok(())
        }

        fn release_pointer_capture(&mut self, _id: PointerId) -> Result<()> {
            self.0.push("release");
            Ok(())
        }
    }

    fn fixture() -> (GestureLayer, BookViewState, CameraRig, Book) {
        let pages: Vec<_> = (0..8).map(|i| PageImage::new(format!("p{i}"))).collect();
        let book = Book::new(
            &pages,
            PageConfig::default(),
            TurnConfig::default(),
            CursorConfig::default(),
        );
        let rig = CameraRig::new(
            CameraConfig::default(),
            ZoomConfig::default(),
            PageConfig::default(),
            Viewport::default(),
        );
        let state = BookViewState::new(book.sheet_count(), 3.0);
        (GestureLayer::new(InputConfig::default()), state, rig, book)
    }

    fn tap(layer: &mut GestureLayer, state: &mut BookViewState, rig: &CameraRig, at: f64) -> Option<Gesture> {
        let pos = Vec2::new(400.0, 300.0);
        let mut cap = NoCapture;
        layer.handle(
            &PointerEvent::mouse(PointerEventKind::Down, pos, at, Some(0)),
            state,
            rig,
            &mut cap,
        );
        layer.handle(
            &PointerEvent::mouse(PointerEventKind::Up, pos, at + 40.0, Some(0)),
            state,
            rig,
            &mut cap,
        )
    }

    #[test]
    fn single_tap_turns_after_window() {
        let (mut layer, mut state, rig, book) = fixture();
        assert_eq!(tap(&mut layer, &mut state, &rig, 0.0), None);
        assert_eq!(layer.poll(200.0, &book), None);
        assert_eq!(layer.poll(400.0, &book), Some(Gesture::Turn { sheet: 0, page: 1 }));
        assert_eq!(layer.poll(800.0, &book), None);
    }

    #[test]
    fn double_tap_toggles_zoom_once() {
        let (mut layer, mut state, rig, book) = fixture();
        assert_eq!(tap(&mut layer, &mut state, &rig, 0.0), None);
        assert_eq!(tap(&mut layer, &mut state, &rig, 150.0), Some(Gesture::ToggleZoom));
        assert_eq!(layer.poll(1000.0, &book), None);
    }

    #[test]
    fn turns_are_debounced() {
        let (_, _, _, book) = fixture();
        let mut taps = TapDisambiguator::new(10.0, 300.0);
        taps.tap(2, 0.0, true);
        assert!(taps.poll(11.0, &book).is_some());
        taps.tap(2, 100.0, true);
        assert_eq!(taps.poll(111.0, &book), None);
        taps.tap(2, 400.0, true);
        assert_eq!(taps.poll(411.0, &book), Some(Gesture::Turn { sheet: 2, page: 3 }));
    }

    #[test]
    fn taps_while_zoomed_never_turn() {
        let (_, _, _, book) = fixture();
        let mut taps = TapDisambiguator::new(300.0, 300.0);
        assert_eq!(taps.tap(0, 0.0, false), None);
        assert_eq!(taps.poll(500.0, &book), None);
    }

    #[test]
    fn slop_turns_tap_into_nothing() {
        let (mut layer, mut state, rig, _) = fixture();
        let mut cap = NoCapture;
        layer.handle(
            &PointerEvent::mouse(PointerEventKind::Down, Vec2::ZERO, 0.0, Some(0)),
            &mut state,
            &rig,
            &mut cap,
        );
        layer.handle(
            &PointerEvent::mouse(PointerEventKind::Move, Vec2::new(20.0, 0.0), 10.0, Some(0)),
            &mut state,
            &rig,
            &mut cap,
        );
        let out = layer.handle(
            &PointerEvent::mouse(PointerEventKind::Up, Vec2::new(20.0, 0.0), 20.0, Some(0)),
            &mut state,
            &rig,
            &mut cap,
        );
        assert_eq!(out, None);
        assert!(!layer.taps.has_pending());
    }

    #[test]
    fn zoomed_press_drags_and_captures() {
        let (mut layer, mut state, rig, _) = fixture();
        state.set_zoom(3.0);
        let mut cap = Recording(Vec::new());
        layer.handle(
            &PointerEvent::mouse(PointerEventKind::Down, Vec2::ZERO, 0.0, Some(0)),
            &mut state,
            &rig,
            &mut cap,
        );
        assert!(matches!(layer.drag(), DragState::Dragging { .. }));
        assert_eq!(layer.cursor(false), CursorStyle::Grabbing);
        layer.handle(
            &PointerEvent::mouse(PointerEventKind::Move, Vec2::new(-50.0, 0.0), 10.0, Some(0)),
            &mut state,
            &rig,
            &mut cap,
        );
        assert!(state.pan.x < 0.0);
        layer.handle(
            &PointerEvent::mouse(PointerEventKind::Cancel, Vec2::new(-50.0, 0.0), 20.0, None),
            &mut state,
            &rig,
            &mut cap,
        );
        assert_eq!(layer.drag(), DragState::Idle);
        assert_eq!(cap.0, vec!["set", "release"]);
    }

    #[test]
    fn pinch_reports_absolute_zoom() {
        let (mut layer, mut state, rig, _) = fixture();
        let mut cap = NoCapture;
        let touch = |kind, id, x: f32| PointerEvent {
            kind,
            id: PointerId(id),
            pointer: PointerKind::Touch,
            position: Vec2::new(x, 0.0),
            time_ms: 0.0,
            hit: None,
        };
        layer.handle(&touch(PointerEventKind::Down, 1, 0.0), &mut state, &rig, &mut cap);
        layer.handle(&touch(PointerEventKind::Down, 2, 100.0), &mut state, &rig, &mut cap);
        let out = layer.handle(&touch(PointerEventKind::Move, 2, 200.0), &mut state, &rig, &mut cap);
        assert_eq!(out, Some(Gesture::Zoom(2.0)));
        layer.handle(&touch(PointerEventKind::Up, 2, 200.0), &mut state, &rig, &mut cap);
        let out = layer.handle(&touch(PointerEventKind::Up, 1, 0.0), &mut state, &rig, &mut cap);
        assert_eq!(out, None);
    }

    #[test]
    fn pinch_during_drag_releases_capture() {
        let (mut layer, mut state, rig, _) = fixture();
        state.set_zoom(2.0);
        let mut cap = Recording(Vec::new());
        let touch = |kind, id, x: f32| PointerEvent {
            kind,
            id: PointerId(id),
            pointer: PointerKind::Touch,
            position: Vec2::new(x, 0.0),
            time_ms: 0.0,
            hit: Some(0),
        };
        layer.handle(&touch(PointerEventKind::Down, 1, 0.0), &mut state, &rig, &mut cap);
        assert!(matches!(layer.drag(), DragState::Dragging { .. }));
        layer.handle(&touch(PointerEventKind::Down, 2, 100.0), &mut state, &rig, &mut cap);
        assert_eq!(layer.drag(), DragState::Idle);
        assert_eq!(cap.0, vec!["set", "release"]);
        layer.handle(&touch(PointerEventKind::Up, 2, 100.0), &mut state, &rig, &mut cap);
        layer.handle(&touch(PointerEventKind::Up, 1, 0.0), &mut state, &rig, &mut cap);
        assert_eq!(cap.0, vec!["set", "release"]);
    }

    #[test]
    fn pointer_kind_from_dom() {
        assert_eq!(PointerKind::from_pointer_type("touch"), PointerKind::Touch);
        assert_eq!(PointerKind::from_pointer_type("gamepad"), PointerKind::Unknown);
    }
}
