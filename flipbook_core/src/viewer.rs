// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: viewer session
//!
//! Owns the shared [`BookViewState`] and every component that reads or
//! writes it. A frame runs timed gestures, the page-turn sound, the book and
//! the camera rig in that order.

use crate::book::Book;
use crate::camera::CameraRig;
use crate::config::ViewerConfig;
use crate::controls::{
    self, AudioCue, FullscreenHost, Navigator, NoFullscreen, PageTurnSound, ShareLinks, SilentCue,
};
use crate::input::{Gesture, GestureLayer, NoCapture, PointerCapture, PointerEvent};
use crate::sheet::SheetSnapshot;
use crate::state::BookViewState;
use crate::texture::{PageImage, TextureCache, TextureLoader};
use crate::types::{CursorStyle, DeviceClass, Side, Viewport};
use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Everything a host needs to draw or inspect one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameSnapshot {
    /// Frame timestamp in milliseconds
    pub time_ms: f64,
    /// Target page cursor
    pub requested_page: usize,
    /// Page cursor the sheets render against
    pub animated_page: usize,
    /// Zoom factor
    pub zoom: f32,
    /// Clamped pan in world units
    pub pan: Vec2,
    /// Active side in single-page mode
    pub side: Side,
    /// Mute flag
    pub muted: bool,
    /// Layout class
    pub device: DeviceClass,
    /// Whether taps turn pages
    pub click_enabled: bool,
    /// Cursor the host should show
    pub cursor: CursorStyle,
    /// Damped render scale of the book group
    pub scale: f32,
    /// Damped translation of the book group
    pub position: Vec2,
    /// Per-sheet pose data
    pub sheets: Vec<SheetSnapshot>,
}

/// One viewing session over one document at a time.
pub struct Viewer {
    config: ViewerConfig,
    state: BookViewState,
    book: Book,
    rig: CameraRig,
    gestures: GestureLayer,
    navigator: Navigator,
    textures: TextureCache,
    sound: PageTurnSound,
    hovered: Option<usize>,
    audio: Box<dyn AudioCue>,
    capture: Box<dyn PointerCapture>,
    fullscreen: Box<dyn FullscreenHost>,
}

impl Viewer {
    /// Empty session fitted to `viewport`.
    pub fn new(config: ViewerConfig, viewport: Viewport) -> Self {
        let config = config.validate();
        let book = Book::new(
            &[],
            config.page.clone(),
            config.turn.clone(),
            config.cursor.clone(),
        );
        let rig = CameraRig::new(
            config.camera.clone(),
            config.zoom.clone(),
            config.page.clone(),
            viewport,
        );
        Self {
            state: BookViewState::new(0, config.zoom.max),
            gestures: GestureLayer::new(config.input.clone()),
            navigator: Navigator::new(config.input.turn_debounce_ms),
            textures: TextureCache::default(),
            sound: PageTurnSound::default(),
            hovered: None,
            audio: Box::new(SilentCue),
            capture: Box::new(NoCapture),
            fullscreen: Box::new(NoFullscreen),
            book,
            rig,
            config,
        }
    }

    /// Route the page-turn sound to `audio`.
    pub fn with_audio(mut self, audio: Box<dyn AudioCue>) -> Self {
        self.audio = audio;
        self
    }

    /// Use `capture` for drag pointer capture.
    pub fn with_capture(mut self, capture: Box<dyn PointerCapture>) -> Self {
        self.capture = capture;
        self
    }

    /// Use `host` for the fullscreen toggle.
    pub fn with_fullscreen(mut self, host: Box<dyn FullscreenHost>) -> Self {
        self.fullscreen = host;
        self
    }

    /// Decode page images and rebuild the sheet stack. Pending cursor steps
    /// and gestures from the previous document are dropped.
    pub fn load_document(&mut self, pages: &[PageImage], loader: &dyn TextureLoader) {
        self.textures = TextureCache::decode_all(pages, loader);
        self.book.load(pages);
        self.state.reset_document(self.book.sheet_count());
        self.gestures.reset(self.capture.as_mut());
        self.sound.reset();
        self.hovered = None;
        log::info!(
            "document loaded: {} pages, {} sheets, {} textures",
            pages.len(),
            self.book.sheet_count(),
            self.textures.len()
        );
    }

    /// Refit to a new viewport.
    pub fn resize(&mut self, viewport: Viewport) {
        self.rig.resize(viewport);
        self.rig.clamp_pan(&mut self.state);
    }

    /// Feed one pointer event.
    pub fn pointer(&mut self, event: &PointerEvent) -> Option<Gesture> {
        let gesture = self
            .gestures
            .handle(event, &mut self.state, &self.rig, self.capture.as_mut());
        if let Some(g) = gesture {
            self.apply(g);
        }
        self.sync_hover();
        gesture
    }

    /// Advance the session by one frame.
    pub fn frame(&mut self, now_ms: f64, delta: f32) -> FrameSnapshot {
        if let Some(g) = self.gestures.poll(now_ms, &self.book) {
            self.apply(g);
        }
        self.sound
            .observe(self.state.requested_page(), self.state.muted(), self.audio.as_mut());
        self.book.update(&mut self.state, now_ms, delta);
        self.rig.update(&mut self.state, delta);
        self.snapshot(now_ms)
    }

    fn snapshot(&self, now_ms: f64) -> FrameSnapshot {
        FrameSnapshot {
            time_ms: now_ms,
            requested_page: self.state.requested_page(),
            animated_page: self.state.animated_page(),
            zoom: self.state.zoom(),
            pan: self.state.pan,
            side: self.state.side(),
            muted: self.state.muted(),
            device: self.rig.device(),
            click_enabled: self.click_enabled(),
            cursor: self.cursor(),
            scale: self.rig.scale(),
            position: self.rig.position(),
            sheets: self.book.snapshot(),
        }
    }

    fn apply(&mut self, gesture: Gesture) {
        match gesture {
            Gesture::Turn { page, .. } => {
                self.state.set_requested_page(page);
            }
            Gesture::ToggleZoom => {
                let zoom = controls::toggle_zoom(self.state.zoom(), &self.config.zoom);
                self.set_zoom(zoom);
            }
            Gesture::Zoom(zoom) => {
                self.set_zoom(zoom);
            }
        }
    }

    fn sync_hover(&mut self) {
        let hovered = self.gestures.hovered();
        if hovered == self.hovered {
            return;
        }
        let click_enabled = self.click_enabled();
        if let Some(sheet) = self.hovered.and_then(|i| self.book.sheet_mut(i)) {
            sheet.set_hovered(false, click_enabled);
        }
        if let Some(sheet) = hovered.and_then(|i| self.book.sheet_mut(i)) {
            sheet.set_hovered(true, click_enabled);
        }
        self.hovered = hovered;
    }

    /// Target page cursor.
    pub fn requested_page(&self) -> usize {
        self.state.requested_page()
    }

    /// Request a page; out-of-range values clamp to `[0, sheet_count]`.
    pub fn set_requested_page(&mut self, page: i64) -> usize {
        self.state.set_requested_page_signed(page)
    }

    /// Zoom factor.
    pub fn zoom(&self) -> f32 {
        self.state.zoom()
    }

    /// Set zoom and re-clamp pan against the new bounds right away.
    pub fn set_zoom(&mut self, zoom: f32) -> f32 {
        let zoom = self.state.set_zoom(zoom);
        self.rig.clamp_pan(&mut self.state);
        zoom
    }

    /// Zoom-in button.
    pub fn zoom_in(&mut self) -> f32 {
        self.set_zoom(controls::zoom_in(self.state.zoom(), &self.config.zoom))
    }

    /// Zoom-out button.
    pub fn zoom_out(&mut self) -> f32 {
        self.set_zoom(controls::zoom_out(self.state.zoom(), &self.config.zoom))
    }

    /// Zoom-in button enabled state.
    pub fn can_zoom_in(&self) -> bool {
        controls::can_zoom_in(self.state.zoom(), &self.config.zoom)
    }

    /// Zoom-out button enabled state.
    pub fn can_zoom_out(&self) -> bool {
        controls::can_zoom_out(self.state.zoom())
    }

    /// Clamped pan offset.
    pub fn pan(&self) -> Vec2 {
        self.state.pan
    }

    /// Active side in single-page mode.
    pub fn side(&self) -> Side {
        self.state.side()
    }

    /// Set the active side.
    pub fn set_side(&mut self, side: Side) {
        self.state.set_side(side);
    }

    /// Mute flag.
    pub fn muted(&self) -> bool {
        self.state.muted()
    }

    /// Set the mute flag.
    pub fn set_muted(&mut self, muted: bool) {
        self.state.set_muted(muted);
    }

    /// Flip the mute flag.
    pub fn toggle_mute(&mut self) -> bool {
        controls::toggle_mute(&mut self.state)
    }

    /// Forward arrow for the current layout.
    pub fn next(&mut self, now_ms: f64) -> bool {
        let device = self.rig.device();
        self.navigator.forward(&mut self.state, device, now_ms)
    }

    /// Back arrow for the current layout.
    pub fn previous(&mut self, now_ms: f64) -> bool {
        let device = self.rig.device();
        self.navigator.back(&mut self.state, device, now_ms)
    }

    /// Forward arrow enabled state.
    pub fn can_go_forward(&self) -> bool {
        Navigator::can_go_forward(&self.state, self.rig.device())
    }

    /// Back arrow enabled state.
    pub fn can_go_back(&self) -> bool {
        Navigator::can_go_back(&self.state, self.rig.device())
    }

    /// `false` hides the fullscreen control.
    pub fn fullscreen_supported(&self) -> bool {
        self.fullscreen.is_supported()
    }

    /// Toggle fullscreen, returning the resulting state.
    pub fn toggle_fullscreen(&mut self) -> bool {
        controls::toggle_fullscreen(self.fullscreen.as_mut())
    }

    /// Share targets for `url`.
    pub fn share_links(&self, url: &str) -> ShareLinks {
        ShareLinks::for_url(url)
    }

    /// Whether taps turn pages at the current zoom.
    pub fn click_enabled(&self) -> bool {
        self.rig.click_enabled(self.state.zoom())
    }

    /// Cursor to show over the render surface.
    pub fn cursor(&self) -> CursorStyle {
        let click_enabled = self.click_enabled();
        match self.gestures.cursor(click_enabled) {
            CursorStyle::Auto => self
                .hovered
                .and_then(|i| self.book.sheets().get(i))
                .map(|s| s.cursor(click_enabled))
                .unwrap_or_default(),
            other => other,
        }
    }

    /// Shared state, read-only.
    pub fn state(&self) -> &BookViewState {
        &self.state
    }

    /// Sheet stack.
    pub fn book(&self) -> &Book {
        &self.book
    }

    /// Camera rig.
    pub fn rig(&self) -> &CameraRig {
        &self.rig
    }

    /// Decoded textures of the current document.
    pub fn textures(&self) -> &TextureCache {
        &self.textures
    }

    /// Validated configuration.
    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PointerEventKind;
    use crate::texture::DataUrlLoader;
    use std::cell::Cell;
    use std::rc::Rc;

    fn viewer(pages: usize) -> Viewer {
        let mut v = Viewer::new(ViewerConfig::default(), Viewport::default());
        let pages: Vec<_> = (0..pages).map(|i| PageImage::new(format!("p{i}"))).collect();
        v.load_document(&pages, &DataUrlLoader);
        v
    }

    #[test]
    fn requested_page_flows_to_sheets() {
        let mut v = viewer(6);
        v.set_requested_page(3);
        let mut t = 0.0;
        let mut snap = v.frame(t, 0.016);
        while snap.animated_page != 3 {
            t += 16.0;
            snap = v.frame(t, 0.016);
            assert!(t < 2000.0);
        }
        assert!(snap.sheets.iter().take(3).all(|s| s.opened));
        assert_eq!(v.set_requested_page(-4), 0);
        assert_eq!(v.set_requested_page(99), 3);
    }

    #[test]
    fn zoom_change_reclamps_pan() {
        let mut v = viewer(6);
        v.set_zoom(2.0);
        v.state.pan = Vec2::new(100.0, 100.0);
        v.rig.clamp_pan(&mut v.state);
        let wide = v.pan();
        v.set_zoom(1.0);
        let bounds = v.rig.bounds(1.0);
        assert!(bounds.contains(v.pan()));
        assert!(v.pan().x < wide.x);
    }

    #[test]
    fn sound_plays_on_turns_only() {
        struct Shared(Rc<Cell<u32>>);
        impl AudioCue for Shared {
            fn play(&mut self) {
                self.0.set(self.0.get() + 1);
            }
        }
        let count = Rc::new(Cell::new(0));
        let mut v = viewer(4).with_audio(Box::new(Shared(count.clone())));
        v.frame(0.0, 0.016);
        v.next(0.0);
        v.frame(16.0, 0.016);
        v.set_muted(true);
        v.next(400.0);
        v.frame(416.0, 0.016);
        assert_eq!(count.get(), 1);
    }

    #[test]
    fn hover_drives_cursor() {
        let mut v = viewer(4);
        v.pointer(&PointerEvent::mouse(
            PointerEventKind::Move,
            Vec2::new(10.0, 10.0),
            0.0,
            Some(1),
        ));
        assert_eq!(v.cursor(), CursorStyle::Pointer);
        v.pointer(&PointerEvent::mouse(PointerEventKind::Leave, Vec2::ZERO, 5.0, None));
        assert_eq!(v.cursor(), CursorStyle::Auto);
    }
}
