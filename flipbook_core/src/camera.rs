// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: viewport fitting, pan bounds and camera damping
//!
//! The rig never moves a camera. It scales and translates the book group so
//! that the book fits the viewport, then damps toward the zoomed and panned
//! target every frame. Pan lives in [`BookViewState`] and is clamped here.

use crate::config::{CameraConfig, PageConfig, ZoomConfig};
use crate::easing::damp;
use crate::state::BookViewState;
use crate::types::{DeviceClass, Side, Viewport};
use glam::{Affine3A, Vec2, Vec3};

/// Fitted scale before zoom for a viewport and device class.
pub fn base_scale(viewport: &Viewport, device: DeviceClass, page: &PageConfig, cfg: &CameraConfig) -> f32 {
    let ([margin_w, margin_h], comfort) = match device {
        DeviceClass::Mobile => (cfg.mobile_margin, cfg.mobile_comfort),
        DeviceClass::Desktop => (cfg.desktop_margin, cfg.desktop_comfort),
    };
    let fit_w = viewport.world_width * margin_w / page.width;
    let fit_h = viewport.world_height * margin_h / page.height;
    let fitted = fit_w.min(fit_h);
    let clamped = if fitted.is_finite() {
        fitted.clamp(cfg.min_scale, cfg.max_scale)
    } else {
        cfg.min_scale
    };
    clamped * comfort
}

/// Zoom at and above which clicks pan instead of turning pages.
pub fn click_disable_zoom(device: DeviceClass, zoom: &ZoomConfig) -> f32 {
    let taps = match device {
        DeviceClass::Mobile => zoom.click_disable_steps_mobile,
        DeviceClass::Desktop => zoom.click_disable_steps_desktop,
    };
    1.0 + taps as f32 * zoom.step
}

/// `true` while a tap on a sheet should turn it.
pub fn click_enabled(zoom_factor: f32, device: DeviceClass, zoom: &ZoomConfig) -> bool {
    zoom_factor < click_disable_zoom(device, zoom)
}

/// Half-extents of the allowed pan rectangle in world units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanBounds {
    /// Horizontal half-extent
    pub x: f32,
    /// Vertical half-extent
    pub y: f32,
}

impl PanBounds {
    /// Clamp an offset into the rectangle.
    pub fn clamp(&self, pan: Vec2) -> Vec2 {
        Vec2::new(pan.x.clamp(-self.x, self.x), pan.y.clamp(-self.y, self.y))
    }

    /// `true` when `pan` already lies inside.
    pub fn contains(&self, pan: Vec2) -> bool {
        pan.x.abs() <= self.x && pan.y.abs() <= self.y
    }
}

/// Pan bounds at render scale `scale`.
///
/// Overflow of the content past the viewport plus a small margin. Once
/// clicks are disabled the horizontal range grows by the edge reach so the
/// far corners of a zoomed spread can be brought into view, but never past
/// half the content width.
pub fn pan_bounds(
    scale: f32,
    viewport: &Viewport,
    device: DeviceClass,
    click_enabled: bool,
    page: &PageConfig,
    cfg: &CameraConfig,
) -> PanBounds {
    let spread = if device.is_mobile() { page.width } else { page.width * 2.0 };
    let content_w = spread * scale;
    let content_h = page.height * scale;
    let overflow_x = ((content_w - viewport.world_width) / 2.0).max(0.0);
    let overflow_y = ((content_h - viewport.world_height) / 2.0).max(0.0);
    let margin = cfg.pan_margin * scale;

    let mut x = overflow_x + margin;
    if !click_enabled {
        let reach = (viewport.world_width * cfg.edge_reach_viewport)
            .max(page.width * scale * cfg.edge_reach_page);
        x = (content_w / 2.0).min(x + reach);
    }
    PanBounds {
        x,
        y: overflow_y + margin,
    }
}

/// Horizontal shift centering one page of the spread on mobile.
pub fn side_offset(side: Side, device: DeviceClass, scale: f32, page: &PageConfig) -> f32 {
    if !device.is_mobile() {
        return 0.0;
    }
    let half = page.width / 2.0;
    match side {
        Side::Left => -half * scale,
        Side::Right => half * scale,
    }
}

/// Damped scale and position of the book group.
#[derive(Debug, Clone)]
pub struct CameraRig {
    cfg: CameraConfig,
    zoom: ZoomConfig,
    page: PageConfig,
    viewport: Viewport,
    device: DeviceClass,
    base_scale: f32,
    scale: f32,
    position: Vec2,
    primed: bool,
}

impl CameraRig {
    /// Rig fitted to `viewport`.
    pub fn new(cfg: CameraConfig, zoom: ZoomConfig, page: PageConfig, viewport: Viewport) -> Self {
        let mut rig = Self {
            cfg,
            zoom,
            page,
            viewport,
            device: DeviceClass::Desktop,
            base_scale: 1.0,
            scale: 1.0,
            position: Vec2::ZERO,
            primed: false,
        };
        rig.resize(viewport);
        rig
    }

    /// Refit after a viewport change. Returns `true` when the device class
    /// flipped.
    pub fn resize(&mut self, viewport: Viewport) -> bool {
        let device = DeviceClass::from_css_width(viewport.css_width(), self.cfg.mobile_breakpoint);
        let flipped = device != self.device;
        self.viewport = viewport;
        self.device = device;
        self.base_scale = base_scale(&viewport, device, &self.page, &self.cfg);
        if flipped {
            log::debug!("viewport classified as {device:?}");
        }
        flipped
    }

    /// Current viewport.
    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Device class from the last resize.
    pub fn device(&self) -> DeviceClass {
        self.device
    }

    /// Fitted scale before zoom.
    pub fn base_scale(&self) -> f32 {
        self.base_scale
    }

    /// Render scale the rig is heading to.
    pub fn target_scale(&self, zoom_factor: f32) -> f32 {
        self.base_scale * zoom_factor.max(1.0)
    }

    /// Damped render scale.
    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Damped group translation.
    pub fn position(&self) -> Vec2 {
        self.position
    }

    /// Click-to-turn state at a zoom factor.
    pub fn click_enabled(&self, zoom_factor: f32) -> bool {
        click_enabled(zoom_factor, self.device, &self.zoom)
    }

    /// Pan bounds for the current zoom.
    pub fn bounds(&self, zoom_factor: f32) -> PanBounds {
        pan_bounds(
            self.target_scale(zoom_factor),
            &self.viewport,
            self.device,
            self.click_enabled(zoom_factor),
            &self.page,
            &self.cfg,
        )
    }

    /// Clamp the shared pan into the bounds of the current zoom.
    pub fn clamp_pan(&self, state: &mut BookViewState) {
        state.pan = self.bounds(state.zoom()).clamp(state.pan);
    }

    /// Translation the rig is heading to. Pan is ignored while clicks turn
    /// pages.
    pub fn target_position(&self, state: &BookViewState) -> Vec2 {
        let scale = self.target_scale(state.zoom());
        let offset = side_offset(state.side(), self.device, scale, &self.page);
        let pan = if self.click_enabled(state.zoom()) {
            Vec2::ZERO
        } else {
            state.pan
        };
        Vec2::new(offset + pan.x, pan.y)
    }

    /// Clamp pan and damp scale and position toward their targets.
    pub fn update(&mut self, state: &mut BookViewState, delta: f32) {
        self.clamp_pan(state);
        let scale = self.target_scale(state.zoom());
        let position = self.target_position(state);
        if !self.primed {
            self.scale = scale;
            self.position = position;
            self.primed = true;
            return;
        }
        let tau = self.cfg.damping_tau;
        self.scale = damp(self.scale, scale, tau, delta);
        self.position = damp(self.position, position, tau, delta);
    }

    /// Convert a css-pixel drag delta into a pan delta in book units.
    ///
    /// Screen y grows downward, so it is inverted.
    pub fn screen_delta_to_pan(&self, delta_css: Vec2, zoom_factor: f32) -> Vec2 {
        let per_px = self.viewport.world_per_css_pixel();
        let scale = self.target_scale(zoom_factor);
        let scale = if scale > 0.0 { scale } else { 1.0 };
        Vec2::new(delta_css.x * per_px.x, -delta_css.y * per_px.y) / scale
    }

    /// Group transform: uniform scale then translation.
    pub fn transform(&self) -> Affine3A {
        Affine3A::from_scale_rotation_translation(
            Vec3::splat(self.scale),
            glam::Quat::IDENTITY,
            self.position.extend(0.0),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desktop() -> Viewport {
        Viewport::default()
    }

    fn mobile() -> Viewport {
        Viewport {
            world_width: 2.0,
            world_height: 4.0,
            pixel_width: 780.0,
            pixel_height: 1560.0,
            pixel_ratio: 2.0,
        }
    }

    #[test]
    fn base_scale_fits_and_applies_comfort() {
        let page = PageConfig::default();
        let cfg = CameraConfig::default();
        // desktop: height bound, 2 * 0.82 / 1.71
        let s = base_scale(&desktop(), DeviceClass::Desktop, &page, &cfg);
        assert!((s - (2.0 * 0.82 / 1.71) * 1.05).abs() < 1e-5);
        // tiny viewport clamps to the floor before comfort
        let tiny = Viewport {
            world_width: 0.1,
            world_height: 0.1,
            ..desktop()
        };
        let s = base_scale(&tiny, DeviceClass::Mobile, &page, &cfg);
        assert!((s - 0.35 * 0.9).abs() < 1e-6);
    }

    #[test]
    fn click_threshold_depends_on_device() {
        let zoom = ZoomConfig::default();
        assert!(click_enabled(1.15, DeviceClass::Desktop, &zoom));
        assert!(!click_enabled(1.3, DeviceClass::Desktop, &zoom));
        assert!(click_enabled(1.3, DeviceClass::Mobile, &zoom));
        assert!(!click_enabled(1.45, DeviceClass::Mobile, &zoom));
    }

    #[test]
    fn edge_reach_only_when_click_disabled() {
        let page = PageConfig::default();
        let cfg = CameraConfig::default();
        let vp = desktop();
        let on = pan_bounds(2.0, &vp, DeviceClass::Desktop, true, &page, &cfg);
        let off = pan_bounds(2.0, &vp, DeviceClass::Desktop, false, &page, &cfg);
        assert!((on.x - ((5.12 - 4.0) / 2.0 + 0.04)).abs() < 1e-5);
        assert!(off.x > on.x);
        assert!(off.x <= 2.56 + 1e-6);
    }

    #[test]
    fn mobile_side_offset_centers_one_page() {
        let page = PageConfig::default();
        assert!((side_offset(Side::Left, DeviceClass::Mobile, 1.0, &page) + 0.64).abs() < 1e-6);
        assert!((side_offset(Side::Right, DeviceClass::Mobile, 2.0, &page) - 1.28).abs() < 1e-6);
        assert_eq!(side_offset(Side::Right, DeviceClass::Desktop, 2.0, &page), 0.0);
    }

    #[test]
    fn rig_classifies_and_damps() {
        let mut rig = CameraRig::new(
            CameraConfig::default(),
            ZoomConfig::default(),
            PageConfig::default(),
            mobile(),
        );
        assert_eq!(rig.device(), DeviceClass::Mobile);
        let mut state = BookViewState::new(4, 3.0);
        rig.update(&mut state, 0.016);
        assert_eq!(rig.scale(), rig.base_scale());
        state.set_zoom(2.0);
        rig.update(&mut state, 0.016);
        assert!(rig.scale() > rig.base_scale());
        assert!(rig.scale() < rig.target_scale(2.0));
        assert!(rig.resize(desktop()));
    }

    #[test]
    fn pan_ignored_while_clickable() {
        let rig = CameraRig::new(
            CameraConfig::default(),
            ZoomConfig::default(),
            PageConfig::default(),
            desktop(),
        );
        let mut state = BookViewState::new(4, 3.0);
        state.pan = Vec2::new(0.01, 0.0);
        assert_eq!(rig.target_position(&state), Vec2::ZERO);
        state.set_zoom(3.0);
        assert_eq!(rig.target_position(&state).x, 0.01);
    }

    #[test]
    fn drag_delta_is_scale_invariant() {
        let rig = CameraRig::new(
            CameraConfig::default(),
            ZoomConfig::default(),
            PageConfig::default(),
            desktop(),
        );
        let a = rig.screen_delta_to_pan(Vec2::new(100.0, 100.0), 1.0);
        let b = rig.screen_delta_to_pan(Vec2::new(100.0, 100.0), 2.0);
        assert!((a.x - 2.0 * b.x).abs() < 1e-6);
        assert!(a.y < 0.0);
    }
}
