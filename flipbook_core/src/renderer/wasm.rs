// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: wasm binding

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
use wasm_bindgen::prelude::*;
#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
use wasm_bindgen::Clamped;
#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
use web_sys::{HtmlCanvasElement, ImageData};

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
use crate::{
    config,
    error::{FlipbookError, Result},
    input::{PointerCapture, PointerEvent, PointerEventKind, PointerId, PointerKind},
    renderer::cpu,
    texture::{DataUrlLoader, PageImage},
    types::{Color, Side, Viewport},
    viewer::Viewer,
};

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
struct CanvasCapture(HtmlCanvasElement);

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
impl PointerCapture for CanvasCapture {
    fn set_pointer_capture(&mut self, id: PointerId) -> Result<()> {
        self.0
            .set_pointer_capture(id.0)
            .map_err(|e| FlipbookError::Platform(format!("{e:?}")))
    }

    fn release_pointer_capture(&mut self, id: PointerId) -> Result<()> {
        self.0
            .release_pointer_capture(id.0)
            .map_err(|e| FlipbookError::Platform(format!("{e:?}")))
    }
}

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
fn to_js(err: FlipbookError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
#[wasm_bindgen]
pub struct FlipbookWasm {
    viewer: Viewer,
    buffer: Vec<u8>,
}

#[cfg(all(target_arch = "wasm32", feature = "wasm"))]
#[wasm_bindgen]
impl FlipbookWasm {
    /// Create a session bound to `canvas` from JSON config (may be `{}`).
    #[wasm_bindgen(constructor)]
    pub fn new(canvas: HtmlCanvasElement, config_json: &str) -> std::result::Result<FlipbookWasm, JsValue> {
        let config = config::from_slice(config_json.as_bytes()).map_err(to_js)?;
        let viewport = Viewport {
            pixel_width: canvas.width() as f32,
            pixel_height: canvas.height() as f32,
            ..Viewport::default()
        };
        let viewer = Viewer::new(config, viewport).with_capture(Box::new(CanvasCapture(canvas)));
        Ok(Self {
            viewer,
            buffer: Vec::new(),
        })
    }

    /// Load page images (`data:` URLs) in reading order.
    #[wasm_bindgen]
    pub fn load_pages(&mut self, pages: Vec<String>) {
        let pages: Vec<PageImage> = pages.into_iter().map(PageImage::new).collect();
        self.viewer.load_document(&pages, &DataUrlLoader);
    }

    /// Refit to the canvas and the visible world extent.
    #[wasm_bindgen]
    pub fn resize(&mut self, world_width: f32, world_height: f32, pixel_width: f32, pixel_height: f32, pixel_ratio: f32) {
        self.viewer.resize(Viewport {
            world_width,
            world_height,
            pixel_width,
            pixel_height,
            pixel_ratio,
        });
    }

    /// Forward a DOM pointer event. `hit` is the picked sheet or -1.
    #[wasm_bindgen]
    #[allow(clippy::too_many_arguments)]
    pub fn pointer(&mut self, kind: &str, id: i32, pointer_type: &str, x: f32, y: f32, time_ms: f64, hit: i32) {
        let kind = match kind {
            "pointerdown" => PointerEventKind::Down,
            "pointermove" => PointerEventKind::Move,
            "pointerup" => PointerEventKind::Up,
            "pointercancel" => PointerEventKind::Cancel,
            "pointerleave" => PointerEventKind::Leave,
            _ => return,
        };
        self.viewer.pointer(&PointerEvent {
            kind,
            id: PointerId(id),
            pointer: PointerKind::from_pointer_type(pointer_type),
            position: glam::Vec2::new(x, y),
            time_ms,
            hit: usize::try_from(hit).ok(),
        });
    }

    /// Advance one frame and return the snapshot as JSON.
    #[wasm_bindgen]
    pub fn frame(&mut self, now_ms: f64, delta: f32) -> std::result::Result<String, JsValue> {
        let snapshot = self.viewer.frame(now_ms, delta);
        serde_json::to_string(&snapshot).map_err(|e| to_js(e.into()))
    }

    /// Rasterize the current frame into a new [`ImageData`].
    #[wasm_bindgen]
    pub fn render(&mut self, width: u32, height: u32) -> std::result::Result<ImageData, JsValue> {
        let (w, h) = (width as usize, height as usize);
        let len = frame_len(w, h).ok_or_else(|| JsValue::from_str("frame size overflows"))?;
        self.buffer.clear();
        self.buffer.resize(len, 0);
        cpu::render_viewer(&self.viewer, Color::WHITE, &mut self.buffer, w, h, w * 4);
        ImageData::new_with_u8_clamped_array_and_sh(Clamped(&self.buffer), width, height)
    }

    #[wasm_bindgen]
    pub fn requested_page(&self) -> u32 {
        self.viewer.requested_page() as u32
    }

    #[wasm_bindgen]
    pub fn set_requested_page(&mut self, page: i32) -> u32 {
        self.viewer.set_requested_page(page as i64) as u32
    }

    #[wasm_bindgen]
    pub fn next(&mut self, now_ms: f64) -> bool {
        self.viewer.next(now_ms)
    }

    #[wasm_bindgen]
    pub fn previous(&mut self, now_ms: f64) -> bool {
        self.viewer.previous(now_ms)
    }

    #[wasm_bindgen]
    pub fn zoom_in(&mut self) -> f32 {
        self.viewer.zoom_in()
    }

    #[wasm_bindgen]
    pub fn zoom_out(&mut self) -> f32 {
        self.viewer.zoom_out()
    }

    #[wasm_bindgen]
    pub fn set_zoom(&mut self, zoom: f32) -> f32 {
        self.viewer.set_zoom(zoom)
    }

    /// `"left"` or `"right"`; anything else is ignored.
    #[wasm_bindgen]
    pub fn set_side(&mut self, side: &str) {
        match side {
            "left" => self.viewer.set_side(Side::Left),
            "right" => self.viewer.set_side(Side::Right),
            _ => {}
        }
    }

    #[wasm_bindgen]
    pub fn toggle_mute(&mut self) -> bool {
        self.viewer.toggle_mute()
    }

    /// Share links for `url` as JSON `{copy, email, whatsapp, instagram}`.
    #[wasm_bindgen]
    pub fn share_links(&self, url: &str) -> String {
        let links = self.viewer.share_links(url);
        serde_json::json!({
            "copy": links.copy,
            "email": links.email,
            "whatsapp": links.whatsapp,
            "instagram": links.instagram,
        })
        .to_string()
    }
}

/// Bytes in an RGBA8888 frame, or `None` when the size overflows.
pub fn frame_len(width: usize, height: usize) -> Option<usize> {
    width.checked_mul(height)?.checked_mul(4)
}

#[cfg(not(all(target_arch = "wasm32", feature = "wasm")))]
pub struct FlipbookWasm;

#[cfg(not(all(target_arch = "wasm32", feature = "wasm")))]
impl FlipbookWasm {
    /// Stub constructor when compiled for non-wasm targets.
    pub fn new(_config_json: &str) -> Result<Self, &'static str> {
        Err("wasm feature requires wasm32 target")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_len_is_computed_in_usize() {
        assert_eq!(frame_len(32, 16), Some(2048));
        assert_eq!(frame_len(usize::MAX, 2), None);
        // 40000 * 40000 * 4 overflows u32
        #[cfg(target_pointer_width = "64")]
        assert_eq!(frame_len(40_000, 40_000), Some(6_400_000_000));
    }
}
