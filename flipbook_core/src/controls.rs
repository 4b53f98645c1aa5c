// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: transport controls around the book
//!
//! Zoom buttons, page navigation for both layouts, the mute toggle and its
//! page-turn sound, fullscreen and share links. Everything here writes only
//! through [`BookViewState`].

use crate::config::ZoomConfig;
use crate::error::Result;
use crate::state::BookViewState;
use crate::types::{DeviceClass, Side};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

/// Characters `encodeURIComponent` leaves alone.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

fn round_3(value: f32) -> f32 {
    (value * 1000.0).round() / 1000.0
}

/// Zoom after one press of the zoom-in button.
pub fn zoom_in(zoom: f32, cfg: &ZoomConfig) -> f32 {
    round_3(zoom + cfg.step).min(cfg.max)
}

/// Zoom after one press of the zoom-out button.
pub fn zoom_out(zoom: f32, cfg: &ZoomConfig) -> f32 {
    round_3(zoom - cfg.step).max(1.0)
}

/// `false` once zoom sits at the upper bound.
pub fn can_zoom_in(zoom: f32, cfg: &ZoomConfig) -> bool {
    zoom < cfg.max
}

/// `false` once zoom sits at 1.
pub fn can_zoom_out(zoom: f32) -> bool {
    zoom > 1.0
}

/// Zoom after a double tap: back to 1 when zoomed, otherwise `double_click`.
pub fn toggle_zoom(zoom: f32, cfg: &ZoomConfig) -> f32 {
    if zoom > 1.0 {
        1.0
    } else {
        cfg.double_click
    }
}

/// Flip the mute flag, returning the new value.
pub fn toggle_mute(state: &mut BookViewState) -> bool {
    let muted = !state.muted();
    state.set_muted(muted);
    muted
}

/// Drops navigation presses closer together than the interval.
#[derive(Debug, Clone)]
pub struct NavDebounce {
    interval_ms: f64,
    last_at: Option<f64>,
}

impl NavDebounce {
    /// Debounce with the given minimum interval.
    pub fn new(interval_ms: f64) -> Self {
        Self {
            interval_ms,
            last_at: None,
        }
    }

    /// Accept a press at `now_ms` unless one was accepted too recently.
    pub fn accept(&mut self, now_ms: f64) -> bool {
        if let Some(last) = self.last_at {
            if now_ms - last < self.interval_ms {
                return false;
            }
        }
        self.last_at = Some(now_ms);
        true
    }
}

/// Arrow-button navigation over the page cursor and the mobile side.
#[derive(Debug, Clone)]
pub struct Navigator {
    debounce: NavDebounce,
}

impl Navigator {
    /// Navigator with the given debounce interval.
    pub fn new(debounce_ms: f64) -> Self {
        Self {
            debounce: NavDebounce::new(debounce_ms),
        }
    }

    /// Whether the back arrow does anything.
    pub fn can_go_back(state: &BookViewState, device: DeviceClass) -> bool {
        match device {
            DeviceClass::Desktop => state.requested_page() > 0,
            DeviceClass::Mobile => !(state.requested_page() == 0 && state.side() == Side::Left),
        }
    }

    /// Whether the forward arrow does anything.
    pub fn can_go_forward(state: &BookViewState, device: DeviceClass) -> bool {
        match device {
            DeviceClass::Desktop => state.requested_page() < state.sheet_count(),
            DeviceClass::Mobile => {
                !(state.requested_page() == state.sheet_count() && state.side() == Side::Left)
            }
        }
    }

    /// Back arrow. Returns `true` when state changed.
    pub fn back(&mut self, state: &mut BookViewState, device: DeviceClass, now_ms: f64) -> bool {
        if !Self::can_go_back(state, device) || !self.debounce.accept(now_ms) {
            return false;
        }
        let page = state.requested_page();
        match device {
            DeviceClass::Desktop => {
                state.set_requested_page(page - 1);
            }
            DeviceClass::Mobile => match state.side() {
                Side::Left => state.set_side(Side::Right),
                Side::Right => {
                    state.set_requested_page(page.saturating_sub(1));
                    state.set_side(Side::Left);
                }
            },
        }
        true
    }

    /// Forward arrow. Returns `true` when state changed.
    pub fn forward(&mut self, state: &mut BookViewState, device: DeviceClass, now_ms: f64) -> bool {
        if !Self::can_go_forward(state, device) || !self.debounce.accept(now_ms) {
            return false;
        }
        let page = state.requested_page();
        match device {
            DeviceClass::Desktop => {
                state.set_requested_page(page + 1);
            }
            DeviceClass::Mobile => match state.side() {
                Side::Right => state.set_side(Side::Left),
                Side::Left => {
                    if page < state.sheet_count() {
                        state.set_requested_page(page + 1);
                    }
                    state.set_side(Side::Right);
                }
            },
        }
        true
    }
}

/// Plays the page-turn sound.
pub trait AudioCue {
    /// Start the cue. Hosts swallow playback errors.
    fn play(&mut self);
}

/// Cue for headless sessions.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentCue;

impl AudioCue for SilentCue {
    fn play(&mut self) {}
}

/// Fires the cue whenever the requested page changes, except the first
/// page observed and while muted.
#[derive(Debug, Clone, Default)]
pub struct PageTurnSound {
    last_page: Option<usize>,
}

impl PageTurnSound {
    /// Feed the current requested page. Returns `true` when the cue played.
    pub fn observe(&mut self, page: usize, muted: bool, cue: &mut dyn AudioCue) -> bool {
        let previous = self.last_page.replace(page);
        match previous {
            Some(prev) if prev != page && !muted => {
                cue.play();
                true
            }
            _ => false,
        }
    }

    /// Treat the next page as a first observation.
    pub fn reset(&mut self) {
        self.last_page = None;
    }
}

/// Host fullscreen capability.
pub trait FullscreenHost {
    /// `false` hides the toggle.
    fn is_supported(&self) -> bool;
    /// Whether the document is fullscreen right now.
    fn is_fullscreen(&self) -> bool;
    /// Enter fullscreen.
    fn request_fullscreen(&mut self) -> Result<()>;
    /// Leave fullscreen.
    fn exit_fullscreen(&mut self) -> Result<()>;
}

/// Host without fullscreen support.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoFullscreen;

impl FullscreenHost for NoFullscreen {
    fn is_supported(&self) -> bool {
        false
    }

    fn is_fullscreen(&self) -> bool {
        false
    }

    fn request_fullscreen(&mut self) -> Result<()> {
        Ok(())
    }

    fn exit_fullscreen(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Toggle fullscreen. Unsupported hosts are a no-op and failures are logged.
/// Returns the fullscreen state after the call.
pub fn toggle_fullscreen(host: &mut dyn FullscreenHost) -> bool {
    if !host.is_supported() {
        return false;
    }
    let entering = !host.is_fullscreen();
    let result = if entering {
        host.request_fullscreen()
    } else {
        host.exit_fullscreen()
    };
    match result {
        Ok(()) => log::info!("fullscreen {}", if entering { "entered" } else { "exited" }),
        Err(err) => log::warn!("fullscreen toggle failed: {err}"),
    }
    host.is_fullscreen()
}

/// Targets for the share sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareLinks {
    /// Text placed on the clipboard
    pub copy: String,
    /// Prefilled `mailto:` link
    pub email: String,
    /// Prefilled WhatsApp link
    pub whatsapp: String,
    /// Instagram has no prefill; the link is copied and the site opened
    pub instagram: String,
}

impl ShareLinks {
    /// Build links for a page URL.
    pub fn for_url(url: &str) -> Self {
        let subject = utf8_percent_encode("Check this flipbook", URI_COMPONENT);
        let message = format!("Have a look: {url}");
        let body = utf8_percent_encode(&message, URI_COMPONENT);
        Self {
            copy: url.to_string(),
            email: format!("mailto:?subject={subject}&body={body}"),
            whatsapp: format!("https://wa.me/?text={body}"),
            instagram: "https://www.instagram.com/".to_string(),
        }
    }
}
