// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: type definitions shared across the engine

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// RGBA8888 color.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct Color {
    /// Red channel
    pub r: u8,
    /// Green channel
    pub g: u8,
    /// Blue channel
    pub b: u8,
    /// Alpha channel
    pub a: u8,
}

impl Color {
    /// Opaque white, used for the paper edges.
    pub const WHITE: Color = Color {
        r: 255,
        g: 255,
        b: 255,
        a: 255,
    };

    /// Dark spine-side edge of a sheet (#111).
    pub const EDGE: Color = Color {
        r: 0x11,
        g: 0x11,
        b: 0x11,
        a: 255,
    };
}

/// Which half of an open spread is centered in single-page (mobile) mode.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// The right-hand page is in view (book shifted left).
    #[default]
    Left,
    /// The left-hand page is in view (book shifted right).
    Right,
}

/// Layout class derived from the css width of the viewer.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    /// Narrow screens, single page centered.
    Mobile,
    /// Wide screens, full spread visible.
    #[default]
    Desktop,
}

impl DeviceClass {
    /// Classify a css width against the mobile breakpoint (inclusive).
    pub fn from_css_width(css_width: f32, breakpoint: f32) -> Self {
        if css_width <= breakpoint {
            DeviceClass::Mobile
        } else {
            DeviceClass::Desktop
        }
    }

    /// `true` for [`DeviceClass::Mobile`].
    pub fn is_mobile(self) -> bool {
        self == DeviceClass::Mobile
    }
}

/// Pointer cursor the host should display over the book.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CursorStyle {
    /// Platform default
    #[default]
    Auto,
    /// Clickable affordance
    Pointer,
    /// Drag in progress
    Grabbing,
}

/// Render surface description for one frame.
///
/// `world_*` is the extent of the visible plane at the book's depth,
/// `pixel_*` the drawing-buffer size in device pixels.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct Viewport {
    /// Visible world width at the book plane
    pub world_width: f32,
    /// Visible world height at the book plane
    pub world_height: f32,
    /// Drawing buffer width in device pixels
    pub pixel_width: f32,
    /// Drawing buffer height in device pixels
    pub pixel_height: f32,
    /// Device pixels per css pixel
    pub pixel_ratio: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            world_width: 4.0,
            world_height: 2.0,
            pixel_width: 1600.0,
            pixel_height: 800.0,
            pixel_ratio: 1.0,
        }
    }
}

impl Viewport {
    /// Width in css pixels.
    pub fn css_width(&self) -> f32 {
        self.pixel_width / self.pixel_ratio.max(f32::EPSILON)
    }

    /// Height in css pixels.
    pub fn css_height(&self) -> f32 {
        self.pixel_height / self.pixel_ratio.max(f32::EPSILON)
    }

    /// World units covered by one css pixel along each axis.
    pub fn world_per_css_pixel(&self) -> Vec2 {
        let css_w = self.css_width();
        let css_h = self.css_height();
        Vec2::new(
            if css_w > 0.0 { self.world_width / css_w } else { 0.0 },
            if css_h > 0.0 { self.world_height / css_h } else { 0.0 },
        )
    }
}
