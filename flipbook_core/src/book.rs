// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: sheet list and page cursor animation

use crate::config::{CursorConfig, PageConfig, TurnConfig};
use crate::geometry::PageGeometry;
use crate::sheet::{Sheet, SheetFrame, SheetImages, SheetSnapshot};
use crate::state::BookViewState;
use crate::texture::PageImage;
use glam::{Affine3A, Quat};
use std::f32::consts::FRAC_PI_2;

/// Pair a flat page sequence into sheets: `{images[2k], images[2k + 1]}`.
pub fn group_sheets(pages: &[PageImage]) -> Vec<SheetImages> {
    pages
        .chunks(2)
        .map(|pair| SheetImages {
            front: pair[0].clone(),
            back: pair.get(1).cloned(),
        })
        .collect()
}

/// Number of sheets a page sequence produces.
pub fn sheet_count_for(page_count: usize) -> usize {
    page_count.div_ceil(2)
}

/// Steps the animated page toward the requested page one page at a time.
///
/// The first step of a new request lands immediately. Further steps are
/// spaced by `fast_step_ms` while more than `fast_threshold` pages remain and
/// by `slow_step_ms` otherwise.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageCursor {
    current: usize,
    target: usize,
    next_step_at: Option<f64>,
}

impl PageCursor {
    /// Cursor resting at `page`.
    pub fn new(page: usize) -> Self {
        Self {
            current: page,
            target: page,
            next_step_at: None,
        }
    }

    /// Page the sheets render against.
    pub fn current(&self) -> usize {
        self.current
    }

    /// Page the cursor is heading to.
    pub fn target(&self) -> usize {
        self.target
    }

    /// `true` once the cursor has caught up.
    pub fn is_settled(&self) -> bool {
        self.current == self.target
    }

    /// Retarget the cursor. A changed target cancels the pending step and
    /// steps once right away.
    pub fn request(&mut self, target: usize, now_ms: f64, cfg: &CursorConfig) {
        if target == self.target {
            return;
        }
        self.target = target;
        self.next_step_at = None;
        self.step(now_ms, cfg);
    }

    /// Fire the pending step if it is due. Returns `true` when the cursor
    /// moved.
    pub fn poll(&mut self, now_ms: f64, cfg: &CursorConfig) -> bool {
        match self.next_step_at {
            Some(due) if now_ms >= due => self.step(now_ms, cfg),
            _ => false,
        }
    }

    /// Drop the pending step and jump to `page`.
    pub fn reset(&mut self, page: usize) {
        *self = Self::new(page);
    }

    fn step(&mut self, now_ms: f64, cfg: &CursorConfig) -> bool {
        if self.current == self.target {
            self.next_step_at = None;
            return false;
        }
        let remaining = self.current.abs_diff(self.target);
        let interval = if remaining > cfg.fast_threshold {
            cfg.fast_step_ms
        } else {
            cfg.slow_step_ms
        };
        if self.target > self.current {
            self.current += 1;
        } else {
            self.current -= 1;
        }
        self.next_step_at = if self.current == self.target {
            None
        } else {
            Some(now_ms + interval)
        };
        true
    }
}

/// Ordered stack of sheets sharing one page mesh.
#[derive(Debug, Clone)]
pub struct Book {
    sheets: Vec<Sheet>,
    geometry: PageGeometry,
    cursor: PageCursor,
    page: PageConfig,
    turn: TurnConfig,
    cursor_cfg: CursorConfig,
}

impl Book {
    /// Build a closed book for a page sequence.
    pub fn new(pages: &[PageImage], page: PageConfig, turn: TurnConfig, cursor_cfg: CursorConfig) -> Self {
        let geometry = PageGeometry::build(&page);
        let mut book = Self {
            sheets: Vec::new(),
            geometry,
            cursor: PageCursor::new(0),
            page,
            turn,
            cursor_cfg,
        };
        book.load(pages);
        book
    }

    /// Replace the sheet set. Pending cursor steps are cancelled.
    pub fn load(&mut self, pages: &[PageImage]) {
        let bone_count = self.page.bone_count();
        self.sheets = group_sheets(pages)
            .into_iter()
            .enumerate()
            .map(|(index, images)| Sheet::new(index, images, bone_count, false))
            .collect();
        self.cursor.reset(0);
    }

    /// Advance the cursor and every sheet by one frame.
    pub fn update(&mut self, state: &mut BookViewState, now_ms: f64, delta: f32) {
        let target = state.requested_page().min(self.sheets.len());
        if target != self.cursor.target() {
            self.cursor.request(target, now_ms, &self.cursor_cfg);
        } else {
            self.cursor.poll(now_ms, &self.cursor_cfg);
        }
        let previous = state.animated_page();
        state.set_animated_page(self.cursor.current());
        if previous != self.cursor.current() && self.cursor.is_settled() {
            log::info!("page cursor settled on {}", self.cursor.current());
        }

        let current_page = self.cursor.current();
        let total_sheets = self.sheets.len();
        for sheet in &mut self.sheets {
            let frame = SheetFrame {
                opened: current_page > sheet.index(),
                book_closed: current_page == 0,
                current_page,
                total_sheets,
                now_ms,
                delta,
            };
            sheet.update(&frame, &self.turn, &self.page);
        }
    }

    /// Rotation of the whole assembly: a quarter turn about y so the spine
    /// runs vertically through the origin.
    pub fn root_transform(&self) -> Affine3A {
        Affine3A::from_quat(Quat::from_rotation_y(-FRAC_PI_2))
    }

    /// Sheets in stack order.
    pub fn sheets(&self) -> &[Sheet] {
        &self.sheets
    }

    /// Mutable sheet access for hover tracking.
    pub fn sheet_mut(&mut self, index: usize) -> Option<&mut Sheet> {
        self.sheets.get_mut(index)
    }

    /// Number of sheets.
    pub fn sheet_count(&self) -> usize {
        self.sheets.len()
    }

    /// Shared page mesh.
    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    /// Page dimensions the book was built with.
    pub fn page_config(&self) -> &PageConfig {
        &self.page
    }

    /// Page cursor state.
    pub fn cursor(&self) -> &PageCursor {
        &self.cursor
    }

    /// Every page image in document order.
    pub fn images(&self) -> Vec<PageImage> {
        self.sheets
            .iter()
            .flat_map(|s| std::iter::once(s.images().front.clone()).chain(s.images().back.clone()))
            .collect()
    }

    /// `true` while any sheet is mid-turn.
    pub fn is_animating(&self) -> bool {
        !self.cursor.is_settled() || self.sheets.iter().any(Sheet::is_turning)
    }

    /// Snapshots of every sheet.
    pub fn snapshot(&self) -> Vec<SheetSnapshot> {
        self.sheets.iter().map(Sheet::snapshot).collect()
    }
}
