// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Scripted session over a synthetic document.
//!
//! Usage: `flipbook_demos [config.json|-] [out.png]`. Frames are logged as
//! JSON at debug level; the final frame is written to `out.png` when given.

use flipbook_core::config::{self, ViewerConfig};
use flipbook_core::input::{PointerEvent, PointerEventKind};
use flipbook_core::renderer::render_viewer;
use flipbook_core::texture::{DataUrlLoader, PageImage};
use flipbook_core::types::{Color, Viewport};
use flipbook_core::{FrameSnapshot, Viewer};
use glam::Vec2;
use std::fs::File;
use std::process::ExitCode;

const FRAME_MS: f64 = 1000.0 / 60.0;
const WIDTH: u32 = 640;
const HEIGHT: u32 = 320;

enum Step {
    Frames(f64),
    Click(usize),
    DoubleClick(usize),
    Drag(f32, f32),
    Page(i64),
    ZoomOut,
    Next,
}

fn load_config(path: Option<&str>) -> flipbook_core::Result<ViewerConfig> {
    match path {
        Some(path) if path != "-" => config::from_reader(File::open(path)?),
        _ => Ok(ViewerConfig::default()),
    }
}

fn run(viewer: &mut Viewer, now: &mut f64, ms: f64) -> Option<FrameSnapshot> {
    let end = *now + ms;
    let mut last = None;
    while *now < end {
        let snap = viewer.frame(*now, (FRAME_MS / 1000.0) as f32);
        match serde_json::to_string(&snap) {
            Ok(json) => log::debug!("{json}"),
            Err(err) => log::warn!("snapshot not serializable: {err}"),
        }
        last = Some(snap);
        *now += FRAME_MS;
    }
    last
}

fn press(viewer: &mut Viewer, kind: PointerEventKind, at: Vec2, now: f64, sheet: usize) {
    viewer.pointer(&PointerEvent::mouse(kind, at, now, Some(sheet)));
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args: Vec<String> = std::env::args().skip(1).collect();
    let cfg = match load_config(args.first().map(String::as_str)) {
        Ok(cfg) => cfg,
        Err(err) => {
            log::error!("config: {err}");
            return ExitCode::FAILURE;
        }
    };

    let viewport = Viewport {
        pixel_width: WIDTH as f32,
        pixel_height: HEIGHT as f32,
        ..Viewport::default()
    };
    let mut viewer = Viewer::new(cfg, viewport);
    let pages: Vec<PageImage> = (0..24).map(|i| PageImage::new(format!("page-{i:02}.png"))).collect();
    viewer.load_document(&pages, &DataUrlLoader);

    let centre = Vec2::new(WIDTH as f32 / 2.0, HEIGHT as f32 / 2.0);
    let script = [
        Step::Frames(200.0),
        Step::Click(0),
        Step::Frames(1500.0),
        Step::Page(9),
        Step::Frames(3000.0),
        Step::DoubleClick(9),
        Step::Frames(800.0),
        Step::Drag(-80.0, 40.0),
        Step::Frames(800.0),
        Step::ZoomOut,
        Step::Next,
        Step::Frames(1500.0),
    ];

    let mut now = 0.0;
    let mut last = None;
    for step in script {
        match step {
            Step::Frames(ms) => last = run(&mut viewer, &mut now, ms).or(last),
            Step::Click(sheet) => {
                press(&mut viewer, PointerEventKind::Down, centre, now, sheet);
                press(&mut viewer, PointerEventKind::Up, centre, now + 40.0, sheet);
            }
            Step::DoubleClick(sheet) => {
                for offset in [0.0, 120.0] {
                    press(&mut viewer, PointerEventKind::Down, centre, now + offset, sheet);
                    press(&mut viewer, PointerEventKind::Up, centre, now + offset + 40.0, sheet);
                }
                log::info!("zoom now {}", viewer.zoom());
            }
            Step::Drag(dx, dy) => {
                press(&mut viewer, PointerEventKind::Down, centre, now, 0);
                let to = centre + Vec2::new(dx, dy);
                press(&mut viewer, PointerEventKind::Move, to, now + 16.0, 0);
                press(&mut viewer, PointerEventKind::Up, to, now + 32.0, 0);
                log::info!("pan now {:?}", viewer.pan());
            }
            Step::Page(page) => {
                let page = viewer.set_requested_page(page);
                log::info!("requested page {page}");
            }
            Step::ZoomOut => {
                while viewer.can_zoom_out() {
                    viewer.zoom_out();
                }
            }
            Step::Next => {
                viewer.next(now);
            }
        }
    }

    if let Some(snap) = &last {
        log::info!(
            "finished at page {} zoom {} with {} sheets",
            snap.animated_page,
            snap.zoom,
            snap.sheets.len()
        );
    }

    if let Some(path) = args.get(1) {
        let mut buf = vec![0u8; (WIDTH * HEIGHT * 4) as usize];
        render_viewer(
            &viewer,
            Color::WHITE,
            &mut buf,
            WIDTH as usize,
            HEIGHT as usize,
            (WIDTH * 4) as usize,
        );
        let Some(img) = image::RgbaImage::from_raw(WIDTH, HEIGHT, buf) else {
            log::error!("frame buffer has the wrong size");
            return ExitCode::FAILURE;
        };
        if let Err(err) = img.save(path) {
            log::error!("writing {path}: {err}");
            return ExitCode::FAILURE;
        }
        log::info!("wrote {path}");
    }
    ExitCode::SUCCESS
}
