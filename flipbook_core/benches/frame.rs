// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
use criterion::{criterion_group, criterion_main, Criterion};
use flipbook_core::config::ViewerConfig;
use flipbook_core::renderer::{collect_triangles, render_viewer};
use flipbook_core::texture::{DataUrlLoader, PageImage};
use flipbook_core::types::{Color, Viewport};
use flipbook_core::Viewer;

fn viewer(pages: usize) -> Viewer {
    let mut viewer = Viewer::new(ViewerConfig::default(), Viewport::default());
    let pages: Vec<_> = (0..pages).map(|i| PageImage::new(format!("page-{i}.png"))).collect();
    viewer.load_document(&pages, &DataUrlLoader);
    viewer
}

fn bench_frames(c: &mut Criterion) {
    let mut v = viewer(500);
    v.set_requested_page(250);
    let mut t = 0.0;
    c.bench_function("frame_500_pages", |b| {
        b.iter(|| {
            t += 16.0;
            v.frame(t, 0.016)
        });
    });
    c.bench_function("triangles_500_pages", |b| {
        b.iter(|| collect_triangles(v.book(), v.rig(), 320, 160).len());
    });
    let (width, height) = (320usize, 160usize);
    let mut buf = vec![0u8; width * height * 4];
    c.bench_function("render_320x160", |b| {
        b.iter(|| render_viewer(&v, Color::WHITE, &mut buf, width, height, width * 4));
    });
}

criterion_group!(benches, bench_frames);
criterion_main!(benches);
