// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: software rasterizer
//!
//! Skins every sheet on the CPU, applies the book and camera transforms and
//! projects orthographically onto an RGBA8888 buffer. Triangles are sorted
//! by depth and painted back to front.

use crate::book::Book;
use crate::camera::CameraRig;
use crate::geometry::Face;
use crate::texture::{SheetSurfaces, TextureCache};
use crate::types::{Color, Viewport};
use crate::viewer::Viewer;
use glam::{Vec2, Vec3};

/// One projected triangle ready for filling.
#[derive(Debug, Clone, Copy)]
pub struct ScreenTriangle {
    /// Pixel-space corners
    pub points: [Vec2; 3],
    /// Texture coordinates per corner
    pub uvs: [Vec2; 3],
    /// Mean view-space depth, larger is nearer
    pub depth: f32,
    /// Sheet the triangle belongs to
    pub sheet: usize,
    /// Face the triangle belongs to
    pub face: Face,
}

/// Map a world point onto the pixel grid. `z` passes through as depth.
pub fn project(p: Vec3, viewport: &Viewport, width: usize, height: usize) -> Vec3 {
    let w = viewport.world_width.max(f32::EPSILON);
    let h = viewport.world_height.max(f32::EPSILON);
    Vec3::new(
        (p.x / w + 0.5) * width as f32,
        (0.5 - p.y / h) * height as f32,
        p.z,
    )
}

/// Skin, transform and project every sheet, sorted back to front.
pub fn collect_triangles(book: &Book, rig: &CameraRig, width: usize, height: usize) -> Vec<ScreenTriangle> {
    let geometry = book.geometry();
    let segment_width = book.page_config().segment_width();
    let world = rig.transform() * book.root_transform();
    let viewport = rig.viewport();
    let mut out = Vec::with_capacity(book.sheet_count() * geometry.indices.len() / 3);

    for sheet in book.sheets() {
        let skinned = sheet.pose(segment_width).skin(geometry);
        let projected: Vec<Vec3> = skinned
            .iter()
            .map(|p| project(world.transform_point3(*p), viewport, width, height))
            .collect();
        for group in &geometry.groups {
            let range = group.start..group.start + group.count;
            for tri in geometry.indices[range].chunks_exact(3) {
                let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
                out.push(ScreenTriangle {
                    points: [projected[a].truncate(), projected[b].truncate(), projected[c].truncate()],
                    uvs: [geometry.uvs[a], geometry.uvs[b], geometry.uvs[c]],
                    depth: (projected[a].z + projected[b].z + projected[c].z) / 3.0,
                    sheet: sheet.index(),
                    face: group.face,
                });
            }
        }
    }
    out.sort_by(|l, r| l.depth.total_cmp(&r.depth));
    out
}

/// Draw the book into the RGBA8888 buffer over a solid background.
#[allow(clippy::too_many_arguments)]
pub fn render_book(
    book: &Book,
    rig: &CameraRig,
    textures: &TextureCache,
    background: Color,
    buffer: &mut [u8],
    width: usize,
    height: usize,
    stride: usize,
) {
    clear(buffer, width, height, stride, background);
    let surfaces: Vec<SheetSurfaces> = book.sheets().iter().map(|s| s.surfaces(textures)).collect();
    for tri in collect_triangles(book, rig, width, height) {
        let Some(sheet) = surfaces.get(tri.sheet) else {
            continue;
        };
        fill_triangle_textured(&tri, sheet, buffer, width, height, stride);
    }
}

/// Draw the viewer's current frame.
pub fn render_viewer(viewer: &Viewer, background: Color, buffer: &mut [u8], width: usize, height: usize, stride: usize) {
    render_book(
        viewer.book(),
        viewer.rig(),
        viewer.textures(),
        background,
        buffer,
        width,
        height,
        stride,
    );
}

fn clear(buffer: &mut [u8], width: usize, height: usize, stride: usize, color: Color) {
    for y in 0..height {
        for x in 0..width {
            let o = y * stride + x * 4;
            if o + 3 >= buffer.len() {
                return;
            }
            buffer[o..o + 4].copy_from_slice(&[color.r, color.g, color.b, color.a]);
        }
    }
}

fn fill_triangle_textured(
    tri: &ScreenTriangle,
    surfaces: &SheetSurfaces,
    buf: &mut [u8],
    width: usize,
    height: usize,
    stride: usize,
) {
    let [a, b, c] = tri.points;
    let area = edge(a.x, a.y, b, c);
    if area.abs() < f32::EPSILON {
        return;
    }
    let surface = surfaces.face(tri.face);
    let min_x = a.x.min(b.x).min(c.x).floor().max(0.0) as i32;
    let max_x = a.x.max(b.x).max(c.x).ceil().min(width as f32) as i32;
    let min_y = a.y.min(b.y).min(c.y).floor().max(0.0) as i32;
    let max_y = a.y.max(b.y).max(c.y).ceil().min(height as f32) as i32;

    for y in min_y..max_y {
        for x in min_x..max_x {
            let px = x as f32 + 0.5;
            let py = y as f32 + 0.5;
            if !inside_triangle(px, py, a, b, c) {
                continue;
            }
            let wa = edge(px, py, b, c) / area;
            let wb = edge(px, py, c, a) / area;
            let wc = 1.0 - wa - wb;
            let uv = tri.uvs[0] * wa + tri.uvs[1] * wb + tri.uvs[2] * wc;
            blend_pixel(buf, stride, x as usize, y as usize, surface.sample(uv.x, uv.y));
        }
    }
}

fn edge(px: f32, py: f32, a: Vec2, b: Vec2) -> f32 {
    (px - a.x) * (b.y - a.y) - (py - a.y) * (b.x - a.x)
}

fn inside_triangle(px: f32, py: f32, a: Vec2, b: Vec2, c: Vec2) -> bool {
    let e1 = edge(px, py, a, b);
    let e2 = edge(px, py, b, c);
    let e3 = edge(px, py, c, a);
    (e1 >= 0.0 && e2 >= 0.0 && e3 >= 0.0) || (e1 <= 0.0 && e2 <= 0.0 && e3 <= 0.0)
}

fn blend_pixel(buf: &mut [u8], stride: usize, x: usize, y: usize, src: Color) {
    let offset = y * stride + x * 4;
    if offset + 3 >= buf.len() {
        return;
    }
    let sa = src.a as f32 / 255.0;
    let ia = 1.0 - sa;
    let dst_a = buf[offset + 3] as f32 / 255.0;

    buf[offset] = (src.r as f32 * sa + buf[offset] as f32 * ia).min(255.0) as u8;
    buf[offset + 1] = (src.g as f32 * sa + buf[offset + 1] as f32 * ia).min(255.0) as u8;
    buf[offset + 2] = (src.b as f32 * sa + buf[offset + 2] as f32 * ia).min(255.0) as u8;
    buf[offset + 3] = ((sa + dst_a * ia) * 255.0).min(255.0) as u8;
}
