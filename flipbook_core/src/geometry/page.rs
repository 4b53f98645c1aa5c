// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: shared skinned page mesh

use crate::config::PageConfig;
use glam::{Vec2, Vec3};

/// Influences stored per vertex; only the first two are ever non-zero.
pub const INFLUENCES: usize = 4;

/// Faces of the sheet box, in material-group order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Face {
    /// Leading edge (+x)
    EdgeRight,
    /// Spine edge (-x)
    EdgeLeft,
    /// Top edge (+y)
    EdgeTop,
    /// Bottom edge (-y)
    EdgeBottom,
    /// Front image (+z)
    Front,
    /// Back image (-z)
    Back,
}

impl Face {
    /// All faces in group order.
    pub const ALL: [Face; 6] = [
        Face::EdgeRight,
        Face::EdgeLeft,
        Face::EdgeTop,
        Face::EdgeBottom,
        Face::Front,
        Face::Back,
    ];
}

/// Contiguous run of indices drawn with one surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FaceGroup {
    /// First index in [`PageGeometry::indices`]
    pub start: usize,
    /// Number of indices
    pub count: usize,
    /// Face the run belongs to
    pub face: Face,
}

/// Subdivided box shared by every sheet, with per-vertex skin data.
///
/// The box is shifted so the spine sits at `x = 0` and the sheet extends
/// along `+x`. Sheets differ only in bone rotations and surfaces.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageGeometry {
    /// Vertex positions in bind pose
    pub positions: Vec<Vec3>,
    /// Vertex normals in bind pose
    pub normals: Vec<Vec3>,
    /// Texture coordinates
    pub uvs: Vec<Vec2>,
    /// Bone indices per vertex
    pub skin_indices: Vec<[u16; INFLUENCES]>,
    /// Bone weights per vertex
    pub skin_weights: Vec<[f32; INFLUENCES]>,
    /// Triangle list
    pub indices: Vec<u32>,
    /// Per-face index runs
    pub groups: Vec<FaceGroup>,
    /// Width of one bending segment
    pub segment_width: f32,
    /// Bones expected by the skin data
    pub bone_count: usize,
}

struct PlaneSpec {
    u: usize,
    v: usize,
    w: usize,
    udir: f32,
    vdir: f32,
    width: f32,
    height: f32,
    depth: f32,
    grid_x: u32,
    grid_y: u32,
    face: Face,
}

impl PageGeometry {
    /// Build the mesh for the given page dimensions.
    pub fn build(page: &PageConfig) -> Self {
        let (w, h, d) = (page.width, page.height, page.depth);
        let ws = page.segments.max(1);
        let hs = page.height_segments.max(1);
        #[rustfmt::skip]
        let planes = [
            PlaneSpec { u: 2, v: 1, w: 0, udir: -1.0, vdir: -1.0, width: d, height: h, depth: w, grid_x: 1, grid_y: hs, face: Face::EdgeRight },
            PlaneSpec { u: 2, v: 1, w: 0, udir: 1.0, vdir: -1.0, width: d, height: h, depth: -w, grid_x: 1, grid_y: hs, face: Face::EdgeLeft },
            PlaneSpec { u: 0, v: 2, w: 1, udir: 1.0, vdir: 1.0, width: w, height: d, depth: h, grid_x: ws, grid_y: 1, face: Face::EdgeTop },
            PlaneSpec { u: 0, v: 2, w: 1, udir: 1.0, vdir: -1.0, width: w, height: d, depth: -h, grid_x: ws, grid_y: 1, face: Face::EdgeBottom },
            PlaneSpec { u: 0, v: 1, w: 2, udir: 1.0, vdir: -1.0, width: w, height: h, depth: d, grid_x: ws, grid_y: hs, face: Face::Front },
            PlaneSpec { u: 0, v: 1, w: 2, udir: -1.0, vdir: -1.0, width: w, height: h, depth: -d, grid_x: ws, grid_y: hs, face: Face::Back },
        ];

        let mut geo = PageGeometry {
            segment_width: page.segment_width(),
            bone_count: page.bone_count(),
            ..Default::default()
        };
        for plane in &planes {
            geo.push_plane(plane);
        }
        let shift = Vec3::new(w / 2.0, 0.0, 0.0);
        for p in &mut geo.positions {
            *p += shift;
        }
        geo.compute_skin();
        geo
    }

    fn push_plane(&mut self, p: &PlaneSpec) {
        let offset = self.positions.len() as u32;
        let start = self.indices.len();
        let seg_w = p.width / p.grid_x as f32;
        let seg_h = p.height / p.grid_y as f32;
        let (half_w, half_h, half_d) = (p.width / 2.0, p.height / 2.0, p.depth / 2.0);
        let gx1 = p.grid_x + 1;
        let normal_sign = if p.depth > 0.0 { 1.0 } else { -1.0 };

        for iy in 0..=p.grid_y {
            let y = iy as f32 * seg_h - half_h;
            for ix in 0..=p.grid_x {
                let x = ix as f32 * seg_w - half_w;
                let mut pos = [0.0f32; 3];
                pos[p.u] = x * p.udir;
                pos[p.v] = y * p.vdir;
                pos[p.w] = half_d;
                let mut normal = [0.0f32; 3];
                normal[p.w] = normal_sign;
                self.positions.push(Vec3::from_array(pos));
                self.normals.push(Vec3::from_array(normal));
                self.uvs.push(Vec2::new(
                    ix as f32 / p.grid_x as f32,
                    1.0 - iy as f32 / p.grid_y as f32,
                ));
            }
        }

        for iy in 0..p.grid_y {
            for ix in 0..p.grid_x {
                let a = offset + ix + gx1 * iy;
                let b = offset + ix + gx1 * (iy + 1);
                let c = offset + ix + 1 + gx1 * (iy + 1);
                let d = offset + ix + 1 + gx1 * iy;
                self.indices.extend_from_slice(&[a, b, d, b, c, d]);
            }
        }

        self.groups.push(FaceGroup {
            start,
            count: self.indices.len() - start,
            face: p.face,
        });
    }

    fn compute_skin(&mut self) {
        let last_bone = (self.bone_count - 1) as u16;
        self.skin_indices.clear();
        self.skin_weights.clear();
        for p in &self.positions {
            let (bone, weight) = skin_for_x(p.x, self.segment_width);
            let bone = (bone as u16).min(last_bone);
            let next = (bone + 1).min(last_bone);
            self.skin_indices.push([bone, next, 0, 0]);
            self.skin_weights.push([1.0 - weight, weight, 0.0, 0.0]);
        }
    }

    /// Number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Index run for a face.
    pub fn group(&self, face: Face) -> Option<&FaceGroup> {
        self.groups.iter().find(|g| g.face == face)
    }
}

/// Bone index and blend weight for a vertex at `x` along the sheet.
pub fn skin_for_x(x: f32, segment_width: f32) -> (usize, f32) {
    if segment_width <= 0.0 {
        return (0, 0.0);
    }
    let bone = (x / segment_width).floor().max(0.0) as usize;
    let weight = (x % segment_width) / segment_width;
    (bone, weight.clamp(0.0, 1.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_and_index_counts() {
        let page = PageConfig::default();
        let geo = PageGeometry::build(&page);
        // (30+1)*(2+1) per large face, (1+1)*(2+1) per side edge, (30+1)*2 per top edge
        let expected = 2 * 93 + 2 * 6 + 2 * 62;
        assert_eq!(geo.vertex_count(), expected);
        assert_eq!(geo.skin_indices.len(), expected);
        assert_eq!(geo.indices.len() % 3, 0);
        assert_eq!(geo.groups.len(), 6);
    }

    #[test]
    fn spine_at_origin() {
        let geo = PageGeometry::build(&PageConfig::default());
        let min_x = geo.positions.iter().map(|p| p.x).fold(f32::MAX, f32::min);
        let max_x = geo.positions.iter().map(|p| p.x).fold(f32::MIN, f32::max);
        assert!(min_x.abs() < 1e-6);
        assert!((max_x - 1.28).abs() < 1e-5);
    }

    #[test]
    fn weights_sum_to_one() {
        let geo = PageGeometry::build(&PageConfig::default());
        for (w, idx) in geo.skin_weights.iter().zip(&geo.skin_indices) {
            assert!((w[0] + w[1] - 1.0).abs() < 1e-5);
            assert_eq!(w[2], 0.0);
            assert!((idx[1] as usize) < geo.bone_count);
        }
    }

    #[test]
    fn skin_mid_segment() {
        let (bone, weight) = skin_for_x(0.25, 0.1);
        assert_eq!(bone, 2);
        assert!((weight - 0.5).abs() < 1e-4);
        assert_eq!(skin_for_x(-0.5, 0.1).0, 0);
    }

    #[test]
    fn front_and_back_face_opposite_ways() {
        let geo = PageGeometry::build(&PageConfig::default());
        let front = geo.group(Face::Front).unwrap();
        let back = geo.group(Face::Back).unwrap();
        let fi = geo.indices[front.start] as usize;
        let bi = geo.indices[back.start] as usize;
        assert_eq!(geo.normals[fi], Vec3::Z);
        assert_eq!(geo.normals[bi], Vec3::NEG_Z);
    }
}
