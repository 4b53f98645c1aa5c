// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: bone chain posing and CPU skinning

use super::page::{PageGeometry, INFLUENCES};
use glam::{Affine3A, EulerRot, Quat, Vec3};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Inline capacity covering the default 31-bone chain.
pub const INLINE_BONES: usize = 32;

/// Local rotation of one bone.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct BoneRotation {
    /// Turn angle around local Y, radians
    pub turn: f32,
    /// Fold angle around local X, radians
    pub fold: f32,
}

impl BoneRotation {
    /// Quaternion for this rotation (X then Y, intrinsic).
    pub fn quat(self) -> Quat {
        Quat::from_euler(EulerRot::XYZ, self.fold, self.turn, 0.0)
    }
}

/// World transforms for every bone of one sheet.
#[derive(Debug, Clone, Default)]
pub struct Pose {
    /// Bone transforms, bone 0 first
    pub bones: SmallVec<[Affine3A; INLINE_BONES]>,
    /// Segment width the chain was posed with
    pub segment_width: f32,
}

/// Pose a bone chain.
///
/// Bone 0 sits at the spine, rotated by `rotations[0]`, with the sheet pushed
/// `depth_offset` along its own z axis. Each following bone hangs one segment
/// further along the parent's +x.
pub fn pose(rotations: &[BoneRotation], segment_width: f32, depth_offset: f32) -> Pose {
    let mut bones: SmallVec<[Affine3A; INLINE_BONES]> = SmallVec::with_capacity(rotations.len());
    let step = Affine3A::from_translation(Vec3::new(segment_width, 0.0, 0.0));
    for (i, rot) in rotations.iter().enumerate() {
        let transform = if i == 0 {
            Affine3A::from_quat(rot.quat())
                * Affine3A::from_translation(Vec3::new(0.0, 0.0, depth_offset))
        } else {
            bones[i - 1] * step * Affine3A::from_quat(rot.quat())
        };
        bones.push(transform);
    }
    Pose {
        bones,
        segment_width,
    }
}

impl Pose {
    /// Deform a bind-pose point with the given influences.
    pub fn skin_point(&self, p: Vec3, indices: &[u16; INFLUENCES], weights: &[f32; INFLUENCES]) -> Vec3 {
        let mut out = Vec3::ZERO;
        let mut total = 0.0;
        for (&bone, &weight) in indices.iter().zip(weights) {
            if weight == 0.0 {
                continue;
            }
            let Some(transform) = self.bones.get(bone as usize) else {
                continue;
            };
            let bind = Vec3::new(bone as f32 * self.segment_width, 0.0, 0.0);
            out += transform.transform_point3(p - bind) * weight;
            total += weight;
        }
        if total > 0.0 {
            out / total
        } else {
            p
        }
    }

    /// Deform every vertex of the shared geometry.
    pub fn skin(&self, geometry: &PageGeometry) -> Vec<Vec3> {
        geometry
            .positions
            .iter()
            .zip(geometry.skin_indices.iter().zip(&geometry.skin_weights))
            .map(|(p, (idx, w))| self.skin_point(*p, idx, w))
            .collect()
    }

    /// World position of the free end of the chain: the origin of the last
    /// bone, which sits on the leading page edge.
    pub fn tip(&self) -> Vec3 {
        self.bones
            .last()
            .map(|b| b.transform_point3(Vec3::ZERO))
            .unwrap_or(Vec3::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::PageConfig;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn rest_pose_is_identity_skinning() {
        let page = PageConfig::default();
        let geo = PageGeometry::build(&page);
        let rotations = vec![BoneRotation::default(); page.bone_count()];
        let posed = pose(&rotations, page.segment_width(), 0.0);
        let skinned = posed.skin(&geo);
        for (a, b) in skinned.iter().zip(&geo.positions) {
            assert!((*a - *b).length() < 1e-5);
        }
    }

    #[test]
    fn root_rotation_swings_whole_sheet() {
        let page = PageConfig::default();
        let mut rotations = vec![BoneRotation::default(); page.bone_count()];
        rotations[0].turn = FRAC_PI_2;
        let posed = pose(&rotations, page.segment_width(), 0.0);
        let tip = posed.tip();
        // +x rotated a quarter turn about y lands on -z
        assert!(tip.x.abs() < 1e-4);
        assert!((tip.z + page.width).abs() < 1e-3);
    }

    #[test]
    fn flat_tip_lands_on_page_edge() {
        let page = PageConfig::default();
        let rotations = vec![BoneRotation::default(); page.bone_count()];
        let tip = pose(&rotations, page.segment_width(), 0.0).tip();
        assert!((tip.x - page.width).abs() < 1e-4);
        assert_eq!(pose(&[], 0.5, 0.0).tip(), Vec3::ZERO);
    }

    #[test]
    fn depth_offset_moves_along_sheet_normal() {
        let rotations = vec![BoneRotation::default(); 3];
        let posed = pose(&rotations, 0.5, 0.1);
        let p = posed.skin_point(Vec3::new(0.25, 0.0, 0.0), &[0, 1, 0, 0], &[0.5, 0.5, 0.0, 0.0]);
        assert!((p.z - 0.1).abs() < 1e-6);
        assert!((p.x - 0.25).abs() < 1e-6);
    }

    #[test]
    fn bending_a_middle_bone_lifts_the_tip() {
        let mut rotations = vec![BoneRotation::default(); 5];
        rotations[2].turn = -0.5;
        let posed = pose(&rotations, 1.0, 0.0);
        assert!(posed.tip().z > 0.5);
    }
}
