// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: page mesh and bone chain primitives

mod page;
mod skeleton;

pub use page::{skin_for_x, Face, FaceGroup, PageGeometry, INFLUENCES};
pub use skeleton::{pose, BoneRotation, Pose, INLINE_BONES};
