// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: flipbook core library
//!
//! Page-turn animation engine for a skinned, bendable stack of sheets,
//! with viewport fitting, gesture handling and a software renderer.

pub mod book;
pub mod camera;
pub mod config;
pub mod controls;
pub mod easing;
pub mod error;
pub mod geometry;
pub mod input;
pub mod renderer;
pub mod sheet;
pub mod state;
pub mod texture;
pub mod types;
pub mod viewer;

pub use error::{FlipbookError, Result};
pub use state::BookViewState;
pub use viewer::{FrameSnapshot, Viewer};
