// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: rendering backends

pub mod cpu;
pub use cpu::*;

pub mod wasm;
