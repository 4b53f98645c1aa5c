// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
//! Module: error types for the I/O-shaped edges of the engine

use thiserror::Error;

/// Errors surfaced by config loading, texture decoding and host capabilities.
///
/// Animation and state updates never fail; they clamp instead.
#[derive(Debug, Error)]
pub enum FlipbookError {
    /// Config document could not be parsed.
    #[error("invalid viewer config: {0}")]
    Config(#[from] serde_json::Error),

    /// Reading an input stream failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A page source looked like a data URL but was malformed.
    #[error("malformed data url: {0}")]
    DataUrl(String),

    /// Base64 payload of a data URL was invalid.
    #[error("invalid base64 payload: {0}")]
    Base64(#[from] base64::DecodeError),

    /// Bitmap decoding failed.
    #[error("image decode failed: {0}")]
    Image(#[from] image::ImageError),

    /// The host does not provide the requested capability.
    #[error("{0} is not supported on this platform")]
    Unsupported(&'static str),

    /// The host reported a failure while performing a request.
    #[error("platform request failed: {0}")]
    Platform(String),
}

/// Result alias used across the crate.
pub type Result<T> = std::result::Result<T, FlipbookError>;
