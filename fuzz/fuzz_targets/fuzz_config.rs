// Copyright © SoftOboros Technology, Inc.
// SPDX-License-Identifier: MIT
#![no_main]
use flipbook_core::config;
use flipbook_core::types::Viewport;
use flipbook_core::Viewer;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if let Ok(cfg) = config::from_slice(data) {
        // any accepted config must survive a session
        let mut viewer = Viewer::new(cfg, Viewport::default());
        viewer.set_requested_page(3);
        viewer.frame(0.0, 0.016);
    }
});
