// Copyright (c) 2025 Graphcore Ltd. All rights reserved.

//! Helpers for tests that want log output.

/// Initialise the test logger.
///
/// Safe to call from every test; only the first call takes effect. Run tests
/// with `RUST_LOG=trace` to see the output.
pub fn init() {
    let _ = env_logger::builder().is_test(true).try_init();
}
