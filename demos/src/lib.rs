// Copyright 2026 the Tapeline Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Runnable demos for the Tapeline crates.
//!
//! See the `examples/` directory; start with `tape_measure`.
