//! Handler integration tests
//!
//! Tests for fan-out forwarding, enablement, attribute/group propagation,
//! and the console + file failure scenarios.

mod encoding;
