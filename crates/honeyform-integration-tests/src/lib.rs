//! Integration test crate for honeyform.
//!
//! This crate has no library code; it only contains integration tests
//! that exercise the render → submit cycle across the workspace crates.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p honeyform-integration-tests
//! ```
