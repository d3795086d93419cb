//! Shared constants for integration tests.
//!
//! Integration tests are compiled as separate crates (one per top-level file in
//! `tests/`). Placing shared constants under `tests/common/` avoids creating an
//! additional integration test binary while still allowing reuse via:
//!
//! ```rust
//! #[path = "common/test_constants.rs"]
//! mod test_constants;
//! ```

use std::time::Duration;

/// Error code on which `CreateInstance` is re-sent.
pub const IDEMPOTENT_PROCESSING: &str = "IdempotentProcessing";

/// Retry interval short enough to keep tests fast.
pub const FAST_INTERVAL: Duration = Duration::from_millis(1);
