//! Instance fixtures for the step lifecycle tests.

/// Instance identifier returned by scripted `CreateInstance` calls.
pub const INSTANCE_ID: &str = "i-build0001";

/// Error code on which `DeleteInstance` is re-sent.
pub const INSTANCE_INITIALIZING: &str = "IncorrectInstanceStatus.Initializing";
