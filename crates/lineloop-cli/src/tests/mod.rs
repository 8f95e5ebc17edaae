//! Crate-level tests for the client runtime.
