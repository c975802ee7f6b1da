// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Test only helpers: an in-memory output sink, a timeout helper, and the PTY test
//! harness macro.

// Attach.
pub mod deadline;
pub mod generate_pty_test;
pub mod stdout_mock;

// Re-export.
pub use deadline::*;
pub use stdout_mock::*;
