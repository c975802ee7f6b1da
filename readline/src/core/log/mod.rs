// Copyright (c) 2024-2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Tracing setup for programs that embed the line editor.
//!
//! The editor owns stdout while a line is being read, so log output goes to a file or
//! to stderr, never to stdout. See [`TracingConfig`] and
//! [`try_initialize_logging_global`].

// Attach sources.
pub mod rolling_file_appender_impl;
pub mod tracing_config;
pub mod tracing_init;

// Re-export.
pub use rolling_file_appender_impl::*;
pub use tracing_config::*;
pub use tracing_init::*;
