// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Ambient infrastructure shared by the line editor: declarative macros, logging setup,
//! terminal raw mode, and test fixtures.

// Attach.
pub mod decl_macros;
pub mod log;
pub mod terminal_raw_mode;

#[cfg(test)]
pub mod test_fixtures;

// Re-export.
pub use log::*;
pub use terminal_raw_mode::*;
