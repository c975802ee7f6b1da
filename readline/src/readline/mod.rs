// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The line editor: edit loop, edit engine, completion, display, and the terminal
//! sessions it runs on. See the [crate documentation] for the architecture.
//!
//! [crate documentation]: crate

// Attach.
pub mod cancellation;
pub mod completion;
pub mod config;
pub mod display;
pub mod error;
pub mod input_decoder;
pub mod line_buffer;
pub mod readline_loop;
pub mod session;

// Re-export.
pub use cancellation::*;
pub use completion::*;
pub use config::*;
pub use display::*;
pub use error::*;
pub use input_decoder::*;
pub use line_buffer::*;
pub use readline_loop::*;
pub use session::*;
