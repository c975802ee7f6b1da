// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Keeps the screen consistent with the [`LineBuffer`] across wrapped rows, using only
//! relative cursor motion.
//!
//! The terminal never says where its cursor is. The only memory the engine has of the
//! screen is what it last wrote: how many rows the block occupies, and which of those
//! rows the cursor was left on. Every render starts by going back to the top-left of
//! that block, then either repaints it (dirty) or only repositions the cursor.
//!
//! ```text
//! width = 10, prompt = "> ", buffer = "hello world", cursor = 3
//!
//! row 0  > hello wo      ◀── block origin (column 0 of row 0)
//!             ▲
//!             └── cursor = 3 is at (col 5, row 0), over the second "l"
//! row 1  rld
//! ```
//!
//! - [`layout`]: the layout walk ([`compute_layout()`]).
//! - [`render_op`]: [`RenderOp`]s and their ANSI rendition ([`paint_ansi()`]).
//! - [`display_engine`]: [`DisplayEngine`], which turns a layout plus its remembered
//!   state into render ops.
//!
//! [`LineBuffer`]: crate::LineBuffer

// Attach.
pub mod display_engine;
pub mod layout;
pub mod render_op;

// Re-export.
pub use display_engine::*;
pub use layout::*;
pub use render_op::*;
