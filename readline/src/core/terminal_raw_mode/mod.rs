// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words termios ICANON ISIG ISTRIP INLCR ICRNL IGNCR IXON IXOFF conin

//! Terminal raw mode for the line editor.
//!
//! This module switches the controlling terminal (or console) into the mode the line
//! editor needs, and restores the exact original mode afterwards.
//!
//! ## Raw Mode vs Cooked Mode
//!
//! **Cooked Mode** (default):
//! - Input is line-buffered (waits for Enter key)
//! - Special characters are interpreted (Ctrl+C sends `SIGINT`, Ctrl+D sends EOF)
//! - Echoing is enabled (typed characters appear on screen)
//!
//! **Line editor raw mode**:
//! - No line buffering, bytes are available immediately
//! - No echo, the editor paints every glyph itself
//! - No signal generating characters, Ctrl+C arrives as byte `3`
//! - Output processing is left alone, so `\n` still maps to `\r\n`
//!
//! This is narrower than `cfmakeraw`. Only these flags are cleared:
//!
//! | flag group   | cleared                                         |
//! |--------------|-------------------------------------------------|
//! | input modes  | `ISTRIP INLCR ICRNL IGNCR IXON IXOFF`           |
//! | local modes  | `ECHO ICANON ISIG`                              |
//! | console mode | `ENABLE_LINE_INPUT ENABLE_ECHO_INPUT` (Windows) |
//!
//! `VMIN=1, VTIME=0` are set on Unix so that a read returns as soon as one byte is
//! available.
//!
//! ## Ownership
//!
//! [`RawModeGuard`] owns the snapshot of the original mode. It is held by exactly one
//! session, restores the snapshot exactly once (explicitly via
//! [`RawModeGuard::restore`], or on drop), and restoring twice is a no-op.
//!
//! ```no_run
//! # #[cfg(unix)]
//! # fn main() -> std::io::Result<()> {
//! use r3bl_readline::{RawModeGuard, get_terminal_fd};
//!
//! {
//!     let _guard = RawModeGuard::new(get_terminal_fd()?)?;
//!     // Terminal is now in line editor raw mode.
//! } // Original mode restored when guard is dropped.
//! # Ok(())
//! # }
//! # #[cfg(not(unix))]
//! # fn main() {}
//! ```
//!
//! ## Platform Support
//!
//! - **Unix/Linux/macOS**: rustix's safe termios API. When stdin is redirected the
//!   controlling terminal is opened via `/dev/tty`.
//! - **Windows**: `GetConsoleMode` / `SetConsoleMode` on the console input handle.

#[cfg(unix)]
mod raw_mode_unix;

#[cfg(windows)]
mod raw_mode_windows;

// Re-export the public API (flat, ergonomic surface).
#[cfg(unix)]
pub use raw_mode_unix::*;
#[cfg(windows)]
pub use raw_mode_windows::*;
