// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words conin conout

//! The terminal session contract and its two platform variants.
//!
//! A session owns the terminal (or console) for the duration of one line read:
//!
//! 1. `open()` snapshots the mode and switches to raw mode, see
//!    [`terminal_raw_mode`].
//! 2. [`TerminalSession::read_keys()`] blocks until one underlying read produced at
//!    least one code point, the input closed, or the [`CancellationToken`] woke it.
//! 3. [`TerminalSession::paint()`] and [`TerminalSession::write_all()`] write to the
//!    display.
//! 4. [`TerminalSession::close()`] restores the snapshot. It is idempotent and also runs
//!    on drop, so every exit path restores the terminal.
//!
//! | variant          | input                                   | output                    |
//! |------------------|-----------------------------------------|---------------------------|
//! | [`PosixSession`] | tty bytes via `read(2)`, `mio` wakeups  | ANSI bytes                |
//! | `ConsoleSession` | `ReadConsoleInputW` key records         | console cursor/fill calls |
//!
//! The variant is picked at compile time by target platform, see [`PlatformSession`].
//!
//! [`terminal_raw_mode`]: mod@crate::core::terminal_raw_mode
//! [`CancellationToken`]: crate::CancellationToken

#[cfg(unix)]
mod session_posix;
#[cfg(windows)]
mod session_windows;


#[cfg(unix)]
pub use session_posix::*;
#[cfg(windows)]
pub use session_windows::*;

use crate::{KeyBatch, ReadlineError, RenderOp, render_op_to_ansi};
use std::io;

/// The session variant for the platform being compiled for.
#[cfg(unix)]
pub type PlatformSession = PosixSession;
#[cfg(windows)]
pub type PlatformSession = ConsoleSession;

/// Result of one blocking read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// Code points from a single underlying read, in order.
    Keys(KeyBatch),
    /// The input stream was closed.
    EndOfInput,
    /// The read was woken by the cancellation token.
    Interrupted,
}

/// One raw-mode terminal session. See the [module documentation] for the lifecycle.
///
/// [module documentation]: mod@crate::readline::session
pub trait TerminalSession {
    /// Block until a decoded key batch, end of input, or a cancellation wakeup.
    ///
    /// # Errors
    ///
    /// [`ReadlineError::Io`] if the underlying read fails.
    fn read_keys(&mut self) -> Result<SessionEvent, ReadlineError>;

    /// Write `bytes` to the display and flush. Not retried.
    ///
    /// # Errors
    ///
    /// [`ReadlineError::Io`] if the write fails.
    fn write_all(&mut self, bytes: &[u8]) -> Result<(), ReadlineError>;

    /// Execute render ops. The default writes their ANSI rendition with
    /// [`TerminalSession::write_all()`].
    ///
    /// # Errors
    ///
    /// [`ReadlineError::Io`] if the write fails.
    fn paint(&mut self, ops: &[RenderOp]) -> Result<(), ReadlineError> {
        let mut acc = String::new();
        for op in ops {
            render_op_to_ansi(op, &mut acc).map_err(io::Error::other)?;
        }
        self.write_all(acc.as_bytes())
    }

    /// Columns, as last reported by the platform. `None` if unknown.
    fn terminal_width(&self) -> Option<u16>;

    /// Restore the terminal mode. Only the first call has any effect.
    ///
    /// # Errors
    ///
    /// [`ReadlineError::Mode`] if the mode can't be restored.
    fn close(&mut self) -> Result<(), ReadlineError>;
}
