// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use miette::Diagnostic;
use std::io;

/// Errors returned by [`Readline::read_line()`] and [`Readline::read_password()`].
///
/// Every variant ends the current line read. The terminal mode is always restored
/// before the error reaches the caller. A user cancellation (Ctrl+C or an interrupt
/// signal) is not an error, it is `Ok` with an empty string.
///
/// [`Readline::read_line()`]: crate::Readline::read_line
/// [`Readline::read_password()`]: crate::Readline::read_password
#[derive(Debug, thiserror::Error, Diagnostic)]
pub enum ReadlineError {
    /// The terminal (or console) mode could not be queried or set. Raised while opening
    /// a session.
    #[error("failed to query or set the terminal mode")]
    #[diagnostic(
        code(r3bl_readline::mode),
        help("stdin must be an interactive terminal, or /dev/tty (CONIN$ on Windows) must be available")
    )]
    Mode(#[source] io::Error),

    /// A read or write failed in the middle of a session.
    #[error("terminal I/O failed: {0}")]
    #[diagnostic(code(r3bl_readline::io))]
    Io(#[from] io::Error),

    /// The input stream was closed while the line was empty (Ctrl+D, or the tty went
    /// away).
    #[error("end of input")]
    #[diagnostic(
        code(r3bl_readline::end_of_input),
        help("This is expected when the user presses Ctrl+D on an empty line")
    )]
    EndOfInput,
}

impl ReadlineError {
    #[must_use]
    pub fn is_end_of_input(&self) -> bool { matches!(self, ReadlineError::EndOfInput) }
}
