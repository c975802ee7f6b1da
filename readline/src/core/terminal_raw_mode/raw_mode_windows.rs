// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words conin

//! Windows implementation of raw mode using the console API directly.
//!
//! Only `ENABLE_LINE_INPUT` and `ENABLE_ECHO_INPUT` are cleared. `ENABLE_PROCESSED_INPUT`
//! is left as is, so Ctrl+C is delivered to the console control handler installed by the
//! cancellation watcher. `ENABLE_WINDOW_INPUT` is set so buffer size changes show up as
//! input records.

use std::io;
use windows_sys::Win32::{Foundation::HANDLE,
                         System::Console::{CONSOLE_MODE, ENABLE_ECHO_INPUT,
                                           ENABLE_LINE_INPUT, ENABLE_WINDOW_INPUT,
                                           GetConsoleMode, SetConsoleMode}};

/// Clears exactly the console input flags the line editor needs cleared, and asks for
/// window buffer size records.
#[must_use]
pub fn apply_line_editor_flags(mode: CONSOLE_MODE) -> CONSOLE_MODE {
    (mode | ENABLE_WINDOW_INPUT) & !(ENABLE_ECHO_INPUT | ENABLE_LINE_INPUT)
}

/// Reads the console mode of `handle`. Fails if `handle` is not a console.
///
/// # Errors
///
/// Returns the last OS error when `GetConsoleMode` fails.
pub fn get_console_mode(handle: HANDLE) -> io::Result<CONSOLE_MODE> {
    let mut mode: CONSOLE_MODE = 0;
    // SAFETY: `mode` is a valid out pointer for the duration of the call.
    let ok = unsafe { GetConsoleMode(handle, &raw mut mode) };
    if ok == 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(mode)
}

fn set_console_mode(handle: HANDLE, mode: CONSOLE_MODE) -> io::Result<()> {
    // SAFETY: plain value arguments, the handle is owned by the caller.
    let ok = unsafe { SetConsoleMode(handle, mode) };
    if ok == 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// RAII guard that owns the snapshot of the console input mode, and restores it exactly
/// once.
///
/// The handle itself is owned by the session (it may be a `CONIN$` file the session
/// opened), so the guard must be dropped before that handle is closed.
#[derive(Debug)]
pub struct RawModeGuard {
    input: HANDLE,
    /// `None` once restored.
    original: Option<CONSOLE_MODE>,
}

impl RawModeGuard {
    /// Snapshot the current console mode of `input`, then clear line input and echo.
    ///
    /// # Errors
    ///
    /// Returns an error if `input` is not a console handle or the mode can't be set.
    pub fn new(input: HANDLE) -> io::Result<Self> {
        let original = get_console_mode(input)?;
        set_console_mode(input, apply_line_editor_flags(original))?;
        tracing::debug!(message = "console raw mode enabled", original);
        Ok(Self {
            input,
            original: Some(original),
        })
    }

    #[must_use]
    pub fn is_restored(&self) -> bool { self.original.is_none() }

    /// Restore the original console mode. Only the first call touches the console.
    ///
    /// # Errors
    ///
    /// Returns an error if `SetConsoleMode` fails.
    pub fn restore(&mut self) -> io::Result<()> {
        let Some(original) = self.original.take() else {
            return Ok(());
        };
        set_console_mode(self.input, original)?;
        tracing::debug!(message = "console raw mode restored");
        Ok(())
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(err) = self.restore() {
            tracing::warn!(message = "failed to restore console mode on drop", ?err);
        }
    }
}
