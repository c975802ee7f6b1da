// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words termios ICANON ISIG ISTRIP INLCR ICRNL IGNCR IXON IXOFF VMIN VTIME

//! Unix/Linux/macOS implementation of raw mode using rustix's safe termios API.

use rustix::{fd::{AsFd, BorrowedFd},
             termios::{self, InputModes, LocalModes, OptionalActions, SpecialCodeIndex,
                       Termios}};
use std::{fs::File, io};

/// Represents either stdin or `/dev/tty` for terminal operations.
///
/// This enum allows us to handle both cases where stdin is a tty (normal terminal usage)
/// and where stdin is redirected (e.g., piped input), requiring us to use `/dev/tty`.
#[derive(Debug)]
pub enum TerminalFd {
    /// Using standard input (when it's a terminal).
    Stdin(io::Stdin),
    /// Using `/dev/tty` (when stdin is redirected).
    DevTty(File),
}

impl TerminalFd {
    #[must_use]
    pub fn is_dev_tty(&self) -> bool { matches!(self, TerminalFd::DevTty(_)) }
}

impl AsFd for TerminalFd {
    fn as_fd(&self) -> BorrowedFd<'_> {
        match self {
            TerminalFd::Stdin(stdin) => stdin.as_fd(),
            TerminalFd::DevTty(file) => file.as_fd(),
        }
    }
}

/// Gets a file descriptor for the controlling terminal.
///
/// Checks if stdin is a tty and uses it if so; otherwise opens `/dev/tty`. This handles
/// cases where stdin is redirected.
///
/// # Errors
///
/// Returns an error if stdin is not a tty and `/dev/tty` cannot be opened.
pub fn get_terminal_fd() -> io::Result<TerminalFd> {
    let stdin = io::stdin();
    if termios::isatty(&stdin) {
        Ok(TerminalFd::Stdin(stdin))
    } else {
        Ok(TerminalFd::DevTty(open_dev_tty()?))
    }
}

/// Opens the controlling terminal for reading and writing.
///
/// # Errors
///
/// Returns an error if the process has no controlling terminal.
pub fn open_dev_tty() -> io::Result<File> {
    File::options().read(true).write(true).open("/dev/tty")
}

/// Clears exactly the flags the line editor needs cleared, and asks for byte-at-a-time
/// reads. See the [module documentation] for the flag table.
///
/// [module documentation]: mod@crate::core::terminal_raw_mode
pub fn apply_line_editor_flags(termios: &mut Termios) {
    termios.input_modes.remove(
        InputModes::ISTRIP
            | InputModes::INLCR
            | InputModes::ICRNL
            | InputModes::IGNCR
            | InputModes::IXON
            | InputModes::IXOFF,
    );
    termios
        .local_modes
        .remove(LocalModes::ECHO | LocalModes::ICANON | LocalModes::ISIG);
    termios.special_codes[SpecialCodeIndex::VMIN] = 1;
    termios.special_codes[SpecialCodeIndex::VTIME] = 0;
}

/// RAII guard that owns the controlling terminal and the snapshot of its original
/// termios, and restores that snapshot exactly once.
#[derive(Debug)]
pub struct RawModeGuard {
    terminal: TerminalFd,
    /// `None` once restored.
    original: Option<Termios>,
}

impl RawModeGuard {
    /// Snapshot the current termios of `terminal`, then switch it to line editor raw
    /// mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal attributes can't be retrieved or set (e.g. the
    /// fd is not a terminal).
    pub fn new(terminal: TerminalFd) -> io::Result<Self> {
        let original = termios::tcgetattr(&terminal)?;

        let mut raw = original.clone();
        apply_line_editor_flags(&mut raw);
        termios::tcsetattr(&terminal, OptionalActions::Now, &raw)?;

        tracing::debug!(
            message = "raw mode enabled",
            dev_tty = terminal.is_dev_tty()
        );

        Ok(Self {
            terminal,
            original: Some(original),
        })
    }

    /// The terminal this guard owns. Reads and writes go through it.
    #[must_use]
    pub fn terminal(&self) -> &TerminalFd { &self.terminal }

    #[must_use]
    pub fn is_restored(&self) -> bool { self.original.is_none() }

    /// Restore the original termios. Safe to call more than once; only the first call
    /// touches the terminal.
    ///
    /// # Errors
    ///
    /// Returns an error if the terminal attributes can't be set.
    pub fn restore(&mut self) -> io::Result<()> {
        let Some(original) = self.original.take() else {
            return Ok(());
        };
        termios::tcsetattr(&self.terminal, OptionalActions::Now, &original)?;
        tracing::debug!(message = "raw mode restored");
        Ok(())
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        if let Err(err) = self.restore() {
            tracing::warn!(message = "failed to restore terminal mode on drop", ?err);
        }
    }
}
