// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words termios tcgetwinsize winsize fionread EINTR

//! POSIX session: termios raw mode, byte reads from the tty, ANSI output.
//!
//! The blocking read waits in [`mio::Poll`] on two sources, the tty and a
//! [`mio::Waker`]. [`CancellationToken::cancel()`] calls the waker, so an interrupt
//! unblocks the read without relying on `EINTR`.
//!
//! `mio` is edge triggered. A paste longer than one read leaves bytes in the tty after
//! the first read that will not produce another readiness event, so `FIONREAD` is
//! checked before going back to sleep in the poll.

use super::{SessionEvent, TerminalSession};
use crate::{ByteDecoder, CancellationToken, RawModeGuard, ReadlineError, READ_BUFFER_SIZE,
            TerminalFd, get_terminal_fd, ok, open_dev_tty};
use mio::{Events, Interest, Poll, Token, Waker, unix::SourceFd};
use rustix::{fd::{AsFd, AsRawFd},
             io::Errno,
             termios};
use std::{fs::File,
          io::{self, ErrorKind, Write},
          sync::Arc};

/// Tokens registered with [`mio::Poll`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SourceKindReady {
    /// The tty has bytes (or hung up).
    Input,
    /// [`CancellationToken::cancel()`] woke the poll.
    Wake,
}

impl SourceKindReady {
    const fn to_token(self) -> Token {
        match self {
            Self::Input => Token(0),
            Self::Wake => Token(1),
        }
    }

    fn from_token(token: Token) -> Option<Self> {
        match token {
            Token(0) => Some(Self::Input),
            Token(1) => Some(Self::Wake),
            _ => None,
        }
    }
}

/// Where painting goes. Never a redirected stdout, the user would be typing blind.
#[derive(Debug)]
enum TerminalOutput {
    Stdout,
    DevTty(File),
}

impl TerminalOutput {
    /// Stdout only when it is the same tty the session reads from.
    fn select(terminal: &TerminalFd) -> io::Result<Self> {
        if !terminal.is_dev_tty() && termios::isatty(io::stdout()) {
            Ok(Self::Stdout)
        } else {
            Ok(Self::DevTty(open_dev_tty()?))
        }
    }

    fn is_dev_tty(&self) -> bool { matches!(self, Self::DevTty(_)) }
}

/// A [`TerminalSession`] on a POSIX tty. Reads from stdin when it is a tty, otherwise
/// from `/dev/tty`. Writes to stdout when it is a tty too, otherwise to `/dev/tty`.
#[derive(Debug)]
pub struct PosixSession {
    guard: RawModeGuard,
    output: TerminalOutput,
    poll: Poll,
    events: Events,
    decoder: ByteDecoder,
    cancellation: CancellationToken,
    width: Option<u16>,
    closed: bool,
}

impl PosixSession {
    /// Snapshot the termios, switch to raw mode, and register the tty and the
    /// cancellation waker with `mio`.
    ///
    /// # Errors
    ///
    /// - [`ReadlineError::Mode`] if there is no tty or its mode can't be set.
    /// - [`ReadlineError::Io`] if the poll can't be created. The mode is restored.
    pub fn open(cancellation: &CancellationToken) -> Result<Self, ReadlineError> {
        let terminal = get_terminal_fd().map_err(ReadlineError::Mode)?;
        let output = TerminalOutput::select(&terminal).map_err(ReadlineError::Mode)?;
        let guard = RawModeGuard::new(terminal).map_err(ReadlineError::Mode)?;

        let poll = Poll::new()?;
        let waker = Arc::new(Waker::new(
            poll.registry(),
            SourceKindReady::Wake.to_token(),
        )?);
        let raw_fd = guard.terminal().as_fd().as_raw_fd();
        poll.registry().register(
            &mut SourceFd(&raw_fd),
            SourceKindReady::Input.to_token(),
            Interest::READABLE,
        )?;

        cancellation.set_waker(move || {
            if let Err(err) = waker.wake() {
                tracing::warn!(message = "failed to wake the blocked read", ?err);
            }
        });

        let width = termios::tcgetwinsize(guard.terminal())
            .ok()
            .map(|winsize| winsize.ws_col)
            .filter(|&cols| cols > 0)
            .or_else(|| {
                crossterm::terminal::size()
                    .ok()
                    .map(|(cols, _)| cols)
                    .filter(|&cols| cols > 0)
            });

        tracing::debug!(
            message = "posix session opened",
            ?width,
            input_dev_tty = guard.terminal().is_dev_tty(),
            output_dev_tty = output.is_dev_tty()
        );

        Ok(Self {
            guard,
            output,
            poll,
            events: Events::with_capacity(4),
            decoder: ByteDecoder::new(),
            cancellation: cancellation.clone(),
            width,
            closed: false,
        })
    }

    fn input_pending(&self) -> bool {
        rustix::io::ioctl_fionread(self.guard.terminal()).is_ok_and(|count| count > 0)
    }

    /// Block in the poll. `None` on `EINTR` or a spurious wakeup.
    fn wait(&mut self) -> Result<Option<SourceKindReady>, ReadlineError> {
        match self.poll.poll(&mut self.events, None) {
            Ok(()) => {}
            Err(err) if err.kind() == ErrorKind::Interrupted => return ok!(None),
            Err(err) => return Err(err.into()),
        }

        let mut ready = None;
        for event in &self.events {
            match SourceKindReady::from_token(event.token()) {
                Some(SourceKindReady::Wake) => return ok!(Some(SourceKindReady::Wake)),
                Some(SourceKindReady::Input) => ready = Some(SourceKindReady::Input),
                None => {}
            }
        }
        ok!(ready)
    }
}

impl TerminalSession for PosixSession {
    fn read_keys(&mut self) -> Result<SessionEvent, ReadlineError> {
        loop {
            if self.cancellation.is_cancelled() {
                return ok!(SessionEvent::Interrupted);
            }

            if !self.input_pending() && self.wait()? != Some(SourceKindReady::Input) {
                continue;
            }

            let mut buf = [0_u8; READ_BUFFER_SIZE];
            match rustix::io::read(self.guard.terminal(), &mut buf[..]) {
                Ok(0) => return ok!(SessionEvent::EndOfInput),
                Ok(count) => {
                    let batch = self.decoder.decode(&buf[..count]);
                    if !batch.is_empty() {
                        return ok!(SessionEvent::Keys(batch));
                    }
                }
                Err(Errno::INTR | Errno::AGAIN) => {}
                Err(errno) => return Err(io::Error::from(errno).into()),
            }
        }
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), ReadlineError> {
        match &self.output {
            TerminalOutput::Stdout => {
                let mut out = io::stdout().lock();
                out.write_all(bytes)?;
                out.flush()?;
            }
            TerminalOutput::DevTty(file) => {
                let mut out = file;
                out.write_all(bytes)?;
                out.flush()?;
            }
        }
        ok!()
    }

    fn terminal_width(&self) -> Option<u16> { self.width }

    fn close(&mut self) -> Result<(), ReadlineError> {
        if std::mem::replace(&mut self.closed, true) {
            return ok!();
        }

        self.cancellation.clear_waker();
        let raw_fd = self.guard.terminal().as_fd().as_raw_fd();
        if let Err(err) = self.poll.registry().deregister(&mut SourceFd(&raw_fd)) {
            tracing::warn!(message = "failed to deregister tty from poll", ?err);
        }

        self.guard.restore().map_err(ReadlineError::Mode)?;
        tracing::debug!(message = "posix session closed");
        ok!()
    }
}

impl Drop for PosixSession {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            tracing::warn!(message = "failed to close posix session on drop", ?err);
        }
    }
}
