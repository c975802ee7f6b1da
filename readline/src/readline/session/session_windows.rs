// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words conin conout

//! Console session: console modes, `ReadConsoleInputW` key records, and painting with
//! console cursor and fill calls instead of ANSI sequences.
//!
//! When stdin (or stdout) is redirected, `CONIN$` (or `CONOUT$`) is opened so the
//! editor still talks to the real console.
//!
//! The blocked `ReadConsoleInputW` is woken on cancellation by writing a synthetic focus
//! record into the input buffer.

use super::{SessionEvent, TerminalSession};
use crate::{CancellationToken, ConsoleKeyDecoder, KeyBatch, RawModeGuard, ReadlineError,
            RenderOp, get_console_mode, glyph_width, ok};
use std::{fs::File,
          io,
          os::windows::io::AsRawHandle};
use windows_sys::Win32::{Foundation::HANDLE,
                         System::Console::{CONSOLE_CURSOR_INFO,
                                           CONSOLE_SCREEN_BUFFER_INFO, COORD,
                                           FOCUS_EVENT, FOCUS_EVENT_RECORD,
                                           FillConsoleOutputCharacterW,
                                           GetConsoleCursorInfo,
                                           GetConsoleScreenBufferInfo, GetStdHandle,
                                           INPUT_RECORD, INPUT_RECORD_0, KEY_EVENT,
                                           ReadConsoleInputW, STD_INPUT_HANDLE,
                                           STD_OUTPUT_HANDLE, SetConsoleCursorInfo,
                                           SetConsoleCursorPosition,
                                           WINDOW_BUFFER_SIZE_EVENT, WriteConsoleInputW,
                                           WriteConsoleW}};

/// Turn a `BOOL` result into an [`io::Result`].
fn check(result: i32) -> io::Result<()> {
    if result == 0 {
        Err(io::Error::last_os_error())
    } else {
        Ok(())
    }
}

fn clamp_i16(value: usize) -> i16 { i16::try_from(value).unwrap_or(i16::MAX) }

fn screen_buffer_info(output: HANDLE) -> io::Result<CONSOLE_SCREEN_BUFFER_INFO> {
    // SAFETY: plain data struct, all zeroes is a valid value.
    let mut info: CONSOLE_SCREEN_BUFFER_INFO = unsafe { std::mem::zeroed() };
    // SAFETY: `info` is a valid out pointer.
    check(unsafe { GetConsoleScreenBufferInfo(output, &raw mut info) })?;
    Ok(info)
}

fn buffer_width(info: &CONSOLE_SCREEN_BUFFER_INFO) -> Option<u16> {
    u16::try_from(info.dwSize.X).ok().filter(|&cols| cols > 0)
}

/// Push a focus record so a blocked `ReadConsoleInputW` returns.
fn post_wake_record(input: HANDLE) -> io::Result<()> {
    let record = INPUT_RECORD {
        EventType: FOCUS_EVENT as u16,
        Event: INPUT_RECORD_0 {
            FocusEvent: FOCUS_EVENT_RECORD { bSetFocus: 1 },
        },
    };
    let mut written = 0_u32;
    // SAFETY: one valid record, valid out pointer.
    check(unsafe { WriteConsoleInputW(input, &raw const record, 1, &raw mut written) })
}

/// A [`TerminalSession`] on a Windows console.
#[derive(Debug)]
pub struct ConsoleSession {
    guard: RawModeGuard,
    input: HANDLE,
    output: HANDLE,
    decoder: ConsoleKeyDecoder,
    cancellation: CancellationToken,
    width: Option<u16>,
    closed: bool,
    /// Keep the `CONIN$` / `CONOUT$` handles open while in use.
    _conin: Option<File>,
    _conout: Option<File>,
}

impl ConsoleSession {
    /// Find the console handles, snapshot the input mode, and clear line input and
    /// echo.
    ///
    /// # Errors
    ///
    /// [`ReadlineError::Mode`] if there is no console or its mode can't be set.
    pub fn open(cancellation: &CancellationToken) -> Result<Self, ReadlineError> {
        // SAFETY: no preconditions.
        let std_input = unsafe { GetStdHandle(STD_INPUT_HANDLE) };
        let (input, conin) = if get_console_mode(std_input).is_ok() {
            (std_input, None)
        } else {
            let conin = open_console_device("CONIN$")?;
            (conin.as_raw_handle().cast(), Some(conin))
        };

        // SAFETY: no preconditions.
        let std_output = unsafe { GetStdHandle(STD_OUTPUT_HANDLE) };
        let (output, conout) = if screen_buffer_info(std_output).is_ok() {
            (std_output, None)
        } else {
            let conout = open_console_device("CONOUT$")?;
            (conout.as_raw_handle().cast(), Some(conout))
        };

        let guard = RawModeGuard::new(input).map_err(ReadlineError::Mode)?;

        let input_addr = input as usize;
        cancellation.set_waker(move || {
            if let Err(err) = post_wake_record(input_addr as HANDLE) {
                tracing::warn!(message = "failed to wake the blocked console read", ?err);
            }
        });

        let width = screen_buffer_info(output).ok().as_ref().and_then(buffer_width);
        tracing::debug!(
            message = "console session opened",
            ?width,
            conin = conin.is_some(),
            conout = conout.is_some()
        );

        Ok(Self {
            guard,
            input,
            output,
            decoder: ConsoleKeyDecoder::new(),
            cancellation: cancellation.clone(),
            width,
            closed: false,
            _conin: conin,
            _conout: conout,
        })
    }

    fn write_console(&self, text: &str) -> io::Result<()> {
        let units: Vec<u16> = text.encode_utf16().collect();
        let len = u32::try_from(units.len()).map_err(io::Error::other)?;
        let mut written = 0_u32;
        // SAFETY: `units` outlives the call, `len` is its length.
        check(unsafe {
            WriteConsoleW(
                self.output,
                units.as_ptr().cast(),
                len,
                &raw mut written,
                std::ptr::null(),
            )
        })
    }

    fn set_cursor_position(&self, pos: COORD) -> io::Result<()> {
        // SAFETY: plain value arguments.
        check(unsafe { SetConsoleCursorPosition(self.output, pos) })
    }

    fn set_cursor_visible(&self, visible: bool) -> io::Result<()> {
        let mut info = CONSOLE_CURSOR_INFO {
            dwSize: 0,
            bVisible: 0,
        };
        // SAFETY: `info` is a valid out pointer.
        check(unsafe { GetConsoleCursorInfo(self.output, &raw mut info) })?;
        info.bVisible = i32::from(visible);
        // SAFETY: `info` is a valid pointer.
        check(unsafe { SetConsoleCursorInfo(self.output, &raw const info) })
    }

    /// Like a VT terminal, stay on the last column after filling a row instead of
    /// jumping to the next one. The layout never expects that jump.
    fn print_glyphs(&self, text: &str) -> io::Result<()> {
        self.write_console(text)?;
        let width: usize = text.chars().map(glyph_width).sum();
        let after = screen_buffer_info(self.output)?;
        if width > 0 && after.dwCursorPosition.X == 0 && after.dwCursorPosition.Y > 0 {
            self.set_cursor_position(COORD {
                X: after.dwSize.X - 1,
                Y: after.dwCursorPosition.Y - 1,
            })?;
        }
        Ok(())
    }

    fn paint_op(&self, op: &RenderOp) -> io::Result<()> {
        match op {
            RenderOp::HideCursor => self.set_cursor_visible(false),
            RenderOp::ShowCursor => self.set_cursor_visible(true),
            RenderOp::PrintGlyphs(text) => self.print_glyphs(text),
            RenderOp::NextRow => self.write_console("\r\n"),
            RenderOp::MoveToColumn(col) => {
                let info = screen_buffer_info(self.output)?;
                self.set_cursor_position(COORD {
                    X: clamp_i16(usize::from(*col)).min(info.dwSize.X - 1),
                    Y: info.dwCursorPosition.Y,
                })
            }
            RenderOp::MoveUp(rows) => {
                let info = screen_buffer_info(self.output)?;
                let pos = info.dwCursorPosition;
                self.set_cursor_position(COORD {
                    X: pos.X,
                    Y: pos.Y.saturating_sub(clamp_i16(usize::from(*rows))).max(0),
                })
            }
            RenderOp::MoveDown(rows) => {
                let info = screen_buffer_info(self.output)?;
                let pos = info.dwCursorPosition;
                self.set_cursor_position(COORD {
                    X: pos.X,
                    Y: pos
                        .Y
                        .saturating_add(clamp_i16(usize::from(*rows)))
                        .min(info.dwSize.Y - 1),
                })
            }
            RenderOp::ClearCurrentLine => {
                let info = screen_buffer_info(self.output)?;
                let row_start = COORD {
                    X: 0,
                    Y: info.dwCursorPosition.Y,
                };
                let len = u32::try_from(info.dwSize.X).unwrap_or(0);
                let mut written = 0_u32;
                // SAFETY: valid out pointer, the fill stays inside the buffer.
                check(unsafe {
                    FillConsoleOutputCharacterW(
                        self.output,
                        u16::from(b' '),
                        len,
                        row_start,
                        &raw mut written,
                    )
                })
            }
        }
    }
}

fn open_console_device(name: &str) -> Result<File, ReadlineError> {
    File::options()
        .read(true)
        .write(true)
        .open(name)
        .map_err(ReadlineError::Mode)
}

impl TerminalSession for ConsoleSession {
    fn read_keys(&mut self) -> Result<SessionEvent, ReadlineError> {
        loop {
            if self.cancellation.is_cancelled() {
                return ok!(SessionEvent::Interrupted);
            }

            // SAFETY: plain data union, all zeroes is a valid value.
            let mut record: INPUT_RECORD = unsafe { std::mem::zeroed() };
            let mut read = 0_u32;
            // SAFETY: one record of space, valid out pointers.
            check(unsafe { ReadConsoleInputW(self.input, &raw mut record, 1, &raw mut read) })?;
            if read == 0 || self.cancellation.is_cancelled() {
                continue;
            }

            match u32::from(record.EventType) {
                KEY_EVENT => {
                    // SAFETY: `EventType` says this union holds a key record.
                    let key = unsafe { record.Event.KeyEvent };
                    // SAFETY: both union fields are plain integers.
                    let unicode_char = unsafe { key.uChar.UnicodeChar };
                    let decoded = self.decoder.decode_key(
                        key.bKeyDown != 0,
                        key.wVirtualKeyCode,
                        unicode_char,
                    );
                    if let Some(ch) = decoded {
                        let repeat = usize::from(key.wRepeatCount.max(1));
                        let batch: KeyBatch = std::iter::repeat_n(ch, repeat).collect();
                        return ok!(SessionEvent::Keys(batch));
                    }
                }
                WINDOW_BUFFER_SIZE_EVENT => {
                    // SAFETY: `EventType` says this union holds a buffer size record.
                    let size = unsafe { record.Event.WindowBufferSizeEvent.dwSize };
                    if let Ok(cols) = u16::try_from(size.X)
                        && cols > 0
                    {
                        tracing::debug!(message = "console width changed", cols);
                        self.width = Some(cols);
                    }
                }
                // Mouse, focus, and menu records are not used.
                _ => {}
            }
        }
    }

    fn write_all(&mut self, bytes: &[u8]) -> Result<(), ReadlineError> {
        self.write_console(&String::from_utf8_lossy(bytes))?;
        ok!()
    }

    fn paint(&mut self, ops: &[RenderOp]) -> Result<(), ReadlineError> {
        for op in ops {
            self.paint_op(op)?;
        }
        ok!()
    }

    fn terminal_width(&self) -> Option<u16> { self.width }

    fn close(&mut self) -> Result<(), ReadlineError> {
        if std::mem::replace(&mut self.closed, true) {
            return ok!();
        }
        self.cancellation.clear_waker();
        self.guard.restore().map_err(ReadlineError::Mode)?;
        tracing::debug!(message = "console session closed");
        ok!()
    }
}

impl Drop for ConsoleSession {
    fn drop(&mut self) {
        if let Err(err) = self.close() {
            tracing::warn!(message = "failed to close console session on drop", ?err);
        }
    }
}
