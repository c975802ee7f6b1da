// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use crossterm::{Command, cursor, style::Print, terminal};
use smallvec::SmallVec;
use std::io::{self, Write};

/// The handful of terminal primitives the display engine needs. All motion is relative
/// to wherever the cursor is, except [`RenderOp::MoveToColumn`] which is absolute
/// within the current row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RenderOp {
    HideCursor,
    ShowCursor,
    /// 0-based column in the current row.
    MoveToColumn(u16),
    MoveUp(u16),
    MoveDown(u16),
    /// Erase the whole current row. The cursor does not move.
    ClearCurrentLine,
    PrintGlyphs(String),
    /// Column 0 of the next row, scrolling if the cursor is on the last row.
    NextRow,
}

pub type RenderOps = SmallVec<[RenderOp; 16]>;

/// Push a vertical move, skipping zero moves (`CSI 0 A` moves one row on most
/// terminals).
pub fn push_move_rows(ops: &mut RenderOps, from_row: usize, to_row: usize) {
    let saturate = |n: usize| u16::try_from(n).unwrap_or(u16::MAX);
    if to_row < from_row {
        ops.push(RenderOp::MoveUp(saturate(from_row - to_row)));
    } else if to_row > from_row {
        ops.push(RenderOp::MoveDown(saturate(to_row - from_row)));
    }
}

/// Append the ANSI rendition of `op` to `acc`.
///
/// # Errors
///
/// Only fails if formatting into the string fails.
pub fn render_op_to_ansi(op: &RenderOp, acc: &mut String) -> std::fmt::Result {
    match op {
        RenderOp::HideCursor => cursor::Hide.write_ansi(acc),
        RenderOp::ShowCursor => cursor::Show.write_ansi(acc),
        RenderOp::MoveToColumn(col) => cursor::MoveToColumn(*col).write_ansi(acc),
        RenderOp::MoveUp(0) | RenderOp::MoveDown(0) => Ok(()),
        RenderOp::MoveUp(n) => cursor::MoveUp(*n).write_ansi(acc),
        RenderOp::MoveDown(n) => cursor::MoveDown(*n).write_ansi(acc),
        RenderOp::ClearCurrentLine => {
            terminal::Clear(terminal::ClearType::CurrentLine).write_ansi(acc)
        }
        RenderOp::PrintGlyphs(text) => Print(text).write_ansi(acc),
        RenderOp::NextRow => Print("\r\n").write_ansi(acc),
    }
}

/// Write all `ops` to `out` as one ANSI byte string, then flush.
///
/// # Errors
///
/// Returns the write or flush error.
pub fn paint_ansi(ops: &[RenderOp], out: &mut impl Write) -> io::Result<()> {
    let mut acc = String::new();
    for op in ops {
        render_op_to_ansi(op, &mut acc).map_err(io::Error::other)?;
    }
    out.write_all(acc.as_bytes())?;
    out.flush()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::test_fixtures::StdoutMock;
    use pretty_assertions::assert_eq;
    use smallvec::smallvec;

    #[test]
    fn test_paint_ansi_sequences() {
        let mut stdout_mock = StdoutMock::new();
        let ops: RenderOps = smallvec![
            RenderOp::HideCursor,
            RenderOp::MoveUp(2),
            RenderOp::MoveToColumn(0),
            RenderOp::ClearCurrentLine,
            RenderOp::PrintGlyphs("> hi".into()),
            RenderOp::NextRow,
            RenderOp::MoveDown(1),
            RenderOp::MoveUp(0),
            RenderOp::MoveToColumn(4),
            RenderOp::ShowCursor,
        ];
        paint_ansi(&ops, &mut stdout_mock).unwrap();
        assert_eq!(
            stdout_mock.get_copy_of_buffer_as_string(),
            "\x1b[?25l\x1b[2A\x1b[1G\x1b[2K> hi\r\n\x1b[1B\x1b[5G\x1b[?25h"
        );
        assert!(stdout_mock.get_copy_of_buffer_as_string_strip_ansi().starts_with("> hi"));
    }

    #[test]
    fn test_push_move_rows() {
        let mut ops = RenderOps::new();
        push_move_rows(&mut ops, 3, 3);
        assert!(ops.is_empty());
        push_move_rows(&mut ops, 3, 1);
        push_move_rows(&mut ops, 0, 2);
        assert_eq!(ops.as_slice(), &[RenderOp::MoveUp(2), RenderOp::MoveDown(2)]);
    }
}
