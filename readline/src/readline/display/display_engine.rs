// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use super::{RenderOp, RenderOps, compute_layout, push_move_rows};
use crate::LineBuffer;
use smallvec::smallvec;

/// Everything a render needs, borrowed for the duration of one call.
#[derive(Debug, Clone, Copy)]
pub struct Frame<'a> {
    pub prompt: &'a str,
    pub buffer: &'a LineBuffer,
    /// `Some(glyph)` in password mode.
    pub mask: Option<char>,
    pub width: u16,
}

/// What the engine remembers about the screen from its own last write. If these drift
/// from what was actually painted, cursor placement stays wrong for the rest of the
/// read.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DisplayLayoutState {
    /// Rows occupied by the last full paint.
    pub last_row_count: usize,
    /// Row (within that block) the cursor was last left on.
    pub last_cursor_row: usize,
}

/// Turns a [`Frame`] into [`RenderOps`], one render per edit loop iteration.
#[derive(Debug, Default)]
pub struct DisplayEngine {
    state: DisplayLayoutState,
}

impl DisplayEngine {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn state(&self) -> DisplayLayoutState { self.state }

    /// Compute the ops for one render.
    ///
    /// 1. Go up `last_cursor_row` rows to column 0, the origin of the block.
    /// 2. If `dirty`, erase `last_row_count` rows and repaint `prompt + buffer`,
    ///    emitting [`RenderOp::NextRow`] wherever the layout walk wrapped.
    /// 3. Move to the cursor's row and column.
    ///
    /// A render that is not dirty only moves the cursor and leaves `last_row_count`
    /// alone.
    pub fn render(&mut self, frame: &Frame<'_>, dirty: bool) -> RenderOps {
        let layout = compute_layout(
            frame.prompt,
            frame.buffer.as_chars(),
            frame.buffer.cursor(),
            frame.mask,
            frame.width,
        );

        let mut ops: RenderOps = smallvec![RenderOp::HideCursor];
        push_move_rows(&mut ops, self.state.last_cursor_row, 0);
        ops.push(RenderOp::MoveToColumn(0));

        let mut row = 0;
        if dirty {
            let rows_to_erase = self.state.last_row_count.max(1);
            for index in 0..rows_to_erase {
                if index > 0 {
                    ops.push(RenderOp::MoveDown(1));
                }
                ops.push(RenderOp::ClearCurrentLine);
            }
            push_move_rows(&mut ops, rows_to_erase - 1, 0);

            let mut run = String::new();
            for placed in &layout.glyphs {
                if placed.wraps_before {
                    flush_run(&mut ops, &mut run);
                    ops.push(RenderOp::NextRow);
                }
                run.push(placed.glyph);
            }
            flush_run(&mut ops, &mut run);

            row = layout.end_row;
            self.state.last_row_count = layout.row_count();
        }

        push_move_rows(&mut ops, row, layout.cursor_row);
        ops.push(RenderOp::MoveToColumn(
            u16::try_from(layout.cursor_col).unwrap_or(u16::MAX),
        ));
        ops.push(RenderOp::ShowCursor);

        self.state.last_cursor_row = layout.cursor_row;
        ops
    }

    /// Leave the block: go below its last row and start a fresh line. The engine is
    /// reset for the next read.
    pub fn finish(&mut self) -> RenderOps {
        let mut ops = RenderOps::new();
        let last_row = self.state.last_row_count.saturating_sub(1);
        push_move_rows(&mut ops, self.state.last_cursor_row, last_row);
        ops.push(RenderOp::NextRow);
        self.state = DisplayLayoutState::default();
        ops
    }
}

fn flush_run(ops: &mut RenderOps, run: &mut String) {
    if !run.is_empty() {
        ops.push(RenderOp::PrintGlyphs(std::mem::take(run)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{core::test_fixtures::StdoutMock, paint_ansi};
    use pretty_assertions::assert_eq;

    fn frame<'a>(buffer: &'a LineBuffer, width: u16) -> Frame<'a> {
        Frame {
            prompt: "> ",
            buffer,
            mask: None,
            width,
        }
    }

    fn is_motion(op: &RenderOp) -> bool {
        matches!(
            op,
            RenderOp::HideCursor
                | RenderOp::ShowCursor
                | RenderOp::MoveUp(_)
                | RenderOp::MoveDown(_)
                | RenderOp::MoveToColumn(_)
        )
    }

    #[test]
    fn test_first_paint_of_empty_line() {
        let mut engine = DisplayEngine::new();
        let buffer = LineBuffer::new();
        let ops = engine.render(&frame(&buffer, 80), true);
        assert_eq!(
            ops.as_slice(),
            &[
                RenderOp::HideCursor,
                RenderOp::MoveToColumn(0),
                RenderOp::ClearCurrentLine,
                RenderOp::PrintGlyphs("> ".into()),
                RenderOp::MoveToColumn(2),
                RenderOp::ShowCursor,
            ]
        );
        assert_eq!(
            engine.state(),
            DisplayLayoutState {
                last_row_count: 1,
                last_cursor_row: 0
            }
        );
    }

    #[test]
    fn test_wrapped_paint_then_cursor_only_moves() {
        let mut engine = DisplayEngine::new();
        let mut buffer = LineBuffer::from("hello world");
        let ops = engine.render(&frame(&buffer, 10), true);
        assert_eq!(
            ops.as_slice(),
            &[
                RenderOp::HideCursor,
                RenderOp::MoveToColumn(0),
                RenderOp::ClearCurrentLine,
                RenderOp::PrintGlyphs("> hello wo".into()),
                RenderOp::NextRow,
                RenderOp::PrintGlyphs("rld".into()),
                RenderOp::MoveToColumn(3),
                RenderOp::ShowCursor,
            ]
        );
        assert_eq!(engine.state().last_row_count, 2);
        assert_eq!(engine.state().last_cursor_row, 1);

        buffer.move_to_start();
        let ops = engine.render(&frame(&buffer, 10), false);
        assert!(ops.iter().all(is_motion));
        assert_eq!(
            ops.as_slice(),
            &[
                RenderOp::HideCursor,
                RenderOp::MoveUp(1),
                RenderOp::MoveToColumn(0),
                RenderOp::MoveToColumn(2),
                RenderOp::ShowCursor,
            ]
        );
        assert_eq!(engine.state().last_row_count, 2);
        assert_eq!(engine.state().last_cursor_row, 0);
    }

    #[test]
    fn test_shrinking_line_erases_stale_rows() {
        let mut engine = DisplayEngine::new();
        engine.render(&frame(&LineBuffer::from("hello world"), 10), true);

        let ops = engine.render(&frame(&LineBuffer::from("hi"), 10), true);
        assert_eq!(
            ops.as_slice(),
            &[
                RenderOp::HideCursor,
                RenderOp::MoveUp(1),
                RenderOp::MoveToColumn(0),
                RenderOp::ClearCurrentLine,
                RenderOp::MoveDown(1),
                RenderOp::ClearCurrentLine,
                RenderOp::MoveUp(1),
                RenderOp::PrintGlyphs("> hi".into()),
                RenderOp::MoveToColumn(4),
                RenderOp::ShowCursor,
            ]
        );
        assert_eq!(engine.state().last_row_count, 1);
    }

    #[test]
    fn test_cursor_on_earlier_row_after_repaint() {
        let mut engine = DisplayEngine::new();
        let mut buffer = LineBuffer::from("0123456789abcdefghij");
        buffer.set_cursor(3);
        // 22 columns over width 10: rows 0..=2, cursor at (5, 0).
        let ops = engine.render(&frame(&buffer, 10), true);
        let tail = &ops[ops.len() - 3..];
        assert_eq!(
            tail,
            &[
                RenderOp::MoveUp(2),
                RenderOp::MoveToColumn(5),
                RenderOp::ShowCursor,
            ]
        );
        assert_eq!(engine.state().last_row_count, 3);
        assert_eq!(engine.state().last_cursor_row, 0);
    }

    #[test]
    fn test_password_mode_never_writes_secret() {
        let mut engine = DisplayEngine::new();
        let buffer = LineBuffer::from("hunter2");
        let ops = engine.render(
            &Frame {
                prompt: "Password: ",
                buffer: &buffer,
                mask: Some('*'),
                width: 80,
            },
            true,
        );

        let mut stdout_mock = StdoutMock::new();
        paint_ansi(&ops, &mut stdout_mock).unwrap();
        let output = stdout_mock.get_copy_of_buffer_as_string_strip_ansi();
        assert_eq!(output, "Password: *******");
        assert!(!stdout_mock.get_copy_of_buffer_as_string().contains("hunter2"));
    }

    #[test]
    fn test_finish_moves_below_block() {
        let mut engine = DisplayEngine::new();
        let mut buffer = LineBuffer::from("hello world");
        buffer.move_to_start();
        engine.render(&frame(&buffer, 10), true);
        assert_eq!(
            engine.finish().as_slice(),
            &[RenderOp::MoveDown(1), RenderOp::NextRow]
        );
        assert_eq!(engine.state(), DisplayLayoutState::default());
    }
}
