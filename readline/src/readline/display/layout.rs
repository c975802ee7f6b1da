// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use unicode_width::UnicodeWidthChar;

/// Display width of one code point. Control and zero width code points are 0.
#[must_use]
pub fn glyph_width(ch: char) -> usize { UnicodeWidthChar::width(ch).unwrap_or(0) }

/// One glyph placed by the layout walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacedGlyph {
    /// What gets written, the mask glyph in password mode.
    pub glyph: char,
    /// `true` if the walk wrapped to a new row right before this glyph.
    pub wraps_before: bool,
}

/// Result of the layout walk over `prompt + buffer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    pub glyphs: Vec<PlacedGlyph>,
    /// Column and row where the editing cursor goes.
    pub cursor_col: usize,
    pub cursor_row: usize,
    /// Column and row right after the last glyph.
    pub end_col: usize,
    pub end_row: usize,
}

impl Layout {
    /// Rows the block occupies on screen. Never 0, an empty prompt and line still own
    /// the row the cursor is on.
    #[must_use]
    pub fn row_count(&self) -> usize { self.end_row + 1 }
}

/// Walk `prompt + buffer` left to right, wrapping whenever the next glyph does not fit
/// in `width` columns.
///
/// The cursor is recorded when the walk reaches code point `prompt_len + cursor`, before
/// that glyph's own wrap. A cursor past the last glyph takes the end position. The
/// cursor column is clamped to the last column, so a full row keeps the cursor visible.
///
/// With `mask`, every buffer code point is laid out and written as the mask glyph.
#[must_use]
pub fn compute_layout(
    prompt: &str,
    buffer: &[char],
    cursor: usize,
    mask: Option<char>,
    width: u16,
) -> Layout {
    let width = usize::from(width.max(1));
    let cursor_index = prompt.chars().count() + cursor;

    let chars = prompt
        .chars()
        .chain(buffer.iter().map(|&ch| mask.unwrap_or(ch)));

    let mut glyphs = Vec::with_capacity(cursor_index.max(buffer.len()));
    let (mut col, mut row) = (0, 0);
    let mut cursor_pos = None;

    for (index, glyph) in chars.enumerate() {
        if index == cursor_index {
            cursor_pos = Some((col, row));
        }
        let cols = glyph_width(glyph);
        let wraps_before = col + cols > width;
        if wraps_before {
            col = 0;
            row += 1;
        }
        glyphs.push(PlacedGlyph {
            glyph,
            wraps_before,
        });
        col += cols;
    }

    let (cursor_col, cursor_row) = cursor_pos.unwrap_or((col, row));
    Layout {
        glyphs,
        cursor_col: cursor_col.min(width - 1),
        cursor_row,
        end_col: col,
        end_row: row,
    }
}
