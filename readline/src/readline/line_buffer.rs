// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The line buffer and the edit engine that applies one code point at a time to it.
//!
//! The unit of editing is the code point (`char`), not the grapheme cluster. A
//! combining mark is moved over and deleted on its own.
//!
//! | code        | command                | effect                                  |
//! |-------------|------------------------|-----------------------------------------|
//! | `1`         | [`MoveToStart`]        | cursor to 0                             |
//! | `2`         | [`MoveLeft`]           | cursor back one, stops at 0             |
//! | `3`         | [`Abort`]              | end the read with an empty line         |
//! | `4`         | [`EndOfInput`]         | end of input if the line is empty       |
//! | `5`         | [`MoveToEnd`]          | cursor to the end                       |
//! | `6`         | [`MoveRight`]          | cursor forward one, stops at the end    |
//! | `8`, `0x7F` | [`DeleteBackward`]     | delete the code point before the cursor |
//! | `9`         | [`Complete`]           | completion trigger                      |
//! | `10`, `13`  | [`Submit`]             | end the read with the line              |
//! | `11`        | [`KillToEnd`]          | truncate at the cursor                  |
//! | `12`        | [`Redraw`]             | repaint without changing the line       |
//! | `21`        | [`KillToStart`]        | drop everything before the cursor       |
//! | `23`        | [`EraseWord`]          | erase back to a whitespace boundary     |
//! | other ctrl  | [`Ignore`]             | nothing                                 |
//! | printable   | [`Insert`]             | insert at the cursor                    |
//!
//! [`MoveToStart`]: EditCommand::MoveToStart
//! [`MoveLeft`]: EditCommand::MoveLeft
//! [`Abort`]: EditCommand::Abort
//! [`EndOfInput`]: EditCommand::EndOfInput
//! [`MoveToEnd`]: EditCommand::MoveToEnd
//! [`MoveRight`]: EditCommand::MoveRight
//! [`DeleteBackward`]: EditCommand::DeleteBackward
//! [`Complete`]: EditCommand::Complete
//! [`Submit`]: EditCommand::Submit
//! [`KillToEnd`]: EditCommand::KillToEnd
//! [`Redraw`]: EditCommand::Redraw
//! [`KillToStart`]: EditCommand::KillToStart
//! [`EraseWord`]: EditCommand::EraseWord
//! [`Ignore`]: EditCommand::Ignore
//! [`Insert`]: EditCommand::Insert

use crate::{CompletionState, ReadlineConfig};
use std::fmt::{Display, Formatter};
use strum_macros::IntoStaticStr;

/// Ordered code points plus a cursor. Invariant: `0 <= cursor <= len`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LineBuffer {
    chars: Vec<char>,
    cursor: usize,
}

impl Display for LineBuffer {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        for ch in &self.chars {
            write!(f, "{ch}")?;
        }
        Ok(())
    }
}

impl From<&str> for LineBuffer {
    /// Cursor is placed at the end.
    fn from(text: &str) -> Self {
        let chars: Vec<char> = text.chars().collect();
        let cursor = chars.len();
        Self { chars, cursor }
    }
}

impl LineBuffer {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn len(&self) -> usize { self.chars.len() }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.chars.is_empty() }

    #[must_use]
    pub fn cursor(&self) -> usize { self.cursor }

    #[must_use]
    pub fn as_chars(&self) -> &[char] { &self.chars }

    /// Clamped to `0..=len`.
    pub fn set_cursor(&mut self, cursor: usize) { self.cursor = cursor.min(self.len()); }

    pub fn insert(&mut self, ch: char) {
        self.chars.insert(self.cursor, ch);
        self.cursor += 1;
    }

    pub fn move_to_start(&mut self) { self.cursor = 0; }

    pub fn move_to_end(&mut self) { self.cursor = self.len(); }

    pub fn move_left(&mut self) { self.cursor = self.cursor.saturating_sub(1); }

    pub fn move_right(&mut self) { self.set_cursor(self.cursor + 1); }

    /// Returns `true` if a code point was removed.
    pub fn delete_backward(&mut self) -> bool {
        if self.cursor == 0 {
            return false;
        }
        self.cursor -= 1;
        self.chars.remove(self.cursor);
        true
    }

    /// Truncate at the cursor. Returns `true` if anything was removed.
    pub fn kill_to_end(&mut self) -> bool {
        let changed = self.cursor < self.len();
        self.chars.truncate(self.cursor);
        changed
    }

    /// Remove everything before the cursor and move the cursor to 0.
    pub fn kill_to_start(&mut self) -> bool {
        let changed = self.cursor > 0;
        self.chars.drain(..self.cursor);
        self.cursor = 0;
        changed
    }

    /// Skip whitespace before the cursor, then the word before that, and remove both.
    pub fn erase_word(&mut self) -> bool {
        let mut start = self.cursor;
        while start > 0 && self.chars[start - 1].is_whitespace() {
            start -= 1;
        }
        while start > 0 && !self.chars[start - 1].is_whitespace() {
            start -= 1;
        }
        if start == self.cursor {
            return false;
        }
        self.chars.drain(start..self.cursor);
        self.cursor = start;
        true
    }

    /// Replace `anchor..len` with `text`, cursor lands right after it. `anchor` is
    /// clamped to the length of the line.
    pub fn replace_from(&mut self, anchor: usize, text: &str) {
        let anchor = anchor.min(self.len());
        self.chars.truncate(anchor);
        self.chars.extend(text.chars());
        self.cursor = anchor + text.chars().count();
    }

    pub fn clear(&mut self) {
        self.chars.clear();
        self.cursor = 0;
    }
}

/// One decoded command. See the [module documentation] for the mapping.
///
/// [module documentation]: mod@crate::readline::line_buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq, IntoStaticStr)]
pub enum EditCommand {
    Ignore,
    MoveToStart,
    MoveLeft,
    Abort,
    EndOfInput,
    MoveToEnd,
    MoveRight,
    DeleteBackward,
    Complete,
    Submit,
    KillToEnd,
    Redraw,
    KillToStart,
    EraseWord,
    Insert(char),
}

impl From<char> for EditCommand {
    fn from(code: char) -> Self {
        match code {
            '\u{01}' => EditCommand::MoveToStart,
            '\u{02}' => EditCommand::MoveLeft,
            '\u{03}' => EditCommand::Abort,
            '\u{04}' => EditCommand::EndOfInput,
            '\u{05}' => EditCommand::MoveToEnd,
            '\u{06}' => EditCommand::MoveRight,
            '\u{08}' | '\u{7F}' => EditCommand::DeleteBackward,
            '\t' => EditCommand::Complete,
            '\n' | '\r' => EditCommand::Submit,
            '\u{0B}' => EditCommand::KillToEnd,
            '\u{0C}' => EditCommand::Redraw,
            '\u{15}' => EditCommand::KillToStart,
            '\u{17}' => EditCommand::EraseWord,
            '\u{00}'..='\u{1F}' => EditCommand::Ignore,
            other => EditCommand::Insert(other),
        }
    }
}

/// What the edit loop does after one command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditOutcome {
    /// Content unchanged. Only the cursor needs repositioning.
    Unchanged,
    /// Content changed (or a repaint was asked for). The next render is dirty.
    Changed,
    Submit,
    Abort,
    EndOfInput,
}

impl EditOutcome {
    #[must_use]
    pub fn is_dirty(&self) -> bool { matches!(self, EditOutcome::Changed) }

    #[must_use]
    pub fn ends_read(&self) -> bool {
        matches!(
            self,
            EditOutcome::Submit | EditOutcome::Abort | EditOutcome::EndOfInput
        )
    }
}

/// Owns the [`LineBuffer`] and the [`CompletionState`] for one line read, so neither
/// can leak into the next read.
#[derive(Debug, Default)]
pub struct EditEngine {
    pub buffer: LineBuffer,
    pub completion: CompletionState,
}

impl EditEngine {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Apply one code point. Any command other than [`EditCommand::Complete`] ends an
    /// active completion cycle.
    pub fn apply(&mut self, code: char, config: &mut ReadlineConfig) -> EditOutcome {
        let command = EditCommand::from(code);
        if command != EditCommand::Complete {
            self.completion.deactivate();
        }

        let buffer = &mut self.buffer;
        match command {
            EditCommand::Ignore => EditOutcome::Unchanged,
            EditCommand::MoveToStart => {
                buffer.move_to_start();
                EditOutcome::Unchanged
            }
            EditCommand::MoveLeft => {
                buffer.move_left();
                EditOutcome::Unchanged
            }
            EditCommand::MoveToEnd => {
                buffer.move_to_end();
                EditOutcome::Unchanged
            }
            EditCommand::MoveRight => {
                buffer.move_right();
                EditOutcome::Unchanged
            }
            EditCommand::Abort => EditOutcome::Abort,
            EditCommand::EndOfInput if buffer.is_empty() => EditOutcome::EndOfInput,
            EditCommand::EndOfInput => EditOutcome::Unchanged,
            EditCommand::Submit => EditOutcome::Submit,
            EditCommand::Redraw => EditOutcome::Changed,
            EditCommand::DeleteBackward => changed_if(buffer.delete_backward()),
            EditCommand::KillToEnd => changed_if(buffer.kill_to_end()),
            EditCommand::KillToStart => changed_if(buffer.kill_to_start()),
            EditCommand::EraseWord => changed_if(buffer.erase_word()),
            EditCommand::Insert(ch) => {
                buffer.insert(ch);
                EditOutcome::Changed
            }
            EditCommand::Complete => {
                let style = config.completion_style;
                match config.completer.as_mut() {
                    Some(completer) => changed_if(self.completion.trigger(
                        buffer,
                        &mut **completer,
                        style,
                    )),
                    None => EditOutcome::Unchanged,
                }
            }
        }
    }
}

fn changed_if(changed: bool) -> EditOutcome {
    if changed {
        EditOutcome::Changed
    } else {
        EditOutcome::Unchanged
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use test_case::test_case;

    fn buffer_at(text: &str, cursor: usize) -> LineBuffer {
        let mut buffer = LineBuffer::from(text);
        buffer.set_cursor(cursor);
        buffer
    }

    fn type_str(engine: &mut EditEngine, config: &mut ReadlineConfig, text: &str) {
        for ch in text.chars() {
            engine.apply(ch, config);
        }
    }

    #[test_case('\u{00}', EditCommand::Ignore)]
    #[test_case('\u{07}', EditCommand::Ignore)]
    #[test_case('\u{1B}', EditCommand::Ignore)]
    #[test_case('\u{7F}', EditCommand::DeleteBackward)]
    #[test_case('\u{08}', EditCommand::DeleteBackward)]
    #[test_case('\r', EditCommand::Submit)]
    #[test_case('\n', EditCommand::Submit)]
    #[test_case('é', EditCommand::Insert('é'))]
    #[test_case(' ', EditCommand::Insert(' '))]
    fn test_command_mapping(code: char, expected: EditCommand) {
        assert_eq!(EditCommand::from(code), expected);
    }

    #[test]
    fn test_kill_to_end_keeps_prefix() {
        let mut buffer = buffer_at("hello world", 5);
        assert!(buffer.kill_to_end());
        assert_eq!(buffer.to_string(), "hello");
        assert_eq!(buffer.cursor(), 5);
        assert!(!buffer.kill_to_end());
    }

    #[test]
    fn test_kill_to_start_keeps_suffix() {
        let mut buffer = buffer_at("hello world", 6);
        assert!(buffer.kill_to_start());
        assert_eq!(buffer.to_string(), "world");
        assert_eq!(buffer.cursor(), 0);
    }

    #[test_case("foo bar ", 8, "foo ", 4)]
    #[test_case("foo bar", 7, "foo ", 4)]
    #[test_case("foo bar", 5, "foo ar", 4)]
    #[test_case("   ", 3, "", 0)]
    #[test_case("word", 0, "word", 0)]
    #[test_case("a\tb", 3, "a\t", 2)]
    fn test_erase_word(text: &str, cursor: usize, expected: &str, expected_cursor: usize) {
        let mut buffer = buffer_at(text, cursor);
        buffer.erase_word();
        assert_eq!(buffer.to_string(), expected);
        assert_eq!(buffer.cursor(), expected_cursor);
    }

    #[test]
    fn test_delete_backward_operates_on_code_points() {
        // "e" followed by a combining acute accent: two code points, one grapheme.
        let mut buffer = LineBuffer::from("e\u{301}");
        assert!(buffer.delete_backward());
        assert_eq!(buffer.to_string(), "e");
        assert!(buffer.delete_backward());
        assert!(!buffer.delete_backward());
        assert_eq!(buffer.cursor(), 0);
    }

    #[test]
    fn test_cursor_stays_in_bounds_for_any_command_sequence() {
        let mut engine = EditEngine::new();
        let mut config = ReadlineConfig::default();
        let script = "ab\u{2}\u{2}\u{2}\u{2}x\u{6}\u{6}\u{6}\u{6}\u{7F}\u{7F}\u{7F}\u{7F}\u{7F}\
                      hello\u{1}\u{b}\u{5}yo\u{15}\u{17}\u{17}日本\u{2}\u{8}";
        for ch in script.chars() {
            engine.apply(ch, &mut config);
            assert!(engine.buffer.cursor() <= engine.buffer.len());
        }
        assert_eq!(engine.buffer.to_string(), "本");
        assert_eq!(engine.buffer.cursor(), 0);
    }

    #[test]
    fn test_outcomes() {
        let mut engine = EditEngine::new();
        let mut config = ReadlineConfig::default();

        assert_eq!(engine.apply('\u{4}', &mut config), EditOutcome::EndOfInput);
        assert_eq!(engine.apply('a', &mut config), EditOutcome::Changed);
        assert_eq!(engine.apply('\u{4}', &mut config), EditOutcome::Unchanged);
        assert_eq!(engine.apply('\u{1}', &mut config), EditOutcome::Unchanged);
        assert_eq!(engine.apply('\u{8}', &mut config), EditOutcome::Unchanged);
        assert_eq!(engine.apply('\u{c}', &mut config), EditOutcome::Changed);
        assert_eq!(engine.apply('\u{0}', &mut config), EditOutcome::Unchanged);
        assert_eq!(engine.apply('\t', &mut config), EditOutcome::Unchanged);
        assert_eq!(engine.apply('\u{3}', &mut config), EditOutcome::Abort);
        assert_eq!(engine.apply('\r', &mut config), EditOutcome::Submit);
        assert_eq!(engine.buffer.to_string(), "a");
        assert!(EditOutcome::Submit.ends_read());
        assert!(!EditOutcome::Changed.ends_read());
    }

    #[test]
    fn test_insert_in_the_middle() {
        let mut engine = EditEngine::new();
        let mut config = ReadlineConfig::default();
        type_str(&mut engine, &mut config, "hllo\u{1}\u{6}e");
        assert_eq!(engine.buffer.to_string(), "hello");
        assert_eq!(engine.buffer.cursor(), 2);
    }
}
