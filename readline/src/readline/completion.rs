// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Completion cycling over the candidates returned by a [`Completer`].
//!
//! ```text
//!        Tab (query)            Tab                  Tab
//! inactive ───────────▶ active[1] ─────▶ active[2] ─ ... ─▶ active[0] (wrapped)
//!    ▲                     │
//!    └──── any other key ──┘
//! ```
//!
//! Candidates are never reused across an unrelated edit: any other key deactivates the
//! cycle, and the next trigger asks the [`Completer`] again.

use crate::{Completer, CompletionStyle, LineBuffer};

/// `None` means inactive.
#[derive(Debug, Default)]
pub struct CompletionState {
    cycle: Option<CompletionCycle>,
}

#[derive(Debug)]
struct CompletionCycle {
    anchor: usize,
    candidates: Vec<String>,
    /// Index of the candidate the next trigger inserts.
    next_index: usize,
}

impl CompletionState {
    #[must_use]
    pub fn is_active(&self) -> bool { self.cycle.is_some() }

    pub fn deactivate(&mut self) { self.cycle = None; }

    /// Handle one completion trigger. Returns `true` if the buffer changed.
    pub fn trigger(
        &mut self,
        buffer: &mut LineBuffer,
        completer: &mut dyn Completer,
        style: CompletionStyle,
    ) -> bool {
        if self.cycle.is_none() {
            let Some((anchor, candidates)) = query(buffer, completer) else {
                return false;
            };
            match style {
                CompletionStyle::CommonPrefix => {
                    let prefix = common_prefix(&candidates);
                    let before = buffer.clone();
                    buffer.replace_from(anchor, &prefix);
                    return *buffer != before;
                }
                CompletionStyle::Cycle => {
                    self.cycle = Some(CompletionCycle {
                        anchor,
                        candidates,
                        next_index: 0,
                    });
                }
            }
        }

        let Some(cycle) = self.cycle.as_mut() else {
            return false;
        };
        let candidate = &cycle.candidates[cycle.next_index];
        buffer.replace_from(cycle.anchor, candidate);
        cycle.next_index = (cycle.next_index + 1) % cycle.candidates.len();
        true
    }
}

/// Ask the completer. `None` when there is nothing to offer.
fn query(buffer: &LineBuffer, completer: &mut dyn Completer) -> Option<(usize, Vec<String>)> {
    let line = buffer.to_string();
    let (anchor, candidates) = completer.complete(&line, buffer.cursor());

    tracing::debug!(
        message = "completion query",
        cursor = buffer.cursor(),
        anchor,
        candidates = candidates.len()
    );

    let anchor = usize::try_from(anchor).ok()?;
    if candidates.is_empty() || anchor > buffer.len() {
        return None;
    }
    Some((anchor, candidates))
}

/// Longest prefix (in code points) shared by every candidate.
#[must_use]
pub fn common_prefix(candidates: &[String]) -> String {
    let Some((first, rest)) = candidates.split_first() else {
        return String::new();
    };
    let mut prefix_len = first.chars().count();
    for other in rest {
        prefix_len = first
            .chars()
            .zip(other.chars())
            .take(prefix_len)
            .take_while(|(a, b)| a == b)
            .count();
    }
    first.chars().take(prefix_len).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{EditEngine, ReadlineConfig};
    use pretty_assertions::assert_eq;
    use std::{cell::Cell, rc::Rc};
    use test_case::test_case;

    fn fruit(_line: &str, _cursor: usize) -> (isize, Vec<String>) {
        (0, vec!["apple".to_string(), "apricot".to_string()])
    }

    #[test]
    fn test_cycle_inserts_and_wraps() {
        let mut buffer = LineBuffer::new();
        let mut state = CompletionState::default();
        let mut completer = fruit;

        assert!(state.trigger(&mut buffer, &mut completer, CompletionStyle::Cycle));
        assert_eq!((buffer.to_string().as_str(), buffer.cursor()), ("apple", 5));
        assert!(state.is_active());

        assert!(state.trigger(&mut buffer, &mut completer, CompletionStyle::Cycle));
        assert_eq!((buffer.to_string().as_str(), buffer.cursor()), ("apricot", 7));

        assert!(state.trigger(&mut buffer, &mut completer, CompletionStyle::Cycle));
        assert_eq!((buffer.to_string().as_str(), buffer.cursor()), ("apple", 5));
    }

    #[test]
    fn test_replaces_from_anchor_to_end() {
        let mut buffer = LineBuffer::from("cat ap tail");
        buffer.set_cursor(6);
        let mut state = CompletionState::default();
        let mut completer = |_: &str, _: usize| (4_isize, vec!["apple".to_string()]);

        assert!(state.trigger(&mut buffer, &mut completer, CompletionStyle::Cycle));
        assert_eq!(buffer.to_string(), "cat apple");
        assert_eq!(buffer.cursor(), 9);
    }

    #[test_case(-1, vec!["x"]; "negative anchor")]
    #[test_case(0, vec![]; "no candidates")]
    #[test_case(9, vec!["x"]; "anchor past the end")]
    fn test_nothing_to_offer(anchor: isize, candidates: Vec<&str>) {
        let mut buffer = LineBuffer::from("abc");
        let mut state = CompletionState::default();
        let candidates: Vec<String> = candidates.into_iter().map(String::from).collect();
        let mut completer = move |_: &str, _: usize| (anchor, candidates.clone());

        assert!(!state.trigger(&mut buffer, &mut completer, CompletionStyle::Cycle));
        assert!(!state.is_active());
        assert_eq!(buffer.to_string(), "abc");
        assert_eq!(buffer.cursor(), 3);
    }

    #[test]
    fn test_other_key_forces_requery() {
        let calls = Rc::new(Cell::new(0));
        let calls_clone = Rc::clone(&calls);
        let mut config = ReadlineConfig::default().with_completer(move |_: &str, _: usize| {
            calls_clone.set(calls_clone.get() + 1);
            (0_isize, vec!["apple".to_string(), "apricot".to_string()])
        });
        let mut engine = EditEngine::new();

        engine.apply('\t', &mut config);
        engine.apply('\t', &mut config);
        assert_eq!(calls.get(), 1);
        assert_eq!(engine.buffer.to_string(), "apricot");

        // Cursor motion is a non-trigger key too.
        engine.apply('\u{2}', &mut config);
        assert!(!engine.completion.is_active());

        engine.apply('\t', &mut config);
        assert_eq!(calls.get(), 2);
        assert_eq!(engine.buffer.to_string(), "apple");
    }

    #[test]
    fn test_common_prefix_style() {
        let mut buffer = LineBuffer::from("ls a");
        let mut state = CompletionState::default();
        let mut completer = |_: &str, _: usize| {
            (3_isize, vec!["apple".to_string(), "apricot".to_string()])
        };

        assert!(state.trigger(&mut buffer, &mut completer, CompletionStyle::CommonPrefix));
        assert_eq!(buffer.to_string(), "ls ap");
        assert_eq!(buffer.cursor(), 5);
        assert!(!state.is_active());

        // Second trigger has nothing more to add.
        assert!(!state.trigger(&mut buffer, &mut completer, CompletionStyle::CommonPrefix));
    }

    #[test_case(&["apple", "apricot"], "ap")]
    #[test_case(&["日本語", "日本"], "日本")]
    #[test_case(&["same"], "same")]
    #[test_case(&["x", "y"], "")]
    #[test_case(&[], "")]
    fn test_common_prefix(candidates: &[&str], expected: &str) {
        let candidates: Vec<String> = candidates.iter().map(|it| (*it).to_string()).collect();
        assert_eq!(common_prefix(&candidates), expected);
    }
}
