// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

use std::fmt::{Debug, Formatter};
use strum_macros::{Display, EnumString};

pub const DEFAULT_PROMPT: &str = "> ";
pub const DEFAULT_MASK: char = '*';
/// Used when the terminal reports a width of 0 (or can't report one at all).
pub const DEFAULT_FALLBACK_WIDTH: u16 = 80;

/// Completion callback.
///
/// Receives the current line and the cursor position, both in code points (not bytes),
/// and returns `(anchor, candidates)`. `anchor` is the code point index where a
/// candidate replaces the rest of the line. A negative anchor, or an anchor past the end
/// of the line, or an empty candidate list means there is nothing to offer.
///
/// Any `FnMut(&str, usize) -> (isize, Vec<String>)` closure is a [`Completer`].
///
/// ```
/// use r3bl_readline::{Readline, ReadlineConfig};
///
/// let config = ReadlineConfig::default().with_completer(|line: &str, _cursor: usize| {
///     let anchor = line.rfind(' ').map_or(0, |it| it + 1);
///     let anchor = line[..anchor].chars().count();
///     (anchor as isize, vec!["apple".to_string(), "apricot".to_string()])
/// });
/// let _readline = Readline::from(config);
/// ```
pub trait Completer {
    fn complete(&mut self, line: &str, cursor: usize) -> (isize, Vec<String>);
}

impl<F> Completer for F
where
    F: FnMut(&str, usize) -> (isize, Vec<String>),
{
    fn complete(&mut self, line: &str, cursor: usize) -> (isize, Vec<String>) {
        self(line, cursor)
    }
}

/// What a completion trigger (Tab) does with the candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Display, EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum CompletionStyle {
    /// Each trigger replaces the completion point with the next candidate, wrapping
    /// around after the last one.
    #[default]
    Cycle,
    /// A trigger replaces the completion point with the longest prefix all candidates
    /// share. No cycling.
    CommonPrefix,
}

/// Session configuration for one [`Readline`]. It is borrowed by each read and never
/// changed by it.
///
/// [`Readline`]: crate::Readline
pub struct ReadlineConfig {
    pub prompt: String,
    /// Glyph painted in place of every code point in password mode.
    pub mask: char,
    pub completer: Option<Box<dyn Completer>>,
    pub completion_style: CompletionStyle,
    pub fallback_width: u16,
}

impl Default for ReadlineConfig {
    fn default() -> Self {
        Self {
            prompt: DEFAULT_PROMPT.to_string(),
            mask: DEFAULT_MASK,
            completer: None,
            completion_style: CompletionStyle::default(),
            fallback_width: DEFAULT_FALLBACK_WIDTH,
        }
    }
}

impl Debug for ReadlineConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadlineConfig")
            .field("prompt", &self.prompt)
            .field("mask", &self.mask)
            .field("completer", &self.completer.as_ref().map(|_| "<callback>"))
            .field("completion_style", &self.completion_style)
            .field("fallback_width", &self.fallback_width)
            .finish()
    }
}

impl ReadlineConfig {
    #[must_use]
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    #[must_use]
    pub fn with_mask(mut self, mask: char) -> Self {
        self.mask = mask;
        self
    }

    #[must_use]
    pub fn with_completer(mut self, completer: impl Completer + 'static) -> Self {
        self.completer = Some(Box::new(completer));
        self
    }

    #[must_use]
    pub fn with_completion_style(mut self, completion_style: CompletionStyle) -> Self {
        self.completion_style = completion_style;
        self
    }

    /// A width of 0 is ignored.
    #[must_use]
    pub fn with_fallback_width(mut self, fallback_width: u16) -> Self {
        if fallback_width > 0 {
            self.fallback_width = fallback_width;
        }
        self
    }

    /// The width to lay out with, given what the platform reported.
    #[must_use]
    pub fn effective_width(&self, reported: Option<u16>) -> u16 {
        match reported {
            Some(width) if width > 0 => width,
            _ => self.fallback_width,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::str::FromStr;
    use test_case::test_case;

    #[test]
    fn test_defaults() {
        let config = ReadlineConfig::default();
        assert_eq!(config.prompt, "> ");
        assert_eq!(config.mask, '*');
        assert!(config.completer.is_none());
        assert_eq!(config.completion_style, CompletionStyle::Cycle);
        assert_eq!(config.fallback_width, 80);
    }

    #[test]
    fn test_builders() {
        let mut config = ReadlineConfig::default()
            .with_prompt("$ ")
            .with_mask('•')
            .with_completion_style(CompletionStyle::CommonPrefix)
            .with_fallback_width(0)
            .with_completer(|line: &str, cursor: usize| {
                (0_isize, vec![format!("{line}:{cursor}")])
            });
        assert_eq!(config.prompt, "$ ");
        assert_eq!(config.mask, '•');
        assert_eq!(config.fallback_width, 80);
        let completer = config.completer.as_mut().unwrap();
        assert_eq!(completer.complete("ab", 1), (0, vec!["ab:1".to_string()]));
        assert!(format!("{config:?}").contains("<callback>"));
    }

    #[test_case(None, 80)]
    #[test_case(Some(0), 80)]
    #[test_case(Some(132), 132)]
    fn test_effective_width(reported: Option<u16>, expected: u16) {
        assert_eq!(ReadlineConfig::default().effective_width(reported), expected);
    }

    #[test]
    fn test_completion_style_names() {
        assert_eq!(CompletionStyle::CommonPrefix.to_string(), "common-prefix");
        assert_eq!(CompletionStyle::from_str("cycle").unwrap(), CompletionStyle::Cycle);
    }
}
