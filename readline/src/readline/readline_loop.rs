// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! The edit loop and the public read API.
//!
//! One read runs `render → blocking read → dispatch` until a key ends the read, the
//! input closes, or the [`CancellationToken`] fires:
//!
//! | how the read ends                | result                          |
//! |----------------------------------|---------------------------------|
//! | `Enter` (code 10 or 13)          | `Ok(line)`                      |
//! | `Ctrl+C` (code 3) as data        | `Ok("")`                        |
//! | interrupt via the watcher        | `Ok("")`                        |
//! | `Ctrl+D` (code 4) on empty line  | `Err(ReadlineError::EndOfInput)`|
//! | input closed, empty line         | `Err(ReadlineError::EndOfInput)`|
//! | input closed, non-empty line     | `Ok(line)`                      |
//! | read or write failure            | `Err(ReadlineError::Io)`        |
//!
//! The terminal mode is restored on every one of these paths.

use crate::{CancellationToken, Completer, CompletionStyle, DisplayEngine, EditEngine,
            EditOutcome, Frame, InterruptWatcher, LineBuffer, PlatformSession,
            ReadlineConfig, ReadlineError, SessionEvent, TerminalSession, ok};
use strum_macros::{Display, IntoStaticStr};

/// Log every decoded code point (never in [`ReadMode::Password`]).
pub const DEBUG_READLINE_SHOW_KEYS: bool = false;

/// What gets painted for the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum ReadMode {
    /// The code points themselves.
    Line,
    /// [`ReadlineConfig::mask`] in place of every code point.
    Password,
}

/// Reads lines from the terminal with a reusable [`ReadlineConfig`].
///
/// ```no_run
/// use r3bl_readline::Readline;
///
/// let mut readline = Readline::new().with_prompt("password: ").with_mask('•');
/// let secret = readline.read_password()?;
/// # Ok::<(), r3bl_readline::ReadlineError>(())
/// ```
#[derive(Debug, Default)]
pub struct Readline {
    config: ReadlineConfig,
}

impl From<ReadlineConfig> for Readline {
    fn from(config: ReadlineConfig) -> Self { Self { config } }
}

impl Readline {
    /// Prompt `"> "`, mask `'*'`, no completion.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn with_prompt(self, prompt: impl Into<String>) -> Self {
        self.map_config(|config| config.with_prompt(prompt))
    }

    #[must_use]
    pub fn with_mask(self, mask: char) -> Self {
        self.map_config(|config| config.with_mask(mask))
    }

    #[must_use]
    pub fn with_completer(self, completer: impl Completer + 'static) -> Self {
        self.map_config(|config| config.with_completer(completer))
    }

    #[must_use]
    pub fn with_completion_style(self, completion_style: CompletionStyle) -> Self {
        self.map_config(|config| config.with_completion_style(completion_style))
    }

    #[must_use]
    pub fn with_fallback_width(self, fallback_width: u16) -> Self {
        self.map_config(|config| config.with_fallback_width(fallback_width))
    }

    fn map_config(self, f: impl FnOnce(ReadlineConfig) -> ReadlineConfig) -> Self {
        Self {
            config: f(self.config),
        }
    }

    #[must_use]
    pub fn config(&self) -> &ReadlineConfig { &self.config }

    pub fn config_mut(&mut self) -> &mut ReadlineConfig { &mut self.config }

    /// Read one line, echoing what is typed.
    ///
    /// # Errors
    ///
    /// - [`ReadlineError::Mode`] if the terminal can't be put into raw mode.
    /// - [`ReadlineError::Io`] if reading or writing fails mid-line.
    /// - [`ReadlineError::EndOfInput`] on `Ctrl+D` or closed input with an empty line.
    pub fn read_line(&mut self) -> Result<String, ReadlineError> {
        self.read(ReadMode::Line)
    }

    /// Like [`Readline::read_line()`], but only the mask glyph is ever written.
    ///
    /// # Errors
    ///
    /// See [`Readline::read_line()`].
    pub fn read_password(&mut self) -> Result<String, ReadlineError> {
        self.read(ReadMode::Password)
    }

    fn read(&mut self, mode: ReadMode) -> Result<String, ReadlineError> {
        let cancellation = CancellationToken::new();
        let mut session = PlatformSession::open(&cancellation)?;
        let mut watcher = InterruptWatcher::start(cancellation.clone())?;

        let result = run_edit_loop(&mut session, &mut self.config, mode, &cancellation);

        watcher.stop();
        let closed = session.close();
        tracing::debug!(
            message = "line read finished",
            %mode,
            cancelled = cancellation.is_cancelled(),
            ok = result.is_ok()
        );

        let line = result?;
        closed?;
        ok!(line)
    }
}

/// Read one line with the default prompt settings replaced by `prompt`.
///
/// # Errors
///
/// See [`Readline::read_line()`].
pub fn read_line(prompt: impl Into<String>) -> Result<String, ReadlineError> {
    Readline::new().with_prompt(prompt).read_line()
}

/// Read one masked line with the given `prompt`.
///
/// # Errors
///
/// See [`Readline::read_line()`].
pub fn read_password(prompt: impl Into<String>) -> Result<String, ReadlineError> {
    Readline::new().with_prompt(prompt).read_password()
}

/// Drive one read on an already open `session`.
///
/// The buffer is painted before every blocking read, and once more before leaving if
/// keys from the last batch changed it. Unless a read or write failed, the cursor is
/// then moved below the rendered rows onto a fresh line.
///
/// # Errors
///
/// [`ReadlineError::Io`] from the session, or [`ReadlineError::EndOfInput`].
pub fn run_edit_loop(
    session: &mut impl TerminalSession,
    config: &mut ReadlineConfig,
    mode: ReadMode,
    cancellation: &CancellationToken,
) -> Result<String, ReadlineError> {
    let mut engine = EditEngine::new();
    let mut display = DisplayEngine::new();
    let mut dirty = true;

    let result = 'read: loop {
        render(session, &mut display, config, &engine.buffer, mode, dirty)?;
        dirty = false;

        let event = session.read_keys()?;
        if cancellation.is_cancelled() {
            tracing::debug!(message = "read cancelled by interrupt");
            engine.buffer.clear();
            break 'read Ok(String::new());
        }

        match event {
            SessionEvent::Interrupted => {}
            SessionEvent::EndOfInput if engine.buffer.is_empty() => {
                break 'read Err(ReadlineError::EndOfInput);
            }
            SessionEvent::EndOfInput => break 'read Ok(engine.buffer.to_string()),
            SessionEvent::Keys(keys) => {
                for code in keys {
                    if DEBUG_READLINE_SHOW_KEYS && mode == ReadMode::Line {
                        tracing::debug!(message = "key", code = u32::from(code));
                    }
                    match engine.apply(code, config) {
                        EditOutcome::Unchanged => {}
                        EditOutcome::Changed => dirty = true,
                        EditOutcome::Submit => break 'read Ok(engine.buffer.to_string()),
                        EditOutcome::Abort => break 'read Ok(String::new()),
                        EditOutcome::EndOfInput => break 'read Err(ReadlineError::EndOfInput),
                    }
                }
            }
        }
    };

    if dirty {
        render(session, &mut display, config, &engine.buffer, mode, true)?;
    }
    session.paint(&display.finish())?;
    result
}

fn render(
    session: &mut impl TerminalSession,
    display: &mut DisplayEngine,
    config: &ReadlineConfig,
    buffer: &LineBuffer,
    mode: ReadMode,
    dirty: bool,
) -> Result<(), ReadlineError> {
    let frame = Frame {
        prompt: &config.prompt,
        buffer,
        mask: match mode {
            ReadMode::Line => None,
            ReadMode::Password => Some(config.mask),
        },
        width: config.effective_width(session.terminal_width()),
    };
    let ops = display.render(&frame, dirty);
    session.paint(&ops)
}
