// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words termios conin conout

//! # r3bl_readline
//!
//! A blocking, interactive line editor for terminals. It reads one line of text with
//! in-place editing, optional masked (password) input, and caller supplied tab
//! completion, while keeping the on-screen rendering consistent with the edit buffer
//! when the line wraps across several terminal rows.
//!
//! ```no_run
//! use r3bl_readline::{Readline, ReadlineError};
//!
//! let mut readline = Readline::new().with_prompt("$ ");
//! loop {
//!     match readline.read_line() {
//!         Ok(line) if line == "quit" => break,
//!         Ok(line) => println!("Hello: {line}"),
//!         Err(ReadlineError::EndOfInput) => break,
//!         Err(err) => {
//!             eprintln!("{err}");
//!             break;
//!         }
//!     }
//! }
//! ```
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │ readline_loop: render → blocking read → dispatch → loop          │
//! └───┬──────────────┬───────────────┬───────────────┬───────────────┘
//!     │              │               │               │
//!     ▼              ▼               ▼               ▼
//!  display      line_buffer      completion       session ◀── cancellation
//!  (layout,     (edit engine,    (cycle over      (raw mode,     (interrupt
//!  render ops,   code point       callback        decoded keys,   watcher)
//!  painters)     commands)        candidates)     painting)
//! ```
//!
//! | Module            | Responsibility                                            |
//! |-------------------|-----------------------------------------------------------|
//! | [`session`]       | [`TerminalSession`] contract, POSIX and console variants  |
//! | [`input_decoder`] | Raw bytes / console key records → code points             |
//! | [`line_buffer`]   | [`LineBuffer`] and the control-code command table         |
//! | [`completion`]    | [`CompletionState`] cycling over [`Completer`] candidates |
//! | [`display`]       | Layout walk, [`RenderOp`]s, [`DisplayEngine`]             |
//! | [`cancellation`]  | [`CancellationToken`] and the interrupt watcher           |
//!
//! # Platform variants
//!
//! - **Unix/Linux/macOS**: termios raw mode via [`rustix`], blocking reads multiplexed
//!   with a cancellation waker via [`mio`], `SIGINT` observed by [`signal_hook`].
//! - **Windows**: console modes, `ReadConsoleInputW` key records, and direct console
//!   painting via `windows-sys`. `CONIN$`/`CONOUT$` are opened when the standard
//!   streams are redirected.
//!
//! [`session`]: crate::readline::session
//! [`input_decoder`]: crate::readline::input_decoder
//! [`line_buffer`]: crate::readline::line_buffer
//! [`completion`]: crate::readline::completion
//! [`display`]: crate::readline::display
//! [`cancellation`]: crate::readline::cancellation
//! [`rustix`]: https://docs.rs/rustix
//! [`mio`]: https://docs.rs/mio
//! [`signal_hook`]: https://docs.rs/signal-hook

// Enforce strict error handling in production library code only. Tests and examples are
// allowed to use .unwrap() (workspace `Cargo.toml` config allows it). The cfg_attr
// ensures test code within the library can also use .unwrap() freely.
#![cfg_attr(not(test), deny(clippy::unwrap_in_result))]

// Attach modules (re-exported below to provide clean public API).
pub mod core;
pub mod readline;

// Re-export stable public API using glob imports for ergonomic, flat API surface.
#[allow(ambiguous_glob_reexports)]
pub use core::*;
#[allow(ambiguous_glob_reexports)]
pub use readline::*;
