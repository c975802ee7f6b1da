// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Echo every line back until `quit` or `Ctrl+D`, then optionally ask for a password.
//!
//! ```text
//! cargo run --example simple -- --password --log
//! ```

use clap::Parser;
use r3bl_readline::{Readline, ReadlineError, TracingConfig, ok,
                    try_initialize_logging_global};

#[derive(Debug, Parser)]
#[command(about = "Read lines with in-place editing", version)]
struct CliArg {
    /// Text shown before the editable line.
    #[arg(long, default_value = "> ")]
    prompt: String,

    /// After the line loop ends, read a masked password.
    #[arg(long)]
    password: bool,

    /// Write debug logs to `readline_log_file_debug.log`.
    #[arg(long)]
    log: bool,
}

fn main() -> miette::Result<()> {
    let cli_arg = CliArg::parse();

    if cli_arg.log {
        try_initialize_logging_global(TracingConfig::new_file(None))?;
        // % is Display, ? is Debug.
        tracing::debug!(message = "Start logging...", cli_arg = ?cli_arg);
    }

    let mut readline = Readline::new().with_prompt(cli_arg.prompt);
    loop {
        match readline.read_line() {
            Ok(line) if line == "quit" => break,
            Ok(line) => println!("Hello: {line}"),
            Err(ReadlineError::EndOfInput) => break,
            Err(err) => return Err(err.into()),
        }
    }

    if cli_arg.password {
        let secret = Readline::new().with_prompt("password: ").read_password()?;
        println!("Password has {} characters", secret.chars().count());
    }

    ok!()
}
