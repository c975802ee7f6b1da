// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

//! Tab completes file names from the word under the cursor. Spaces in names are
//! escaped with `\`.
//!
//! ```text
//! cargo run --example complete -- --style common-prefix
//! ```

use clap::Parser;
use r3bl_readline::{CompletionStyle, Readline, ReadlineError, ok};
use std::{fs, path::Path};

#[derive(Debug, Parser)]
#[command(about = "Read lines with file name completion", version)]
struct CliArg {
    /// `cycle` or `common-prefix`.
    #[arg(long, default_value_t = CompletionStyle::Cycle)]
    style: CompletionStyle,
}

fn main() -> miette::Result<()> {
    let cli_arg = CliArg::parse();

    let mut readline = Readline::new()
        .with_completer(complete_file_name)
        .with_completion_style(cli_arg.style);
    loop {
        match readline.read_line() {
            Ok(line) if line == "quit" => break,
            Ok(line) => println!("Hello: {line}"),
            Err(ReadlineError::EndOfInput) => break,
            Err(err) => return Err(err.into()),
        }
    }

    ok!()
}

/// Complete the word that ends at `cursor`. The anchor is the start of that word.
fn complete_file_name(line: &str, cursor: usize) -> (isize, Vec<String>) {
    let chars: Vec<char> = line.chars().collect();
    let cursor = cursor.min(chars.len());

    let mut anchor = cursor;
    while anchor > 0 && !(chars[anchor - 1] == ' ' && (anchor < 2 || chars[anchor - 2] != '\\'))
    {
        anchor -= 1;
    }

    let word: String = chars[anchor..].iter().collect();
    let word = word.replace("\\ ", " ");
    let (dir, prefix) = match word.rfind('/') {
        Some(slash) => (&word[..=slash], &word[slash + 1..]),
        None => ("", word.as_str()),
    };

    let Ok(entries) = fs::read_dir(if dir.is_empty() { Path::new(".") } else { Path::new(dir) })
    else {
        return (-1, Vec::new());
    };

    let mut candidates: Vec<String> = entries
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let name = entry.file_name().into_string().ok()?;
            if !name.starts_with(prefix) {
                return None;
            }
            let is_dir = entry.file_type().is_ok_and(|file_type| file_type.is_dir());
            let suffix = if is_dir { "/" } else { "" };
            Some(format!("{dir}{name}{suffix}").replace(' ', "\\ "))
        })
        .collect();
    candidates.sort();

    (isize::try_from(anchor).unwrap_or(-1), candidates)
}
