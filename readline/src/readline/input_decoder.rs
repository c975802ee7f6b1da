// Copyright (c) 2025 R3BL LLC. Licensed under Apache License, Version 2.0.

// cspell:words keypad

//! Turns what the platform delivers into code points, one per logical keystroke.
//!
//! - [`ByteDecoder`]: raw bytes from a POSIX tty read. Decodes UTF-8, carrying a
//!   sequence split across two reads over to the next one. A read that ends in `\n` has
//!   that byte dropped. Navigation escape sequences become the equivalent control codes,
//!   any other escape sequence is swallowed whole.
//! - [`ConsoleKeyDecoder`]: console key records (Windows). Only key-down records produce
//!   a code point. UTF-16 surrogate pairs that arrive as two records are joined.
//!
//! Both are platform independent so they can be tested anywhere.
//!
//! | key   | ANSI                          | console   | code |
//! |-------|-------------------------------|-----------|------|
//! | Left  | `CSI D`, `SS3 D`              | `VK_LEFT` | `2`  |
//! | Right | `CSI C`, `SS3 C`              | `VK_RIGHT`| `6`  |
//! | Home  | `CSI H`, `SS3 H`, `CSI 1~/7~` | `VK_HOME` | `1`  |
//! | End   | `CSI F`, `SS3 F`, `CSI 4~/8~` | `VK_END`  | `5`  |

use smallvec::SmallVec;

/// Code points produced by one underlying read. Never split across two edit loop
/// iterations.
pub type KeyBatch = SmallVec<[char; 16]>;

pub const READ_BUFFER_SIZE: usize = 16;

const ESC: char = '\u{1B}';
const CTRL_A: char = '\u{01}';
const CTRL_B: char = '\u{02}';
const CTRL_E: char = '\u{05}';
const CTRL_F: char = '\u{06}';

/// Longest escape sequence kept around waiting for its final byte.
const MAX_PENDING_ESCAPE: usize = 16;

/// Decoder for the POSIX byte stream. Holds the tail of the previous read when it ended
/// in the middle of a UTF-8 sequence or an escape sequence.
#[derive(Debug, Default)]
pub struct ByteDecoder {
    utf8_pending: SmallVec<[u8; 4]>,
    escape_pending: SmallVec<[char; MAX_PENDING_ESCAPE]>,
}

impl ByteDecoder {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        !self.utf8_pending.is_empty() || !self.escape_pending.is_empty()
    }

    pub fn decode(&mut self, bytes: &[u8]) -> KeyBatch {
        let bytes = bytes.strip_suffix(b"\n").unwrap_or(bytes);

        let mut chars: SmallVec<[char; 32]> = self.escape_pending.drain(..).collect();
        self.decode_utf8(bytes, &mut chars);

        let mut batch = KeyBatch::new();
        let mut index = 0;
        while index < chars.len() {
            if chars[index] != ESC {
                batch.push(chars[index]);
                index += 1;
                continue;
            }
            match parse_escape(&chars[index..]) {
                EscapeParse::Lone => {
                    batch.push(ESC);
                    index += 1;
                }
                EscapeParse::Complete { len, key } => {
                    batch.extend(key);
                    index += len;
                }
                EscapeParse::Incomplete => {
                    let rest = &chars[index..];
                    if rest.len() < MAX_PENDING_ESCAPE {
                        self.escape_pending.extend_from_slice(rest);
                    }
                    break;
                }
            }
        }
        batch
    }

    fn decode_utf8(&mut self, bytes: &[u8], out: &mut SmallVec<[char; 32]>) {
        let mut combined: SmallVec<[u8; 32]> = self.utf8_pending.drain(..).collect();
        combined.extend_from_slice(bytes);

        let mut rest = combined.as_slice();
        loop {
            match std::str::from_utf8(rest) {
                Ok(text) => {
                    out.extend(text.chars());
                    return;
                }
                Err(err) => {
                    let (valid, after) = rest.split_at(err.valid_up_to());
                    if let Ok(text) = std::str::from_utf8(valid) {
                        out.extend(text.chars());
                    }
                    match err.error_len() {
                        // Truncated sequence at the end, wait for the next read.
                        None => {
                            self.utf8_pending.extend_from_slice(after);
                            return;
                        }
                        Some(invalid_len) => {
                            out.push(char::REPLACEMENT_CHARACTER);
                            rest = &after[invalid_len..];
                        }
                    }
                }
            }
        }
    }
}

#[derive(Debug, PartialEq, Eq)]
enum EscapeParse {
    /// `ESC` with nothing after it in this read.
    Lone,
    /// A whole sequence of `len` chars. `key` is the control code it maps to, if any.
    Complete { len: usize, key: Option<char> },
    /// The final byte has not arrived yet.
    Incomplete,
}

/// `chars[0]` is `ESC`.
fn parse_escape(chars: &[char]) -> EscapeParse {
    match chars.get(1) {
        None => EscapeParse::Lone,
        Some('[') => parse_csi(chars),
        Some('O') => match chars.get(2) {
            None => EscapeParse::Incomplete,
            // Not a final byte, decoded as a key on its own.
            Some(&last) if last.is_control() => EscapeParse::Complete { len: 2, key: None },
            Some(&last) => EscapeParse::Complete {
                len: 3,
                key: navigation_key(last),
            },
        },
        // Alt+key and friends.
        Some(_) => EscapeParse::Complete { len: 2, key: None },
    }
}

/// `ESC [ params* intermediates* final`.
fn parse_csi(chars: &[char]) -> EscapeParse {
    let body = &chars[2..];
    let params_len = body
        .iter()
        .take_while(|it| ('0'..='?').contains(*it))
        .count();
    let intermediates_len = body[params_len..]
        .iter()
        .take_while(|it| (' '..='/').contains(*it))
        .count();
    let final_index = params_len + intermediates_len;
    let Some(&last) = body.get(final_index) else {
        return EscapeParse::Incomplete;
    };
    if !('@'..='~').contains(&last) {
        // Malformed. Drop what was scanned so far, `last` is decoded as a key.
        return EscapeParse::Complete {
            len: 2 + final_index,
            key: None,
        };
    }
    let len = 2 + final_index + 1;

    let params: String = body[..params_len].iter().collect();
    let key = match (params.as_str(), last) {
        ("1" | "7", '~') => Some(CTRL_A),
        ("4" | "8", '~') => Some(CTRL_E),
        (_, '~') => None,
        // Modifiers (`CSI 1;5D`) are ignored, plain motion is kept.
        (_, other) => navigation_key(other),
    };
    EscapeParse::Complete { len, key }
}

fn navigation_key(last: char) -> Option<char> {
    match last {
        'D' => Some(CTRL_B),
        'C' => Some(CTRL_F),
        'H' => Some(CTRL_A),
        'F' => Some(CTRL_E),
        _ => None,
    }
}

// Virtual key codes, from `WinUser.h`.
pub const VK_END: u16 = 0x23;
pub const VK_HOME: u16 = 0x24;
pub const VK_LEFT: u16 = 0x25;
pub const VK_RIGHT: u16 = 0x27;

/// Decoder for console key records. Holds a high surrogate until its low half arrives.
#[derive(Debug, Default)]
pub struct ConsoleKeyDecoder {
    high_surrogate: Option<u16>,
}

impl ConsoleKeyDecoder {
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Decode the fields of one `KEY_EVENT_RECORD`.
    pub fn decode_key(
        &mut self,
        key_down: bool,
        virtual_key_code: u16,
        unicode_char: u16,
    ) -> Option<char> {
        if !key_down {
            return None;
        }

        if unicode_char == 0 {
            return match virtual_key_code {
                VK_LEFT => Some(CTRL_B),
                VK_RIGHT => Some(CTRL_F),
                VK_HOME => Some(CTRL_A),
                VK_END => Some(CTRL_E),
                _ => None,
            };
        }

        match unicode_char {
            0xD800..=0xDBFF => {
                self.high_surrogate = Some(unicode_char);
                None
            }
            0xDC00..=0xDFFF => {
                let high = self.high_surrogate.take()?;
                char::decode_utf16([high, unicode_char])
                    .next()
                    .and_then(Result::ok)
            }
            other => {
                self.high_surrogate = None;
                char::from_u32(u32::from(other))
            }
        }
    }
}
