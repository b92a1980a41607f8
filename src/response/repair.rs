//! Best-effort repair of almost-JSON.
//!
//! A single left-to-right scan over three states:
//!
//! - [`State::Bare`]: between tokens. Control characters other than JSON whitespace
//!   are dropped, trailing commas before `}`/`]` are removed.
//! - [`State::InString`]: inside a string literal. Raw newlines, tabs and carriage
//!   returns become escapes, other control characters become `\u00XX`.
//! - [`State::Escape`]: just after a backslash inside a string. Valid escapes pass
//!   through, `\'` becomes `'`, anything else is a literal backslash and is doubled.
//!
//! Typographic punctuation is normalized to ASCII in every state. A typographic
//! double quote opens a string outside strings. Inside a string it closes it only
//! when the string was opened by one, otherwise it is escaped as content.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Bare,
    InString,
    Escape,
}

/// Repairs `text` so that it has a better chance of parsing as JSON. Never fails.
pub fn repair(text: &str) -> String {
    let chars: Vec<char> = text.chars().collect();
    let mut out = String::with_capacity(text.len() + 16);
    let mut state = State::Bare;
    let mut opened_typographic = false;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        match state {
            State::Bare => {
                match c {
                    '"' => {
                        out.push('"');
                        opened_typographic = false;
                        state = State::InString;
                    }
                    c if is_typographic_double(c) => {
                        out.push('"');
                        opened_typographic = true;
                        state = State::InString;
                    }
                    ',' if closes_after_whitespace(&chars, i + 1) => {}
                    '\n' | '\r' | '\t' => out.push(c),
                    c if c.is_control() => {}
                    c => push_normalized(&mut out, c),
                }
                i += 1;
            }
            State::InString => {
                match c {
                    '"' => {
                        out.push('"');
                        state = State::Bare;
                    }
                    '\\' => state = State::Escape,
                    c if is_typographic_double(c) && opened_typographic => {
                        out.push('"');
                        state = State::Bare;
                    }
                    c if is_typographic_double(c) => out.push_str("\\\""),
                    '\n' => out.push_str("\\n"),
                    '\r' => out.push_str("\\r"),
                    '\t' => out.push_str("\\t"),
                    c if c.is_control() => {
                        out.push_str(&format!("\\u{:04x}", c as u32));
                    }
                    c => push_normalized(&mut out, c),
                }
                i += 1;
            }
            State::Escape => {
                match c {
                    '"' | '\\' | '/' | 'b' | 'f' | 'n' | 'r' | 't' => {
                        out.push('\\');
                        out.push(c);
                        i += 1;
                    }
                    'u' if is_hex4(&chars, i + 1) => {
                        out.push_str("\\u");
                        i += 1;
                    }
                    '\'' => {
                        out.push('\'');
                        i += 1;
                    }
                    // Literal backslash; `c` is reprocessed as string content.
                    _ => out.push_str("\\\\"),
                }
                state = State::InString;
            }
        }
    }

    if state == State::Escape {
        out.push_str("\\\\");
    }

    out
}

fn is_typographic_double(c: char) -> bool {
    matches!(c, '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{2033}')
}

fn push_normalized(out: &mut String, c: char) {
    match c {
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => out.push('\''),
        '\u{2013}' | '\u{2014}' | '\u{2015}' | '\u{2212}' => out.push('-'),
        '\u{2026}' => out.push_str("..."),
        '\u{00A0}' | '\u{2007}' | '\u{202F}' => out.push(' '),
        c => out.push(c),
    }
}

fn closes_after_whitespace(chars: &[char], from: usize) -> bool {
    chars[from..]
        .iter()
        .find(|c| !c.is_whitespace())
        .is_some_and(|c| *c == '}' || *c == ']')
}

fn is_hex4(chars: &[char], from: usize) -> bool {
    chars.len() >= from + 4 && chars[from..from + 4].iter().all(|c| c.is_ascii_hexdigit())
}
