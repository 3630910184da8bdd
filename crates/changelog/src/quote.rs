//! Shell-style quoting of change-log lines.
//!
//! Output quoting is minimal: a token is wrapped in double quotes only when
//! it is empty or contains whitespace or a single quote. The tokenizer
//! accepts the wider shell syntax (single quotes, adjacent quoted segments)
//! so hand-edited files still load. There are no backslash escapes.

use crate::error::{ChangeLogError, Result};

/// Quote `s` if it would not survive tokenizing as a single bare token.
pub fn quote(s: &str) -> String {
    if s.is_empty() || s.contains(|c: char| c.is_whitespace() || c == '\'') {
        format!("\"{}\"", s)
    } else {
        s.to_string()
    }
}

/// Join tokens into one change-log line.
pub fn join_params<S: AsRef<str>>(tokens: &[S]) -> String {
    tokens
        .iter()
        .map(|t| quote(t.as_ref()))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split a line into tokens.
pub fn tokenize(line: &str) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut in_token = false;
    let mut quote_char: Option<char> = None;

    for c in line.chars() {
        match quote_char {
            Some(q) if c == q => quote_char = None,
            Some(_) => current.push(c),
            None => match c {
                '"' | '\'' => {
                    quote_char = Some(c);
                    in_token = true;
                }
                c if c.is_whitespace() => {
                    if in_token {
                        tokens.push(std::mem::take(&mut current));
                        in_token = false;
                    }
                }
                c => {
                    current.push(c);
                    in_token = true;
                }
            },
        }
    }

    if let Some(q) = quote_char {
        return Err(ChangeLogError::Tokenize {
            line: line.to_string(),
            reason: format!("unterminated {} quote", q),
        });
    }
    if in_token {
        tokens.push(current);
    }
    Ok(tokens)
}
