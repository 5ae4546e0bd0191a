//! Tokeniser: splits an input line into delimiter- and quote-aware tokens,
//! keeping a parallel vector of "rest of line from here" suffixes.

use crate::error::Result;

/// Characters that separate tokens.
const DELIMITERS: &[char] = &[' ', '\t'];
/// Characters that open/close a quoted token.
const QUOTES: &[char] = &['"'];

/// Tokens and rests, indexed the same way the matcher indexes command levels.
///
/// `tokens[0]` and `rests[0]` both hold the original input line, as an audit
/// copy. `tokens[1..levels + 1]` are words already committed (followed by a
/// delimiter); `tokens[levels + 1]` is the word currently being typed, which
/// is empty when the line ends in trailing whitespace. `rests[i]` is the
/// suffix of the line starting at `tokens[i]`, delimiters included.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tokens {
    tokens: Vec<String>,
    rests: Vec<String>,
}

impl Tokens {
    /// Tokenise `input`. Never fails on well-formed UTF-8 input; quoting
    /// errors are tolerated by treating an unterminated quote as running to
    /// the end of the string, matching the reference implementation.
    pub fn tokenise(input: &str) -> Result<Self> {
        let mut tokens = vec![input.to_string()];
        let mut rests = vec![input.to_string()];

        let mut i = 0;
        let mut first = true;
        loop {
            let (leading, token, rest_start, next_i) = next_token(input, i)?;
            if token.is_none() && leading == 0 && !first {
                break;
            }
            rests.push(input[rest_start..].to_string());
            tokens.push(token.unwrap_or_default());
            first = false;
            match next_i {
                Some(n) => i = n,
                None => break,
            }
        }

        log::trace!("tokenised {input:?} into {} level(s)", tokens.len() - 2);
        Ok(Self { tokens, rests })
    }

    /// Number of command levels: the number of real tokens excluding the
    /// audit copy at index 0 and the trailing sentinel.
    pub fn levels(&self) -> usize {
        self.tokens.len() - 2
    }

    /// The token at 1-based index `i` (`i == 0` is the raw input audit copy).
    pub fn token(&self, i: usize) -> &str {
        self.tokens.get(i).map(String::as_str).unwrap_or("")
    }

    /// The rest-of-line suffix starting at the `i`-th token.
    pub fn rest(&self, i: usize) -> &str {
        self.rests.get(i).map(String::as_str).unwrap_or("")
    }

    /// The original, unmodified input line.
    pub fn raw(&self) -> &str {
        &self.tokens[0]
    }
}

/// Extract the next token starting at byte offset `start` in `input`.
///
/// Returns `(leading_delimiter_count, token, rest_start_offset, next_offset)`.
/// `next_offset` is `None` once the input is exhausted.
fn next_token(
    input: &str,
    start: usize,
) -> Result<(usize, Option<String>, usize, Option<usize>)> {
    let bytes = input.as_bytes();
    let mut i = start;
    let mut leading = 0;
    while i < bytes.len() && DELIMITERS.contains(&(bytes[i] as char)) {
        i += 1;
        leading += 1;
    }
    let rest_start = i;

    if i >= bytes.len() {
        return Ok((leading, None, rest_start, None));
    }

    let quote = QUOTES.contains(&(bytes[i] as char));
    let token_start = if quote { i + 1 } else { i };
    let mut j = token_start;
    let mut escape = false;

    if quote {
        while j < bytes.len() && !QUOTES.contains(&(bytes[j] as char)) {
            j += 1;
        }
        let token = input[token_start..j].to_string();
        let end = if j < bytes.len() { j + 1 } else { j };
        return Ok((leading, Some(token), rest_start, Some(end)));
    }

    while j < bytes.len() {
        let c = bytes[j] as char;
        if escape {
            escape = false;
            j += 1;
            continue;
        }
        if c == '\\' {
            escape = true;
            j += 1;
            continue;
        }
        if DELIMITERS.contains(&c) {
            break;
        }
        j += 1;
    }
    if j == token_start {
        return Ok((leading, None, rest_start, None));
    }
    Ok((leading, Some(input[token_start..j].to_string()), rest_start, Some(j)))
}
