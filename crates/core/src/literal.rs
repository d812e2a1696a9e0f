//! Strict literal decoding for tool arguments.
//!
//! The model sends tool arguments as plain text (`6`, `[1, 2, 3]`,
//! `"hello"`). Model output must never reach an expression evaluator, so
//! this module is a small recursive-descent parser for literal structures
//! only: integers, floats, quoted strings, and arrays. Nothing here
//! evaluates anything.

/// A decoded literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Literal>),
}

/// Parse a literal structure from the raw argument text.
pub fn parse_literal(input: &str) -> Result<Literal, String> {
    let chars: Vec<char> = input.trim().chars().collect();
    let mut pos = 0;
    let value = parse_value(&chars, &mut pos)?;
    skip_ws(&chars, &mut pos);
    if pos < chars.len() {
        return Err(format!("unexpected trailing input at position {pos}"));
    }
    Ok(value)
}

/// Parse `raw` as a base-10 integer.
pub fn parse_int(raw: &str) -> Result<i64, String> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| format!("expected a base-10 integer, got '{}'", raw.trim()))
}

/// Parse `raw` as a literal array of integers, e.g. `[73, 78, 68]`.
pub fn parse_int_list(raw: &str) -> Result<Vec<i64>, String> {
    match parse_literal(raw)? {
        Literal::List(items) => items
            .into_iter()
            .map(|item| match item {
                Literal::Int(n) => Ok(n),
                other => Err(format!("expected an integer element, got {other:?}")),
            })
            .collect(),
        other => Err(format!("expected a list of integers, got {other:?}")),
    }
}

/// Strip one layer of matching surrounding quote characters, if present.
///
/// `"hello"` and `'hello'` both become `hello`; anything else is returned
/// trimmed but otherwise untouched.
pub fn unquote(raw: &str) -> String {
    let trimmed = raw.trim();
    let mut chars = trimmed.chars();
    match (chars.next(), trimmed.chars().last()) {
        (Some(first), Some(last))
            if trimmed.chars().count() >= 2 && first == last && (first == '"' || first == '\'') =>
        {
            trimmed[first.len_utf8()..trimmed.len() - last.len_utf8()].to_string()
        }
        _ => trimmed.to_string(),
    }
}

// ── Recursive-descent parser ──────────────────────────────────────────────

fn parse_value(chars: &[char], pos: &mut usize) -> Result<Literal, String> {
    skip_ws(chars, pos);
    match chars.get(*pos) {
        Some('[') => parse_list(chars, pos),
        Some('"') | Some('\'') => parse_string(chars, pos),
        Some(c) if c.is_ascii_digit() || *c == '-' || *c == '+' => parse_number(chars, pos),
        Some(c) => Err(format!("unexpected character '{c}' at position {pos}", pos = *pos)),
        None => Err("unexpected end of input".into()),
    }
}

fn parse_list(chars: &[char], pos: &mut usize) -> Result<Literal, String> {
    *pos += 1; // consume '['
    let mut items = Vec::new();
    loop {
        skip_ws(chars, pos);
        match chars.get(*pos) {
            Some(']') => {
                *pos += 1;
                return Ok(Literal::List(items));
            }
            None => return Err("unterminated list".into()),
            _ => {}
        }
        items.push(parse_value(chars, pos)?);
        skip_ws(chars, pos);
        match chars.get(*pos) {
            Some(',') => {
                *pos += 1;
            }
            Some(']') => {}
            Some(c) => return Err(format!("expected ',' or ']', got '{c}'")),
            None => return Err("unterminated list".into()),
        }
    }
}

fn parse_string(chars: &[char], pos: &mut usize) -> Result<Literal, String> {
    let quote = chars[*pos];
    *pos += 1;
    let mut out = String::new();
    loop {
        match chars.get(*pos) {
            Some('\\') => {
                *pos += 1;
                match chars.get(*pos) {
                    Some(escaped) => {
                        out.push(match escaped {
                            'n' => '\n',
                            't' => '\t',
                            other => *other,
                        });
                        *pos += 1;
                    }
                    None => return Err("dangling escape at end of string".into()),
                }
            }
            Some(c) if *c == quote => {
                *pos += 1;
                return Ok(Literal::Str(out));
            }
            Some(c) => {
                out.push(*c);
                *pos += 1;
            }
            None => return Err("unterminated string literal".into()),
        }
    }
}

fn parse_number(chars: &[char], pos: &mut usize) -> Result<Literal, String> {
    let start = *pos;
    if matches!(chars.get(*pos), Some('-') | Some('+')) {
        *pos += 1;
    }
    let mut is_float = false;
    while let Some(c) = chars.get(*pos) {
        if c.is_ascii_digit() {
            *pos += 1;
        } else if *c == '.' && !is_float {
            is_float = true;
            *pos += 1;
        } else {
            break;
        }
    }
    let text: String = chars[start..*pos].iter().collect();
    if is_float {
        text.parse::<f64>()
            .map(Literal::Float)
            .map_err(|_| format!("invalid float: {text}"))
    } else {
        text.parse::<i64>()
            .map(Literal::Int)
            .map_err(|_| format!("invalid integer: {text}"))
    }
}

fn skip_ws(chars: &[char], pos: &mut usize) {
    while matches!(chars.get(*pos), Some(c) if c.is_whitespace()) {
        *pos += 1;
    }
}
