//! Literal-only parser for keyword argument values.
//!
//! Accepts integers, floats, booleans, null, and quoted strings. Nothing else
//! is ever interpreted.

use nom::{
    IResult,
    branch::alt,
    bytes::complete::tag,
    character::complete::{char, digit1, one_of},
    combinator::{opt, recognize},
    sequence::tuple,
};

use gatekeep_core::Value;

/// Parse a keyword value such as `10`, `-2.5`, `True`, or `'firebolt'`.
///
/// Empty text is `Value::Null`, matching a bare `key=`.
pub fn parse_literal(input: &str) -> Result<Value, String> {
    let text = input.trim();
    if text.is_empty() {
        return Ok(Value::Null);
    }
    match alt((parse_bool, parse_null, parse_number, parse_quoted))(text) {
        Ok((rest, value)) if rest.trim().is_empty() => Ok(value),
        Ok((rest, _)) => Err(format!("unexpected trailing input {:?}", rest.trim())),
        Err(_) => Err(format!(
            "{text:?} is not a number, boolean, null, or quoted string"
        )),
    }
}

/// Parse `true`/`false` in either Python or lowercase spelling.
fn parse_bool(input: &str) -> IResult<&str, Value> {
    let (rest, word) = alt((tag("true"), tag("True"), tag("false"), tag("False")))(input)?;
    Ok((rest, Value::Bool(word.eq_ignore_ascii_case("true"))))
}

/// Parse `null` or `None`.
fn parse_null(input: &str) -> IResult<&str, Value> {
    let (rest, _) = alt((tag("null"), tag("None")))(input)?;
    Ok((rest, Value::Null))
}

/// Parse a signed integer or float with an optional exponent.
fn parse_number(input: &str) -> IResult<&str, Value> {
    let (rest, num_str) = recognize(tuple((
        opt(one_of("+-")),
        digit1,
        opt(tuple((char('.'), digit1))),
        opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
    )))(input)?;

    let is_float = num_str.contains(['.', 'e', 'E']);
    if is_float {
        let f: f64 = num_str.parse().map_err(|_| {
            nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Float))
        })?;
        Ok((rest, Value::Float(f)))
    } else {
        let i: i64 = num_str.parse().map_err(|_| {
            nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Digit))
        })?;
        Ok((rest, Value::Int(i)))
    }
}

/// Parse a single- or double-quoted string with simple escapes.
fn parse_quoted(input: &str) -> IResult<&str, Value> {
    let (body, quote) = one_of("'\"")(input)?;
    let mut result = String::new();
    let mut chars = body.char_indices();
    while let Some((i, c)) = chars.next() {
        match c {
            c if c == quote => return Ok((&body[i + 1..], Value::String(result))),
            '\\' => match chars.next() {
                Some((_, 'n')) => result.push('\n'),
                Some((_, 't')) => result.push('\t'),
                Some((_, e @ ('\\' | '\'' | '"'))) => result.push(e),
                Some((_, other)) => {
                    result.push('\\');
                    result.push(other);
                }
                None => break,
            },
            c => result.push(c),
        }
    }
    Err(nom::Err::Error(nom::error::Error::new(
        input,
        nom::error::ErrorKind::Char,
    )))
}
