//! Predicate call extraction: `name(arg, key=literal, ...)`.
//!
//! Calls cannot nest: an argument list may not contain parentheses.

use std::ops::Range;
use std::sync::LazyLock;

use regex::Regex;

use gatekeep_core::PredicateArgs;

use crate::error::CompileError;
use crate::parser::literal::parse_literal;

/// Matches one predicate call with no nested parentheses.
static CALL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\w+\([^()]*\)").expect("call regex is valid"));

/// A call found in an expression, with its byte span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct CallSite<'a> {
    pub text: &'a str,
    pub span: Range<usize>,
}

/// A call split into its predicate name and parsed arguments.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct ParsedCall {
    pub name: String,
    pub args: PredicateArgs,
}

/// Find every call in `expression`, left to right.
pub(crate) fn find_calls(expression: &str) -> Vec<CallSite<'_>> {
    CALL_RE
        .find_iter(expression)
        .map(|m| CallSite {
            text: m.as_str(),
            span: m.range(),
        })
        .collect()
}

/// Split `name(args)` into a name and parsed arguments.
pub(crate) fn split_call(call: &str) -> Result<ParsedCall, CompileError> {
    let malformed = |reason: &str| CompileError::MalformedCall {
        call: call.to_owned(),
        reason: reason.to_owned(),
    };

    let (name, rest) = call
        .split_once('(')
        .ok_or_else(|| malformed("missing '('"))?;
    let name = name.trim();
    if !is_identifier(name) {
        return Err(malformed("predicate name must be an identifier"));
    }

    let raw_args = rest.trim().trim_end_matches(')');
    let args = parse_args(call, raw_args)?;

    Ok(ParsedCall {
        name: name.to_owned(),
        args,
    })
}

/// Parse `a, b, key=literal` into positional and keyword arguments.
fn parse_args(call: &str, raw: &str) -> Result<PredicateArgs, CompileError> {
    let mut args = PredicateArgs::new();
    for part in raw.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        if let Some((key, value)) = part.split_once('=') {
            let key = key.trim();
            if !is_identifier(key) {
                return Err(CompileError::MalformedCall {
                    call: call.to_owned(),
                    reason: format!("keyword name {key:?} must be an identifier"),
                });
            }
            let value = parse_literal(value).map_err(|reason| CompileError::InvalidLiteral {
                call: call.to_owned(),
                key: key.to_owned(),
                reason,
            })?;
            args = args.with_keyword(key, value);
        } else {
            args = args.with_positional(part);
        }
    }
    Ok(args)
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
