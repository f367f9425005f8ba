use std::fmt;
use std::ops::Range;

use serde::{Serialize, Serializer};

/// One token of a rule's boolean skeleton.
///
/// Predicate calls are replaced by [`Token::Slot`]; nothing else from the
/// source text survives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// Placeholder for one predicate result.
    Slot,
    /// `and`
    And,
    /// `or`
    Or,
    /// `not`
    Not,
    /// `(`
    Open,
    /// `)`
    Close,
}

impl Token {
    fn as_str(self) -> &'static str {
        match self {
            Self::Slot => "%s",
            Self::And => "and",
            Self::Or => "or",
            Self::Not => "not",
            Self::Open => "(",
            Self::Close => ")",
        }
    }
}

/// The boolean template of a rule expression.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Skeleton {
    tokens: Vec<Token>,
}

impl Skeleton {
    /// Tokenize `expression`, turning each span in `calls` into a slot.
    ///
    /// `calls` must be sorted and non-overlapping. Text between calls may
    /// only hold whitespace, parentheses, and the words `and`, `or`, `not`
    /// in any case; anything else is reported as an error.
    pub fn tokenize(expression: &str, calls: &[Range<usize>]) -> Result<Self, String> {
        let mut tokens = Vec::new();
        let mut cursor = 0;
        for span in calls {
            lex_gap(&expression[cursor..span.start], &mut tokens)?;
            tokens.push(Token::Slot);
            cursor = span.end;
        }
        lex_gap(&expression[cursor..], &mut tokens)?;
        Ok(Self { tokens })
    }

    #[cfg(test)]
    pub(crate) fn from_tokens(tokens: Vec<Token>) -> Self {
        Self { tokens }
    }

    /// The token sequence.
    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    /// Number of slots.
    pub fn slot_count(&self) -> usize {
        self.tokens.iter().filter(|t| **t == Token::Slot).count()
    }
}

/// Lex the text between two calls.
fn lex_gap(gap: &str, tokens: &mut Vec<Token>) -> Result<(), String> {
    let mut chars = gap.char_indices().peekable();
    while let Some((start, c)) = chars.next() {
        match c {
            c if c.is_whitespace() => {}
            '(' => tokens.push(Token::Open),
            ')' => tokens.push(Token::Close),
            c if c.is_alphanumeric() || c == '_' => {
                let mut end = start + c.len_utf8();
                while let Some(&(i, next)) = chars.peek() {
                    if !(next.is_alphanumeric() || next == '_') {
                        break;
                    }
                    end = i + next.len_utf8();
                    chars.next();
                }
                let word = &gap[start..end];
                let token = if word.eq_ignore_ascii_case("and") {
                    Token::And
                } else if word.eq_ignore_ascii_case("or") {
                    Token::Or
                } else if word.eq_ignore_ascii_case("not") {
                    Token::Not
                } else {
                    return Err(format!("unexpected word {word:?}"));
                };
                tokens.push(token);
            }
            other => return Err(format!("unexpected character {other:?}")),
        }
    }
    Ok(())
}

impl fmt::Display for Skeleton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut prev: Option<Token> = None;
        for &token in &self.tokens {
            let tight = matches!(prev, None | Some(Token::Open)) || token == Token::Close;
            if !tight {
                f.write_str(" ")?;
            }
            f.write_str(token.as_str())?;
            prev = Some(token);
        }
        Ok(())
    }
}

impl Serialize for Skeleton {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokenize(expression: &str) -> Result<Skeleton, String> {
        let spans: Vec<Range<usize>> = crate::parser::call::find_calls(expression)
            .into_iter()
            .map(|c| c.span)
            .collect();
        Skeleton::tokenize(expression, &spans)
    }

    #[test]
    fn calls_become_slots_and_keywords_are_lowercased() {
        let skeleton = tokenize("has_mana(10) AND knows_spell(name='firebolt')").unwrap();
        assert_eq!(skeleton.tokens(), [Token::Slot, Token::And, Token::Slot]);
        assert_eq!(skeleton.to_string(), "%s and %s");
    }

    #[test]
    fn parentheses_and_not_are_kept() {
        let skeleton = tokenize("Not (f(1) oR g(2))").unwrap();
        assert_eq!(
            skeleton.tokens(),
            [
                Token::Not,
                Token::Open,
                Token::Slot,
                Token::Or,
                Token::Slot,
                Token::Close
            ]
        );
        assert_eq!(skeleton.to_string(), "not (%s or %s)");
        assert_eq!(skeleton.slot_count(), 2);
    }

    #[test]
    fn argument_text_never_reaches_the_skeleton() {
        let skeleton = tokenize("f(and, or=1, not='x')").unwrap();
        assert_eq!(skeleton.tokens(), [Token::Slot]);
    }

    #[test]
    fn stray_words_are_rejected() {
        let err = tokenize("f(1) xor g(2)").unwrap_err();
        assert!(err.contains("xor"));
    }

    #[test]
    fn keyword_must_be_a_whole_word() {
        let err = tokenize("f(1) andalso g(2)").unwrap_err();
        assert!(err.contains("andalso"));
    }

    #[test]
    fn operators_are_rejected() {
        let err = tokenize("f(1) && g(2)").unwrap_err();
        assert!(err.contains('&'));
        assert!(tokenize("f(1) == 1").is_err());
    }

    #[test]
    fn empty_expression_has_no_tokens() {
        let skeleton = tokenize("   ").unwrap();
        assert!(skeleton.tokens().is_empty());
        assert_eq!(skeleton.to_string(), "");
    }

    #[test]
    fn serializes_as_text() {
        let skeleton = tokenize("not f()").unwrap();
        assert_eq!(serde_json::to_string(&skeleton).unwrap(), "\"not %s\"");
    }
}
