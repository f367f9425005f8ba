//! Boolean gate: the parsed form of a [`Skeleton`].
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! or   := and ("or" and)*
//! and  := not ("and" not)*
//! not  := "not" not | atom
//! atom := slot | "(" or ")"
//! ```
//!
//! Only slots, `and`, `or`, `not`, and parentheses exist, so reducing a gate
//! cannot do anything but combine booleans.

use crate::ir::skeleton::{Skeleton, Token};

/// Deepest allowed nesting of `not` and parentheses.
pub const MAX_DEPTH: usize = 256;

/// A boolean expression tree over predicate results.
///
/// `and`/`or` chains are flattened, so tree depth only grows with `not` and
/// parentheses, both bounded by [`MAX_DEPTH`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Gate {
    /// The result of the n-th predicate invocation.
    Slot(usize),
    /// Logical negation.
    Not(Box<Gate>),
    /// Logical AND over two or more terms.
    And(Vec<Gate>),
    /// Logical OR over two or more terms.
    Or(Vec<Gate>),
}

impl Gate {
    /// Parse a skeleton. Slots are numbered left to right from zero.
    pub fn parse(skeleton: &Skeleton) -> Result<Self, String> {
        let mut parser = GateParser {
            tokens: skeleton.tokens(),
            pos: 0,
            next_slot: 0,
            depth: 0,
        };
        if parser.tokens.is_empty() {
            return Err("expression is empty".to_owned());
        }
        let gate = parser.parse_or()?;
        if let Some(token) = parser.peek() {
            return Err(format!("unexpected {} after complete expression", describe(token)));
        }
        Ok(gate)
    }

    /// Reduce the gate over per-slot results.
    ///
    /// A slot with no matching result reads as `false`.
    pub fn reduce(&self, results: &[bool]) -> bool {
        match self {
            Self::Slot(i) => results.get(*i).copied().unwrap_or(false),
            Self::Not(inner) => !inner.reduce(results),
            Self::And(terms) => terms.iter().all(|t| t.reduce(results)),
            Self::Or(terms) => terms.iter().any(|t| t.reduce(results)),
        }
    }

    /// Number of slots in the tree.
    pub fn slot_count(&self) -> usize {
        match self {
            Self::Slot(_) => 1,
            Self::Not(inner) => inner.slot_count(),
            Self::And(terms) | Self::Or(terms) => terms.iter().map(Self::slot_count).sum(),
        }
    }
}

struct GateParser<'a> {
    tokens: &'a [Token],
    pos: usize,
    next_slot: usize,
    depth: usize,
}

impl GateParser<'_> {
    fn peek(&self) -> Option<Token> {
        self.tokens.get(self.pos).copied()
    }

    fn eat(&mut self, token: Token) -> bool {
        if self.peek() == Some(token) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Run `parse` one nesting level deeper.
    fn nested(
        &mut self,
        parse: impl FnOnce(&mut Self) -> Result<Gate, String>,
    ) -> Result<Gate, String> {
        if self.depth >= MAX_DEPTH {
            return Err("expression nests too deeply".to_owned());
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn parse_or(&mut self) -> Result<Gate, String> {
        let first = self.parse_and()?;
        if self.peek() != Some(Token::Or) {
            return Ok(first);
        }
        let mut terms = vec![first];
        while self.eat(Token::Or) {
            terms.push(self.parse_and()?);
        }
        Ok(Gate::Or(terms))
    }

    fn parse_and(&mut self) -> Result<Gate, String> {
        let first = self.parse_not()?;
        if self.peek() != Some(Token::And) {
            return Ok(first);
        }
        let mut terms = vec![first];
        while self.eat(Token::And) {
            terms.push(self.parse_not()?);
        }
        Ok(Gate::And(terms))
    }

    fn parse_not(&mut self) -> Result<Gate, String> {
        if self.eat(Token::Not) {
            let inner = self.nested(Self::parse_not)?;
            return Ok(Gate::Not(Box::new(inner)));
        }
        self.parse_atom()
    }

    fn parse_atom(&mut self) -> Result<Gate, String> {
        match self.peek() {
            Some(Token::Slot) => {
                self.pos += 1;
                let slot = self.next_slot;
                self.next_slot += 1;
                Ok(Gate::Slot(slot))
            }
            Some(Token::Open) => {
                self.pos += 1;
                let inner = self.nested(Self::parse_or)?;
                if !self.eat(Token::Close) {
                    return Err("unbalanced parentheses: missing ')'".to_owned());
                }
                Ok(inner)
            }
            Some(token) => Err(format!(
                "expected a predicate call, found {}",
                describe(token)
            )),
            None => Err("expected a predicate call, found end of expression".to_owned()),
        }
    }
}

fn describe(token: Token) -> &'static str {
    match token {
        Token::Slot => "a predicate call",
        Token::And => "'and'",
        Token::Or => "'or'",
        Token::Not => "'not'",
        Token::Open => "'('",
        Token::Close => "')'",
    }
}
