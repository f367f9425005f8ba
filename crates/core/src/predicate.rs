//! The predicate capability and the arguments a rule passes to it.

use std::collections::BTreeMap;

use crate::error::PredicateError;
use crate::value::Value;

/// Arguments written inside a predicate call, e.g. `knows_spell(fire, name='firebolt')`.
///
/// Positional arguments keep their raw, trimmed source text. Keyword values
/// are literal-parsed when the rule is compiled.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PredicateArgs {
    positional: Vec<String>,
    keywords: BTreeMap<String, Value>,
}

impl PredicateArgs {
    /// Create an empty argument list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a positional argument.
    #[must_use]
    pub fn with_positional(mut self, raw: impl Into<String>) -> Self {
        self.positional.push(raw.into());
        self
    }

    /// Set a keyword argument. A repeated key keeps the last value.
    #[must_use]
    pub fn with_keyword(mut self, key: impl Into<String>, value: Value) -> Self {
        self.keywords.insert(key.into(), value);
        self
    }

    /// All positional arguments in source order.
    pub fn positional(&self) -> &[String] {
        &self.positional
    }

    /// The positional argument at `index`, if present.
    pub fn positional_at(&self, index: usize) -> Option<&str> {
        self.positional.get(index).map(String::as_str)
    }

    /// All keyword arguments, ordered by key.
    pub fn keywords(&self) -> &BTreeMap<String, Value> {
        &self.keywords
    }

    /// The keyword argument named `key`, if present.
    pub fn keyword(&self, key: &str) -> Option<&Value> {
        self.keywords.get(key)
    }

    /// `true` when the call had no arguments at all.
    pub fn is_empty(&self) -> bool {
        self.positional.is_empty() && self.keywords.is_empty()
    }
}

/// A boolean-producing function that rules can reference by name.
///
/// The actor and target are passed through untouched; the engine never
/// inspects them. The returned [`Value`] is coerced with
/// [`Value::is_truthy`].
pub trait Predicate<S: ?Sized>: Send + Sync {
    /// Evaluate the predicate for one pair of subjects.
    fn call(&self, actor: &S, target: &S, args: &PredicateArgs) -> Result<Value, PredicateError>;
}

impl<S, F> Predicate<S> for F
where
    S: ?Sized,
    F: Fn(&S, &S, &PredicateArgs) -> Result<Value, PredicateError> + Send + Sync,
{
    fn call(&self, actor: &S, target: &S, args: &PredicateArgs) -> Result<Value, PredicateError> {
        self(actor, target, args)
    }
}
