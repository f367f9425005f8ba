use std::collections::HashMap;
use std::fmt;

use tracing::trace;

use gatekeep_core::{PredicateError, PredicateRegistry};

use crate::error::{CompileWarning, RuleCompilationError};
use crate::ir::rule::{CompiledRule, RuleSummary};
use crate::parser::{ParseOutput, ParserConfig, RuleParser};

/// The compiled rules for one piece of rule text, keyed by access type.
///
/// A condition set is built once and never changes. Build a new one from new
/// text instead of editing an existing one.
pub struct ConditionSet<S: ?Sized> {
    raw: String,
    rules: HashMap<String, CompiledRule<S>>,
    warnings: Vec<CompileWarning>,
}

impl<S: ?Sized> ConditionSet<S> {
    /// Compile `text` with the default parser settings.
    pub fn from_text(
        text: &str,
        registry: &PredicateRegistry<S>,
    ) -> Result<Self, RuleCompilationError> {
        Self::from_text_with(text, registry, &ParserConfig::default())
    }

    /// Compile `text` with explicit parser settings.
    pub fn from_text_with(
        text: &str,
        registry: &PredicateRegistry<S>,
        config: &ParserConfig,
    ) -> Result<Self, RuleCompilationError> {
        let ParseOutput { rules, warnings } = RuleParser::new(registry, config).parse(text)?;
        Ok(Self {
            raw: text.to_owned(),
            rules,
            warnings,
        })
    }

    /// Evaluate the rule for `access_type`.
    ///
    /// Returns `default` untouched, without invoking anything, when no rule
    /// is defined for `access_type`. Predicate failures are returned as-is.
    pub fn check(
        &self,
        access_type: &str,
        actor: &S,
        target: &S,
        default: bool,
    ) -> Result<bool, PredicateError> {
        match self.rules.get(access_type) {
            Some(rule) => rule.evaluate(actor, target),
            None => {
                trace!(access_type, default, "no rule for access type");
                Ok(default)
            }
        }
    }

    /// The compiled rule for `access_type`, if any.
    pub fn get(&self, access_type: &str) -> Option<&CompiledRule<S>> {
        self.rules.get(access_type)
    }

    /// Access types with a rule, sorted.
    pub fn access_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Warnings raised while compiling.
    pub fn warnings(&self) -> &[CompileWarning] {
        &self.warnings
    }

    /// The text this set was compiled from.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Summaries of every rule, sorted by access type.
    pub fn summaries(&self) -> Vec<RuleSummary> {
        self.access_types()
            .into_iter()
            .filter_map(|t| self.rules.get(t))
            .map(CompiledRule::describe)
            .collect()
    }
}

impl<S: ?Sized> fmt::Display for ConditionSet<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl<S: ?Sized> fmt::Debug for ConditionSet<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConditionSet")
            .field("raw", &self.raw)
            .field("access_types", &self.access_types())
            .field("warnings", &self.warnings)
            .finish()
    }
}
