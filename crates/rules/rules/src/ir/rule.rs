use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;
use tracing::trace;

use gatekeep_core::{PredicateArgs, PredicateError, SharedPredicate, Value};

use crate::ir::gate::Gate;
use crate::ir::skeleton::Skeleton;

/// One resolved predicate call inside a compiled rule.
pub struct Invocation<S: ?Sized> {
    name: String,
    predicate: SharedPredicate<S>,
    args: PredicateArgs,
}

impl<S: ?Sized> Invocation<S> {
    pub(crate) fn new(name: String, predicate: SharedPredicate<S>, args: PredicateArgs) -> Self {
        Self {
            name,
            predicate,
            args,
        }
    }

    /// The name the predicate was referenced by.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Arguments written in the call.
    pub fn args(&self) -> &PredicateArgs {
        &self.args
    }

    fn invoke(&self, actor: &S, target: &S) -> Result<bool, PredicateError> {
        let value = self.predicate.call(actor, target, &self.args)?;
        let passed = value.is_truthy();
        trace!(predicate = %self.name, result = passed, "invoked predicate");
        Ok(passed)
    }
}

impl<S: ?Sized> fmt::Debug for Invocation<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Invocation")
            .field("name", &self.name)
            .field("args", &self.args)
            .finish_non_exhaustive()
    }
}

/// The validated, resolved form of one access type's rule.
///
/// Holds the boolean skeleton, the predicate calls in first-appearance
/// order, and the segment text it was compiled from.
pub struct CompiledRule<S: ?Sized> {
    access_type: String,
    skeleton: Skeleton,
    gate: Gate,
    invocations: Vec<Invocation<S>>,
    raw: String,
}

impl<S: ?Sized> CompiledRule<S> {
    pub(crate) fn new(
        access_type: String,
        skeleton: Skeleton,
        gate: Gate,
        invocations: Vec<Invocation<S>>,
        raw: String,
    ) -> Self {
        debug_assert_eq!(skeleton.slot_count(), invocations.len());
        Self {
            access_type,
            skeleton,
            gate,
            invocations,
            raw,
        }
    }

    /// The access type this rule governs.
    pub fn access_type(&self) -> &str {
        &self.access_type
    }

    /// The boolean skeleton.
    pub fn skeleton(&self) -> &Skeleton {
        &self.skeleton
    }

    /// Predicate calls, in the order they are invoked.
    pub fn invocations(&self) -> &[Invocation<S>] {
        &self.invocations
    }

    /// The segment text this rule was compiled from.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// Invoke every predicate in order, then reduce the gate over the results.
    ///
    /// All predicates run even when an earlier result already decides the
    /// outcome. The first predicate error is returned as-is.
    pub fn evaluate(&self, actor: &S, target: &S) -> Result<bool, PredicateError> {
        let results = self
            .invocations
            .iter()
            .map(|inv| inv.invoke(actor, target))
            .collect::<Result<Vec<bool>, _>>()?;
        Ok(self.gate.reduce(&results))
    }

    /// A serializable description for tooling and logs.
    pub fn describe(&self) -> RuleSummary {
        RuleSummary {
            access_type: self.access_type.clone(),
            skeleton: self.skeleton.to_string(),
            predicates: self
                .invocations
                .iter()
                .map(|inv| InvocationSummary {
                    name: inv.name.clone(),
                    positional: inv.args.positional().to_vec(),
                    keywords: inv.args.keywords().clone(),
                })
                .collect(),
            raw: self.raw.clone(),
        }
    }
}

impl<S: ?Sized> fmt::Debug for CompiledRule<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledRule")
            .field("access_type", &self.access_type)
            .field("skeleton", &self.skeleton.to_string())
            .field("invocations", &self.invocations)
            .field("raw", &self.raw)
            .finish()
    }
}

/// Serializable view of a [`CompiledRule`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RuleSummary {
    /// The access type the rule governs.
    pub access_type: String,
    /// Canonical skeleton text, e.g. `%s and not %s`.
    pub skeleton: String,
    /// Predicate calls in invocation order.
    pub predicates: Vec<InvocationSummary>,
    /// The segment text the rule was compiled from.
    pub raw: String,
}

/// Serializable view of an [`Invocation`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvocationSummary {
    /// Predicate name.
    pub name: String,
    /// Raw positional argument text.
    pub positional: Vec<String>,
    /// Parsed keyword arguments.
    pub keywords: BTreeMap<String, Value>,
}
