//! Compiler from rule text to [`CompiledRule`]s.
//!
//! Rule text is a `;`-separated list of `accessType: expression` segments.
//! An expression is predicate calls joined by `and`, `or`, `not`, and
//! parentheses; keywords are case-insensitive.

pub(crate) mod call;
pub mod literal;

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::{debug, warn};

use gatekeep_core::{GatekeepConfig, MissingColonPolicy, PredicateRegistry};

use crate::error::{CompileError, CompileWarning, RuleCompilationError};
use crate::ir::gate::Gate;
use crate::ir::rule::{CompiledRule, Invocation};
use crate::ir::skeleton::Skeleton;
use crate::parser::call::{find_calls, split_call};
use crate::warning::{WarningSink, sink_from_config};

/// Compile-time settings.
#[derive(Clone, Default)]
pub struct ParserConfig {
    missing_colon: MissingColonPolicy,
    warning_sink: Option<Arc<dyn WarningSink>>,
}

impl fmt::Debug for ParserConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserConfig")
            .field("missing_colon", &self.missing_colon)
            .field("warning_sink", &self.warning_sink.is_some())
            .finish()
    }
}

impl ParserConfig {
    /// Default settings: reject segments without a colon, no warning sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build settings from the `[parser]` and `[warnings]` config sections.
    pub fn from_config(config: &GatekeepConfig) -> Self {
        Self {
            missing_colon: config.parser.missing_colon,
            warning_sink: sink_from_config(&config.warnings),
        }
    }

    /// Set the missing-colon policy.
    #[must_use]
    pub fn with_missing_colon(mut self, policy: MissingColonPolicy) -> Self {
        self.missing_colon = policy;
        self
    }

    /// Send warnings to `sink`.
    #[must_use]
    pub fn with_warning_sink(mut self, sink: Arc<dyn WarningSink>) -> Self {
        self.warning_sink = Some(sink);
        self
    }

    /// The missing-colon policy in effect.
    pub fn missing_colon(&self) -> MissingColonPolicy {
        self.missing_colon
    }
}

/// Everything a successful compile produced.
pub struct ParseOutput<S: ?Sized> {
    /// Compiled rules keyed by access type.
    pub rules: HashMap<String, CompiledRule<S>>,
    /// Non-fatal warnings, in the order they were found.
    pub warnings: Vec<CompileWarning>,
}

impl<S: ?Sized> fmt::Debug for ParseOutput<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParseOutput")
            .field("rules", &self.rules)
            .field("warnings", &self.warnings)
            .finish()
    }
}

/// Compiles rule text against a predicate registry.
pub struct RuleParser<'a, S: ?Sized> {
    registry: &'a PredicateRegistry<S>,
    config: &'a ParserConfig,
}

impl<'a, S: ?Sized> RuleParser<'a, S> {
    /// Create a parser resolving names through `registry`.
    pub fn new(registry: &'a PredicateRegistry<S>, config: &'a ParserConfig) -> Self {
        Self { registry, config }
    }

    /// Compile every segment of `text`.
    ///
    /// Either every segment compiles or the whole call fails with all of the
    /// errors found; compiled segments are never returned alongside errors.
    pub fn parse(&self, text: &str) -> Result<ParseOutput<S>, RuleCompilationError> {
        let mut rules: HashMap<String, CompiledRule<S>> = HashMap::new();
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        for raw_segment in text.split(';') {
            let segment = raw_segment.trim();
            if segment.is_empty() {
                continue;
            }

            let Some((access_type, expression)) = segment.split_once(':') else {
                match self.config.missing_colon {
                    MissingColonPolicy::Reject => {
                        errors.push(CompileError::MissingColon {
                            segment: segment.to_owned(),
                        });
                        continue;
                    }
                    MissingColonPolicy::Abandon => {
                        warn!(
                            segment = %segment,
                            "rule segment has no access type; ignoring the rest of the rule text"
                        );
                        break;
                    }
                }
            };
            let access_type = access_type.trim();

            let body = expression.trim();
            let Some(rule) = self.compile_segment(access_type, body, segment, &mut errors) else {
                continue;
            };

            if let Some(previous) = rules.insert(access_type.to_owned(), rule) {
                warnings.push(CompileWarning::DuplicateAccessType {
                    access_type: access_type.to_owned(),
                    from: previous.raw().to_owned(),
                    to: segment.to_owned(),
                });
            }
        }

        if !warnings.is_empty() {
            let message = warnings
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join("\n");
            debug!(count = warnings.len(), "rule text compiled with warnings");
            if let Some(sink) = &self.config.warning_sink {
                sink.record(&message);
            }
        }

        if !errors.is_empty() {
            debug!(count = errors.len(), "rule text failed to compile");
            return Err(RuleCompilationError::new(errors));
        }

        debug!(rules = rules.len(), "compiled rule text");
        Ok(ParseOutput { rules, warnings })
    }

    /// Compile one `accessType: expression` segment, recording any errors.
    fn compile_segment(
        &self,
        access_type: &str,
        expression: &str,
        segment: &str,
        errors: &mut Vec<CompileError>,
    ) -> Option<CompiledRule<S>> {
        let calls = find_calls(expression);

        let mut invocations = Vec::with_capacity(calls.len());
        let mut unresolved = false;
        for site in &calls {
            match self.resolve(site.text) {
                Ok(invocation) => invocations.push(invocation),
                Err(e) => {
                    errors.push(e);
                    unresolved = true;
                }
            }
        }
        if unresolved {
            return None;
        }

        let spans: Vec<_> = calls.iter().map(|c| c.span.clone()).collect();
        let compiled = Skeleton::tokenize(expression, &spans).and_then(|skeleton| {
            let gate = Gate::parse(&skeleton)?;
            if gate.slot_count() != invocations.len() {
                return Err(format!(
                    "{} predicate calls but {} placeholders",
                    invocations.len(),
                    gate.slot_count()
                ));
            }
            Ok((skeleton, gate))
        });

        match compiled {
            Ok((skeleton, gate)) => Some(CompiledRule::new(
                access_type.to_owned(),
                skeleton,
                gate,
                invocations,
                segment.to_owned(),
            )),
            Err(reason) => {
                errors.push(CompileError::SkeletonSyntax {
                    segment: segment.to_owned(),
                    reason,
                });
                None
            }
        }
    }

    /// Split a call and bind it to its registered predicate.
    fn resolve(&self, call: &str) -> Result<Invocation<S>, CompileError> {
        let parsed = split_call(call)?;
        let predicate =
            self.registry
                .resolve(&parsed.name)
                .ok_or_else(|| CompileError::UnresolvedFunction {
                    call: call.to_owned(),
                })?;
        Ok(Invocation::new(parsed.name, predicate, parsed.args))
    }
}
