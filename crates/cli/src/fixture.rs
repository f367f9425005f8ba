//! Rule fixture runner.
//!
//! Loads YAML fixture files holding rule text plus test cases, and checks each
//! case against stub predicates, comparing the expected and actual outcome.

use std::collections::BTreeMap;
use std::time::Instant;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use gatekeep_rules::{ConditionSet, ParserConfig};

use crate::stubs::{PredicateStub, Subject, stub_registry};

// ---------------------------------------------------------------------------
// Fixture types (deserialized from YAML)
// ---------------------------------------------------------------------------

/// A YAML fixture file.
#[derive(Debug, Clone, Deserialize)]
pub struct FixtureFile {
    /// Rule text compiled for every case.
    pub rules: String,
    /// Stubs shared by every case.
    #[serde(default)]
    pub predicates: BTreeMap<String, PredicateStub>,
    /// The cases to run.
    pub tests: Vec<FixtureCase>,
}

/// A single case within a fixture file.
#[derive(Debug, Clone, Deserialize)]
pub struct FixtureCase {
    /// Human-readable case name.
    pub name: String,
    /// Access type to check.
    pub access_type: String,
    /// Stubs for this case; these replace fixture-level stubs of the same name.
    #[serde(default)]
    pub predicates: BTreeMap<String, PredicateStub>,
    #[serde(default)]
    pub actor: Subject,
    #[serde(default)]
    pub target: Subject,
    /// Returned when no rule exists for `access_type`.
    #[serde(default)]
    pub default: bool,
    /// Expected outcome.
    pub expect: bool,
}

impl FixtureFile {
    /// Every predicate name any case can call.
    fn all_stub_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .predicates
            .keys()
            .chain(self.tests.iter().flat_map(|tc| tc.predicates.keys()))
            .cloned()
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    fn stubs_for(&self, case: &FixtureCase) -> BTreeMap<String, PredicateStub> {
        let mut stubs = self.predicates.clone();
        stubs.extend(case.predicates.clone());
        stubs
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// Result of running a whole fixture.
#[derive(Debug, Clone, Serialize)]
pub struct TestRunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub results: Vec<TestCaseResult>,
    pub duration_ms: u64,
}

/// Result of a single case.
#[derive(Debug, Clone, Serialize)]
pub struct TestCaseResult {
    pub name: String,
    pub passed: bool,
    pub expected: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual: Option<bool>,
    pub duration_us: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

// ---------------------------------------------------------------------------
// Runner
// ---------------------------------------------------------------------------

/// Parse a YAML fixture from a string.
pub fn parse_fixture(yaml: &str) -> anyhow::Result<FixtureFile> {
    serde_yaml_ng::from_str(yaml).context("invalid fixture YAML")
}

/// Run every case whose name contains `filter` (all cases when `None`).
///
/// The rule text is compiled once up front against every stub name the
/// fixture mentions; a compile failure there aborts the run. Compile warnings
/// reach `config`'s sink from that compile only.
pub fn run_fixture(
    fixture: &FixtureFile,
    config: &ParserConfig,
    filter: Option<&str>,
) -> anyhow::Result<TestRunSummary> {
    let all = stub_registry(
        fixture
            .all_stub_names()
            .into_iter()
            .map(|name| (name, PredicateStub::pass())),
    );
    ConditionSet::from_text_with(&fixture.rules, &all, config)
        .context("fixture rules do not compile")?;

    let case_config = ParserConfig::new().with_missing_colon(config.missing_colon());
    let cases: Vec<&FixtureCase> = fixture
        .tests
        .iter()
        .filter(|tc| filter.is_none_or(|f| tc.name.contains(f)))
        .collect();

    let mut results = Vec::with_capacity(cases.len());
    let suite_start = Instant::now();

    for tc in cases {
        let case_start = Instant::now();

        let registry = stub_registry(fixture.stubs_for(tc));
        let outcome = ConditionSet::from_text_with(&fixture.rules, &registry, &case_config)
            .map_err(|e| e.to_string())
            .and_then(|set| {
                set.check(&tc.access_type, &tc.actor, &tc.target, tc.default)
                    .map_err(|e| e.to_string())
            });

        #[allow(clippy::cast_possible_truncation)]
        let duration_us = case_start.elapsed().as_micros() as u64;

        let (actual, error) = match outcome {
            Ok(actual) => (Some(actual), None),
            Err(e) => (None, Some(e)),
        };
        results.push(TestCaseResult {
            name: tc.name.clone(),
            passed: actual == Some(tc.expect),
            expected: tc.expect,
            actual,
            duration_us,
            error,
        });
    }

    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.len() - passed;
    #[allow(clippy::cast_possible_truncation)]
    let duration_ms = suite_start.elapsed().as_millis() as u64;

    Ok(TestRunSummary {
        total: results.len(),
        passed,
        failed,
        results,
        duration_ms,
    })
}
