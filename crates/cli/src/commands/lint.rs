use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use gatekeep_rules::{ConditionSet, ParserConfig, RuleSummary};

use crate::OutputFormat;
use crate::stubs::{PredicateStub, stub_registry};

#[derive(Args, Debug)]
pub struct LintArgs {
    /// Rule text, e.g. "cast: has_mana(10) and not is_silenced()".
    #[arg(required_unless_present = "file", conflicts_with = "file")]
    pub rules: Option<String>,

    /// Read the rule text from a file instead.
    #[arg(long, short = 'f')]
    pub file: Option<PathBuf>,

    /// Predicate names to treat as available. Repeatable.
    #[arg(long = "predicate", short = 'p', value_name = "NAME")]
    pub predicates: Vec<String>,
}

pub fn run(args: &LintArgs, config: &ParserConfig, format: &OutputFormat) -> anyhow::Result<()> {
    let text = match (&args.rules, &args.file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        (None, None) => anyhow::bail!("no rule text given"),
    };

    let registry = stub_registry(
        args.predicates
            .iter()
            .map(|name| (name.as_str(), PredicateStub::pass())),
    );

    let set = match ConditionSet::from_text_with(&text, &registry, config) {
        Ok(set) => set,
        Err(e) => {
            match format {
                OutputFormat::Json => {
                    let errors: Vec<String> = e.errors().iter().map(ToString::to_string).collect();
                    println!(
                        "{}",
                        serde_json::to_string_pretty(&serde_json::json!({ "errors": errors }))?
                    );
                }
                OutputFormat::Text => {
                    eprintln!("{} error(s):", e.errors().len());
                    for error in e.errors() {
                        eprintln!("  {error}");
                    }
                }
            }
            std::process::exit(1);
        }
    };

    let summaries = set.summaries();
    match format {
        OutputFormat::Json => {
            let warnings: Vec<String> = set.warnings().iter().map(ToString::to_string).collect();
            println!(
                "{}",
                serde_json::to_string_pretty(&serde_json::json!({
                    "rules": summaries,
                    "warnings": warnings,
                }))?
            );
        }
        OutputFormat::Text => {
            println!("{} rule(s) compiled:", summaries.len());
            for summary in &summaries {
                print_summary(summary);
            }
            for warning in set.warnings() {
                println!("  warning: {warning}");
            }
        }
    }
    Ok(())
}

fn print_summary(summary: &RuleSummary) {
    println!("  {}: {}", summary.access_type, summary.skeleton);
    for predicate in &summary.predicates {
        let args: Vec<String> = predicate
            .positional
            .iter()
            .cloned()
            .chain(predicate.keywords.iter().map(|(k, v)| format!("{k}={v}")))
            .collect();
        println!("    - {}({})", predicate.name, args.join(", "));
    }
}
