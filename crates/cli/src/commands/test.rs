use std::path::PathBuf;

use anyhow::Context;
use clap::Args;

use gatekeep_rules::ParserConfig;

use crate::OutputFormat;
use crate::fixture::{parse_fixture, run_fixture};

#[derive(Args, Debug)]
pub struct TestArgs {
    /// Path to a YAML fixture file.
    pub file: PathBuf,

    /// Only run cases whose name contains this substring.
    #[arg(long)]
    pub filter: Option<String>,
}

pub fn run(args: &TestArgs, config: &ParserConfig, format: &OutputFormat) -> anyhow::Result<()> {
    let yaml = std::fs::read_to_string(&args.file)
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let fixture = parse_fixture(&yaml)?;
    let summary = run_fixture(&fixture, config, args.filter.as_deref())?;

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        OutputFormat::Text => {
            for result in &summary.results {
                let status = if result.passed { "PASS" } else { "FAIL" };
                println!("  [{status}] {} ({}us)", result.name, result.duration_us);
                if !result.passed {
                    match (&result.error, result.actual) {
                        (Some(error), _) => println!("         error: {error}"),
                        (None, Some(actual)) => println!(
                            "         expected {}, got {actual}",
                            result.expected
                        ),
                        (None, None) => {}
                    }
                }
            }
            println!(
                "{} passed, {} failed, {} total ({}ms)",
                summary.passed, summary.failed, summary.total, summary.duration_ms
            );
        }
    }

    if summary.failed > 0 {
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn runs_a_passing_fixture_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br"
rules: 'open: has_key()'
predicates: { has_key: true }
tests:
  - name: opens
    access_type: open
    expect: true
",
        )
        .unwrap();

        let args = TestArgs {
            file: file.path().to_path_buf(),
            filter: None,
        };
        run(&args, &ParserConfig::new(), &OutputFormat::Json).unwrap();
    }

    #[test]
    fn missing_fixture_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let args = TestArgs {
            file: dir.path().join("absent.yaml"),
            filter: None,
        };
        let err = run(&args, &ParserConfig::new(), &OutputFormat::Text).unwrap_err();
        assert!(err.to_string().contains("failed to read"));
    }
}
