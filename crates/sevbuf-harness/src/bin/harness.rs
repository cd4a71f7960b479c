//! CLI entrypoint for the sevbuf conformance harness.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use sevbuf_harness::structured_log::{
    LogEmitter, LogEntry, LogLevel, Outcome, sha256_hex, validate_log_line,
};
use sevbuf_harness::{FixtureSet, TestRunner, VerificationSummary};

/// Conformance tooling for sevbuf.
#[derive(Debug, Parser)]
#[command(name = "sevbuf-harness")]
#[command(about = "Conformance testing harness for sevbuf")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Replay fixture scripts against the buffer implementation.
    Verify {
        /// Fixture JSON file, or a directory of them.
        #[arg(long)]
        fixture: PathBuf,
        /// Structured JSONL log output path.
        #[arg(long)]
        log: Option<PathBuf>,
        /// Output report path (markdown). A JSON copy is written next to it.
        #[arg(long)]
        report: Option<PathBuf>,
        /// Run identifier used in trace ids.
        #[arg(long, default_value = "verify")]
        run_id: String,
    },
    /// Run the built-in INFO-threshold walkthrough and print its transitions.
    Scenario {
        /// Output JSON path (if omitted, prints to stdout).
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Validate a structured JSONL log.
    ValidateLog {
        #[arg(long)]
        log: PathBuf,
    },
}

fn fixture_paths(fixture: &Path) -> std::io::Result<Vec<PathBuf>> {
    if fixture.is_file() {
        return Ok(vec![fixture.to_path_buf()]);
    }
    let mut paths: Vec<PathBuf> = std::fs::read_dir(fixture)?
        .filter_map(|entry| entry.ok().map(|entry| entry.path()))
        .filter(|path| path.extension().and_then(|s| s.to_str()) == Some("json"))
        .collect();
    paths.sort();
    Ok(paths)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Verify {
            fixture,
            log,
            report,
            run_id,
        } => {
            eprintln!("Verifying against fixtures in {}", fixture.display());
            let mut emitter = match &log {
                Some(path) => Some(LogEmitter::to_file(path, &run_id)?),
                None => None,
            };
            let runner = TestRunner::new(run_id.clone());
            let mut results = Vec::new();

            for path in fixture_paths(&fixture)? {
                let bytes = std::fs::read(&path)?;
                let digest = sha256_hex(&bytes);
                let set = match FixtureSet::from_file(&path) {
                    Ok(set) => set,
                    Err(err) => {
                        eprintln!("Skipping {}: {err}", path.display());
                        continue;
                    }
                };

                for result in runner.run(&set) {
                    if let Some(emitter) = emitter.as_mut() {
                        let (level, outcome) = if result.passed {
                            (LogLevel::Info, Outcome::Pass)
                        } else if result.actual.starts_with("error:") {
                            (LogLevel::Error, Outcome::Error)
                        } else {
                            (LogLevel::Warn, Outcome::Fail)
                        };
                        let entry = LogEntry::new("", level, "case_verified")
                            .with_case(&result.family, &result.case_name)
                            .with_outcome(outcome)
                            .with_fixture_sha256(&digest)
                            .with_details(serde_json::json!({
                                "expected": &result.expected,
                                "actual": &result.actual,
                                "diff": &result.diff,
                            }));
                        emitter.emit_entry(entry)?;
                    }
                    results.push(result);
                }
            }
            if results.is_empty() {
                return Err(format!("No fixture cases found in {}", fixture.display()).into());
            }

            results.sort_by(|a, b| {
                a.family
                    .cmp(&b.family)
                    .then_with(|| a.case_name.cmp(&b.case_name))
            });
            let summary = VerificationSummary::from_results(results);
            eprintln!(
                "Verification complete: total={}, passed={}, failed={}",
                summary.total, summary.passed, summary.failed
            );

            if let Some(emitter) = emitter.as_mut() {
                emitter.emit(LogLevel::Info, "run_complete")?;
                emitter.flush()?;
            }
            if let Some(report_path) = report {
                std::fs::write(&report_path, summary.to_markdown("sevbuf Conformance Report"))?;
                std::fs::write(report_path.with_extension("json"), summary.to_json()?)?;
                eprintln!("Wrote report to {}", report_path.display());
            }
            if !summary.all_passed() {
                return Err("Conformance verification failed".into());
            }
        }
        Command::Scenario { output } => {
            let transitions = sevbuf_harness::scenario::run_info_walkthrough();
            let json = serde_json::to_string_pretty(&transitions)?;
            match output {
                Some(path) => std::fs::write(path, json)?,
                None => println!("{json}"),
            }
        }
        Command::ValidateLog { log } => {
            let content = std::fs::read_to_string(&log)?;
            let mut failures = 0_usize;
            for (idx, line) in content.lines().enumerate() {
                if line.trim().is_empty() {
                    continue;
                }
                if let Err(errors) = validate_log_line(line, idx + 1) {
                    failures += errors.len();
                    for error in errors {
                        eprintln!("{error}");
                    }
                }
            }
            if failures > 0 {
                return Err(format!("{failures} validation error(s) in {}", log.display()).into());
            }
            eprintln!("{} is valid", log.display());
        }
    }

    Ok(())
}
