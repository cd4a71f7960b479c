//! Test execution engine.

use serde::Serialize;
use sevbuf_core::{BufferConfig, DEFAULT_CAPACITY, Disposition, Instance, LogBuffer};
use sevbuf_membrane::TrackingAllocator;

use crate::error::HarnessError;
use crate::fixtures::{ExpectedState, FixtureCase, FixtureSet, Op, parse_level};
use crate::verify::VerificationResult;

/// State observed after replaying a case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ObservedState {
    pub present: bool,
    pub text: Option<String>,
    pub capacity: usize,
    pub live_blocks: usize,
    pub allocations: u64,
    pub dispositions: Vec<String>,
}

/// Runs fixture sets and collects verification results.
pub struct TestRunner {
    /// Name of the test campaign.
    pub campaign: String,
}

impl TestRunner {
    #[must_use]
    pub fn new(campaign: impl Into<String>) -> Self {
        Self {
            campaign: campaign.into(),
        }
    }

    /// Run all cases in a set.
    pub fn run(&self, fixture_set: &FixtureSet) -> Vec<VerificationResult> {
        fixture_set
            .cases
            .iter()
            .map(|case| {
                let expected = serde_json::to_string(&case.expected).unwrap_or_default();
                match execute_case(case) {
                    Ok(observed) => {
                        let diff = diff_state(&case.expected, &observed);
                        VerificationResult {
                            family: fixture_set.family.clone(),
                            case_name: case.name.clone(),
                            passed: diff.is_none(),
                            expected,
                            actual: serde_json::to_string(&observed).unwrap_or_default(),
                            diff,
                        }
                    }
                    Err(err) => VerificationResult {
                        family: fixture_set.family.clone(),
                        case_name: case.name.clone(),
                        passed: false,
                        expected,
                        actual: format!("error:{err}"),
                        diff: Some(err.to_string()),
                    },
                }
            })
            .collect()
    }
}

pub(crate) fn disposition_label(disposition: Disposition) -> &'static str {
    match disposition {
        Disposition::Skipped => "skipped",
        Disposition::Applied => "applied",
        Disposition::OutOfMemory => "out_of_memory",
        Disposition::FormatError => "format_error",
    }
}

/// Replay one case on a fresh instance, buffer and tracking allocator.
pub fn execute_case(case: &FixtureCase) -> Result<ObservedState, HarnessError> {
    let threshold = parse_level(&case.name, &case.threshold)?;
    let instance = Instance::new(0, threshold);
    let alloc = TrackingAllocator::new();
    let config = BufferConfig::default()
        .with_default_capacity(case.default_capacity.unwrap_or(DEFAULT_CAPACITY))
        .with_growth(case.growth.into());
    let mut buffer = LogBuffer::with_config(&alloc, config);
    let mut dispositions = Vec::with_capacity(case.ops.len());

    for op in &case.ops {
        let disposition = match op {
            Op::Create { level } => buffer.create(&instance, parse_level(&case.name, level)?),
            Op::Reset { level } => buffer.reset(&instance, parse_level(&case.name, level)?),
            Op::Append { level, text } => {
                buffer.append(&instance, parse_level(&case.name, level)?, text.as_str())
            }
            Op::Destroy { level } => buffer.destroy(&instance, parse_level(&case.name, level)?),
            Op::FailAllocations { plan } => {
                alloc.set_failure_plan((*plan).into());
                continue;
            }
        };
        dispositions.push(disposition_label(disposition).to_string());
    }

    let stats = alloc.stats();
    Ok(ObservedState {
        present: buffer.is_present(),
        text: buffer.text().map(str::to_owned),
        capacity: buffer.capacity(),
        live_blocks: stats.live_blocks,
        allocations: stats.allocations,
        dispositions,
    })
}

fn diff_state(expected: &ExpectedState, observed: &ObservedState) -> Option<String> {
    let mut lines = Vec::new();
    if let Some(present) = expected.present
        && present != observed.present
    {
        lines.push(format!("present: expected {present}, got {}", observed.present));
    }
    if let Some(text) = &expected.text
        && observed.text.as_ref() != Some(text)
    {
        lines.push(format!("text: expected {text:?}, got {:?}", observed.text));
    }
    if let Some(capacity) = expected.capacity
        && capacity != observed.capacity
    {
        lines.push(format!(
            "capacity: expected {capacity}, got {}",
            observed.capacity
        ));
    }
    if let Some(live) = expected.live_blocks
        && live != observed.live_blocks
    {
        lines.push(format!(
            "live_blocks: expected {live}, got {}",
            observed.live_blocks
        ));
    }
    if let Some(allocations) = expected.allocations
        && allocations != observed.allocations
    {
        lines.push(format!(
            "allocations: expected {allocations}, got {}",
            observed.allocations
        ));
    }
    if let Some(dispositions) = &expected.dispositions
        && dispositions != &observed.dispositions
    {
        lines.push(format!(
            "dispositions: expected {dispositions:?}, got {:?}",
            observed.dispositions
        ));
    }
    (!lines.is_empty()).then(|| lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runner_passes_matching_case() {
        let fixture = FixtureSet::from_json(
            r#"{
                "version":"v1",
                "family":"buffer/append",
                "cases":[
                    {"name":"accumulate","threshold":"info","ops":[
                        {"op":"create","level":"info"},
                        {"op":"append","level":"debug","text":"a"},
                        {"op":"append","level":"debug","text":"b"}
                    ],"expected":{"present":true,"text":"ab","capacity":256,"allocations":1,
                        "dispositions":["applied","applied","applied"]}}
                ]
            }"#,
        )
        .expect("valid fixture json");

        let results = TestRunner::new("smoke").run(&fixture);
        assert_eq!(results.len(), 1);
        assert!(results[0].passed, "{:?}", results[0].diff);
    }

    #[test]
    fn runner_reports_field_diff() {
        let fixture = FixtureSet::from_json(
            r#"{
                "version":"v1",
                "family":"buffer/create",
                "cases":[
                    {"name":"wrong_capacity","threshold":"info","ops":[
                        {"op":"create","level":"info"}
                    ],"expected":{"capacity":512}}
                ]
            }"#,
        )
        .expect("valid fixture json");

        let results = TestRunner::new("smoke").run(&fixture);
        assert!(!results[0].passed);
        assert_eq!(
            results[0].diff.as_deref(),
            Some("capacity: expected 512, got 256")
        );
    }

    #[test]
    fn failure_plan_op_is_not_a_disposition() {
        let fixture = FixtureSet::from_json(
            r#"{
                "version":"v1",
                "family":"buffer/create",
                "cases":[
                    {"name":"oom_create","threshold":"info","ops":[
                        {"op":"fail_allocations","plan":"always"},
                        {"op":"create","level":"info"}
                    ],"expected":{"present":false,"capacity":0,"live_blocks":0,
                        "dispositions":["out_of_memory"]}}
                ]
            }"#,
        )
        .expect("valid fixture json");

        let results = TestRunner::new("oom").run(&fixture);
        assert!(results[0].passed, "{:?}", results[0].diff);
    }

    #[test]
    fn unparseable_level_fails_the_case() {
        let fixture = FixtureSet::from_json(
            r#"{
                "version":"v1",
                "family":"buffer",
                "cases":[
                    {"name":"bad","threshold":"loud","ops":[],"expected":{}}
                ]
            }"#,
        )
        .expect("valid fixture json");

        let results = TestRunner::new("bad").run(&fixture);
        assert!(!results[0].passed);
        assert!(results[0].actual.starts_with("error:"));
    }
}
