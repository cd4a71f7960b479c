//! Fixture loading and management.

use std::path::Path;

use serde::{Deserialize, Serialize};
use sevbuf_core::{GrowthPolicy, Severity};
use sevbuf_membrane::FailurePlan;

use crate::error::HarnessError;

/// Allocator failure plan as written in fixtures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanSpec {
    Never,
    Always,
    After(usize),
    AboveSize(usize),
}

impl From<PlanSpec> for FailurePlan {
    fn from(spec: PlanSpec) -> Self {
        match spec {
            PlanSpec::Never => FailurePlan::Never,
            PlanSpec::Always => FailurePlan::Always,
            PlanSpec::After(n) => FailurePlan::AfterAllocations(n),
            PlanSpec::AboveSize(limit) => FailurePlan::AboveSize(limit),
        }
    }
}

/// One scripted step. Levels are severity names or codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Op {
    Create { level: String },
    Reset { level: String },
    Append { level: String, text: String },
    Destroy { level: String },
    FailAllocations { plan: PlanSpec },
}

/// Buffer state a case must end in. Absent fields are not checked.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpectedState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub present: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capacity: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub live_blocks: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allocations: Option<u64>,
    /// Disposition label per op, in order (`skipped`, `applied`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dispositions: Option<Vec<String>>,
}

/// A single fixture case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureCase {
    /// Case identifier.
    pub name: String,
    /// Instance threshold.
    pub threshold: String,
    #[serde(default)]
    pub growth: GrowthSpec,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_capacity: Option<usize>,
    pub ops: Vec<Op>,
    pub expected: ExpectedState,
}

/// Growth policy as written in fixtures.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthSpec {
    #[default]
    ExactFit,
    Doubling,
}

impl From<GrowthSpec> for GrowthPolicy {
    fn from(spec: GrowthSpec) -> Self {
        match spec {
            GrowthSpec::ExactFit => GrowthPolicy::ExactFit,
            GrowthSpec::Doubling => GrowthPolicy::Doubling,
        }
    }
}

/// A collection of fixture cases for one behaviour family.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixtureSet {
    /// Schema version.
    pub version: String,
    /// Behaviour family name.
    pub family: String,
    pub cases: Vec<FixtureCase>,
}

impl FixtureSet {
    /// Load fixture set from JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Serialize fixture set to JSON string.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load fixture set from a file path.
    pub fn from_file(path: &Path) -> Result<Self, HarnessError> {
        let content = std::fs::read_to_string(path).map_err(|source| HarnessError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content).map_err(|source| HarnessError::Json {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Parse a fixture severity field.
pub fn parse_level(case: &str, raw: &str) -> Result<Severity, HarnessError> {
    raw.parse()
        .map_err(|err| HarnessError::fixture(case, format!("{err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ops_use_tagged_snake_case() {
        let ops: Vec<Op> = serde_json::from_str(
            r#"[
                {"op":"create","level":"info"},
                {"op":"append","level":"7","text":"x"},
                {"op":"fail_allocations","plan":{"after":1}},
                {"op":"fail_allocations","plan":"always"},
                {"op":"destroy","level":"info"}
            ]"#,
        )
        .expect("valid ops");
        assert_eq!(
            ops[1],
            Op::Append {
                level: "7".into(),
                text: "x".into()
            }
        );
        assert_eq!(
            ops[2],
            Op::FailAllocations {
                plan: PlanSpec::After(1)
            }
        );
        assert_eq!(
            FailurePlan::from(PlanSpec::AboveSize(3)),
            FailurePlan::AboveSize(3)
        );
    }

    #[test]
    fn growth_defaults_to_exact_fit() {
        let set = FixtureSet::from_json(
            r#"{"version":"v1","family":"buffer","cases":[
                {"name":"c","threshold":"info","ops":[],"expected":{}}
            ]}"#,
        )
        .expect("valid fixture json");
        assert_eq!(set.cases[0].growth, GrowthSpec::ExactFit);
        assert_eq!(set.cases[0].expected, ExpectedState::default());
    }

    #[test]
    fn bad_level_is_a_fixture_error() {
        let err = parse_level("case-a", "shouty").unwrap_err();
        assert_eq!(
            err.to_string(),
            "fixture case 'case-a': unknown severity 'shouty'"
        );
    }

    #[test]
    fn missing_file_reports_path() {
        let err = FixtureSet::from_file(Path::new("/nonexistent/fixture.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/fixture.json"));
    }
}
