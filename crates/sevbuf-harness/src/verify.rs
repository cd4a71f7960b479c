//! Verification results and summaries.

use serde::{Deserialize, Serialize};

/// Outcome of one fixture case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub family: String,
    pub case_name: String,
    pub passed: bool,
    /// Expected state (JSON).
    pub expected: String,
    /// Observed state (JSON), or `error:<message>` when the case could not run.
    pub actual: String,
    /// One line per mismatched field.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub diff: Option<String>,
}

/// Totals over a run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub results: Vec<VerificationResult>,
}

impl VerificationSummary {
    #[must_use]
    pub fn from_results(results: Vec<VerificationResult>) -> Self {
        let passed = results.iter().filter(|r| r.passed).count();
        Self {
            total: results.len(),
            passed,
            failed: results.len() - passed,
            results,
        }
    }

    #[must_use]
    pub fn all_passed(&self) -> bool {
        self.failed == 0
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Human-readable report.
    #[must_use]
    pub fn to_markdown(&self, title: &str) -> String {
        let mut out = format!(
            "# {title}\n\n- total: {}\n- passed: {}\n- failed: {}\n\n| family | case | result |\n|---|---|---|\n",
            self.total, self.passed, self.failed
        );
        for result in &self.results {
            let status = if result.passed { "PASS" } else { "FAIL" };
            out.push_str(&format!(
                "| {} | {} | {} |\n",
                result.family, result.case_name, status
            ));
        }
        for result in self.results.iter().filter(|r| !r.passed) {
            out.push_str(&format!("\n## {}\n\n```\n", result.case_name));
            out.push_str(result.diff.as_deref().unwrap_or("(no diff)"));
            out.push_str("\n```\n");
        }
        out
    }
}
