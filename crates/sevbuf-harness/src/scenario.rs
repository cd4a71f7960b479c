//! Built-in INFO-threshold walkthrough.
//!
//! Threshold INFO(6): a DEBUG append passes, an ERROR append is gated out,
//! an INFO reset clears the text and an INFO destroy releases the block.

use serde::Serialize;
use sevbuf_core::{Instance, LogBuffer, Severity};
use sevbuf_membrane::TrackingAllocator;

use crate::runner::disposition_label;

/// Buffer state after one step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Transition {
    pub step: usize,
    pub op: &'static str,
    pub level: &'static str,
    pub disposition: &'static str,
    pub present: bool,
    pub text: Option<String>,
    pub capacity: usize,
    pub live_blocks: usize,
}

/// Run the walkthrough and record every transition.
#[must_use]
pub fn run_info_walkthrough() -> Vec<Transition> {
    let alloc = TrackingAllocator::new();
    let inst = Instance::new(1, Severity::Info);
    let mut buf = LogBuffer::new_in(&alloc);

    let steps: [(&'static str, Severity, Option<&'static str>); 5] = [
        ("create", Severity::Info, None),
        ("append", Severity::Debug, Some("x")),
        ("append", Severity::Error, Some("y")),
        ("reset", Severity::Info, None),
        ("destroy", Severity::Info, None),
    ];

    steps
        .iter()
        .enumerate()
        .map(|(step, &(op, level, text))| {
            let disposition = match (op, text) {
                ("create", _) => buf.create(&inst, level),
                ("append", Some(text)) => buf.append(&inst, level, text),
                ("reset", _) => buf.reset(&inst, level),
                _ => buf.destroy(&inst, level),
            };
            Transition {
                step,
                op,
                level: level.as_str(),
                disposition: disposition_label(disposition),
                present: buf.is_present(),
                text: buf.text().map(str::to_owned),
                capacity: buf.capacity(),
                live_blocks: alloc.live_blocks(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walkthrough_matches_expected_transitions() {
        let transitions = run_info_walkthrough();
        let summary: Vec<_> = transitions
            .iter()
            .map(|t| (t.op, t.disposition, t.text.as_deref(), t.capacity))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("create", "applied", Some(""), 256),
                ("append", "applied", Some("x"), 256),
                ("append", "skipped", Some("x"), 256),
                ("reset", "applied", Some(""), 256),
                ("destroy", "applied", None, 0),
            ]
        );
        assert_eq!(transitions[4].live_blocks, 0);
    }
}
