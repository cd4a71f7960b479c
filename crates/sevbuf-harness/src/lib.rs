//! Conformance testing harness for sevbuf.
//!
//! This crate provides:
//! - Fixtures: JSON operation scripts with the buffer state they must produce
//! - Runner: replays fixtures against `sevbuf-core` on a tracking allocator
//! - Structured logging: JSONL records for every verified case
//! - Scenario: the built-in INFO-threshold walkthrough

#![forbid(unsafe_code)]

pub mod error;
pub mod fixtures;
pub mod runner;
pub mod scenario;
pub mod structured_log;
pub mod verify;

pub use error::HarnessError;
pub use fixtures::{ExpectedState, FixtureCase, FixtureSet, Op, PlanSpec};
pub use runner::TestRunner;
pub use verify::{VerificationResult, VerificationSummary};
