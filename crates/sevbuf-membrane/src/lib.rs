//! # sevbuf-membrane
//!
//! The allocation boundary underneath sevbuf buffers.
//!
//! Buffers never touch memory directly: every block they hold is obtained
//! from an [`Allocator`] and handed back to it on release. This crate
//! provides the capability itself, a tracking wrapper used by tests and the
//! conformance harness, and the process-wide threshold configuration.

#![deny(unsafe_code)]

pub mod alloc;
pub mod config;
pub mod tracking;

pub use alloc::{Allocator, Block, SystemAllocator};
pub use config::{DEFAULT_THRESHOLD_CODE, THRESHOLD_ENV, parse_threshold, threshold_code};
pub use tracking::{
    AllocatorLogLevel, AllocatorLogRecord, AllocatorStats, FailurePlan, TrackingAllocator,
};
