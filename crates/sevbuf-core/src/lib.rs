//! # sevbuf-core
//!
//! Severity-gated growable text buffers.
//!
//! A caller holds one [`Instance`] (an id plus a configured threshold) and
//! any number of [`LogBuffer`]s. Every buffer operation takes the instance
//! and a requested [`Severity`]; the gate decides whether the operation runs
//! at all. Buffers accumulate formatted fragments into a single
//! null-terminated allocation obtained from a
//! [`sevbuf_membrane::Allocator`], and a [`Logger`] ties the pieces together
//! for a complete log call ending in a [`Sink`].
//!
//! No `unsafe` code is permitted at the crate level.

#![deny(unsafe_code)]

pub mod buffer;
pub mod instance;
pub mod level;
pub mod logger;
pub mod sink;

pub use buffer::{BufferConfig, DEFAULT_CAPACITY, Disposition, GrowthPolicy, LogBuffer};
pub use instance::{Gate, Instance};
pub use level::{ParseSeverityError, SEVERITY_COUNT, Severity};
pub use logger::Logger;
pub use sink::{MemorySink, NullSink, Origin, OwnedRecord, Record, Sink, StderrSink};
