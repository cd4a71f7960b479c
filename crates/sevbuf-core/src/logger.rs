//! Logging entrypoint.
//!
//! A [`Logger`] renders one line per call into a scratch [`LogBuffer`]:
//! `[LEVEL] file:line routine: message`, hands it to its [`Sink`], and
//! destroys the buffer. Calls refused by the gate allocate nothing.

use std::fmt;

use sevbuf_membrane::{Allocator, SystemAllocator};

use crate::buffer::{BufferConfig, Disposition, LogBuffer};
use crate::instance::Instance;
use crate::level::Severity;
use crate::sink::{Origin, Record, Sink};

/// Instance + sink + allocator.
pub struct Logger<S: Sink, A: Allocator = SystemAllocator> {
    instance: Instance,
    sink: S,
    allocator: A,
    config: BufferConfig,
}

impl<S: Sink> Logger<S> {
    #[must_use]
    pub fn new(instance: Instance, sink: S) -> Self {
        Self::with_allocator(instance, sink, SystemAllocator)
    }
}

impl<S: Sink, A: Allocator> Logger<S, A> {
    pub fn with_allocator(instance: Instance, sink: S, allocator: A) -> Self {
        Self {
            instance,
            sink,
            allocator,
            config: BufferConfig::default(),
        }
    }

    /// Sizing for the scratch buffers.
    #[must_use]
    pub fn with_config(mut self, config: BufferConfig) -> Self {
        self.config = config;
        self
    }

    pub fn instance(&self) -> &Instance {
        &self.instance
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    /// Whether a call at `level` would get past the gate.
    #[must_use]
    pub fn enabled(&self, level: Severity) -> bool {
        self.instance.permits(level)
    }

    /// Render and emit one log line.
    ///
    /// Returns [`Disposition::Applied`] when the line reached the sink.
    /// Allocation and formatting failures drop the line.
    ///
    /// The line is null-terminated text, so a message that renders an
    /// embedded `\0` reaches the sink cut off at that byte and still reports
    /// `Applied`. Escape untrusted values (for example with `{:?}`) when the
    /// whole message must survive.
    pub fn write(&self, level: Severity, origin: Origin, args: fmt::Arguments<'_>) -> Disposition {
        let inst = &self.instance;
        if !inst.permits(level) {
            return Disposition::Skipped;
        }

        let mut buffer = LogBuffer::with_config(&self.allocator, self.config);
        let created = buffer.create(inst, level);
        if !created.is_applied() {
            return created;
        }

        let header = crate::buffer_append!(
            buffer,
            inst,
            level,
            "[{}] {}:{} {}: ",
            level,
            origin.file,
            origin.line,
            origin.routine
        );
        let outcome = if header.is_applied() {
            buffer.append_args(inst, level, args)
        } else {
            header
        };

        if outcome.is_applied()
            && let Some(text) = buffer.text()
        {
            self.sink.emit(&Record {
                instance_id: inst.id(),
                level,
                origin,
                text,
            });
        }

        buffer.destroy(inst, level);
        outcome
    }
}

/// Log through a [`Logger`], capturing the call site.
///
/// Output stops at the first `\0` in the rendered message; see
/// [`Logger::write`].
///
/// ```
/// use sevbuf_core::{Instance, Logger, MemorySink, Severity, sevlog};
///
/// let logger = Logger::new(Instance::new(1, Severity::Info), MemorySink::new());
/// sevlog!(logger, Severity::Debug, "cache warmed in {} ms", 12);
/// assert!(logger.sink().records()[0].text.ends_with("cache warmed in 12 ms"));
/// ```
#[macro_export]
macro_rules! sevlog {
    ($logger:expr, $level:expr, $($arg:tt)+) => {
        $logger.write($level, $crate::origin!(), ::core::format_args!($($arg)+))
    };
}
