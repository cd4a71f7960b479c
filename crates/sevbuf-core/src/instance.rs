//! Logging instances and the severity gate.

use crate::level::Severity;

/// Logging configuration unit: an identifier and a configured threshold.
///
/// Immutable once built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Instance {
    id: u32,
    level: Severity,
}

impl Instance {
    #[must_use]
    pub const fn new(id: u32, level: Severity) -> Self {
        Self { id, level }
    }

    /// Build an instance whose threshold comes from `SEVBUF_LEVEL`.
    #[must_use]
    pub fn from_env(id: u32) -> Self {
        let level =
            Severity::from_code(sevbuf_membrane::threshold_code()).unwrap_or(Severity::Info);
        Self::new(id, level)
    }

    #[must_use]
    pub const fn id(&self) -> u32 {
        self.id
    }

    /// Configured threshold.
    #[must_use]
    pub const fn level(&self) -> Severity {
        self.level
    }

    /// Whether an operation requested at `requested` may run.
    #[must_use]
    pub const fn permits(&self, requested: Severity) -> bool {
        Gate::permits(self, requested)
    }
}

/// Per-call severity comparison wrapping every buffer operation.
///
/// An operation proceeds only when the requested code is numerically not
/// less than the configured threshold code. Anything else is a complete
/// no-op.
///
/// Note this passes requests that are *less* urgent than the threshold and
/// blocks more urgent ones, which is the reverse of the usual syslog
/// convention. Callers relying on the conventional direction must invert the
/// threshold themselves.
#[derive(Debug, Clone, Copy, Default)]
pub struct Gate;

impl Gate {
    #[must_use]
    pub const fn permits(instance: &Instance, requested: Severity) -> bool {
        requested.code() >= instance.level.code()
    }
}
