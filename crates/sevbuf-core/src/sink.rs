//! Output destinations for rendered log lines.

use std::fmt;
use std::io::Write;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::level::Severity;

/// Call-site metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Origin {
    pub file: &'static str,
    /// Enclosing routine; the macros fill in the module path.
    pub routine: &'static str,
    pub line: u32,
}

impl Origin {
    #[must_use]
    pub const fn new(file: &'static str, routine: &'static str, line: u32) -> Self {
        Self {
            file,
            routine,
            line,
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{} {}", self.file, self.line, self.routine)
    }
}

/// Capture the current call site as an [`Origin`].
#[macro_export]
macro_rules! origin {
    () => {
        $crate::Origin::new(
            ::core::file!(),
            ::core::module_path!(),
            ::core::line!(),
        )
    };
}

/// One rendered log line on its way to a sink.
#[derive(Debug, Clone, Copy)]
pub struct Record<'a> {
    pub instance_id: u32,
    pub level: Severity,
    pub origin: Origin,
    /// Full rendered line, header included.
    pub text: &'a str,
}

impl Record<'_> {
    #[must_use]
    pub fn to_owned_record(&self) -> OwnedRecord {
        OwnedRecord {
            instance_id: self.instance_id,
            level: self.level,
            origin: self.origin,
            text: self.text.to_string(),
        }
    }
}

/// Owned copy of a [`Record`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnedRecord {
    pub instance_id: u32,
    pub level: Severity,
    pub origin: Origin,
    pub text: String,
}

/// Destination for rendered records.
pub trait Sink {
    fn emit(&self, record: &Record<'_>);
}

impl<S: Sink + ?Sized> Sink for &S {
    fn emit(&self, record: &Record<'_>) {
        (**self).emit(record);
    }
}

impl<S: Sink + ?Sized> Sink for Arc<S> {
    fn emit(&self, record: &Record<'_>) {
        (**self).emit(record);
    }
}

/// Writes each record as one line on standard error.
#[derive(Debug, Default, Clone, Copy)]
pub struct StderrSink;

impl Sink for StderrSink {
    fn emit(&self, record: &Record<'_>) {
        let mut err = std::io::stderr().lock();
        // Nowhere left to report a failed write to stderr.
        let _ = writeln!(err, "{}", record.text);
    }
}

/// Discards everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl Sink for NullSink {
    fn emit(&self, _record: &Record<'_>) {}
}

/// Collects records in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<OwnedRecord>>,
}

impl MemorySink {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn records(&self) -> Vec<OwnedRecord> {
        self.records.lock().clone()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.lock().is_empty()
    }

    pub fn drain(&self) -> Vec<OwnedRecord> {
        std::mem::take(&mut *self.records.lock())
    }
}

impl Sink for MemorySink {
    fn emit(&self, record: &Record<'_>) {
        self.records.lock().push(record.to_owned_record());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(text: &str) -> Record<'_> {
        Record {
            instance_id: 3,
            level: Severity::Notice,
            origin: Origin::new("src/main.rs", "app::run", 12),
            text,
        }
    }

    #[test]
    fn origin_renders_file_line_routine() {
        let origin = Origin::new("src/lib.rs", "crate::f", 7);
        assert_eq!(origin.to_string(), "src/lib.rs:7 crate::f");
    }

    #[test]
    fn origin_macro_captures_call_site() {
        let here = origin!();
        assert!(here.file.ends_with("sink.rs"));
        assert_eq!(here.routine, module_path!());
        assert!(here.line > 0);
    }

    #[test]
    fn memory_sink_collects_and_drains() {
        let sink = MemorySink::new();
        sink.emit(&record("one"));
        (&sink).emit(&record("two"));
        assert_eq!(sink.len(), 2);

        let drained = sink.drain();
        assert_eq!(drained[0].text, "one");
        assert_eq!(drained[1].text, "two");
        assert_eq!(drained[1].instance_id, 3);
        assert!(sink.is_empty());
    }

    #[test]
    fn arc_sink_forwards() {
        let sink = Arc::new(MemorySink::new());
        let shared: Arc<dyn Sink> = sink.clone();
        shared.emit(&record("shared"));
        assert_eq!(sink.records()[0].text, "shared");
    }

    #[test]
    fn null_and_stderr_sinks_accept_records() {
        NullSink.emit(&record("dropped"));
        StderrSink.emit(&record("[NOTICE] src/main.rs:12 app::run: visible in test output"));
    }
}
