//! Growable, severity-gated text buffer.
//!
//! A [`LogBuffer`] is either *absent* (no allocation, capacity 0) or
//! *present* (one block, null-terminated text strictly shorter than the
//! block). Each operation takes the [`Instance`] and a requested
//! [`Severity`] and is a complete no-op when the gate refuses it.
//!
//! ```text
//! Absent --create ok--> Present --reset/append--> Present
//!   ^  \--create oom--> Absent                       |
//!   +-------------------- destroy -------------------+
//! ```
//!
//! Allocation failure never propagates as an error. `create` leaves the
//! buffer absent; a failed grow inside `append` leaves it exactly as it was.
//! A block of any length other than the one requested counts as a failed
//! allocation and is released at once. The returned [`Disposition`] says what happened without changing state.

mod growth;
mod measure;

pub use growth::GrowthPolicy;

use std::ffi::CStr;
use std::fmt;

use sevbuf_membrane::{Allocator, Block, SystemAllocator};

use crate::instance::Instance;
use crate::level::Severity;

/// Capacity of a freshly created buffer, and the headroom added on growth.
pub const DEFAULT_CAPACITY: usize = 256;

/// Per-buffer sizing configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BufferConfig {
    /// Initial capacity and exact-fit growth headroom.
    pub default_capacity: usize,
    pub growth: GrowthPolicy,
}

impl Default for BufferConfig {
    fn default() -> Self {
        Self {
            default_capacity: DEFAULT_CAPACITY,
            growth: GrowthPolicy::ExactFit,
        }
    }
}

impl BufferConfig {
    #[must_use]
    pub fn with_default_capacity(mut self, default_capacity: usize) -> Self {
        self.default_capacity = default_capacity;
        self
    }

    #[must_use]
    pub fn with_growth(mut self, growth: GrowthPolicy) -> Self {
        self.growth = growth;
        self
    }
}

/// What an operation did. Purely informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Disposition {
    /// Gate refused the call, or there was nothing to operate on.
    Skipped,
    /// The operation ran.
    Applied,
    /// An allocation failed; the buffer is absent (create) or unchanged
    /// (append).
    OutOfMemory,
    /// A `Display` implementation reported an error. The buffer stays
    /// null-terminated; text written before the failure is kept.
    FormatError,
}

impl Disposition {
    #[must_use]
    pub const fn is_applied(self) -> bool {
        matches!(self, Self::Applied)
    }
}

/// Growable null-terminated text accumulator.
pub struct LogBuffer<A: Allocator = SystemAllocator> {
    allocator: A,
    config: BufferConfig,
    content: Option<Block>,
}

impl LogBuffer<SystemAllocator> {
    /// Absent buffer backed by the process heap.
    #[must_use]
    pub fn new() -> Self {
        Self::new_in(SystemAllocator)
    }
}

impl Default for LogBuffer<SystemAllocator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Allocator> LogBuffer<A> {
    /// Absent buffer drawing blocks from `allocator`.
    pub fn new_in(allocator: A) -> Self {
        Self::with_config(allocator, BufferConfig::default())
    }

    pub fn with_config(allocator: A, config: BufferConfig) -> Self {
        Self {
            allocator,
            config,
            content: None,
        }
    }

    #[must_use]
    pub fn config(&self) -> BufferConfig {
        self.config
    }

    pub fn allocator(&self) -> &A {
        &self.allocator
    }

    /// Allocate `default_capacity` bytes holding empty text.
    ///
    /// A buffer that is already present has its block released first. On
    /// allocation failure the buffer is left absent.
    pub fn create(&mut self, instance: &Instance, level: Severity) -> Disposition {
        if !instance.permits(level) {
            return Disposition::Skipped;
        }
        if let Some(old) = self.content.take() {
            self.allocator.release(old);
        }

        let size = self.config.default_capacity;
        match self.allocator.allocate(size) {
            Some(mut block) if block.len() == size => {
                block.as_mut_slice()[0] = 0;
                self.content = Some(block);
                Disposition::Applied
            }
            Some(short) => {
                self.allocator.release(short);
                Disposition::OutOfMemory
            }
            None => Disposition::OutOfMemory,
        }
    }

    /// Clear the text, keeping the allocation and its capacity.
    pub fn reset(&mut self, instance: &Instance, level: Severity) -> Disposition {
        if !instance.permits(level) {
            return Disposition::Skipped;
        }
        match self.content.as_mut() {
            Some(block) => {
                block.as_mut_slice()[0] = 0;
                Disposition::Applied
            }
            None => Disposition::Skipped,
        }
    }

    /// Append formatted text, growing the allocation if it does not fit.
    ///
    /// This is the captured-arguments form: wrappers that already hold a
    /// [`fmt::Arguments`] pass it straight through. See [`buffer_append!`]
    /// for the variadic form.
    ///
    /// [`buffer_append!`]: crate::buffer_append
    pub fn append_args(
        &mut self,
        instance: &Instance,
        level: Severity,
        args: fmt::Arguments<'_>,
    ) -> Disposition {
        if !instance.permits(level) {
            return Disposition::Skipped;
        }
        let Self {
            allocator,
            config,
            content,
        } = self;
        let Some(block) = content.as_mut() else {
            return Disposition::Skipped;
        };

        let text_len = measure::strlen(block.as_slice());
        let Ok(expansion) = measure::expansion_len(args) else {
            return Disposition::FormatError;
        };
        let Some(required) = text_len
            .checked_add(expansion)
            .and_then(|n| n.checked_add(1))
        else {
            return Disposition::OutOfMemory;
        };

        if required > block.len()
            && growth::grow_to(
                &*allocator,
                config.growth,
                config.default_capacity,
                block,
                text_len,
                required,
            )
            .is_none()
        {
            return Disposition::OutOfMemory;
        }

        match measure::format_terminated(&mut block.as_mut_slice()[text_len..], args) {
            Ok(_) => Disposition::Applied,
            Err(fmt::Error) => Disposition::FormatError,
        }
    }

    /// Append the `Display` rendering of `value`.
    pub fn append<T: fmt::Display + ?Sized>(
        &mut self,
        instance: &Instance,
        level: Severity,
        value: &T,
    ) -> Disposition {
        self.append_args(instance, level, format_args!("{value}"))
    }

    /// Release the allocation. Destroying an absent buffer does nothing.
    pub fn destroy(&mut self, instance: &Instance, level: Severity) -> Disposition {
        if !instance.permits(level) {
            return Disposition::Skipped;
        }
        match self.content.take() {
            Some(block) => {
                self.allocator.release(block);
                Disposition::Applied
            }
            None => Disposition::Skipped,
        }
    }

    /// Current text, up to the terminator. `None` when absent.
    #[must_use]
    pub fn data(&self) -> Option<&CStr> {
        self.content
            .as_ref()
            .and_then(|block| CStr::from_bytes_until_nul(block.as_slice()).ok())
    }

    /// Current text as UTF-8. `None` when absent.
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        self.data().and_then(|text| text.to_str().ok())
    }

    /// Allocated capacity in bytes (not the text length). 0 when absent.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.content.as_ref().map_or(0, Block::len)
    }

    /// Text length in bytes, excluding the terminator.
    #[must_use]
    pub fn text_len(&self) -> usize {
        self.content
            .as_ref()
            .map_or(0, |block| measure::strlen(block.as_slice()))
    }

    #[must_use]
    pub fn is_present(&self) -> bool {
        self.content.is_some()
    }
}

impl<A: Allocator> Drop for LogBuffer<A> {
    fn drop(&mut self) {
        if let Some(block) = self.content.take() {
            self.allocator.release(block);
        }
    }
}

impl<A: Allocator> fmt::Debug for LogBuffer<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LogBuffer")
            .field("capacity", &self.capacity())
            .field("text", &self.data())
            .field("config", &self.config)
            .finish()
    }
}

/// Append formatted text to a [`LogBuffer`].
///
/// ```
/// use sevbuf_core::{Instance, LogBuffer, Severity, buffer_append};
///
/// let inst = Instance::new(1, Severity::Info);
/// let mut buf = LogBuffer::new();
/// buf.create(&inst, Severity::Info);
/// buffer_append!(buf, &inst, Severity::Debug, "{}+{}={}", 1, 1, 2);
/// assert_eq!(buf.text(), Some("1+1=2"));
/// ```
#[macro_export]
macro_rules! buffer_append {
    ($buffer:expr, $instance:expr, $level:expr, $($arg:tt)+) => {
        $buffer.append_args($instance, $level, ::core::format_args!($($arg)+))
    };
}

#[cfg(test)]
mod testing {
    use std::cell::Cell;

    use sevbuf_membrane::{Allocator, Block, SystemAllocator};

    /// Serves the first `full` requests in full, then hands back half of
    /// what was asked for.
    pub(super) struct ShortChange {
        full: Cell<usize>,
    }

    impl ShortChange {
        pub(super) fn after(full: usize) -> Self {
            Self {
                full: Cell::new(full),
            }
        }
    }

    impl Allocator for ShortChange {
        fn allocate(&self, size: usize) -> Option<Block> {
            match self.full.get() {
                0 => SystemAllocator.allocate(size / 2),
                n => {
                    self.full.set(n - 1);
                    SystemAllocator.allocate(size)
                }
            }
        }

        fn release(&self, block: Block) {
            SystemAllocator.release(block);
        }
    }
}
