//! Tracking allocator.
//!
//! Wraps another [`Allocator`] and keeps a ledger of live blocks, a
//! failure-injection plan, and structured lifecycle records for every
//! allocate/release decision. Tests and the conformance harness use it to
//! observe exactly how many blocks a buffer holds and to force the
//! out-of-memory paths.

use std::collections::HashMap;

use parking_lot::Mutex;

use crate::alloc::{Allocator, Block, SystemAllocator};

/// Lifecycle record severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AllocatorLogLevel {
    Trace,
    Debug,
    Warn,
}

/// Structured allocator lifecycle record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllocatorLogRecord {
    /// Monotonic decision id.
    pub decision_id: u64,
    /// Correlation id (`membrane::alloc::<event>::<id>`).
    pub trace_id: String,
    pub level: AllocatorLogLevel,
    /// Event kind (`allocate`, `release`).
    pub event: &'static str,
    /// Size involved in the event.
    pub size: usize,
    /// Machine-readable outcome label.
    pub outcome: &'static str,
    /// Snapshot: live blocks after the event.
    pub live_blocks: usize,
    /// Snapshot: live bytes after the event.
    pub live_bytes: usize,
}

/// When the tracking allocator should refuse requests.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub enum FailurePlan {
    /// Forward every request.
    #[default]
    Never,
    /// Refuse every request.
    Always,
    /// The next `n` requests succeed, later ones fail.
    AfterAllocations(usize),
    /// Requests larger than the limit fail.
    AboveSize(usize),
}

/// Ledger counters.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AllocatorStats {
    pub live_blocks: usize,
    pub live_bytes: usize,
    pub allocations: u64,
    pub releases: u64,
    pub failed_allocations: u64,
    /// Releases of blocks this allocator never handed out.
    pub foreign_releases: u64,
}

struct Ledger {
    stats: AllocatorStats,
    /// Base address to size of every block handed out and not yet released.
    addr_to_size: HashMap<usize, usize>,
    plan: FailurePlan,
    next_decision_id: u64,
    lifecycle_logs: Vec<AllocatorLogRecord>,
}

impl Ledger {
    fn refuses(&mut self, size: usize) -> bool {
        match &mut self.plan {
            FailurePlan::Never => false,
            FailurePlan::Always => true,
            FailurePlan::AfterAllocations(remaining) => {
                if *remaining == 0 {
                    true
                } else {
                    *remaining -= 1;
                    false
                }
            }
            FailurePlan::AboveSize(limit) => size > *limit,
        }
    }

    fn record(
        &mut self,
        level: AllocatorLogLevel,
        event: &'static str,
        size: usize,
        outcome: &'static str,
    ) {
        let decision_id = self.next_decision_id;
        self.next_decision_id = self.next_decision_id.wrapping_add(1);
        self.lifecycle_logs.push(AllocatorLogRecord {
            decision_id,
            trace_id: format!("membrane::alloc::{event}::{decision_id:016x}"),
            level,
            event,
            size,
            outcome,
            live_blocks: self.stats.live_blocks,
            live_bytes: self.stats.live_bytes,
        });
    }
}

/// Allocator wrapper with accounting and failure injection.
pub struct TrackingAllocator<A: Allocator = SystemAllocator> {
    inner: A,
    ledger: Mutex<Ledger>,
}

impl TrackingAllocator<SystemAllocator> {
    /// Track the process heap.
    #[must_use]
    pub fn new() -> Self {
        Self::wrap(SystemAllocator)
    }
}

impl Default for TrackingAllocator<SystemAllocator> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A: Allocator> TrackingAllocator<A> {
    /// Track an arbitrary allocator.
    pub fn wrap(inner: A) -> Self {
        Self {
            inner,
            ledger: Mutex::new(Ledger {
                stats: AllocatorStats::default(),
                addr_to_size: HashMap::new(),
                plan: FailurePlan::Never,
                next_decision_id: 1,
                lifecycle_logs: Vec::new(),
            }),
        }
    }

    /// Start with a failure plan already installed.
    #[must_use]
    pub fn with_failure_plan(self, plan: FailurePlan) -> Self {
        self.ledger.lock().plan = plan;
        self
    }

    /// Replace the failure plan. Takes effect on the next request.
    pub fn set_failure_plan(&self, plan: FailurePlan) {
        self.ledger.lock().plan = plan;
    }

    #[must_use]
    pub fn failure_plan(&self) -> FailurePlan {
        self.ledger.lock().plan
    }

    #[must_use]
    pub fn stats(&self) -> AllocatorStats {
        self.ledger.lock().stats
    }

    /// Number of blocks handed out and not yet released.
    #[must_use]
    pub fn live_blocks(&self) -> usize {
        self.ledger.lock().stats.live_blocks
    }

    /// Take all lifecycle records accumulated so far.
    pub fn drain_lifecycle_logs(&self) -> Vec<AllocatorLogRecord> {
        std::mem::take(&mut self.ledger.lock().lifecycle_logs)
    }
}

impl<A: Allocator> Allocator for TrackingAllocator<A> {
    fn allocate(&self, size: usize) -> Option<Block> {
        let mut ledger = self.ledger.lock();
        if ledger.refuses(size) {
            ledger.stats.failed_allocations += 1;
            ledger.record(AllocatorLogLevel::Warn, "allocate", size, "injected_oom");
            return None;
        }
        let Some(block) = self.inner.allocate(size) else {
            ledger.stats.failed_allocations += 1;
            ledger.record(AllocatorLogLevel::Warn, "allocate", size, "oom");
            return None;
        };
        ledger.addr_to_size.insert(block.addr(), block.len());
        ledger.stats.allocations += 1;
        ledger.stats.live_blocks += 1;
        ledger.stats.live_bytes += block.len();
        ledger.record(AllocatorLogLevel::Trace, "allocate", size, "success");
        Some(block)
    }

    fn release(&self, block: Block) {
        let size = block.len();
        let mut ledger = self.ledger.lock();
        if ledger.addr_to_size.remove(&block.addr()).is_some() {
            ledger.stats.releases += 1;
            ledger.stats.live_blocks -= 1;
            ledger.stats.live_bytes -= size;
            ledger.record(AllocatorLogLevel::Trace, "release", size, "success");
        } else {
            // Not in the ledger: the block came from a different allocator.
            ledger.stats.foreign_releases += 1;
            ledger.record(AllocatorLogLevel::Debug, "release", size, "foreign");
        }
        self.inner.release(block);
    }
}
