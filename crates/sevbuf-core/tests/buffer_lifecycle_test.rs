//! Integration test: buffer lifecycle under the severity gate.
//!
//! Validates that:
//! 1. The INFO-threshold walkthrough (append/gated append/reset/destroy) holds.
//! 2. Deterministic op sequences keep the buffer in step with a plain model.
//! 3. Exactly one block is live while a buffer is present, none after.
//!
//! Run: cargo test -p sevbuf-core --test buffer_lifecycle_test

use sevbuf_core::{
    BufferConfig, DEFAULT_CAPACITY, Disposition, GrowthPolicy, Instance, LogBuffer, Severity,
    buffer_append,
};
use sevbuf_membrane::{FailurePlan, TrackingAllocator};

#[test]
fn info_threshold_walkthrough() {
    let alloc = TrackingAllocator::new();
    let inst = Instance::new(1, Severity::Info);
    let mut buf = LogBuffer::new_in(&alloc);

    assert_eq!(buf.create(&inst, Severity::Info), Disposition::Applied);

    assert_eq!(buf.append(&inst, Severity::Debug, "x"), Disposition::Applied);
    assert_eq!(buf.text(), Some("x"));

    assert_eq!(buf.append(&inst, Severity::Error, "y"), Disposition::Skipped);
    assert_eq!(buf.text(), Some("x"));

    assert_eq!(buf.reset(&inst, Severity::Info), Disposition::Applied);
    assert_eq!(buf.text(), Some(""));
    assert_eq!(buf.capacity(), DEFAULT_CAPACITY);

    assert_eq!(buf.destroy(&inst, Severity::Info), Disposition::Applied);
    assert!(!buf.is_present());
    assert_eq!(buf.capacity(), 0);
    assert_eq!(alloc.live_blocks(), 0);
}

#[test]
fn data_accessor_exposes_terminated_bytes() {
    let inst = Instance::new(1, Severity::Emergency);
    let mut buf = LogBuffer::new();
    buf.create(&inst, Severity::Emergency);
    buffer_append!(buf, &inst, Severity::Alert, "{}:{:03}", "code", 7);

    let data = buf.data().expect("present buffer");
    assert_eq!(data.to_bytes_with_nul(), b"code:007\0");
    assert_eq!(data.to_bytes().len(), buf.text_len());
    assert!(buf.capacity() > buf.text_len());
}

#[test]
fn many_small_appends_each_crossing_capacity() {
    // Headroom of 1 forces a reallocation on almost every append.
    let alloc = TrackingAllocator::new();
    let inst = Instance::new(1, Severity::Info);
    let config = BufferConfig::default().with_default_capacity(1);
    let mut buf = LogBuffer::with_config(&alloc, config);
    buf.create(&inst, Severity::Info);

    let mut expected = String::new();
    for i in 0..50 {
        let piece = format!("{i},");
        buf.append(&inst, Severity::Info, piece.as_str());
        expected.push_str(&piece);
        assert_eq!(buf.text(), Some(expected.as_str()));
        assert!(buf.capacity() > buf.text_len());
    }
    assert_eq!(alloc.live_blocks(), 1);
    assert!(alloc.stats().allocations > 25);
}

#[derive(Clone, Copy, Debug)]
struct XorShift64 {
    state: u64,
}

impl XorShift64 {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        // xorshift64*
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    fn gen_range_usize(&mut self, low: usize, high_inclusive: usize) -> usize {
        assert!(low <= high_inclusive);
        let span = high_inclusive - low + 1;
        low + (self.next_u64() as usize % span)
    }

    fn severity(&mut self) -> Severity {
        Severity::ALL[self.gen_range_usize(0, Severity::ALL.len() - 1)]
    }
}

/// Reference model: text plus capacity, no allocator.
#[derive(Debug, Default)]
struct Model {
    text: Option<String>,
    capacity: usize,
}

fn check_sequences(policy: GrowthPolicy) {
    const SEEDS: [u64; 4] = [11, 22, 33, 44];
    const STEPS: usize = 1_500;

    for seed in SEEDS {
        let alloc = TrackingAllocator::new();
        let inst = Instance::new(7, Severity::Notice);
        let config = BufferConfig::default().with_growth(policy);
        let mut buf = LogBuffer::with_config(&alloc, config);
        let mut model = Model::default();
        let mut rng = XorShift64::new(seed);

        for step in 0..STEPS {
            let level = rng.severity();
            let passes = level.code() >= inst.level().code();
            let fail = rng.gen_range_usize(0, 19) == 0;
            alloc.set_failure_plan(if fail {
                FailurePlan::Always
            } else {
                FailurePlan::Never
            });

            match rng.gen_range_usize(0, 9) {
                0 => {
                    buf.create(&inst, level);
                    if passes {
                        if fail {
                            model = Model::default();
                        } else {
                            model.text = Some(String::new());
                            model.capacity = DEFAULT_CAPACITY;
                        }
                    }
                }
                1 => {
                    buf.reset(&inst, level);
                    if passes && let Some(text) = model.text.as_mut() {
                        text.clear();
                    }
                }
                2 => {
                    buf.destroy(&inst, level);
                    if passes {
                        model = Model::default();
                    }
                }
                _ => {
                    let len = rng.gen_range_usize(0, 120);
                    let piece: String = (0..len)
                        .map(|i| char::from(b'a' + ((i + step) % 26) as u8))
                        .collect();
                    buf.append(&inst, level, piece.as_str());
                    if passes && let Some(text) = model.text.as_mut() {
                        let required = text.len() + piece.len() + 1;
                        if required <= model.capacity {
                            text.push_str(&piece);
                        } else if !fail {
                            model.capacity = policy
                                .next_capacity(model.capacity, required, DEFAULT_CAPACITY)
                                .expect("no overflow at test sizes");
                            text.push_str(&piece);
                        }
                    }
                }
            }

            assert_eq!(
                buf.text(),
                model.text.as_deref(),
                "seed={seed} step={step}"
            );
            assert_eq!(buf.capacity(), model.capacity, "seed={seed} step={step}");
            assert_eq!(
                alloc.live_blocks(),
                usize::from(model.text.is_some()),
                "seed={seed} step={step}"
            );
            if buf.is_present() {
                assert!(buf.text_len() < buf.capacity(), "seed={seed} step={step}");
            }
        }
    }
}

#[test]
fn exact_fit_sequences_match_model() {
    check_sequences(GrowthPolicy::ExactFit);
}

#[test]
fn doubling_sequences_match_model() {
    check_sequences(GrowthPolicy::Doubling);
}
