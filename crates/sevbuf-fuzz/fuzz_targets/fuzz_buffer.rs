#![no_main]
use libfuzzer_sys::fuzz_target;
use sevbuf_core::{BufferConfig, GrowthPolicy, Instance, LogBuffer, Severity};
use sevbuf_membrane::{FailurePlan, TrackingAllocator};

fuzz_target!(|data: &[u8]| {
    // Byte 0: threshold and growth policy; then 4-byte ops.
    let Some((&head, ops)) = data.split_first() else {
        return;
    };
    let threshold = Severity::from_code(head % 8).unwrap_or(Severity::Info);
    let growth = if head & 0x80 == 0 {
        GrowthPolicy::ExactFit
    } else {
        GrowthPolicy::Doubling
    };
    let inst = Instance::new(0, threshold);
    let alloc = TrackingAllocator::new();
    let config = BufferConfig::default()
        .with_default_capacity(1 + (usize::from(head >> 3) & 0x0f) * 16)
        .with_growth(growth);
    let mut buf = LogBuffer::with_config(&alloc, config);
    let mut model: Option<String> = None;

    for chunk in ops.chunks_exact(4) {
        let level = Severity::from_code(chunk[1] % 8).unwrap_or(Severity::Debug);
        let permitted = inst.permits(level);
        let len = usize::from(u16::from_le_bytes([chunk[2], chunk[3]]) % 2048);
        let before = (buf.capacity(), buf.text().map(str::to_owned));

        match chunk[0] % 6 {
            0 => {
                let d = buf.create(&inst, level);
                if permitted {
                    model = d.is_applied().then(String::new);
                }
            }
            1 => {
                let d = buf.reset(&inst, level);
                if d.is_applied() {
                    model = Some(String::new());
                }
            }
            2 => {
                let text = "z".repeat(len);
                let d = buf.append(&inst, level, text.as_str());
                if d.is_applied()
                    && let Some(m) = model.as_mut()
                {
                    m.push_str(&text);
                }
                if !d.is_applied() {
                    assert_eq!((buf.capacity(), buf.text().map(str::to_owned)), before);
                }
            }
            3 => {
                if buf.destroy(&inst, level).is_applied() {
                    model = None;
                }
            }
            4 => alloc.set_failure_plan(FailurePlan::AboveSize(len)),
            _ => alloc.set_failure_plan(FailurePlan::Never),
        }

        assert_eq!(buf.text(), model.as_deref());
        assert_eq!(buf.is_present(), model.is_some());
        if let Some(text) = &model {
            assert!(buf.capacity() > text.len());
            assert_eq!(alloc.live_blocks(), 1);
        } else {
            assert_eq!(buf.capacity(), 0);
            assert_eq!(alloc.live_blocks(), 0);
        }
    }
});
