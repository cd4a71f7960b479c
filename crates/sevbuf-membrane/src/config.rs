//! Process-wide threshold configuration.
//!
//! The default threshold for instances built from the environment is set via
//! the `SEVBUF_LEVEL` environment variable. It accepts a severity name
//! (`emerg`, `alert`, `crit`, `err`, `warning`, `notice`, `info`, `debug`
//! and their long forms, case-insensitive) or a numeric code `0..=7`.
//! Anything else resolves to [`DEFAULT_THRESHOLD_CODE`].
//!
//! The membrane deals in raw codes; `sevbuf-core` maps them to `Severity`.

use std::sync::atomic::{AtomicU8, Ordering};

/// Environment variable consulted by [`threshold_code`].
pub const THRESHOLD_ENV: &str = "SEVBUF_LEVEL";

/// Info.
pub const DEFAULT_THRESHOLD_CODE: u8 = 6;

/// Largest valid severity code.
pub const MAX_THRESHOLD_CODE: u8 = 7;

// Atomic cache: 0..=7 resolved code, UNRESOLVED or RESOLVING otherwise.
// Uses a non-blocking state machine instead of OnceLock so that a log call
// issued while the environment is being read does not deadlock.
static CACHED_CODE: AtomicU8 = AtomicU8::new(CODE_UNRESOLVED);

const CODE_UNRESOLVED: u8 = 254;
const CODE_RESOLVING: u8 = 255;

/// Parse a threshold from its textual form.
///
/// Returns `None` for unrecognised input.
#[must_use]
pub fn parse_threshold(raw: &str) -> Option<u8> {
    let raw = raw.trim();
    if let Ok(code) = raw.parse::<u8>() {
        return (code <= MAX_THRESHOLD_CODE).then_some(code);
    }
    match raw.to_ascii_lowercase().as_str() {
        "emerg" | "emergency" | "panic" => Some(0),
        "alert" => Some(1),
        "crit" | "critical" => Some(2),
        "err" | "error" => Some(3),
        "warn" | "warning" => Some(4),
        "notice" => Some(5),
        "info" => Some(6),
        "debug" => Some(7),
        _ => None,
    }
}

fn parse_threshold_env(raw: &str) -> u8 {
    parse_threshold(raw).unwrap_or(DEFAULT_THRESHOLD_CODE)
}

/// Get the configured threshold code (reads the env var on first call,
/// caches thereafter).
///
/// A re-entrant call that arrives while resolution is in progress gets
/// [`DEFAULT_THRESHOLD_CODE`].
#[must_use]
pub fn threshold_code() -> u8 {
    let cached = CACHED_CODE.load(Ordering::Relaxed);

    if cached <= MAX_THRESHOLD_CODE {
        return cached;
    }

    if cached == CODE_RESOLVING {
        return DEFAULT_THRESHOLD_CODE;
    }

    if CACHED_CODE
        .compare_exchange(
            CODE_UNRESOLVED,
            CODE_RESOLVING,
            Ordering::SeqCst,
            Ordering::Relaxed,
        )
        .is_err()
    {
        let v = CACHED_CODE.load(Ordering::Relaxed);
        return if v <= MAX_THRESHOLD_CODE {
            v
        } else {
            DEFAULT_THRESHOLD_CODE
        };
    }

    let code = std::env::var(THRESHOLD_ENV)
        .map(|v| parse_threshold_env(&v))
        .unwrap_or(DEFAULT_THRESHOLD_CODE);
    CACHED_CODE.store(code, Ordering::Release);
    code
}
