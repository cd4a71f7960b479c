//! Severity levels.
//!
//! Lower codes are more urgent: `Emergency` is 0, `Debug` is 7.

use std::fmt;
use std::str::FromStr;

/// Number of distinct severity levels.
pub const SEVERITY_COUNT: usize = 8;

/// Message urgency.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Severity {
    Emergency = 0,
    Alert = 1,
    Critical = 2,
    Error = 3,
    Warning = 4,
    Notice = 5,
    Info = 6,
    Debug = 7,
}

/// Returned when a severity name or code is not recognised.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown severity '{input}'")]
pub struct ParseSeverityError {
    input: String,
}

impl Severity {
    /// All levels, most urgent first.
    pub const ALL: [Severity; SEVERITY_COUNT] = [
        Severity::Emergency,
        Severity::Alert,
        Severity::Critical,
        Severity::Error,
        Severity::Warning,
        Severity::Notice,
        Severity::Info,
        Severity::Debug,
    ];

    /// Numeric code.
    #[must_use]
    pub const fn code(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        Self::ALL.get(usize::from(code)).copied()
    }

    /// Upper-case label used in rendered output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Emergency => "EMERGENCY",
            Self::Alert => "ALERT",
            Self::Critical => "CRITICAL",
            Self::Error => "ERROR",
            Self::Warning => "WARNING",
            Self::Notice => "NOTICE",
            Self::Info => "INFO",
            Self::Debug => "DEBUG",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Severity {
    type Err = ParseSeverityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        sevbuf_membrane::parse_threshold(s)
            .and_then(Self::from_code)
            .ok_or_else(|| ParseSeverityError {
                input: s.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_match_syslog_ordering() {
        for (i, level) in Severity::ALL.iter().enumerate() {
            assert_eq!(usize::from(level.code()), i);
            assert_eq!(Severity::from_code(level.code()), Some(*level));
        }
        assert_eq!(Severity::from_code(8), None);
    }

    #[test]
    fn more_urgent_orders_lower() {
        assert!(Severity::Emergency < Severity::Error);
        assert!(Severity::Info < Severity::Debug);
    }

    #[test]
    fn parse_accepts_names_and_digits() {
        assert_eq!("info".parse::<Severity>(), Ok(Severity::Info));
        assert_eq!("WARNING".parse::<Severity>(), Ok(Severity::Warning));
        assert_eq!("3".parse::<Severity>(), Ok(Severity::Error));
    }

    #[test]
    fn parse_rejects_unknown() {
        let err = "loud".parse::<Severity>().unwrap_err();
        assert_eq!(err.to_string(), "unknown severity 'loud'");
    }

    #[test]
    fn display_uses_upper_case_label() {
        assert_eq!(Severity::Notice.to_string(), "NOTICE");
    }
}
