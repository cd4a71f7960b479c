//! Two-phase formatting: measure the expansion, then format in place.

use std::fmt::{self, Write};

struct ByteCounter {
    bytes: usize,
}

impl Write for ByteCounter {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.bytes = self.bytes.checked_add(s.len()).ok_or(fmt::Error)?;
        Ok(())
    }
}

/// Number of bytes `args` expands to. Nothing is written anywhere.
pub(crate) fn expansion_len(args: fmt::Arguments<'_>) -> Result<usize, fmt::Error> {
    if let Some(literal) = args.as_str() {
        return Ok(literal.len());
    }
    let mut counter = ByteCounter { bytes: 0 };
    counter.write_fmt(args)?;
    Ok(counter.bytes)
}

/// Bounded writer over a byte slice. Overflow keeps the longest prefix that
/// ends on a character boundary and reports an error.
struct SliceWriter<'a> {
    dst: &'a mut [u8],
    pos: usize,
}

impl Write for SliceWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let room = self.dst.len() - self.pos;
        let (take, result) = if s.len() <= room {
            (s.len(), Ok(()))
        } else {
            let mut cut = room;
            while !s.is_char_boundary(cut) {
                cut -= 1;
            }
            (cut, Err(fmt::Error))
        };
        self.dst[self.pos..self.pos + take].copy_from_slice(&s.as_bytes()[..take]);
        self.pos += take;
        result
    }
}

/// Format `args` at the start of `tail` and null-terminate.
///
/// The last byte of `tail` is reserved for the terminator, so at most
/// `tail.len() - 1` bytes of text are written. The terminator is written
/// even when formatting fails part way. Returns the number of text bytes
/// written.
pub(crate) fn format_terminated(
    tail: &mut [u8],
    args: fmt::Arguments<'_>,
) -> Result<usize, fmt::Error> {
    let Some(text_room) = tail.len().checked_sub(1) else {
        return Err(fmt::Error);
    };
    let mut writer = SliceWriter {
        dst: &mut tail[..text_room],
        pos: 0,
    };
    let result = writer.write_fmt(args);
    let written = writer.pos;
    tail[written] = 0;
    result.map(|()| written)
}

/// Bytes up to (not including) the first null, or the whole slice if none.
pub(crate) fn strlen(bytes: &[u8]) -> usize {
    bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn literal_is_measured_without_formatting() {
        assert_eq!(expansion_len(format_args!("hello")), Ok(5));
        assert_eq!(expansion_len(format_args!("")), Ok(0));
    }

    #[test]
    fn arguments_are_measured_in_bytes() {
        let n = 1234;
        assert_eq!(expansion_len(format_args!("n={n}")), Ok(6));
        assert_eq!(expansion_len(format_args!("{}", "héllo")), Ok(6));
    }

    #[test]
    fn format_writes_text_and_terminator() {
        let mut tail = [0xAA_u8; 8];
        let written = format_terminated(&mut tail, format_args!("{}-{}", 1, 2)).unwrap();
        assert_eq!(written, 3);
        assert_eq!(&tail[..4], b"1-2\0");
        assert_eq!(tail[4], 0xAA);
    }

    #[test]
    fn overflow_truncates_on_char_boundary_and_terminates() {
        let mut tail = [0xAA_u8; 4];
        let result = format_terminated(&mut tail, format_args!("{}", "aé€"));
        assert!(result.is_err());
        // "a" (1) + "é" (2) fits in 3 bytes of text room; "€" does not.
        assert_eq!(&tail, b"a\xc3\xa9\0");
    }

    #[test]
    fn empty_tail_cannot_hold_terminator() {
        let mut tail: [u8; 0] = [];
        assert!(format_terminated(&mut tail, format_args!("")).is_err());
    }

    #[test]
    fn display_that_grows_between_passes_is_truncated() {
        struct Growing(Cell<usize>);
        impl std::fmt::Display for Growing {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                let n = self.0.get();
                self.0.set(n + 4);
                f.write_str(&"z".repeat(n))
            }
        }

        let value = Growing(Cell::new(2));
        let measured = expansion_len(format_args!("{value}")).unwrap();
        assert_eq!(measured, 2);
        let mut tail = vec![0xAA_u8; measured + 1];
        assert!(format_terminated(&mut tail, format_args!("{value}")).is_err());
        assert_eq!(tail, b"zz\0");
    }

    #[test]
    fn strlen_stops_at_first_null() {
        assert_eq!(strlen(b"ab\0cd\0"), 2);
        assert_eq!(strlen(b"\0"), 0);
        assert_eq!(strlen(b"abc"), 3);
    }
}
