//! Stream framing: raw byte chunks in, complete protocol lines out.
//!
//! [`LineFramer`] owns the unbounded receive buffer of a session. Bytes are
//! appended with [`LineFramer::push`] and complete lines are pulled with
//! [`LineFramer::next_line`] until it returns `Ok(None)`, at which point any
//! trailing partial line stays buffered for the next chunk.
//!
//! Lines end at `\r\n`, but servers that emit a bare `\n` are tolerated.
//! Lines are always cut at the earliest terminator in the buffer, so a chunk
//! mixing both conventions keeps its order and the output never depends on
//! where the stream was split into chunks.

use bytes::{Bytes, BytesMut};

use crate::error::{Result, SessionError};

/// Default limit on a single line, terminator excluded.
pub const MAX_IRC_LINE_LEN: usize = 8191;

/// Incremental line splitter.
#[derive(Debug)]
pub struct LineFramer {
    buffer: BytesMut,
    max_line_len: usize,
    /// Set after an overflow: bytes are dropped up to the next terminator.
    discarding: bool,
}

impl Default for LineFramer {
    fn default() -> Self {
        Self::new()
    }
}

impl LineFramer {
    /// Create a framer with the default line limit.
    pub fn new() -> Self {
        Self::with_max_line_len(MAX_IRC_LINE_LEN)
    }

    /// Create a framer with a custom line limit.
    pub fn with_max_line_len(max_line_len: usize) -> Self {
        Self {
            buffer: BytesMut::with_capacity(max_line_len.min(65536)),
            max_line_len,
            discarding: false,
        }
    }

    /// Append a chunk of received bytes.
    pub fn push(&mut self, chunk: &[u8]) {
        self.buffer.extend_from_slice(chunk);
    }

    /// Number of bytes buffered that do not yet form a complete line.
    pub fn buffered(&self) -> usize {
        self.buffer.len()
    }

    /// Drop everything buffered, e.g. when the connection is replaced.
    pub fn clear(&mut self) {
        self.buffer.clear();
        self.discarding = false;
    }

    /// Extract the next complete, non-empty line with surrounding whitespace
    /// removed.
    ///
    /// Returns `Ok(None)` once no complete line is buffered. A line longer
    /// than the limit is reported once as [`SessionError::LineTooLong`] and
    /// skipped; framing resumes after its terminator.
    pub fn next_line(&mut self) -> Result<Option<Bytes>> {
        loop {
            let Some(end) = self.buffer.iter().position(|&b| b == b'\n') else {
                return self.check_partial();
            };

            let raw = self.buffer.split_to(end + 1).freeze();
            if self.discarding {
                self.discarding = false;
                continue;
            }

            // Length of the line body, a CR before the LF included.
            let body_len = end;
            if body_len > self.max_line_len {
                return Err(SessionError::LineTooLong {
                    actual: body_len,
                    limit: self.max_line_len,
                });
            }

            let (start, stop) = trim_range(&raw[..end]);
            if start == stop {
                continue;
            }
            return Ok(Some(raw.slice(start..stop)));
        }
    }

    fn check_partial(&mut self) -> Result<Option<Bytes>> {
        if self.discarding {
            self.buffer.clear();
            return Ok(None);
        }
        if self.buffer.len() > self.max_line_len {
            let actual = self.buffer.len();
            self.buffer.clear();
            self.discarding = true;
            return Err(SessionError::LineTooLong {
                actual,
                limit: self.max_line_len,
            });
        }
        Ok(None)
    }
}

fn trim_range(line: &[u8]) -> (usize, usize) {
    let start = line
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(line.len());
    let stop = line
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    (start, stop)
}

#[cfg(feature = "tokio")]
impl tokio_util::codec::Decoder for LineFramer {
    type Item = Bytes;
    type Error = SessionError;

    fn decode(&mut self, src: &mut BytesMut) -> Result<Option<Bytes>> {
        if !src.is_empty() {
            let chunk = src.split();
            self.push(&chunk);
        }
        self.next_line()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(framer: &mut LineFramer) -> Vec<String> {
        let mut out = Vec::new();
        while let Some(line) = framer.next_line().unwrap() {
            out.push(String::from_utf8(line.to_vec()).unwrap());
        }
        out
    }

    #[test]
    fn test_crlf_lines() {
        let mut framer = LineFramer::new();
        framer.push(b"PING :a\r\nPING :b\r\n");
        assert_eq!(drain(&mut framer), ["PING :a", "PING :b"]);
        assert_eq!(framer.buffered(), 0);
    }

    #[test]
    fn test_partial_line_is_retained() {
        let mut framer = LineFramer::new();
        framer.push(b"PING :a\r\nPI");
        assert_eq!(drain(&mut framer), ["PING :a"]);
        assert_eq!(framer.buffered(), 2);

        framer.push(b"NG :b\r");
        assert!(drain(&mut framer).is_empty());
        framer.push(b"\n");
        assert_eq!(drain(&mut framer), ["PING :b"]);
    }

    #[test]
    fn test_bare_lf_fallback() {
        let mut framer = LineFramer::new();
        framer.push(b"one\ntwo\n");
        assert_eq!(drain(&mut framer), ["one", "two"]);
    }

    #[test]
    fn test_mixed_terminators_keep_order() {
        let mut framer = LineFramer::new();
        framer.push(b"first\nsecond\r\nthird\n");
        assert_eq!(drain(&mut framer), ["first", "second", "third"]);
    }

    #[test]
    fn test_empty_and_blank_lines_discarded() {
        let mut framer = LineFramer::new();
        framer.push(b"\r\n   \r\n\n  x  \r\n");
        assert_eq!(drain(&mut framer), ["x"]);
    }

    #[test]
    fn test_overflow_reports_and_resyncs() {
        let mut framer = LineFramer::with_max_line_len(8);
        framer.push(b"0123456789");
        assert!(matches!(
            framer.next_line(),
            Err(SessionError::LineTooLong { actual: 10, limit: 8 })
        ));
        framer.push(b"more garbage\r\nok\r\n");
        assert_eq!(drain(&mut framer), ["ok"]);
    }

    #[test]
    fn test_overlong_complete_line() {
        let mut framer = LineFramer::with_max_line_len(4);
        framer.push(b"toolong\r\nok\r\n");
        assert!(framer.next_line().is_err());
        assert_eq!(drain(&mut framer), ["ok"]);
    }

    #[cfg(feature = "tokio")]
    #[test]
    fn test_decoder_impl() {
        use tokio_util::codec::Decoder;

        let mut framer = LineFramer::new();
        let mut src = BytesMut::from(&b"NICK a\r\nNICK"[..]);
        let line = framer.decode(&mut src).unwrap().unwrap();
        assert_eq!(&line[..], b"NICK a");
        assert!(src.is_empty());
        assert!(framer.decode(&mut src).unwrap().is_none());

        let mut src = BytesMut::from(&b" b\r\n"[..]);
        let line = framer.decode(&mut src).unwrap().unwrap();
        assert_eq!(&line[..], b"NICK b");
    }
}
