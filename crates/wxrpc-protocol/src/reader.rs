//! Bounded line framing over a buffered byte stream.

use std::io::{self, BufRead};

use crate::error::CodecError;

/// Reads newline-terminated lines while enforcing a maximum length.
///
/// A line longer than the limit is consumed up to and including its
/// terminator without being buffered, then reported as
/// [`CodecError::OversizedMessage`]. The stream therefore stays aligned on
/// line boundaries and the caller may keep reading.
#[derive(Debug)]
pub struct LineReader<R> {
    inner: R,
    limit: usize,
    buffer: Vec<u8>,
}

impl<R: BufRead> LineReader<R> {
    /// Wraps a buffered reader with the given line limit in bytes.
    pub const fn new(inner: R, limit: usize) -> Self {
        Self {
            inner,
            limit,
            buffer: Vec::new(),
        }
    }

    /// Reads the next line, terminator included.
    ///
    /// Returns `Ok(None)` on a clean end of stream. A final line without a
    /// terminator is returned as-is.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::OversizedMessage`] when the line exceeds the
    /// limit, or [`CodecError::Io`] when the underlying read fails.
    pub fn read_line(&mut self) -> Result<Option<Vec<u8>>, CodecError> {
        self.buffer.clear();
        let mut discarding = false;
        loop {
            let available = match self.inner.fill_buf() {
                Ok(available) => available,
                Err(error) if error.kind() == io::ErrorKind::Interrupted => continue,
                Err(error) => return Err(CodecError::Io(error)),
            };

            if available.is_empty() {
                if discarding {
                    return Err(CodecError::oversized(self.limit));
                }
                if self.buffer.is_empty() {
                    return Ok(None);
                }
                return Ok(Some(std::mem::take(&mut self.buffer)));
            }

            let newline = available.iter().position(|byte| *byte == b'\n');
            let take = newline.map_or(available.len(), |pos| pos + 1);

            if !discarding {
                if self.buffer.len() + take > self.limit {
                    discarding = true;
                    self.buffer = Vec::new();
                } else {
                    self.buffer.extend_from_slice(available.split_at(take).0);
                }
            }
            self.inner.consume(take);

            if newline.is_some() {
                if discarding {
                    return Err(CodecError::oversized(self.limit));
                }
                return Ok(Some(std::mem::take(&mut self.buffer)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    fn reader(input: &str, limit: usize) -> LineReader<Cursor<Vec<u8>>> {
        LineReader::new(Cursor::new(input.as_bytes().to_vec()), limit)
    }

    #[test]
    fn yields_lines_then_end_of_stream() {
        let mut lines = reader("one\ntwo\n", 64);
        assert_eq!(lines.read_line().expect("first"), Some(b"one\n".to_vec()));
        assert_eq!(lines.read_line().expect("second"), Some(b"two\n".to_vec()));
        assert_eq!(lines.read_line().expect("eof"), None);
    }

    #[test]
    fn returns_unterminated_tail() {
        let mut lines = reader("tail", 64);
        assert_eq!(lines.read_line().expect("tail"), Some(b"tail".to_vec()));
        assert_eq!(lines.read_line().expect("eof"), None);
    }

    #[test]
    fn oversized_line_is_skipped_and_stream_stays_aligned() {
        let long = "x".repeat(100);
        let mut lines = reader(&format!("{long}\nok\n"), 16);
        let error = lines.read_line().expect_err("line exceeds limit");
        assert!(matches!(error, CodecError::OversizedMessage { limit: 16 }));
        assert_eq!(lines.read_line().expect("next"), Some(b"ok\n".to_vec()));
    }

    #[test]
    fn line_exactly_at_limit_is_accepted() {
        let mut lines = reader("abc\n", 4);
        assert_eq!(lines.read_line().expect("fits"), Some(b"abc\n".to_vec()));
    }

    #[test]
    fn oversized_tail_without_terminator_reports_limit() {
        let mut lines = reader(&"y".repeat(40), 8);
        assert!(matches!(
            lines.read_line(),
            Err(CodecError::OversizedMessage { limit: 8 })
        ));
        assert_eq!(lines.read_line().expect("eof"), None);
    }

    #[test]
    fn small_internal_buffers_still_frame_lines() {
        let input = Cursor::new(b"alpha\nbeta\n".to_vec());
        let mut lines = LineReader::new(std::io::BufReader::with_capacity(2, input), 64);
        assert_eq!(lines.read_line().expect("alpha"), Some(b"alpha\n".to_vec()));
        assert_eq!(lines.read_line().expect("beta"), Some(b"beta\n".to_vec()));
    }
}
