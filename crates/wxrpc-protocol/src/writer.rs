//! Framed envelope writer.

use std::io::Write;

use serde::Serialize;

use crate::codec::encode;
use crate::error::CodecError;

/// Writes envelopes as JSONL, one complete line per call.
///
/// The whole line is encoded before anything reaches the stream, so a
/// serialisation failure never leaves a partial line behind.
#[derive(Debug)]
pub struct EnvelopeWriter<W> {
    writer: W,
}

impl<W: Write> EnvelopeWriter<W> {
    /// Wraps an output stream.
    pub const fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Encodes, writes and flushes one envelope.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Serialize`] if encoding fails, or
    /// [`CodecError::Io`] if writing or flushing fails.
    pub fn write_envelope<T: Serialize>(&mut self, envelope: &T) -> Result<(), CodecError> {
        let line = encode(envelope)?;
        self.writer.write_all(&line)?;
        self.writer.flush()?;
        Ok(())
    }
}
