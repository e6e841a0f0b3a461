//! Brotli stream encoder
//!
//! One [`BrotliEncoder`] wraps one response body. A new compressor is built
//! for every stream (on construction and on [`BrotliEncoder::reset`]) from
//! the same [`EncoderOptions`].

use crate::algorithm::Algorithm;
use brotli::enc::BrotliEncoderParams;
use brotli::CompressorWriter;
use siphon_core::{Encoder, Error, Result, Sink};
use std::fmt;
use std::io::{self, Write};

/// Internal buffer size handed to the compressor
pub const BUFFER_SIZE: usize = 4096;

/// Window (log2) used by the standard encoder
pub const STANDARD_WINDOW: u32 = 22;

/// Window (log2) used by the v2 encoder
pub const V2_WINDOW: i32 = 20;

/// Per-stream compressor options, fixed at configuration time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncoderOptions {
    /// Brotli quality
    pub quality: u32,
    /// Encoder algorithm
    pub algorithm: Algorithm,
}

fn compressor<W: Write>(sink: W, options: &EncoderOptions) -> CompressorWriter<W> {
    match options.algorithm {
        Algorithm::Standard => {
            CompressorWriter::new(sink, BUFFER_SIZE, options.quality, STANDARD_WINDOW)
        }
        Algorithm::V2 => {
            let params = BrotliEncoderParams {
                quality: options.quality as i32,
                lgwin: V2_WINDOW,
                favor_cpu_efficiency: true,
                ..Default::default()
            };
            CompressorWriter::with_params(sink, BUFFER_SIZE, &params)
        }
    }
}

/// Sink adapter that counts output and keeps the first sink error.
///
/// The compressor only reports error kinds back, so the sink's own error is
/// recovered from here. Interrupted writes are retried in place.
struct TrackingSink<W> {
    inner: W,
    written: u64,
    error: Option<io::Error>,
}

impl<W> TrackingSink<W> {
    fn new(inner: W) -> Self {
        Self {
            inner,
            written: 0,
            error: None,
        }
    }

    fn trap(&mut self, e: io::Error) -> io::Error {
        let kind = e.kind();
        self.error.get_or_insert(e);
        io::Error::from(kind)
    }
}

impl<W: Write> Write for TrackingSink<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        loop {
            match self.inner.write(buf) {
                Ok(n) => {
                    self.written += n as u64;
                    return Ok(n);
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(self.trap(e)),
            }
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => return Err(self.trap(e)),
            }
        }
    }
}

enum State<W: Write> {
    Open(CompressorWriter<TrackingSink<W>>),
    Closed(W),
    /// A write failed; compressed output already lost, stream abandoned
    Failed,
    Detached,
}

impl<W: Write> State<W> {
    fn unusable(&self) -> Error {
        match self {
            State::Failed => Error::StreamAborted,
            _ => Error::EncoderClosed,
        }
    }
}

/// Streaming brotli encoder
pub struct BrotliEncoder<W: Write = Sink> {
    state: State<W>,
    options: EncoderOptions,
    bytes_in: u64,
}

impl<W: Write> fmt::Debug for BrotliEncoder<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state {
            State::Open(_) => "open",
            State::Closed(_) => "closed",
            State::Failed => "failed",
            State::Detached => "detached",
        };
        f.debug_struct("BrotliEncoder")
            .field("options", &self.options)
            .field("state", &state)
            .field("bytes_in", &self.bytes_in)
            .finish()
    }
}

impl<W: Write> BrotliEncoder<W> {
    /// Build an encoder writing into `sink`
    pub fn new(sink: W, options: EncoderOptions) -> Self {
        tracing::trace!(
            quality = options.quality,
            algorithm = %options.algorithm,
            "Creating brotli encoder"
        );
        Self {
            state: State::Open(compressor(TrackingSink::new(sink), &options)),
            options,
            bytes_in: 0,
        }
    }

    /// Options used for every stream
    pub fn options(&self) -> EncoderOptions {
        self.options
    }

    /// Uncompressed bytes accepted by the current stream
    pub fn bytes_in(&self) -> u64 {
        self.bytes_in
    }

    /// Whether the current stream no longer accepts data (closed or aborted)
    pub fn is_closed(&self) -> bool {
        !matches!(self.state, State::Open(_))
    }

    /// Compress a chunk of data.
    ///
    /// Sink failures surface as [`Error::Io`] carrying the sink's own error;
    /// anything else from the compressor is [`Error::Compression`]. Either
    /// one abandons the stream: later writes and [`BrotliEncoder::close`]
    /// fail with [`Error::StreamAborted`] until the next reset.
    pub fn write_chunk(&mut self, data: &[u8]) -> Result<usize> {
        let writer = match &mut self.state {
            State::Open(writer) => writer,
            other => return Err(other.unusable()),
        };

        match writer.write(data) {
            Ok(n) => {
                self.bytes_in += n as u64;
                Ok(n)
            }
            Err(e) => {
                let err = classify(writer.get_mut().error.take(), e);
                self.abort(&err);
                Err(err)
            }
        }
    }

    fn abort(&mut self, err: &Error) {
        tracing::debug!(
            error = %err,
            bytes_in = self.bytes_in,
            "Abandoning brotli stream"
        );
        self.state = State::Failed;
    }

    /// Write the stream trailer and flush the sink.
    ///
    /// Must be called exactly once per stream; a second call fails with
    /// [`Error::EncoderClosed`].
    pub fn close(&mut self) -> Result<()> {
        let writer = match std::mem::replace(&mut self.state, State::Detached) {
            State::Open(writer) => writer,
            other => {
                let err = other.unusable();
                self.state = other;
                return Err(err);
            }
        };

        let TrackingSink {
            mut inner,
            written,
            error,
        } = writer.into_inner();

        let flushed = match error {
            Some(e) => Err(e),
            None => inner.flush(),
        };
        self.state = State::Closed(inner);
        flushed?;

        tracing::debug!(
            bytes_in = self.bytes_in,
            bytes_out = written,
            algorithm = %self.options.algorithm,
            "Brotli stream closed"
        );
        Ok(())
    }

    /// Rebind to a new sink with a fresh compressor.
    ///
    /// The previous stream should be closed first. An unclosed stream is
    /// finalised into its old sink when dropped here.
    pub fn reset(&mut self, sink: W) {
        let fresh = State::Open(compressor(TrackingSink::new(sink), &self.options));
        if let State::Open(_) = std::mem::replace(&mut self.state, fresh) {
            tracing::trace!("Discarding unclosed brotli stream on reset");
        }
        self.bytes_in = 0;
    }

    /// Take back the sink of a closed stream
    pub fn into_inner(self) -> Option<W> {
        match self.state {
            State::Closed(sink) => Some(sink),
            _ => None,
        }
    }
}

fn classify(sink_error: Option<io::Error>, e: io::Error) -> Error {
    match sink_error {
        Some(sink_error) => Error::Io(sink_error),
        None => Error::Compression(e.to_string()),
    }
}

impl<W: Write> Write for BrotliEncoder<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_chunk(buf).map_err(Error::into_io)
    }

    fn flush(&mut self) -> io::Result<()> {
        let writer = match &mut self.state {
            State::Open(writer) => writer,
            other => return Err(other.unusable().into_io()),
        };
        match writer.flush() {
            Ok(()) => Ok(()),
            Err(e) => {
                let err = classify(writer.get_mut().error.take(), e);
                self.abort(&err);
                Err(err.into_io())
            }
        }
    }
}

impl Encoder for BrotliEncoder<Sink> {
    fn write(&mut self, data: &[u8]) -> Result<usize> {
        self.write_chunk(data)
    }

    fn close(&mut self) -> Result<()> {
        BrotliEncoder::close(self)
    }

    fn reset(&mut self, sink: Sink) {
        BrotliEncoder::reset(self, sink)
    }
}
