//! Content-encoding capabilities exposed to the host server

use crate::error::Result;
use std::fmt;
use std::io::Write;

/// Destination for compressed bytes (usually the response body writer)
pub type Sink = Box<dyn Write + Send>;

/// A content encoding the host can negotiate and instantiate.
///
/// Implementations are immutable once loaded and shared across every
/// in-flight response, so `new_encoder` takes `&self`.
pub trait Encoding: Send + Sync + fmt::Debug {
    /// Token used in `Accept-Encoding` / `Content-Encoding` headers
    fn accept_encoding(&self) -> &'static str;

    /// Build a fresh stream encoder writing into `sink`
    fn new_encoder(&self, sink: Sink) -> Box<dyn Encoder>;
}

/// Streaming encoder for one response body.
///
/// Owned by a single response; callers write any number of chunks and then
/// call [`Encoder::close`] exactly once.
pub trait Encoder: Send + fmt::Debug {
    /// Feed uncompressed bytes, returning how many were consumed
    fn write(&mut self, data: &[u8]) -> Result<usize>;

    /// Flush pending output and write the stream trailer
    fn close(&mut self) -> Result<()>;

    /// Rebind to a new sink with a fresh compressor and the same options.
    ///
    /// The previous stream must already be closed; an unclosed stream is
    /// finalised into its old sink before being discarded.
    fn reset(&mut self, sink: Sink);

    /// Write an entire buffer
    fn write_all(&mut self, mut data: &[u8]) -> Result<()> {
        while !data.is_empty() {
            let n = self.write(data)?;
            if n == 0 {
                return Err(std::io::Error::from(std::io::ErrorKind::WriteZero).into());
            }
            data = &data[n..];
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[derive(Debug, Default)]
    struct Chunked {
        seen: Vec<u8>,
        limit: usize,
    }

    impl Encoder for Chunked {
        fn write(&mut self, data: &[u8]) -> Result<usize> {
            let n = data.len().min(self.limit);
            self.seen.extend_from_slice(&data[..n]);
            Ok(n)
        }

        fn close(&mut self) -> Result<()> {
            Ok(())
        }

        fn reset(&mut self, _sink: Sink) {
            self.seen.clear();
        }
    }

    #[test]
    fn test_write_all_loops_over_short_writes() {
        let mut enc = Chunked {
            limit: 2,
            ..Default::default()
        };
        enc.write_all(b"hello world").unwrap();
        assert_eq!(enc.seen, b"hello world");
    }

    #[test]
    fn test_write_all_zero_write() {
        let mut enc = Chunked::default();
        let err = enc.write_all(b"x").unwrap_err();
        assert!(matches!(err, Error::Io(e) if e.kind() == std::io::ErrorKind::WriteZero));
    }
}
