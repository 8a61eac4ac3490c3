//! Fixed-size chunk reader over a finite byte source.

use std::io::{self, Read};

/// Reads a byte source in chunks of a fixed size.
///
/// Every chunk except the last is exactly `chunk_size` bytes; the last one
/// holds whatever remains. Short reads from the underlying source are retried
/// so chunk boundaries do not depend on how the OS delivers data.
pub struct ChunkReader<R> {
    reader: R,
    buffer: Vec<u8>,
    finished: bool,
    bytes_read: u64,
    chunks_read: u64,
}

impl<R: Read> ChunkReader<R> {
    pub fn new(reader: R, chunk_size: usize) -> Self {
        Self {
            reader,
            buffer: vec![0u8; chunk_size.max(1)],
            finished: false,
            bytes_read: 0,
            chunks_read: 0,
        }
    }

    /// Next chunk, or `None` at end of stream.
    pub fn next_chunk(&mut self) -> io::Result<Option<&[u8]>> {
        if self.finished {
            return Ok(None);
        }

        let mut filled = 0;
        while filled < self.buffer.len() {
            match self.reader.read(&mut self.buffer[filled..]) {
                Ok(0) => {
                    self.finished = true;
                    break;
                }
                Ok(n) => filled += n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        if filled == 0 {
            return Ok(None);
        }

        self.bytes_read += filled as u64;
        self.chunks_read += 1;
        Ok(Some(&self.buffer[..filled]))
    }

    /// Total bytes handed out so far.
    pub fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    /// Number of chunks handed out so far.
    pub fn chunks_read(&self) -> u64 {
        self.chunks_read
    }
}
