// src/common/frame.rs

use super::timing::FRAME_BUFFER_CAPACITY;
use alloc::string::String;
use alloc::vec::Vec;
use log::{trace, warn};

/// Reassembles a fragmented byte stream into newline-delimited text lines.
///
/// Bytes are appended with [`FrameReader::feed`]; complete lines are drained lazily
/// through the returned [`Lines`] iterator. Anything after the last `\n` stays
/// buffered for the next call. Dropping the iterator early leaves the remaining
/// complete lines buffered as well, so [`FrameReader::lines`] picks up where it stopped.
///
/// A partial line is never allowed to grow past the configured capacity. When it
/// does, the partial bytes are dropped and everything up to the next `\n` is
/// discarded so the following line starts clean.
#[derive(Debug, Clone)]
pub struct FrameReader {
    buffer: Vec<u8>,
    capacity: usize,
    // Set while skipping the tail of an oversized line.
    resync: bool,
}

impl FrameReader {
    pub fn new() -> Self {
        Self::with_capacity(FRAME_BUFFER_CAPACITY)
    }

    /// Creates a reader whose pending partial line may hold at most `capacity` bytes.
    pub fn with_capacity(capacity: usize) -> Self {
        FrameReader {
            buffer: Vec::with_capacity(capacity.min(256)),
            capacity,
            resync: false,
        }
    }

    /// Appends `bytes` and returns the complete lines now available, in arrival order.
    pub fn feed(&mut self, bytes: &[u8]) -> Lines<'_> {
        self.push_bytes(bytes);
        self.lines()
    }

    /// Returns the complete lines still buffered, without adding input.
    pub fn lines(&mut self) -> Lines<'_> {
        Lines { reader: self }
    }

    /// Discards all buffered data. Called whenever the connection is reopened so bytes
    /// from two connection epochs never end up in the same line.
    pub fn reset(&mut self) {
        self.buffer.clear();
        self.resync = false;
    }

    /// Number of bytes currently buffered (complete lines plus the partial tail).
    pub fn pending_len(&self) -> usize {
        self.buffer.len()
    }

    fn push_bytes(&mut self, mut bytes: &[u8]) {
        if self.resync {
            match bytes.iter().position(|b| *b == b'\n') {
                Some(idx) => {
                    bytes = &bytes[idx + 1..];
                    self.resync = false;
                    trace!("Frame reader resynchronised");
                }
                None => return,
            }
        }
        self.buffer.extend_from_slice(bytes);

        let tail_start = self
            .buffer
            .iter()
            .rposition(|b| *b == b'\n')
            .map_or(0, |idx| idx + 1);
        let tail_len = self.buffer.len() - tail_start;
        if tail_len > self.capacity {
            warn!(
                "Dropping {} buffered bytes without newline (capacity {})",
                tail_len, self.capacity
            );
            self.buffer.truncate(tail_start);
            self.resync = true;
        }
    }

    fn next_line(&mut self) -> Option<String> {
        loop {
            let idx = self.buffer.iter().position(|b| *b == b'\n')?;
            let line = decode_line(&self.buffer[..idx]);
            self.buffer.drain(..=idx);
            if !line.is_empty() {
                return Some(line);
            }
        }
    }
}

impl Default for FrameReader {
    fn default() -> Self {
        Self::new()
    }
}

/// Lazy sequence of complete lines drained from a [`FrameReader`].
#[derive(Debug)]
pub struct Lines<'a> {
    reader: &'a mut FrameReader,
}

impl Iterator for Lines<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        self.reader.next_line()
    }
}

/// Decodes one raw segment, dropping invalid UTF-8 sequences, then trims it.
fn decode_line(raw: &[u8]) -> String {
    let mut text = String::with_capacity(raw.len());
    for chunk in raw.utf8_chunks() {
        text.push_str(chunk.valid());
    }
    let trimmed = text.trim();
    if trimmed.len() == text.len() {
        text
    } else {
        String::from(trimmed)
    }
}
