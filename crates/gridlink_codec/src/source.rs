//! Byte sources for decoding.
//!
//! The decoder pulls exactly the bytes each type prescribes through the
//! [`ByteSource`] trait. [`SliceSource`] reads from one contiguous buffer;
//! [`ChunkSource`] is fed data chunk-by-chunk, so a single primitive may
//! straddle chunk boundaries. A read that cannot be completed is a
//! [`TruncatedInput`](crate::CodecError::TruncatedInput) failure, never a
//! zero-fill.

use crate::error::{CodecError, CodecResult};
use bytes::Bytes;
use std::collections::VecDeque;

/// A source of bytes that can satisfy exact-length reads.
pub trait ByteSource {
    /// Fills `buf` completely or fails with `TruncatedInput`.
    fn read_exact(&mut self, buf: &mut [u8]) -> CodecResult<()>;
}

/// A byte source over a contiguous slice.
#[derive(Debug)]
pub struct SliceSource<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> SliceSource<'a> {
    /// Creates a source over `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    /// Returns true if all bytes have been consumed.
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }
}

impl ByteSource for SliceSource<'_> {
    fn read_exact(&mut self, buf: &mut [u8]) -> CodecResult<()> {
        if buf.len() > self.remaining() {
            return Err(CodecError::TruncatedInput {
                needed: buf.len(),
                available: self.remaining(),
            });
        }
        buf.copy_from_slice(&self.data[self.pos..self.pos + buf.len()]);
        self.pos += buf.len();
        Ok(())
    }
}

/// A byte source fed incrementally in chunks.
///
/// Chunks are consumed front to back. A read larger than the buffered total
/// fails without consuming anything, so the caller may push more chunks and
/// retry.
#[derive(Debug, Default)]
pub struct ChunkSource {
    chunks: VecDeque<Bytes>,
    buffered: usize,
}

impl ChunkSource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a chunk of incoming bytes.
    pub fn push(&mut self, chunk: impl Into<Bytes>) {
        let chunk = chunk.into();
        self.buffered += chunk.len();
        if !chunk.is_empty() {
            self.chunks.push_back(chunk);
        }
    }

    /// Total number of buffered, unread bytes.
    pub fn buffered(&self) -> usize {
        self.buffered
    }
}

impl ByteSource for ChunkSource {
    fn read_exact(&mut self, buf: &mut [u8]) -> CodecResult<()> {
        if buf.len() > self.buffered {
            return Err(CodecError::TruncatedInput {
                needed: buf.len(),
                available: self.buffered,
            });
        }
        let mut filled = 0;
        while filled < buf.len() {
            let chunk = self
                .chunks
                .front_mut()
                .expect("buffered count out of sync with chunks");
            let take = (buf.len() - filled).min(chunk.len());
            buf[filled..filled + take].copy_from_slice(&chunk[..take]);
            filled += take;
            if take == chunk.len() {
                self.chunks.pop_front();
            } else {
                let _ = chunk.split_to(take);
            }
        }
        self.buffered -= buf.len();
        Ok(())
    }
}
