use crate::block::classify;
use diffmap_common::{BlockOutcome, DiffMapError, Result};
use std::fmt;
use std::io::{self, Read};

/// Which of the two sources an I/O failure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Left => f.write_str("left"),
            Side::Right => f.write_str("right"),
        }
    }
}

#[derive(Debug)]
pub struct SideError {
    pub side: Side,
    pub source: io::Error,
}

/// The bytes both sides produced for one step
#[derive(Debug, Clone, Copy)]
pub struct BlockStep<'a> {
    pub left: &'a [u8],
    pub right: &'a [u8],
}

impl BlockStep<'_> {
    pub fn outcome(&self) -> BlockOutcome {
        classify(self.left, self.right)
    }
}

struct Source<T> {
    reader: T,
    buf: Vec<u8>,
    filled: usize,
    exhausted: bool,
}

impl<T: Read> Source<T> {
    fn new(reader: T, block_size: usize) -> Result<Self> {
        Ok(Self {
            reader,
            buf: allocate_block(block_size)?,
            filled: 0,
            exhausted: false,
        })
    }

    fn advance(&mut self) -> io::Result<()> {
        if self.exhausted {
            self.filled = 0;
            return Ok(());
        }

        self.filled = fill_block(&mut self.reader, &mut self.buf)?;
        if self.filled < self.buf.len() {
            self.exhausted = true;
        }
        Ok(())
    }

    fn data(&self) -> &[u8] {
        &self.buf[..self.filled]
    }
}

/// Reads two streams in lockstep, one block per step.
///
/// Stepping continues while either side still has data, so streams of
/// different lengths are walked to the end of the longer one. A step in which
/// neither side produced a byte ends the sequence instead of being reported.
pub struct BlockReaderPair<L, R> {
    left: Source<L>,
    right: Source<R>,
}

impl<L: Read, R: Read> BlockReaderPair<L, R> {
    pub fn new(left: L, right: R, block_size: usize) -> Result<Self> {
        if block_size == 0 {
            return Err(DiffMapError::Config(
                "block size must be at least one byte".to_string(),
            ));
        }

        Ok(Self {
            left: Source::new(left, block_size)?,
            right: Source::new(right, block_size)?,
        })
    }

    /// Advance both sides by one block. `Ok(None)` once both are exhausted.
    pub fn next_step(&mut self) -> std::result::Result<Option<BlockStep<'_>>, SideError> {
        if self.left.exhausted && self.right.exhausted {
            return Ok(None);
        }

        self.left.advance().map_err(|source| SideError {
            side: Side::Left,
            source,
        })?;
        self.right.advance().map_err(|source| SideError {
            side: Side::Right,
            source,
        })?;

        if self.left.filled == 0 && self.right.filled == 0 {
            self.left.exhausted = true;
            self.right.exhausted = true;
            return Ok(None);
        }

        Ok(Some(BlockStep {
            left: self.left.data(),
            right: self.right.data(),
        }))
    }
}

fn allocate_block(block_size: usize) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(block_size)
        .map_err(|_| DiffMapError::Allocation { bytes: block_size })?;
    buf.resize(block_size, 0);
    Ok(buf)
}

/// Read until `buf` is full or the stream ends; returns the byte count
fn fill_block<T: Read>(reader: &mut T, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
