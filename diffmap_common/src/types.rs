use serde::{Deserialize, Serialize};
use std::fmt;
use std::io;
use std::iter::Sum;
use std::ops::{Add, AddAssign};
use std::path::PathBuf;

/// What a path turned out to be when it was resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetKind {
    RegularFile,
    Directory,
    /// The path could not be resolved; carries the reason
    Missing(io::ErrorKind),
    /// Symlink loops, sockets, devices and the like
    Other,
}

impl fmt::Display for TargetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetKind::RegularFile => f.write_str("regular file"),
            TargetKind::Directory => f.write_str("directory"),
            TargetKind::Missing(kind) => write!(f, "missing: {kind}"),
            TargetKind::Other => f.write_str("special file"),
        }
    }
}

/// Device and inode pair identifying a filesystem object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FileIdentity {
    pub device: u64,
    pub inode: u64,
}

/// A path together with its resolved kind, size and identity
#[derive(Debug, Clone)]
pub struct ComparisonTarget {
    pub path: PathBuf,
    pub kind: TargetKind,
    pub size: u64,
    pub identity: Option<FileIdentity>,
}

impl ComparisonTarget {
    pub fn is_missing(&self) -> bool {
        matches!(self.kind, TargetKind::Missing(_))
    }

    /// True when both targets are known to be the same filesystem object
    pub fn same_object(&self, other: &ComparisonTarget) -> bool {
        match (self.identity, other.identity) {
            (Some(a), Some(b)) => a == b,
            _ => false,
        }
    }
}

/// Classification of one block-compare step
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockOutcome {
    /// Both sides read the same bytes
    Identical,
    /// Both sides read data but it differs
    Differing,
    /// Left ran out while the right still had data
    LeftExhausted,
    /// Right ran out while the left still had data
    RightExhausted,
}

impl BlockOutcome {
    /// The character drawn in the map for this outcome
    pub fn glyph(self) -> u8 {
        match self {
            BlockOutcome::Identical => b'.',
            BlockOutcome::Differing => b'X',
            BlockOutcome::LeftExhausted => b'/',
            BlockOutcome::RightExhausted => b'\\',
        }
    }
}

/// Block tally for a file pair, or the sum over a directory pair
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub block_count: u64,
    pub identical_block_count: u64,
}

impl ComparisonResult {
    /// A result carrying a fixed dissimilarity and no identical blocks
    pub fn penalty(dissimilarity: u64) -> Self {
        Self {
            block_count: dissimilarity,
            identical_block_count: 0,
        }
    }

    pub fn record(&mut self, outcome: BlockOutcome) {
        self.block_count += 1;
        if outcome == BlockOutcome::Identical {
            self.identical_block_count += 1;
        }
    }

    pub fn dissimilarity(&self) -> u64 {
        self.block_count - self.identical_block_count
    }

    pub fn is_identical(&self) -> bool {
        self.dissimilarity() == 0
    }
}

impl Add for ComparisonResult {
    type Output = ComparisonResult;

    fn add(self, rhs: Self) -> Self::Output {
        ComparisonResult {
            block_count: self.block_count + rhs.block_count,
            identical_block_count: self.identical_block_count + rhs.identical_block_count,
        }
    }
}

impl AddAssign for ComparisonResult {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for ComparisonResult {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(ComparisonResult::default(), Add::add)
    }
}
