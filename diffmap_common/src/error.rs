use crate::TargetKind;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Fatal conditions. Any of these aborts the whole run.
#[derive(Error, Debug)]
pub enum DiffMapError {
    #[error("{}: {kind}", .path.display())]
    Unresolved { path: PathBuf, kind: io::ErrorKind },

    #[error("{}: {source}", .path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: read failed: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{}: cannot list directory: {source}", .path.display())]
    ReadDir {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error(
        "cannot compare {} ({left_kind}) with {} ({right_kind})",
        .left.display(),
        .right.display()
    )]
    KindMismatch {
        left: PathBuf,
        right: PathBuf,
        left_kind: TargetKind,
        right_kind: TargetKind,
    },

    #[error("{}: not a regular file or directory", .path.display())]
    Unsupported { path: PathBuf },

    #[error("Cannot allocate memory for a {bytes}-byte block")]
    Allocation { bytes: usize },

    #[error("Output error: {0}")]
    Output(#[source] io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, DiffMapError>;
