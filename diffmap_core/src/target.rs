use diffmap_common::{ComparisonTarget, FileIdentity, TargetKind};
use std::fs::{self, Metadata};
use std::path::Path;

/// Stat a path (following symlinks) and classify it.
///
/// Never fails: a path that cannot be stat'ed resolves to `TargetKind::Missing`
/// and the caller decides whether that is fatal.
pub fn resolve_target(path: &Path) -> ComparisonTarget {
    match fs::metadata(path) {
        Ok(meta) => {
            let kind = if meta.is_file() {
                TargetKind::RegularFile
            } else if meta.is_dir() {
                TargetKind::Directory
            } else {
                TargetKind::Other
            };

            ComparisonTarget {
                path: path.to_path_buf(),
                kind,
                size: meta.len(),
                identity: identity(&meta),
            }
        }
        Err(err) => ComparisonTarget {
            path: path.to_path_buf(),
            kind: TargetKind::Missing(err.kind()),
            size: 0,
            identity: None,
        },
    }
}

#[cfg(unix)]
fn identity(meta: &Metadata) -> Option<FileIdentity> {
    use std::os::unix::fs::MetadataExt;

    Some(FileIdentity {
        device: meta.dev(),
        inode: meta.ino(),
    })
}

#[cfg(not(unix))]
fn identity(_meta: &Metadata) -> Option<FileIdentity> {
    None
}
