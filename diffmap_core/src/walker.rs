use crate::file_map::FileMapEngine;
use crate::target::resolve_target;
use diffmap_common::{ComparisonResult, ComparisonTarget, DiffMapError, MapConfig, Result, TargetKind};
use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tracing::{debug, warn};

/// Recursively compares two paths, drawing block maps for every file pair.
///
/// The left path is the reference: if it cannot be resolved the run fails,
/// whereas a missing right-hand counterpart is only a warning and is scored
/// with an estimate. Entries that exist only on the right are listed but
/// never scored.
pub struct TreeWalker<W: Write> {
    config: MapConfig,
    engine: FileMapEngine,
    out: W,
}

impl<W: Write> TreeWalker<W> {
    pub fn new(config: MapConfig, out: W) -> Result<Self> {
        config.validate()?;
        let engine = FileMapEngine::new(&config);
        Ok(Self {
            config,
            engine,
            out,
        })
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Compare `left` against `right`, returning the summed block tally
    pub fn compare(&mut self, left: &Path, right: &Path) -> Result<ComparisonResult> {
        let left_target = resolve_target(left);
        if let TargetKind::Missing(kind) = left_target.kind {
            return Err(DiffMapError::Unresolved {
                path: left.to_path_buf(),
                kind,
            });
        }

        let right_target = resolve_target(right);
        if right_target.is_missing() {
            let estimate = self.unmatched_estimate(&left_target);
            warn!("{}: {}", right_target.path.display(), right_target.kind);
            debug!("Scoring unmatched {:?} as {} blocks", left_target.path, estimate);
            return Ok(ComparisonResult::penalty(estimate));
        }

        if left_target.same_object(&right_target) {
            warn!(
                "{} and {} are the same file, skipping",
                left_target.path.display(),
                right_target.path.display()
            );
            return Ok(ComparisonResult::default());
        }

        match (left_target.kind, right_target.kind) {
            (TargetKind::RegularFile, TargetKind::RegularFile) => self.compare_file_pair(left, right),
            (TargetKind::Directory, TargetKind::Directory) => self.compare_dir_pair(left, right),
            (left_kind, right_kind) if left_kind != right_kind => Err(DiffMapError::KindMismatch {
                left: left.to_path_buf(),
                right: right.to_path_buf(),
                left_kind,
                right_kind,
            }),
            _ => Err(DiffMapError::Unsupported {
                path: left.to_path_buf(),
            }),
        }
    }

    fn compare_file_pair(&mut self, left: &Path, right: &Path) -> Result<ComparisonResult> {
        writeln!(self.out, "<<< {}", left.display()).map_err(DiffMapError::Output)?;
        writeln!(self.out, ">>> {}", right.display()).map_err(DiffMapError::Output)?;
        self.engine.compare_files(left, right, &mut self.out)
    }

    fn compare_dir_pair(&mut self, left: &Path, right: &Path) -> Result<ComparisonResult> {
        writeln!(self.out, "entering {}", left.display()).map_err(DiffMapError::Output)?;

        let left_names = self.list_dir(left).map_err(|source| DiffMapError::ReadDir {
            path: left.to_path_buf(),
            source,
        })?;

        let mut total = ComparisonResult::default();
        for name in &left_names {
            total += self.compare(&left.join(name), &right.join(name))?;
        }

        self.note_right_only(right, &left_names);

        writeln!(self.out, "leaving {}", left.display()).map_err(DiffMapError::Output)?;
        Ok(total)
    }

    /// Entry names of `dir`, without `.` and `..`
    fn list_dir(&self, dir: &Path) -> io::Result<Vec<OsString>> {
        let mut names = fs::read_dir(dir)?
            .map(|entry| entry.map(|e| e.file_name()))
            .collect::<io::Result<Vec<_>>>()?;
        if self.config.sort_entries {
            names.sort();
        }
        Ok(names)
    }

    // Right-only entries are reported at debug level and contribute nothing.
    fn note_right_only(&self, right: &Path, left_names: &[OsString]) {
        let right_names = match self.list_dir(right) {
            Ok(names) => names,
            Err(err) => {
                warn!("{}: cannot list directory: {}", right.display(), err);
                return;
            }
        };

        let seen: HashSet<&OsString> = left_names.iter().collect();
        for name in right_names.iter().filter(|name| !seen.contains(name)) {
            debug!("{:?} exists only on the right; not scored", right.join(name));
        }
    }

    /// Dissimilarity charged for a left-hand entry with no counterpart
    fn unmatched_estimate(&self, left: &ComparisonTarget) -> u64 {
        match left.kind {
            TargetKind::RegularFile => left.size / self.config.block_size as u64,
            _ => 1,
        }
    }
}
