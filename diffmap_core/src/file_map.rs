use crate::reader::{BlockReaderPair, Side};
use diffmap_common::{BlockOutcome, ComparisonResult, DiffMapError, MapConfig, Result};
use std::fs::File;
use std::io::{self, Read, Write};
use std::path::Path;
use tracing::debug;

/// Writes one glyph per block, breaking lines at a fixed width
pub struct GlyphWriter<'a, W: Write> {
    out: &'a mut W,
    width: usize,
    column: usize,
}

impl<'a, W: Write> GlyphWriter<'a, W> {
    /// A width of 0 never breaks a line
    pub fn new(out: &'a mut W, width: usize) -> Self {
        Self {
            out,
            width,
            column: 0,
        }
    }

    pub fn push(&mut self, outcome: BlockOutcome) -> io::Result<()> {
        self.out.write_all(&[outcome.glyph()])?;
        self.column += 1;
        if self.column == self.width {
            self.out.write_all(b"\n")?;
            self.column = 0;
        }
        Ok(())
    }

    /// Terminate the map; always writes a newline, even at column 0
    pub fn finish(self) -> io::Result<()> {
        self.out.write_all(b"\n")
    }
}

/// Draws the block map for a pair of files
pub struct FileMapEngine {
    block_size: usize,
    screen_width: usize,
}

impl FileMapEngine {
    pub fn new(config: &MapConfig) -> Self {
        Self {
            block_size: config.block_size,
            screen_width: config.screen_width,
        }
    }

    /// Open both files and map them block by block onto `out`
    pub fn compare_files<W: Write>(
        &self,
        left_path: &Path,
        right_path: &Path,
        out: &mut W,
    ) -> Result<ComparisonResult> {
        let left = File::open(left_path).map_err(|source| DiffMapError::Open {
            path: left_path.to_path_buf(),
            source,
        })?;
        let right = File::open(right_path).map_err(|source| DiffMapError::Open {
            path: right_path.to_path_buf(),
            source,
        })?;

        self.compare_readers(left, left_path, right, right_path, out)
    }

    /// Map two arbitrary streams; the paths only label read errors
    pub fn compare_readers<L: Read, R: Read, W: Write>(
        &self,
        left: L,
        left_path: &Path,
        right: R,
        right_path: &Path,
        out: &mut W,
    ) -> Result<ComparisonResult> {
        let mut pair = BlockReaderPair::new(left, right, self.block_size)?;
        let mut glyphs = GlyphWriter::new(out, self.screen_width);
        let mut result = ComparisonResult::default();

        loop {
            let step = match pair.next_step() {
                Ok(Some(step)) => step,
                Ok(None) => break,
                Err(err) => {
                    let path = match err.side {
                        Side::Left => left_path,
                        Side::Right => right_path,
                    };
                    return Err(DiffMapError::Read {
                        path: path.to_path_buf(),
                        source: err.source,
                    });
                }
            };

            let outcome = step.outcome();
            result.record(outcome);
            glyphs.push(outcome).map_err(DiffMapError::Output)?;
        }
        glyphs.finish().map_err(DiffMapError::Output)?;

        debug!(
            "Mapped {} blocks ({} identical) for {:?}",
            result.block_count, result.identical_block_count, left_path
        );
        Ok(result)
    }
}

impl Default for FileMapEngine {
    fn default() -> Self {
        Self::new(&MapConfig::default())
    }
}
