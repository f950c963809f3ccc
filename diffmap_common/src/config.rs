use crate::DiffMapError;
use serde::{Deserialize, Serialize};

pub const DEFAULT_BLOCK_SIZE: usize = 512;
pub const DEFAULT_SCREEN_WIDTH: usize = 80;

/// Settings for one comparison run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapConfig {
    /// Bytes per block
    #[serde(default = "default_block_size")]
    pub block_size: usize,

    /// Glyphs per output line; 0 never wraps
    #[serde(default = "default_screen_width")]
    pub screen_width: usize,

    /// Visit directory entries in lexicographic order instead of listing order
    #[serde(default)]
    pub sort_entries: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            screen_width: DEFAULT_SCREEN_WIDTH,
            sort_entries: false,
        }
    }
}

impl MapConfig {
    pub fn with_block_size(mut self, block_size: usize) -> Self {
        self.block_size = block_size;
        self
    }

    pub fn with_screen_width(mut self, screen_width: usize) -> Self {
        self.screen_width = screen_width;
        self
    }

    pub fn with_sorted_entries(mut self, enabled: bool) -> Self {
        self.sort_entries = enabled;
        self
    }

    pub fn validate(&self) -> Result<(), DiffMapError> {
        if self.block_size == 0 {
            return Err(DiffMapError::Config(
                "block size must be at least one byte".to_string(),
            ));
        }
        Ok(())
    }
}

fn default_block_size() -> usize {
    DEFAULT_BLOCK_SIZE
}

fn default_screen_width() -> usize {
    DEFAULT_SCREEN_WIDTH
}
