pub mod block;
pub mod reader;
pub mod file_map;
pub mod target;
pub mod walker;

pub use block::classify;
pub use reader::{BlockReaderPair, BlockStep};
pub use file_map::{FileMapEngine, GlyphWriter};
pub use target::resolve_target;
pub use walker::TreeWalker;
