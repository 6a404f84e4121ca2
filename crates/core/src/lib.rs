pub mod chunk;
pub mod config;
pub mod document;
pub mod error;

pub use chunk::*;
pub use config::{ChunkConfig, Config, TokenizerConfig};
pub use document::*;
pub use error::*;
