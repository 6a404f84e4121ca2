//! Structure-aware document chunking.
//!
//! Packs flattened document items into retrieval-sized chunks under a token
//! budget, respecting section boundaries, serializing tables to a
//! key-value form embedding models handle well, and annotating every chunk
//! with descriptive metadata. Token counting goes through a cached
//! tokenizer provider that degrades to a built-in word counter when a
//! requested vocabulary cannot be loaded.

pub mod metadata;
pub mod pipeline;
pub mod splitter;
pub mod table;
pub mod tokenizer;

pub use metadata::extract_metadata;
pub use pipeline::ChunkingPipeline;
pub use splitter::{split_document, ChunkGroup, SplitOptions};
pub use table::serialize_table;
pub use tokenizer::{TokenCounter, TokenizerHandle, TokenizerProvider};
