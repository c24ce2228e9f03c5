//! Retrieval-augmented answering over a vector store.

pub mod ask;
pub mod types;

pub use ask::{ask, build_context};
pub use types::{AskOptions, RagAnswer, RagSourceRef};
