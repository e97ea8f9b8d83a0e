//! Knowledge base storage: corpus files, chunking, embeddings and the
//! in-memory vector index the retriever searches.

pub mod types;
pub mod chunker;
pub mod corpus;
pub mod embedder;
pub mod vectordb;

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Corpus directory unreadable: {0}")]
    CorpusUnreadable(PathBuf),

    #[error("Fetching {url} failed: {reason}")]
    Fetch { url: String, reason: String },

    #[error("Vector index error: {0}")]
    VectorIndex(String),

    #[error("Embedding generation failed: {0}")]
    Embedding(String),
}
