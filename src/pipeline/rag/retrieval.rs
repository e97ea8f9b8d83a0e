use super::RagError;
use crate::pipeline::storage::types::{EmbeddingModel, ScoredPassage, VectorSearch};

/// Passages handed to the LLM per question.
pub const DEFAULT_TOP_K: usize = 5;

/// Semantic search over the knowledge index.
pub struct KnowledgeRetriever {
    embedder: Box<dyn EmbeddingModel>,
    index: Box<dyn VectorSearch>,
    top_k: usize,
}

impl KnowledgeRetriever {
    pub fn new(embedder: Box<dyn EmbeddingModel>, index: Box<dyn VectorSearch>) -> Self {
        Self {
            embedder,
            index,
            top_k: DEFAULT_TOP_K,
        }
    }

    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// The `top_k` passages most similar to `query`, best first.
    pub fn retrieve(&self, query: &str) -> Result<Vec<ScoredPassage>, RagError> {
        let query_embedding = self.embedder.embed(query)?;
        let passages = self.index.search(&query_embedding, self.top_k)?;
        tracing::debug!(
            passages = passages.len(),
            best_score = passages.first().map(|p| p.score),
            "Knowledge passages retrieved"
        );
        Ok(passages)
    }
}
