use super::types::{Chunker, EmbeddingModel, KnowledgeDocument, ScoredPassage, VectorSearch};
use super::StorageError;

/// In-memory vector index over the chunked knowledge corpus.
/// Built once at startup and read concurrently afterwards.
pub struct InMemoryVectorIndex {
    entries: Vec<IndexedChunk>,
    dimension: usize,
}

#[derive(Debug, Clone)]
struct IndexedChunk {
    source: String,
    content: String,
    embedding: Vec<f32>,
}

impl InMemoryVectorIndex {
    pub fn new(dimension: usize) -> Self {
        Self {
            entries: Vec::new(),
            dimension,
        }
    }

    /// Chunk and embed every document, returning the populated index.
    pub fn build(
        documents: &[KnowledgeDocument],
        chunker: &impl Chunker,
        embedder: &impl EmbeddingModel,
    ) -> Result<Self, StorageError> {
        let mut index = Self::new(embedder.dimension());

        for doc in documents {
            let chunks = chunker.chunk(&doc.text);
            if chunks.is_empty() {
                continue;
            }
            let texts: Vec<&str> = chunks.iter().map(|c| c.content.as_str()).collect();
            let embeddings = embedder.embed_batch(&texts)?;
            index.insert(&doc.source, &texts, embeddings)?;
        }

        tracing::info!(
            documents = documents.len(),
            chunks = index.len(),
            "Knowledge index built"
        );
        Ok(index)
    }

    pub fn insert(
        &mut self,
        source: &str,
        contents: &[&str],
        embeddings: Vec<Vec<f32>>,
    ) -> Result<usize, StorageError> {
        if contents.len() != embeddings.len() {
            return Err(StorageError::VectorIndex(
                "Chunk count does not match embedding count".into(),
            ));
        }
        if let Some(bad) = embeddings.iter().find(|e| e.len() != self.dimension) {
            return Err(StorageError::VectorIndex(format!(
                "Embedding has {} dimensions, index expects {}",
                bad.len(),
                self.dimension
            )));
        }

        let count = contents.len();
        self.entries
            .extend(contents.iter().zip(embeddings).map(|(content, embedding)| IndexedChunk {
                source: source.to_string(),
                content: content.to_string(),
                embedding,
            }));
        Ok(count)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl VectorSearch for InMemoryVectorIndex {
    fn search(&self, query_embedding: &[f32], top_k: usize) -> Result<Vec<ScoredPassage>, StorageError> {
        if query_embedding.len() != self.dimension {
            return Err(StorageError::VectorIndex(format!(
                "Query has {} dimensions, index expects {}",
                query_embedding.len(),
                self.dimension
            )));
        }

        let mut scored: Vec<ScoredPassage> = self
            .entries
            .iter()
            .map(|entry| ScoredPassage {
                source: entry.source.clone(),
                content: entry.content.clone(),
                score: cosine_similarity(query_embedding, &entry.embedding),
            })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_k);
        Ok(scored)
    }
}

/// Cosine similarity between two vectors. Zero when either is all-zero.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::storage::chunker::CharacterChunker;
    use crate::pipeline::storage::embedder::{HashingEmbedder, EMBEDDING_DIM};

    fn doc(source: &str, text: &str) -> KnowledgeDocument {
        KnowledgeDocument {
            source: source.into(),
            text: text.into(),
        }
    }

    fn sample_index() -> InMemoryVectorIndex {
        let docs = vec![
            doc("hypertension.md", "Hypertension is high blood pressure in the arteries."),
            doc("tobacco.md", "Tobacco use and smoking damage the heart and lungs."),
            doc("diabetes.md", "Diabetes raises blood sugar and harms blood vessels."),
        ];
        InMemoryVectorIndex::build(&docs, &CharacterChunker::default(), &HashingEmbedder::new())
            .unwrap()
    }

    #[test]
    fn build_indexes_every_document() {
        let index = sample_index();
        assert_eq!(index.len(), 3);
        assert!(!index.is_empty());
    }

    #[test]
    fn search_ranks_relevant_passage_first() {
        let index = sample_index();
        let query = HashingEmbedder::new().embed("smoking tobacco").unwrap();
        let results = index.search(&query, 2).unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].source, "tobacco.md");
        assert!(results[0].score >= results[1].score);
    }

    #[test]
    fn search_truncates_to_available() {
        let index = sample_index();
        let query = HashingEmbedder::new().embed("blood").unwrap();
        assert_eq!(index.search(&query, 10).unwrap().len(), 3);
    }

    #[test]
    fn empty_index_returns_nothing() {
        let index = InMemoryVectorIndex::new(EMBEDDING_DIM);
        let query = vec![0.1; EMBEDDING_DIM];
        assert!(index.search(&query, 5).unwrap().is_empty());
    }

    #[test]
    fn wrong_query_dimension_errors() {
        let index = sample_index();
        assert!(matches!(
            index.search(&[1.0, 0.0], 5),
            Err(StorageError::VectorIndex(_))
        ));
    }

    #[test]
    fn insert_rejects_mismatched_counts() {
        let mut index = InMemoryVectorIndex::new(2);
        let result = index.insert("a", &["one", "two"], vec![vec![1.0, 0.0]]);
        assert!(result.is_err());
    }

    #[test]
    fn cosine_similarity_basics() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
    }
}
