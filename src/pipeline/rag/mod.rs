//! Retrieval-augmented explanation of a risk prediction.
//!
//! retrieve passages → build prompt → Groq chat completion → structure answer.

pub mod groq;
pub mod orchestrator;
pub mod prompt;
pub mod retrieval;
pub mod structurer;

pub use orchestrator::{LlmGenerate, RagAdvisor};
pub use retrieval::KnowledgeRetriever;
pub use structurer::ResponseStructurer;

use thiserror::Error;

use crate::pipeline::storage::StorageError;

#[derive(Error, Debug)]
pub enum RagError {
    #[error("GROQ_API_KEY is not configured")]
    MissingApiKey,

    #[error("LLM connection failed: {0}")]
    Connection(String),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("LLM API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),

    #[error("LLM returned an empty answer")]
    EmptyAnswer,

    #[error("Knowledge retrieval failed: {0}")]
    Retrieval(#[from] StorageError),
}
