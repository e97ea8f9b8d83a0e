use super::prompt::{build_patient_question, build_system_prompt};
use super::retrieval::KnowledgeRetriever;
use super::structurer::ResponseStructurer;
use super::RagError;
use crate::models::{PatientRecord, RiskLabel, StructuredExplanation};
use crate::outcome::{Boundary, Recovered};

/// Trait for LLM text generation within the RAG pipeline.
pub trait LlmGenerate: Send + Sync {
    fn generate(&self, system: &str, prompt: &str) -> Result<String, RagError>;
}

/// Explains a risk prediction from the knowledge base.
///
/// Coordinates: build question → retrieve → generate → structure.
/// Any retrieval or generation failure yields the fixed failure payload;
/// partial answers are never surfaced.
pub struct RagAdvisor {
    retriever: KnowledgeRetriever,
    generator: Box<dyn LlmGenerate>,
    structurer: ResponseStructurer,
}

impl RagAdvisor {
    pub fn new(retriever: KnowledgeRetriever, generator: Box<dyn LlmGenerate>) -> Self {
        Self {
            retriever,
            generator,
            structurer: ResponseStructurer::new(),
        }
    }

    pub fn advise(&self, record: &PatientRecord, risk: RiskLabel) -> Recovered<StructuredExplanation> {
        let fallback_risk = risk.as_str();
        let structured = self
            .answer(record, risk)
            .map(|text| self.structurer.structure(&text, fallback_risk));
        Recovered::from_result(structured, Boundary::Knowledge, || {
            StructuredExplanation::failed(fallback_risk)
        })
    }

    /// Raw model answer for one patient.
    pub fn answer(&self, record: &PatientRecord, risk: RiskLabel) -> Result<String, RagError> {
        let question = build_patient_question(record, risk);
        let passages = self.retriever.retrieve(&question)?;
        let system = build_system_prompt(&passages);
        let answer = self.generator.generate(&system, &question)?;
        tracing::debug!(passages = passages.len(), chars = answer.len(), "RAG answer obtained");
        Ok(answer)
    }
}
