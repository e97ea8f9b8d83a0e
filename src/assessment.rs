//! The per-request assessment pipeline.
//!
//! classify → explain → locate hospitals → alert (Bad only) → report.
//! Steps run in order on the calling thread; each collaborator degrades to
//! its own default, so `assess` itself never fails.

use serde::Serialize;
use thiserror::Error;

use crate::classifier::{ClassifierError, DecisionTreeModel, RiskClassifier};
use crate::config::AppConfig;
use crate::locator::{FacilityLocator, LocatorError, OverpassClient};
use crate::models::{HospitalEntry, PatientRecord, RiskLabel};
use crate::notify::{AlertContent, NotificationGateway, NotifyError, SmtpMailer};
use crate::pipeline::rag::groq::GroqClient;
use crate::pipeline::rag::{KnowledgeRetriever, RagAdvisor, RagError};
use crate::pipeline::storage::chunker::CharacterChunker;
use crate::pipeline::storage::corpus::{self, HttpPageFetcher, KNOWLEDGE_SOURCES};
use crate::pipeline::storage::embedder::HashingEmbedder;
use crate::pipeline::storage::types::KnowledgeDocument;
use crate::pipeline::storage::vectordb::InMemoryVectorIndex;
use crate::pipeline::storage::StorageError;

/// Failures that stop the service from starting.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Risk model unavailable: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("Knowledge index unavailable: {0}")]
    Knowledge(#[from] StorageError),

    #[error("LLM client unavailable: {0}")]
    Llm(#[from] RagError),

    #[error("Hospital lookup client unavailable: {0}")]
    Locator(#[from] LocatorError),

    #[error("Mailer unavailable: {0}")]
    Notify(#[from] NotifyError),
}

/// Response body for one assessment.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentReport {
    pub name: String,
    pub risk: RiskLabel,
    pub explanation: String,
    pub diagnosis: String,
    pub next_steps: Vec<String>,
    pub hospitals: Vec<HospitalEntry>,
}

/// Startup-built collaborators, shared read-only across requests.
pub struct AssessmentService {
    classifier: RiskClassifier,
    advisor: RagAdvisor,
    locator: FacilityLocator,
    gateway: NotificationGateway,
}

impl AssessmentService {
    pub fn new(
        classifier: RiskClassifier,
        advisor: RagAdvisor,
        locator: FacilityLocator,
        gateway: NotificationGateway,
    ) -> Self {
        Self {
            classifier,
            advisor,
            locator,
            gateway,
        }
    }

    /// Build every collaborator from configuration.
    ///
    /// Creates blocking HTTP clients, so call it off the async runtime.
    /// A missing risk model is fatal; an unreachable knowledge corpus only
    /// leaves the index empty.
    pub fn from_config(config: &AppConfig) -> Result<Self, StartupError> {
        let model = DecisionTreeModel::load(&config.model_path)?;

        let documents = load_knowledge(config)?;
        let embedder = HashingEmbedder::new();
        let index = InMemoryVectorIndex::build(&documents, &CharacterChunker::default(), &embedder)?;
        let retriever = KnowledgeRetriever::new(Box::new(embedder), Box::new(index));

        let groq = GroqClient::new(
            &config.groq_base_url,
            config.groq_api_key.clone(),
            &config.groq_model,
            config.groq_timeout_secs,
        )?;
        if !groq.has_api_key() {
            tracing::warn!("GROQ_API_KEY is not set; explanations will use the fallback text");
        }

        let mailer = SmtpMailer::new(&config.smtp)?;

        Ok(Self::new(
            RiskClassifier::new(Box::new(model)),
            RagAdvisor::new(retriever, Box::new(groq)),
            FacilityLocator::new(Box::new(OverpassClient::new(&config.overpass_url)?)),
            NotificationGateway::new(Box::new(mailer)),
        ))
    }

    pub fn assess(&self, record: &PatientRecord) -> AssessmentReport {
        let risk = self.classifier.classify(record).into_value();
        tracing::info!(risk = risk.as_str(), "Risk predicted");

        let explanation = self.advisor.advise(record, risk).into_value();
        tracing::info!(
            risk = risk.as_str(),
            narrative_risk = %explanation.risk,
            steps = explanation.next_steps.len(),
            "Explanation ready"
        );

        let hospitals = self
            .locator
            .nearby(record.latitude, record.longitude)
            .into_value();

        if risk.requires_alert() {
            let outcome = self.gateway.notify(&AlertContent {
                recipient: &record.email,
                risk,
                explanation: &explanation.explanation,
                next_steps: &explanation.next_steps,
                display_name: &record.name,
            });
            if outcome.is_fallback() {
                tracing::warn!("High-risk alert was not delivered");
            }
        }

        AssessmentReport {
            name: record.name.clone(),
            risk,
            explanation: explanation.explanation,
            diagnosis: explanation.diagnosis,
            next_steps: explanation.next_steps,
            hospitals,
        }
    }
}

fn load_knowledge(config: &AppConfig) -> Result<Vec<KnowledgeDocument>, StartupError> {
    let fetcher = HttpPageFetcher::new()?;
    match corpus::load_or_build(&config.knowledge_dir, KNOWLEDGE_SOURCES, &fetcher) {
        Ok(documents) => Ok(documents),
        Err(e) => {
            tracing::warn!(error = %e, "Knowledge corpus unavailable; starting with an empty index");
            Ok(Vec::new())
        }
    }
}
