use serde::{Deserialize, Serialize};

pub const NO_EXPLANATION: &str = "No explanation found.";
pub const NO_DIAGNOSIS: &str = "Unable to retrieve diagnosis.";
pub const NO_STEPS: &str = "No steps provided.";

pub const FAILED_EXPLANATION: &str = "RAG analysis failed.";
pub const FAILED_NEXT_STEP: &str = "Consult a doctor for further advice.";

/// The three-part reading of the model's answer, plus the risk phrase it reported.
///
/// Built once per request. `next_steps` is never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredExplanation {
    pub explanation: String,
    pub diagnosis: String,
    pub next_steps: Vec<String>,
    pub risk: String,
}

impl StructuredExplanation {
    /// Payload used when retrieval or generation failed outright.
    pub fn failed(fallback_risk: &str) -> Self {
        Self {
            explanation: FAILED_EXPLANATION.to_string(),
            diagnosis: NO_DIAGNOSIS.to_string(),
            next_steps: vec![FAILED_NEXT_STEP.to_string()],
            risk: fallback_risk.to_string(),
        }
    }
}
