//! Risk classification from patient vitals.
//!
//! The model is loaded once at startup and shared read-only across
//! requests. Inference failures never reach the caller: `RiskClassifier`
//! reports `RiskLabel::Unknown` instead.

pub mod features;
pub mod tree;

pub use features::{encode_features, FeatureVector, FEATURE_NAMES};
pub use tree::DecisionTreeModel;

use std::str::FromStr;

use thiserror::Error;

use crate::models::{PatientRecord, RiskLabel};
use crate::outcome::{Boundary, Recovered};

#[derive(Error, Debug)]
pub enum ClassifierError {
    #[error("Cannot read model at {path}: {reason}")]
    ModelLoad { path: String, reason: String },

    #[error("Malformed model: {0}")]
    MalformedModel(String),

    #[error("Feature {0} is missing or not numeric")]
    InvalidFeature(&'static str),

    #[error("Inference failed: {0}")]
    Inference(String),

    #[error("Model predicted unrecognised class: {0}")]
    UnknownClass(String),
}

/// Inference backend abstraction (allows mocking).
pub trait RiskModel: Send + Sync {
    /// Predict a class name for one feature vector.
    fn predict(&self, features: &FeatureVector) -> Result<String, ClassifierError>;
}

/// Maps patient records to risk labels, degrading to `Unknown` on any failure.
pub struct RiskClassifier {
    model: Box<dyn RiskModel>,
}

impl RiskClassifier {
    pub fn new(model: Box<dyn RiskModel>) -> Self {
        Self { model }
    }

    pub fn classify(&self, record: &PatientRecord) -> Recovered<RiskLabel> {
        Recovered::from_result(self.try_classify(record), Boundary::Classifier, || {
            RiskLabel::Unknown
        })
    }

    fn try_classify(&self, record: &PatientRecord) -> Result<RiskLabel, ClassifierError> {
        let features = encode_features(record)?;
        let class = self.model.predict(&features)?;
        let label = RiskLabel::from_str(&class).map_err(|_| ClassifierError::UnknownClass(class))?;
        tracing::debug!(label = label.as_str(), "Risk classified");
        Ok(label)
    }
}

/// systolic <= 130 → Good; else diabetes <= 0.5 → Fair; else Bad.
#[cfg(test)]
pub(crate) const SAMPLE_TREE: &str = r#"{
    "classes": ["Bad", "Fair", "Good"],
    "children_left":  [1, -1, 3, -1, -1],
    "children_right": [2, -1, 4, -1, -1],
    "feature":        [2, -2, 7, -2, -2],
    "threshold":      [130.0, -2.0, 0.5, -2.0, -2.0],
    "value": [
        [10.0, 20.0, 30.0],
        [0.0, 2.0, 28.0],
        [10.0, 18.0, 2.0],
        [1.0, 17.0, 1.0],
        [9.0, 1.0, 1.0]
    ]
}"#;

#[cfg(test)]
mod tests {
    use super::*;

    struct FixedModel(Result<&'static str, &'static str>);

    impl RiskModel for FixedModel {
        fn predict(&self, _features: &FeatureVector) -> Result<String, ClassifierError> {
            self.0
                .map(str::to_string)
                .map_err(|e| ClassifierError::Inference(e.to_string()))
        }
    }

    fn record(systolic: Option<f64>, diabetic: bool) -> PatientRecord {
        PatientRecord {
            name: "Ngozi".into(),
            gender: "female".into(),
            age: Some(47.0),
            systolic_bp: systolic,
            diastolic_bp: Some(88.0),
            cholesterol: Some(210.0),
            bmi: Some(27.0),
            smoker: false,
            diabetic,
            email: "ngozi@example.com".into(),
            latitude: None,
            longitude: None,
        }
    }

    fn tree_classifier() -> RiskClassifier {
        RiskClassifier::new(Box::new(DecisionTreeModel::from_json(SAMPLE_TREE).unwrap()))
    }

    #[test]
    fn classifies_with_decision_tree() {
        let classifier = tree_classifier();
        assert_eq!(classifier.classify(&record(Some(118.0), false)).into_value(), RiskLabel::Good);
        assert_eq!(classifier.classify(&record(Some(160.0), false)).into_value(), RiskLabel::Fair);
        assert_eq!(classifier.classify(&record(Some(160.0), true)).into_value(), RiskLabel::Bad);
    }

    #[test]
    fn missing_vital_degrades_to_unknown() {
        let result = tree_classifier().classify(&record(None, true));
        assert!(result.is_fallback());
        assert_eq!(result.into_value(), RiskLabel::Unknown);
    }

    #[test]
    fn model_error_degrades_to_unknown() {
        let classifier = RiskClassifier::new(Box::new(FixedModel(Err("backend crashed"))));
        let result = classifier.classify(&record(Some(120.0), false));
        assert_eq!(result.reason(), Some("Inference failed: backend crashed"));
        assert_eq!(result.into_value(), RiskLabel::Unknown);
    }

    #[test]
    fn unrecognised_class_degrades_to_unknown() {
        let classifier = RiskClassifier::new(Box::new(FixedModel(Ok("Excellent"))));
        let result = classifier.classify(&record(Some(120.0), false));
        assert!(result.is_fallback());
        assert_eq!(result.into_value(), RiskLabel::Unknown);
    }
}
