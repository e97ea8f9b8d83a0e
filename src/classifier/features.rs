use super::ClassifierError;
use crate::models::PatientRecord;

/// Column order the model was trained on.
pub const FEATURE_NAMES: [&str; 8] = [
    "gender",
    "age",
    "systolic_bp",
    "diastolic_bp",
    "cholesterol",
    "bmi",
    "smoker",
    "diabetes",
];

const GENDER_FEMALE: f64 = 1.0;
const GENDER_OTHER: f64 = 2.0;

/// Fixed-order numeric input for the risk model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector(pub [f64; 8]);

impl FeatureVector {
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

/// Encode a patient record into the model's feature vector.
///
/// Fails when any vital is missing or non-numeric.
pub fn encode_features(record: &PatientRecord) -> Result<FeatureVector, ClassifierError> {
    let require = |name: &'static str, value: Option<f64>| {
        value.ok_or(ClassifierError::InvalidFeature(name))
    };

    let gender = if record.is_female() {
        GENDER_FEMALE
    } else {
        GENDER_OTHER
    };

    Ok(FeatureVector([
        gender,
        require("age", record.age)?,
        require("systolic_bp", record.systolic_bp)?,
        require("diastolic_bp", record.diastolic_bp)?,
        require("cholesterol", record.cholesterol)?,
        require("bmi", record.bmi)?,
        if record.smoker { 1.0 } else { 0.0 },
        if record.diabetic { 1.0 } else { 0.0 },
    ]))
}
