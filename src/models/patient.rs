use serde::Serialize;
use serde_json::{Map, Value};

/// Request keys that must be present on every assessment, in validation order.
pub const REQUIRED_FIELDS: [&str; 12] = [
    "Name",
    "Gender",
    "Age",
    "Systolic BP",
    "Diastolic BP",
    "Cholesterol",
    "BMI",
    "Smoker",
    "Diabetes",
    "Email",
    "Latitude",
    "Longitude",
];

/// Required keys absent from the request body. A key present with `null` counts as present.
pub fn missing_fields(body: &Map<String, Value>) -> Vec<&'static str> {
    REQUIRED_FIELDS
        .iter()
        .copied()
        .filter(|field| !body.contains_key(*field))
        .collect()
}

/// Vitals and contact details for one assessment request. Never persisted.
///
/// Numeric vitals are `None` when the submitted value cannot be read as a number;
/// downstream collaborators decide how to degrade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PatientRecord {
    pub name: String,
    pub gender: String,
    pub age: Option<f64>,
    pub systolic_bp: Option<f64>,
    pub diastolic_bp: Option<f64>,
    pub cholesterol: Option<f64>,
    pub bmi: Option<f64>,
    pub smoker: bool,
    pub diabetic: bool,
    pub email: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl PatientRecord {
    /// Build a record from a request body that already passed `missing_fields`.
    pub fn from_fields(body: &Map<String, Value>) -> Self {
        let field = |key: &str| body.get(key).unwrap_or(&Value::Null);

        Self {
            name: value_text(field("Name")),
            gender: value_text(field("Gender")),
            age: value_number(field("Age")),
            systolic_bp: value_number(field("Systolic BP")),
            diastolic_bp: value_number(field("Diastolic BP")),
            cholesterol: value_number(field("Cholesterol")),
            bmi: value_number(field("BMI")),
            smoker: value_truthy(field("Smoker")),
            diabetic: value_truthy(field("Diabetes")),
            email: value_text(field("Email")),
            latitude: value_number(field("Latitude")),
            longitude: value_number(field("Longitude")),
        }
    }

    /// True for "female" or "f", case-insensitive.
    pub fn is_female(&self) -> bool {
        matches!(self.gender.trim().to_lowercase().as_str(), "female" | "f")
    }
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

/// Numbers and numeric strings parse; booleans count as 1/0.
fn value_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        _ => None,
    }
}

/// Loose truthiness for flag fields: empty, zero and null are false.
fn value_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|v| v != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}
