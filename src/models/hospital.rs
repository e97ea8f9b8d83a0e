use serde::{Deserialize, Serialize};

/// A hospital near the patient, as reported by the geospatial lookup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HospitalEntry {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub address: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}
