pub mod enums;
pub mod explanation;
pub mod hospital;
pub mod patient;

pub use enums::{InvalidEnum, RiskLabel};
pub use explanation::StructuredExplanation;
pub use hospital::HospitalEntry;
pub use patient::{missing_fields, PatientRecord, REQUIRED_FIELDS};
