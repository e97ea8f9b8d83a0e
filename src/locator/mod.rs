//! Nearby-hospital lookup.
//!
//! Lookup failures never reach the caller: `FacilityLocator` reports an
//! empty list instead.

pub mod overpass;

pub use overpass::OverpassClient;

use thiserror::Error;

use crate::models::HospitalEntry;
use crate::outcome::{Boundary, Recovered};

/// Search radius around the patient, in meters.
pub const DEFAULT_RADIUS_M: u32 = 5000;

/// Most facilities reported per request.
pub const MAX_FACILITIES: usize = 5;

#[derive(Error, Debug)]
pub enum LocatorError {
    #[error("Patient coordinates are missing")]
    MissingCoordinates,

    #[error("Coordinates out of range: {lat}, {lon}")]
    InvalidCoordinates { lat: f64, lon: f64 },

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Overpass returned {status}")]
    Api { status: u16 },

    #[error("Response parsing error: {0}")]
    ResponseParsing(String),
}

/// Geospatial search backend (allows mocking).
pub trait FacilitySearch: Send + Sync {
    fn search(&self, lat: f64, lon: f64, radius_m: u32) -> Result<Vec<HospitalEntry>, LocatorError>;
}

pub struct FacilityLocator {
    backend: Box<dyn FacilitySearch>,
    radius_m: u32,
}

impl FacilityLocator {
    pub fn new(backend: Box<dyn FacilitySearch>) -> Self {
        Self {
            backend,
            radius_m: DEFAULT_RADIUS_M,
        }
    }

    /// Up to `MAX_FACILITIES` hospitals near the point, or an empty list on any failure.
    pub fn nearby(&self, lat: Option<f64>, lon: Option<f64>) -> Recovered<Vec<HospitalEntry>> {
        Recovered::from_result(self.try_nearby(lat, lon), Boundary::FacilityLookup, Vec::new)
    }

    fn try_nearby(&self, lat: Option<f64>, lon: Option<f64>) -> Result<Vec<HospitalEntry>, LocatorError> {
        let (Some(lat), Some(lon)) = (lat, lon) else {
            return Err(LocatorError::MissingCoordinates);
        };
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(LocatorError::InvalidCoordinates { lat, lon });
        }

        let mut hospitals = self.backend.search(lat, lon, self.radius_m)?;
        hospitals.truncate(MAX_FACILITIES);
        tracing::debug!(found = hospitals.len(), radius_m = self.radius_m, "Facility lookup complete");
        Ok(hospitals)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    struct FakeSearch {
        result: fn() -> Result<Vec<HospitalEntry>, LocatorError>,
        calls: Arc<AtomicUsize>,
    }

    impl FacilitySearch for FakeSearch {
        fn search(&self, _lat: f64, _lon: f64, radius_m: u32) -> Result<Vec<HospitalEntry>, LocatorError> {
            assert_eq!(radius_m, DEFAULT_RADIUS_M);
            self.calls.fetch_add(1, Ordering::SeqCst);
            (self.result)()
        }
    }

    fn hospital(name: &str) -> HospitalEntry {
        HospitalEntry {
            name: name.into(),
            kind: "General".into(),
            address: "N/A".into(),
            latitude: Some(6.5),
            longitude: Some(3.4),
        }
    }

    fn locator(result: fn() -> Result<Vec<HospitalEntry>, LocatorError>) -> (FacilityLocator, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let backend = FakeSearch {
            result,
            calls: Arc::clone(&calls),
        };
        (FacilityLocator::new(Box::new(backend)), calls)
    }

    #[test]
    fn returns_backend_results() {
        let (locator, _) = locator(|| Ok(vec![hospital("St. Mary")]));
        let result = locator.nearby(Some(6.5), Some(3.4));
        assert!(!result.is_fallback());
        assert_eq!(result.into_value()[0].name, "St. Mary");
    }

    #[test]
    fn caps_results_at_five() {
        let (locator, _) = locator(|| Ok((0..8).map(|i| hospital(&format!("H{i}"))).collect()));
        assert_eq!(locator.nearby(Some(0.0), Some(0.0)).into_value().len(), 5);
    }

    #[test]
    fn backend_failure_yields_empty_list() {
        let (locator, _) = locator(|| Err(LocatorError::Api { status: 504 }));
        let result = locator.nearby(Some(6.5), Some(3.4));
        assert!(result.is_fallback());
        assert!(result.into_value().is_empty());
    }

    #[test]
    fn missing_coordinates_skip_backend() {
        let (locator, calls) = locator(|| Ok(vec![hospital("unused")]));
        let result = locator.nearby(None, Some(3.4));
        assert_eq!(result.reason(), Some("Patient coordinates are missing"));
        assert!(result.into_value().is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn out_of_range_coordinates_skip_backend() {
        let (locator, calls) = locator(|| Ok(vec![hospital("unused")]));
        assert!(locator.nearby(Some(95.0), Some(3.4)).into_value().is_empty());
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }
}
