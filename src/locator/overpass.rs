use std::collections::HashMap;
use std::time::Duration;

use serde::Deserialize;

use super::{FacilitySearch, LocatorError, MAX_FACILITIES};
use crate::models::HospitalEntry;

/// Overpass requests give up after this many seconds.
pub const OVERPASS_TIMEOUT_SECS: u64 = 20;

const UNNAMED: &str = "Unnamed Hospital";
const DEFAULT_KIND: &str = "General";
const NO_ADDRESS: &str = "N/A";

/// OpenStreetMap Overpass API client.
pub struct OverpassClient {
    url: String,
    client: reqwest::blocking::Client,
}

impl OverpassClient {
    pub fn new(url: &str) -> Result<Self, LocatorError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(OVERPASS_TIMEOUT_SECS))
            .build()
            .map_err(|e| LocatorError::HttpClient(e.to_string()))?;
        Ok(Self {
            url: url.to_string(),
            client,
        })
    }
}

/// Overpass QL for hospitals (nodes, ways and relations) around a point.
pub fn hospital_query(lat: f64, lon: f64, radius_m: u32) -> String {
    let around = format!("(around:{radius_m},{lat},{lon})");
    format!(
        "[out:json];\n(\n  node[\"amenity\"=\"hospital\"]{around};\n  way[\"amenity\"=\"hospital\"]{around};\n  relation[\"amenity\"=\"hospital\"]{around};\n);\nout center;"
    )
}

#[derive(Deserialize)]
struct OverpassResponse {
    #[serde(default)]
    elements: Vec<OverpassElement>,
}

#[derive(Deserialize)]
struct OverpassElement {
    lat: Option<f64>,
    lon: Option<f64>,
    center: Option<Center>,
    #[serde(default)]
    tags: HashMap<String, String>,
}

#[derive(Deserialize)]
struct Center {
    lat: Option<f64>,
    lon: Option<f64>,
}

impl From<OverpassElement> for HospitalEntry {
    fn from(el: OverpassElement) -> Self {
        let tag = |key: &str| el.tags.get(key).cloned();
        let center = el.center.as_ref();
        HospitalEntry {
            name: tag("name").unwrap_or_else(|| UNNAMED.to_string()),
            kind: tag("hospital:type").unwrap_or_else(|| DEFAULT_KIND.to_string()),
            address: tag("address")
                .or_else(|| tag("addr:street"))
                .unwrap_or_else(|| NO_ADDRESS.to_string()),
            latitude: el.lat.or_else(|| center.and_then(|c| c.lat)),
            longitude: el.lon.or_else(|| center.and_then(|c| c.lon)),
        }
    }
}

/// Parse an Overpass JSON body into at most `MAX_FACILITIES` entries, in API order.
pub fn parse_hospitals(body: &str) -> Result<Vec<HospitalEntry>, LocatorError> {
    let parsed: OverpassResponse =
        serde_json::from_str(body).map_err(|e| LocatorError::ResponseParsing(e.to_string()))?;
    Ok(parsed
        .elements
        .into_iter()
        .take(MAX_FACILITIES)
        .map(HospitalEntry::from)
        .collect())
}

impl FacilitySearch for OverpassClient {
    fn search(&self, lat: f64, lon: f64, radius_m: u32) -> Result<Vec<HospitalEntry>, LocatorError> {
        let query = hospital_query(lat, lon, radius_m);

        let response = self
            .client
            .post(&self.url)
            .form(&[("data", query.as_str())])
            .send()
            .map_err(|e| {
                if e.is_timeout() {
                    LocatorError::HttpClient(format!("Request timed out after {OVERPASS_TIMEOUT_SECS}s"))
                } else {
                    LocatorError::HttpClient(e.to_string())
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(LocatorError::Api {
                status: status.as_u16(),
            });
        }

        let body = response
            .text()
            .map_err(|e| LocatorError::ResponseParsing(e.to_string()))?;
        parse_hospitals(&body)
    }
}
