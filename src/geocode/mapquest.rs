use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use crate::geocode::Geocoder;
use crate::model::Location;

pub const DEFAULT_BASE_URL: &str = "https://www.mapquestapi.com/geocoding/v1/address";

/// Geocoder backed by the MapQuest address endpoint.
pub struct MapQuestGeocoder {
    base_url: String,
    api_key: String,
    http_client: reqwest::Client,
}

impl MapQuestGeocoder {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .connect_timeout(Duration::from_secs(5))
            .build()
            .context("Failed to create geocoder HTTP client")?;

        Ok(Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            http_client,
        })
    }
}

#[derive(Debug, Deserialize)]
struct AddressResponse {
    #[serde(default)]
    results: Vec<AddressResult>,
}

#[derive(Debug, Deserialize)]
struct AddressResult {
    #[serde(default)]
    locations: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    lat_lng: LatLng,
    #[serde(default)]
    street: String,
    /// City
    #[serde(default)]
    admin_area5: String,
    /// State
    #[serde(default)]
    admin_area3: String,
    #[serde(default)]
    postal_code: String,
    /// Country
    #[serde(default)]
    admin_area1: String,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

fn non_empty(value: String) -> Option<String> {
    let value = value.trim().to_string();
    (!value.is_empty()).then_some(value)
}

impl AddressResponse {
    fn into_location(self) -> Option<Location> {
        let candidate = self.results.into_iter().next()?.locations.into_iter().next()?;

        let state_zip = format!("{} {}", candidate.admin_area3, candidate.postal_code);
        let formatted = [
            candidate.street.as_str(),
            candidate.admin_area5.as_str(),
            state_zip.as_str(),
            candidate.admin_area1.as_str(),
        ]
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(", ");

        let mut location = Location::point(candidate.lat_lng.lng, candidate.lat_lng.lat);
        location.formatted_address = non_empty(formatted);
        location.street = non_empty(candidate.street);
        location.city = non_empty(candidate.admin_area5);
        location.state = non_empty(candidate.admin_area3);
        location.zipcode = non_empty(candidate.postal_code);
        location.country = non_empty(candidate.admin_area1);
        Some(location)
    }
}

#[async_trait]
impl Geocoder for MapQuestGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<Location>> {
        log::debug!("Geocoding {:?} via MapQuest", query);

        let response: AddressResponse = self
            .http_client
            .get(&self.base_url)
            .query(&[("key", self.api_key.as_str()), ("location", query)])
            .send()
            .await
            .context("Geocoder request failed")?
            .error_for_status()
            .context("Geocoder rejected the request")?
            .json()
            .await
            .context("Geocoder returned an unexpected body")?;

        Ok(response.into_location())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_candidate_becomes_location() {
        let response: AddressResponse = serde_json::from_value(json!({
            "results": [{
                "locations": [
                    {
                        "latLng": {"lat": 42.350846, "lng": -71.105536},
                        "street": "233 Bay State Rd",
                        "adminArea5": "Boston",
                        "adminArea3": "MA",
                        "postalCode": "02215",
                        "adminArea1": "US"
                    },
                    {"latLng": {"lat": 0.0, "lng": 0.0}}
                ]
            }]
        }))
        .unwrap();

        let location = response.into_location().unwrap();
        assert_eq!(location.coordinates, [-71.105536, 42.350846]);
        assert_eq!(location.city.as_deref(), Some("Boston"));
        assert_eq!(
            location.formatted_address.as_deref(),
            Some("233 Bay State Rd, Boston, MA 02215, US")
        );
    }

    #[test]
    fn test_no_candidates() {
        let response: AddressResponse =
            serde_json::from_value(json!({"results": [{"locations": []}]})).unwrap();
        assert!(response.into_location().is_none());

        let response: AddressResponse = serde_json::from_value(json!({})).unwrap();
        assert!(response.into_location().is_none());
    }
}
