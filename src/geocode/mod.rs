pub mod mapquest;

pub use mapquest::MapQuestGeocoder;

use anyhow::{bail, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use crate::config::{GeocoderConfig, GeocoderProvider};
use crate::model::Location;

/// Resolves an address or zipcode to a point.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// `Ok(None)` when the query names no known place.
    async fn geocode(&self, query: &str) -> Result<Option<Location>>;
}

/// Geocoder over a fixed table of places keyed by zipcode.
///
/// A query matches when it is a known zipcode or contains one as a
/// standalone five-digit token, as in `"233 Bay State Rd Boston MA 02215"`.
#[derive(Debug, Clone, Default)]
pub struct OfflineGeocoder {
    places: HashMap<String, Location>,
}

impl OfflineGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_places(mut self, places: impl IntoIterator<Item = (String, Location)>) -> Self {
        self.places.extend(places);
        self
    }

    fn lookup(&self, query: &str) -> Option<&Location> {
        if let Some(location) = self.places.get(query.trim()) {
            return Some(location);
        }
        query
            .split(|c: char| !c.is_ascii_digit())
            .filter(|token| token.len() == 5)
            .find_map(|zipcode| self.places.get(zipcode))
    }
}

#[async_trait]
impl Geocoder for OfflineGeocoder {
    async fn geocode(&self, query: &str) -> Result<Option<Location>> {
        let found = self.lookup(query).cloned();
        if found.is_none() {
            log::debug!("No offline place for {:?}", query);
        }
        Ok(found)
    }
}

/// Geocoder selected by configuration. The offline table is filled with `places`.
pub fn from_config(
    config: &GeocoderConfig,
    places: impl IntoIterator<Item = (String, Location)>,
) -> Result<Arc<dyn Geocoder>> {
    match config.provider {
        GeocoderProvider::Offline => Ok(Arc::new(OfflineGeocoder::new().with_places(places))),
        GeocoderProvider::MapQuest => {
            let Some(api_key) = config.api_key.as_deref().filter(|key| !key.is_empty()) else {
                bail!("geocoder.api_key is required for the mapquest provider");
            };
            Ok(Arc::new(MapQuestGeocoder::new(config.base_url.clone(), api_key)?))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn geocoder() -> OfflineGeocoder {
        OfflineGeocoder::new().with_places([
            ("02215".to_string(), Location::point(-71.105536, 42.350846)),
            ("01854".to_string(), Location::point(-71.3357, 42.6486)),
        ])
    }

    #[tokio::test]
    async fn test_zipcode_lookup() {
        let location = geocoder().geocode(" 02215 ").await.unwrap().unwrap();
        assert_eq!(location.coordinates, [-71.105536, 42.350846]);
    }

    #[tokio::test]
    async fn test_zipcode_inside_address() {
        let location = geocoder()
            .geocode("220 Pawtucket St, Lowell, MA 01854")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(location.latitude(), 42.6486);
    }

    #[test]
    fn test_mapquest_requires_key() {
        let config = GeocoderConfig {
            provider: GeocoderProvider::MapQuest,
            ..GeocoderConfig::default()
        };
        assert!(from_config(&config, []).is_err());
        assert!(from_config(&GeocoderConfig::default(), []).is_ok());
    }

    #[tokio::test]
    async fn test_unknown_place() {
        let geocoder = geocoder();
        assert!(geocoder.geocode("99999").await.unwrap().is_none());
        // Six digits is not a zipcode token.
        assert!(geocoder.geocode("Suite 022150").await.unwrap().is_none());
        assert!(geocoder.geocode("").await.unwrap().is_none());
    }
}
