//! Nominatim (OpenStreetMap) geocoding adapter.

use serde::Deserialize;

use crate::error::AttemptError;
use crate::model::GeoPoint;
use crate::traits::Resolver;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct NominatimConfig {
    pub base_url: String,
    /// Nominatim's usage policy rejects requests without an identifying agent.
    pub user_agent: String,
    pub timeout_secs: u64,
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: "https://nominatim.openstreetmap.org".to_string(),
            user_agent: concat!("shipment-router/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 10,
        }
    }
}

#[derive(Debug, Clone)]
pub struct NominatimGeocoder {
    config: NominatimConfig,
    client: reqwest::blocking::Client,
}

impl NominatimGeocoder {
    pub fn new(config: NominatimConfig) -> Result<Self, reqwest::Error> {
        let client = reqwest::blocking::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self { config, client })
    }
}

impl Resolver for NominatimGeocoder {
    fn name(&self) -> &str {
        "nominatim"
    }

    fn resolve(&self, address: &str) -> Result<GeoPoint, AttemptError> {
        let url = format!("{}/search", self.config.base_url.trim_end_matches('/'));

        let response = self
            .client
            .get(url)
            .query(&[("q", address), ("format", "json"), ("limit", "1")])
            .send()?;

        if !response.status().is_success() {
            return Err(AttemptError::HttpStatus(response.status().as_u16()));
        }

        let places: Vec<NominatimPlace> = response.json()?;
        places
            .first()
            .ok_or(AttemptError::NoResults)?
            .to_point()
    }
}

/// One search hit. Nominatim encodes coordinates as strings.
#[derive(Debug, Deserialize)]
pub(crate) struct NominatimPlace {
    lat: String,
    lon: String,
}

impl NominatimPlace {
    pub(crate) fn to_point(&self) -> Result<GeoPoint, AttemptError> {
        let lat = self.lat.trim().parse::<f64>();
        let lon = self.lon.trim().parse::<f64>();
        match (lat, lon) {
            (Ok(lat), Ok(lon)) if GeoPoint::new(lat, lon).is_valid() => Ok(GeoPoint::new(lat, lon)),
            _ => Err(AttemptError::Malformed(format!(
                "lat={:?} lon={:?}",
                self.lat, self.lon
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_place_is_parsed() {
        let body = r#"[
            {"place_id": 1, "lat": "22.6142", "lon": "120.3040", "display_name": "前鎮區"},
            {"place_id": 2, "lat": "25.0330", "lon": "121.5654"}
        ]"#;
        let places: Vec<NominatimPlace> = serde_json::from_str(body).expect("valid json");
        let point = places[0].to_point().expect("numeric coordinates");
        assert_eq!(point, GeoPoint::new(22.6142, 120.3040));
    }

    #[test]
    fn test_non_numeric_coordinates_are_malformed() {
        let place = NominatimPlace {
            lat: "north".to_string(),
            lon: "120.3".to_string(),
        };
        assert!(matches!(place.to_point(), Err(AttemptError::Malformed(_))));
    }

    #[test]
    fn test_out_of_range_coordinates_are_malformed() {
        let place = NominatimPlace {
            lat: "122.6".to_string(),
            lon: "120.3".to_string(),
        };
        assert!(matches!(place.to_point(), Err(AttemptError::Malformed(_))));
    }
}
