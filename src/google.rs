//! Google Maps HTTP adapters: fallback geocoding and the distance matrix.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::error::{AttemptError, MatrixError};
use crate::matrix::{DistanceMatrix, STATUS_OK};
use crate::model::GeoPoint;
use crate::traits::{DistanceMatrixProvider, Resolver};

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GoogleConfig {
    pub base_url: String,
    pub geocoding_api_key: Option<String>,
    pub matrix_api_key: Option<String>,
    /// Language for the human-readable distance/duration text.
    pub language: String,
    pub timeout_secs: u64,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            base_url: "https://maps.googleapis.com/maps/api".to_string(),
            geocoding_api_key: None,
            matrix_api_key: None,
            language: "zh-TW".to_string(),
            timeout_secs: 10,
        }
    }
}

impl GoogleConfig {
    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }
}

fn build_client(config: &GoogleConfig) -> Result<reqwest::blocking::Client, reqwest::Error> {
    reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(config.timeout_secs))
        .build()
}

/// Geocoding API resolver, authenticated by `geocoding_api_key`.
#[derive(Debug, Clone)]
pub struct GoogleGeocoder {
    config: GoogleConfig,
    client: reqwest::blocking::Client,
}

impl GoogleGeocoder {
    pub fn new(config: GoogleConfig) -> Result<Self, reqwest::Error> {
        let client = build_client(&config)?;
        Ok(Self { config, client })
    }
}

impl Resolver for GoogleGeocoder {
    fn name(&self) -> &str {
        "google"
    }

    fn resolve(&self, address: &str) -> Result<GeoPoint, AttemptError> {
        let key = self
            .config
            .geocoding_api_key
            .as_deref()
            .ok_or(AttemptError::MissingCredential)?;

        let response = self
            .client
            .get(self.config.endpoint("geocode/json"))
            .query(&[("address", address), ("key", key)])
            .send()?;

        if !response.status().is_success() {
            return Err(AttemptError::HttpStatus(response.status().as_u16()));
        }

        response.json::<GeocodeResponse>()?.into_point()
    }
}

#[derive(Debug, Deserialize)]
pub(crate) struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl GeocodeResponse {
    pub(crate) fn into_point(self) -> Result<GeoPoint, AttemptError> {
        if self.status != STATUS_OK {
            return Err(AttemptError::ProviderStatus(self.status));
        }
        let location = &self
            .results
            .first()
            .ok_or(AttemptError::NoResults)?
            .geometry
            .location;
        let point = GeoPoint::new(location.lat, location.lng);
        if point.is_valid() {
            Ok(point)
        } else {
            Err(AttemptError::Malformed(point.to_string()))
        }
    }
}

/// Distance Matrix API adapter. Driving mode, metric units, one request per call.
#[derive(Debug, Clone)]
pub struct GoogleDistanceMatrix {
    config: GoogleConfig,
    client: reqwest::blocking::Client,
}

impl GoogleDistanceMatrix {
    pub fn new(config: GoogleConfig) -> Result<Self, reqwest::Error> {
        let client = build_client(&config)?;
        Ok(Self { config, client })
    }
}

impl DistanceMatrixProvider for GoogleDistanceMatrix {
    fn matrix_for(
        &self,
        origins: &[String],
        destinations: &[String],
    ) -> Result<DistanceMatrix, MatrixError> {
        let key = self
            .config
            .matrix_api_key
            .as_deref()
            .ok_or(MatrixError::MissingCredential)?;

        let origins = origins.join("|");
        let destinations = destinations.join("|");
        debug!(origins = %origins, "requesting distance matrix");

        let matrix = self
            .client
            .get(self.config.endpoint("distancematrix/json"))
            .query(&[
                ("origins", origins.as_str()),
                ("destinations", destinations.as_str()),
                ("key", key),
                ("units", "metric"),
                ("mode", "driving"),
                ("language", self.config.language.as_str()),
            ])
            .send()
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.json::<DistanceMatrix>())
            .map_err(|err| {
                warn!(error = %err, "distance matrix request failed");
                MatrixError::Transport(err)
            })?;

        if !matrix.is_ok() {
            warn!(status = %matrix.status, "distance matrix provider rejected request");
            return Err(MatrixError::Status(matrix.status));
        }

        Ok(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geocode_response_first_result_wins() {
        let body = r#"{
            "results": [
                {"geometry": {"location": {"lat": 22.6307, "lng": 120.3419}}},
                {"geometry": {"location": {"lat": 22.0, "lng": 120.0}}}
            ],
            "status": "OK"
        }"#;
        let response: GeocodeResponse = serde_json::from_str(body).expect("valid json");
        assert_eq!(response.into_point().expect("ok"), GeoPoint::new(22.6307, 120.3419));
    }

    #[test]
    fn test_geocode_response_non_ok_status() {
        let body = r#"{"results": [], "status": "REQUEST_DENIED", "error_message": "bad key"}"#;
        let response: GeocodeResponse = serde_json::from_str(body).expect("valid json");
        match response.into_point() {
            Err(AttemptError::ProviderStatus(status)) => assert_eq!(status, "REQUEST_DENIED"),
            other => panic!("expected provider status error, got {other:?}"),
        }
    }

    #[test]
    fn test_geocode_response_ok_without_results() {
        let body = r#"{"results": [], "status": "OK"}"#;
        let response: GeocodeResponse = serde_json::from_str(body).expect("valid json");
        assert!(matches!(response.into_point(), Err(AttemptError::NoResults)));
    }

    #[test]
    fn test_geocoder_without_key_does_not_call_out() {
        let config = GoogleConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            ..GoogleConfig::default()
        };
        let geocoder = GoogleGeocoder::new(config).expect("client");
        assert!(matches!(
            geocoder.resolve("高雄市前鎮區成功二路39號"),
            Err(AttemptError::MissingCredential)
        ));
    }

    #[test]
    fn test_matrix_without_key_is_missing_credential() {
        let provider = GoogleDistanceMatrix::new(GoogleConfig::default()).expect("client");
        let addresses = vec!["a".to_string(), "b".to_string()];
        assert!(matches!(
            provider.matrix_for(&addresses, &addresses),
            Err(MatrixError::MissingCredential)
        ));
    }
}
