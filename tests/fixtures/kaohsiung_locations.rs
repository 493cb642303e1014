//! Real Kaohsiung addresses for realistic test fixtures.
//!
//! Coordinates sourced from OpenStreetMap and rounded to four decimals.

use std::collections::HashMap;

use shipment_router::error::{AttemptError, MatrixError};
use shipment_router::haversine::HaversineMatrix;
use shipment_router::matrix::{CellStatus, DistanceMatrix, MatrixCell};
use shipment_router::traits::{DistanceMatrixProvider, Resolver, TravelCosts};
use shipment_router::{Destination, GeoPoint};

/// A named address with coordinates.
#[derive(Debug, Clone, Copy)]
pub struct Location {
    pub name: &'static str,
    pub address: &'static str,
    pub lat: f64,
    pub lng: f64,
}

impl Location {
    pub const fn new(name: &'static str, address: &'static str, lat: f64, lng: f64) -> Self {
        Self {
            name,
            address,
            lat,
            lng,
        }
    }

    pub fn point(&self) -> GeoPoint {
        GeoPoint::new(self.lat, self.lng)
    }

    /// A destination at this location, coordinates already resolved.
    pub fn destination(&self, id: u64) -> Destination {
        Destination::new(id, self.name, self.address).with_location(self.lat, self.lng)
    }

    /// A destination at this location that still needs geocoding.
    pub fn unresolved(&self, id: u64) -> Destination {
        Destination::new(id, self.name, self.address)
    }
}

// ============================================================================
// Depot
// ============================================================================

pub const CITY_HALL: Location = Location::new(
    "Kaohsiung City Hall",
    "高雄市苓雅區四維三路2號",
    22.6206,
    120.3120,
);

// ============================================================================
// Cianjhen District
// ============================================================================

pub const CIANJHEN: &[Location] = &[
    Location::new("Dream Mall", "高雄市前鎮區中華五路789號", 22.5952, 120.3069),
    Location::new("Software Park", "高雄市前鎮區復興四路12號", 22.6061, 120.3014),
    Location::new("Kaisyuan Night Market", "高雄市前鎮區凱旋四路758號", 22.6015, 120.3210),
];

// ============================================================================
// Gushan District
// ============================================================================

pub const GUSHAN: &[Location] = &[
    Location::new("Sun Yat-sen University", "高雄市鼓山區蓮海路70號", 22.6273, 120.2660),
    Location::new("Museum of Fine Arts", "高雄市鼓山區美術館路80號", 22.6565, 120.2866),
];

// ============================================================================
// Other Districts
// ============================================================================

pub const ZUOYING_HSR: Location = Location::new(
    "Zuoying HSR Station",
    "高雄市左營區高鐵路105號",
    22.6873,
    120.3076,
);

pub const MAIN_STATION: Location = Location::new(
    "Kaohsiung Main Station",
    "高雄市三民區建國二路318號",
    22.6394,
    120.3025,
);

pub const FENGSHAN: Location = Location::new(
    "Fengshan Station",
    "高雄市鳳山區光遠路226號",
    22.6270,
    120.3580,
);

pub fn all_locations() -> Vec<Location> {
    let mut all = vec![CITY_HALL, ZUOYING_HSR, MAIN_STATION, FENGSHAN];
    all.extend_from_slice(CIANJHEN);
    all.extend_from_slice(GUSHAN);
    all
}

// ============================================================================
// In-memory providers
// ============================================================================

/// Resolves fixture addresses; anything else has no results.
#[derive(Debug, Clone)]
pub struct FixtureGeocoder {
    known: HashMap<String, GeoPoint>,
}

impl FixtureGeocoder {
    pub fn new(locations: &[Location]) -> Self {
        Self {
            known: locations
                .iter()
                .map(|loc| (loc.address.to_string(), loc.point()))
                .collect(),
        }
    }
}

impl Resolver for FixtureGeocoder {
    fn name(&self) -> &str {
        "fixture"
    }

    fn resolve(&self, address: &str) -> Result<GeoPoint, AttemptError> {
        self.known.get(address).copied().ok_or(AttemptError::NoResults)
    }
}

/// Great-circle "road" matrix over fixture addresses. Unknown addresses
/// get `NOT_FOUND` cells.
#[derive(Debug, Clone)]
pub struct FixtureMatrix {
    geocoder: FixtureGeocoder,
}

impl FixtureMatrix {
    pub fn new(locations: &[Location]) -> Self {
        Self {
            geocoder: FixtureGeocoder::new(locations),
        }
    }
}

impl DistanceMatrixProvider for FixtureMatrix {
    fn matrix_for(
        &self,
        origins: &[String],
        destinations: &[String],
    ) -> Result<DistanceMatrix, MatrixError> {
        assert_eq!(origins, destinations, "engine always asks for a square matrix");
        let points: Vec<Option<GeoPoint>> = origins
            .iter()
            .map(|address| self.geocoder.resolve(address).ok())
            .collect();
        let costs = HaversineMatrix::default().costs(&points);
        Ok(DistanceMatrix::from_fn(points.len(), |from, to| {
            match costs.leg(from, to) {
                Some(leg) => MatrixCell::reachable(leg.distance_m, leg.duration_s.unwrap_or(0)),
                None => MatrixCell::unreachable(CellStatus::NotFound),
            }
        }))
    }
}

/// Always answers with a non-OK overall status.
#[derive(Debug, Clone)]
pub struct RejectingMatrix(pub &'static str);

impl DistanceMatrixProvider for RejectingMatrix {
    fn matrix_for(&self, _: &[String], _: &[String]) -> Result<DistanceMatrix, MatrixError> {
        Err(MatrixError::Status(self.0.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinates_in_kaohsiung_area() {
        for loc in all_locations() {
            assert!(loc.lat > 22.5 && loc.lat < 22.8, "{} lat out of range: {}", loc.name, loc.lat);
            assert!(loc.lng > 120.2 && loc.lng < 120.4, "{} lng out of range: {}", loc.name, loc.lng);
        }
    }
}
