//! Haversine travel costs (used when no routing provider is available).
//!
//! Uses great-circle distance to estimate travel time.
//! Less accurate than a routing API (ignores roads) but always available.

use rayon::prelude::*;

use crate::model::GeoPoint;
use crate::traits::{Leg, TravelCosts};

/// Average driving speed assumption for time estimation.
const DEFAULT_SPEED_KMH: f64 = 40.0;

/// Earth radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points in kilometers.
pub fn haversine_km(from: GeoPoint, to: GeoPoint) -> f64 {
    let lat1_rad = from.lat.to_radians();
    let lat2_rad = to.lat.to_radians();
    let delta_lat = (to.lat - from.lat).to_radians();
    let delta_lon = (to.lon - from.lon).to_radians();

    let a = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Haversine-based travel cost model.
///
/// Estimates travel time using straight-line distance and an assumed speed.
#[derive(Debug, Clone, Copy)]
pub struct HaversineMatrix {
    /// Assumed average driving speed in km/h.
    pub speed_kmh: f64,
}

impl Default for HaversineMatrix {
    fn default() -> Self {
        Self {
            speed_kmh: DEFAULT_SPEED_KMH,
        }
    }
}

impl HaversineMatrix {
    /// `None` unless `speed_kmh` is a finite positive speed.
    pub fn new(speed_kmh: f64) -> Option<Self> {
        (speed_kmh.is_finite() && speed_kmh > 0.0).then_some(Self { speed_kmh })
    }

    /// Convert distance in km to travel time in seconds. `None` when the
    /// speed cannot produce a duration.
    fn km_to_seconds(&self, km: f64) -> Option<u32> {
        let seconds = (km / self.speed_kmh * 3600.0).round();
        (seconds.is_finite() && seconds >= 0.0 && seconds <= f64::from(u32::MAX))
            .then_some(seconds as u32)
    }

    fn leg_between(&self, from: GeoPoint, to: GeoPoint) -> Leg {
        let km = haversine_km(from, to);
        Leg {
            distance_m: (km * 1000.0).round() as u32,
            duration_s: self.km_to_seconds(km),
        }
    }

    /// Precomputes every leg between `points`.
    ///
    /// Unresolved points have no legs in either direction.
    pub fn costs(&self, points: &[Option<GeoPoint>]) -> HaversineCosts {
        let legs = points
            .par_iter()
            .map(|from| {
                points
                    .iter()
                    .map(|to| match (from, to) {
                        (Some(from), Some(to)) => Some(self.leg_between(*from, *to)),
                        _ => None,
                    })
                    .collect::<Vec<_>>()
            })
            .collect();
        HaversineCosts { legs }
    }
}

/// Precomputed great-circle legs over `[origin, dest_1 .. dest_n]`.
#[derive(Debug, Clone)]
pub struct HaversineCosts {
    legs: Vec<Vec<Option<Leg>>>,
}

impl TravelCosts for HaversineCosts {
    fn dimension(&self) -> usize {
        self.legs.len()
    }

    fn leg(&self, from: usize, to: usize) -> Option<Leg> {
        *self.legs.get(from)?.get(to)?
    }
}
